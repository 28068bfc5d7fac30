mod indexing;

pub use indexing::{
    NotificationType, UrlNotification, UrlNotificationEntry, UrlNotificationMetadata,
};
