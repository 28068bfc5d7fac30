pub mod indexing;
pub mod oauth;
pub mod settings;
