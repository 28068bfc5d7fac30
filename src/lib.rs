pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod google;
pub mod server;
mod utils;

pub use error::SitepushError;
pub use server::router::{SitepushState, sitepush_router};
