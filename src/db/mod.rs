//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `patch.rs`: write payloads accepted by the actor
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the actor owning the pool; all reads and writes go through its handle

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

pub use actor::{DbActorHandle, spawn};
pub use models::{DbCredential, DbIndexingStatus, IndexingState};
pub use patch::{AuthorizationGrant, CredentialPatch, IndexingStatusUpsert};
pub use schema::SQLITE_INIT;
