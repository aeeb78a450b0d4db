//! Keepalive sessions stored in DynamoDB.
//!
//! A [`Session`] ties a device token to a keepalive interval and an expiry.
//! [`SessionRepo`] is the storage seam; [`DynamoSessionRepo`] implements it
//! on top of the store client's public operations.

pub mod repo;
pub mod session;

pub use repo::{DynamoSessionRepo, SESSION_TABLE, SessionRepo};
pub use session::Session;
