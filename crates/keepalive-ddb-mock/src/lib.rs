//! In-memory DynamoDB engine for testing the keepalive store layer.
//!
//! [`MockStore`] implements the client's transport seam. It parses the
//! expressions the client compiles back into predicates and assignments,
//! rejecting reserved attribute names exactly as the client does, so tests
//! exercise the same request shapes a live table would see.
#![allow(clippy::doc_markdown, clippy::implicit_hasher)]

pub mod engine;
pub mod error;
pub mod expression;
pub mod storage;

pub use engine::MockStore;
pub use storage::{KeySchema, StorageError, Table};
