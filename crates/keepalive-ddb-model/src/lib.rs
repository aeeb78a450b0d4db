//! DynamoDB wire model types for the keepalive store layer.
//!
//! These types mirror the DynamoDB JSON 1.0 protocol closely enough to be
//! serialized onto the wire by the HTTP transport and consumed directly by the
//! in-memory engine. Only the item-level operations the store client issues are
//! modelled.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod reserved;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::{CancellationReason, ErrorCode, ServiceError};
pub use operations::StoreOperation;
pub use reserved::{is_expression_word, is_identifier, is_reserved_word, reserved_keyword_message};
pub use types::{Item, Key};
