//! Object storage for generated quotation documents, using Apache OpenDAL.
//!
//! Supported providers:
//! - S3-compatible: Cloudflare R2, AWS S3, MinIO
//! - Local filesystem (development only)
//! - In-process memory (tests)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                             │
//! │                   (Unified Storage API)                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("key", data)      │ op.stat("key")                     │
//! │ op.read("key")             │ op.delete("key")                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod service;

pub use error::StorageError;
pub use service::{StorageService, StoredObject, sanitize_segment};
