//! Seller identity verification workflow.
//!
//! Before selling, an account submits an identity document that a reviewer
//! approves or rejects. The full verification trail lives in the document's
//! status history; the current status is derived from the last entry.
//!
//! # Modules
//!
//! - `types` - Document entity, statuses, and operation inputs
//! - `policy` - Transition allowlist and routing helpers
//! - `error` - Document-specific error types
//! - `service` - Submission and review operations

pub mod error;
pub mod policy;
pub mod service;
pub mod types;

pub use error::DocumentError;
pub use policy::DocumentPolicy;
pub use service::DocumentService;
pub use types::{
    Document, DocumentStatus, DocumentType, ReviewDecision, ReviewDocumentInput, StatusCategory,
    SubmitDocumentInput,
};
