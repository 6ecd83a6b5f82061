//! Product moderation workflow.
//!
//! A seller prepares a product, submits it for validation, and a reviewer
//! approves or reproves it. Only approved products are purchasable; a
//! reproved product is terminal and the seller starts over.
//!
//! # Modules
//!
//! - `types` - Product entity, statuses, and operation inputs
//! - `policy` - Transition allowlist and review routing
//! - `error` - Product-specific error types
//! - `service` - Creation, submission, and review operations

pub mod error;
pub mod policy;
pub mod service;
pub mod types;

pub use error::ProductError;
pub use policy::ProductPolicy;
pub use service::ProductService;
pub use types::{
    CreateProductInput, DeliveryMethod, Product, ProductReviewDecision, ProductStatus,
    ProductStatusEntry, ProductType, ReviewProductInput,
};
