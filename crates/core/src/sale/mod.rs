//! Checkout pipeline and sale lifecycle.
//!
//! A buyer purchases an approved product: the checkout opens a pending sale,
//! issues a Pix charge, and opens the seller's income transaction. A webhook
//! confirmation settles the sale; unpaid sales expire on a timer.
//!
//! # Modules
//!
//! - `types` - Sale entity, statuses, and operation inputs
//! - `policy` - Transition allowlist
//! - `error` - Sale-specific error types
//! - `service` - Checkout, confirmation, delivery, and content access
//! - `sweep` - Timed expiration of unpaid sales

pub mod error;
pub mod policy;
pub mod service;
pub mod sweep;
pub mod types;

pub use error::SaleError;
pub use policy::SalePolicy;
pub use service::SaleService;
pub use sweep::{ExpirationSweeper, SweepOutcome};
pub use types::{
    CheckoutInput, CheckoutOutput, ConfirmPaymentInput, PaymentMethod, Sale, SaleStatus,
};
