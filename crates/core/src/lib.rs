//! Core marketplace logic for Feira.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, status policies, and workflow services live here.
//!
//! # Modules
//!
//! - `history` - Append-only status histories with derived current status
//! - `document` - Seller identity verification workflow
//! - `product` - Product moderation workflow
//! - `sale` - Checkout pipeline and timed expiration sweep
//! - `ledger` - Transaction ledger, balances, and withdrawals
//! - `repository` - Persistence traits implemented by adapter crates
//! - `payment` / `notify` - Collaborator traits for Pix charges and messaging
//! - `storage` - Media storage over OpenDAL

pub mod account;
pub mod document;
pub mod history;
pub mod ledger;
pub mod notify;
pub mod payment;
pub mod product;
pub mod repository;
pub mod sale;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
