//! In-memory repository adapters for Feira.
//!
//! Backed by `DashMap`, with the same first-writer-wins conditional update
//! semantics a database adapter must provide. Suited to tests, demos, and
//! single-node deployments that can afford to lose state on restart.

pub mod repositories;

pub use repositories::{
    MemoryAccountRepository, MemoryDocumentRepository, MemoryProductRepository,
    MemorySaleRepository, MemoryStoreRepository, MemoryTransactionRepository,
};
