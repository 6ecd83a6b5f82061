//! Repository adapters over concurrent hash maps.
//!
//! Every conditional write (`update_status`, `replace`) performs its status
//! check and its append while holding the map's shard lock for the key, so
//! concurrent writers against the same entity serialize and the first one
//! wins; the loser sees `RepoError::StatusConflict`.

pub mod account;
pub mod document;
pub mod product;
pub mod sale;
pub mod store;
pub mod transaction;

pub use account::MemoryAccountRepository;
pub use document::MemoryDocumentRepository;
pub use product::MemoryProductRepository;
pub use sale::MemorySaleRepository;
pub use store::MemoryStoreRepository;
pub use transaction::MemoryTransactionRepository;
