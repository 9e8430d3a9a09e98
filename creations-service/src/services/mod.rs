pub mod database;
pub mod memory;
pub mod metrics;
pub mod pdf;
pub mod providers;
pub mod stores;

pub use database::Database;
pub use memory::{InMemoryCreations, InMemoryEntitlements};
pub use stores::{CreationStore, EntitlementStore};
