//! Local key/value persistence.

pub mod file_medium;
pub mod memory_medium;
pub mod persistent_store;

pub use file_medium::JsonFileMedium;
pub use memory_medium::MemoryMedium;
pub use persistent_store::PersistentStore;
