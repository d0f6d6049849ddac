pub mod config_service;
pub mod paths;
pub mod reqwest_transport;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::{ConcepterPaths, PathError};
pub use crate::reqwest_transport::ReqwestTransport;
pub use crate::storage::{JsonFileMedium, MemoryMedium, PersistentStore};
