//! Chain acceptance (C6) and mempool admission (C7) pipelines for the chain
//! engine core: the two request-handling pipelines that sit between the
//! entity model ([`chain_core`]) and the store adapter ([`chain_store`]).

pub mod chain;
pub mod config;
pub mod error;
pub mod mempool;

pub use chain::{create_block, delete_block};
pub use config::EngineConfig;
pub use error::EngineError;
pub use mempool::admit_to_mempool;
