//! Storage layer: the in-memory working copy of both datasets, plus JSON seed
//! file ingestion.

mod error;
mod mem;
mod seed;

pub use error::StoreError;
pub use mem::MemStore;
pub use seed::{load_houses_file, load_schools_file};
