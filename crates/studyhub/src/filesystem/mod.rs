/// Batch commit with rollback.
mod batch;
/// Store implementation.
pub mod store;

pub use store::FsStore;
