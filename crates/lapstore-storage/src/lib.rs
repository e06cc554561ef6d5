pub mod client;
pub mod compress;
pub mod error;
mod retry;

pub use client::{StorageClient, StorageConfig};
pub use compress::{CompressionSettings, JpegCompressor};
pub use error::StorageError;
