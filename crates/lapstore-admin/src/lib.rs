//! Seller-facing catalog workflow.
//!
//! [`Catalog`] wires the product store, blob store and image compressor
//! together; [`EditSession`] drives one create or edit of a product through
//! validation, image upload and persistence.

pub mod catalog;
pub mod session;
#[cfg(feature = "test-support")]
pub mod testing;

pub use catalog::{Catalog, CatalogSettings};
pub use session::{CancelHandle, EditMode, EditSession, SessionState};
