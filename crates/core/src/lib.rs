//! Domain records, input validation, and page arithmetic for the catalog.
//!
//! Nothing in this crate performs I/O; storage and HTTP layers build on it.

pub mod paging;
pub mod types;
pub mod validation;

pub use paging::{Page, PageRequest};
pub use types::{Category, CategoryInput, Product, ProductInput, ProductListing};
pub use validation::{ValidationError, ValidationErrors};
