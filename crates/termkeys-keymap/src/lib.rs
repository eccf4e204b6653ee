mod catalog;
mod descriptor;
mod error;

pub use catalog::ActionCatalog;
pub use descriptor::{
    rewrite_descriptor, rewrite_element, ACTION_TAG, DEFAULT_SCHEME, SCHEME_TAG,
};
pub use error::{CatalogError, DescriptorError};
