//! Bundle module - property files on disk.

pub mod locale;
pub mod properties;
mod store;

pub use locale::{derive_base_name, Locale, PROPERTIES_SUFFIX};
pub use store::{BundleFile, BundleStore};
