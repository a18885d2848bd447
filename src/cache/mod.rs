//! Cache module - Modular caching system using Moka.
//!
//! ## Architecture
//!
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Typed wrapper over a Moka cache
//! - `CacheConfig` - Capacity and expiry settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! let groups = registry.get_or_create::<(ObjectId, String), Group>("groups", CacheConfig::directory());
//! groups.insert((company.id, name.to_string()), group);
//! ```

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
