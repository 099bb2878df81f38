//! Cache module.
//!
//! Two caches back the dispatcher:
//! - `BoundedBlobCache` - avatar bytes, bounded by entry count and total size
//! - `TypedCache` - small TTL-bounded lookups (user profiles) on top of Moka
//!
//! Both are owned by the dispatcher instance and handed to handlers through
//! it; there is no process-wide cache.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let avatars = BoundedBlobCache::new(BlobCacheConfig::new(100, 50 << 20));
//! avatars.put("10001", bytes);
//! let hit = avatars.get("10001");
//! ```

mod blob;
mod config;
mod typed;

pub use blob::BoundedBlobCache;
pub use config::{BlobCacheConfig, CacheConfig};
pub use typed::TypedCache;
