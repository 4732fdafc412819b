//! _**Keep a fresh set of IP prefixes fetched from remote lists.**_
//!
//! [UrlIpRanges] fetches plain-text CIDR lists (one prefix per line, `#` comments)
//! from one or more URLs, publishes the combined prefix set to concurrent readers,
//! refreshes it in the background on a fixed interval, and keeps the last good set in
//! an on-disk cache so a restart survives a source outage.
//!
//! ```no_run
//! use urlipranges::{ConfigBuilder, IpRangeSource, Shutdown, UrlIpRanges};
//!
//! let config = ConfigBuilder::default()
//!     .url("https://www.cloudflare.com/ips-v4")
//!     .url("https://www.cloudflare.com/ips-v6")
//!     .timeout(std::time::Duration::from_secs(30))
//!     .retries(2)
//!     .build();
//!
//! let lifecycle = Shutdown::new();
//! let ranges = UrlIpRanges::provision(&config, &lifecycle)?;
//!
//! if ranges.contains("173.245.48.1".parse().unwrap()) {
//!     println!("trusted proxy");
//! }
//!
//! lifecycle.cancel();
//! # Ok::<(), urlipranges::Error>(())
//! ```

mod core;

/*-------------------------------------------------------------------------------------------------
  Primary Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::cache::{cache_dir, cache_filename, resolve_path, CacheRecord, CacheStore};
pub use crate::core::config::{Config, ConfigBuilder, DEFAULT_INTERVAL, DEFAULT_RETRY_DELAY};
pub use crate::core::duration;
pub use crate::core::errors::{Error, Result};
pub use crate::core::fetch::{Aggregator, Fetcher};
pub use crate::core::prefix::{parse_cidr, parse_line, parse_lines};
pub use crate::core::ranges::{IpRangeSource, State, UrlIpRanges};
pub use crate::core::shutdown::Shutdown;
pub use crate::core::store::RangeStore;

/*--------------------------------------------------------------------------------------
  Re-exports
--------------------------------------------------------------------------------------*/

pub use ipnetwork;

use ipnetwork::IpNetwork;
use std::sync::Arc;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple library interface**_ that provisions a [UrlIpRanges] instance, takes a
/// snapshot of its prefix set, and stops it. Falls back to the cache file when the
/// sources cannot be fetched; fresh fetches update the cache.
///
/// ```no_run
/// let config = urlipranges::Config::from_urls(["https://www.cloudflare.com/ips-v4"]);
/// let prefixes = urlipranges::get_ranges(&config).unwrap();
/// println!("{} prefixes", prefixes.len());
/// ```
pub fn get_ranges(config: &Config) -> Result<Arc<[IpNetwork]>> {
    let mut ranges = UrlIpRanges::provision(config, &Shutdown::new())?;
    let snapshot = ranges.ip_ranges();
    ranges.stop();
    Ok(snapshot)
}
