use crate::core::cache::{resolve_path, CacheStore};
use crate::core::config::Config;
use crate::core::errors::{Error, Result};
use crate::core::fetch::Aggregator;
use crate::core::shutdown::Shutdown;
use crate::core::store::RangeStore;
use ipnetwork::IpNetwork;
use log::{info, warn};
use parking_lot::Mutex;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  IP Range Source
-------------------------------------------------------------------------------------------------*/

/// Query interface for consumers that classify requests by client address.
pub trait IpRangeSource {
    /// Current published prefix set.
    fn ip_ranges(&self) -> Arc<[IpNetwork]>;

    /// Whether `ip` falls inside any published prefix.
    fn contains(&self, ip: IpAddr) -> bool {
        self.ip_ranges().iter().any(|prefix| prefix.contains(ip))
    }
}

/*-------------------------------------------------------------------------------------------------
  Lifecycle State
-------------------------------------------------------------------------------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Initial fetch (or cache fallback) in progress.
    Starting,
    /// Background refresher is scheduled.
    Running,
    /// Refresher has exited; no further refreshes occur.
    Stopped,
}

/*-------------------------------------------------------------------------------------------------
  Refresher
-------------------------------------------------------------------------------------------------*/

/// One refresh cycle: aggregate every source, publish, then persist.
///
/// Cycles run one at a time, so the cache file always matches the last published set.
#[derive(Debug)]
struct Refresher {
    aggregator: Aggregator,
    store: Arc<RangeStore>,
    cache: CacheStore,
    cycle: Mutex<()>,
}

impl Refresher {
    fn refresh(&self) -> Result<usize> {
        let _cycle = self.cycle.lock();

        let prefixes = self.aggregator.get_prefixes().inspect_err(|error| match error {
            Error::Cancelled => info!("Refresh of IP ranges cancelled by shutdown"),
            error => log::error!(
                "Failed to refresh IP ranges from URLs {:?}: {}",
                self.aggregator.urls(),
                error
            ),
        })?;

        let published: Arc<[IpNetwork]> = prefixes.into();
        self.store.set(Arc::clone(&published));
        info!("Published {} refreshed IP prefix(es)", published.len());

        if let Err(error) = self.cache.save(&published) {
            warn!("Failed to cache refreshed IP ranges: {}", error);
        }

        Ok(published.len())
    }

    fn run(&self, interval: Duration, shutdown: &Shutdown) {
        info!("Refreshing IP ranges every {:?}", interval);
        while !shutdown.wait_timeout(interval) {
            // Failures are logged by refresh(); the last good set keeps serving.
            let _ = self.refresh();
        }
        info!("Stopped refreshing IP ranges");
    }
}

/*-------------------------------------------------------------------------------------------------
  URL IP Ranges
-------------------------------------------------------------------------------------------------*/

/// A prefix set fetched from a list of URLs, cached on disk, and refreshed in the
/// background until [stopped](UrlIpRanges::stop) or its lifecycle is shut down.
///
/// ```no_run
/// use urlipranges::{ConfigBuilder, IpRangeSource, Shutdown, UrlIpRanges};
///
/// let config = ConfigBuilder::default()
///     .url("https://www.cloudflare.com/ips-v4")
///     .retries(2)
///     .build();
///
/// let shutdown = Shutdown::new();
/// let ranges = UrlIpRanges::provision(&config, &shutdown).unwrap();
///
/// assert!(ranges.contains("173.245.48.1".parse().unwrap()));
///
/// // Stops every instance provisioned under this lifecycle
/// shutdown.cancel();
/// ```
#[derive(Debug)]
pub struct UrlIpRanges {
    refresher: Arc<Refresher>,
    shutdown: Shutdown,
    state: Arc<Mutex<State>>,
    handle: Option<JoinHandle<()>>,
}

impl UrlIpRanges {
    /// Build an instance from `config`: fetch every source once, falling back to the
    /// cache file when the fetch fails, then start the background refresher.
    ///
    /// The instance is stopped when `shutdown` (or [UrlIpRanges::stop]) fires. Fails
    /// when the configuration is invalid, or when neither the fetch nor the cache
    /// can supply a prefix set.
    pub fn provision(config: &Config, shutdown: &Shutdown) -> Result<Self> {
        config.validate()?;

        let state = Arc::new(Mutex::new(State::Starting));
        let shutdown = shutdown.child();
        let aggregator = Aggregator::new(config, shutdown.clone())?;
        let cache = CacheStore::new(resolve_path(config.urls(), config.cache_file()));
        info!("Cache file path: {:?}", cache.path());

        let initial = match aggregator.get_prefixes() {
            Ok(prefixes) => {
                info!(
                    "Fetched {} IP prefix(es) from {} URL(s)",
                    prefixes.len(),
                    aggregator.urls().len()
                );
                if let Err(error) = cache.save(&prefixes) {
                    warn!("Failed to cache IP ranges: {}", error);
                }
                prefixes
            }
            Err(fetch_error) => {
                warn!(
                    "Failed to perform initial fetch of IP ranges: {}; trying cache",
                    fetch_error
                );
                match cache.load() {
                    Ok(prefixes) => {
                        warn!(
                            "Starting with {} cached IP prefix(es) from {:?}",
                            prefixes.len(),
                            cache.path()
                        );
                        prefixes
                    }
                    Err(cache_error) => {
                        return Err(Error::Provision {
                            fetch: Box::new(fetch_error),
                            cache: Box::new(cache_error),
                        })
                    }
                }
            }
        };

        let refresher = Arc::new(Refresher {
            aggregator,
            store: Arc::new(RangeStore::new(initial)),
            cache,
            cycle: Mutex::new(()),
        });

        *state.lock() = State::Running;
        let handle = {
            let refresher = Arc::clone(&refresher);
            let shutdown = shutdown.clone();
            let state = Arc::clone(&state);
            let interval = config.interval();
            thread::Builder::new()
                .name("urlipranges-refresh".to_string())
                .spawn(move || {
                    refresher.run(interval, &shutdown);
                    *state.lock() = State::Stopped;
                })
                .map_err(Error::Thread)?
        };

        Ok(Self {
            refresher,
            shutdown,
            state,
            handle: Some(handle),
        })
    }

    pub fn state(&self) -> State {
        *self.state.lock()
    }

    /// Resolved location of the cache file.
    pub fn cache_path(&self) -> &Path {
        self.refresher.cache.path()
    }

    /// Run one refresh cycle now, on the calling thread. Waits for a background
    /// cycle already in progress. On failure the published set and the cache file
    /// are left as they were.
    pub fn refresh(&self) -> Result<usize> {
        self.refresher.refresh()
    }

    /// Stop the background refresher and wait for it to exit. Other instances
    /// sharing the same lifecycle are unaffected.
    pub fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("IP range refresh thread panicked");
            }
        }
        *self.state.lock() = State::Stopped;
    }
}

impl IpRangeSource for UrlIpRanges {
    fn ip_ranges(&self) -> Arc<[IpNetwork]> {
        self.refresher.store.get()
    }
}

impl Drop for UrlIpRanges {
    fn drop(&mut self) {
        self.stop();
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
