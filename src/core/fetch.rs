use crate::core::config::Config;
use crate::core::errors::{Error, Result};
use crate::core::prefix::parse_lines;
use crate::core::shutdown::Shutdown;
use ipnetwork::IpNetwork;
use log::info;
use parking_lot::Mutex;
use std::io::BufReader;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/*-------------------------------------------------------------------------------------------------
  Fetcher
-------------------------------------------------------------------------------------------------*/

/// Retrieves and parses a single prefix list with a fixed-delay retry loop.
///
/// Transport failures and non-2xx responses are retried until the attempt budget is
/// spent. A response that contains an invalid line ends the fetch immediately, even
/// when attempts remain. Cancelling the shutdown signal abandons an in-flight
/// request and ends the fetch with [Error::Cancelled].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::blocking::Client,
    max_attempts: u32,
    retry_delay: Duration,
    shutdown: Shutdown,
}

impl Fetcher {
    pub fn new(config: &Config, shutdown: Shutdown) -> Result<Self> {
        Ok(Self {
            client: build_client(USER_AGENT, config.timeout())?,
            max_attempts: config.max_attempts(),
            retry_delay: config.retry_delay(),
            shutdown,
        })
    }

    /// Fetch the prefix list at `url`.
    pub fn fetch(&self, url: &str) -> Result<Vec<IpNetwork>> {
        let mut attempt: u32 = 0;
        loop {
            if self.shutdown.is_cancelled() {
                return Err(Error::Cancelled);
            }

            attempt += 1;
            info!(
                "Get IP ranges from URL; Attempt {} of {}: GET {}",
                attempt, self.max_attempts, url
            );

            match self.fetch_once(url) {
                Ok(prefixes) => {
                    info!(
                        "Get IP ranges from URL; Attempt {}: Ok, {} prefix(es)",
                        attempt,
                        prefixes.len()
                    );
                    break Ok(prefixes);
                }
                Err(error) if error.is_retryable() => {
                    log::error!(
                        "Get IP ranges from URL; Attempt {}: FAILED: {}",
                        attempt,
                        error
                    );

                    if attempt >= self.max_attempts {
                        break Err(Error::RetriesExhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            source: Box::new(error),
                        });
                    }

                    if self.shutdown.wait_timeout(self.retry_delay) {
                        break Err(Error::Cancelled);
                    }
                }
                Err(error) => {
                    log::error!(
                        "Get IP ranges from URL; Attempt {}: ABORTED: {}",
                        attempt,
                        error
                    );
                    break Err(error);
                }
            }
        }
    }

    /// One GET request, run on its own thread so that shutdown can abandon it.
    fn fetch_once(&self, url: &str) -> Result<Vec<IpNetwork>> {
        // Cancelled by the request thread when it finishes, or by the shutdown signal.
        let request = self.shutdown.child();
        let outcome: Arc<Mutex<Option<Result<Vec<IpNetwork>>>>> = Arc::default();

        {
            let client = self.client.clone();
            let url = url.to_string();
            let request = request.clone();
            let outcome = Arc::clone(&outcome);
            thread::Builder::new()
                .name("urlipranges-fetch".to_string())
                .spawn(move || {
                    *outcome.lock() = Some(get_prefix_list(&client, &url));
                    request.cancel();
                })
                .map_err(Error::Thread)?;
        }

        request.wait();
        let result = outcome.lock().take();
        result.unwrap_or_else(|| {
            info!("Abandoned in-flight request to {} on shutdown", url);
            Err(Error::Cancelled)
        })
    }
}

fn build_client(
    user_agent: &str,
    timeout: Option<Duration>,
) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(Error::Client)
}

/*
    GET `url` and stream a 2xx body through the line parser. The body of a non-2xx
    response is discarded unread.
*/
fn get_prefix_list(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<IpNetwork>> {
    let response = client.get(url).send().map_err(|source| Error::Transport {
        url: url.to_string(),
        source: Box::new(source),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    parse_lines(BufReader::new(response)).map_err(|error| match error {
        Error::Read(source) => Error::Transport {
            url: url.to_string(),
            source: Box::new(source),
        },
        error => error,
    })
}

/*-------------------------------------------------------------------------------------------------
  Aggregator
-------------------------------------------------------------------------------------------------*/

/// Fetches every configured source in order and concatenates the results. The first
/// failing source fails the whole aggregation.
#[derive(Debug, Clone)]
pub struct Aggregator {
    urls: Vec<String>,
    fetcher: Fetcher,
}

impl Aggregator {
    pub fn new(config: &Config, shutdown: Shutdown) -> Result<Self> {
        Ok(Self {
            urls: config.urls().to_vec(),
            fetcher: Fetcher::new(config, shutdown)?,
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn get_prefixes(&self) -> Result<Vec<IpNetwork>> {
        let mut prefixes = Vec::new();
        for url in &self.urls {
            prefixes.extend(self.fetcher.fetch(url)?);
        }
        Ok(prefixes)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
