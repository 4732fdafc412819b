use crate::core::duration;
use crate::core::errors::{Error, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Defaults
-------------------------------------------------------------------------------------------------*/

/// Refresh interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Fixed delay between fetch attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

fn default_retry_delay() -> Duration {
    DEFAULT_RETRY_DELAY
}

/*-------------------------------------------------------------------------------------------------
  Config
-------------------------------------------------------------------------------------------------*/

/// Typed configuration for a [UrlIpRanges](crate::UrlIpRanges) instance.
///
/// Deserializes from the host's JSON configuration shape:
///
/// ```
/// let config: urlipranges::Config = serde_json::from_str(
///     r#"{
///         "url": ["https://www.cloudflare.com/ips-v4"],
///         "interval": "1.5h",
///         "timeout": "30s",
///         "retries": 2
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.interval(), std::time::Duration::from_secs(90 * 60));
/// assert_eq!(config.retries(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Source URLs, fetched and concatenated in order.
    #[serde(rename = "url", default)]
    urls: Vec<String>,

    #[serde(
        default,
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    interval: Option<Duration>,

    #[serde(
        default,
        with = "duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    timeout: Option<Duration>,

    #[serde(default)]
    retries: u32,

    #[serde(default = "default_retry_delay", with = "duration")]
    retry_delay: Duration,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cache_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        ConfigBuilder::default().build()
    }
}

impl Config {
    /// Build a configuration for a list of URLs, using defaults for every other
    /// setting.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigBuilder::default().urls(urls).build()
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// Source URLs in aggregation order.
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Refresh interval; defaults to one hour.
    pub fn interval(&self) -> Duration {
        match self.interval {
            Some(interval) if !interval.is_zero() => interval,
            _ => DEFAULT_INTERVAL,
        }
    }

    /// Per-attempt request deadline; `None` waits indefinitely.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }

    /// Extra attempts beyond the first, per URL per refresh cycle.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Total attempts allowed per URL per refresh cycle.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay between a failed attempt and the next one.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Explicit cache file location, if configured.
    pub fn cache_file(&self) -> Option<&Path> {
        self.cache_file.as_deref()
    }

    /*-------------------------------------------------------------------------
      Validation
    -------------------------------------------------------------------------*/

    /// Check the configuration can drive a fetch: at least one URL, and every URL
    /// an absolute `http` or `https` URL.
    pub fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            return Err(Error::Config("at least one source URL is required".into()));
        }

        for url in &self.urls {
            let parsed = reqwest::Url::parse(url)
                .map_err(|error| Error::Config(format!("invalid URL {url:?}: {error}")))?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(Error::Config(format!(
                    "URL {url:?} is not an http(s) endpoint"
                )));
            }
        }

        Ok(())
    }
}

/*-------------------------------------------------------------------------------------------------
  Config Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for [Config].
///
/// ```
/// let config = urlipranges::ConfigBuilder::default()
///     .url("https://www.cloudflare.com/ips-v4")
///     .url("https://www.cloudflare.com/ips-v6")
///     .interval(std::time::Duration::from_secs(30 * 60))
///     .timeout(std::time::Duration::from_secs(10))
///     .retries(2)
///     .cache_file("/tmp/cloudflare-ranges.json")
///     .build();
///
/// assert_eq!(config.urls().len(), 2);
/// assert_eq!(config.max_attempts(), 3);
/// ```
///
/// [ConfigBuilder::new] sources initial values from environment variables when they
/// are set; [ConfigBuilder::default] ignores the environment.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    urls: Vec<String>,
    interval: Option<Duration>,
    timeout: Option<Duration>,
    retries: u32,
    retry_delay: Duration,
    cache_file: Option<PathBuf>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            interval: None,
            timeout: None,
            retries: 0,
            retry_delay: DEFAULT_RETRY_DELAY,
            cache_file: None,
        }
    }
}

impl ConfigBuilder {
    /// Create a new [ConfigBuilder] reading initial values from these environment
    /// variables, when set:
    /// - `URLIPRANGES_URLS` (comma separated)
    /// - `URLIPRANGES_INTERVAL`
    /// - `URLIPRANGES_TIMEOUT`
    /// - `URLIPRANGES_RETRIES`
    /// - `URLIPRANGES_RETRY_DELAY`
    /// - `URLIPRANGES_CACHE_FILE`
    pub fn new() -> Self {
        let default = ConfigBuilder::default();

        Self {
            urls: get_env_list("URLIPRANGES_URLS").unwrap_or(default.urls),
            interval: get_env_duration("URLIPRANGES_INTERVAL").or(default.interval),
            timeout: get_env_duration("URLIPRANGES_TIMEOUT").or(default.timeout),
            retries: get_env_var("URLIPRANGES_RETRIES", default.retries),
            retry_delay: get_env_duration("URLIPRANGES_RETRY_DELAY")
                .unwrap_or(default.retry_delay),
            cache_file: env::var_os("URLIPRANGES_CACHE_FILE")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .inspect(|path| info!("Using URLIPRANGES_CACHE_FILE: {:?}", path))
                .or(default.cache_file),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Append a source URL.
    pub fn url(&mut self, url: &str) -> &mut Self {
        self.urls.push(url.to_string());
        self
    }

    /// Replace the source URL list.
    pub fn urls<I, S>(&mut self, urls: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Set the refresh interval; defaults to one hour.
    pub fn interval(&mut self, interval: Duration) -> &mut Self {
        self.interval = Some(interval);
        self
    }

    /// Set the per-attempt request deadline; unbounded by default.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the number of extra attempts per URL; defaults to `0`.
    pub fn retries(&mut self, retries: u32) -> &mut Self {
        self.retries = retries;
        self
    }

    /// Set the delay between attempts; defaults to one second.
    pub fn retry_delay(&mut self, retry_delay: Duration) -> &mut Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Override the derived cache file location.
    pub fn cache_file<P: AsRef<Path>>(&mut self, cache_file: P) -> &mut Self {
        self.cache_file = Some(cache_file.as_ref().to_path_buf());
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    pub fn build(&self) -> Config {
        Config {
            urls: self.urls.clone(),
            interval: self.interval,
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            cache_file: self.cache_file.clone(),
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value or return a default value.
fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/// Get and parse a duration environment variable.
fn get_env_duration(env_var: &str) -> Option<Duration> {
    env::var(env_var).ok().and_then(|value| {
        duration::parse(&value)
            .inspect(|_| info!("Using {}: {}", env_var, value))
            .inspect_err(|error| warn!("Invalid {}: {}: {}", env_var, value, error))
            .ok()
    })
}

/// Get a comma separated list environment variable; blank entries are dropped.
fn get_env_list(env_var: &str) -> Option<Vec<String>> {
    let value = env::var(env_var).ok()?;
    let items: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();

    if items.is_empty() {
        warn!("Invalid {}: {:?}", env_var, value);
        None
    } else {
        info!("Using {}: {}", env_var, value);
        Some(items)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use env::VarError;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let config = Config::from_urls(["https://example.com/ips"]);
        assert_eq!(config.interval(), DEFAULT_INTERVAL);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.retries(), 0);
        assert_eq!(config.max_attempts(), 1);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.cache_file(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_getter_and_setter_methods() {
        let config = ConfigBuilder::default()
            .url("https://example.com/ips-v4")
            .url("https://example.com/ips-v6")
            .interval(Duration::from_secs(90 * 60))
            .timeout(Duration::from_secs(30))
            .retries(2)
            .retry_delay(Duration::from_millis(10))
            .cache_file("./scratch/test_getter_and_setter_methods.json")
            .build();

        assert_eq!(
            config.urls(),
            ["https://example.com/ips-v4", "https://example.com/ips-v6"]
        );
        assert_eq!(config.interval(), Duration::from_secs(90 * 60));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.retries(), 2);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(10));
        assert_eq!(
            config.cache_file(),
            Some(Path::new("./scratch/test_getter_and_setter_methods.json"))
        );
    }

    #[test]
    fn test_zero_interval_and_timeout_use_defaults() {
        let config = ConfigBuilder::default()
            .url("https://example.com/ips")
            .interval(Duration::ZERO)
            .timeout(Duration::ZERO)
            .build();
        assert_eq!(config.interval(), DEFAULT_INTERVAL);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_validate() {
        assert!(matches!(Config::default().validate(), Err(Error::Config(_))));
        assert!(Config::from_urls(["not a url"]).validate().is_err());
        assert!(Config::from_urls(["ftp://example.com/ips"]).validate().is_err());
        assert!(Config::from_urls(["http://127.0.0.1:8080/ips"])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_deserialize_host_json() {
        let config: Config = serde_json::from_str(
            r#"{
                "url": ["https://www.cloudflare.com/ips-v4"],
                "interval": "1.5h",
                "timeout": 30000000000,
                "retries": 2,
                "cache_file": "/var/cache/ranges.json"
            }"#,
        )
        .unwrap();

        assert_eq!(config.urls(), ["https://www.cloudflare.com/ips-v4"]);
        assert_eq!(config.interval(), Duration::from_secs(90 * 60));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.retries(), 2);
        assert_eq!(config.retry_delay(), DEFAULT_RETRY_DELAY);
        assert_eq!(config.cache_file(), Some(Path::new("/var/cache/ranges.json")));

        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_deserialize_rejects_bad_duration() {
        let result =
            serde_json::from_str::<Config>(r#"{"url": ["https://a/"], "interval": "soon"}"#);
        assert!(result.is_err());
    }

    /// ENV_VAR: URLIPRANGES_URLS
    /// ENV_VAR: URLIPRANGES_INTERVAL
    /// ENV_VAR: URLIPRANGES_TIMEOUT
    /// ENV_VAR: URLIPRANGES_RETRIES
    /// ENV_VAR: URLIPRANGES_RETRY_DELAY
    /// ENV_VAR: URLIPRANGES_CACHE_FILE
    #[test]
    fn test_environment_variable_configuration() {
        let test_env_vars = [
            (
                "URLIPRANGES_URLS",
                "https://example.com/ips-v4, https://example.com/ips-v6",
            ),
            ("URLIPRANGES_INTERVAL", "15m"),
            ("URLIPRANGES_TIMEOUT", "5s"),
            ("URLIPRANGES_RETRIES", "3"),
            ("URLIPRANGES_RETRY_DELAY", "100ms"),
            (
                "URLIPRANGES_CACHE_FILE",
                "./scratch/test_environment_variable_configuration.json",
            ),
        ];

        // Store environment variable values
        let stored_env_vars: Vec<(String, std::result::Result<String, VarError>)> = test_env_vars
            .iter()
            .map(|(env_var, _)| (env_var.to_string(), env::var(env_var)))
            .collect();

        // Unset all environment variables
        test_env_vars
            .iter()
            .for_each(|(env_var, _)| env::remove_var(env_var));

        let default = ConfigBuilder::default().build();
        let new = ConfigBuilder::new().build();
        assert_eq!(new, default);

        // Set all environment variables
        for (env_var, value) in test_env_vars.iter() {
            env::set_var(env_var, value);
        }

        let env_config = ConfigBuilder::new().build();
        assert_eq!(
            env_config.urls(),
            ["https://example.com/ips-v4", "https://example.com/ips-v6"]
        );
        assert_eq!(env_config.interval(), Duration::from_secs(15 * 60));
        assert_eq!(env_config.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(env_config.retries(), 3);
        assert_eq!(env_config.retry_delay(), Duration::from_millis(100));
        assert_eq!(
            env_config.cache_file(),
            Some(Path::new(
                "./scratch/test_environment_variable_configuration.json"
            ))
        );

        // Invalid values fall back to defaults
        env::set_var("URLIPRANGES_RETRIES", "many");
        env::set_var("URLIPRANGES_INTERVAL", "often");
        let invalid_config = ConfigBuilder::new().build();
        assert_eq!(invalid_config.retries(), 0);
        assert_eq!(invalid_config.interval(), DEFAULT_INTERVAL);

        // Reset environment variables
        for (env_var, value) in stored_env_vars {
            match value {
                Ok(value) => env::set_var(env_var, value),
                Err(VarError::NotPresent) => env::remove_var(env_var),
                Err(VarError::NotUnicode(value)) => env::set_var(env_var, value),
            }
        }
    }
}
