use crate::cli;
use std::net::IpAddr;
use urlipranges::ipnetwork::IpNetwork;
use urlipranges::{Config, ConfigBuilder};

/*-------------------------------------------------------------------------------------------------
  Core functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Build the configuration from the environment and CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_config(args: &cli::Args) -> Config {
    let mut builder = ConfigBuilder::new();

    if !args.urls.is_empty() {
        builder.urls(args.urls.iter().cloned());
    }
    if let Some(interval) = args.interval {
        builder.interval(interval);
    }
    if let Some(timeout) = args.timeout {
        builder.timeout(timeout);
    }
    if let Some(retries) = args.retries {
        builder.retries(retries);
    }
    if let Some(retry_delay) = args.retry_delay {
        builder.retry_delay(retry_delay);
    }
    if let Some(cache_file) = &args.cache_file {
        builder.cache_file(cache_file);
    }

    builder.build()
}

/*--------------------------------------------------------------------------------------
  Find the prefixes containing each searched address
--------------------------------------------------------------------------------------*/

pub fn find_containing_prefixes(
    addresses: &[IpAddr],
    prefixes: &[IpNetwork],
) -> Vec<(IpAddr, Option<IpNetwork>)> {
    addresses
        .iter()
        .map(|address| {
            // Longest match wins when prefixes overlap
            let prefix = prefixes
                .iter()
                .filter(|prefix| prefix.contains(*address))
                .max_by_key(|prefix| prefix.prefix())
                .copied();
            (*address, prefix)
        })
        .collect()
}
