use clap::{Parser, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(author, version, about="Fetch and cache IP prefix lists.", long_about = None)]
pub struct Args {
    /// Refresh interval (e.g. 30m, 1.5h)
    #[arg(long, value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// Per-attempt request timeout (e.g. 10s)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Extra attempts per URL after the first fails
    #[arg(long)]
    pub retries: Option<u32>,

    /// Delay between attempts (e.g. 500ms)
    #[arg(long, value_parser = parse_duration)]
    pub retry_delay: Option<Duration>,

    /// Cache file path; derived from the URL list by default
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Cidr)]
    pub output: OutputFormat,

    /// Save the prefixes to a CSV file
    #[arg(long = "csv")]
    pub csv_file: Option<PathBuf>,

    /// Report whether these IP addresses fall inside the prefix set
    #[arg(long = "contains")]
    pub contains: Vec<IpAddr>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// Source URLs; defaults to URLIPRANGES_URLS
    pub urls: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// List of CIDR-format prefixes
    Cidr,
    /// List of networks in network mask format (n.n.n.n m.m.m.m)
    Netmask,
    /// Table of prefixes with a summary
    Table,
    /// No prefix output
    None,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    urlipranges::duration::parse(value)
}
