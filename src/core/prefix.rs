use crate::core::errors::{Error, Result};
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use std::io::{BufRead, ErrorKind};
use std::net::IpAddr;

/*-------------------------------------------------------------------------------------------------
  CIDR Expressions
-------------------------------------------------------------------------------------------------*/

/// Parse a CIDR expression (`10.0.0.0/8`, `2001:db8::/32`, or a bare address) into a
/// canonical network prefix with all host bits cleared.
pub fn parse_cidr(expression: &str) -> Result<IpNetwork> {
    let invalid = || Error::Parse {
        line: expression.to_string(),
    };

    let (address, mask_bits) = match expression.split_once('/') {
        Some((address, mask_bits)) => {
            if mask_bits.is_empty() || !mask_bits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let address: IpAddr = address.parse().map_err(|_| invalid())?;
            let mask_bits: u8 = mask_bits.parse().map_err(|_| invalid())?;
            (address, mask_bits)
        }
        None => {
            let address: IpAddr = expression.parse().map_err(|_| invalid())?;
            let mask_bits = match address {
                IpAddr::V4(_) => 32,
                IpAddr::V6(_) => 128,
            };
            (address, mask_bits)
        }
    };

    let network = IpNetwork::new(address, mask_bits).map_err(|_| invalid())?;
    network_prefix(&network).ok_or_else(invalid)
}

/*
    IpNetwork keeps the host bits of the address it was built from. Rebuild the
    prefix from its network address so `10.1.2.3/8` and `10.0.0.0/8` compare equal.
*/
fn network_prefix(ip_network: &IpNetwork) -> Option<IpNetwork> {
    match ip_network {
        IpNetwork::V4(ipv4_network) => {
            Ipv4Network::new(ipv4_network.network(), ipv4_network.prefix())
                .ok()
                .map(IpNetwork::V4)
        }
        IpNetwork::V6(ipv6_network) => {
            Ipv6Network::new(ipv6_network.network(), ipv6_network.prefix())
                .ok()
                .map(IpNetwork::V6)
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Line Parser
-------------------------------------------------------------------------------------------------*/

/// Parse one line of a prefix list. Text from the first `#` onward is a comment;
/// blank and comment-only lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<IpNetwork>> {
    let content = match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    };

    let content = content.trim();
    if content.is_empty() {
        return Ok(None);
    }

    parse_cidr(content).map(Some)
}

/// Stream a prefix list through the line parser. The first invalid line fails the
/// whole list.
///
/// A line that is not valid UTF-8 is a [Error::Parse]; any other failure of the
/// underlying reader is an [Error::Read].
pub fn parse_lines<R: BufRead>(reader: R) -> Result<Vec<IpNetwork>> {
    let mut prefixes = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|error| match error.kind() {
            ErrorKind::InvalidData => Error::Parse {
                line: format!("<invalid UTF-8: {error}>"),
            },
            _ => Error::Read(error),
        })?;
        if let Some(prefix) = parse_line(&line)? {
            prefixes.push(prefix);
        }
    }
    Ok(prefixes)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
