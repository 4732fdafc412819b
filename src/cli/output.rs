use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;
use std::net::IpAddr;
use urlipranges::ipnetwork::IpNetwork;

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

pub fn ip_version(prefix: &IpNetwork) -> &'static str {
    match prefix {
        IpNetwork::V4(_) => "IPv4",
        IpNetwork::V6(_) => "IPv6",
    }
}

/*--------------------------------------------------------------------------------------
  Prefix Table
--------------------------------------------------------------------------------------*/

pub fn prefix_table(prefixes: &[IpNetwork]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("IP Prefix")
            .add_attribute(Attribute::Bold)
            .fg(Color::Green),
        Cell::new("Version")
            .add_attribute(Attribute::Bold)
            .fg(Color::Green),
        Cell::new("Network Mask")
            .add_attribute(Attribute::Bold)
            .fg(Color::Green),
    ]);

    for prefix in prefixes {
        table.add_row(vec![
            Cell::new(prefix).add_attribute(Attribute::Bold),
            Cell::new(ip_version(prefix)),
            Cell::new(prefix.mask()),
        ]);
    }

    // Right-align the IP Prefix column
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{table}");

    // Print prefix-table summary
    let ipv4_count = prefixes.iter().filter(|prefix| prefix.is_ipv4()).count();
    let ipv6_count = prefixes.len() - ipv4_count;

    let mut summary_table = Table::new();
    summary_table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    summary_table.add_row(vec![Cell::new(ipv4_count), Cell::new("IPv4 Prefixes")]);
    summary_table.add_row(vec![Cell::new(ipv6_count), Cell::new("IPv6 Prefixes")]);

    if let Some(column) = summary_table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{summary_table}");
}

/*--------------------------------------------------------------------------------------
  Prefixes In CIDR Format
--------------------------------------------------------------------------------------*/

pub fn prefixes_in_cidr_format(prefixes: &[IpNetwork]) {
    for prefix in prefixes {
        println!("{}", prefix);
    }
}

/*--------------------------------------------------------------------------------------
  Prefixes In Netmask Format
--------------------------------------------------------------------------------------*/

pub fn prefixes_in_netmask_format(prefixes: &[IpNetwork]) {
    for prefix in prefixes {
        println!("{} {}", prefix.network(), prefix.mask());
    }
}

/*--------------------------------------------------------------------------------------
  Containment Results
--------------------------------------------------------------------------------------*/

pub fn containment_results(results: &[(IpAddr, Option<IpNetwork>)]) {
    for (address, prefix) in results {
        match prefix {
            Some(prefix) => println!("{address} in {prefix}"),
            None => println!("{address} not found"),
        }
    }
}
