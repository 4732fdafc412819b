use std::path::Path;
use urlipranges::ipnetwork::IpNetwork;

/*-------------------------------------------------------------------------------------------------
  Save IP Prefixes to CSV File
-------------------------------------------------------------------------------------------------*/

pub fn save(prefixes: &[IpNetwork], path: &Path) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.serialize(["IP Prefix", "Version", "Network Mask"])?;

    // Write prefix records
    for prefix in prefixes {
        let record = (
            prefix.to_string(),
            crate::cli::output::ip_version(prefix),
            prefix.mask().to_string(),
        );
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}
