use log::{info, warn};
use std::net::IpAddr;
use urlipranges::ipnetwork::IpNetwork;

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Containment Results
--------------------------------------------------------------------------------------*/

pub fn containment_results(results: &[(IpAddr, Option<IpNetwork>)]) {
    if results.is_empty() {
        return;
    }

    let found = results.iter().filter(|(_, prefix)| prefix.is_some()).count();
    info!("Searched for {} address(es) in the IP ranges", results.len());

    if found > 0 {
        info!("Found {found} address(es) inside the IP ranges");
    };

    let not_found = results.len() - found;
    if not_found > 0 {
        warn!("Did not find {not_found} address(es)");
    };
}
