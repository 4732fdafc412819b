use ipnetwork::IpNetwork;
use parking_lot::RwLock;
use std::sync::Arc;

/*-------------------------------------------------------------------------------------------------
  Range Store
-------------------------------------------------------------------------------------------------*/

/// The published prefix set shared between the refresher and readers.
///
/// Each published set is immutable; [RangeStore::set] swaps in a new `Arc` so readers
/// holding an older snapshot keep a complete, consistent view.
#[derive(Debug)]
pub struct RangeStore {
    ranges: RwLock<Arc<[IpNetwork]>>,
}

impl RangeStore {
    pub fn new(prefixes: Vec<IpNetwork>) -> Self {
        Self {
            ranges: RwLock::new(prefixes.into()),
        }
    }

    /// Current published snapshot.
    pub fn get(&self) -> Arc<[IpNetwork]> {
        self.ranges.read().clone()
    }

    /// Publish a new prefix set, replacing the previous one wholesale.
    pub fn set(&self, prefixes: impl Into<Arc<[IpNetwork]>>) {
        let prefixes = prefixes.into();
        *self.ranges.write() = prefixes;
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
