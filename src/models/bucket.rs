// Routing-table models parsed from node logs

use std::fmt;

/// One k-bucket entry as printed in a `kBucketTable` log line: `(depth, occupants, capacity)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingBucketSample {
    pub depth: u32,
    pub occupant_count: u32,
    pub bucket_capacity: u32,
}

impl RoutingBucketSample {
    /// Returns `None` when the triple breaks `occupant_count <= bucket_capacity` or has no capacity.
    pub fn new(depth: u32, occupant_count: u32, bucket_capacity: u32) -> Option<Self> {
        if bucket_capacity == 0 || occupant_count > bucket_capacity {
            return None;
        }
        Some(Self {
            depth,
            occupant_count,
            bucket_capacity,
        })
    }
}

/// One node's estimate of the total network size. Always >= 1 (the node counts itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeEstimate(u64);

impl NodeEstimate {
    /// A node that sees no peers.
    pub const SELF_ONLY: NodeEstimate = NodeEstimate(1);

    pub fn new(value: u64) -> Self {
        Self(value.max(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<NodeEstimate> for u64 {
    fn from(e: NodeEstimate) -> Self {
        e.0
    }
}

impl fmt::Display for NodeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
