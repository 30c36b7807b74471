use std::fmt;

use crate::models::DestinationSet;

/// Changes required to turn the actual set into the desired set
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    pub add: DestinationSet,
    pub remove: DestinationSet,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<Diff add={} remove={}>", self.add.len(), self.remove.len())
    }
}

/// Compare destination sets by full value (prefix, mask & next hop).
/// A prefix whose next hop changed shows up in both `remove` and `add`.
pub fn diff(actual: &DestinationSet, desired: &DestinationSet) -> Diff {
    Diff {
        add: desired.difference(actual),
        remove: actual.difference(desired),
    }
}
