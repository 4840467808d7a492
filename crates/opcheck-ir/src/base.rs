//! Base index type for operation arenas.

use serde::{Deserialize, Serialize};

/// Index of an operation in an [`OperationArena`](crate::OperationArena).
///
/// `OperationIndex::NONE` marks an absent child or the parent of a root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationIndex(pub u32);

impl OperationIndex {
    pub const NONE: OperationIndex = OperationIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Convert to `Option`, mapping `NONE` to `None`.
    #[inline]
    pub const fn into_option(self) -> Option<OperationIndex> {
        if self.is_none() { None } else { Some(self) }
    }
}

impl Default for OperationIndex {
    fn default() -> Self {
        OperationIndex::NONE
    }
}

impl std::fmt::Display for OperationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            f.write_str("<none>")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}
