//! Strongly typed, zero-cost identifier wrappers.
//!
//! Agents, conflicts, and stop lines are addressed by opaque integer handles
//! rather than printable names.  A handle doubles as an index into the arena
//! (`Vec`) that owns the corresponding per-entity state, so lookups are O(1)
//! and never allocate.  All IDs are `Copy + Ord + Hash` so they can be used as
//! map keys without ceremony.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as an arena index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Handle of a simulated agent (vehicle).  Indexes per-agent arenas such
    /// as the conflict-plan memory.
    pub struct AgentId(u32);
}

typed_id! {
    /// Handle of a conflict area (merge, crossing, or split).
    pub struct ConflictId(u32);
}

typed_id! {
    /// Handle of a stop line governing one or more conflicts.
    pub struct StopLineId(u32);
}
