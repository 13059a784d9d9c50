//! Strongly typed identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can key maps and break ties in
//! the planner's heap deterministically.  `WaypointId` doubles as a direct
//! index into the road network's waypoint table via `.index()`, and `EdgeId`
//! into its edge arrays.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
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
    /// Index of a waypoint in the road network.
    pub struct WaypointId(u32);
}

typed_id! {
    /// Index of a directed edge in the road network's CSR arrays.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Identifier of a lane (a chain of consecutive waypoints).
    pub struct LaneId(u32);
}

typed_id! {
    /// Identifier of a detected object, as assigned by the perception source.
    pub struct ObjectId(u32);
}

typed_id! {
    /// Identifier of a traffic light and its stop line.
    pub struct LightId(u32);
}
