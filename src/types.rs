//! Domain-specific newtypes for type safety.
//!
//! Play durations and play counts are both plain integers in the export, and
//! the aggregations sum both. Wrapping them keeps a count from being added
//! to a duration. Uses `derive_more` for the arithmetic boilerplate.

use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;

use derive_more::{Add as DeriveAdd, From, Into};

// ============================================================================
// Macros for reducing boilerplate
// ============================================================================

/// Generates common methods for unsigned numeric newtypes.
macro_rules! impl_newtype_common {
    ($type:ty) => {
        impl $type {
            /// Create a new instance.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Get the inner value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Check if the value is zero.
            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }
        }

        impl AddAssign for $type {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::default(), |acc, x| acc + x)
            }
        }

        impl<'a> Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }
    };
}

// ============================================================================
// PlayCount
// ============================================================================

/// A play count value.
///
/// Represents the number of times a track or artist has been played.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveAdd, From, Into,
)]
pub struct PlayCount(pub u64);

impl_newtype_common!(PlayCount);

impl PlayCount {
    /// Count one more play.
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

impl fmt::Display for PlayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// Milliseconds
// ============================================================================

/// A duration in milliseconds, as `ms_played` is recorded in the export.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, DeriveAdd, From, Into,
)]
pub struct Milliseconds(pub u64);

impl_newtype_common!(Milliseconds);

impl Milliseconds {
    /// Convert to minutes as a floating point value.
    #[must_use]
    pub fn as_minutes_f64(self) -> f64 {
        self.0 as f64 / 60_000.0
    }

    /// Convert to hours as a floating point value.
    #[must_use]
    pub fn as_hours_f64(self) -> f64 {
        self.0 as f64 / 3_600_000.0
    }

    /// Whole minutes, rounded down.
    #[must_use]
    pub const fn whole_minutes(self) -> u64 {
        self.0 / 60_000
    }

    /// Create from minutes.
    #[must_use]
    pub const fn from_mins(mins: u64) -> Self {
        Self(mins * 60 * 1000)
    }
}

impl fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_seconds = self.0 / 1000;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        match (hours, minutes) {
            (0, 0) => write!(f, "{seconds}s"),
            (0, _) => write!(f, "{minutes}m {seconds}s"),
            _ => write!(f, "{hours}h {minutes}m {seconds}s"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
