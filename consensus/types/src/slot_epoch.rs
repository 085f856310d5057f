//! `Slot` and `Epoch` are newtypes over `u64` so that the two concepts can never be confused at
//! the type level (a classic source of off-by-one bugs in clock-driven consensus code).

use serde_derive::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use tree_hash_derive::TreeHash;

macro_rules! new_type_u64 {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            Encode,
            Decode,
            TreeHash,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(n: u64) -> Self {
                Self(n)
            }

            pub const fn max_value() -> Self {
                Self(u64::max_value())
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }

            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }

            pub fn saturating_sub(&self, other: impl Into<Self>) -> Self {
                Self(self.0.saturating_sub(other.into().0))
            }

            pub fn checked_sub(&self, other: impl Into<Self>) -> Option<Self> {
                self.0.checked_sub(other.into().0).map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(n: u64) -> Self {
                Self(n)
            }
        }

        impl From<$name> for u64 {
            fn from(n: $name) -> Self {
                n.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Add<u64> for $name {
            type Output = Self;
            fn add(self, rhs: u64) -> Self {
                Self(self.0 + rhs)
            }
        }

        impl AddAssign<u64> for $name {
            fn add_assign(&mut self, rhs: u64) {
                self.0 += rhs;
            }
        }

        impl Sub<u64> for $name {
            type Output = Self;
            fn sub(self, rhs: u64) -> Self {
                Self(self.0 - rhs)
            }
        }

        impl SubAssign<u64> for $name {
            fn sub_assign(&mut self, rhs: u64) {
                self.0 -= rhs;
            }
        }

        impl Sub<$name> for $name {
            type Output = Self;
            fn sub(self, rhs: $name) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Add<$name> for $name {
            type Output = Self;
            fn add(self, rhs: $name) -> Self {
                Self(self.0 + rhs.0)
            }
        }
    };
}

new_type_u64!(Slot);
new_type_u64!(Epoch);

impl Slot {
    /// Returns the epoch that `self` falls within, given `slots_per_epoch`.
    pub fn epoch(&self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0 / slots_per_epoch)
    }

    /// Returns `true` if `self` is the first slot of its epoch.
    pub fn is_epoch_start(&self, slots_per_epoch: u64) -> bool {
        self.0 % slots_per_epoch == 0
    }
}

impl Epoch {
    /// Returns the slot at the start of `self`.
    pub fn start_slot(&self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.0 * slots_per_epoch)
    }

    /// Returns the slot one before the start of `self + 1`, i.e. the last slot of the epoch.
    pub fn end_slot(&self, slots_per_epoch: u64) -> Slot {
        Slot::new((self.0 + 1) * slots_per_epoch - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_of_slot() {
        assert_eq!(Slot::new(0).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(31).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(32).epoch(32), Epoch::new(1));
        assert_eq!(Slot::new(63).epoch(32), Epoch::new(1));
    }

    #[test]
    fn start_slot_of_epoch() {
        assert_eq!(Epoch::new(0).start_slot(32), Slot::new(0));
        assert_eq!(Epoch::new(2).start_slot(32), Slot::new(64));
    }

    #[test]
    fn epoch_start_detection() {
        assert!(Slot::new(64).is_epoch_start(32));
        assert!(!Slot::new(65).is_epoch_start(32));
    }
}
