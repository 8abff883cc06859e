//! Administrative powers and the bitset they are stored as.
//!
//! Every [`Power`] owns one bit of a `u32`. An admin account carries a
//! [`PowerSet`], which travels over the wire and sits in the database as a
//! plain integer. All bit manipulation lives in this module.
//!
//! # Example
//!
//! ```ignore
//! use labsys_core::permissions::{Power, PowerSet};
//!
//! let powers = PowerSet::from_raw(0b101)?;
//! assert!(powers.own(Power::AdminManage));
//! assert!(powers.own(Power::ClassManage));
//! assert_eq!(powers.to_raw(), 5);
//!
//! // Bit 5 is not in the catalog
//! assert!(PowerSet::from_raw(32).is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// A single administrative capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Power {
    /// Create and list admin accounts
    AdminManage,
    /// Create teacher accounts
    TeacherManage,
    /// Create and list classes
    ClassManage,
    /// List and delete user accounts
    UserManage,
    /// Manage laboratories and their schedules
    LabManage,
}

impl Power {
    /// The full catalog, in bit order. Clients render the permissions matrix
    /// in this order.
    pub const ALL: [Power; 5] = [
        Power::AdminManage,
        Power::TeacherManage,
        Power::ClassManage,
        Power::UserManage,
        Power::LabManage,
    ];

    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Power::AdminManage => 1,
            Power::TeacherManage => 1 << 1,
            Power::ClassManage => 1 << 2,
            Power::UserManage => 1 << 3,
            Power::LabManage => 1 << 4,
        }
    }

    /// Human readable name shown in the permissions matrix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Power::AdminManage => "admin management",
            Power::TeacherManage => "teacher management",
            Power::ClassManage => "class management",
            Power::UserManage => "user management",
            Power::LabManage => "lab management",
        }
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Union of every bit in [`Power::ALL`].
pub const KNOWN_BITS: u32 = {
    let mut bits = 0;
    let mut i = 0;
    while i < Power::ALL.len() {
        bits |= Power::ALL[i].bit();
        i += 1;
    }
    bits
};

/// A raw power integer carried bits outside the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("power value {raw} contains unknown capability bits {unknown:#x}")]
pub struct InvalidCapability {
    pub raw: i64,
    pub unknown: i64,
}

/// The set of powers granted to an admin account.
///
/// Serialized as the bare integer. Deserialization goes through
/// [`PowerSet::from_raw`], so an integer with unknown bits never becomes a
/// `PowerSet`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, ToSchema)]
#[schema(value_type = u32)]
pub struct PowerSet(u32);

impl PowerSet {
    pub const EMPTY: PowerSet = PowerSet(0);
    /// Every power in the catalog. Granted to the bootstrap root admin.
    pub const ALL: PowerSet = PowerSet(KNOWN_BITS);

    /// Decodes a raw integer.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCapability`] when `raw` is negative or has any bit set
    /// outside [`KNOWN_BITS`]. Unknown bits are never silently dropped.
    pub fn from_raw(raw: i64) -> Result<Self, InvalidCapability> {
        let unknown = raw & !i64::from(KNOWN_BITS);
        if unknown != 0 {
            return Err(InvalidCapability { raw, unknown });
        }
        // only bits of KNOWN_BITS remain, which fit in a u32
        Ok(Self(raw as u32))
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn to_raw(self) -> i64 {
        self.0 as i64
    }

    #[must_use]
    pub const fn own(self, power: Power) -> bool {
        self.0 & power.bit() != 0
    }

    #[must_use]
    pub const fn with(self, power: Power) -> Self {
        Self(self.0 | power.bit())
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Owned powers, in catalog order.
    pub fn iter(self) -> impl Iterator<Item = Power> {
        Power::ALL.into_iter().filter(move |power| self.own(*power))
    }

    /// The full catalog with the grant status of each power.
    #[must_use]
    pub fn matrix(self) -> Vec<PowerOwner> {
        Power::ALL
            .into_iter()
            .map(|power| PowerOwner {
                name: power.name().to_string(),
                power: power.bit(),
                own: self.own(power),
            })
            .collect()
    }
}

impl FromIterator<Power> for PowerSet {
    fn from_iter<I: IntoIterator<Item = Power>>(iter: I) -> Self {
        iter.into_iter().fold(PowerSet::EMPTY, PowerSet::with)
    }
}

impl fmt::Debug for PowerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PowerSet({:#07b}) ", self.0)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Serialize for PowerSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for PowerSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        PowerSet::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

/// One row of the permissions matrix returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PowerOwner {
    pub name: String,
    /// The power's bit value
    pub power: u32,
    pub own: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_catalog_bits_are_distinct_powers_of_two() {
        let mut seen = 0u32;
        for power in Power::ALL {
            assert!(power.bit().is_power_of_two(), "{power:?}");
            assert_eq!(seen & power.bit(), 0, "{power:?} reuses a bit");
            seen |= power.bit();
        }
        assert_eq!(seen, KNOWN_BITS);
        assert_eq!(KNOWN_BITS, 0b11111);
    }

    #[test]
    fn test_from_raw_known_bits() {
        let powers = PowerSet::from_raw(3).unwrap();
        assert!(powers.own(Power::AdminManage));
        assert!(powers.own(Power::TeacherManage));
        assert!(!powers.own(Power::ClassManage));
        assert!(!powers.own(Power::UserManage));
        assert!(!powers.own(Power::LabManage));
        assert_eq!(powers.to_raw(), 3);
    }

    #[test]
    fn test_from_raw_zero_is_empty() {
        let powers = PowerSet::from_raw(0).unwrap();
        assert!(powers.is_empty());
        assert_eq!(powers, PowerSet::EMPTY);
        assert_eq!(powers.iter().count(), 0);
    }

    #[test]
    fn test_from_raw_rejects_unknown_bit() {
        let err = PowerSet::from_raw(32).unwrap_err();
        assert_eq!(err.raw, 32);
        assert_eq!(err.unknown, 32);
    }

    #[test]
    fn test_from_raw_rejects_mixed_known_and_unknown() {
        let err = PowerSet::from_raw(32 | 1).unwrap_err();
        assert_eq!(err.unknown, 32);
    }

    #[test]
    fn test_from_raw_rejects_negative() {
        assert!(PowerSet::from_raw(-1).is_err());
        assert!(PowerSet::from_raw(i64::MIN).is_err());
    }

    #[test]
    fn test_all_contains_every_power() {
        for power in Power::ALL {
            assert!(PowerSet::ALL.own(power));
        }
        assert_eq!(PowerSet::ALL.iter().collect::<Vec<_>>(), Power::ALL.to_vec());
    }

    #[test]
    fn test_from_iterator() {
        let powers: PowerSet = [Power::ClassManage, Power::LabManage].into_iter().collect();
        assert_eq!(powers.bits(), 4 | 16);
    }

    #[test]
    fn test_matrix_lists_whole_catalog_in_order() {
        let matrix = PowerSet::from_raw(3).unwrap().matrix();
        assert_eq!(matrix.len(), Power::ALL.len());

        let owned: Vec<bool> = matrix.iter().map(|row| row.own).collect();
        assert_eq!(owned, vec![true, true, false, false, false]);

        assert_eq!(matrix[0].name, "admin management");
        assert_eq!(matrix[2].power, 4);
    }

    #[test]
    fn test_serialize_as_integer() {
        let powers = PowerSet::from_raw(5).unwrap();
        assert_eq!(serde_json::to_string(&powers).unwrap(), "5");
    }

    #[test]
    fn test_deserialize_rejects_unknown_bits() {
        let ok: PowerSet = serde_json::from_str("17").unwrap();
        assert!(ok.own(Power::LabManage));

        let err = serde_json::from_str::<PowerSet>("64");
        assert!(err.is_err());
    }

    #[test]
    fn test_debug_lists_powers() {
        let debug = format!("{:?}", PowerSet::from_raw(1).unwrap());
        assert!(debug.contains("AdminManage"));
    }

    proptest! {
        #[test]
        fn prop_known_bits_round_trip(raw in 0i64..=i64::from(KNOWN_BITS)) {
            let powers = PowerSet::from_raw(raw).unwrap();
            prop_assert_eq!(powers.to_raw(), raw);
            prop_assert_eq!(PowerSet::from_raw(powers.to_raw()).unwrap(), powers);
        }

        #[test]
        fn prop_unknown_bits_rejected(raw in any::<i64>()) {
            prop_assume!(raw & !i64::from(KNOWN_BITS) != 0);
            let err = PowerSet::from_raw(raw).unwrap_err();
            prop_assert_eq!(err.raw, raw);
        }

        #[test]
        fn prop_own_matches_bit(raw in 0i64..=i64::from(KNOWN_BITS)) {
            let powers = PowerSet::from_raw(raw).unwrap();
            for power in Power::ALL {
                prop_assert_eq!(powers.own(power), powers.to_raw() & i64::from(power.bit()) != 0);
            }
        }
    }
}
