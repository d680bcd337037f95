use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MembershipId(pub i64);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(pub i64);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemInstanceId(pub i64);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ActivityHash(pub u32);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BucketHash(pub u32);

/// Platform a Destiny membership lives on.
///
/// Kept as a raw integer because the provider adds platforms over time and
/// the value is echoed back verbatim in equip requests.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MembershipType(pub i32);

impl MembershipType {
    pub const NONE: Self = Self(0);
    pub const XBOX: Self = Self(1);
    pub const PSN: Self = Self(2);
    pub const STEAM: Self = Self(3);
    pub const STADIA: Self = Self(5);
    pub const EPIC: Self = Self(6);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

macro_rules! decimal_id {
    ($($name:ident),+) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = std::num::ParseIntError;

                fn from_str(raw: &str) -> Result<Self, Self::Err> {
                    raw.trim().parse().map(Self)
                }
            }
        )+
    };
}

decimal_id!(
    MembershipId,
    CharacterId,
    ItemInstanceId,
    ActivityHash,
    BucketHash,
    MembershipType
);
