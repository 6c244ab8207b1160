//! Key wrappers for row identity columns.
//!
//! [`PrimaryKey`] marks the identity column of a record; [`ForeignKey`]
//! marks a field that stores another table's primary key. Both wrap the
//! engine's 64-bit row id and convert freely into each other, so a stored
//! foreign key can be used directly as a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a row within its table.
///
/// # Examples
///
/// ```
/// use rowbind_core::{ForeignKey, PrimaryKey};
///
/// let pk = PrimaryKey::from(7);
/// let fk: ForeignKey = pk.into();
/// assert_eq!(fk.get(), 7);
/// assert_eq!(PrimaryKey::from(fk), pk);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrimaryKey(pub i64);

/// Reference to the primary key of a row in another table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ForeignKey(pub i64);

macro_rules! key_impls {
    ($key:ident) => {
        impl $key {
            /// Returns the underlying row id.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $key {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$key> for i64 {
            fn from(key: $key) -> Self {
                key.0
            }
        }

        impl fmt::Display for $key {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

key_impls!(PrimaryKey);
key_impls!(ForeignKey);

impl From<ForeignKey> for PrimaryKey {
    fn from(key: ForeignKey) -> Self {
        Self(key.0)
    }
}

impl From<PrimaryKey> for ForeignKey {
    fn from(key: PrimaryKey) -> Self {
        Self(key.0)
    }
}
