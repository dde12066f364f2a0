//! Identifiers used across the domain.
//!
//! Identifiers are opaque strings assigned by whichever store persists the
//! record first. An empty identifier means "not yet persisted".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a quote (aggregate root).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(String);

/// Identifier of a quote line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(String);

/// Reference to a customer (owned by the customers module).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

/// Reference to a vehicle (owned by the vehicles module).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            /// Generate a fresh identifier.
            ///
            /// 128 random bits rendered as 32 lowercase hex characters.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().simple().to_string())
            }

            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// The unassigned identifier (empty string).
            pub fn unassigned() -> Self {
                Self(String::new())
            }

            pub fn is_unassigned(&self) -> bool {
                self.0.is_empty()
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_newtype!(QuoteId);
impl_string_newtype!(LineItemId);
impl_string_newtype!(CustomerId);
impl_string_newtype!(VehicleId);
