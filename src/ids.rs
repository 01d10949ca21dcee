//! Identifiers
//!
//! Catalog payloads identify products, attributes, values and combinations by
//! opaque strings. Each kind gets its own newtype so they can't be mixed up.

use std::{borrow::Borrow, fmt};

use serde::Deserialize;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Product identifier
    ProductId
}

string_id! {
    /// Attribute identifier (e.g. `color`)
    AttributeId
}

string_id! {
    /// Attribute value identifier (e.g. `red`)
    AttributeValueId
}

string_id! {
    /// Combination (SKU) identifier
    CombinationId
}
