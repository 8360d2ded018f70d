pub mod keys;

use std::fmt::Display;

use serde::{de::DeserializeOwned, Serialize};

pub use keys::*;

pub trait ConfigKey: Display {
    type Value: Serialize + DeserializeOwned;

    fn fallback() -> Option<Self::Value>;
}

#[macro_export]
macro_rules! key_derive {
    ($key:ident => $value:ty) => {
        impl crate::ConfigKey for $key {
            type Value = $value;

            fn fallback() -> Option<Self::Value> {
                None
            }
        }
    };

    ($key:ident => $value:ty|$fallback:expr) => {
        impl crate::ConfigKey for $key {
            type Value = $value;

            fn fallback() -> Option<Self::Value> {
                Some($fallback)
            }
        }
    };
}

/// Name under which a key is stored
#[macro_export]
macro_rules! key_name {
    ($key:ident, $name:literal) => {
        impl std::fmt::Display for $key {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($name)
            }
        }
    };
}
