//! Decoded call and event arguments.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Arguments attached to a call or event once its signature was matched.
///
/// `Unparsed` means decoding upstream did not happen or failed against the
/// ABI. On the wire this is a missing or `null` `args` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodedArgs<T> {
    Unparsed,
    Parsed(T),
}

impl<T> DecodedArgs<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(args) => Some(args),
            Self::Unparsed => None,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, Self::Unparsed)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DecodedArgs<U> {
        match self {
            Self::Parsed(args) => DecodedArgs::Parsed(f(args)),
            Self::Unparsed => DecodedArgs::Unparsed,
        }
    }
}

impl<T> Default for DecodedArgs<T> {
    fn default() -> Self {
        Self::Unparsed
    }
}

impl<T> From<Option<T>> for DecodedArgs<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unparsed, Self::Parsed)
    }
}

impl<T: Serialize> Serialize for DecodedArgs<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.parsed().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DecodedArgs<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// Arguments of `Transfer(address indexed from, address indexed to, uint256 value)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEventArgs {
    pub from: String,
    pub to: String,
    pub value: U256,
}

/// Arguments of `approve(address spender, uint256 value)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveCallArgs {
    pub spender: String,
    pub value: U256,
}
