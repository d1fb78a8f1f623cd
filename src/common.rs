//! Identifier types shared by accounts, transactions and balances.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::encoding::{CanonicalDeserialize, CanonicalSerialize, Reader};
use crate::error::{LedgerError, Result};

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn new(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let arr: [u8; $len] = bytes.try_into().map_err(|_| {
                    LedgerError::Serialization(format!(
                        "{} must be {} bytes, got {}",
                        stringify!($name),
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok($name(arr))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;
            fn from_str(s: &str) -> Result<Self> {
                let bytes = hex::decode(s.trim_start_matches("0x"))
                    .map_err(|e| LedgerError::Serialization(format!("bad hex: {}", e)))?;
                Self::from_slice(&bytes)
            }
        }

        impl CanonicalSerialize for $name {
            fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
                writer.write_all(&self.0)
            }
        }

        impl CanonicalDeserialize for $name {
            fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
                Ok($name(reader.take_array()?))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// Account identifier.
    Address,
    20
);

fixed_bytes!(
    /// Hash of a signing public key.
    PublicHash,
    32
);

fixed_bytes!(
    /// Output of the double SHA-256 digest.
    Hash256,
    32
);

/// Shard/chain namespace. The main chain sits at `{0, 0}`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub height: u32,
    pub index: u16,
}

impl Coordinate {
    pub const fn new(height: u32, index: u16) -> Self {
        Coordinate { height, index }
    }

    pub const fn main() -> Self {
        Coordinate { height: 0, index: 0 }
    }

    pub fn is_main_chain(&self) -> bool {
        *self == Self::main()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.height, self.index)
    }
}

impl FromStr for Coordinate {
    type Err = LedgerError;
    fn from_str(s: &str) -> Result<Self> {
        let (h, i) = s
            .split_once(':')
            .ok_or_else(|| LedgerError::Config(format!("coordinate '{}' must be height:index", s)))?;
        let height = h
            .parse()
            .map_err(|_| LedgerError::Config(format!("bad coordinate height '{}'", h)))?;
        let index = i
            .parse()
            .map_err(|_| LedgerError::Config(format!("bad coordinate index '{}'", i)))?;
        Ok(Coordinate { height, index })
    }
}

impl CanonicalSerialize for Coordinate {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        self.height.canonical_serialize(writer)?;
        self.index.canonical_serialize(writer)
    }
}

impl CanonicalDeserialize for Coordinate {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        let height = u32::canonical_deserialize(reader)?;
        let index = u16::canonical_deserialize(reader)?;
        Ok(Coordinate { height, index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_round_trip() {
        let addr = Address::new([7u8; 20]);
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
        assert!("abcd".parse::<Address>().is_err());
    }

    #[test]
    fn test_coordinate_encoding() {
        let coord = Coordinate::new(3, 1);
        assert_eq!(coord.to_bytes(), vec![3, 0, 0, 0, 1, 0]);
        assert_eq!("3:1".parse::<Coordinate>().unwrap(), coord);
        assert!(Coordinate::main().is_main_chain());
        assert!(!coord.is_main_chain());
    }
}
