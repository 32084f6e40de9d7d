//! A convenience prelude for all the serde stuff we're doing.

pub use serde::{Serialize, Deserialize, Serializer, Deserializer};
pub use serde::de::{DeserializeOwned, Visitor, Error as DeError};
pub use serde::ser::{Error as SerError};
pub use serde_json::{self, Value as JsonValue};
pub use serde_repr::*;

macro_rules! snowflake_visitor_common {
    ($ty:ty) => {
        fn visit_i64<E>(self, v: i64) -> ::std::result::Result<$ty, E> where E: DeError {
            if v < 0 {
                Err(E::custom("ids cannot be negative"))
            } else {
                Ok((v as u64).into())
            }
        }
        fn visit_u64<E>(self, v: u64) -> ::std::result::Result<$ty, E> where E: DeError {
            Ok(v.into())
        }

        fn visit_i128<E>(self, v: i128) -> ::std::result::Result<$ty, E> where E: DeError {
            if v < 0 {
                Err(E::custom("snowflakes cannot be negative"))
            } else if v > u64::max_value() as i128 {
                Err(E::custom("snowflakes must be u64"))
            } else {
                Ok((v as u64).into())
            }
        }
        fn visit_u128<E>(self, v: u128) -> ::std::result::Result<$ty, E> where E: DeError {
            if v > u64::max_value() as u128 {
                Err(E::custom("snowflakes must be u64"))
            } else {
                Ok((v as u64).into())
            }
        }
        fn visit_bytes<E>(self, v: &[u8]) -> ::std::result::Result<$ty, E> where E: DeError {
            self.visit_str(::std::str::from_utf8(v)
                .map_err(|_| E::custom("could not parse snowflake string as utf-8"))?)
        }
    }
}

pub mod utils {
    use super::*;
    use std::time::Duration;

    pub mod duration_millis {
        use super::*;
        pub fn serialize<S: Serializer>(t: &Duration, s: S) -> Result<S::Ok, S::Error> {
            (t.as_millis() as u64).serialize(s)
        }
        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
            Ok(Duration::from_millis(u64::deserialize(d)?))
        }
    }
}
