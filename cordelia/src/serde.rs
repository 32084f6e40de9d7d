//! A convenience prelude for all the serde stuff we're doing.

pub use serde::{Serialize, Deserialize, Serializer, Deserializer};
pub use serde::de::{DeserializeOwned, Error as DeError};
pub use serde_json::{self, Value as JsonValue};

pub mod utils {
    pub fn if_false(b: &bool) -> bool {
        !*b
    }
}
