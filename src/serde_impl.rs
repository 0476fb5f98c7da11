use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::Trie;

/// Serialized as a sequence of `(key, value)` pairs in key order, since most
/// formats cannot use arbitrary byte strings as map keys.
impl<V: Serialize> Serialize for Trie<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Trie<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<(Vec<u8>, V)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
