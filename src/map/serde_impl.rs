//! Ordered (de)serialization for [`SequencedMap`].
//!
//! The map is written as a sequence of `(key, value)` pairs, oldest first.
//! Reading pushes the pairs straight onto the ring and then rebuilds the key
//! index, so a repeated key keeps its last occurrence.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::map::sequenced::SequencedMap;

impl<K, V> Serialize for SequencedMap<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for entry in self.iter() {
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }
}

struct SequencedMapVisitor<K, V> {
    marker: PhantomData<fn() -> SequencedMap<K, V>>,
}

impl<'de, K, V> Visitor<'de> for SequencedMapVisitor<K, V>
where
    K: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
{
    type Value = SequencedMap<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence of key/value pairs")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        // Size hints come from the input; cap the pre-allocation.
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(pair) = seq.next_element::<(K, V)>()? {
            entries.push(pair);
        }
        Ok(SequencedMap::from_ordered_entries(entries))
    }
}

impl<'de, K, V> Deserialize<'de> for SequencedMap<K, V>
where
    K: Deserialize<'de> + Eq + Hash + Clone,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(SequencedMapVisitor {
            marker: PhantomData,
        })
    }
}
