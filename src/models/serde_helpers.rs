//! Serde serialization helpers for keyed containers
//!
//! JSON object keys are strings, so maps keyed by positions or string indices
//! would not survive a text round trip. Every map is written as an explicit
//! pairs list wrapped in a marker object, and every set as a values list:
//!
//! ```text
//! {"_entries": [[2.5, {...}], [4.0, {...}]]}
//! {"_svalues": [8.0, 16.0]}
//! ```
//!
//! Deserialization is strict: unknown fields and duplicate keys are errors.

use std::collections::BTreeMap;

use serde::de::Error;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct EntriesRef<'a, K, V> {
    #[serde(rename = "_entries")]
    entries: Vec<(&'a K, V)>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EntriesOwned<K, V> {
    #[serde(rename = "_entries")]
    entries: Vec<(K, V)>,
}

fn collect_unique<K: Ord, V, E: Error>(pairs: Vec<(K, V)>) -> Result<BTreeMap<K, V>, E> {
    let mut map = BTreeMap::new();
    for (key, value) in pairs {
        if map.insert(key, value).is_some() {
            return Err(E::custom("duplicate key in _entries"));
        }
    }
    Ok(map)
}

/// `BTreeMap<K, V>` as `{"_entries": [[k, v], ...]}`
pub mod entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{collect_unique, EntriesOwned, EntriesRef};

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        EntriesRef {
            entries: map.iter().collect(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let owned = EntriesOwned::<K, V>::deserialize(deserializer)?;
        collect_unique(owned.entries)
    }
}

/// `BTreeMap<K, BTreeMap<K2, V>>` with both levels written as `_entries`
pub mod nested_entries {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{collect_unique, EntriesOwned, EntriesRef};

    struct Inner<'a, K, V>(&'a BTreeMap<K, V>);

    impl<K: Serialize, V: Serialize> Serialize for Inner<'_, K, V> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            super::entries::serialize(self.0, serializer)
        }
    }

    struct InnerOwned<K, V>(BTreeMap<K, V>);

    impl<'de, K, V> Deserialize<'de> for InnerOwned<K, V>
    where
        K: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            super::entries::deserialize(deserializer).map(InnerOwned)
        }
    }

    pub fn serialize<K, K2, V, S>(
        map: &BTreeMap<K, BTreeMap<K2, V>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        K2: Serialize,
        V: Serialize,
        S: Serializer,
    {
        EntriesRef {
            entries: map.iter().map(|(key, inner)| (key, Inner(inner))).collect(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, K, K2, V, D>(
        deserializer: D,
    ) -> Result<BTreeMap<K, BTreeMap<K2, V>>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        K2: Deserialize<'de> + Ord,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let owned = EntriesOwned::<K, InnerOwned<K2, V>>::deserialize(deserializer)?;
        let pairs: Vec<_> = owned
            .entries
            .into_iter()
            .map(|(key, inner)| (key, inner.0))
            .collect();
        collect_unique(pairs)
    }
}

/// `BTreeSet<T>` as `{"_svalues": [...]}`
pub mod svalues {
    use std::collections::BTreeSet;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct SValuesRef<'a, T> {
        #[serde(rename = "_svalues")]
        values: Vec<&'a T>,
    }

    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct SValuesOwned<T> {
        #[serde(rename = "_svalues")]
        values: Vec<T>,
    }

    pub fn serialize<T, S>(set: &BTreeSet<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        SValuesRef {
            values: set.iter().collect(),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
    where
        T: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let owned = SValuesOwned::<T>::deserialize(deserializer)?;
        let mut set = BTreeSet::new();
        for value in owned.values {
            if !set.insert(value) {
                return Err(D::Error::custom("duplicate value in _svalues"));
            }
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "super::entries")]
        flat: BTreeMap<u32, String>,
        #[serde(with = "super::nested_entries")]
        nested: BTreeMap<u32, BTreeMap<u32, bool>>,
        #[serde(with = "super::svalues")]
        set: BTreeSet<u32>,
    }

    #[test]
    fn test_containers_are_written_as_pairs() {
        let holder = Holder {
            flat: BTreeMap::from([(3, "c".to_string())]),
            nested: BTreeMap::from([(1, BTreeMap::from([(2, true)]))]),
            set: BTreeSet::from([7]),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(
            json,
            r#"{"flat":{"_entries":[[3,"c"]]},"nested":{"_entries":[[1,{"_entries":[[2,true]]}]]},"set":{"_svalues":[7]}}"#
        );
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, holder);
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let json = r#"{"flat":{"_entries":[[3,"c"],[3,"d"]]},"nested":{"_entries":[]},"set":{"_svalues":[]}}"#;
        assert!(serde_json::from_str::<Holder>(json).is_err());
    }

    #[test]
    fn test_plain_object_is_rejected() {
        let json = r#"{"flat":{"3":"c"},"nested":{"_entries":[]},"set":{"_svalues":[]}}"#;
        assert!(serde_json::from_str::<Holder>(json).is_err());
    }
}
