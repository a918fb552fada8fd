// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::encode::percent_encode;

/// ParamStore keeps query or form parameters.
///
/// Every key maps to an ordered list of values. Keys are unique and the values
/// of a key keep their insertion order. Empty keys are ignored on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamStore {
    params: BTreeMap<String, Vec<String>>,
}

impl ParamStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the key.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }

        self.params.entry(key).or_default().push(value.into());
    }

    /// Replace all values of the key with the given value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.is_empty() {
            return;
        }

        self.params.insert(key, vec![value.into()]);
    }

    /// Get the last value added to the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|v| v.last())
            .map(|v| v.as_str())
    }

    /// Get all values of the key, empty if the key is absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Remove the key with all its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.params.remove(key)
    }

    /// Remove every parameter.
    pub fn clear(&mut self) {
        self.params.clear()
    }

    /// Check if the key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if there is no key.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(|k| k.as_str())
    }

    /// Iterate over keys and their values.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.params.iter()
    }

    /// Iterate over every (key, value) occurrence.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Append every (key, value) occurrence of other.
    pub fn extend(&mut self, other: &ParamStore) {
        for (k, v) in other.pairs() {
            self.add(k, v);
        }
    }

    /// Build the `application/x-www-form-urlencoded` form of the store.
    ///
    /// ```text
    /// {b: [2], a: [1, " "]} => "a=%20&a=1&b=2"
    /// ```
    ///
    /// Keys and values are percent encoded, pairs are sorted byte-wise and joined by `&`.
    pub fn to_param_string(&self) -> String {
        join_sorted_pairs(
            self.pairs()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a ParamStore {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamStore {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut store = ParamStore::new();
        for (k, v) in iter {
            store.add(k, v);
        }
        store
    }
}

/// Sort encoded `key=value` pairs byte-wise and join them with `&`.
fn join_sorted_pairs(mut pairs: Vec<String>) -> String {
    pairs.sort_unstable();
    pairs.join("&")
}
