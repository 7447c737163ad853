////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::{collections::BTreeMap, fmt::Debug};

use ahash::{AHashMap, AHashSet};

use crate::matching::WildcardPattern;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct NodeId(usize);

impl NodeId {
    const ROOT: Self = Self(0);
}

#[derive(Clone)]
struct TrieNode<V> {
    values: Vec<V>,
    children: BTreeMap<char, NodeId>,
    shortcuts: AHashMap<char, Vec<NodeId>>,
}

impl<V> Default for TrieNode<V> {
    #[inline(always)]
    fn default() -> Self {
        Self {
            values: Vec::new(),
            children: BTreeMap::new(),
            shortcuts: AHashMap::new(),
        }
    }
}

/// A prefix tree over a fixed vocabulary of strings that answers
/// [wildcard queries](WildcardPattern) without scanning every string.
///
/// Each registered key stores a value of type `V` at the node where the key
/// ends. On top of the ordinary child edges, the tree keeps "shortcut" edges
/// labeled with uppercase letters that jump over runs of non-uppercase
/// characters, so a camel-case query such as `"ArL"` reaches the `L` node of
/// `"ArrayList"` directly.
///
/// The matcher is built once through [insert](Self::insert) calls (or
/// [FromIterator]) and then queried through [search](Self::search). Queries
/// take `&self`, so a built matcher can be shared between threads.
///
/// ```
/// use expr_bar::matching::MultiStringMatcher;
///
/// let matcher = ["ArrayList", "AbstractLogger", "ArtificialIntelligence"]
///     .into_iter()
///     .map(|key| (key, key))
///     .collect::<MultiStringMatcher<_>>();
///
/// let mut found = matcher.search("AL", usize::MAX);
///
/// found.sort();
///
/// assert_eq!(found, [&"AbstractLogger", &"ArrayList"]);
/// assert_eq!(matcher.search("Art", usize::MAX), [&"ArtificialIntelligence"]);
/// ```
#[derive(Clone)]
pub struct MultiStringMatcher<V> {
    nodes: Vec<TrieNode<V>>,
    values: usize,
}

impl<V> Default for MultiStringMatcher<V> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for MultiStringMatcher<V> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MultiStringMatcher")
            .field("nodes", &self.nodes.len())
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

impl<K: AsRef<str>, V> FromIterator<(K, V)> for MultiStringMatcher<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut matcher = Self::new();

        for (key, value) in iter {
            matcher.insert(key, value);
        }

        matcher
    }
}

impl<V> MultiStringMatcher<V> {
    /// Creates an empty matcher.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            values: 0,
        }
    }

    /// Returns the number of registered values.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values
    }

    /// Returns true if no value has been registered yet.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values == 0
    }

    /// Returns the number of tree nodes, including the root node.
    #[inline(always)]
    pub fn nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Registers a `value` under the `key` string.
    ///
    /// Keys sharing a prefix share the tree path of that prefix. Registering
    /// the same key twice keeps both values.
    pub fn insert(&mut self, key: impl AsRef<str>, value: V) {
        let key = key.as_ref().chars().collect::<Vec<_>>();

        let mut path = Vec::with_capacity(key.len() + 1);
        let mut first_new = key.len() + 1;
        let mut current = NodeId::ROOT;

        path.push(current);

        for (index, ch) in key.iter().enumerate() {
            current = match self.nodes[current.0].children.get(ch) {
                Some(child) => *child,

                None => {
                    let child = NodeId(self.nodes.len());

                    self.nodes.push(TrieNode::default());
                    let _ = self.nodes[current.0].children.insert(*ch, child);

                    if first_new > index + 1 {
                        first_new = index + 1;
                    }

                    child
                }
            };

            path.push(current);
        }

        self.nodes[current.0].values.push(value);
        self.values += 1;

        // Shortcuts ending in a node that existed before this insertion are
        // already registered.
        let from = first_new.saturating_sub(1).max(2);

        for target in (from..key.len()).rev() {
            let label = key[target];

            if !label.is_uppercase() {
                continue;
            }

            let mut skip = target - 1;

            while skip >= 1 && !key[skip].is_uppercase() {
                let targets = self.nodes[path[skip].0]
                    .shortcuts
                    .entry(label)
                    .or_default();

                let target_node = path[target + 1];

                if !targets.contains(&target_node) {
                    targets.push(target_node);
                }

                skip -= 1;
            }
        }
    }

    /// Returns the values of all keys matching the wildcard `pattern`, at
    /// most `max` of them.
    ///
    /// The search stops as soon as `max` values are found. The order of the
    /// returned values is deterministic but unspecified.
    pub fn search(&self, pattern: impl Into<WildcardPattern>, max: usize) -> Vec<&V> {
        let pattern = pattern.into();

        let mut search = Search {
            matcher: self,
            pattern: pattern.as_chars(),
            max,
            visited: AHashSet::new(),
            collected: AHashSet::new(),
            result: Vec::new(),
        };

        if max > 0 {
            let _ = search.descend(0, NodeId::ROOT);
        }

        search.result
    }
}

impl<V> MultiStringMatcher<V> {
    /// Returns the values of all keys that are prefixes of the `text`,
    /// including the `text` itself, shortest keys first.
    pub fn prefixes_of(&self, text: impl AsRef<str>) -> Vec<&V> {
        let mut result = self.nodes[NodeId::ROOT.0].values.iter().collect::<Vec<_>>();
        let mut current = NodeId::ROOT;

        for ch in text.as_ref().chars() {
            let Some(child) = self.nodes[current.0].children.get(&ch) else {
                break;
            };

            current = *child;
            result.extend(&self.nodes[current.0].values);
        }

        result
    }
}

struct Search<'a, 'p, V> {
    matcher: &'a MultiStringMatcher<V>,
    pattern: &'p [char],
    max: usize,
    visited: AHashSet<(usize, NodeId)>,
    collected: AHashSet<NodeId>,
    result: Vec<&'a V>,
}

impl<'a, 'p, V> Search<'a, 'p, V> {
    // Returns false once the result limit is reached.
    fn descend(&mut self, position: usize, node: NodeId) -> bool {
        if !self.visited.insert((position, node)) {
            return true;
        }

        let Some(ch) = self.pattern.get(position).copied() else {
            return self.collect(node);
        };

        let matcher = self.matcher;
        let trie_node = &matcher.nodes[node.0];

        if ch == WildcardPattern::ANY {
            if !self.descend(position + 1, node) {
                return false;
            }

            for child in trie_node.children.values() {
                if !self.descend(position, *child) {
                    return false;
                }
            }

            return true;
        }

        if let Some(child) = trie_node.children.get(&ch) {
            if !self.descend(position + 1, *child) {
                return false;
            }
        }

        if ch.is_uppercase() && node != NodeId::ROOT {
            if let Some(targets) = trie_node.shortcuts.get(&ch) {
                for target in targets {
                    if !self.descend(position + 1, *target) {
                        return false;
                    }
                }
            }
        }

        true
    }

    fn collect(&mut self, node: NodeId) -> bool {
        let matcher = self.matcher;
        let mut stack = vec![node];

        while let Some(next) = stack.pop() {
            if !self.collected.insert(next) {
                continue;
            }

            let trie_node = &matcher.nodes[next.0];

            for value in &trie_node.values {
                if self.result.len() >= self.max {
                    return false;
                }

                self.result.push(value);
            }

            stack.extend(trie_node.children.values().rev().copied());
        }

        self.result.len() < self.max
    }
}

#[cfg(test)]
mod tests {
    use ahash::AHashSet;
    use quickcheck::{QuickCheck, TestResult};

    use crate::matching::{MultiStringMatcher, WildcardPattern};

    const KEY_ALPHABET: [char; 5] = ['a', 'b', 'A', 'B', 'c'];
    const QUERY_ALPHABET: [char; 6] = ['a', 'b', 'A', 'B', 'c', '*'];

    fn decode(bytes: &[u8], alphabet: &[char], limit: usize) -> String {
        bytes
            .iter()
            .take(limit)
            .map(|byte| alphabet[*byte as usize % alphabet.len()])
            .collect()
    }

    fn vocabulary() -> MultiStringMatcher<&'static str> {
        [
            "ArrayList",
            "AbstractLogger",
            "ArtificialIntelligence",
            "Array",
            "ALoader",
        ]
        .into_iter()
        .map(|key| (key, key))
        .collect()
    }

    fn sorted<'a>(mut values: Vec<&'a &'static str>) -> Vec<&'static str> {
        values.sort();
        values.into_iter().copied().collect()
    }

    #[test]
    fn test_prefixes_of() {
        let matcher = vocabulary();

        assert_eq!(sorted(matcher.prefixes_of("ArrayListFactory")), ["Array", "ArrayList"]);
        assert_eq!(sorted(matcher.prefixes_of("Array")), ["Array"]);
        assert!(matcher.prefixes_of("Arr").is_empty());
        assert!(matcher.prefixes_of("").is_empty());
    }

    #[test]
    fn test_camel_case_search() {
        let matcher = ["ArrayList", "AbstractLogger", "ArtificialIntelligence"]
            .into_iter()
            .map(|key| (key, key))
            .collect::<MultiStringMatcher<_>>();

        assert_eq!(
            sorted(matcher.search("AL", usize::MAX)),
            ["AbstractLogger", "ArrayList"],
        );
        assert_eq!(
            sorted(matcher.search("Art", usize::MAX)),
            ["ArtificialIntelligence"],
        );
        assert_eq!(sorted(matcher.search("ArrLi", usize::MAX)), ["ArrayList"]);
        assert_eq!(sorted(matcher.search("AI", usize::MAX)), ["ArtificialIntelligence"]);
        assert!(matcher.search("L", usize::MAX).is_empty());
    }

    #[test]
    fn test_prefix_sharing() {
        let matcher = vocabulary();

        assert_eq!(matcher.len(), 5);
        assert_eq!(
            sorted(matcher.search("Arr", usize::MAX)),
            ["Array", "ArrayList"],
        );
        assert_eq!(
            sorted(matcher.search("AL", usize::MAX)),
            ["ALoader", "AbstractLogger", "ArrayList"],
        );
        assert_eq!(sorted(matcher.search("", usize::MAX)).len(), 5);
    }

    #[test]
    fn test_any_run_search() {
        let matcher = vocabulary();

        assert_eq!(
            sorted(matcher.search("*Logger", usize::MAX)),
            ["AbstractLogger"],
        );
        assert_eq!(
            sorted(matcher.search("*List", usize::MAX)),
            ["ArrayList"],
        );
        assert_eq!(sorted(matcher.search("*", usize::MAX)).len(), 5);
    }

    #[test]
    fn test_duplicate_keys() {
        let mut matcher = MultiStringMatcher::new();

        matcher.insert("size", 1);
        matcher.insert("size", 2);
        matcher.insert("sizeOf", 3);

        let mut found = matcher.search("size", usize::MAX).into_iter().copied().collect::<Vec<_>>();

        found.sort();

        assert_eq!(found, [1, 2, 3]);
    }

    #[test]
    fn test_clone_keeps_shortcuts() {
        let matcher = vocabulary();
        let copy = matcher.clone();

        assert_eq!(copy.nodes(), matcher.nodes());
        assert_eq!(
            sorted(copy.search("ArL", usize::MAX)),
            sorted(matcher.search("ArL", usize::MAX)),
        );
    }

    #[test]
    fn test_brute_force_agreement() {
        fn prop(keys: Vec<Vec<u8>>, query: Vec<u8>) -> TestResult {
            let keys = keys
                .iter()
                .take(24)
                .map(|key| decode(key, &KEY_ALPHABET, 7))
                .collect::<Vec<_>>();

            let query = decode(&query, &QUERY_ALPHABET, 5);

            let matcher = keys
                .iter()
                .enumerate()
                .map(|(index, key)| (key.as_str(), index))
                .collect::<MultiStringMatcher<_>>();

            let pattern = WildcardPattern::new(&query);

            let expected = keys
                .iter()
                .enumerate()
                .filter(|(_, key)| pattern.matches(key))
                .map(|(index, _)| index)
                .collect::<AHashSet<_>>();

            let found = matcher.search(&query, usize::MAX);
            let found_set = found.iter().map(|index| **index).collect::<AHashSet<_>>();

            if found.len() != found_set.len() {
                return TestResult::error(format!("Duplicate values for {query:?}."));
            }

            TestResult::from_bool(expected == found_set)
        }

        QuickCheck::new()
            .tests(500)
            .max_tests(5000)
            .quickcheck(prop as fn(Vec<Vec<u8>>, Vec<u8>) -> TestResult);
    }

    #[test]
    fn test_truncation() {
        fn prop(keys: Vec<Vec<u8>>, query: Vec<u8>, limit: u8) -> TestResult {
            let keys = keys
                .iter()
                .take(24)
                .map(|key| decode(key, &KEY_ALPHABET, 6))
                .collect::<Vec<_>>();

            let query = decode(&query, &QUERY_ALPHABET, 3);

            let matcher = keys
                .iter()
                .enumerate()
                .map(|(index, key)| (key.as_str(), index))
                .collect::<MultiStringMatcher<_>>();

            let full = matcher
                .search(&query, usize::MAX)
                .into_iter()
                .copied()
                .collect::<AHashSet<_>>();

            let limit = limit as usize % (full.len() + 1);

            if limit >= full.len() {
                return TestResult::discard();
            }

            let truncated = matcher.search(&query, limit);

            TestResult::from_bool(
                truncated.len() == limit && truncated.iter().all(|index| full.contains(*index)),
            )
        }

        QuickCheck::new()
            .tests(200)
            .max_tests(5000)
            .quickcheck(prop as fn(Vec<Vec<u8>>, Vec<u8>, u8) -> TestResult);
    }
}
