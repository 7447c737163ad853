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

use std::fmt::{Debug, Formatter};

use ahash::AHashSet;
use compact_str::CompactString;
use log::debug;

use crate::{
    matching::{MultiStringMatcher, WildcardPattern},
    runtime::TypeProvider,
    MATCHER_LOG,
};

/// A searchable vocabulary of class names.
///
/// The index maps class simple names to qualified names, so that a class
/// completion does not have to rate every known class. The index is built
/// once and then shared by any number of parse calls.
#[derive(Clone)]
pub struct ClassIndex {
    matcher: MultiStringMatcher<CompactString>,
    folded: MultiStringMatcher<CompactString>,
}

impl Debug for ClassIndex {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClassIndex")
            .field("classes", &self.matcher.len())
            .finish_non_exhaustive()
    }
}

impl ClassIndex {
    /// Indexes all classes the `provider` knows about.
    pub fn build(provider: &dyn TypeProvider) -> Self {
        Self::from_names(provider.class_names())
    }

    /// Indexes the classes with the given qualified names.
    pub fn from_names(names: impl IntoIterator<Item = CompactString>) -> Self {
        let mut matcher = MultiStringMatcher::new();
        let mut folded = MultiStringMatcher::new();

        for qualified in names {
            let simple = match qualified.rfind('.') {
                Some(dot) => CompactString::from(&qualified[dot + 1..]),
                None => qualified.clone(),
            };

            folded.insert(simple.to_lowercase(), qualified.clone());
            matcher.insert(simple, qualified);
        }

        debug!(
            target: MATCHER_LOG,
            "Class index built: {} classes, {} nodes.",
            matcher.len(),
            matcher.nodes(),
        );

        Self { matcher, folded }
    }

    /// Returns the number of indexed classes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.matcher.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    /// Returns up to `max` qualified names of the classes whose simple names
    /// match the `pattern`.
    pub fn search(&self, pattern: impl Into<WildcardPattern>, max: usize) -> Vec<&str> {
        self.matcher
            .search(pattern, max)
            .into_iter()
            .map(CompactString::as_str)
            .collect()
    }

    /// Returns the qualified names of all classes whose simple names could
    /// match the `typed` text in any way a name can match: exactly, by
    /// prefix or by wildcard, case-sensitively or not, and the other way
    /// around (the simple name being a prefix of the `typed` text).
    ///
    /// The result is a superset to be rated by the caller. It contains each
    /// name once.
    pub fn candidates(&self, typed: &str) -> Vec<&str> {
        let lowercase = typed.to_lowercase();

        let found = self
            .matcher
            .search(typed, usize::MAX)
            .into_iter()
            .chain(self.folded.search(WildcardPattern::new(&lowercase), usize::MAX))
            .chain(self.matcher.prefixes_of(typed))
            .chain(self.folded.prefixes_of(&lowercase));

        let mut seen = AHashSet::new();

        found
            .map(CompactString::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use compact_str::CompactString;

    use crate::{matching::ClassIndex, runtime::SchemaProvider};

    #[test]
    fn test_simple_name_search() {
        let index = ClassIndex::from_names(
            [
                "java.util.ArrayList",
                "java.util.HashMap",
                "log.AbstractLogger",
                "Standalone",
            ]
            .map(CompactString::from),
        );

        assert_eq!(index.len(), 4);

        let mut found = index.search("AL", usize::MAX);

        found.sort();

        assert_eq!(found, ["java.util.ArrayList", "log.AbstractLogger"]);
        assert_eq!(index.search("St", 10), ["Standalone"]);
        assert!(index.search("util", 10).is_empty());
    }

    #[test]
    fn test_candidates() {
        let index = ClassIndex::from_names(
            ["java.util.ArrayList", "java.util.Array", "log.AbstractLogger"]
                .map(CompactString::from),
        );

        let sorted = |typed: &str| {
            let mut found = index.candidates(typed);

            found.sort();

            found
        };

        assert_eq!(sorted("arr"), ["java.util.Array", "java.util.ArrayList"]);
        assert_eq!(sorted("ARRAYLIST"), ["java.util.Array", "java.util.ArrayList"]);
        assert_eq!(sorted("AL"), ["java.util.ArrayList", "log.AbstractLogger"]);
        assert_eq!(sorted("ArrayLists"), ["java.util.Array", "java.util.ArrayList"]);
        assert!(sorted("Map").is_empty());
    }

    #[test]
    fn test_builtin_classes() {
        let index = ClassIndex::build(&SchemaProvider::new());

        assert!(index.search("String", 10).contains(&"core.String"));
        assert!(index.search("*", 3).len() == 3);
    }
}
