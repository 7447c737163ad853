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

use std::fmt::{Debug, Display, Formatter};

/// A camel-case aware wildcard query over identifier-like names.
///
/// The pattern matches a candidate string as a *prefix*: `"Arr"` matches
/// `"ArrayList"`. On top of the plain prefix semantics, two extensions apply:
///
/// - The `*` character matches any run of characters, including an empty
///   one: `"*List"` matches `"ArrayList"`.
/// - Any non-leading uppercase letter may skip a run of non-uppercase
///   candidate characters before it aligns with the same uppercase letter in
///   the candidate: `"ArrLi"` and `"AL"` both match `"ArrayList"`, but `"AL"`
///   does not match `"ABList"`, because the skipped run `"B"` contains an
///   uppercase letter.
///
/// The leading character of the pattern (unless it is `*`) must match the
/// first character of the candidate exactly.
///
/// This object evaluates the query against one candidate at a time. To
/// search large vocabularies, use the
/// [MultiStringMatcher](crate::matching::MultiStringMatcher), which implements
/// exactly the same semantics over a prefix tree.
///
/// ```
/// use expr_bar::matching::WildcardPattern;
///
/// let pattern = WildcardPattern::new("AL");
///
/// assert!(pattern.matches("ArrayList"));
/// assert!(pattern.matches("AbstractLogger"));
/// assert!(!pattern.matches("ArtificialIntelligence"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct WildcardPattern {
    chars: Vec<char>,
}

impl Debug for WildcardPattern {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("WildcardPattern({:?})", self.to_string()))
    }
}

impl Display for WildcardPattern {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        for ch in &self.chars {
            Display::fmt(ch, formatter)?;
        }

        Ok(())
    }
}

impl<S: AsRef<str>> From<S> for WildcardPattern {
    #[inline(always)]
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

impl WildcardPattern {
    /// The character that matches any run of characters.
    pub const ANY: char = '*';

    /// Creates a new pattern from the query string.
    #[inline(always)]
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            chars: pattern.as_ref().chars().collect(),
        }
    }

    /// Returns the characters of the pattern.
    #[inline(always)]
    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    /// Returns true if the pattern is an empty string. An empty pattern
    /// matches every candidate.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Returns true if the pattern uses any of the wildcard extensions (the
    /// `*` character or a non-leading uppercase letter). Otherwise, the
    /// pattern is a plain prefix query.
    pub fn is_wildcard(&self) -> bool {
        self.chars
            .iter()
            .enumerate()
            .any(|(index, ch)| *ch == Self::ANY || (index > 0 && ch.is_uppercase()))
    }

    /// Returns true if the `candidate` string matches this pattern.
    pub fn matches(&self, candidate: impl AsRef<str>) -> bool {
        let candidate = candidate.as_ref().chars().collect::<Vec<_>>();

        let mut memo = vec![None; (self.chars.len() + 1) * (candidate.len() + 1)];

        self.match_from(0, 0, &candidate, &mut memo)
    }

    fn match_from(
        &self,
        pattern_index: usize,
        candidate_index: usize,
        candidate: &[char],
        memo: &mut Vec<Option<bool>>,
    ) -> bool {
        let Some(ch) = self.chars.get(pattern_index).copied() else {
            return true;
        };

        let key = pattern_index * (candidate.len() + 1) + candidate_index;

        if let Some(result) = memo[key] {
            return result;
        }

        let result = match ch {
            Self::ANY => {
                self.match_from(pattern_index + 1, candidate_index, candidate, memo)
                    || (candidate_index < candidate.len()
                        && self.match_from(pattern_index, candidate_index + 1, candidate, memo))
            }

            _ if ch.is_uppercase() && candidate_index > 0 => {
                let mut result = false;

                for (index, next) in candidate.iter().enumerate().skip(candidate_index) {
                    if *next == ch && self.match_from(pattern_index + 1, index + 1, candidate, memo)
                    {
                        result = true;
                        break;
                    }

                    if next.is_uppercase() {
                        break;
                    }
                }

                result
            }

            _ => {
                candidate.get(candidate_index) == Some(&ch)
                    && self.match_from(pattern_index + 1, candidate_index + 1, candidate, memo)
            }
        };

        memo[key] = Some(result);

        result
    }
}

#[cfg(test)]
mod tests {
    use crate::matching::WildcardPattern;

    #[test]
    fn test_prefix_semantics() {
        assert!(WildcardPattern::new("").matches("anything"));
        assert!(WildcardPattern::new("get").matches("getValue"));
        assert!(WildcardPattern::new("getValue").matches("getValue"));
        assert!(!WildcardPattern::new("getValues").matches("getValue"));
        assert!(!WildcardPattern::new("Get").matches("getValue"));
    }

    #[test]
    fn test_camel_case_skips() {
        let pattern = WildcardPattern::new("ArrLi");

        assert!(pattern.matches("ArrayList"));
        assert!(pattern.matches("ArrayLinkedSet"));
        assert!(!pattern.matches("Arrow"));

        assert!(WildcardPattern::new("gV").matches("getValue"));
        assert!(!WildcardPattern::new("AL").matches("ABList"));
        assert!(!WildcardPattern::new("L").matches("ArrayList"));
    }

    #[test]
    fn test_any_run() {
        assert!(WildcardPattern::new("*List").matches("ArrayList"));
        assert!(WildcardPattern::new("A*t").matches("ArrayList"));
        assert!(WildcardPattern::new("*").matches(""));
        assert!(!WildcardPattern::new("*Map").matches("ArrayList"));
    }

    #[test]
    fn test_wildcard_detection() {
        assert!(!WildcardPattern::new("Array").is_wildcard());
        assert!(WildcardPattern::new("ArL").is_wildcard());
        assert!(WildcardPattern::new("a*").is_wildcard());
    }
}
