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

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
};

use compact_str::CompactString;
use lady_deirdre::lexis::{Site, SiteSpan};

use crate::rating::MatchRating;

/// The kind of language construct a completion candidate inserts.
///
/// The variant order is the tie-break order of candidates with equal
/// ratings. Custom kinds come last, in registration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompletionKind {
    /// A field.
    Member,

    /// A method or a constructor.
    Callable,

    /// A class.
    Type,

    /// A package.
    Namespace,

    /// A keyword or a punctuation character.
    Keyword,

    /// A variable or a lambda parameter.
    Variable,

    /// A kind registered by a grammar extension. The custom hierarchy nodes
    /// use the first one, `Custom(0)`.
    Custom(u32),
}

impl Display for CompletionKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member => formatter.write_str("member"),
            Self::Callable => formatter.write_str("callable"),
            Self::Type => formatter.write_str("type"),
            Self::Namespace => formatter.write_str("namespace"),
            Self::Keyword => formatter.write_str("keyword"),
            Self::Variable => formatter.write_str("variable"),
            Self::Custom(index) => write!(formatter, "custom #{index}"),
        }
    }
}

impl CompletionKind {
    /// The kind of the custom hierarchy nodes.
    pub const HIERARCHY: Self = Self::Custom(0);
}

/// A single completion suggestion.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub kind: CompletionKind,

    /// The text shown to the user, such as `substring(int, int)`.
    pub display: String,

    /// The text inserted into the expression, such as `substring(`.
    pub insertion: String,

    /// Extra information for the user, usually the candidate's type.
    pub detail: Option<String>,

    /// The text range the insertion replaces.
    pub range: SiteSpan,

    pub rating: MatchRating,

    /// The qualified name of the class that declares the member, for
    /// members.
    pub declaring: Option<CompactString>,
}

impl Display for Candidate {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.display)
    }
}

impl Candidate {
    /// The ranking order: by rating, then by kind, then by display text.
    pub fn rank(&self, other: &Self) -> Ordering {
        self.rating
            .cmp(&other.rating)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.display.cmp(&other.display))
            .then_with(|| self.insertion.cmp(&other.insertion))
    }

    /// Returns true if both candidates stand for the same suggestion, so only
    /// one of them should be kept.
    #[inline(always)]
    pub fn same_suggestion(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.insertion == other.insertion
            && self.declaring == other.declaring
    }
}

/// The result of a code completion request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Completions {
    /// The caret position of the request.
    pub site: Site,

    /// The text range the candidates replace.
    pub place: SiteSpan,

    /// The text the candidates were matched against.
    pub pattern: String,

    /// The candidates, best first.
    pub items: Vec<Candidate>,
}

impl Completions {
    /// A completion result without candidates.
    #[inline(always)]
    pub fn empty(site: Site) -> Self {
        Self {
            site,
            place: site..site,
            pattern: String::new(),
            items: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the candidate with the `insertion` text, if any.
    pub fn find(&self, insertion: &str) -> Option<&Candidate> {
        self.items.iter().find(|item| item.insertion == insertion)
    }

    /// Sorts the candidates by [Candidate::rank] and keeps the best `max`
    /// of them.
    pub(crate) fn rank(mut self, max: usize) -> Self {
        self.items.sort_by(Candidate::rank);
        self.items.truncate(max);

        self
    }
}

/// Adds the `candidate` to the set, or improves the rating of the same
/// suggestion already in the set.
pub(crate) fn merge_candidate(set: &mut Vec<Candidate>, candidate: Candidate) {
    match set.iter_mut().find(|item| item.same_suggestion(&candidate)) {
        Some(existing) => existing.rating = existing.rating.best(candidate.rating),
        None => set.push(candidate),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::{completions::merge_candidate, Candidate, CompletionKind, Completions},
        rating::{MatchRating, NameMatch, TypeMatch},
    };

    fn candidate(kind: CompletionKind, name: &str, name_match: NameMatch) -> Candidate {
        Candidate {
            kind,
            display: name.to_string(),
            insertion: name.to_string(),
            detail: None,
            range: 0..0,
            rating: MatchRating::new(name_match, TypeMatch::Full, false),
            declaring: None,
        }
    }

    #[test]
    fn test_ranking() {
        let mut completions = Completions::empty(0);

        completions.items = vec![
            candidate(CompletionKind::Variable, "value", NameMatch::Prefix),
            candidate(CompletionKind::Custom(1), "valid", NameMatch::Prefix),
            candidate(CompletionKind::Member, "values", NameMatch::Prefix),
            candidate(CompletionKind::Custom(0), "val", NameMatch::Exact),
            candidate(CompletionKind::Callable, "value", NameMatch::Prefix),
        ];

        let ranked = completions.rank(4);
        let order = ranked
            .items
            .iter()
            .map(|item| (item.kind, item.display.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(
            order,
            [
                (CompletionKind::Custom(0), "val"),
                (CompletionKind::Member, "values"),
                (CompletionKind::Callable, "value"),
                (CompletionKind::Variable, "value"),
            ],
        );
    }

    #[test]
    fn test_merge_keeps_better_rating() {
        let mut set = Vec::new();

        merge_candidate(&mut set, candidate(CompletionKind::Member, "size", NameMatch::Prefix));
        merge_candidate(&mut set, candidate(CompletionKind::Member, "size", NameMatch::Exact));
        merge_candidate(&mut set, candidate(CompletionKind::Callable, "size", NameMatch::None));

        assert_eq!(set.len(), 2);
        assert_eq!(set[0].rating.name, NameMatch::Exact);
    }
}
