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

//! Ordering of completion candidates and selection of overloaded callables.
//!
//! Every candidate the engine considers receives a [MatchRating]: how well
//! its name matches the typed text, how well its type matches the type the
//! surrounding expression expects, and whether reaching it is discouraged.
//! Ratings are totally ordered, smaller is better.

mod executable;

use std::fmt::{Display, Formatter};

pub use crate::rating::executable::{select_executable, ExecutableView, Selection};
use crate::{matching::WildcardPattern, runtime::TypeMeta};

/// How well a candidate name matches the typed text. Variants are listed
/// from the best to the worst.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameMatch {
    /// The name equals the text.
    Exact,

    /// The name equals the text ignoring letter case.
    ExactIgnoreCase,

    /// The name starts with the text.
    Prefix,

    /// The name starts with the text ignoring letter case.
    PrefixIgnoreCase,

    /// The text starts with the name.
    InversePrefix,

    /// The text starts with the name ignoring letter case.
    InversePrefixIgnoreCase,

    /// The name matches the text as a [WildcardPattern].
    WildcardMatch,

    /// No relation.
    None,
}

impl NameMatch {
    /// Rates the candidate `name` against the `typed` text.
    ///
    /// ```
    /// use expr_bar::rating::NameMatch;
    ///
    /// assert_eq!(NameMatch::rate("size", "size"), NameMatch::Exact);
    /// assert_eq!(NameMatch::rate("get", "getValue"), NameMatch::Prefix);
    /// assert_eq!(NameMatch::rate("gV", "getValue"), NameMatch::WildcardMatch);
    /// assert_eq!(NameMatch::rate("sizes", "size"), NameMatch::InversePrefix);
    /// ```
    pub fn rate(typed: &str, name: &str) -> Self {
        if typed == name {
            return Self::Exact;
        }

        let typed_lower = typed.to_lowercase();
        let name_lower = name.to_lowercase();

        if typed_lower == name_lower {
            return Self::ExactIgnoreCase;
        }

        if name.starts_with(typed) {
            return Self::Prefix;
        }

        if name_lower.starts_with(&typed_lower) {
            return Self::PrefixIgnoreCase;
        }

        if typed.starts_with(name) {
            return Self::InversePrefix;
        }

        if typed_lower.starts_with(&name_lower) {
            return Self::InversePrefixIgnoreCase;
        }

        if WildcardPattern::new(typed).matches(name) {
            return Self::WildcardMatch;
        }

        Self::None
    }
}

/// How well an actual type fits an expected type. Variants are listed from
/// the best to the worst.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeMatch {
    /// The types are equal, or there is no expectation.
    Full,

    /// The actual type inherits from the expected type.
    Inheritance,

    /// Primitive widening conversion.
    PrimitiveConversion,

    /// The boxed (or unboxed) actual type equals the expected type.
    Boxed,

    /// Unboxing followed by a widening conversion.
    BoxedAndConversion,

    /// Boxing followed by an inheritance step.
    BoxedAndInheritance,

    /// The actual type does not fit.
    None,
}

impl TypeMatch {
    /// Rates the `actual` type against the `expected` type.
    ///
    /// A missing expectation accepts anything at the best rating. A missing
    /// actual type stands for `null`, which fits every reference type but
    /// no primitive type.
    pub fn rate(actual: Option<&TypeMeta>, expected: Option<&TypeMeta>) -> Self {
        let Some(expected) = expected else {
            return Self::Full;
        };

        let Some(actual) = actual else {
            return match expected.is_reference() {
                true => Self::Full,
                false => Self::None,
            };
        };

        if actual == expected {
            return Self::Full;
        }

        if actual.is_void() || expected.is_void() {
            return Self::None;
        }

        if actual.is_subtype_of(expected) {
            return Self::Inheritance;
        }

        match (actual.as_primitive(), expected.as_primitive()) {
            (Some(from), Some(to)) if from.widens_to(to) => return Self::PrimitiveConversion,
            (Some(_), Some(_)) => return Self::None,
            _ => (),
        }

        let Some(counterpart) = actual.box_counterpart() else {
            return Self::None;
        };

        if &counterpart == expected {
            return Self::Boxed;
        }

        if let (Some(from), Some(to)) = (counterpart.as_primitive(), expected.as_primitive()) {
            if from.widens_to(to) {
                return Self::BoxedAndConversion;
            }
        }

        if counterpart.is_reference() && counterpart.is_subtype_of(expected) {
            return Self::BoxedAndInheritance;
        }

        Self::None
    }
}

/// The rating of a completion candidate or a resolution alternative.
///
/// Ratings compare lexicographically: the [name match](NameMatch) first,
/// then the [type match](TypeMatch), then the access discouragement flag
/// (a discouraged candidate is worse). Smaller ratings are better.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchRating {
    pub name: NameMatch,
    pub ty: TypeMatch,

    /// Set when a static member is reached through an instance.
    pub access_discouraged: bool,
}

impl Display for MatchRating {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{:?}/{:?}", self.name, self.ty))?;

        if self.access_discouraged {
            formatter.write_str("/discouraged")?;
        }

        Ok(())
    }
}

impl MatchRating {
    /// The best possible rating.
    pub const BEST: Self = Self {
        name: NameMatch::Exact,
        ty: TypeMatch::Full,
        access_discouraged: false,
    };

    #[inline(always)]
    pub const fn new(name: NameMatch, ty: TypeMatch, access_discouraged: bool) -> Self {
        Self {
            name,
            ty,
            access_discouraged,
        }
    }

    /// Returns true if either the name or the type does not match at all.
    #[inline(always)]
    pub fn is_none(&self) -> bool {
        self.name == NameMatch::None || self.ty == TypeMatch::None
    }

    /// Combines two ratings of the same candidate by taking the better value
    /// of every component.
    pub fn best(self, other: Self) -> Self {
        Self {
            name: self.name.min(other.name),
            ty: self.ty.min(other.ty),
            access_discouraged: self.access_discouraged && other.access_discouraged,
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::{QuickCheck, TestResult};

    use crate::{
        rating::{MatchRating, NameMatch, TypeMatch},
        runtime::{ClassMeta, Primitive, TypeMeta},
    };

    #[test]
    fn test_name_rating() {
        assert_eq!(NameMatch::rate("Size", "size"), NameMatch::ExactIgnoreCase);
        assert_eq!(NameMatch::rate("GET", "getValue"), NameMatch::PrefixIgnoreCase);
        assert_eq!(NameMatch::rate("SIZES", "size"), NameMatch::InversePrefixIgnoreCase);
        assert_eq!(NameMatch::rate("", "anything"), NameMatch::Prefix);
        assert_eq!(NameMatch::rate("xyz", "size"), NameMatch::None);
    }

    #[test]
    fn test_type_rating() {
        let int = TypeMeta::primitive(Primitive::Int);
        let long = TypeMeta::primitive(Primitive::Long);
        let integer = Primitive::Int.boxed();
        let shape = ClassMeta::new("geo.Shape").into_type();
        let circle = ClassMeta::new("geo.Circle").extends(shape.clone()).into_type();

        assert_eq!(TypeMatch::rate(Some(&int), None), TypeMatch::Full);
        assert_eq!(TypeMatch::rate(Some(&int), Some(&int)), TypeMatch::Full);
        assert_eq!(TypeMatch::rate(Some(&circle), Some(&shape)), TypeMatch::Inheritance);
        assert_eq!(TypeMatch::rate(Some(&int), Some(&long)), TypeMatch::PrimitiveConversion);
        assert_eq!(TypeMatch::rate(Some(&long), Some(&int)), TypeMatch::None);
        assert_eq!(TypeMatch::rate(Some(&int), Some(&integer)), TypeMatch::Boxed);
        assert_eq!(TypeMatch::rate(Some(&integer), Some(&int)), TypeMatch::Boxed);
        assert_eq!(TypeMatch::rate(Some(&integer), Some(&long)), TypeMatch::BoxedAndConversion);
        assert_eq!(
            TypeMatch::rate(Some(&int), Some(&TypeMeta::number())),
            TypeMatch::BoxedAndInheritance,
        );
        assert_eq!(TypeMatch::rate(Some(&int), Some(&shape)), TypeMatch::None);
        assert_eq!(TypeMatch::rate(None, Some(&shape)), TypeMatch::Full);
        assert_eq!(TypeMatch::rate(None, Some(&int)), TypeMatch::None);
        assert_eq!(TypeMatch::rate(Some(&TypeMeta::void()), Some(&shape)), TypeMatch::None);
    }

    #[test]
    fn test_best_of_ratings() {
        let left = MatchRating::new(NameMatch::Prefix, TypeMatch::None, true);
        let right = MatchRating::new(NameMatch::WildcardMatch, TypeMatch::Inheritance, false);

        assert_eq!(
            left.best(right),
            MatchRating::new(NameMatch::Prefix, TypeMatch::Inheritance, false),
        );
        assert!(left < right);
        assert!(left.is_none());
        assert!(!MatchRating::BEST.is_none());
    }

    #[test]
    fn test_rating_total_order() {
        fn rating(seed: u8) -> MatchRating {
            const NAMES: [NameMatch; 8] = [
                NameMatch::Exact,
                NameMatch::ExactIgnoreCase,
                NameMatch::Prefix,
                NameMatch::PrefixIgnoreCase,
                NameMatch::InversePrefix,
                NameMatch::InversePrefixIgnoreCase,
                NameMatch::WildcardMatch,
                NameMatch::None,
            ];

            const TYPES: [TypeMatch; 7] = [
                TypeMatch::Full,
                TypeMatch::Inheritance,
                TypeMatch::PrimitiveConversion,
                TypeMatch::Boxed,
                TypeMatch::BoxedAndConversion,
                TypeMatch::BoxedAndInheritance,
                TypeMatch::None,
            ];

            MatchRating::new(
                NAMES[(seed % 8) as usize],
                TYPES[((seed / 8) % 7) as usize],
                seed >= 128,
            )
        }

        fn prop(seeds: Vec<u8>) -> TestResult {
            let ratings = seeds.into_iter().map(rating).collect::<Vec<_>>();

            for a in &ratings {
                for b in &ratings {
                    if (a < b) == (b < a) && a != b {
                        return TestResult::failed();
                    }

                    for c in &ratings {
                        if a <= b && b <= c && !(a <= c) {
                            return TestResult::failed();
                        }
                    }
                }
            }

            let mut once = ratings.clone();
            once.sort();

            let mut twice = once.clone();
            twice.reverse();
            twice.sort();

            TestResult::from_bool(once == twice)
        }

        QuickCheck::new()
            .tests(200)
            .quickcheck(prop as fn(Vec<u8>) -> TestResult);
    }
}
