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
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
};

use strsim::normalized_damerau_levenshtein;

const PRECISION: f32 = 0.0001;

/// A similarity score between a typed name and a known name, in percents.
///
/// "100%" means the names are identical, "0%" means they share nothing.
/// Comparison and hashing happen on a fixed-precision representation of the
/// score, so the type is totally ordered.
#[repr(transparent)]
#[derive(Clone, Copy, Default)]
pub struct Closeness(f32);

impl Debug for Closeness {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, formatter)
    }
}

impl Display for Closeness {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{}%", self.percents()))
    }
}

impl PartialEq for Closeness {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.fixed().eq(&other.fixed())
    }
}

impl Eq for Closeness {}

impl PartialOrd for Closeness {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Closeness {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> Ordering {
        self.fixed().cmp(&other.fixed())
    }
}

impl Hash for Closeness {
    #[inline(always)]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fixed().hash(state)
    }
}

impl Closeness {
    /// The lowest closeness at which a known name is offered as a
    /// "did you mean" hint.
    pub const HINT_THRESHOLD: Self = Self(0.5);

    /// Estimates how close the `typed` name is to the `known` name.
    ///
    /// ```
    /// use expr_bar::matching::Closeness;
    ///
    /// assert_eq!(Closeness::of("size", "size").percents(), 100);
    /// assert!(Closeness::of("lenght", "length") > Closeness::of("lenght", "last"));
    /// ```
    pub fn of(typed: impl AsRef<str>, known: impl AsRef<str>) -> Self {
        let score = normalized_damerau_levenshtein(typed.as_ref(), known.as_ref());

        Self((score as f32 / PRECISION) as usize as f32 * PRECISION)
    }

    /// Returns the score rounded to the nearest integer percent.
    #[inline(always)]
    pub fn percents(self) -> u16 {
        ((self.0 * 1000.0).round() / 10.0) as u16
    }

    #[inline(always)]
    fn fixed(self) -> u32 {
        (self.0 / PRECISION) as u32
    }
}

/// Picks the known name closest to the `typed` one, if any of them is close
/// enough to be a plausible typo.
///
/// Ties resolve to the name that comes first in the iteration order.
pub fn did_you_mean<'a>(
    typed: &str,
    known: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let mut best: Option<(Closeness, &'a str)> = None;

    for candidate in known {
        if candidate == typed {
            continue;
        }

        let closeness = Closeness::of(typed, candidate);

        if closeness < Closeness::HINT_THRESHOLD {
            continue;
        }

        match &best {
            Some((current, _)) if *current >= closeness => (),
            _ => best = Some((closeness, candidate)),
        }
    }

    best.map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use crate::matching::{closeness::did_you_mean, Closeness};

    #[test]
    fn test_closeness_order() {
        assert_eq!(Closeness::of("value", "value").percents(), 100);
        assert_eq!(Closeness::of("abc", "xyz").percents(), 0);
        assert!(Closeness::of("vaule", "value") > Closeness::of("vaule", "vector"));
    }

    #[test]
    fn test_did_you_mean() {
        let known = ["length", "last", "list"];

        assert_eq!(did_you_mean("lenght", known), Some("length"));
        assert_eq!(did_you_mean("qqqqqqqq", known), None);
        assert_eq!(did_you_mean("length", ["length"]), None);
    }
}
