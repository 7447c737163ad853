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

use std::sync::Arc;

use compact_str::CompactString;
use lady_deirdre::lexis::Site;
use log::trace;

use crate::{
    analysis::{merge_candidate, Candidate},
    runtime::{InvocationError, TypeMeta},
    syntax::CompletionInfo,
    tree::{Node, ObjectInfo},
    PARSER_LOG,
};

/// A parser's commitment to its interpretation of the input.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) enum Confidence {
    /// The input does not even start the way this parser expects.
    WrongParser,

    /// The input starts the way this parser expects.
    PotentiallyRightParser,

    /// The input can only be meant for this parser.
    RightParser,
}

/// The monotonic confidence of a single parser.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Tracker(Confidence);

impl Default for Tracker {
    #[inline(always)]
    fn default() -> Self {
        Self(Confidence::WrongParser)
    }
}

impl Tracker {
    #[inline(always)]
    pub(crate) fn confidence(&self) -> Confidence {
        self.0
    }

    /// Raises the confidence. Lowering it is a framework defect.
    pub(crate) fn raise(&mut self, confidence: Confidence) -> Step<()> {
        if confidence < self.0 {
            return Err(ParseOutcome::InternalError(format!(
                "parser confidence lowered from {:?} to {confidence:?}",
                self.0,
            )));
        }

        self.0 = confidence;

        Ok(())
    }

    /// Raises the confidence to at least the `confidence` level.
    #[inline(always)]
    pub(crate) fn commit(&mut self, confidence: Confidence) -> Step<()> {
        self.raise(confidence.max(self.0))
    }

    /// A syntax error reported with the current confidence.
    pub(crate) fn error(&self, position: Site, message: impl Into<String>) -> ParseOutcome {
        ParseOutcome::SyntaxError(SyntaxFailure {
            position,
            message: message.into(),
            priority: self.0.into(),
            cause: None,
        })
    }

    /// Reports the errors of a nested parse with at least the current
    /// confidence.
    #[inline(always)]
    pub(crate) fn lift(&self, outcome: ParseOutcome) -> ParseOutcome {
        outcome.at_least(self.0.into())
    }
}

/// The class of a syntax error. When all alternatives fail, the errors of
/// the highest class win.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) enum ErrorPriority {
    WrongParser,
    PotentiallyRightParser,
    RightParser,

    /// The input is well-formed, but its evaluation failed.
    Evaluation,
}

impl From<Confidence> for ErrorPriority {
    #[inline(always)]
    fn from(value: Confidence) -> Self {
        match value {
            Confidence::WrongParser => Self::WrongParser,
            Confidence::PotentiallyRightParser => Self::PotentiallyRightParser,
            Confidence::RightParser => Self::RightParser,
        }
    }
}

pub(crate) type Step<T> = Result<T, ParseOutcome>;

/// The result of a parser.
#[derive(Clone, Debug)]
pub(crate) enum ParseOutcome {
    Object(ObjectOutcome),
    Class(ClassOutcome),
    Package(PackageOutcome),
    Completions(CompletionOutcome),
    SyntaxError(SyntaxFailure),
    Ambiguous(Ambiguity),
    InternalError(String),
}

/// A subexpression that produces a value.
#[derive(Clone, Debug)]
pub(crate) struct ObjectOutcome {
    pub(crate) node: Arc<Node>,
    pub(crate) info: ObjectInfo,

    /// What is known about the operands of the node, in the node's operand
    /// order.
    pub(crate) parts: Vec<ObjectInfo>,
    pub(crate) start: Site,
    pub(crate) end: Site,
    pub(crate) description: String,
}

/// A subexpression that names a class.
#[derive(Clone, Debug)]
pub(crate) struct ClassOutcome {
    pub(crate) ty: TypeMeta,
    pub(crate) start: Site,
    pub(crate) end: Site,
}

/// A subexpression that names a package.
#[derive(Clone, Debug)]
pub(crate) struct PackageOutcome {
    pub(crate) name: CompactString,
    pub(crate) start: Site,
    pub(crate) end: Site,
}

#[derive(Clone, Debug)]
pub(crate) struct CompletionOutcome {
    pub(crate) info: CompletionInfo,
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Clone, Debug)]
pub(crate) struct SyntaxFailure {
    pub(crate) position: Site,
    pub(crate) message: String,
    pub(crate) priority: ErrorPriority,
    pub(crate) cause: Option<InvocationError>,
}

#[derive(Clone, Debug)]
pub(crate) struct Ambiguity {
    pub(crate) position: Site,
    pub(crate) message: String,
}

impl ParseOutcome {
    /// The start of a valid result.
    pub(crate) fn start(&self) -> Option<Site> {
        match self {
            Self::Object(outcome) => Some(outcome.start),
            Self::Class(outcome) => Some(outcome.start),
            Self::Package(outcome) => Some(outcome.start),
            _ => None,
        }
    }

    /// The end of a valid result.
    pub(crate) fn end(&self) -> Option<Site> {
        match self {
            Self::Object(outcome) => Some(outcome.end),
            Self::Class(outcome) => Some(outcome.end),
            Self::Package(outcome) => Some(outcome.end),
            _ => None,
        }
    }

    /// A human-readable description of a valid result.
    pub(crate) fn description(&self) -> String {
        match self {
            Self::Object(outcome) => outcome.description.clone(),
            Self::Class(outcome) => format!("class {}", outcome.ty.qualified_name()),
            Self::Package(outcome) => format!("package {}", outcome.name),
            Self::Completions(_) => String::from("completions"),
            Self::SyntaxError(failure) => failure.message.clone(),
            Self::Ambiguous(ambiguity) => ambiguity.message.clone(),
            Self::InternalError(message) => message.clone(),
        }
    }

    /// Moves a syntax error up to the `priority` class if it is lower.
    pub(crate) fn at_least(self, priority: ErrorPriority) -> Self {
        match self {
            Self::SyntaxError(mut failure) if failure.priority < priority => {
                failure.priority = priority;
                Self::SyntaxError(failure)
            }
            other => other,
        }
    }

    /// Moves a syntax error down to the `priority` class if it is higher.
    pub(crate) fn at_most(self, priority: ErrorPriority) -> Self {
        match self {
            Self::SyntaxError(mut failure) if failure.priority > priority => {
                failure.priority = priority;
                Self::SyntaxError(failure)
            }
            other => other,
        }
    }
}

/// Combines the outcomes of alternative parsers tried at the same position.
///
/// Completions win over everything else and are united. Otherwise several
/// valid results (or any ambiguity) make the input ambiguous, and a single
/// valid result is the result. If every alternative failed, the errors of
/// the highest priority class at the furthest position win.
pub(crate) fn merge(outcomes: Vec<ParseOutcome>) -> ParseOutcome {
    if let Some(internal) = outcomes
        .iter()
        .find(|outcome| matches!(outcome, ParseOutcome::InternalError(_)))
    {
        return internal.clone();
    }

    let mut completions: Option<CompletionOutcome> = None;
    let mut valid = Vec::new();
    let mut ambiguities = Vec::new();
    let mut errors = Vec::new();

    for outcome in outcomes {
        match outcome {
            ParseOutcome::Completions(outcome) => match &mut completions {
                Some(united) => {
                    for candidate in outcome.candidates {
                        merge_candidate(&mut united.candidates, candidate);
                    }
                }

                None => completions = Some(outcome),
            },

            ParseOutcome::Ambiguous(ambiguity) => ambiguities.push(ambiguity),
            ParseOutcome::SyntaxError(failure) => errors.push(failure),
            ParseOutcome::InternalError(_) => (),
            valid_outcome => valid.push(valid_outcome),
        }
    }

    if let Some(completions) = completions {
        trace!(
            target: PARSER_LOG,
            "Merged {} completion candidates.",
            completions.candidates.len(),
        );

        return ParseOutcome::Completions(completions);
    }

    if valid.len() > 1 || !ambiguities.is_empty() {
        let mut position = Site::MAX;
        let mut descriptions = Vec::new();

        for outcome in &valid {
            position = position.min(outcome.start().unwrap_or_default());
            descriptions.push(outcome.description());
        }

        for ambiguity in ambiguities {
            position = position.min(ambiguity.position);
            descriptions.push(ambiguity.message);
        }

        trace!(target: PARSER_LOG, "Ambiguous alternatives at {position}.");

        return ParseOutcome::Ambiguous(Ambiguity {
            position,
            message: format!("ambiguous expression: {}", descriptions.join(" or ")),
        });
    }

    if let Some(outcome) = valid.pop() {
        return outcome;
    }

    let Some(priority) = errors.iter().map(|failure| failure.priority).max() else {
        return ParseOutcome::InternalError(String::from("no alternatives to merge"));
    };

    errors.retain(|failure| failure.priority == priority);

    let position = errors
        .iter()
        .map(|failure| failure.position)
        .max()
        .unwrap_or_default();

    errors.retain(|failure| failure.position == position);

    let mut messages: Vec<String> = Vec::with_capacity(errors.len());
    let mut cause = None;

    for failure in errors {
        if cause.is_none() {
            cause = failure.cause;
        }

        if !messages.contains(&failure.message) {
            messages.push(failure.message);
        }
    }

    ParseOutcome::SyntaxError(SyntaxFailure {
        position,
        message: messages.join("; "),
        priority,
        cause,
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::{Candidate, CompletionKind},
        parse::outcome::{
            merge,
            Ambiguity,
            ClassOutcome,
            CompletionOutcome,
            Confidence,
            ErrorPriority,
            PackageOutcome,
            ParseOutcome,
            SyntaxFailure,
            Tracker,
        },
        rating::{MatchRating, NameMatch, TypeMatch},
        runtime::TypeMeta,
        syntax::{TokenError, TokenStream},
    };

    fn error(position: usize, message: &str, priority: ErrorPriority) -> ParseOutcome {
        ParseOutcome::SyntaxError(SyntaxFailure {
            position,
            message: message.to_string(),
            priority,
            cause: None,
        })
    }

    fn class(start: usize) -> ParseOutcome {
        ParseOutcome::Class(ClassOutcome {
            ty: TypeMeta::string(),
            start,
            end: start + 6,
        })
    }

    fn completions(name: &str, name_match: NameMatch) -> ParseOutcome {
        let mut stream = TokenStream::new("x", Some(1));

        let Err(TokenError::Completion(info)) = stream.read_identifier() else {
            panic!("Completion expected.");
        };

        ParseOutcome::Completions(CompletionOutcome {
            info,
            candidates: vec![Candidate {
                kind: CompletionKind::Member,
                display: name.to_string(),
                insertion: name.to_string(),
                detail: None,
                range: 0..1,
                rating: MatchRating::new(name_match, TypeMatch::Full, false),
                declaring: None,
            }],
        })
    }

    #[test]
    fn test_completions_win() {
        let merged = merge(vec![
            class(0),
            completions("xa", NameMatch::Prefix),
            error(3, "unexpected", ErrorPriority::Evaluation),
            completions("xa", NameMatch::PrefixIgnoreCase),
            completions("xb", NameMatch::Prefix),
        ]);

        let ParseOutcome::Completions(merged) = merged else {
            panic!("Completions expected.");
        };

        assert_eq!(merged.candidates.len(), 2);
        assert_eq!(merged.candidates[0].rating.name, NameMatch::Prefix);
    }

    #[test]
    fn test_ambiguity() {
        let merged = merge(vec![
            class(4),
            ParseOutcome::Package(PackageOutcome {
                name: "core".into(),
                start: 2,
                end: 6,
            }),
            error(10, "unexpected", ErrorPriority::RightParser),
        ]);

        let ParseOutcome::Ambiguous(ambiguity) = merged else {
            panic!("Ambiguity expected.");
        };

        assert_eq!(ambiguity.position, 2);
        assert!(ambiguity.message.contains("class core.String"));
        assert!(ambiguity.message.contains("package core"));

        let merged = merge(vec![
            error(1, "a", ErrorPriority::WrongParser),
            ParseOutcome::Ambiguous(Ambiguity {
                position: 5,
                message: String::from("two fields"),
            }),
        ]);

        assert!(matches!(merged, ParseOutcome::Ambiguous(ambiguity) if ambiguity.position == 5));
    }

    #[test]
    fn test_single_valid_result() {
        let merged = merge(vec![
            error(9, "far", ErrorPriority::Evaluation),
            class(0),
        ]);

        assert!(matches!(merged, ParseOutcome::Class(_)));
    }

    #[test]
    fn test_error_priority_then_position() {
        let merged = merge(vec![
            error(9, "far but unsure", ErrorPriority::WrongParser),
            error(2, "near", ErrorPriority::RightParser),
            error(4, "first", ErrorPriority::RightParser),
            error(4, "second", ErrorPriority::RightParser),
            error(4, "first", ErrorPriority::RightParser),
        ]);

        let ParseOutcome::SyntaxError(failure) = merged else {
            panic!("Syntax error expected.");
        };

        assert_eq!(failure.position, 4);
        assert_eq!(failure.message, "first; second");
        assert_eq!(failure.priority, ErrorPriority::RightParser);
    }

    #[test]
    fn test_confidence_is_monotonic() {
        let mut tracker = Tracker::default();

        assert!(tracker.raise(Confidence::RightParser).is_ok());
        assert!(tracker.raise(Confidence::RightParser).is_ok());
        assert!(matches!(
            tracker.raise(Confidence::PotentiallyRightParser),
            Err(ParseOutcome::InternalError(_)),
        ));
        assert_eq!(tracker.confidence(), Confidence::RightParser);
    }
}
