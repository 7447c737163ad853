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

//! The recursive-descent parser framework.
//!
//! Every grammar construct has its own [Parser]. A parser is a single-use
//! object: its [parse](Parser::parse) function consumes it, so a parser
//! cannot be reused by construction. Alternative parsers try the same
//! position on their own clones of the [TokenStream], and [merge] combines
//! their outcomes.
//!
//! Parsing and evaluation go together: every recognized subexpression is
//! evaluated right away if the [ExecutionPolicy] allows, so the members of
//! the following subexpressions can be looked up in runtime types.

mod complete;
mod context;
mod expression;
mod members;
mod operand;
mod outcome;
mod tail;
mod types;

use std::sync::Arc;

use crate::{
    runtime::TypeMeta,
    syntax::TokenStream,
    tree::{Node, ObjectInfo},
};

pub(crate) use crate::parse::{
    context::{ExecutionPolicy, Expectation, ParseContext},
    expression::ExpressionParser,
    outcome::{merge, ErrorPriority, ObjectOutcome, ParseOutcome},
};
use crate::parse::outcome::{Step, SyntaxFailure};

/// A grammar construct parser.
pub(crate) trait Parser: Sized {
    /// Consumes the tokens of the construct.
    ///
    /// Both the success and the failure channels carry a [ParseOutcome]:
    /// the failure channel lets the nested reads bail out with `?`.
    fn step(
        self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome>;

    /// Parses the construct at the `stream` cursor and checks the result
    /// against the `expectation`.
    ///
    /// The `stream` is left intact. The caller moves its cursor to the
    /// [end](ParseOutcome::end) of the result it accepts.
    fn parse(
        self,
        ctx: &ParseContext,
        stream: &TokenStream,
        expectation: &Expectation,
    ) -> ParseOutcome {
        let mut attempt = stream.clone();

        let outcome = match self.step(ctx, &mut attempt, expectation) {
            Ok(outcome) => outcome,
            Err(outcome) => outcome,
        };

        expectation.check(ctx, stream, outcome)
    }
}

/// Identifiers that never name a variable, a member or a class.
pub(crate) const KEYWORDS: &[&str] = &["true", "false", "null", "this", "new", "instanceof"];

#[inline(always)]
pub(crate) fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Passes a value through, and everything else through the failure
/// channel.
pub(crate) fn into_object(outcome: ParseOutcome) -> Step<ObjectOutcome> {
    match outcome {
        ParseOutcome::Object(object) => Ok(object),
        other => Err(other),
    }
}

/// The error of an alternative that does not recognize the token at the
/// cursor.
///
/// All alternatives report the same message, so the merged error mentions
/// the token once.
pub(crate) fn unrecognized(stream: &TokenStream) -> ParseOutcome {
    let position = stream.next_token_start();

    let message = match (stream.peek_identifier(), stream.peek_char()) {
        (Some(name), _) => format!("cannot resolve symbol '{name}'"),
        (None, Some(ch)) => format!("unexpected '{ch}'"),
        (None, None) => String::from("unexpected end of expression"),
    };

    ParseOutcome::SyntaxError(SyntaxFailure {
        position,
        message,
        priority: ErrorPriority::WrongParser,
        cause: None,
    })
}

impl ObjectOutcome {
    /// Evaluates the `node` as far as the context allows and describes the
    /// result.
    pub(crate) fn produce(
        ctx: &ParseContext,
        node: Arc<Node>,
        parts: Vec<ObjectInfo>,
        declared: Option<TypeMeta>,
        start: usize,
        end: usize,
        description: String,
    ) -> Step<Self> {
        let info = {
            let operands = parts.iter().collect::<Vec<_>>();

            ctx.evaluate(&node, &operands, declared)?
        };

        Ok(Self {
            node,
            info,
            parts,
            start,
            end,
            description,
        })
    }
}
