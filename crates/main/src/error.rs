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
    error::Error as StdError,
    fmt::{Display, Formatter},
};

use lady_deirdre::{
    format::{Style, TerminalString},
    lexis::Site,
};

use crate::runtime::InvocationError;

/// An alias type for the results of the engine entry points.
pub type ParseResult<T> = Result<T, ParseError>;

/// The class of a [ParseError].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The text is not a valid expression in the current scope.
    Syntax,

    /// The text has several equally good interpretations.
    Ambiguous,

    /// The text is a valid expression, but its evaluation failed. The
    /// [cause](ParseError::cause) holds the failure.
    Evaluation,

    /// The engine violated its own invariant. Errors of this kind are
    /// bugs and are never triggered by the input alone.
    Internal,
}

impl Display for ParseErrorKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Syntax => "syntax error",
            Self::Ambiguous => "ambiguous expression",
            Self::Evaluation => "evaluation error",
            Self::Internal => "internal error",
        })
    }
}

/// An error of the [evaluate](crate::ExpressionEngine::evaluate) and
/// [compile](crate::ExpressionEngine::compile) entry points.
///
/// The engine tries several interpretations of the text and reports a single
/// error: the one of the interpretation that got the furthest with the
/// highest confidence.
#[derive(Clone, Debug)]
pub struct ParseError {
    /// The character index of the offending fragment.
    pub position: Site,

    /// A human-readable description of the problem.
    pub message: String,

    pub kind: ParseErrorKind,

    /// The host failure behind an [Evaluation](ParseErrorKind::Evaluation)
    /// error.
    pub cause: Option<InvocationError>,
}

impl Display for ParseError {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!(
            "{} at {}: {}",
            self.kind, self.position, self.message,
        ))
    }
}

impl StdError for ParseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl ParseError {
    #[inline(always)]
    pub(crate) fn new(position: Site, message: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            position,
            message: message.into(),
            kind,
            cause: None,
        }
    }

    /// Renders the expression `text` with a marker under the offending
    /// position, followed by the message.
    ///
    /// The result contains terminal escape sequences.
    pub fn display(&self, text: &str) -> String {
        let line = text
            .chars()
            .map(|ch| match ch {
                '\n' | '\r' | '\t' => ' ',
                other => other,
            })
            .collect::<String>();

        let position = self.position.min(line.chars().count());

        let header = format!("{}:", self.kind).apply(Style::new().bold().red());
        let marker = "^".apply(Style::new().bold().red());
        let gutter = "|".apply(Style::new().bright_black());

        format!(
            "{header} {}\n {gutter} {}\n {gutter} {}{marker}",
            self.message.sanitize(),
            line.sanitize(),
            " ".repeat(position),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use lady_deirdre::format::TerminalString;

    use crate::{runtime::InvocationError, ParseError, ParseErrorKind};

    #[test]
    fn test_error_rendering() {
        let error = ParseError::new(4, "unexpected ')'", ParseErrorKind::Syntax);

        assert_eq!(error.to_string(), "syntax error at 4: unexpected ')'");
        assert!(error.source().is_none());

        let display = error.display("1 + )");
        let plain = display.sanitize();
        let lines = plain.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("unexpected ')'"));
        assert!(lines[1].ends_with("1 + )"));
        assert_eq!(lines[2].find('^'), lines[1].find(')'));
    }

    #[test]
    fn test_error_cause() {
        let mut error = ParseError::new(2, "division by zero", ParseErrorKind::Evaluation);

        error.cause = Some(InvocationError::DivisionByZero);

        assert!(error.source().is_some());
        assert_eq!(error.display("1 / 0").sanitize().lines().count(), 3);
    }
}
