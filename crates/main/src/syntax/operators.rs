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

use std::fmt::{Display, Formatter};

use crate::syntax::TokenStream;

/// A binary infix operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOperator {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Le,
    Gt,
    Ge,
    InstanceOf,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl Display for BinaryOperator {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.symbol())
    }
}

// Longer symbols go first, so the longest match wins.
const SYMBOLS: [(&str, BinaryOperator); 19] = [
    (">>>", BinaryOperator::UShr),
    ("<<", BinaryOperator::Shl),
    (">>", BinaryOperator::Shr),
    ("<=", BinaryOperator::Le),
    (">=", BinaryOperator::Ge),
    ("==", BinaryOperator::Eq),
    ("!=", BinaryOperator::Ne),
    ("&&", BinaryOperator::And),
    ("||", BinaryOperator::Or),
    ("*", BinaryOperator::Mul),
    ("/", BinaryOperator::Div),
    ("%", BinaryOperator::Rem),
    ("+", BinaryOperator::Add),
    ("-", BinaryOperator::Sub),
    ("<", BinaryOperator::Lt),
    (">", BinaryOperator::Gt),
    ("&", BinaryOperator::BitAnd),
    ("^", BinaryOperator::BitXor),
    ("|", BinaryOperator::BitOr),
];

impl BinaryOperator {
    /// The lowest precedence of a binary operator.
    pub const MIN_PRECEDENCE: u8 = 1;

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::InstanceOf => "instanceof",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Binding strength: operators with a higher value bind tighter. All
    /// binary operators are left-associative.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Rem => 10,
            Self::Add | Self::Sub => 9,
            Self::Shl | Self::Shr | Self::UShr => 8,
            Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::InstanceOf => 7,
            Self::Eq | Self::Ne => 6,
            Self::BitAnd => 5,
            Self::BitXor => 4,
            Self::BitOr => 3,
            Self::And => 2,
            Self::Or => 1,
        }
    }

    /// Returns true for `&&` and `||`.
    #[inline(always)]
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Returns the operator at the stream cursor without consuming it.
    ///
    /// The assignment `=` and the lambda arrow `->` are not binary
    /// operators.
    pub fn peek(stream: &TokenStream) -> Option<Self> {
        if stream.peek_keyword("instanceof") {
            return Some(Self::InstanceOf);
        }

        if stream.peek_str("->") {
            return None;
        }

        SYMBOLS
            .iter()
            .find(|(symbol, _)| stream.peek_str(symbol))
            .map(|(_, operator)| *operator)
    }

    /// Consumes the operator returned by [peek](Self::peek).
    pub fn consume(self, stream: &mut TokenStream) {
        let _ = stream.skip_str(self.symbol());
    }
}

/// A prefix operator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum UnaryOperator {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl Display for UnaryOperator {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.symbol())
    }
}

impl UnaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }

    /// Consumes a prefix operator at the stream cursor, if there is one.
    pub fn read(stream: &mut TokenStream) -> Option<Self> {
        let operator = match stream.peek_char()? {
            '-' => Self::Neg,
            '+' => Self::Plus,
            '!' if !stream.peek_str("!=") => Self::Not,
            '~' => Self::BitNot,
            _ => return None,
        };

        let _ = stream.skip_str(operator.symbol());

        Some(operator)
    }
}

/// Returns true if the stream cursor is at the assignment `=` (and not at
/// `==`).
pub fn peek_assignment(stream: &TokenStream) -> bool {
    stream.peek_str("=") && !stream.peek_str("==")
}

#[cfg(test)]
mod tests {
    use crate::syntax::{peek_assignment, BinaryOperator, TokenStream, UnaryOperator};

    #[test]
    fn test_longest_match() {
        let cases = [
            (" >>> 1", Some(BinaryOperator::UShr)),
            ("<= 1", Some(BinaryOperator::Le)),
            ("< 1", Some(BinaryOperator::Lt)),
            ("&& x", Some(BinaryOperator::And)),
            ("& x", Some(BinaryOperator::BitAnd)),
            (" instanceof Foo", Some(BinaryOperator::InstanceOf)),
            (" instanceofFoo", None),
            ("-> x", None),
            ("= 3", None),
        ];

        for (text, expected) in cases {
            assert_eq!(BinaryOperator::peek(&TokenStream::new(text, None)), expected, "{text}");
        }

        let mut stream = TokenStream::new(" >> 2", None);

        BinaryOperator::Shr.consume(&mut stream);

        assert_eq!(stream.position(), 3);
    }

    #[test]
    fn test_precedence_table() {
        assert!(BinaryOperator::Mul.precedence() > BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Add.precedence() > BinaryOperator::Shl.precedence());
        assert_eq!(
            BinaryOperator::Lt.precedence(),
            BinaryOperator::InstanceOf.precedence(),
        );
        assert!(BinaryOperator::Eq.precedence() > BinaryOperator::BitAnd.precedence());
        assert!(BinaryOperator::And.precedence() > BinaryOperator::Or.precedence());
        assert_eq!(BinaryOperator::Or.precedence(), BinaryOperator::MIN_PRECEDENCE);
    }

    #[test]
    fn test_prefix_and_assignment() {
        let mut stream = TokenStream::new(" !x", None);

        assert_eq!(UnaryOperator::read(&mut stream), Some(UnaryOperator::Not));
        assert_eq!(stream.position(), 2);
        assert_eq!(UnaryOperator::read(&mut TokenStream::new("x", None)), None);

        assert!(peek_assignment(&TokenStream::new(" = 1", None)));
        assert!(!peek_assignment(&TokenStream::new(" == 1", None)));
    }
}
