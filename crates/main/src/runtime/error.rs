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
    result::Result as StdResult,
    sync::Arc,
};

use compact_str::CompactString;

use crate::runtime::TypeMeta;

/// A result of a member access or a callable invocation, which can either be
/// a normal value or an [InvocationError].
pub type InvocationResult<T> = StdResult<T, InvocationError>;

/// A failure raised while reading or writing a member, invoking a callable,
/// or applying an operator to concrete values.
///
/// The engine never lets this error escape on its own: the
/// [evaluation](crate::ExpressionEngine::evaluate) entry point wraps it into
/// a [ParseError](crate::ParseError) that points at the expression
/// fragment that failed.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum InvocationError {
    /// A host callable or accessor reported a failure.
    Failed {
        /// A human-readable description of the failure.
        message: String,

        /// The underlying error, if the host provided one.
        cause: Option<Arc<dyn StdError + Send + Sync>>,
    },

    /// A member access or a call on a `null` value.
    NullReference {
        /// The name of the accessed member, or the operation.
        member: CompactString,
    },

    /// The provider does not know the requested member.
    UnknownMember {
        /// The type whose member was requested.
        ty: TypeMeta,

        /// The name of the member.
        name: CompactString,
    },

    /// A value of an unexpected type was supplied.
    TypeMismatch {
        /// The required type.
        expected: TypeMeta,

        /// The supplied value's type, or None for `null`.
        actual: Option<TypeMeta>,
    },

    /// The number of supplied arguments differs from the number of
    /// parameters.
    ArityMismatch {
        expected: usize,
        actual: usize,
    },

    /// An array index outside of the array bounds.
    OutOfBounds {
        index: i64,
        length: usize,
    },

    /// An attempt to assign a final member or variable.
    FinalAssignment {
        name: CompactString,
    },

    /// A reference cast to an unrelated type.
    ClassCast {
        from: TypeMeta,
        to: TypeMeta,
    },

    /// Integer division or remainder by zero.
    DivisionByZero,
}

impl Display for InvocationError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed { message, .. } => formatter.write_str(message),

            Self::NullReference { member } => {
                formatter.write_fmt(format_args!("cannot access '{member}' of null"))
            }

            Self::UnknownMember { ty, name } => {
                formatter.write_fmt(format_args!("type '{ty}' has no member '{name}'"))
            }

            Self::TypeMismatch {
                expected,
                actual: Some(actual),
            } => formatter.write_fmt(format_args!("expected '{expected}', found '{actual}'")),

            Self::TypeMismatch {
                expected,
                actual: None,
            } => formatter.write_fmt(format_args!("expected '{expected}', found null")),

            Self::ArityMismatch { expected, actual } => formatter.write_fmt(format_args!(
                "expected {expected} arguments, but {actual} supplied",
            )),

            Self::OutOfBounds { index, length } => {
                formatter.write_fmt(format_args!("index {index} out of 0..{length} bounds"))
            }

            Self::FinalAssignment { name } => {
                formatter.write_fmt(format_args!("cannot assign final '{name}'"))
            }

            Self::ClassCast { from, to } => {
                formatter.write_fmt(format_args!("cannot cast '{from}' to '{to}'"))
            }

            Self::DivisionByZero => formatter.write_str("division by zero"),
        }
    }
}

impl StdError for InvocationError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Failed {
                cause: Some(cause), ..
            } => Some(cause.as_ref()),

            _ => None,
        }
    }
}

impl InvocationError {
    /// Creates a [Failed](Self::Failed) error without a cause.
    #[inline(always)]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a [Failed](Self::Failed) error that wraps the `cause` error.
    pub fn caused_by(cause: impl StdError + Send + Sync + 'static) -> Self {
        Self::Failed {
            message: cause.to_string(),
            cause: Some(Arc::new(cause)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use crate::runtime::{InvocationError, Primitive, TypeMeta};

    #[test]
    fn test_error_messages() {
        let error = InvocationError::TypeMismatch {
            expected: TypeMeta::primitive(Primitive::Int),
            actual: Some(TypeMeta::string()),
        };

        assert_eq!(error.to_string(), "expected 'int', found 'String'");

        let parse = "x".parse::<i32>().unwrap_err();
        let error = InvocationError::caused_by(parse);

        assert!(error.source().is_some());
        assert_eq!(
            InvocationError::failed("boom").to_string(),
            "boom",
        );
    }
}
