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

//! # Expr Bar
//!
//! An engine that parses, evaluates and completes expressions written in a
//! small Java-like expression language over an introspectable object model.
//!
//! An expression is always interpreted against a *root object*: member
//! names without a qualifier refer to the fields and methods of the root.
//! The engine learns the members of every type from a
//! [TypeProvider](runtime::TypeProvider), so the same engine can serve any
//! host object model.
//!
//! ```
//! use std::sync::Arc;
//!
//! use expr_bar::{
//!     runtime::{ClassMeta, ClassSchema, Primitive, Record, SchemaProvider, TypeMeta},
//!     ExpressionEngine,
//! };
//!
//! let point = ClassMeta::new("geometry.Point").into_type();
//! let int = TypeMeta::primitive(Primitive::Int);
//!
//! let provider = SchemaProvider::new().with(
//!     ClassSchema::new(point.clone())
//!         .field("x", int.clone())
//!         .field("y", int),
//! );
//!
//! let engine = ExpressionEngine::new(Arc::new(provider));
//! let root = Record::new(point).with("x", 3).with("y", 4).into_value();
//!
//! let value = engine.evaluate("x * x + y * y", &root).unwrap();
//!
//! assert_eq!(value.as_i64(), Some(25));
//!
//! let completions = engine.get_completions("x + ", 4, &root);
//!
//! assert!(completions.find("y").is_some());
//! ```
//!
//! The main entry points are the methods of the [ExpressionEngine]:
//! [evaluate](ExpressionEngine::evaluate),
//! [compile](ExpressionEngine::compile) and
//! [get_completions](ExpressionEngine::get_completions).
//!
//! The building blocks of the engine are public too: the [matching] module
//! provides the multi-string matcher behind class name completions, and the
//! [rating] module scores the candidate members against what the user typed
//! and what the context expects.

#![doc(html_root_url = "https://docs.rs/expr-bar")]
#![forbid(unsafe_code)]

pub mod analysis;
mod config;
mod engine;
mod error;
pub mod matching;
mod parse;
pub mod rating;
mod report;
pub mod runtime;
pub mod syntax;
mod tree;

#[cfg(test)]
mod fixtures;

pub use crate::{
    config::{EngineConfig, EvaluationMode},
    engine::{CompiledExpression, ExpressionEngine},
    error::{ParseError, ParseErrorKind, ParseResult},
};

pub(crate) static ENGINE_LOG: &str = "expr-bar::$engine";
pub(crate) static PARSER_LOG: &str = "expr-bar::$parser";
pub(crate) static MATCHER_LOG: &str = "expr-bar::$matcher";
