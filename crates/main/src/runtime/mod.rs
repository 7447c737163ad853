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

//! The object model expressions operate on.
//!
//! Types are described by [TypeMeta] descriptors and values by [Value].
//! Everything the engine knows about the members of a type comes from a
//! [TypeProvider]: the engine enumerates fields and executables through it
//! and performs every read, write and invocation through it as well.
//!
//! The [SchemaProvider] is a ready-to-use provider over classes registered
//! with the [ClassSchema] builder:
//!
//! ```
//! use expr_bar::runtime::{ClassMeta, ClassSchema, Record, SchemaProvider, TypeMeta, Value};
//!
//! let point = ClassMeta::new("geometry.Point").into_type();
//!
//! let provider = SchemaProvider::new().with(
//!     ClassSchema::new(point.clone())
//!         .field("x", TypeMeta::primitive(expr_bar::runtime::Primitive::Int))
//!         .field("y", TypeMeta::primitive(expr_bar::runtime::Primitive::Int)),
//! );
//!
//! let origin: Value = Record::new(point).with("x", 0).with("y", 0).into_value();
//!
//! assert!(!origin.is_null());
//! # let _ = provider;
//! ```

mod error;
mod hierarchy;
mod lambda;
mod provider;
mod schema;
mod ty;
mod value;
mod variables;

pub use crate::runtime::{
    error::{InvocationError, InvocationResult},
    hierarchy::HierarchyNode,
    lambda::LambdaValue,
    provider::{
        merge_overloads,
        resolve_shadowing,
        AccessLevel,
        ExecutableKind,
        ExecutableMeta,
        FieldMeta,
        TypeProvider,
    },
    schema::{ClassSchema, FieldGetter, FieldSetter, MethodBody, SchemaProvider},
    ty::{ClassMeta, FunctionSignature, Primitive, TypeKind, TypeMeta},
    value::{ArrayValue, HostObject, Record, Value},
    variables::{Variable, Variables},
};
