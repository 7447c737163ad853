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
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

use crate::{
    runtime::{InvocationError, InvocationResult, TypeMeta, TypeProvider, Value, Variables},
    tree::{ops, EvalEnv, Node},
};

/// A function value created by a lambda expression.
///
/// The lambda captures its evaluation environment (the root object, the
/// variables and the enclosing lambda parameters), so host code may call
/// it any time later through [call](Self::call).
pub struct LambdaValue {
    ty: TypeMeta,
    params: usize,
    body: Arc<Node>,
    provider: Arc<dyn TypeProvider>,
    root: Value,
    variables: Variables,
    captured: Vec<Value>,
}

impl Debug for LambdaValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LambdaValue")
            .field("ty", &self.ty)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Display for LambdaValue {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "lambda({})", self.ty)
    }
}

impl LambdaValue {
    pub(crate) fn new(ty: TypeMeta, params: usize, body: Arc<Node>, env: &EvalEnv) -> Self {
        Self {
            ty,
            params,
            body,
            provider: env.provider.clone(),
            root: env.root.clone(),
            variables: env.variables.clone(),
            captured: env.locals.to_vec(),
        }
    }

    /// The functional class this lambda implements.
    #[inline(always)]
    pub fn type_meta(&self) -> &TypeMeta {
        &self.ty
    }

    /// The number of parameters.
    #[inline(always)]
    pub fn arity(&self) -> usize {
        self.params
    }

    /// Calls the lambda.
    ///
    /// The arguments are converted to the parameter types of the functional
    /// signature, and the result to its output type (unless the output is
    /// `void`, in which case the result is `null`).
    pub fn call(&self, arguments: &[Value]) -> InvocationResult<Value> {
        if arguments.len() != self.params {
            return Err(InvocationError::ArityMismatch {
                expected: self.params,
                actual: arguments.len(),
            });
        }

        let mut locals = self.captured.clone();

        match self.ty.signature() {
            Some(signature) => {
                for (argument, param) in arguments.iter().zip(signature.params.iter()) {
                    locals.push(ops::coerce(argument.clone(), param)?);
                }
            }

            None => locals.extend(arguments.iter().cloned()),
        }

        let env = EvalEnv {
            provider: &self.provider,
            root: &self.root,
            variables: &self.variables,
            locals: &locals,
        };

        let result = self
            .body
            .evaluate(&env)
            .map_err(|failure| failure.error)?;

        match self.ty.signature() {
            Some(signature) if signature.output.is_void() => Ok(Value::Null),
            Some(signature) => ops::coerce(result, &signature.output),
            None => Ok(result),
        }
    }
}
