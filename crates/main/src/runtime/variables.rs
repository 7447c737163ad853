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

use std::sync::{Arc, RwLock};

use compact_str::CompactString;

use crate::runtime::{InvocationError, InvocationResult, TypeMeta, Value};

/// A named value visible to expressions by its name.
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: CompactString,
    pub value: Value,

    /// The static type of the variable. If None, the type is taken from the
    /// current value.
    pub declared: Option<TypeMeta>,

    /// Final variables cannot be assigned by expressions.
    pub is_final: bool,
}

impl Variable {
    /// The type expressions see: the declared type if any, otherwise the
    /// runtime type of the value, or `core.Object` for `null`.
    pub fn ty(&self) -> TypeMeta {
        match &self.declared {
            Some(declared) => declared.clone(),
            None => self.value.type_meta().unwrap_or_else(TypeMeta::object),
        }
    }
}

/// A shared, mutable set of variables.
///
/// Clones of this object refer to the same variable set, so assignments
/// performed by one evaluation are visible to later ones.
#[derive(Clone, Debug, Default)]
pub struct Variables(Arc<RwLock<Vec<Variable>>>);

impl Variables {
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines (or redefines) an untyped variable.
    pub fn define(&self, name: impl Into<CompactString>, value: impl Into<Value>) {
        self.insert(Variable {
            name: name.into(),
            value: value.into(),
            declared: None,
            is_final: false,
        })
    }

    /// Defines (or redefines) a variable with a declared type.
    pub fn define_typed(
        &self,
        name: impl Into<CompactString>,
        ty: TypeMeta,
        value: impl Into<Value>,
    ) {
        self.insert(Variable {
            name: name.into(),
            value: value.into(),
            declared: Some(ty),
            is_final: false,
        })
    }

    /// Defines (or redefines) a variable that expressions cannot assign.
    pub fn define_final(&self, name: impl Into<CompactString>, value: impl Into<Value>) {
        self.insert(Variable {
            name: name.into(),
            value: value.into(),
            declared: None,
            is_final: true,
        })
    }

    /// Adds the variable, replacing a same-named one.
    pub fn insert(&self, variable: Variable) {
        let mut variables = self.0.write().unwrap_or_else(|poison| poison.into_inner());

        match variables
            .iter_mut()
            .find(|existing| existing.name == variable.name)
        {
            Some(existing) => *existing = variable,
            None => variables.push(variable),
        }
    }

    pub fn get(&self, name: &str) -> Option<Variable> {
        self.0
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .iter()
            .find(|variable| variable.name == name)
            .cloned()
    }

    /// Assigns a new value to an existing non-final variable.
    pub fn assign(&self, name: &str, value: Value) -> InvocationResult<()> {
        let mut variables = self.0.write().unwrap_or_else(|poison| poison.into_inner());

        let Some(variable) = variables.iter_mut().find(|variable| variable.name == name) else {
            return Err(InvocationError::failed(format!("unknown variable '{name}'")));
        };

        if variable.is_final {
            return Err(InvocationError::FinalAssignment {
                name: variable.name.clone(),
            });
        }

        variable.value = value;

        Ok(())
    }

    /// Returns a copy of all variables in definition order.
    pub fn snapshot(&self) -> Vec<Variable> {
        self.0
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{InvocationError, Primitive, TypeMeta, Value, Variables};

    #[test]
    fn test_shared_assignment() {
        let variables = Variables::new();
        let alias = variables.clone();

        variables.define("count", 1);
        variables.define_final("limit", 10);

        assert!(alias.assign("count", 5.into()).is_ok());
        assert!(matches!(
            alias.assign("limit", 0.into()),
            Err(InvocationError::FinalAssignment { .. }),
        ));
        assert!(alias.assign("missing", 0.into()).is_err());

        assert_eq!(
            variables.get("count").and_then(|variable| variable.value.as_i64()),
            Some(5),
        );
        assert_eq!(variables.snapshot().len(), 2);
    }

    #[test]
    fn test_variable_types() {
        let variables = Variables::new();

        variables.define("empty", Value::Null);
        variables.define_typed("text", TypeMeta::string(), Value::Null);
        variables.define("number", 3);

        let ty = |name: &str| variables.get(name).map(|variable| variable.ty());

        assert_eq!(ty("empty"), Some(TypeMeta::object()));
        assert_eq!(ty("text"), Some(TypeMeta::string()));
        assert_eq!(ty("number"), Some(Primitive::Int.into()));
    }
}
