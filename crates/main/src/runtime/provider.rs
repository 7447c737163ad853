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

use ahash::AHashSet;
use compact_str::CompactString;

use crate::runtime::{InvocationResult, TypeMeta, Value};

/// The visibility of a member. Members below the configured minimum level
/// are invisible to expressions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessLevel {
    Private,
    PackagePrivate,
    Protected,
    #[default]
    Public,
}

impl AccessLevel {
    /// Returns true if a member of this level is visible when the
    /// `minimum` level is requested.
    #[inline(always)]
    pub fn is_visible(self, minimum: Self) -> bool {
        self >= minimum
    }
}

/// Describes a field of a class, or the `length` of an array type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldMeta {
    pub name: CompactString,
    pub ty: TypeMeta,
    pub declaring: TypeMeta,
    pub is_static: bool,
    pub is_final: bool,
    pub access: AccessLevel,
}

/// Distinguishes methods from constructors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ExecutableKind {
    Method,
    Constructor,
}

/// Describes a method or a constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExecutableMeta {
    /// The method name. Constructors carry the simple name of their class.
    pub name: CompactString,
    pub kind: ExecutableKind,
    pub params: Vec<TypeMeta>,
    pub output: TypeMeta,

    /// If true, the last parameter is an array type that also accepts any
    /// number of individual trailing arguments.
    pub variadic: bool,
    pub is_static: bool,
    pub declaring: TypeMeta,
    pub access: AccessLevel,

    /// A provider-defined index that distinguishes overloads declared by the
    /// same type.
    pub slot: usize,
}

impl Display for ExecutableMeta {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.name)?;
        formatter.write_str("(")?;

        let last = self.params.len().saturating_sub(1);

        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }

            match (self.variadic && index == last, param.component()) {
                (true, Some(component)) => formatter.write_fmt(format_args!("{component}..."))?,
                _ => formatter.write_fmt(format_args!("{param}"))?,
            }
        }

        formatter.write_str(")")
    }
}

/// The introspection interface the engine resolves expressions against.
///
/// An implementation enumerates the members of types, reads and writes
/// fields, and invokes methods and constructors. The engine calls these
/// functions from a single thread per parse, but a provider is shared
/// between engine instances and threads, so it must be [Sync].
///
/// The [SchemaProvider](crate::runtime::SchemaProvider) is a ready-to-use
/// implementation over manually registered classes.
pub trait TypeProvider: Send + Sync + 'static {
    /// Returns the fields of the `ty` type visible at the `minimum` access
    /// level, including inherited ones.
    ///
    /// A field of a derived type must shadow same-named fields of its base
    /// types (see [resolve_shadowing]).
    fn fields(&self, ty: &TypeMeta, minimum: AccessLevel) -> Vec<FieldMeta>;

    /// Returns the methods or constructors of the `ty` type visible at the
    /// `minimum` access level. Methods include inherited ones, with
    /// overridden signatures collapsed (see [merge_overloads]).
    fn executables(
        &self,
        ty: &TypeMeta,
        kind: ExecutableKind,
        minimum: AccessLevel,
    ) -> Vec<ExecutableMeta>;

    /// Reads a field. The `instance` is [Value::Null] for static fields.
    fn get_field(&self, field: &FieldMeta, instance: &Value) -> InvocationResult<Value>;

    /// Writes a field. The `instance` is [Value::Null] for static fields.
    fn set_field(&self, field: &FieldMeta, instance: &Value, value: Value)
        -> InvocationResult<()>;

    /// Invokes a method or a constructor.
    ///
    /// The `instance` is [Value::Null] for static methods and constructors.
    /// The `arguments` match the parameter list one to one: variadic
    /// trailing arguments are already packed into an array.
    fn invoke(
        &self,
        executable: &ExecutableMeta,
        instance: &Value,
        arguments: &[Value],
    ) -> InvocationResult<Value>;

    /// Resolves a class by its dot-separated qualified name.
    fn resolve_type(&self, qualified_name: &str) -> Option<TypeMeta>;

    /// Returns the qualified names of all known classes.
    fn class_names(&self) -> Vec<CompactString>;

    /// Returns the type of a member as seen through the `owner` type.
    ///
    /// Providers with parameterized types override this function to
    /// substitute type parameters of the declaring type. The default
    /// implementation returns the `declared` type as is.
    fn specialize(&self, declared: &TypeMeta, owner: &TypeMeta) -> TypeMeta {
        let _ = owner;

        declared.clone()
    }

    /// Returns all package names that contain at least one known class,
    /// including the parent packages.
    fn packages(&self) -> Vec<CompactString> {
        let mut result = Vec::new();
        let mut seen = AHashSet::new();

        for name in self.class_names() {
            let mut end = name.len();

            while let Some(dot) = name[..end].rfind('.') {
                let package = CompactString::from(&name[..dot]);

                if seen.insert(package.clone()) {
                    result.push(package);
                }

                end = dot;
            }
        }

        result.sort();

        result
    }
}

/// Removes the fields hidden by same-named fields declared closer to the
/// requested type.
///
/// The `fields` are expected in lookup order: the requested type's own
/// fields first, then the fields of its ancestors.
pub fn resolve_shadowing(fields: Vec<FieldMeta>) -> Vec<FieldMeta> {
    let mut seen = AHashSet::new();

    fields
        .into_iter()
        .filter(|field| seen.insert(field.name.clone()))
        .collect()
}

/// Collapses methods with identical names and parameter lists into the most
/// specific one.
///
/// Of two colliding methods, the one whose declaring type is a subtype of
/// the other's declaring type wins. If the declaring types are unrelated,
/// the one that comes first in the lookup order wins.
pub fn merge_overloads(executables: Vec<ExecutableMeta>) -> Vec<ExecutableMeta> {
    let mut result: Vec<ExecutableMeta> = Vec::with_capacity(executables.len());

    'outer: for executable in executables {
        for existing in result.iter_mut() {
            if existing.name != executable.name
                || existing.params != executable.params
                || existing.variadic != executable.variadic
            {
                continue;
            }

            if executable.declaring != existing.declaring
                && executable.declaring.is_subtype_of(&existing.declaring)
            {
                *existing = executable;
            }

            continue 'outer;
        }

        result.push(executable);
    }

    result
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        merge_overloads,
        resolve_shadowing,
        AccessLevel,
        ClassMeta,
        ExecutableKind,
        ExecutableMeta,
        FieldMeta,
        Primitive,
        TypeMeta,
    };

    fn field(name: &str, declaring: &TypeMeta) -> FieldMeta {
        FieldMeta {
            name: name.into(),
            ty: Primitive::Int.into(),
            declaring: declaring.clone(),
            is_static: false,
            is_final: false,
            access: AccessLevel::Public,
        }
    }

    fn method(name: &str, declaring: &TypeMeta, variadic: bool) -> ExecutableMeta {
        ExecutableMeta {
            name: name.into(),
            kind: ExecutableKind::Method,
            params: vec![TypeMeta::array(TypeMeta::string())],
            output: TypeMeta::void(),
            variadic,
            is_static: false,
            declaring: declaring.clone(),
            access: AccessLevel::Public,
            slot: 0,
        }
    }

    #[test]
    fn test_shadowing() {
        let base = ClassMeta::new("a.Base").into_type();
        let derived = ClassMeta::new("a.Derived").extends(base.clone()).into_type();

        let fields = resolve_shadowing(vec![
            field("x", &derived),
            field("x", &base),
            field("y", &base),
        ]);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].declaring, derived);
        assert_eq!(fields[1].name, "y");
    }

    #[test]
    fn test_more_specific_overload() {
        let base = ClassMeta::new("a.Base").into_type();
        let derived = ClassMeta::new("a.Derived").extends(base.clone()).into_type();

        let merged = merge_overloads(vec![
            method("run", &base, false),
            method("run", &derived, false),
            method("run", &base, true),
        ]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].declaring, derived);
        assert!(merged[1].variadic);
        assert_eq!(merged[1].to_string(), "run(String...)");
    }

    #[test]
    fn test_access_order() {
        assert!(AccessLevel::Public.is_visible(AccessLevel::Protected));
        assert!(!AccessLevel::Private.is_visible(AccessLevel::PackagePrivate));
        assert!(AccessLevel::Private.is_visible(AccessLevel::Private));
    }
}
