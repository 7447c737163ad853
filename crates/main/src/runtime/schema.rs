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
    fmt::{Debug, Formatter},
    sync::{Arc, RwLock},
};

use ahash::AHashMap;
use compact_str::CompactString;

use crate::runtime::{
    merge_overloads,
    resolve_shadowing,
    AccessLevel,
    ExecutableKind,
    ExecutableMeta,
    FieldMeta,
    InvocationError,
    InvocationResult,
    Primitive,
    Record,
    TypeMeta,
    TypeProvider,
    Value,
};

/// A host function behind a method or a constructor.
///
/// The first argument is the receiver ([Value::Null] for static methods and
/// constructors), the second one is the argument list.
pub type MethodBody = Arc<dyn Fn(&Value, &[Value]) -> InvocationResult<Value> + Send + Sync>;

/// A host function that computes a field value from the receiver.
pub type FieldGetter = Arc<dyn Fn(&Value) -> InvocationResult<Value> + Send + Sync>;

/// A host function that stores a field value into the receiver.
pub type FieldSetter = Arc<dyn Fn(&Value, Value) -> InvocationResult<()> + Send + Sync>;

#[derive(Clone)]
enum FieldStorage {
    Record,
    Static(Arc<RwLock<Value>>),
    Computed {
        get: FieldGetter,
        set: Option<FieldSetter>,
    },
}

#[derive(Clone)]
struct FieldSchema {
    meta: FieldMeta,
    storage: FieldStorage,
}

#[derive(Clone)]
struct ExecutableSchema {
    meta: ExecutableMeta,
    body: MethodBody,
}

/// A manually written description of a class: its fields, methods and
/// constructors together with the host functions that implement them.
///
/// Members are public unless an [access](Self::access) section says
/// otherwise.
///
/// ```
/// use expr_bar::runtime::{ClassMeta, ClassSchema, Primitive, Record, TypeMeta, Value};
///
/// let point = ClassMeta::new("geo.Point").into_type();
///
/// let schema = ClassSchema::new(point.clone())
///     .field("x", Primitive::Int.into())
///     .field("y", Primitive::Int.into())
///     .constructor(vec![Primitive::Int.into(), Primitive::Int.into()], {
///         let point = point.clone();
///
///         move |_, arguments| {
///             Ok(Record::new(point.clone())
///                 .with("x", arguments[0].clone())
///                 .with("y", arguments[1].clone())
///                 .into_value())
///         }
///     });
/// ```
#[derive(Clone)]
pub struct ClassSchema {
    ty: TypeMeta,
    access: AccessLevel,
    fields: Vec<FieldSchema>,
    methods: Vec<ExecutableSchema>,
    constructors: Vec<ExecutableSchema>,
}

impl Debug for ClassSchema {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClassSchema")
            .field("ty", &self.ty)
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|field| &field.meta.name)
                    .collect::<Vec<_>>(),
            )
            .field(
                "methods",
                &self
                    .methods
                    .iter()
                    .map(|method| method.meta.to_string())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl ClassSchema {
    /// Starts describing the members of the `ty` class.
    pub fn new(ty: TypeMeta) -> Self {
        Self {
            ty,
            access: AccessLevel::Public,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// The described class.
    #[inline(always)]
    pub fn ty(&self) -> &TypeMeta {
        &self.ty
    }

    /// Sets the access level of the members declared after this call.
    pub fn access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    /// Declares a mutable instance field stored in the receiver's [Record].
    pub fn field(self, name: impl Into<CompactString>, ty: TypeMeta) -> Self {
        self.push_field(name, ty, false, false, FieldStorage::Record)
    }

    /// Declares a read-only instance field stored in the receiver's
    /// [Record].
    pub fn final_field(self, name: impl Into<CompactString>, ty: TypeMeta) -> Self {
        self.push_field(name, ty, false, true, FieldStorage::Record)
    }

    /// Declares a mutable static field with the initial `value`.
    pub fn static_field(
        self,
        name: impl Into<CompactString>,
        ty: TypeMeta,
        value: impl Into<Value>,
    ) -> Self {
        let storage = FieldStorage::Static(Arc::new(RwLock::new(value.into())));

        self.push_field(name, ty, true, false, storage)
    }

    /// Declares a read-only static field.
    pub fn constant(self, name: impl Into<CompactString>, ty: TypeMeta, value: impl Into<Value>) -> Self {
        let storage = FieldStorage::Static(Arc::new(RwLock::new(value.into())));

        self.push_field(name, ty, true, true, storage)
    }

    /// Declares a read-only instance field computed by the `get` function.
    pub fn computed_field(
        self,
        name: impl Into<CompactString>,
        ty: TypeMeta,
        get: impl Fn(&Value) -> InvocationResult<Value> + Send + Sync + 'static,
    ) -> Self {
        let storage = FieldStorage::Computed {
            get: Arc::new(get),
            set: None,
        };

        self.push_field(name, ty, false, true, storage)
    }

    /// Declares a mutable instance field backed by accessor functions.
    pub fn accessor_field(
        self,
        name: impl Into<CompactString>,
        ty: TypeMeta,
        get: impl Fn(&Value) -> InvocationResult<Value> + Send + Sync + 'static,
        set: impl Fn(&Value, Value) -> InvocationResult<()> + Send + Sync + 'static,
    ) -> Self {
        let storage = FieldStorage::Computed {
            get: Arc::new(get),
            set: Some(Arc::new(set)),
        };

        self.push_field(name, ty, false, false, storage)
    }

    /// Declares an instance method.
    pub fn method(
        self,
        name: impl Into<CompactString>,
        params: Vec<TypeMeta>,
        output: TypeMeta,
        body: impl Fn(&Value, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(name, params, output, false, false, Arc::new(body))
    }

    /// Declares an instance method whose last parameter is variadic. The
    /// last entry of `params` must be an array type.
    pub fn variadic_method(
        self,
        name: impl Into<CompactString>,
        params: Vec<TypeMeta>,
        output: TypeMeta,
        body: impl Fn(&Value, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(name, params, output, false, true, Arc::new(body))
    }

    /// Declares a static method.
    pub fn static_method(
        self,
        name: impl Into<CompactString>,
        params: Vec<TypeMeta>,
        output: TypeMeta,
        body: impl Fn(&Value, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(name, params, output, true, false, Arc::new(body))
    }

    /// Declares a static method whose last parameter is variadic.
    pub fn static_variadic_method(
        self,
        name: impl Into<CompactString>,
        params: Vec<TypeMeta>,
        output: TypeMeta,
        body: impl Fn(&Value, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.push_method(name, params, output, true, true, Arc::new(body))
    }

    /// Declares a constructor.
    pub fn constructor(
        mut self,
        params: Vec<TypeMeta>,
        body: impl Fn(&Value, &[Value]) -> InvocationResult<Value> + Send + Sync + 'static,
    ) -> Self {
        let name = match self.ty.as_class() {
            Some(class) => CompactString::from(class.simple_name()),
            None => CompactString::from(self.ty.to_string()),
        };

        let meta = ExecutableMeta {
            name,
            kind: ExecutableKind::Constructor,
            params,
            output: self.ty.clone(),
            variadic: false,
            is_static: true,
            declaring: self.ty.clone(),
            access: self.access,
            slot: self.constructors.len(),
        };

        self.constructors.push(ExecutableSchema {
            meta,
            body: Arc::new(body),
        });

        self
    }

    fn push_field(
        mut self,
        name: impl Into<CompactString>,
        ty: TypeMeta,
        is_static: bool,
        is_final: bool,
        storage: FieldStorage,
    ) -> Self {
        let meta = FieldMeta {
            name: name.into(),
            ty,
            declaring: self.ty.clone(),
            is_static,
            is_final,
            access: self.access,
        };

        self.fields.push(FieldSchema { meta, storage });

        self
    }

    fn push_method(
        mut self,
        name: impl Into<CompactString>,
        params: Vec<TypeMeta>,
        output: TypeMeta,
        is_static: bool,
        variadic: bool,
        body: MethodBody,
    ) -> Self {
        let meta = ExecutableMeta {
            name: name.into(),
            kind: ExecutableKind::Method,
            params,
            output,
            variadic,
            is_static,
            declaring: self.ty.clone(),
            access: self.access,
            slot: self.methods.len(),
        };

        self.methods.push(ExecutableSchema { meta, body });

        self
    }
}

/// A [TypeProvider] over manually registered [ClassSchema]s.
///
/// A new provider already knows the builtin `core` classes: `Object`,
/// `String`, `Math` and the boxing classes.
#[derive(Clone, Debug)]
pub struct SchemaProvider {
    classes: AHashMap<CompactString, ClassSchema>,
}

impl Default for SchemaProvider {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeProvider for SchemaProvider {
    fn fields(&self, ty: &TypeMeta, minimum: AccessLevel) -> Vec<FieldMeta> {
        if ty.component().is_some() {
            return vec![FieldMeta {
                name: CompactString::from("length"),
                ty: Primitive::Int.into(),
                declaring: ty.clone(),
                is_static: false,
                is_final: true,
                access: AccessLevel::Public,
            }];
        }

        let mut result = Vec::new();

        for ancestor in ty.ancestors() {
            let Some(schema) = self.schema(&ancestor) else {
                continue;
            };

            for field in &schema.fields {
                if field.meta.access.is_visible(minimum) {
                    result.push(field.meta.clone());
                }
            }
        }

        resolve_shadowing(result)
    }

    fn executables(
        &self,
        ty: &TypeMeta,
        kind: ExecutableKind,
        minimum: AccessLevel,
    ) -> Vec<ExecutableMeta> {
        if kind == ExecutableKind::Constructor {
            let Some(schema) = self.schema(ty) else {
                return Vec::new();
            };

            return schema
                .constructors
                .iter()
                .filter(|constructor| constructor.meta.access.is_visible(minimum))
                .map(|constructor| constructor.meta.clone())
                .collect();
        }

        let mut result = Vec::new();

        for ancestor in ty.ancestors() {
            let Some(schema) = self.schema(&ancestor) else {
                continue;
            };

            for method in &schema.methods {
                if method.meta.access.is_visible(minimum) {
                    result.push(method.meta.clone());
                }
            }
        }

        merge_overloads(result)
    }

    fn get_field(&self, field: &FieldMeta, instance: &Value) -> InvocationResult<Value> {
        if field.declaring.component().is_some() {
            return match instance {
                Value::Array(array) => Ok(Value::Int(array.len() as i32)),
                Value::Null => Err(InvocationError::NullReference {
                    member: field.name.clone(),
                }),
                _ => Err(InvocationError::TypeMismatch {
                    expected: field.declaring.clone(),
                    actual: instance.type_meta(),
                }),
            };
        }

        let schema = self.field_schema(field)?;

        match &schema.storage {
            FieldStorage::Static(cell) => Ok(cell
                .read()
                .unwrap_or_else(|poison| poison.into_inner())
                .clone()),

            FieldStorage::Record => {
                let record = Self::record(field, instance)?;

                Ok(record
                    .get(&field.name)
                    .unwrap_or_else(|| Value::default_of(&field.ty)))
            }

            FieldStorage::Computed { get, .. } => {
                if instance.is_null() {
                    return Err(InvocationError::NullReference {
                        member: field.name.clone(),
                    });
                }

                get(instance)
            }
        }
    }

    fn set_field(&self, field: &FieldMeta, instance: &Value, value: Value) -> InvocationResult<()> {
        if field.is_final || field.declaring.component().is_some() {
            return Err(InvocationError::FinalAssignment {
                name: field.name.clone(),
            });
        }

        let schema = self.field_schema(field)?;

        match &schema.storage {
            FieldStorage::Static(cell) => {
                *cell.write().unwrap_or_else(|poison| poison.into_inner()) = value;

                Ok(())
            }

            FieldStorage::Record => {
                Self::record(field, instance)?.set(field.name.clone(), value);

                Ok(())
            }

            FieldStorage::Computed { set: Some(set), .. } => {
                if instance.is_null() {
                    return Err(InvocationError::NullReference {
                        member: field.name.clone(),
                    });
                }

                set(instance, value)
            }

            FieldStorage::Computed { set: None, .. } => Err(InvocationError::FinalAssignment {
                name: field.name.clone(),
            }),
        }
    }

    fn invoke(
        &self,
        executable: &ExecutableMeta,
        instance: &Value,
        arguments: &[Value],
    ) -> InvocationResult<Value> {
        let unknown = || InvocationError::UnknownMember {
            ty: executable.declaring.clone(),
            name: executable.name.clone(),
        };

        let schema = self.schema(&executable.declaring).ok_or_else(unknown)?;

        let list = match executable.kind {
            ExecutableKind::Method => &schema.methods,
            ExecutableKind::Constructor => &schema.constructors,
        };

        let target = list
            .get(executable.slot)
            .filter(|target| target.meta.name == executable.name)
            .ok_or_else(unknown)?;

        if !target.meta.is_static && instance.is_null() {
            return Err(InvocationError::NullReference {
                member: executable.name.clone(),
            });
        }

        if arguments.len() != target.meta.params.len() {
            return Err(InvocationError::ArityMismatch {
                expected: target.meta.params.len(),
                actual: arguments.len(),
            });
        }

        (target.body)(instance, arguments)
    }

    fn resolve_type(&self, qualified_name: &str) -> Option<TypeMeta> {
        self.classes
            .get(qualified_name)
            .map(|schema| schema.ty.clone())
    }

    fn class_names(&self) -> Vec<CompactString> {
        let mut names = self.classes.keys().cloned().collect::<Vec<_>>();

        names.sort();

        names
    }
}

impl SchemaProvider {
    /// Creates a provider that knows the builtin `core` classes.
    pub fn new() -> Self {
        let mut provider = Self {
            classes: AHashMap::new(),
        };

        for schema in builtins::schemas() {
            provider.register(schema);
        }

        provider
    }

    /// Adds a class, replacing a previously registered class with the same
    /// qualified name.
    pub fn register(&mut self, schema: ClassSchema) -> &mut Self {
        let name = CompactString::from(schema.ty.qualified_name());

        let _ = self.classes.insert(name, schema);

        self
    }

    /// Adds a class, builder style.
    #[inline(always)]
    pub fn with(mut self, schema: ClassSchema) -> Self {
        let _ = self.register(schema);

        self
    }

    fn schema(&self, ty: &TypeMeta) -> Option<&ClassSchema> {
        let class = ty.as_class()?;

        self.classes.get(class.name())
    }

    fn field_schema(&self, field: &FieldMeta) -> InvocationResult<&FieldSchema> {
        self.schema(&field.declaring)
            .and_then(|schema| {
                schema
                    .fields
                    .iter()
                    .find(|candidate| candidate.meta.name == field.name)
            })
            .ok_or_else(|| InvocationError::UnknownMember {
                ty: field.declaring.clone(),
                name: field.name.clone(),
            })
    }

    fn record<'a>(field: &FieldMeta, instance: &'a Value) -> InvocationResult<&'a Record> {
        if instance.is_null() {
            return Err(InvocationError::NullReference {
                member: field.name.clone(),
            });
        }

        instance
            .downcast::<Record>()
            .ok_or_else(|| InvocationError::TypeMismatch {
                expected: field.declaring.clone(),
                actual: instance.type_meta(),
            })
    }
}

mod builtins {
    use crate::runtime::{
        ClassMeta,
        ClassSchema,
        InvocationError,
        InvocationResult,
        Primitive,
        TypeMeta,
        Value,
    };

    pub(super) fn schemas() -> Vec<ClassSchema> {
        let mut result = vec![object(), string(), math()];

        result.extend(TypeMeta::builtin_classes().filter_map(|ty| {
            let primitive = ty.unboxed()?;

            Some(boxed(ty, primitive))
        }));

        result.push(ClassSchema::new(TypeMeta::number()));

        result
    }

    fn object() -> ClassSchema {
        ClassSchema::new(TypeMeta::object())
            .method("toString", vec![], TypeMeta::string(), |this, _| {
                Ok(Value::from(this.to_string()))
            })
            .method(
                "equals",
                vec![TypeMeta::object()],
                Primitive::Boolean.into(),
                |this, arguments| Ok(Value::Boolean(this.same(&arguments[0]))),
            )
    }

    fn string() -> ClassSchema {
        let string = TypeMeta::string();
        let int = TypeMeta::primitive(Primitive::Int);
        let boolean = TypeMeta::primitive(Primitive::Boolean);

        ClassSchema::new(string.clone())
            .method("length", vec![], int.clone(), |this, _| {
                Ok(Value::Int(text(this)?.chars().count() as i32))
            })
            .method("isEmpty", vec![], boolean.clone(), |this, _| {
                Ok(Value::Boolean(text(this)?.is_empty()))
            })
            .method(
                "charAt",
                vec![int.clone()],
                Primitive::Char.into(),
                |this, arguments| {
                    let chars = text(this)?.chars().collect::<Vec<_>>();
                    let index = index(&arguments[0], chars.len())?;

                    Ok(Value::Char(chars[index]))
                },
            )
            .method(
                "substring",
                vec![int.clone()],
                string.clone(),
                |this, arguments| {
                    let chars = text(this)?.chars().collect::<Vec<_>>();
                    let start = bound(&arguments[0], chars.len())?;

                    Ok(Value::from(chars[start..].iter().collect::<String>()))
                },
            )
            .method(
                "substring",
                vec![int.clone(), int.clone()],
                string.clone(),
                |this, arguments| {
                    let chars = text(this)?.chars().collect::<Vec<_>>();
                    let start = bound(&arguments[0], chars.len())?;
                    let end = bound(&arguments[1], chars.len())?;

                    if start > end {
                        return Err(InvocationError::OutOfBounds {
                            index: start as i64,
                            length: end,
                        });
                    }

                    Ok(Value::from(chars[start..end].iter().collect::<String>()))
                },
            )
            .method("toUpperCase", vec![], string.clone(), |this, _| {
                Ok(Value::from(text(this)?.to_uppercase()))
            })
            .method("toLowerCase", vec![], string.clone(), |this, _| {
                Ok(Value::from(text(this)?.to_lowercase()))
            })
            .method("trim", vec![], string.clone(), |this, _| {
                Ok(Value::from(text(this)?.trim()))
            })
            .method(
                "contains",
                vec![string.clone()],
                boolean.clone(),
                |this, arguments| Ok(Value::Boolean(text(this)?.contains(text(&arguments[0])?))),
            )
            .method(
                "startsWith",
                vec![string.clone()],
                boolean,
                |this, arguments| {
                    Ok(Value::Boolean(
                        text(this)?.starts_with(text(&arguments[0])?),
                    ))
                },
            )
            .method(
                "indexOf",
                vec![string.clone()],
                int,
                |this, arguments| {
                    let this = text(this)?;

                    Ok(Value::Int(match this.find(text(&arguments[0])?) {
                        Some(offset) => this[..offset].chars().count() as i32,
                        None => -1,
                    }))
                },
            )
            .static_method(
                "valueOf",
                vec![TypeMeta::object()],
                string.clone(),
                |_, arguments| Ok(Value::from(arguments[0].to_string())),
            )
            .static_variadic_method(
                "join",
                vec![string.clone(), TypeMeta::array(string.clone())],
                string,
                |_, arguments| {
                    let delimiter = text(&arguments[0])?;

                    let Value::Array(parts) = &arguments[1] else {
                        return Err(InvocationError::failed("join expects an array of strings"));
                    };

                    let parts = parts
                        .to_vec()
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>();

                    Ok(Value::from(parts.join(delimiter)))
                },
            )
    }

    fn math() -> ClassSchema {
        let ty = ClassMeta::new("core.Math").into_type();
        let int = TypeMeta::primitive(Primitive::Int);
        let long = TypeMeta::primitive(Primitive::Long);
        let double = TypeMeta::primitive(Primitive::Double);

        ClassSchema::new(ty)
            .constant("PI", double.clone(), std::f64::consts::PI)
            .constant("E", double.clone(), std::f64::consts::E)
            .static_method("abs", vec![int.clone()], int.clone(), |_, arguments| {
                Ok(Value::Int(int_arg(&arguments[0])?.wrapping_abs()))
            })
            .static_method("abs", vec![long.clone()], long.clone(), |_, arguments| {
                Ok(Value::Long(long_arg(&arguments[0])?.wrapping_abs()))
            })
            .static_method(
                "abs",
                vec![double.clone()],
                double.clone(),
                |_, arguments| Ok(Value::Double(double_arg(&arguments[0])?.abs())),
            )
            .static_method(
                "max",
                vec![int.clone(), int.clone()],
                int.clone(),
                |_, arguments| {
                    Ok(Value::Int(
                        int_arg(&arguments[0])?.max(int_arg(&arguments[1])?),
                    ))
                },
            )
            .static_method(
                "max",
                vec![long.clone(), long.clone()],
                long.clone(),
                |_, arguments| {
                    Ok(Value::Long(
                        long_arg(&arguments[0])?.max(long_arg(&arguments[1])?),
                    ))
                },
            )
            .static_method(
                "max",
                vec![double.clone(), double.clone()],
                double.clone(),
                |_, arguments| {
                    Ok(Value::Double(
                        double_arg(&arguments[0])?.max(double_arg(&arguments[1])?),
                    ))
                },
            )
            .static_method(
                "min",
                vec![int.clone(), int.clone()],
                int.clone(),
                |_, arguments| {
                    Ok(Value::Int(
                        int_arg(&arguments[0])?.min(int_arg(&arguments[1])?),
                    ))
                },
            )
            .static_method(
                "min",
                vec![double.clone(), double.clone()],
                double.clone(),
                |_, arguments| {
                    Ok(Value::Double(
                        double_arg(&arguments[0])?.min(double_arg(&arguments[1])?),
                    ))
                },
            )
            .static_method(
                "sqrt",
                vec![double.clone()],
                double.clone(),
                |_, arguments| Ok(Value::Double(double_arg(&arguments[0])?.sqrt())),
            )
            .static_method(
                "pow",
                vec![double.clone(), double.clone()],
                double,
                |_, arguments| {
                    Ok(Value::Double(
                        double_arg(&arguments[0])?.powf(double_arg(&arguments[1])?),
                    ))
                },
            )
    }

    fn boxed(ty: TypeMeta, primitive: Primitive) -> ClassSchema {
        let schema = ClassSchema::new(ty);
        let this = TypeMeta::primitive(primitive);

        let schema = schema.method(
            format!("{}Value", primitive.name()),
            vec![],
            this.clone(),
            |this, _| Ok(this.clone()),
        );

        let parse = move |_: &Value, arguments: &[Value]| -> InvocationResult<Value> {
            let source = text(&arguments[0])?.trim();

            let invalid = || InvocationError::failed(format!("invalid {primitive} literal: {source:?}"));

            Ok(match primitive {
                Primitive::Boolean => Value::Boolean(source.parse().map_err(|_| invalid())?),
                Primitive::Char => {
                    let mut chars = source.chars();

                    match (chars.next(), chars.next()) {
                        (Some(ch), None) => Value::Char(ch),
                        _ => return Err(invalid()),
                    }
                }
                Primitive::Byte => Value::Byte(source.parse().map_err(|_| invalid())?),
                Primitive::Short => Value::Short(source.parse().map_err(|_| invalid())?),
                Primitive::Int => Value::Int(source.parse().map_err(|_| invalid())?),
                Primitive::Long => Value::Long(source.parse().map_err(|_| invalid())?),
                Primitive::Float => Value::Float(source.parse().map_err(|_| invalid())?),
                Primitive::Double => Value::Double(source.parse().map_err(|_| invalid())?),
            })
        };

        let schema = schema.static_method("valueOf", vec![TypeMeta::string()], this.clone(), parse);

        match primitive {
            Primitive::Int => schema
                .constant("MAX_VALUE", this.clone(), i32::MAX)
                .constant("MIN_VALUE", this, i32::MIN),
            Primitive::Long => schema
                .constant("MAX_VALUE", this.clone(), i64::MAX)
                .constant("MIN_VALUE", this, i64::MIN),
            Primitive::Double => schema
                .constant("MAX_VALUE", this.clone(), f64::MAX)
                .constant("MIN_VALUE", this, f64::MIN_POSITIVE),
            _ => schema,
        }
    }

    fn text(value: &Value) -> InvocationResult<&str> {
        match value {
            Value::String(text) => Ok(text),
            Value::Null => Err(InvocationError::NullReference {
                member: "String".into(),
            }),
            other => Err(InvocationError::TypeMismatch {
                expected: TypeMeta::string(),
                actual: other.type_meta(),
            }),
        }
    }

    fn int_arg(value: &Value) -> InvocationResult<i32> {
        match value {
            Value::Int(value) => Ok(*value),
            other => Err(mismatch(Primitive::Int, other)),
        }
    }

    fn long_arg(value: &Value) -> InvocationResult<i64> {
        match value {
            Value::Long(value) => Ok(*value),
            other => Err(mismatch(Primitive::Long, other)),
        }
    }

    fn double_arg(value: &Value) -> InvocationResult<f64> {
        match value {
            Value::Double(value) => Ok(*value),
            other => Err(mismatch(Primitive::Double, other)),
        }
    }

    fn mismatch(expected: Primitive, actual: &Value) -> InvocationError {
        InvocationError::TypeMismatch {
            expected: expected.into(),
            actual: actual.type_meta(),
        }
    }

    fn index(value: &Value, length: usize) -> InvocationResult<usize> {
        let index = int_arg(value)?;

        match usize::try_from(index) {
            Ok(index) if index < length => Ok(index),
            _ => Err(InvocationError::OutOfBounds {
                index: index as i64,
                length,
            }),
        }
    }

    fn bound(value: &Value, length: usize) -> InvocationResult<usize> {
        let index = int_arg(value)?;

        match usize::try_from(index) {
            Ok(index) if index <= length => Ok(index),
            _ => Err(InvocationError::OutOfBounds {
                index: index as i64,
                length,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        AccessLevel,
        ClassMeta,
        ClassSchema,
        ExecutableKind,
        InvocationError,
        Primitive,
        Record,
        SchemaProvider,
        TypeMeta,
        TypeProvider,
        Value,
    };

    fn provider() -> (SchemaProvider, TypeMeta, TypeMeta) {
        let animal = ClassMeta::new("zoo.Animal").into_type();
        let cat = ClassMeta::new("zoo.Cat").extends(animal.clone()).into_type();

        let provider = SchemaProvider::new()
            .with(
                ClassSchema::new(animal.clone())
                    .field("name", TypeMeta::string())
                    .access(AccessLevel::Private)
                    .field("secret", Primitive::Int.into())
                    .access(AccessLevel::Public)
                    .method("speak", vec![], TypeMeta::string(), |_, _| Ok("...".into())),
            )
            .with(
                ClassSchema::new(cat.clone())
                    .final_field("name", TypeMeta::string())
                    .method("speak", vec![], TypeMeta::string(), |_, _| Ok("meow".into())),
            );

        (provider, animal, cat)
    }

    #[test]
    fn test_inherited_members() {
        let (provider, animal, cat) = provider();

        let fields = provider.fields(&cat, AccessLevel::Public);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].declaring, cat);
        assert_eq!(provider.fields(&animal, AccessLevel::Private).len(), 2);

        let methods = provider
            .executables(&cat, ExecutableKind::Method, AccessLevel::Public)
            .into_iter()
            .filter(|method| method.name == "speak")
            .collect::<Vec<_>>();

        assert_eq!(methods.len(), 1);

        let instance = Record::new(cat.clone()).into_value();
        let result = provider.invoke(&methods[0], &instance, &[]);

        assert_eq!(result.ok().and_then(|value| value.as_str().map(String::from)), Some(String::from("meow")));
    }

    #[test]
    fn test_field_storage() {
        let (provider, animal, cat) = provider();

        let instance = Record::new(animal.clone()).into_value();
        let name = provider.fields(&animal, AccessLevel::Public).remove(0);

        assert!(matches!(provider.get_field(&name, &instance), Ok(Value::Null)));
        assert!(provider
            .set_field(&name, &instance, Value::from("Tom"))
            .is_ok());
        assert_eq!(
            provider
                .get_field(&name, &instance)
                .ok()
                .map(|value| value.to_string()),
            Some(String::from("Tom")),
        );

        let final_name = provider.fields(&cat, AccessLevel::Public).remove(0);

        assert!(matches!(
            provider.set_field(&final_name, &instance, Value::Null),
            Err(InvocationError::FinalAssignment { .. }),
        ));
        assert!(matches!(
            provider.get_field(&name, &Value::Null),
            Err(InvocationError::NullReference { .. }),
        ));
    }

    #[test]
    fn test_builtins() {
        let provider = SchemaProvider::new();
        let string = TypeMeta::string();

        let length = provider
            .executables(&string, ExecutableKind::Method, AccessLevel::Public)
            .into_iter()
            .find(|method| method.name == "length");

        let Some(length) = length else {
            panic!("Missing String.length.");
        };

        assert!(matches!(
            provider.invoke(&length, &Value::from("héllo"), &[]),
            Ok(Value::Int(5)),
        ));

        assert!(provider.resolve_type("core.Math").is_some());
        assert!(provider.packages().iter().any(|package| package.as_str() == "core"));
    }
}
