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
    hash::{Hash, Hasher},
    sync::Arc,
};

use compact_str::CompactString;
use lady_deirdre::sync::Lazy;

/// A primitive (unboxed) value type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Display for Primitive {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl Primitive {
    /// All primitive types in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Boolean,
        Self::Char,
        Self::Byte,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// The keyword naming this primitive type in expressions.
    #[inline(always)]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Char => "char",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Looks up a primitive type by its keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|primitive| primitive.name() == name)
    }

    /// The qualified name of the class that boxes values of this type.
    #[inline(always)]
    pub const fn boxed_name(self) -> &'static str {
        match self {
            Self::Boolean => "core.Boolean",
            Self::Char => "core.Character",
            Self::Byte => "core.Byte",
            Self::Short => "core.Short",
            Self::Int => "core.Integer",
            Self::Long => "core.Long",
            Self::Float => "core.Float",
            Self::Double => "core.Double",
        }
    }

    /// Returns the boxing class type.
    #[inline(always)]
    pub fn boxed(self) -> TypeMeta {
        BUILTINS.boxed[self as usize].clone()
    }

    /// Returns true for every type that takes part in arithmetic.
    #[inline(always)]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Boolean)
    }

    /// Returns true for the integral types, including `char`.
    #[inline(always)]
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Char | Self::Byte | Self::Short | Self::Int | Self::Long
        )
    }

    /// Returns true if values of this type implicitly convert to the
    /// `target` type without an explicit cast. The relation is strict: a type
    /// does not widen to itself.
    pub const fn widens_to(self, target: Self) -> bool {
        match self {
            Self::Byte => matches!(
                target,
                Self::Short | Self::Int | Self::Long | Self::Float | Self::Double
            ),
            Self::Short | Self::Char => {
                matches!(target, Self::Int | Self::Long | Self::Float | Self::Double)
            }
            Self::Int => matches!(target, Self::Long | Self::Float | Self::Double),
            Self::Long => matches!(target, Self::Float | Self::Double),
            Self::Float => matches!(target, Self::Double),
            Self::Boolean | Self::Double => false,
        }
    }

    /// Binary numeric promotion of two operand types.
    ///
    /// Returns None if either operand is not numeric.
    pub const fn promote(left: Self, right: Self) -> Option<Self> {
        if !left.is_numeric() || !right.is_numeric() {
            return None;
        }

        Some(match (left, right) {
            (Self::Double, _) | (_, Self::Double) => Self::Double,
            (Self::Float, _) | (_, Self::Float) => Self::Float,
            (Self::Long, _) | (_, Self::Long) => Self::Long,
            _ => Self::Int,
        })
    }
}

/// A parameter list and result type of a functional class, the target of
/// lambda expressions.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct FunctionSignature {
    /// The parameter types of the single abstract function.
    pub params: Vec<TypeMeta>,

    /// The result type of the function.
    pub output: TypeMeta,
}

/// Describes a class type: its qualified name and its supertypes.
#[derive(Clone, Debug)]
pub struct ClassMeta {
    name: CompactString,
    superclass: Option<TypeMeta>,
    interfaces: Vec<TypeMeta>,
    interface: bool,
    signature: Option<FunctionSignature>,
    unboxed: Option<Primitive>,
}

impl ClassMeta {
    /// Starts a class description with the dot-separated qualified `name`.
    ///
    /// The new class extends `core.Object`.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self::with_superclass(name, Some(TypeMeta::object()))
    }

    fn with_superclass(name: impl Into<CompactString>, superclass: Option<TypeMeta>) -> Self {
        Self {
            name: name.into(),
            superclass,
            interfaces: Vec::new(),
            interface: false,
            signature: None,
            unboxed: None,
        }
    }

    /// Replaces the superclass.
    pub fn extends(mut self, superclass: TypeMeta) -> Self {
        self.superclass = Some(superclass);
        self
    }

    /// Adds an implemented interface.
    pub fn implements(mut self, interface: TypeMeta) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Marks the class as an interface.
    pub fn interface(mut self) -> Self {
        self.interface = true;
        self
    }

    /// Marks the class as a functional interface whose instances can be
    /// written as lambda expressions.
    pub fn functional(mut self, params: Vec<TypeMeta>, output: TypeMeta) -> Self {
        self.interface = true;
        self.signature = Some(FunctionSignature { params, output });
        self
    }

    /// Finishes the description.
    #[inline(always)]
    pub fn into_type(self) -> TypeMeta {
        TypeMeta(Arc::new(TypeKind::Class(self)))
    }

    /// The dot-separated qualified name of the class.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The last component of the qualified name.
    pub fn simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[dot + 1..],
            None => &self.name,
        }
    }

    /// The qualified name without the last component, if any.
    pub fn package(&self) -> Option<&str> {
        self.name.rfind('.').map(|dot| &self.name[..dot])
    }

    #[inline(always)]
    pub fn superclass(&self) -> Option<&TypeMeta> {
        self.superclass.as_ref()
    }

    #[inline(always)]
    pub fn interfaces(&self) -> &[TypeMeta] {
        &self.interfaces
    }

    #[inline(always)]
    pub fn is_interface(&self) -> bool {
        self.interface
    }

    #[inline(always)]
    pub fn signature(&self) -> Option<&FunctionSignature> {
        self.signature.as_ref()
    }
}

/// The shape of a [TypeMeta].
#[derive(Debug)]
pub enum TypeKind {
    /// The result type of callables that produce no value.
    Void,

    /// A primitive type.
    Primitive(Primitive),

    /// A class or interface type.
    Class(ClassMeta),

    /// An array of the component type.
    Array(TypeMeta),
}

/// A cheaply clonable type descriptor.
///
/// Two descriptors are equal if they describe the same type: classes are
/// identified by their qualified names.
#[derive(Clone)]
pub struct TypeMeta(Arc<TypeKind>);

impl PartialEq for TypeMeta {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }

        match (self.kind(), other.kind()) {
            (TypeKind::Void, TypeKind::Void) => true,
            (TypeKind::Primitive(left), TypeKind::Primitive(right)) => left == right,
            (TypeKind::Class(left), TypeKind::Class(right)) => left.name == right.name,
            (TypeKind::Array(left), TypeKind::Array(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for TypeMeta {}

impl Hash for TypeMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.kind() {
            TypeKind::Void => state.write_u8(0),
            TypeKind::Primitive(primitive) => {
                state.write_u8(1);
                primitive.hash(state);
            }
            TypeKind::Class(class) => {
                state.write_u8(2);
                class.name.hash(state);
            }
            TypeKind::Array(component) => {
                state.write_u8(3);
                component.hash(state);
            }
        }
    }
}

impl Debug for TypeMeta {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("TypeMeta({self})"))
    }
}

impl Display for TypeMeta {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            TypeKind::Void => formatter.write_str("void"),
            TypeKind::Primitive(primitive) => Display::fmt(primitive, formatter),
            TypeKind::Class(class) => formatter.write_str(class.simple_name()),
            TypeKind::Array(component) => formatter.write_fmt(format_args!("{component}[]")),
        }
    }
}

impl From<Primitive> for TypeMeta {
    #[inline(always)]
    fn from(value: Primitive) -> Self {
        Self::primitive(value)
    }
}

impl TypeMeta {
    /// The `void` type.
    #[inline(always)]
    pub fn void() -> Self {
        BUILTINS.void.clone()
    }

    /// A primitive type.
    #[inline(always)]
    pub fn primitive(primitive: Primitive) -> Self {
        BUILTINS.primitives[primitive as usize].clone()
    }

    /// An array type with the `component` element type.
    #[inline(always)]
    pub fn array(component: TypeMeta) -> Self {
        Self(Arc::new(TypeKind::Array(component)))
    }

    /// The root class `core.Object`.
    #[inline(always)]
    pub fn object() -> Self {
        BUILTINS.object.clone()
    }

    /// The `core.String` class.
    #[inline(always)]
    pub fn string() -> Self {
        BUILTINS.string.clone()
    }

    /// The `core.Number` class, the superclass of boxed numeric types.
    #[inline(always)]
    pub fn number() -> Self {
        BUILTINS.number.clone()
    }

    /// Returns the builtin class types: `core.Object`, `core.String`,
    /// `core.Number` and the boxing classes.
    pub fn builtin_classes() -> impl Iterator<Item = TypeMeta> {
        [
            BUILTINS.object.clone(),
            BUILTINS.string.clone(),
            BUILTINS.number.clone(),
        ]
        .into_iter()
        .chain(BUILTINS.boxed.iter().cloned())
    }

    #[inline(always)]
    pub fn kind(&self) -> &TypeKind {
        &self.0
    }

    #[inline(always)]
    pub fn is_void(&self) -> bool {
        matches!(self.kind(), TypeKind::Void)
    }

    #[inline(always)]
    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.kind() {
            TypeKind::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_class(&self) -> Option<&ClassMeta> {
        match self.kind() {
            TypeKind::Class(class) => Some(class),
            _ => None,
        }
    }

    /// The element type of an array type.
    #[inline(always)]
    pub fn component(&self) -> Option<&TypeMeta> {
        match self.kind() {
            TypeKind::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Returns true for class and array types.
    #[inline(always)]
    pub fn is_reference(&self) -> bool {
        matches!(self.kind(), TypeKind::Class(_) | TypeKind::Array(_))
    }

    /// The qualified name of the type: `a.b.C`, `int`, `a.b.C[]`.
    pub fn qualified_name(&self) -> String {
        match self.kind() {
            TypeKind::Class(class) => class.name.to_string(),
            TypeKind::Array(component) => format!("{}[]", component.qualified_name()),
            _ => self.to_string(),
        }
    }

    /// The primitive type boxed by this class, if it is a boxing class.
    #[inline(always)]
    pub fn unboxed(&self) -> Option<Primitive> {
        self.as_class().and_then(|class| class.unboxed)
    }

    /// For a primitive type returns its boxing class, for a boxing class
    /// returns its primitive type.
    pub fn box_counterpart(&self) -> Option<TypeMeta> {
        match self.kind() {
            TypeKind::Primitive(primitive) => Some(primitive.boxed()),
            TypeKind::Class(class) => class.unboxed.map(TypeMeta::primitive),
            _ => None,
        }
    }

    /// The functional signature of a functional interface type.
    #[inline(always)]
    pub fn signature(&self) -> Option<&FunctionSignature> {
        self.as_class().and_then(ClassMeta::signature)
    }

    /// Returns true if every value of this type is also a value of the
    /// `other` type: the types are equal, or this type inherits from
    /// `other`, or both are reference arrays with related components.
    pub fn is_subtype_of(&self, other: &TypeMeta) -> bool {
        if self == other {
            return true;
        }

        if self.is_reference() && other == &BUILTINS.object {
            return true;
        }

        match (self.kind(), other.kind()) {
            (TypeKind::Class(class), TypeKind::Class(_)) => {
                if let Some(superclass) = &class.superclass {
                    if superclass.is_subtype_of(other) {
                        return true;
                    }
                }

                class
                    .interfaces
                    .iter()
                    .any(|interface| interface.is_subtype_of(other))
            }

            (TypeKind::Array(left), TypeKind::Array(right)) => {
                left.is_reference() && right.is_reference() && left.is_subtype_of(right)
            }

            _ => false,
        }
    }

    /// The supertypes of a class in breadth-first order, starting with the
    /// type itself.
    pub fn ancestors(&self) -> Vec<TypeMeta> {
        let mut result = vec![self.clone()];
        let mut index = 0;

        while let Some(next) = result.get(index) {
            let parents = match next.as_class() {
                Some(class) => class
                    .superclass
                    .iter()
                    .chain(class.interfaces.iter())
                    .cloned()
                    .collect::<Vec<_>>(),

                None if next.is_reference() && next != &BUILTINS.object => {
                    vec![BUILTINS.object.clone()]
                }

                None => Vec::new(),
            };

            for parent in parents {
                if !result.contains(&parent) {
                    result.push(parent);
                }
            }

            index += 1;
        }

        result
    }
}

static BUILTINS: Lazy<Builtins> = Lazy::new(Builtins::new);

struct Builtins {
    void: TypeMeta,
    primitives: [TypeMeta; 8],
    object: TypeMeta,
    string: TypeMeta,
    number: TypeMeta,
    boxed: [TypeMeta; 8],
}

impl Builtins {
    fn new() -> Self {
        let object = ClassMeta::with_superclass("core.Object", None).into_type();

        let string = ClassMeta::with_superclass("core.String", Some(object.clone())).into_type();

        let number = ClassMeta::with_superclass("core.Number", Some(object.clone())).into_type();

        let primitives =
            Primitive::ALL.map(|primitive| TypeMeta(Arc::new(TypeKind::Primitive(primitive))));

        let boxed = Primitive::ALL.map(|primitive| {
            let superclass = match primitive.is_numeric() && primitive != Primitive::Char {
                true => number.clone(),
                false => object.clone(),
            };

            let mut class = ClassMeta::with_superclass(primitive.boxed_name(), Some(superclass));

            class.unboxed = Some(primitive);

            class.into_type()
        });

        Self {
            void: TypeMeta(Arc::new(TypeKind::Void)),
            primitives,
            object,
            string,
            number,
            boxed,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{ClassMeta, Primitive, TypeMeta};

    #[test]
    fn test_primitive_widening() {
        assert!(Primitive::Int.widens_to(Primitive::Long));
        assert!(Primitive::Char.widens_to(Primitive::Int));
        assert!(!Primitive::Char.widens_to(Primitive::Short));
        assert!(!Primitive::Long.widens_to(Primitive::Int));
        assert!(!Primitive::Int.widens_to(Primitive::Int));
        assert!(!Primitive::Boolean.widens_to(Primitive::Int));

        assert_eq!(
            Primitive::promote(Primitive::Byte, Primitive::Short),
            Some(Primitive::Int),
        );
        assert_eq!(
            Primitive::promote(Primitive::Int, Primitive::Float),
            Some(Primitive::Float),
        );
        assert_eq!(Primitive::promote(Primitive::Boolean, Primitive::Int), None);
    }

    #[test]
    fn test_subtyping() {
        let shape = ClassMeta::new("geo.Shape").interface().into_type();
        let circle = ClassMeta::new("geo.Circle")
            .implements(shape.clone())
            .into_type();

        assert!(circle.is_subtype_of(&shape));
        assert!(circle.is_subtype_of(&TypeMeta::object()));
        assert!(!shape.is_subtype_of(&circle));
        assert!(TypeMeta::array(circle.clone()).is_subtype_of(&TypeMeta::array(shape.clone())));
        assert!(!TypeMeta::array(Primitive::Int.into())
            .is_subtype_of(&TypeMeta::array(Primitive::Long.into())));
        assert!(Primitive::Int.boxed().is_subtype_of(&TypeMeta::number()));

        assert_eq!(
            circle.ancestors(),
            [circle.clone(), TypeMeta::object(), shape.clone()],
        );
    }

    #[test]
    fn test_boxing() {
        let integer = Primitive::Int.boxed();

        assert_eq!(integer.qualified_name(), "core.Integer");
        assert_eq!(integer.to_string(), "Integer");
        assert_eq!(integer.unboxed(), Some(Primitive::Int));
        assert_eq!(
            TypeMeta::primitive(Primitive::Int).box_counterpart(),
            Some(integer.clone()),
        );
        assert_eq!(TypeMeta::string().box_counterpart(), None);
    }
}
