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

use std::cmp::Ordering;

use crate::{
    runtime::{
        ArrayValue,
        InvocationError,
        InvocationResult,
        Primitive,
        TypeKind,
        TypeMeta,
        Value,
    },
    syntax::{BinaryOperator, UnaryOperator},
};

/// The primitive type of a value, looking through boxing classes.
pub(crate) fn primitive_of(ty: &TypeMeta) -> Option<Primitive> {
    ty.as_primitive().or_else(|| ty.unboxed())
}

/// The static result type of a binary operator, or None if the operator
/// does not apply to the operand types.
///
/// A missing operand type stands for `null`.
pub(crate) fn binary_type(
    operator: BinaryOperator,
    left: Option<&TypeMeta>,
    right: Option<&TypeMeta>,
) -> Option<TypeMeta> {
    let boolean = || Some(TypeMeta::primitive(Primitive::Boolean));

    let left_primitive = left.and_then(primitive_of);
    let right_primitive = right.and_then(primitive_of);

    match operator {
        BinaryOperator::Add => {
            let string = TypeMeta::string();

            if left == Some(&string) || right == Some(&string) {
                return Some(string);
            }

            Primitive::promote(left_primitive?, right_primitive?).map(TypeMeta::primitive)
        }

        BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => {
            Primitive::promote(left_primitive?, right_primitive?).map(TypeMeta::primitive)
        }

        BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::UShr => {
            let left = unary_promotion(left_primitive?)?;
            let right = unary_promotion(right_primitive?)?;

            match left.is_integral() && right.is_integral() {
                true => Some(TypeMeta::primitive(left)),
                false => None,
            }
        }

        BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::Gt | BinaryOperator::Ge => {
            Primitive::promote(left_primitive?, right_primitive?)?;

            boolean()
        }

        BinaryOperator::Eq | BinaryOperator::Ne => {
            match (left_primitive, right_primitive) {
                (Some(Primitive::Boolean), Some(Primitive::Boolean)) => (),
                (Some(left), Some(right)) => {
                    Primitive::promote(left, right)?;
                }
                _ => (),
            }

            boolean()
        }

        BinaryOperator::BitAnd | BinaryOperator::BitXor | BinaryOperator::BitOr => {
            match (left_primitive?, right_primitive?) {
                (Primitive::Boolean, Primitive::Boolean) => boolean(),
                (left, right) => {
                    let promoted = Primitive::promote(left, right)?;

                    match promoted.is_integral() {
                        true => Some(TypeMeta::primitive(promoted)),
                        false => None,
                    }
                }
            }
        }

        BinaryOperator::And | BinaryOperator::Or => {
            match (left_primitive?, right_primitive?) {
                (Primitive::Boolean, Primitive::Boolean) => boolean(),
                _ => None,
            }
        }

        BinaryOperator::InstanceOf => boolean(),
    }
}

/// The static result type of a prefix operator.
pub(crate) fn unary_type(operator: UnaryOperator, operand: Option<&TypeMeta>) -> Option<TypeMeta> {
    let primitive = operand.and_then(primitive_of)?;

    match operator {
        UnaryOperator::Not => match primitive {
            Primitive::Boolean => Some(TypeMeta::primitive(Primitive::Boolean)),
            _ => None,
        },

        UnaryOperator::Neg | UnaryOperator::Plus => {
            unary_promotion(primitive).map(TypeMeta::primitive)
        }

        UnaryOperator::BitNot => {
            let promoted = unary_promotion(primitive)?;

            match promoted.is_integral() {
                true => Some(TypeMeta::primitive(promoted)),
                false => None,
            }
        }
    }
}

/// Returns the value the short-circuit operator produces from its left
/// operand alone, or None if the right operand decides.
pub(crate) fn short_circuit(operator: BinaryOperator, left: &Value) -> Option<bool> {
    match (operator, left) {
        (BinaryOperator::And, Value::Boolean(false)) => Some(false),
        (BinaryOperator::Or, Value::Boolean(true)) => Some(true),
        _ => None,
    }
}

pub(crate) fn unary(operator: UnaryOperator, operand: &Value) -> InvocationResult<Value> {
    let Some(ty) = operand.type_meta() else {
        return Err(InvocationError::NullReference {
            member: operator.symbol().into(),
        });
    };

    let Some(result_type) = unary_type(operator, Some(&ty)) else {
        return Err(mismatch("numeric operand", operand));
    };

    let Some(primitive) = result_type.as_primitive() else {
        return Err(mismatch("numeric operand", operand));
    };

    if let UnaryOperator::Not = operator {
        return match operand.as_bool() {
            Some(value) => Ok(Value::Boolean(!value)),
            None => Err(mismatch("boolean operand", operand)),
        };
    }

    let operand = convert(operand, primitive)?;

    Ok(match (operator, operand) {
        (UnaryOperator::Plus, value) => value,
        (UnaryOperator::Neg, Value::Int(value)) => Value::Int(value.wrapping_neg()),
        (UnaryOperator::Neg, Value::Long(value)) => Value::Long(value.wrapping_neg()),
        (UnaryOperator::Neg, Value::Float(value)) => Value::Float(-value),
        (UnaryOperator::Neg, Value::Double(value)) => Value::Double(-value),
        (UnaryOperator::BitNot, Value::Int(value)) => Value::Int(!value),
        (UnaryOperator::BitNot, Value::Long(value)) => Value::Long(!value),
        (_, value) => return Err(mismatch("numeric operand", &value)),
    })
}

/// Applies a binary operator to evaluated operands.
///
/// For `&&` and `||` both operands must be evaluated; use [short_circuit]
/// to skip the right one.
pub(crate) fn binary(
    operator: BinaryOperator,
    left: &Value,
    right: &Value,
) -> InvocationResult<Value> {
    if let BinaryOperator::Eq | BinaryOperator::Ne = operator {
        let equal = equals(left, right);

        return Ok(Value::Boolean(match operator {
            BinaryOperator::Eq => equal,
            _ => !equal,
        }));
    }

    let left_type = left.type_meta();
    let right_type = right.type_meta();

    if let (BinaryOperator::Add, Some(string)) = (operator, concatenated(left, right)) {
        return Ok(Value::String(string.into()));
    }

    let Some(result_type) = binary_type(operator, left_type.as_ref(), right_type.as_ref()) else {
        return Err(InvocationError::failed(format!(
            "operator '{operator}' cannot be applied to {} and {}",
            describe_type(left_type.as_ref()),
            describe_type(right_type.as_ref()),
        )));
    };

    match operator {
        BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::Gt | BinaryOperator::Ge => {
            let ordering = compare(left, right)?;

            Ok(Value::Boolean(match operator {
                BinaryOperator::Lt => ordering == Some(Ordering::Less),
                BinaryOperator::Le => {
                    matches!(ordering, Some(Ordering::Less | Ordering::Equal))
                }
                BinaryOperator::Gt => ordering == Some(Ordering::Greater),
                _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            }))
        }

        BinaryOperator::And | BinaryOperator::Or => {
            let (Some(left), Some(right)) = (left.as_bool(), right.as_bool()) else {
                return Err(mismatch("boolean operand", left));
            };

            Ok(Value::Boolean(match operator {
                BinaryOperator::And => left && right,
                _ => left || right,
            }))
        }

        BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::UShr => {
            let Some(distance) = right.as_i64() else {
                return Err(mismatch("integral operand", right));
            };

            let promoted = primitive_of(&result_type).unwrap_or(Primitive::Int);

            shift(operator, &convert(left, promoted)?, distance)
        }

        _ => match result_type.as_primitive() {
            Some(Primitive::Boolean) => {
                let (Some(left), Some(right)) = (left.as_bool(), right.as_bool()) else {
                    return Err(mismatch("boolean operand", left));
                };

                Ok(Value::Boolean(match operator {
                    BinaryOperator::BitAnd => left & right,
                    BinaryOperator::BitXor => left ^ right,
                    _ => left | right,
                }))
            }

            Some(primitive) => arithmetic(
                operator,
                convert(left, primitive)?,
                convert(right, primitive)?,
            ),

            None => Err(mismatch("numeric operand", left)),
        },
    }
}

fn concatenated(left: &Value, right: &Value) -> Option<String> {
    match (left, right) {
        (Value::String(left), right) => Some(format!("{left}{right}")),
        (left, Value::String(right)) => Some(format!("{left}{right}")),
        _ => None,
    }
}

fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Float(_) | Value::Double(_), _) | (_, Value::Float(_) | Value::Double(_)) => {
            match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            }
        }

        _ => left.same(right),
    }
}

fn compare(left: &Value, right: &Value) -> InvocationResult<Option<Ordering>> {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return Ok(Some(left.cmp(&right)));
    }

    match (left.as_f64(), right.as_f64()) {
        (Some(left), Some(right)) => Ok(left.partial_cmp(&right)),
        (None, _) => Err(mismatch("numeric operand", left)),
        (_, None) => Err(mismatch("numeric operand", right)),
    }
}

fn shift(operator: BinaryOperator, left: &Value, distance: i64) -> InvocationResult<Value> {
    Ok(match left {
        Value::Int(value) => {
            let distance = (distance & 0x1F) as u32;

            Value::Int(match operator {
                BinaryOperator::Shl => value.wrapping_shl(distance),
                BinaryOperator::Shr => value.wrapping_shr(distance),
                _ => ((*value as u32) >> distance) as i32,
            })
        }

        Value::Long(value) => {
            let distance = (distance & 0x3F) as u32;

            Value::Long(match operator {
                BinaryOperator::Shl => value.wrapping_shl(distance),
                BinaryOperator::Shr => value.wrapping_shr(distance),
                _ => ((*value as u64) >> distance) as i64,
            })
        }

        other => return Err(mismatch("integral operand", other)),
    })
}

fn arithmetic(operator: BinaryOperator, left: Value, right: Value) -> InvocationResult<Value> {
    macro_rules! integral {
        ($variant:ident, $left:expr, $right:expr) => {{
            let (left, right) = ($left, $right);

            if right == 0 && matches!(operator, BinaryOperator::Div | BinaryOperator::Rem) {
                return Err(InvocationError::DivisionByZero);
            }

            Value::$variant(match operator {
                BinaryOperator::Add => left.wrapping_add(right),
                BinaryOperator::Sub => left.wrapping_sub(right),
                BinaryOperator::Mul => left.wrapping_mul(right),
                BinaryOperator::Div => left.wrapping_div(right),
                BinaryOperator::Rem => left.wrapping_rem(right),
                BinaryOperator::BitAnd => left & right,
                BinaryOperator::BitXor => left ^ right,
                BinaryOperator::BitOr => left | right,
                _ => return Err(InvocationError::failed(format!("unsupported operator '{operator}'"))),
            })
        }};
    }

    macro_rules! floating {
        ($variant:ident, $left:expr, $right:expr) => {{
            let (left, right) = ($left, $right);

            Value::$variant(match operator {
                BinaryOperator::Add => left + right,
                BinaryOperator::Sub => left - right,
                BinaryOperator::Mul => left * right,
                BinaryOperator::Div => left / right,
                BinaryOperator::Rem => left % right,
                _ => return Err(InvocationError::failed(format!("unsupported operator '{operator}'"))),
            })
        }};
    }

    Ok(match (left, right) {
        (Value::Int(left), Value::Int(right)) => integral!(Int, left, right),
        (Value::Long(left), Value::Long(right)) => integral!(Long, left, right),
        (Value::Float(left), Value::Float(right)) => floating!(Float, left, right),
        (Value::Double(left), Value::Double(right)) => floating!(Double, left, right),
        (left, _) => return Err(mismatch("numeric operand", &left)),
    })
}

/// The type `byte`, `short` and `char` operands are promoted to by unary
/// operators and shifts.
fn unary_promotion(primitive: Primitive) -> Option<Primitive> {
    match primitive {
        Primitive::Boolean => None,
        Primitive::Byte | Primitive::Short | Primitive::Char => Some(Primitive::Int),
        other => Some(other),
    }
}

/// Converts a primitive value into another primitive type with the cast
/// semantics: integral narrowing truncates, floating to integral rounds
/// toward zero and saturates.
pub(crate) fn convert(value: &Value, target: Primitive) -> InvocationResult<Value> {
    if let Primitive::Boolean = target {
        return match value {
            Value::Boolean(_) => Ok(value.clone()),
            other => Err(mismatch("boolean", other)),
        };
    }

    let integral = value.as_i64();

    let Some(floating) = value.as_f64() else {
        return Err(mismatch(target.name(), value));
    };

    Ok(match (target, integral) {
        (Primitive::Byte, Some(value)) => Value::Byte(value as i8),
        (Primitive::Short, Some(value)) => Value::Short(value as i16),
        (Primitive::Int, Some(value)) => Value::Int(value as i32),
        (Primitive::Long, Some(value)) => Value::Long(value),
        (Primitive::Char, Some(value)) => Value::Char(to_char(value as u16)),
        (Primitive::Byte, None) => Value::Byte(floating as i32 as i8),
        (Primitive::Short, None) => Value::Short(floating as i32 as i16),
        (Primitive::Int, None) => Value::Int(floating as i32),
        (Primitive::Long, None) => Value::Long(floating as i64),
        (Primitive::Char, None) => Value::Char(to_char(floating as i32 as u16)),
        (Primitive::Float, _) => Value::Float(floating as f32),
        (Primitive::Double, _) => Value::Double(floating),
        (Primitive::Boolean, _) => return Err(mismatch("boolean", value)),
    })
}

fn to_char(code: u16) -> char {
    char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Converts a value for an assignment or an argument of the `target` type.
///
/// Only the implicit conversions apply: primitive widening, boxing and
/// unboxing, and reference subtyping.
pub(crate) fn coerce(value: Value, target: &TypeMeta) -> InvocationResult<Value> {
    let actual = value.type_meta();

    if let Some(primitive) = primitive_of(target) {
        let Some(actual) = actual.as_ref() else {
            return match target.is_reference() {
                true => Ok(Value::Null),
                false => Err(mismatch(primitive.name(), &value)),
            };
        };

        let Some(source) = primitive_of(actual) else {
            return match target.is_reference() && actual.is_subtype_of(target) {
                true => Ok(value),
                false => Err(mismatch(primitive.name(), &value)),
            };
        };

        if source == primitive || source.widens_to(primitive) {
            return convert(&value, primitive);
        }

        return Err(mismatch(primitive.name(), &value));
    }

    let Some(actual) = actual else {
        return Ok(Value::Null);
    };

    if actual.is_subtype_of(target) {
        return Ok(value);
    }

    if let Some(boxed) = actual.box_counterpart() {
        if boxed.is_subtype_of(target) {
            return Ok(value);
        }
    }

    Err(InvocationError::TypeMismatch {
        expected: target.clone(),
        actual: Some(actual),
    })
}

/// Applies an explicit cast.
pub(crate) fn cast(value: Value, target: &TypeMeta) -> InvocationResult<Value> {
    if let TypeKind::Primitive(primitive) = target.kind() {
        return match value.type_meta() {
            Some(_) => convert(&value, *primitive),
            None => Err(InvocationError::NullReference {
                member: format!("({target})").into(),
            }),
        };
    }

    if value.is_null() || instance_of(&value, target) {
        return Ok(value);
    }

    Err(InvocationError::ClassCast {
        from: value.type_meta().unwrap_or_else(TypeMeta::object),
        to: target.clone(),
    })
}

/// The `instanceof` check. A `null` value is not an instance of any type.
pub(crate) fn instance_of(value: &Value, ty: &TypeMeta) -> bool {
    let Some(actual) = value.type_meta() else {
        return false;
    };

    if actual.is_subtype_of(ty) {
        return true;
    }

    match actual.box_counterpart() {
        Some(boxed) => actual.as_primitive().is_some() && boxed.is_subtype_of(ty),
        None => false,
    }
}

/// Reads an array element.
pub(crate) fn index(target: &Value, index: &Value) -> InvocationResult<Value> {
    let (array, position) = element(target, index)?;

    match array.get(position) {
        Some(value) => Ok(value),
        None => Err(InvocationError::OutOfBounds {
            index: position as i64,
            length: array.len(),
        }),
    }
}

/// Writes an array element, converting the value to the component type.
pub(crate) fn store(target: &Value, index: &Value, value: Value) -> InvocationResult<Value> {
    let (array, position) = element(target, index)?;

    let value = coerce(value, array.component())?;

    match array.set(position, value.clone()) {
        true => Ok(value),
        false => Err(InvocationError::OutOfBounds {
            index: position as i64,
            length: array.len(),
        }),
    }
}

fn element<'a>(
    target: &'a Value,
    index: &Value,
) -> InvocationResult<(&'a ArrayValue, usize)> {
    let array = match target {
        Value::Array(array) => array,
        Value::Null => {
            return Err(InvocationError::NullReference {
                member: "[]".into(),
            })
        }
        other => return Err(mismatch("array", other)),
    };

    let position = match index {
        Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_) => {
            index.as_i64().unwrap_or_default()
        }
        other => return Err(mismatch("int", other)),
    };

    match usize::try_from(position) {
        Ok(position) => Ok((array, position)),
        Err(_) => Err(InvocationError::OutOfBounds {
            index: position,
            length: array.len(),
        }),
    }
}

fn mismatch(expected: &str, value: &Value) -> InvocationError {
    InvocationError::failed(format!(
        "expected {expected}, found {}",
        describe_type(value.type_meta().as_ref()),
    ))
}

pub(crate) fn describe_type(ty: Option<&TypeMeta>) -> String {
    match ty {
        Some(ty) => ty.to_string(),
        None => String::from("null"),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        runtime::{InvocationError, Primitive, TypeMeta, Value},
        syntax::{BinaryOperator, UnaryOperator},
        tree::ops::{binary, binary_type, cast, coerce, instance_of, unary},
    };

    #[test]
    fn test_numeric_promotion() {
        let result = binary(BinaryOperator::Add, &Value::Int(2), &Value::Double(0.5)).unwrap();
        assert!(matches!(result, Value::Double(value) if value == 2.5));

        let result = binary(BinaryOperator::Mul, &Value::Char('A'), &Value::Int(2)).unwrap();
        assert!(matches!(result, Value::Int(130)));

        let result = binary(BinaryOperator::Add, &Value::Int(i32::MAX), &Value::Int(1)).unwrap();
        assert!(matches!(result, Value::Int(i32::MIN)));

        let result = binary(BinaryOperator::Div, &Value::Long(7), &Value::Int(2)).unwrap();
        assert!(matches!(result, Value::Long(3)));
    }

    #[test]
    fn test_concatenation_and_equality() {
        let result = binary(BinaryOperator::Add, &Value::from("a"), &Value::Int(1)).unwrap();
        assert_eq!(result.as_str(), Some("a1"));

        let result = binary(BinaryOperator::Eq, &Value::Int(1), &Value::Double(1.0)).unwrap();
        assert!(matches!(result, Value::Boolean(true)));

        let result = binary(BinaryOperator::Ne, &Value::from("x"), &Value::from("x")).unwrap();
        assert!(matches!(result, Value::Boolean(false)));

        let result = binary(BinaryOperator::Eq, &Value::Null, &Value::from("x")).unwrap();
        assert!(matches!(result, Value::Boolean(false)));
    }

    #[test]
    fn test_failures() {
        assert!(matches!(
            binary(BinaryOperator::Rem, &Value::Int(1), &Value::Int(0)),
            Err(InvocationError::DivisionByZero),
        ));

        assert!(binary(BinaryOperator::Sub, &Value::from("a"), &Value::Int(1)).is_err());
        assert!(unary(UnaryOperator::Not, &Value::Int(1)).is_err());
        assert!(unary(UnaryOperator::Neg, &Value::Null).is_err());
    }

    #[test]
    fn test_shifts_and_bits() {
        let result = binary(BinaryOperator::UShr, &Value::Int(-1), &Value::Int(28)).unwrap();
        assert!(matches!(result, Value::Int(15)));

        let result = binary(BinaryOperator::Shl, &Value::Long(1), &Value::Int(65)).unwrap();
        assert!(matches!(result, Value::Long(2)));

        let result = binary(BinaryOperator::BitXor, &Value::Boolean(true), &Value::Boolean(true))
            .unwrap();
        assert!(matches!(result, Value::Boolean(false)));

        let result = unary(UnaryOperator::BitNot, &Value::Byte(0)).unwrap();
        assert!(matches!(result, Value::Int(-1)));
    }

    #[test]
    fn test_static_types() {
        let int = TypeMeta::primitive(Primitive::Int);
        let boxed_long = Primitive::Long.boxed();

        assert_eq!(
            binary_type(BinaryOperator::Add, Some(&int), Some(&boxed_long)),
            Some(TypeMeta::primitive(Primitive::Long)),
        );
        assert_eq!(
            binary_type(BinaryOperator::Add, None, Some(&TypeMeta::string())),
            Some(TypeMeta::string()),
        );
        assert_eq!(binary_type(BinaryOperator::Sub, None, Some(&int)), None);
        assert_eq!(
            binary_type(BinaryOperator::Eq, None, Some(&TypeMeta::object())),
            Some(TypeMeta::primitive(Primitive::Boolean)),
        );
    }

    #[test]
    fn test_conversions() {
        let long = TypeMeta::primitive(Primitive::Long);
        let byte = TypeMeta::primitive(Primitive::Byte);

        assert!(matches!(coerce(Value::Int(3), &long), Ok(Value::Long(3))));
        assert!(coerce(Value::Long(3), &TypeMeta::primitive(Primitive::Int)).is_err());
        assert!(matches!(coerce(Value::Int(3), &TypeMeta::object()), Ok(Value::Int(3))));
        assert!(matches!(coerce(Value::Null, &TypeMeta::string()), Ok(Value::Null)));

        assert!(matches!(cast(Value::Int(300), &byte), Ok(Value::Byte(44))));
        assert!(matches!(
            cast(Value::Double(3.9), &TypeMeta::primitive(Primitive::Int)),
            Ok(Value::Int(3)),
        ));
        assert!(matches!(
            cast(Value::from("x"), &TypeMeta::number()),
            Err(InvocationError::ClassCast { .. }),
        ));

        assert!(instance_of(&Value::Int(1), &TypeMeta::number()));
        assert!(instance_of(&Value::from("x"), &TypeMeta::object()));
        assert!(!instance_of(&Value::Null, &TypeMeta::object()));
    }
}
