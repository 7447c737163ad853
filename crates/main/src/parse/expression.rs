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

use crate::{
    parse::{
        context::{ExecutionPolicy, Expectation, ParseContext},
        into_object,
        operand::{literal, OperandParser},
        outcome::{Confidence, ObjectOutcome, ParseOutcome, Step, Tracker},
        types::{instance_testable, read_type},
        Parser,
    },
    rating::TypeMatch,
    runtime::{Primitive, TypeMeta, Value},
    syntax::{peek_assignment, BinaryOperator, TokenStream, UnaryOperator},
    tree::{
        ops::{binary_type, describe_type, short_circuit, unary_type},
        AssignTarget,
        Node,
        NodeKind,
        ObjectInfo,
    },
};

/// A complete expression: operands joined by operators, possibly an
/// assignment.
#[derive(Default)]
pub(crate) struct ExpressionParser {
    tracker: Tracker,
}

impl Parser for ExpressionParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let object = self.assignment(ctx, stream, &expectation.hints())?;

        stream.set_position(object.end);

        Ok(ParseOutcome::Object(object))
    }
}

/// Parses a prefix-operator expression, the operand of a cast.
pub(crate) fn parse_unary(
    ctx: &ParseContext,
    stream: &TokenStream,
    expectation: &Expectation,
) -> ParseOutcome {
    let mut attempt = stream.clone();

    match ExpressionParser::default().unary(ctx, &mut attempt, expectation) {
        Ok(object) => ParseOutcome::Object(object),
        Err(outcome) => outcome,
    }
}

impl ExpressionParser {
    fn assignment(
        &mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        hints: &Expectation,
    ) -> Step<ObjectOutcome> {
        let left = self.binary(ctx, stream, BinaryOperator::MIN_PRECEDENCE, hints)?;

        stream.set_position(left.end);

        if !peek_assignment(stream) {
            return Ok(left);
        }

        let position = stream.next_token_start();

        let _ = stream.skip_str("=");

        self.tracker.commit(Confidence::RightParser)?;

        let (target, ty, mut parts) = match &left.node.kind {
            NodeKind::Variable(name) => {
                let Some(variable) = ctx.config.variables.get(name) else {
                    return Err(self.tracker.error(left.start, format!("unknown variable '{name}'")));
                };

                if variable.is_final {
                    return Err(self.tracker.error(
                        position,
                        format!("cannot assign a value to final variable '{name}'"),
                    ));
                }

                (AssignTarget::Variable(name.clone()), variable.ty(), Vec::new())
            }

            NodeKind::Field { target, field } => {
                if field.is_final {
                    return Err(self.tracker.error(
                        position,
                        format!("cannot assign a value to final field '{}'", field.name),
                    ));
                }

                let ty = left.info.declared.clone().unwrap_or_else(|| field.ty.clone());

                let target = AssignTarget::Field {
                    target: target.clone(),
                    field: field.clone(),
                };

                (target, ty, left.parts.clone())
            }

            NodeKind::Index { target, index } => {
                let Some(ty) = left.info.declared.clone() else {
                    return Err(self.tracker.error(position, "unknown array element type"));
                };

                let target = AssignTarget::Index {
                    target: target.clone(),
                    index: index.clone(),
                };

                (target, ty, left.parts.clone())
            }

            _ => {
                return Err(self.tracker.error(
                    position,
                    format!("cannot assign a value to {}", left.description),
                ));
            }
        };

        let value = self.assignment(ctx, stream, &Expectation::hinted(vec![ty.clone()]))?;
        let actual = ctx.ty_of(&value.info);

        if TypeMatch::rate(actual.as_ref(), Some(&ty)) == TypeMatch::None {
            return Err(self.tracker.error(
                value.start,
                format!(
                    "incompatible types: {} cannot be converted to {ty}",
                    describe_type(actual.as_ref()),
                ),
            ));
        }

        let description = format!("{} = {}", left.description, value.description);
        let end = value.end;

        parts.push(value.info);

        let node = Node::new(
            NodeKind::Assign {
                target,
                value: value.node,
                ty: ty.clone(),
            },
            left.start,
        );

        ObjectOutcome::produce(ctx, node, parts, Some(ty), left.start, end, description)
    }

    /// Precedence climbing over the operators binding at least as tight as
    /// `min`.
    fn binary(
        &mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        min: u8,
        hints: &Expectation,
    ) -> Step<ObjectOutcome> {
        let mut left = self.unary(ctx, stream, hints)?;

        stream.set_position(left.end);

        self.tracker.commit(Confidence::PotentiallyRightParser)?;

        loop {
            let Some(operator) = BinaryOperator::peek(stream) else {
                break;
            };

            if operator.precedence() < min {
                break;
            }

            let position = stream.next_token_start();

            operator.consume(stream);

            self.tracker.commit(Confidence::RightParser)?;

            if operator == BinaryOperator::InstanceOf {
                let ty = read_type(ctx, stream, &self.tracker, false, true)?;
                let actual = ctx.ty_of(&left.info);

                if !instance_testable(actual.as_ref(), &ty) {
                    return Err(self.tracker.error(
                        position,
                        format!(
                            "inconvertible types: {} cannot be tested against {ty}",
                            describe_type(actual.as_ref()),
                        ),
                    ));
                }

                let description = format!("{} instanceof {ty}", left.description);

                let node = Node::new(
                    NodeKind::InstanceOf {
                        operand: left.node.clone(),
                        ty,
                    },
                    left.start,
                );

                left = ObjectOutcome::produce(
                    ctx,
                    node,
                    vec![left.info],
                    Some(TypeMeta::primitive(Primitive::Boolean)),
                    left.start,
                    stream.position(),
                    description,
                )?;

                continue;
            }

            let decided = left
                .info
                .value
                .as_ref()
                .and_then(|value| short_circuit(operator, value));

            let right_ctx = match decided {
                Some(_) => ctx.restricted(ExecutionPolicy::Skip),
                None => ctx.clone(),
            };

            let right_hints = match operator {
                BinaryOperator::And | BinaryOperator::Or => {
                    Expectation::hinted(vec![TypeMeta::primitive(Primitive::Boolean)])
                }

                BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge => {
                    Expectation::hinted(ctx.ty_of(&left.info).into_iter().collect())
                }

                _ => Expectation::object(),
            };

            let right = self.binary(&right_ctx, stream, operator.precedence() + 1, &right_hints)?;

            stream.set_position(right.end);

            let left_ty = ctx.ty_of(&left.info);
            let right_ty = right_ctx.ty_of(&right.info);

            let Some(ty) = binary_type(operator, left_ty.as_ref(), right_ty.as_ref()) else {
                return Err(self.tracker.error(
                    position,
                    format!(
                        "bad operand types for binary operator '{operator}': {} and {}",
                        describe_type(left_ty.as_ref()),
                        describe_type(right_ty.as_ref()),
                    ),
                ));
            };

            let description = format!("{} {operator} {}", left.description, right.description);
            let start = left.start;
            let end = right.end;

            let node = Node::new(
                NodeKind::Binary {
                    operator,
                    left: left.node.clone(),
                    right: right.node.clone(),
                },
                start,
            );

            let parts = vec![left.info, right.info];

            left = match decided {
                Some(result) => ObjectOutcome {
                    node,
                    info: ObjectInfo::known(Value::Boolean(result), Some(ty)),
                    parts,
                    start,
                    end,
                    description,
                },

                None => ObjectOutcome::produce(ctx, node, parts, Some(ty), start, end, description)?,
            };
        }

        Ok(left)
    }

    fn unary(
        &mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        hints: &Expectation,
    ) -> Step<ObjectOutcome> {
        let start = stream.next_token_start();

        let Some(operator) = UnaryOperator::read(stream) else {
            let outcome = OperandParser::default().parse(ctx, stream, hints);
            let operand = into_object(self.tracker.lift(outcome))?;

            stream.set_position(operand.end);

            return Ok(operand);
        };

        self.tracker.commit(Confidence::PotentiallyRightParser)?;

        let digit = stream.peek_char().map_or(false, |ch| ch.is_ascii_digit());

        if operator == UnaryOperator::Neg && digit {
            self.tracker.commit(Confidence::RightParser)?;

            let value = match stream.read_negated_number() {
                Ok(value) => value,
                Err(error) => return Err(ctx.interrupt(&self.tracker, error)),
            };

            let description = format!("literal {value}");

            return Ok(literal(value, start, stream.position(), description));
        }

        let operand = self.unary(ctx, stream, &Expectation::object())?;
        let actual = ctx.ty_of(&operand.info);

        let Some(ty) = unary_type(operator, actual.as_ref()) else {
            self.tracker.commit(Confidence::RightParser)?;

            return Err(self.tracker.error(
                start,
                format!(
                    "bad operand type {} for unary operator '{operator}'",
                    describe_type(actual.as_ref()),
                ),
            ));
        };

        let description = format!("{operator}{}", operand.description);
        let end = operand.end;

        let node = Node::new(
            NodeKind::Unary {
                operator,
                operand: operand.node,
            },
            start,
        );

        ObjectOutcome::produce(ctx, node, vec![operand.info], Some(ty), start, end, description)
    }
}
