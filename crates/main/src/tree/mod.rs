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

//! Evaluation trees.
//!
//! The parser builds a [Node] for every subexpression it recognizes. During
//! an immediate evaluation the parser applies each node to the values of
//! its already evaluated operands right away ([Node::apply]); a compiled
//! expression keeps the tree and evaluates it from scratch for every
//! instance ([Node::evaluate]).

pub(crate) mod ops;

use std::sync::Arc;

use compact_str::CompactString;
use lady_deirdre::lexis::Site;

use crate::{
    runtime::{
        ArrayValue,
        ExecutableMeta,
        FieldMeta,
        InvocationError,
        InvocationResult,
        LambdaValue,
        Primitive,
        TypeMeta,
        TypeProvider,
        Value,
        Variables,
    },
    syntax::{BinaryOperator, UnaryOperator},
};

/// The evaluation environment of a tree.
#[derive(Clone, Copy)]
pub(crate) struct EvalEnv<'a> {
    pub(crate) provider: &'a Arc<dyn TypeProvider>,
    pub(crate) root: &'a Value,
    pub(crate) variables: &'a Variables,
    /// Lambda parameters in scope, outermost first.
    pub(crate) locals: &'a [Value],
}

/// A failure of a tree evaluation, located at the node that failed.
#[derive(Clone, Debug)]
pub(crate) struct EvaluationFailure {
    pub(crate) site: Site,
    pub(crate) error: InvocationError,
}

/// A subexpression.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    /// The start of the subexpression in the source text.
    pub(crate) site: Site,
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Literal(Value),
    This,
    Variable(CompactString),
    Local(usize),
    Field {
        target: Option<Arc<Node>>,
        field: FieldMeta,
    },
    Invoke {
        target: Option<Arc<Node>>,
        executable: ExecutableMeta,
        arguments: Vec<Arc<Node>>,
    },
    Construct {
        executable: ExecutableMeta,
        arguments: Vec<Arc<Node>>,
    },
    /// `new T[a][b][]`: the `ty` is the array type being created.
    NewArray {
        ty: TypeMeta,
        dimensions: Vec<Arc<Node>>,
    },
    /// An array with the listed items; also the packed variadic arguments.
    ArrayLiteral {
        component: TypeMeta,
        items: Vec<Arc<Node>>,
    },
    Index {
        target: Arc<Node>,
        index: Arc<Node>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Arc<Node>,
    },
    Binary {
        operator: BinaryOperator,
        left: Arc<Node>,
        right: Arc<Node>,
    },
    InstanceOf {
        operand: Arc<Node>,
        ty: TypeMeta,
    },
    Cast {
        operand: Arc<Node>,
        ty: TypeMeta,
    },
    Assign {
        target: AssignTarget,
        value: Arc<Node>,
        ty: TypeMeta,
    },
    Lambda {
        ty: TypeMeta,
        params: usize,
        body: Arc<Node>,
    },
}

#[derive(Clone, Debug)]
pub(crate) enum AssignTarget {
    Variable(CompactString),
    Field {
        target: Option<Arc<Node>>,
        field: FieldMeta,
    },
    Index {
        target: Arc<Node>,
        index: Arc<Node>,
    },
}

impl Node {
    #[inline(always)]
    pub(crate) fn new(kind: NodeKind, site: Site) -> Arc<Self> {
        Arc::new(Self { kind, site })
    }

    /// Returns true if applying the node may change observable state: it
    /// invokes host code or assigns.
    pub(crate) fn has_side_effects(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Invoke { .. } | NodeKind::Construct { .. } | NodeKind::Assign { .. },
        )
    }

    /// The operand nodes in the order [apply](Self::apply) expects their
    /// values.
    pub(crate) fn operands(&self) -> Vec<&Arc<Node>> {
        match &self.kind {
            NodeKind::Literal(_)
            | NodeKind::This
            | NodeKind::Variable(_)
            | NodeKind::Local(_)
            | NodeKind::Lambda { .. } => Vec::new(),

            NodeKind::Field { target, .. } => target.iter().collect(),

            NodeKind::Invoke {
                target, arguments, ..
            } => target.iter().chain(arguments.iter()).collect(),

            NodeKind::Construct { arguments, .. } => arguments.iter().collect(),
            NodeKind::NewArray { dimensions, .. } => dimensions.iter().collect(),
            NodeKind::ArrayLiteral { items, .. } => items.iter().collect(),
            NodeKind::Index { target, index } => vec![target, index],
            NodeKind::Unary { operand, .. } => vec![operand],
            NodeKind::Binary { left, right, .. } => vec![left, right],
            NodeKind::InstanceOf { operand, .. } => vec![operand],
            NodeKind::Cast { operand, .. } => vec![operand],

            NodeKind::Assign { target, value, .. } => {
                let mut result = match target {
                    AssignTarget::Variable(_) => Vec::new(),
                    AssignTarget::Field { target, .. } => target.iter().collect(),
                    AssignTarget::Index { target, index } => vec![target, index],
                };

                result.push(value);

                result
            }
        }
    }

    /// Evaluates the whole tree.
    pub(crate) fn evaluate(&self, env: &EvalEnv) -> Result<Value, EvaluationFailure> {
        if let NodeKind::Binary {
            operator,
            left,
            right,
        } = &self.kind
        {
            let left = left.evaluate(env)?;

            if let Some(result) = ops::short_circuit(*operator, &left) {
                return Ok(Value::Boolean(result));
            }

            let right = right.evaluate(env)?;

            return self.locate(ops::binary(*operator, &left, &right));
        }

        let mut values = Vec::new();

        for operand in self.operands() {
            values.push(operand.evaluate(env)?);
        }

        self.locate(self.apply(env, values))
    }

    /// Performs the node's own operation on the values of its operands.
    pub(crate) fn apply(&self, env: &EvalEnv, operands: Vec<Value>) -> InvocationResult<Value> {
        let mut operands = operands.into_iter();
        let mut next = move || operands.next().unwrap_or_default();

        match &self.kind {
            NodeKind::Literal(value) => Ok(value.clone()),

            NodeKind::This => Ok(env.root.clone()),

            NodeKind::Variable(name) => match env.variables.get(name) {
                Some(variable) => Ok(variable.value),
                None => Err(InvocationError::failed(format!("unknown variable '{name}'"))),
            },

            NodeKind::Local(index) => match env.locals.get(*index) {
                Some(value) => Ok(value.clone()),
                None => Err(InvocationError::failed("lambda parameter is out of scope")),
            },

            NodeKind::Field { target, field } => {
                let instance = receiver(target.is_some(), &mut next, field.name.as_str())?;

                env.provider.get_field(field, &instance)
            }

            NodeKind::Invoke {
                target,
                executable,
                arguments,
            } => {
                let instance = receiver(target.is_some(), &mut next, executable.name.as_str())?;

                let arguments = coerce_arguments(executable, arguments.len(), &mut next)?;

                env.provider.invoke(executable, &instance, &arguments)
            }

            NodeKind::Construct {
                executable,
                arguments,
            } => {
                let arguments = coerce_arguments(executable, arguments.len(), &mut next)?;

                env.provider.invoke(executable, &Value::Null, &arguments)
            }

            NodeKind::NewArray { ty, dimensions } => {
                let mut lengths = Vec::with_capacity(dimensions.len());

                for _ in dimensions {
                    let length = next();

                    let Some(length) = length.as_i64() else {
                        return Err(InvocationError::TypeMismatch {
                            expected: TypeMeta::primitive(Primitive::Int),
                            actual: length.type_meta(),
                        });
                    };

                    match usize::try_from(length) {
                        Ok(length) => lengths.push(length),
                        Err(_) => {
                            return Err(InvocationError::OutOfBounds {
                                index: length,
                                length: 0,
                            })
                        }
                    }
                }

                Ok(new_array(ty, &lengths))
            }

            NodeKind::ArrayLiteral { component, items } => {
                let mut values = Vec::with_capacity(items.len());

                for _ in items {
                    values.push(ops::coerce(next(), component)?);
                }

                Ok(Value::Array(ArrayValue::new(component.clone(), values)))
            }

            NodeKind::Index { .. } => {
                let target = next();
                let index = next();

                ops::index(&target, &index)
            }

            NodeKind::Unary { operator, .. } => ops::unary(*operator, &next()),

            NodeKind::Binary { operator, .. } => {
                let left = next();
                let right = next();

                ops::binary(*operator, &left, &right)
            }

            NodeKind::InstanceOf { ty, .. } => Ok(Value::Boolean(ops::instance_of(&next(), ty))),

            NodeKind::Cast { ty, .. } => ops::cast(next(), ty),

            NodeKind::Assign { target, ty, .. } => match target {
                AssignTarget::Variable(name) => {
                    let value = ops::coerce(next(), ty)?;

                    env.variables.assign(name, value.clone())?;

                    Ok(value)
                }

                AssignTarget::Field { target, field } => {
                    let instance = receiver(target.is_some(), &mut next, field.name.as_str())?;
                    let value = ops::coerce(next(), ty)?;

                    if field.is_final {
                        return Err(InvocationError::FinalAssignment {
                            name: field.name.clone(),
                        });
                    }

                    env.provider.set_field(field, &instance, value.clone())?;

                    Ok(value)
                }

                AssignTarget::Index { .. } => {
                    let target = next();
                    let index = next();

                    ops::store(&target, &index, next())
                }
            },

            NodeKind::Lambda { ty, params, body } => Ok(Value::Function(Arc::new(
                LambdaValue::new(ty.clone(), *params, body.clone(), env),
            ))),
        }
    }

    #[inline(always)]
    fn locate(&self, result: InvocationResult<Value>) -> Result<Value, EvaluationFailure> {
        result.map_err(|error| EvaluationFailure {
            site: self.site,
            error,
        })
    }
}

fn receiver(
    has_target: bool,
    next: &mut impl FnMut() -> Value,
    member: &str,
) -> InvocationResult<Value> {
    if !has_target {
        return Ok(Value::Null);
    }

    match next() {
        Value::Null => Err(InvocationError::NullReference {
            member: member.into(),
        }),
        instance => Ok(instance),
    }
}

fn coerce_arguments(
    executable: &ExecutableMeta,
    count: usize,
    next: &mut impl FnMut() -> Value,
) -> InvocationResult<Vec<Value>> {
    if count != executable.params.len() {
        return Err(InvocationError::ArityMismatch {
            expected: executable.params.len(),
            actual: count,
        });
    }

    executable
        .params
        .iter()
        .map(|param| ops::coerce(next(), param))
        .collect()
}

fn new_array(ty: &TypeMeta, lengths: &[usize]) -> Value {
    let Some(component) = ty.component() else {
        return Value::Null;
    };

    let Some((length, rest)) = lengths.split_first() else {
        return Value::Null;
    };

    let items = match rest.is_empty() {
        true => vec![Value::default_of(component); *length],
        false => (0..*length).map(|_| new_array(component, rest)).collect(),
    };

    Value::Array(ArrayValue::new(component.clone(), items))
}

/// What the parser knows about a subexpression's value.
#[derive(Clone, Debug)]
pub(crate) struct ObjectInfo {
    /// The value, or None if it was not evaluated.
    pub(crate) value: Option<Value>,
    /// The static type; None for the `null` literal.
    pub(crate) declared: Option<TypeMeta>,
}

impl ObjectInfo {
    #[inline(always)]
    pub(crate) fn known(value: Value, declared: Option<TypeMeta>) -> Self {
        Self {
            value: Some(value),
            declared,
        }
    }

    #[inline(always)]
    pub(crate) fn indeterminate(declared: Option<TypeMeta>) -> Self {
        Self {
            value: None,
            declared,
        }
    }

    /// The type members are looked up in: the runtime type of a known
    /// non-null value if `dynamic` is set, the declared type otherwise.
    pub(crate) fn ty(&self, dynamic: bool) -> Option<TypeMeta> {
        if dynamic {
            if let Some(runtime) = self.value.as_ref().and_then(Value::type_meta) {
                return match &self.declared {
                    Some(declared) if declared.as_primitive().is_some() => Some(declared.clone()),
                    _ => Some(runtime),
                };
            }
        }

        self.declared.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        runtime::{Primitive, SchemaProvider, TypeMeta, TypeProvider, Value, Variables},
        syntax::BinaryOperator,
        tree::{EvalEnv, Node, NodeKind, ObjectInfo},
    };

    fn env_parts() -> (Arc<dyn TypeProvider>, Variables) {
        let provider: Arc<dyn TypeProvider> = Arc::new(SchemaProvider::new());
        let variables = Variables::new();

        variables.define("x", 40);

        (provider, variables)
    }

    #[test]
    fn test_tree_evaluation() {
        let (provider, variables) = env_parts();
        let root = Value::Null;

        let env = EvalEnv {
            provider: &provider,
            root: &root,
            variables: &variables,
            locals: &[],
        };

        let sum = Node::new(
            NodeKind::Binary {
                operator: BinaryOperator::Add,
                left: Node::new(NodeKind::Variable("x".into()), 0),
                right: Node::new(NodeKind::Literal(Value::Int(2)), 4),
            },
            0,
        );

        assert!(matches!(sum.evaluate(&env), Ok(Value::Int(42))));

        let failing = Node::new(
            NodeKind::Binary {
                operator: BinaryOperator::Div,
                left: Node::new(NodeKind::Literal(Value::Int(1)), 0),
                right: Node::new(NodeKind::Literal(Value::Int(0)), 4),
            },
            2,
        );

        assert_eq!(failing.evaluate(&env).map_err(|failure| failure.site).err(), Some(2));
    }

    #[test]
    fn test_short_circuit() {
        let (provider, variables) = env_parts();
        let root = Value::Null;

        let env = EvalEnv {
            provider: &provider,
            root: &root,
            variables: &variables,
            locals: &[],
        };

        let guarded = Node::new(
            NodeKind::Binary {
                operator: BinaryOperator::And,
                left: Node::new(NodeKind::Literal(Value::Boolean(false)), 0),
                right: Node::new(NodeKind::Variable("missing".into()), 9),
            },
            0,
        );

        assert!(matches!(guarded.evaluate(&env), Ok(Value::Boolean(false))));
    }

    #[test]
    fn test_object_info_types() {
        let boxed = ObjectInfo::known(Value::Int(1), Some(TypeMeta::object()));

        assert_eq!(boxed.ty(true), Some(TypeMeta::primitive(Primitive::Int)));
        assert_eq!(boxed.ty(false), Some(TypeMeta::object()));

        let null = ObjectInfo::known(Value::Null, Some(TypeMeta::string()));

        assert_eq!(null.ty(true), Some(TypeMeta::string()));
        assert_eq!(ObjectInfo::indeterminate(None).ty(true), None);
    }
}
