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

use std::sync::Arc;

use ahash::AHashSet;
use compact_str::CompactString;
use log::debug;

use crate::{
    parse::outcome::{
        ErrorPriority,
        ParseOutcome,
        Step,
        SyntaxFailure,
    },
    rating::TypeMatch,
    runtime::{ExecutableKind, ExecutableMeta, FieldMeta, TypeMeta, TypeProvider},
    syntax::TokenStream,
    tree::{ops::describe_type, EvalEnv, Node, ObjectInfo},
    EngineConfig,
    EvaluationMode,
    PARSER_LOG,
};

/// What the parser may evaluate while it parses.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) enum ExecutionPolicy {
    /// Evaluate everything.
    Full,

    /// Read fields, variables and array elements, apply operators, but
    /// never invoke host code or assign.
    SideEffectFree,

    /// Evaluate nothing.
    Skip,
}

/// A lambda parameter in scope.
#[derive(Clone, Debug)]
pub(crate) struct Local {
    pub(crate) name: CompactString,
    pub(crate) ty: TypeMeta,
}

/// The environment shared by all parsers of a single parse call.
#[derive(Clone)]
pub(crate) struct ParseContext<'a> {
    pub(crate) provider: &'a Arc<dyn TypeProvider>,
    pub(crate) config: &'a EngineConfig,
    pub(crate) policy: ExecutionPolicy,
    pub(crate) dynamic: bool,
    pub(crate) root: &'a ObjectInfo,
    pub(crate) locals: Vec<Local>,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(
        provider: &'a Arc<dyn TypeProvider>,
        config: &'a EngineConfig,
        policy: ExecutionPolicy,
        root: &'a ObjectInfo,
    ) -> Self {
        let dynamic = policy != ExecutionPolicy::Skip
            && config.evaluation_mode == EvaluationMode::DynamicTyping;

        Self {
            provider,
            config,
            policy,
            dynamic,
            root,
            locals: Vec::new(),
        }
    }

    /// A context that evaluates no more than the `policy` allows.
    pub(crate) fn restricted(&self, policy: ExecutionPolicy) -> Self {
        let mut result = self.clone();

        result.policy = result.policy.max(policy);

        result
    }

    /// A context of a lambda body: the parameters are in scope, and nothing
    /// is evaluated.
    pub(crate) fn with_locals(&self, locals: impl IntoIterator<Item = Local>) -> Self {
        let mut result = self.restricted(ExecutionPolicy::Skip);

        result.locals.extend(locals);

        result
    }

    /// The type members of the subexpression are looked up in.
    #[inline(always)]
    pub(crate) fn ty_of(&self, info: &ObjectInfo) -> Option<TypeMeta> {
        info.ty(self.dynamic)
    }

    /// Evaluates the `node` from the values of its operands, if the policy
    /// allows and all operand values are known.
    ///
    /// Under the [Full](ExecutionPolicy::Full) policy an evaluation failure
    /// is an error of the [Evaluation](ErrorPriority::Evaluation) class;
    /// otherwise the value just stays unknown.
    pub(crate) fn evaluate(
        &self,
        node: &Arc<Node>,
        operands: &[&ObjectInfo],
        declared: Option<TypeMeta>,
    ) -> Step<ObjectInfo> {
        let allowed = match self.policy {
            ExecutionPolicy::Full => true,
            ExecutionPolicy::SideEffectFree => !node.has_side_effects(),
            ExecutionPolicy::Skip => false,
        };

        if !allowed {
            return Ok(ObjectInfo::indeterminate(declared));
        }

        let mut values = Vec::with_capacity(operands.len());

        for operand in operands {
            match &operand.value {
                Some(value) => values.push(value.clone()),
                None => return Ok(ObjectInfo::indeterminate(declared)),
            }
        }

        let root = self.root.value.clone().unwrap_or_default();

        let env = EvalEnv {
            provider: self.provider,
            root: &root,
            variables: &self.config.variables,
            locals: &[],
        };

        match node.apply(&env, values) {
            Ok(value) => Ok(ObjectInfo::known(value, declared)),

            Err(error) if self.policy == ExecutionPolicy::Full => {
                debug!(target: PARSER_LOG, "Evaluation failed at {}: {error}", node.site);

                Err(ParseOutcome::SyntaxError(SyntaxFailure {
                    position: node.site,
                    message: error.to_string(),
                    priority: ErrorPriority::Evaluation,
                    cause: Some(error),
                }))
            }

            Err(_) => Ok(ObjectInfo::indeterminate(declared)),
        }
    }

    pub(crate) fn fields(&self, ty: &TypeMeta) -> Vec<FieldMeta> {
        self.provider.fields(ty, self.config.minimum_access)
    }

    pub(crate) fn methods(&self, ty: &TypeMeta) -> Vec<ExecutableMeta> {
        self.provider
            .executables(ty, ExecutableKind::Method, self.config.minimum_access)
    }

    pub(crate) fn constructors(&self, ty: &TypeMeta) -> Vec<ExecutableMeta> {
        self.provider
            .executables(ty, ExecutableKind::Constructor, self.config.minimum_access)
    }

    /// The type of a member as seen through the `owner` type.
    #[inline(always)]
    pub(crate) fn specialize(&self, declared: &TypeMeta, owner: &TypeMeta) -> TypeMeta {
        self.provider.specialize(declared, owner)
    }

    /// Resolves a simple class name through the imports. More than one
    /// result means the name is ambiguous.
    pub(crate) fn resolve_simple_class(&self, name: &str) -> Vec<TypeMeta> {
        let mut qualified = vec![
            String::from(name),
            format!("{}.{name}", EngineConfig::CORE_PACKAGE),
        ];

        for import in &self.config.imports {
            match import.rsplit_once('.') {
                Some((_, simple)) if simple == name => qualified.push(import.to_string()),
                _ => (),
            }

            qualified.push(format!("{import}.{name}"));
        }

        let mut seen = AHashSet::new();

        qualified
            .into_iter()
            .filter_map(|name| self.provider.resolve_type(&name))
            .filter(|ty| seen.insert(ty.qualified_name()))
            .collect()
    }

    /// Returns true if the `name` is a package with at least one class.
    pub(crate) fn is_package(&self, name: &str) -> bool {
        self.provider
            .packages()
            .iter()
            .any(|package| *package == name)
    }

    /// The innermost lambda parameter with the `name`, and its index.
    pub(crate) fn local(&self, name: &str) -> Option<(usize, &Local)> {
        self.locals
            .iter()
            .enumerate()
            .rev()
            .find(|(_, local)| local.name == name)
    }
}

/// What the caller of a parser accepts.
#[derive(Clone, Debug)]
pub(crate) struct Expectation {
    pub(crate) objects: bool,
    pub(crate) classes: bool,
    pub(crate) packages: bool,

    /// The value types the caller would like to see. They rank completion
    /// candidates and guide lambda parsing.
    pub(crate) types: Vec<TypeMeta>,

    /// If set, a value whose type matches none of the `types` is an error.
    pub(crate) enforce_types: bool,

    /// If set, the input must end right after the result.
    pub(crate) whole_text: bool,
}

impl Expectation {
    /// Any value.
    pub(crate) fn object() -> Self {
        Self {
            objects: true,
            classes: false,
            packages: false,
            types: Vec::new(),
            enforce_types: false,
            whole_text: false,
        }
    }

    /// A value, preferably of one of the `types`.
    pub(crate) fn hinted(types: Vec<TypeMeta>) -> Self {
        Self {
            types,
            ..Self::object()
        }
    }

    /// A value of the `ty` type.
    pub(crate) fn typed(ty: TypeMeta) -> Self {
        Self {
            types: vec![ty],
            enforce_types: true,
            ..Self::object()
        }
    }

    /// A class name.
    pub(crate) fn class() -> Self {
        Self {
            objects: false,
            classes: true,
            ..Self::object()
        }
    }

    /// A class name, a package name, or a value.
    pub(crate) fn anything() -> Self {
        Self {
            classes: true,
            packages: true,
            ..Self::object()
        }
    }

    pub(crate) fn whole(mut self) -> Self {
        self.whole_text = true;
        self
    }

    /// The same value hints, without the other requirements.
    pub(crate) fn hints(&self) -> Self {
        Self::hinted(self.types.clone())
    }

    /// How well a value of the `actual` type fits the expected types.
    pub(crate) fn rate(&self, actual: Option<&TypeMeta>) -> TypeMatch {
        self.types
            .iter()
            .map(|expected| TypeMatch::rate(actual, Some(expected)))
            .min()
            .unwrap_or(TypeMatch::Full)
    }

    /// Checks a parser's result against the expectation.
    pub(crate) fn check(
        &self,
        ctx: &ParseContext,
        stream: &TokenStream,
        outcome: ParseOutcome,
    ) -> ParseOutcome {
        let failure = |position, message: String| {
            ParseOutcome::SyntaxError(SyntaxFailure {
                position,
                message,
                priority: ErrorPriority::PotentiallyRightParser,
                cause: None,
            })
        };

        match &outcome {
            ParseOutcome::Object(object) => {
                if !self.objects {
                    return failure(
                        object.start,
                        format!("expected a class name, found {}", object.description),
                    );
                }

                let actual = ctx.ty_of(&object.info);

                if self.enforce_types && self.rate(actual.as_ref()) == TypeMatch::None {
                    let expected = self
                        .types
                        .iter()
                        .map(TypeMeta::to_string)
                        .collect::<Vec<_>>()
                        .join(" or ");

                    return ParseOutcome::SyntaxError(SyntaxFailure {
                        position: object.start,
                        message: format!(
                            "incompatible types: expected {expected}, found {}",
                            describe_type(actual.as_ref()),
                        ),
                        priority: ErrorPriority::RightParser,
                        cause: None,
                    });
                }
            }

            ParseOutcome::Class(class) if !self.classes => {
                return failure(
                    class.start,
                    format!("expected an expression, found class {}", class.ty),
                );
            }

            ParseOutcome::Package(package) if !self.packages => {
                let expected = match self.classes {
                    true => "a class name",
                    false => "an expression",
                };

                return failure(
                    package.start,
                    format!("expected {expected}, found package {}", package.name),
                );
            }

            _ => (),
        }

        if !self.whole_text {
            return outcome;
        }

        let Some(end) = outcome.end() else {
            return outcome;
        };

        let mut rest = stream.clone();

        rest.set_position(end);

        match rest.is_at_end() {
            true => outcome,

            false => {
                let position = rest.next_token_start();

                ParseOutcome::SyntaxError(SyntaxFailure {
                    position,
                    message: match rest.peek_char() {
                        Some(ch) => format!("unexpected '{ch}'"),
                        None => String::from("unexpected end of expression"),
                    },
                    priority: ErrorPriority::RightParser,
                    cause: None,
                })
            }
        }
    }
}
