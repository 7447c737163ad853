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
    sync::Arc,
};

use lady_deirdre::lexis::Site;
use log::{debug, warn};

use crate::{
    analysis::Completions,
    error::{ParseError, ParseErrorKind, ParseResult},
    parse::{
        ErrorPriority,
        ExecutionPolicy,
        Expectation,
        ExpressionParser,
        ObjectOutcome,
        ParseContext,
        ParseOutcome,
        Parser,
    },
    report::system_panic,
    runtime::{InvocationError, TypeMeta, TypeProvider, Value, Variables},
    syntax::TokenStream,
    tree::{EvalEnv, Node, ObjectInfo},
    EngineConfig,
    ENGINE_LOG,
};

/// The entry point of the expression engine.
///
/// The engine parses expressions against an object model described by a
/// [TypeProvider]. It evaluates expressions for a root object
/// ([evaluate](Self::evaluate)), prepares them for repeated evaluation
/// ([compile](Self::compile)), and suggests the token under a caret
/// ([get_completions](Self::get_completions)).
///
/// ```
/// use std::sync::Arc;
///
/// use expr_bar::{runtime::{SchemaProvider, Value}, ExpressionEngine};
///
/// let engine = ExpressionEngine::new(Arc::new(SchemaProvider::new()));
///
/// let value = engine.evaluate("\"abc\".length() * 2", &Value::Null).unwrap();
///
/// assert_eq!(value.as_i64(), Some(6));
/// ```
#[derive(Clone)]
pub struct ExpressionEngine {
    provider: Arc<dyn TypeProvider>,
    config: EngineConfig,
}

impl Debug for ExpressionEngine {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ExpressionEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExpressionEngine {
    /// Creates an engine with the default configuration.
    #[inline(always)]
    pub fn new(provider: Arc<dyn TypeProvider>) -> Self {
        Self::with_config(provider, EngineConfig::new())
    }

    pub fn with_config(provider: Arc<dyn TypeProvider>, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline(always)]
    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    #[inline(always)]
    pub fn provider(&self) -> &Arc<dyn TypeProvider> {
        &self.provider
    }

    /// Suggests the completions of the token under the `caret`.
    ///
    /// The text before the caret is evaluated as far as it can be without
    /// side effects: fields, variables and operators are evaluated, but host
    /// methods and constructors are never invoked, and nothing is assigned.
    ///
    /// Returns an empty result if the caret lies outside of any token that
    /// can be completed. A caret beyond the end of the text is moved to the
    /// end.
    pub fn get_completions(&self, text: &str, caret: Site, root: &Value) -> Completions {
        let caret = caret.min(text.chars().count());
        let root = ObjectInfo::known(root.clone(), root.type_meta());
        let ctx = ParseContext::new(
            &self.provider,
            &self.config,
            ExecutionPolicy::SideEffectFree,
            &root,
        );
        let stream = TokenStream::new(text, Some(caret));

        let outcome = ExpressionParser::default().parse(&ctx, &stream, &Expectation::object());

        let ParseOutcome::Completions(outcome) = outcome else {
            debug!(
                target: ENGINE_LOG,
                "Nothing to complete at {caret}: {}.",
                outcome.description(),
            );

            return Completions::empty(caret);
        };

        let boundary = self.config.completion_boundary;

        let completions = Completions {
            site: caret,
            place: boundary.range(&outcome.info),
            pattern: String::from(boundary.pattern(&outcome.info)),
            items: outcome.candidates,
        }
        .rank(self.config.max_completions);

        debug!(
            target: ENGINE_LOG,
            "{} completion candidates at {caret} for {:?}.",
            completions.len(),
            completions.pattern,
        );

        completions
    }

    /// Parses and evaluates the `text` for the `root` object.
    ///
    /// Member names without a qualifier refer to the members of the `root`
    /// object. Failures of host code are reported as
    /// [Evaluation](ParseErrorKind::Evaluation) errors pointing at the
    /// subexpression that failed.
    pub fn evaluate(&self, text: &str, root: &Value) -> ParseResult<Value> {
        let root = ObjectInfo::known(root.clone(), root.type_meta());
        let ctx = ParseContext::new(&self.provider, &self.config, ExecutionPolicy::Full, &root);

        let object = self.parse_whole(&ctx, text)?;

        match object.info.value {
            Some(value) => {
                debug!(target: ENGINE_LOG, "Evaluated {text:?} to {value}.");

                Ok(value)
            }

            None => Err(ParseError::new(
                object.start,
                format!("{} was not evaluated", object.description),
                ParseErrorKind::Internal,
            )),
        }
    }

    /// Parses the `text` once for the instances of the `context` type.
    ///
    /// The result can be evaluated for any number of instances without
    /// reparsing. Members are looked up in declared types only, because the
    /// parse is not bound to a particular instance.
    pub fn compile(&self, text: &str, context: &TypeMeta) -> ParseResult<CompiledExpression> {
        let root = ObjectInfo::indeterminate(Some(context.clone()));
        let ctx = ParseContext::new(&self.provider, &self.config, ExecutionPolicy::Skip, &root);

        let object = self.parse_whole(&ctx, text)?;

        debug!(
            target: ENGINE_LOG,
            "Compiled {text:?} for {context}: {}.",
            object.description,
        );

        Ok(CompiledExpression {
            node: object.node,
            provider: self.provider.clone(),
            variables: self.config.variables.clone(),
            context: context.clone(),
            ty: object.info.declared,
        })
    }

    fn parse_whole(&self, ctx: &ParseContext, text: &str) -> ParseResult<ObjectOutcome> {
        let stream = TokenStream::new(text, None);
        let expectation = Expectation::object().whole();

        match ExpressionParser::default().parse(ctx, &stream, &expectation) {
            ParseOutcome::Object(object) => Ok(object),
            other => Err(failure(text, other)),
        }
    }
}

/// An expression parsed by [ExpressionEngine::compile].
///
/// Cloning is cheap: the clones share the parsed tree.
#[derive(Clone)]
pub struct CompiledExpression {
    node: Arc<Node>,
    provider: Arc<dyn TypeProvider>,
    variables: Variables,
    context: TypeMeta,
    ty: Option<TypeMeta>,
}

impl Debug for CompiledExpression {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CompiledExpression")
            .field("context", &self.context)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

impl CompiledExpression {
    /// The declared type of the expression's result, or None if the
    /// expression is the `null` literal.
    #[inline(always)]
    pub fn ty(&self) -> Option<&TypeMeta> {
        self.ty.as_ref()
    }

    /// The type the expression was compiled for.
    #[inline(always)]
    pub fn context(&self) -> &TypeMeta {
        &self.context
    }

    /// Evaluates the expression for the `instance` of the context type.
    pub fn evaluate(&self, instance: &Value) -> ParseResult<Value> {
        if let Some(actual) = instance.type_meta() {
            if !actual.is_subtype_of(&self.context) {
                let cause = InvocationError::TypeMismatch {
                    expected: self.context.clone(),
                    actual: Some(actual),
                };

                let mut error =
                    ParseError::new(0, cause.to_string(), ParseErrorKind::Evaluation);

                error.cause = Some(cause);

                return Err(error);
            }
        }

        let env = EvalEnv {
            provider: &self.provider,
            root: instance,
            variables: &self.variables,
            locals: &[],
        };

        self.node.evaluate(&env).map_err(|failure| {
            warn!(
                target: ENGINE_LOG,
                "Compiled expression failed at {}: {}",
                failure.site,
                failure.error,
            );

            ParseError {
                position: failure.site,
                message: failure.error.to_string(),
                kind: ParseErrorKind::Evaluation,
                cause: Some(failure.error),
            }
        })
    }
}

fn failure(text: &str, outcome: ParseOutcome) -> ParseError {
    let error = match outcome {
        ParseOutcome::SyntaxError(failure) => {
            let kind = match failure.priority {
                ErrorPriority::Evaluation => ParseErrorKind::Evaluation,
                _ => ParseErrorKind::Syntax,
            };

            ParseError {
                position: failure.position,
                message: failure.message,
                kind,
                cause: failure.cause,
            }
        }

        ParseOutcome::Ambiguous(ambiguity) => ParseError::new(
            ambiguity.position,
            ambiguity.message,
            ParseErrorKind::Ambiguous,
        ),

        ParseOutcome::InternalError(message) => {
            ParseError::new(0, message, ParseErrorKind::Internal)
        }

        ParseOutcome::Completions(_) => {
            system_panic!("Completion request without a caret in {:?}.", text)
        }

        valid => ParseError::new(
            valid.start().unwrap_or_default(),
            format!("expected an expression, found {}", valid.description()),
            ParseErrorKind::Syntax,
        ),
    };

    match error.kind {
        ParseErrorKind::Evaluation => warn!(target: ENGINE_LOG, "{error}"),
        ParseErrorKind::Internal => warn!(target: ENGINE_LOG, "{error} in {text:?}"),
        _ => debug!(target: ENGINE_LOG, "{error} in {text:?}"),
    }

    error
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        fixtures::{boxed, counter, engine, person, person_type, provider},
        matching::ClassIndex,
        runtime::{InvocationError, Primitive, Record, TypeMeta, Value},
        EvaluationMode,
        ExpressionEngine,
        ParseErrorKind,
    };

    #[test]
    fn test_evaluation_basics() {
        let engine = engine();
        let root = person("Alice", 30);

        let int = |text: &str| engine.evaluate(text, &root).unwrap().as_i64();

        assert_eq!(int("1 + 2 * 3"), Some(7));
        assert_eq!(int("(1 + 2) * 3"), Some(9));
        assert_eq!(int("age + 1"), Some(31));
        assert_eq!(int("name.length()"), Some(5));
        assert_eq!(int("limit * 2"), Some(20));
        assert_eq!(int("Person.MAX_AGE"), Some(150));
        assert_eq!(int("sum(1, 2, 3)"), Some(6));
        assert_eq!(int("new Person(\"Bob\", 3).age"), Some(3));

        let text = |text: &str| engine.evaluate(text, &root).unwrap().to_string();

        assert_eq!(text("getName() + \"!\""), "Alice!");
        assert_eq!(text("\"age: \" + age"), "age: 30");
        assert_eq!(text("tags[1]"), "b");
        assert_eq!(text("greet(\"Bob\")"), "Hello, Bob! I am Alice.");

        let bool = |text: &str| engine.evaluate(text, &root).unwrap().as_bool();

        assert_eq!(bool("friend == null"), Some(true));
        assert_eq!(bool("this instanceof Person"), Some(true));
        assert_eq!(bool("age > 18 && !(name == \"Bob\")"), Some(true));
    }

    #[test]
    fn test_hierarchy() {
        let engine = engine();

        let value = engine.evaluate("{numbers#e}", &Value::Null).unwrap();

        assert_eq!(value.as_f64(), Some(2.72));

        let error = engine.evaluate("{numbers#tau}", &Value::Null).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
        assert!(error.message.contains("tau"));

        let completions = engine.get_completions("{numbers#", 9, &Value::Null);

        assert!(completions.find("pi").is_some());
        assert!(completions.find("e").is_some());
        assert!(completions.find("strings").is_none());
    }

    #[test]
    fn test_ambiguity() {
        let engine = engine();
        let root = boxed(5);

        assert_eq!(engine.evaluate("value", &root).unwrap().as_i64(), Some(5));
        assert_eq!(engine.evaluate("VALUE", &root).unwrap().as_i64(), Some(50));

        let error = engine.evaluate("Value", &root).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Ambiguous);
        assert_eq!(error.position, 0);
    }

    #[test]
    fn test_side_effects() {
        let engine = engine();
        let root = counter();

        let count = |root: &Value| {
            root.downcast::<Record>()
                .and_then(|record| record.get("count"))
                .and_then(|count| count.as_i64())
        };

        let completions = engine.get_completions("increment() + cou", 17, &root);

        assert!(completions.find("count").is_some());
        assert_eq!(count(&root), Some(0));

        let value = engine.evaluate("increment() + increment()", &root).unwrap();

        assert_eq!(value.as_i64(), Some(3));
        assert_eq!(count(&root), Some(2));
    }

    #[test]
    fn test_errors() {
        let engine = engine();
        let root = person("Alice", 30);

        let error = engine.evaluate("1 + fail()", &root).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Evaluation);
        assert_eq!(error.position, 4);
        assert!(matches!(error.cause, Some(InvocationError::Failed { .. })));

        let error = engine.evaluate("name +", &root).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
        assert_eq!(error.position, 6);

        let error = engine.evaluate("nmae", &root).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
        assert_eq!(error.position, 0);
        assert!(error.message.contains("did you mean 'name'"));

        let error = engine.evaluate("age 1", &root).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
        assert_eq!(error.position, 4);
    }

    #[test]
    fn test_compiled_expressions() {
        let engine = engine();

        let compiled = engine.compile("age * 2", &person_type()).unwrap();

        assert_eq!(compiled.ty(), Some(&TypeMeta::primitive(Primitive::Int)));

        assert_eq!(
            compiled.evaluate(&person("Alice", 20)).unwrap().as_i64(),
            Some(40),
        );
        assert_eq!(compiled.evaluate(&person("Bob", 5)).unwrap().as_i64(), Some(10));

        let error = compiled.evaluate(&counter()).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Evaluation);
        assert!(matches!(
            error.cause,
            Some(InvocationError::TypeMismatch { .. }),
        ));

        let compiled = engine.compile("1 + fail()", &person_type()).unwrap();
        let error = compiled.evaluate(&person("Alice", 20)).unwrap_err();

        assert_eq!(error.position, 4);
    }

    #[test]
    fn test_lambdas() {
        let engine = engine();
        let root = person("Alice", 30);

        let value = engine.evaluate("apply(x -> x * x, 7)", &root).unwrap();

        assert_eq!(value.as_i64(), Some(49));

        let value = engine.evaluate("apply(x -> x + age, 1)", &root).unwrap();

        assert_eq!(value.as_i64(), Some(31));
    }

    #[test]
    fn test_member_completions() {
        let engine = engine();
        let root = person("Alice", 30);

        let completions = engine.get_completions("name.", 5, &root);

        assert!(completions.find("length()").is_some());
        assert!(completions.find("charAt(").is_some());

        let completions = engine.get_completions("name.to", 7, &root);

        assert_eq!(completions.place, 5..7);
        assert_eq!(completions.pattern, "to");
        assert!(completions.find("toUpperCase()").is_some());
        assert!(completions.find("length()").is_none());

        let completions = engine.get_completions("ag", 2, &root);

        assert_eq!(completions.items.first().map(|item| item.insertion.as_str()), Some("age"));

        let completions = engine.get_completions("new Per", 7, &root);

        assert!(completions.find("Person").is_some());
    }

    #[test]
    fn test_assignment() {
        let engine = engine();
        let root = person("Alice", 30);

        assert_eq!(engine.evaluate("age = 31", &root).unwrap().as_i64(), Some(31));
        assert_eq!(engine.evaluate("age", &root).unwrap().as_i64(), Some(31));

        let error = engine.evaluate("id = 2", &root).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
        assert!(error.message.contains("final"));

        assert_eq!(
            engine.evaluate("limit = limit + 5", &root).unwrap().as_i64(),
            Some(15),
        );
        assert_eq!(engine.evaluate("limit", &root).unwrap().as_i64(), Some(15));

        assert!(engine.evaluate("answer = 1", &root).is_err());
        assert!(engine.evaluate("age = \"old\"", &root).is_err());
    }

    #[test]
    fn test_evaluation_modes() {
        let mut engine = engine();

        engine
            .config()
            .variables
            .define_typed("obj", TypeMeta::object(), "abc");

        let value = engine.evaluate("obj.length()", &Value::Null).unwrap();

        assert_eq!(value.as_i64(), Some(3));

        engine.config_mut().evaluation_mode = EvaluationMode::StaticTyping;

        let error = engine.evaluate("obj.length()", &Value::Null).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
    }

    #[test]
    fn test_class_index_completions() {
        let plain = engine();
        let mut indexed = engine();

        indexed.config_mut().class_index = Some(Arc::new(ClassIndex::build(&provider())));

        let root = person("Alice", 30);

        for (text, caret) in [
            ("new Per", 7),
            ("new per", 7),
            ("new PeR", 7),
            ("new Personal", 12),
            ("new ", 4),
            ("St", 2),
            ("Person.MA", 6),
        ] {
            let summary = |engine: &ExpressionEngine| {
                let mut items = engine
                    .get_completions(text, caret, &root)
                    .items
                    .into_iter()
                    .map(|item| (item.insertion, item.rating))
                    .collect::<Vec<_>>();

                items.sort();

                items
            };

            assert_eq!(summary(&plain), summary(&indexed), "{text:?} at {caret}");
        }

        let completions = indexed.get_completions("new per", 7, &root);

        assert!(completions.find("Person").is_some());
    }

    #[test]
    fn test_completion_context_evaluation() {
        let engine = engine();
        let root = person("Alice", 30);

        for (text, caret, prefix) in [
            ("name.to", 7, "name"),
            ("name.", 5, "name"),
            ("tags[0].len", 11, "tags[0]"),
            ("getName().ch", 12, "getName()"),
        ] {
            let completions = engine.get_completions(text, caret, &root);

            assert!(!completions.is_empty(), "{text:?} at {caret}");

            let value = engine.evaluate(prefix, &root).unwrap();

            let Some(ty) = value.type_meta() else {
                panic!("{prefix:?} has no runtime type.");
            };

            let mut declaring = ty
                .ancestors()
                .iter()
                .map(TypeMeta::qualified_name)
                .collect::<Vec<_>>();

            declaring.push(TypeMeta::object().qualified_name());

            for item in &completions.items {
                let Some(owner) = &item.declaring else {
                    panic!("{:?} in {text:?} has no declaring type.", item.insertion);
                };

                assert!(
                    declaring.iter().any(|name| name == owner.as_str()),
                    "{:?} in {text:?} is declared in {owner}",
                    item.insertion,
                );
            }
        }

        let completions = engine.get_completions("Person.MA", 9, &root);

        assert!(completions.find("MAX_AGE").is_some());

        for item in &completions.items {
            assert_eq!(item.declaring.as_deref(), Some("demo.Person"));
        }

        let error = engine.evaluate("Person", &root).unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
        assert!(error.message.contains("class"));
    }

    #[test]
    fn test_negative_literals() {
        let engine = engine();
        let root = person("Alice", 30);

        let evaluate = |text: &str| engine.evaluate(text, &root);

        assert!(matches!(evaluate("-2147483648"), Ok(Value::Int(i32::MIN))));
        assert!(matches!(evaluate("-9223372036854775808L"), Ok(Value::Long(i64::MIN))));
        assert!(matches!(evaluate("- 5 * 2"), Ok(Value::Int(-10))));
        assert!(matches!(evaluate("-age"), Ok(Value::Int(-30))));
        assert!(matches!(evaluate("--2147483647"), Ok(Value::Int(2147483647))));

        let error = evaluate("-2147483649").unwrap_err();

        assert_eq!(error.kind, ParseErrorKind::Syntax);
        assert!(error.message.contains("too large"));

        assert!(evaluate("2147483648").is_err());
    }

    #[test]
    fn test_qualified_names() {
        let engine = engine();
        let root = person("Alice", 30);

        assert!(matches!(engine.evaluate("demo.Person.MAX_AGE", &root), Ok(Value::Int(150))));

        let completions = engine.get_completions("demo.Pe", 7, &root);

        assert!(completions.find("Person").is_some());
    }
}
