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

use compact_str::CompactString;

use crate::{
    matching::did_you_mean,
    parse::{
        context::{Expectation, Local, ParseContext},
        expression::ExpressionParser,
        into_object,
        is_keyword,
        members::{FieldParser, MethodParser, Target, VariableParser},
        merge,
        outcome::{Confidence, ObjectOutcome, ParseOutcome, Step, Tracker},
        tail::{class_tail, object_tail},
        types::{CastParser, ConstructorParser, TypeParser},
        unrecognized,
        Parser,
    },
    rating::TypeMatch,
    runtime::{HierarchyNode, TypeMeta, Value},
    syntax::{TokenError, TokenStream},
    tree::{ops::describe_type, Node, NodeKind, ObjectInfo},
};

/// The literal keywords.
const LITERALS: [&str; 4] = ["true", "false", "null", "this"];

/// An operand of the operators: any of the primary forms, followed by
/// member accesses and indexing.
#[derive(Default)]
pub(crate) struct OperandParser {
    tracker: Tracker,
}

impl Parser for OperandParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let hints = expectation.hints();

        let anything = Expectation {
            types: hints.types.clone(),
            ..Expectation::anything()
        };

        let primary = merge(vec![
            LiteralParser::default().parse(ctx, stream, &hints),
            VariableParser::default().parse(ctx, stream, &hints),
            FieldParser::new(Target::Root).parse(ctx, stream, &hints),
            MethodParser::new(Target::Root).parse(ctx, stream, &hints),
            TypeParser::default().parse(ctx, stream, &anything),
            ConstructorParser::default().parse(ctx, stream, &hints),
            CastParser::default().parse(ctx, stream, &hints),
            ParenthesizedParser::default().parse(ctx, stream, &hints),
            LambdaParser::default().parse(ctx, stream, &hints),
            HierarchyParser::default().parse(ctx, stream, &hints),
        ]);

        match primary {
            ParseOutcome::Object(object) => {
                self.tracker.commit(Confidence::PotentiallyRightParser)?;

                object_tail(ctx, stream, &mut self.tracker, object, &hints)
            }

            class @ ParseOutcome::Class(_) => {
                self.tracker.commit(Confidence::PotentiallyRightParser)?;

                class_tail(ctx, stream, &mut self.tracker, class, &hints)
            }

            other => Ok(other),
        }
    }
}

/// A number, a string, a character, or one of the literal keywords.
#[derive(Default)]
struct LiteralParser {
    tracker: Tracker,
}

impl Parser for LiteralParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let before = stream.clone();
        let start = stream.next_token_start();

        let read = match stream.peek_char() {
            Some(ch) if ch.is_ascii_digit() => Some(stream.read_number()),
            Some('"') => Some(stream.read_string_literal().map(Value::from)),
            Some('\'') => Some(stream.read_char_literal().map(Value::Char)),
            _ => None,
        };

        if let Some(read) = read {
            self.tracker.commit(Confidence::RightParser)?;

            let value = match read {
                Ok(value) => value,
                Err(error) => return Err(ctx.interrupt(&self.tracker, error)),
            };

            let description = format!("literal {value}");

            return Ok(ParseOutcome::Object(literal(value, start, stream.position(), description)));
        }

        let name = match stream.read_identifier() {
            Ok(name) => name,
            Err(TokenError::Completion(info)) => {
                return Ok(ctx.complete(info, expectation).keywords(&LITERALS).finish());
            }
            Err(_) => return Err(unrecognized(&before)),
        };

        let end = stream.position();

        let value = match name.as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            "null" => Value::Null,

            "this" => {
                return Ok(ParseOutcome::Object(ObjectOutcome {
                    node: Node::new(NodeKind::This, start),
                    info: ctx.root.clone(),
                    parts: Vec::new(),
                    start,
                    end,
                    description: String::from("this"),
                }));
            }

            _ => return Err(unrecognized(&before)),
        };

        Ok(ParseOutcome::Object(literal(value, start, end, name)))
    }
}

pub(crate) fn literal(value: Value, start: usize, end: usize, description: String) -> ObjectOutcome {
    let ty = value.type_meta();

    ObjectOutcome {
        node: Node::new(NodeKind::Literal(value.clone()), start),
        info: ObjectInfo::known(value, ty),
        parts: Vec::new(),
        start,
        end,
        description,
    }
}

/// `(expression)`.
#[derive(Default)]
struct ParenthesizedParser {
    tracker: Tracker,
}

impl Parser for ParenthesizedParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        if !stream.skip_str("(") {
            return Err(unrecognized(stream));
        }

        self.tracker.commit(Confidence::PotentiallyRightParser)?;

        let outcome = ExpressionParser::default().parse(ctx, stream, &expectation.hints());
        let inner = into_object(self.tracker.lift(outcome))?;

        stream.set_position(inner.end);

        if let Err(error) = stream.read_one_of(&[')']) {
            return Err(ctx.interrupt(&self.tracker, error));
        }

        if stream.peek_str("->") {
            return Err(unrecognized(stream));
        }

        Ok(ParseOutcome::Object(ObjectOutcome {
            end: stream.position(),
            description: format!("({})", inner.description),
            ..inner
        }))
    }
}

/// `x -> body`, `(x, y) -> body` or `() -> body`.
///
/// A lambda takes its type from the expected functional types with the
/// same number of parameters. The body is parsed once per such type, in a
/// scope where the parameters have the types of the function's parameters.
#[derive(Default)]
struct LambdaParser {
    tracker: Tracker,
}

impl Parser for LambdaParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let before = stream.clone();
        let start = stream.next_token_start();

        let Some(params) = read_params(stream) else {
            return Err(unrecognized(&before));
        };

        if !stream.skip_str("->") {
            return Err(unrecognized(&before));
        }

        self.tracker.commit(Confidence::RightParser)?;

        let functions = expectation
            .types
            .iter()
            .filter(|ty| {
                ty.signature()
                    .map_or(false, |signature| signature.params.len() == params.len())
            })
            .collect::<Vec<_>>();

        if functions.is_empty() {
            return Err(self.tracker.error(start, "lambda expression not expected here"));
        }

        let outcomes = functions
            .into_iter()
            .map(|ty| self.body(ctx, stream, &params, ty, start))
            .collect();

        Ok(merge(outcomes))
    }
}

impl LambdaParser {
    fn body(
        &self,
        ctx: &ParseContext,
        stream: &TokenStream,
        params: &[CompactString],
        ty: &TypeMeta,
        start: usize,
    ) -> ParseOutcome {
        let Some(signature) = ty.signature() else {
            return ParseOutcome::InternalError(format!("{ty} is not a functional type"));
        };

        let scope = ctx.with_locals(params.iter().zip(&signature.params).map(|(name, ty)| Local {
            name: name.clone(),
            ty: ty.clone(),
        }));

        let output = &signature.output;

        let body_expectation = match output.is_void() {
            true => Expectation::object(),
            false => Expectation::hinted(vec![output.clone()]),
        };

        let outcome = ExpressionParser::default().parse(&scope, stream, &body_expectation);

        let body = match into_object(self.tracker.lift(outcome)) {
            Ok(body) => body,
            Err(outcome) => return outcome,
        };

        if !output.is_void() {
            let actual = scope.ty_of(&body.info);

            if TypeMatch::rate(actual.as_ref(), Some(output)) == TypeMatch::None {
                return self.tracker.error(
                    body.start,
                    format!(
                        "bad return type in lambda expression: {} cannot be converted to {output}",
                        describe_type(actual.as_ref()),
                    ),
                );
            }
        }

        let node = Node::new(
            NodeKind::Lambda {
                ty: ty.clone(),
                params: params.len(),
                body: body.node,
            },
            start,
        );

        let description = format!("lambda {ty}");

        match ObjectOutcome::produce(
            ctx,
            node,
            Vec::new(),
            Some(ty.clone()),
            start,
            body.end,
            description,
        ) {
            Ok(object) => ParseOutcome::Object(object),
            Err(outcome) => outcome,
        }
    }
}

/// Reads the parameter names of a lambda. Returns None if the input does
/// not look like a parameter list.
fn read_params(stream: &mut TokenStream) -> Option<Vec<CompactString>> {
    let param = |stream: &mut TokenStream| match stream.read_identifier() {
        Ok(name) if !is_keyword(&name) => Some(CompactString::from(name)),
        _ => None,
    };

    if !stream.skip_str("(") {
        return Some(vec![param(stream)?]);
    }

    let mut params = Vec::new();

    if stream.skip_str(")") {
        return Some(params);
    }

    loop {
        params.push(param(stream)?);

        match stream.read_one_of(&[',', ')']) {
            Ok(',') => continue,
            Ok(_) => return Some(params),
            Err(_) => return None,
        }
    }
}

/// `{a#b#c}`: the value of a node of the configured custom hierarchy.
#[derive(Default)]
struct HierarchyParser {
    tracker: Tracker,
}

impl Parser for HierarchyParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let start = stream.next_token_start();

        if !stream.skip_str("{") {
            return Err(unrecognized(stream));
        }

        self.tracker.commit(Confidence::RightParser)?;

        let Some(root) = &ctx.config.hierarchy else {
            return Err(self.tracker.error(start, "no custom hierarchy is configured"));
        };

        let mut node = root;
        let mut path = Vec::new();

        loop {
            let name_start = stream.next_token_start();

            let name = match stream.read_identifier() {
                Ok(name) => name,
                Err(TokenError::Completion(info)) => {
                    return Ok(ctx.complete(info, expectation).hierarchy(node).finish());
                }
                Err(error) => return Err(ctx.interrupt(&self.tracker, error)),
            };

            let Some(child) = node.find(&name) else {
                let hint = did_you_mean(&name, node.children().iter().map(HierarchyNode::name));

                let message = match hint {
                    Some(hint) => format!("unknown node '{name}', did you mean '{hint}'?"),
                    None => format!("unknown node '{name}'"),
                };

                return Err(self.tracker.error(name_start, message));
            };

            node = child;
            path.push(String::from(child.name()));

            match stream.read_one_of(&['#', '}']) {
                Ok('#') => continue,
                Ok(_) => break,
                Err(error) => return Err(ctx.interrupt(&self.tracker, error)),
            }
        }

        let path = path.join("#");

        let Some(value) = node.value() else {
            return Err(self.tracker.error(start, format!("node {{{path}}} has no value")));
        };

        let end = stream.position();

        Ok(ParseOutcome::Object(ObjectOutcome {
            node: Node::new(NodeKind::Literal(value.clone()), start),
            info: ObjectInfo::known(value.clone(), node.ty()),
            parts: Vec::new(),
            start,
            end,
            description: format!("node {{{path}}}"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::{parse::operand::read_params, syntax::TokenStream};

    #[test]
    fn test_lambda_params() {
        let read = |text: &str| {
            let mut stream = TokenStream::new(text, None);

            read_params(&mut stream)
                .map(|params| params.iter().map(ToString::to_string).collect::<Vec<_>>())
        };

        assert_eq!(read("x -> x"), Some(vec![String::from("x")]));
        assert_eq!(
            read("(a, b) -> a"),
            Some(vec![String::from("a"), String::from("b")]),
        );
        assert_eq!(read("() -> 1"), Some(vec![]));
        assert_eq!(read("(a + b)"), None);
        assert_eq!(read("null -> 1"), None);
        assert_eq!(read("1 -> 1"), None);
    }
}
