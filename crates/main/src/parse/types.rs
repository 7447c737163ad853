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

use lady_deirdre::lexis::Site;

use crate::{
    parse::{
        context::{Expectation, ParseContext},
        expression::{parse_unary, ExpressionParser},
        into_object,
        is_keyword,
        members::{pack_arguments, parse_arguments, select},
        outcome::{
            Ambiguity,
            ClassOutcome,
            Confidence,
            ErrorPriority,
            ObjectOutcome,
            PackageOutcome,
            ParseOutcome,
            Step,
            Tracker,
        },
        unrecognized,
        Parser,
    },
    rating::ExecutableView,
    runtime::{Primitive, TypeMeta},
    syntax::{TokenError, TokenStream},
    tree::{ops::describe_type, Node, NodeKind},
};

const PRIMITIVES: [&str; 8] = [
    "boolean", "char", "byte", "short", "int", "long", "float", "double",
];

/// A class name: simple, imported, or qualified with its package; or a
/// package name.
#[derive(Default)]
pub(crate) struct TypeParser {
    tracker: Tracker,
}

impl Parser for TypeParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let before = stream.clone();
        let start = stream.next_token_start();

        let name = match stream.read_identifier() {
            Ok(name) if !is_keyword(&name) => name,
            Ok(_) => return Err(unrecognized(&before)),
            Err(TokenError::Completion(info)) => {
                return Ok(ctx.complete(info, expectation).classes().finish());
            }
            Err(_) => return Err(unrecognized(&before)),
        };

        let mut current = match resolve_simple(ctx, &name, start)? {
            Some(ty) => ParseOutcome::Class(ClassOutcome {
                ty,
                start,
                end: stream.position(),
            }),

            None if ctx.is_package(&name) => ParseOutcome::Package(PackageOutcome {
                name: name.into(),
                start,
                end: stream.position(),
            }),

            None => return Err(unrecognized(&before)),
        };

        while let ParseOutcome::Package(PackageOutcome { name: package, .. }) = &current {
            if !stream.peek_str(".") {
                break;
            }

            let package = package.clone();

            let _ = stream.skip_str(".");

            self.tracker.raise(Confidence::PotentiallyRightParser)?;

            let member_start = stream.next_token_start();

            let member = match stream.read_identifier() {
                Ok(member) => member,
                Err(TokenError::Completion(info)) => {
                    return Ok(ctx
                        .complete(info, expectation)
                        .package_members(&package)
                        .finish());
                }
                Err(error) => return Err(ctx.interrupt(&self.tracker, error)),
            };

            let qualified = format!("{package}.{member}");

            current = match ctx.provider.resolve_type(&qualified) {
                Some(ty) => ParseOutcome::Class(ClassOutcome {
                    ty,
                    start,
                    end: stream.position(),
                }),

                None if ctx.is_package(&qualified) => ParseOutcome::Package(PackageOutcome {
                    name: qualified.into(),
                    start,
                    end: stream.position(),
                }),

                None => {
                    return Err(self.tracker.error(
                        member_start,
                        format!("cannot resolve symbol '{member}' in package {package}"),
                    ));
                }
            };
        }

        Ok(current)
    }
}

/// Resolves a simple class name through the imports.
fn resolve_simple(ctx: &ParseContext, name: &str, start: Site) -> Step<Option<TypeMeta>> {
    let mut classes = ctx.resolve_simple_class(name);

    match classes.len() {
        0 => Ok(None),
        1 => Ok(classes.pop()),
        _ => {
            let names = classes
                .iter()
                .map(TypeMeta::qualified_name)
                .collect::<Vec<_>>();

            Err(ParseOutcome::Ambiguous(Ambiguity {
                position: start,
                message: format!("ambiguous class name '{name}': {}", names.join(" or ")),
            }))
        }
    }
}

/// Reads a type name where only a type may appear: after `new`,
/// `instanceof`, or inside a cast.
///
/// Primitive type names are accepted if `primitives` is set. Trailing `[]`
/// pairs make array types if `arrays` is set.
pub(crate) fn read_type(
    ctx: &ParseContext,
    stream: &mut TokenStream,
    tracker: &Tracker,
    primitives: bool,
    arrays: bool,
) -> Step<TypeMeta> {
    let start = stream.next_token_start();
    let class_expectation = Expectation::class();

    let name = match stream.read_identifier() {
        Ok(name) => name,
        Err(TokenError::Completion(info)) => {
            let mut sink = ctx.complete(info, &class_expectation);

            if primitives {
                sink = sink.keywords(&PRIMITIVES);
            }

            return Err(sink.classes().finish());
        }
        Err(error) => return Err(ctx.interrupt(tracker, error)),
    };

    let primitive = match primitives {
        true => Primitive::from_name(&name),
        false => None,
    };

    let mut ty = match primitive {
        Some(primitive) => TypeMeta::primitive(primitive),

        None => {
            let mut attempt = stream.clone();

            attempt.set_position(start);

            let outcome = TypeParser::default().parse(ctx, &attempt, &class_expectation);

            match tracker.lift(outcome) {
                ParseOutcome::Class(class) => {
                    stream.set_position(class.end);
                    class.ty
                }

                ParseOutcome::SyntaxError(mut failure) if failure.position == start => {
                    failure.message = format!("cannot resolve class '{name}'");
                    return Err(ParseOutcome::SyntaxError(failure));
                }

                other => return Err(other),
            }
        }
    };

    while arrays {
        let mut attempt = stream.clone();

        if !attempt.skip_str("[") || !attempt.skip_str("]") {
            break;
        }

        *stream = attempt;
        ty = TypeMeta::array(ty);
    }

    Ok(ty)
}

/// `new C(args)`, `new T[n]...[]`, `new T[]{items}`.
#[derive(Default)]
pub(crate) struct ConstructorParser {
    tracker: Tracker,
}

impl Parser for ConstructorParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let before = stream.clone();
        let start = stream.next_token_start();

        match stream.read_keyword("new") {
            Ok(()) => (),
            Err(TokenError::Completion(info)) => {
                return Ok(ctx.complete(info, expectation).keywords(&["new"]).finish());
            }
            Err(_) => return Err(unrecognized(&before)),
        }

        self.tracker.raise(Confidence::PotentiallyRightParser)?;

        let ty = read_type(ctx, stream, &self.tracker, true, false)?;

        self.tracker.raise(Confidence::RightParser)?;

        if stream.peek_str("[") {
            return self.array(ctx, stream, ty, start);
        }

        if ty.as_primitive().is_some() {
            return Err(stream_error(&self.tracker, stream, "'['"));
        }

        if ty.as_class().map_or(false, |class| class.is_interface()) {
            return Err(self.tracker.error(
                start,
                format!("{ty} is abstract; cannot be instantiated"),
            ));
        }

        let constructors = ctx.constructors(&ty);

        let views = constructors
            .iter()
            .cloned()
            .flat_map(ExecutableView::of)
            .collect::<Vec<_>>();

        let arguments = parse_arguments(ctx, stream, &self.tracker, &views)?;
        let name = ty.to_string();
        let view = select(ctx, &self.tracker, start, &name, constructors, &arguments)?;
        let (arguments, parts) = pack_arguments(ctx, &view, arguments, start)?;
        let description = format!("new {}", view.executable);

        let node = Node::new(
            NodeKind::Construct {
                executable: view.executable,
                arguments,
            },
            start,
        );

        let object = ObjectOutcome::produce(
            ctx,
            node,
            parts,
            Some(ty),
            start,
            stream.position(),
            description,
        )?;

        Ok(ParseOutcome::Object(object))
    }
}

impl ConstructorParser {
    fn array(
        &self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        component: TypeMeta,
        start: Site,
    ) -> Step<ParseOutcome> {
        let mut dimensions = Vec::new();
        let mut ty = component;

        loop {
            let mut attempt = stream.clone();

            if !attempt.skip_str("[") {
                break;
            }

            if attempt.skip_str("]") {
                break;
            }

            let _ = stream.skip_str("[");

            let int = TypeMeta::primitive(Primitive::Int);
            let outcome =
                ExpressionParser::default().parse(ctx, stream, &Expectation::typed(int));
            let dimension = into_object(self.tracker.lift(outcome))?;

            stream.set_position(dimension.end);

            if let Err(error) = stream.read_one_of(&[']']) {
                return Err(ctx.interrupt(&self.tracker, error));
            }

            dimensions.push(dimension);
            ty = TypeMeta::array(ty);
        }

        let mut empty = 0;

        while stream.peek_str("[") {
            let mut attempt = stream.clone();

            if !attempt.skip_str("[") || !attempt.skip_str("]") {
                return Err(stream_error(&self.tracker, &attempt, "']'"));
            }

            *stream = attempt;
            ty = TypeMeta::array(ty);
            empty += 1;
        }

        if !dimensions.is_empty() {
            let description = format!("new {ty}");

            let (nodes, parts): (Vec<_>, Vec<_>) = dimensions
                .into_iter()
                .map(|dimension| (dimension.node, dimension.info))
                .unzip();

            let node = Node::new(
                NodeKind::NewArray {
                    ty: ty.clone(),
                    dimensions: nodes,
                },
                start,
            );

            let object = ObjectOutcome::produce(
                ctx,
                node,
                parts,
                Some(ty),
                start,
                stream.position(),
                description,
            )?;

            return Ok(ParseOutcome::Object(object));
        }

        if empty == 0 {
            return Err(stream_error(&self.tracker, stream, "array dimension"));
        }

        let Some(component) = ty.component().cloned() else {
            return Err(stream_error(&self.tracker, stream, "array dimension"));
        };

        if let Err(error) = stream.read_one_of(&['{']) {
            return Err(ctx.interrupt(&self.tracker, error));
        }

        let mut items = Vec::new();

        if !stream.skip_str("}") {
            loop {
                let outcome = ExpressionParser::default().parse(
                    ctx,
                    stream,
                    &Expectation::typed(component.clone()),
                );
                let item = into_object(self.tracker.lift(outcome))?;

                stream.set_position(item.end);
                items.push(item);

                match stream.read_one_of(&[',', '}']) {
                    Ok(',') => continue,
                    Ok(_) => break,
                    Err(error) => return Err(ctx.interrupt(&self.tracker, error)),
                }
            }
        }

        let description = format!("new {ty}{{...}}");

        let (nodes, parts): (Vec<_>, Vec<_>) = items
            .into_iter()
            .map(|item| (item.node, item.info))
            .unzip();

        let node = Node::new(
            NodeKind::ArrayLiteral {
                component,
                items: nodes,
            },
            start,
        );

        let object = ObjectOutcome::produce(
            ctx,
            node,
            parts,
            Some(ty),
            start,
            stream.position(),
            description,
        )?;

        Ok(ParseOutcome::Object(object))
    }
}

/// `(T) operand`.
#[derive(Default)]
pub(crate) struct CastParser {
    tracker: Tracker,
}

impl Parser for CastParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let start = stream.next_token_start();

        if !stream.skip_str("(") {
            return Err(unrecognized(stream));
        }

        let ty = match read_type(ctx, stream, &self.tracker, true, true) {
            Ok(ty) => ty,
            Err(outcome) => return Err(outcome.at_most(ErrorPriority::WrongParser)),
        };

        if !stream.skip_str(")") {
            return Err(stream_error(&self.tracker, stream, "')'"));
        }

        if !starts_cast_operand(stream, &ty) {
            return Err(stream_error(&self.tracker, stream, "cast operand"));
        }

        self.tracker.raise(Confidence::PotentiallyRightParser)?;

        let operand_start = stream.next_token_start();
        let operand = into_object(self.tracker.lift(parse_unary(
            ctx,
            stream,
            &expectation.hints(),
        )))?;

        stream.set_position(operand.end);

        let actual = ctx.ty_of(&operand.info);

        if !castable(actual.as_ref(), &ty) {
            self.tracker.raise(Confidence::RightParser)?;

            return Err(self.tracker.error(
                operand_start,
                format!(
                    "incompatible types: {} cannot be converted to {ty}",
                    describe_type(actual.as_ref()),
                ),
            ));
        }

        let description = format!("cast to {ty}");

        let node = Node::new(
            NodeKind::Cast {
                operand: operand.node,
                ty: ty.clone(),
            },
            start,
        );

        let object = ObjectOutcome::produce(
            ctx,
            node,
            vec![operand.info],
            Some(ty),
            start,
            stream.position(),
            description,
        )?;

        Ok(ParseOutcome::Object(object))
    }
}

/// Tells a cast from a parenthesized expression followed by an operator:
/// after a reference type, a `+` or a `-` continues a binary expression.
fn starts_cast_operand(stream: &TokenStream, ty: &TypeMeta) -> bool {
    match stream.peek_char() {
        None => stream.caret_before_next_token(),
        Some('+') | Some('-') => ty.as_primitive().is_some(),
        Some(ch) => {
            ch.is_ascii_alphanumeric()
                || matches!(ch, '_' | '$' | '(' | '"' | '\'' | '!' | '~' | '{')
        }
    }
}

/// Returns true if a value of the `from` type may be cast to the `to`
/// type. None stands for the `null` literal.
pub(crate) fn castable(from: Option<&TypeMeta>, to: &TypeMeta) -> bool {
    let Some(from) = from else {
        return to.is_reference();
    };

    if from.is_void() || to.is_void() {
        return false;
    }

    match (from.as_primitive(), to.as_primitive()) {
        (Some(from), Some(to)) => from.is_numeric() == to.is_numeric(),

        (Some(from), None) => from.boxed().is_subtype_of(to),

        (None, Some(to)) => match from.unboxed() {
            Some(unboxed) => unboxed == to || unboxed.widens_to(to),
            None => to.boxed().is_subtype_of(from),
        },

        (None, None) => {
            let interface = |ty: &TypeMeta| ty.as_class().map_or(false, |class| class.is_interface());

            from.is_subtype_of(to)
                || to.is_subtype_of(from)
                || (interface(from) && to.as_class().is_some())
                || (interface(to) && from.as_class().is_some())
        }
    }
}

/// Returns true if `instanceof` may test a value of the `operand` type
/// against the `ty` type.
pub(crate) fn instance_testable(operand: Option<&TypeMeta>, ty: &TypeMeta) -> bool {
    if !ty.is_reference() {
        return false;
    }

    match operand {
        None => true,
        Some(operand) => operand.is_reference() && castable(Some(operand), ty),
    }
}

fn stream_error(tracker: &Tracker, stream: &TokenStream, expected: &str) -> ParseOutcome {
    match stream.expected(expected) {
        TokenError::Syntax { position, message } => tracker.error(position, message),
        TokenError::Completion(info) => tracker.error(info.caret, format!("expected {expected}")),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        parse::types::castable,
        runtime::{Primitive, TypeMeta},
    };

    #[test]
    fn test_castability() {
        let int = TypeMeta::primitive(Primitive::Int);
        let double = TypeMeta::primitive(Primitive::Double);
        let boolean = TypeMeta::primitive(Primitive::Boolean);
        let object = TypeMeta::object();
        let string = TypeMeta::string();

        assert!(castable(Some(&double), &int));
        assert!(!castable(Some(&boolean), &int));
        assert!(castable(Some(&object), &string));
        assert!(castable(Some(&string), &object));
        assert!(castable(Some(&int), &Primitive::Int.boxed()));
        assert!(castable(Some(&Primitive::Int.boxed()), &double));
        assert!(castable(Some(&object), &int));
        assert!(!castable(Some(&string), &int));
        assert!(castable(None, &string));
        assert!(!castable(None, &int));
    }
}
