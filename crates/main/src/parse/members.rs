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

use compact_str::CompactString;
use lady_deirdre::lexis::Site;

use crate::{
    matching::did_you_mean,
    parse::{
        complete::Access,
        context::{Expectation, ParseContext},
        expression::ExpressionParser,
        into_object,
        is_keyword,
        outcome::{
            Ambiguity,
            ClassOutcome,
            Confidence,
            ErrorPriority,
            ObjectOutcome,
            ParseOutcome,
            Step,
            SyntaxFailure,
            Tracker,
        },
        unrecognized,
        Parser,
    },
    rating::{select_executable, ExecutableView, Selection, TypeMatch},
    runtime::{ExecutableMeta, TypeMeta},
    syntax::{CompletionInfo, TokenError, TokenStream},
    tree::{Node, NodeKind, ObjectInfo},
};

/// What a member is looked up in.
#[derive(Clone, Debug)]
pub(crate) enum Target {
    /// The root object, without qualification.
    Root,

    /// A preceding subexpression, followed by `.`.
    Object(ObjectOutcome),

    /// A class name, followed by `.`.
    Class(ClassOutcome),
}

impl Target {
    #[inline(always)]
    fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Consumes the member access dot, and returns the type the member is
    /// looked up in.
    fn enter(
        &self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        tracker: &mut Tracker,
    ) -> Step<(TypeMeta, Access)> {
        let object = match self {
            Self::Root => {
                return match ctx.ty_of(ctx.root) {
                    Some(ty) => Ok((ty, Access::Root)),
                    None => Err(unrecognized(stream)),
                };
            }

            Self::Object(object) => object,

            Self::Class(class) => {
                if !stream.skip_str(".") {
                    return Err(unrecognized(stream));
                }

                tracker.raise(Confidence::PotentiallyRightParser)?;

                return Ok((class.ty.clone(), Access::Static));
            }
        };

        let dot = stream.next_token_start();

        if !stream.skip_str(".") {
            return Err(unrecognized(stream));
        }

        tracker.raise(Confidence::PotentiallyRightParser)?;

        match ctx.ty_of(&object.info) {
            Some(ty) if !ty.is_void() && ty.as_primitive().is_none() => Ok((ty, Access::Instance)),

            Some(ty) => Err(tracker.error(dot, format!("{ty} cannot be dereferenced"))),

            None => Err(tracker.error(dot, "null cannot be dereferenced")),
        }
    }

    /// The receiver node of a member, and the receiver's part of the
    /// member node's operands.
    fn receiver(
        &self,
        ctx: &ParseContext,
        is_static: bool,
        site: Site,
    ) -> (Option<Arc<Node>>, Vec<ObjectInfo>) {
        if is_static {
            return (None, Vec::new());
        }

        match self {
            Self::Root => (
                Some(Node::new(NodeKind::This, site)),
                vec![ctx.root.clone()],
            ),

            Self::Object(object) => (Some(object.node.clone()), vec![object.info.clone()]),

            Self::Class(_) => (None, Vec::new()),
        }
    }

    fn start(&self, name_start: Site) -> Site {
        match self {
            Self::Root => name_start,
            Self::Object(object) => object.start,
            Self::Class(class) => class.start,
        }
    }
}

/// The outcome of [resolve_name].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum NameResolution<'k> {
    Found(&'k str),
    Ambiguous(Vec<&'k str>),
    Missing,
}

/// Looks up the typed `name` among the `known` names: an exact match wins,
/// otherwise a single case-insensitive match does.
pub(crate) fn resolve_name<'k>(
    name: &str,
    known: impl IntoIterator<Item = &'k str>,
) -> NameResolution<'k> {
    let mut folded = Vec::new();

    for candidate in known {
        if candidate == name {
            return NameResolution::Found(candidate);
        }

        if candidate.eq_ignore_ascii_case(name) && !folded.contains(&candidate) {
            folded.push(candidate);
        }
    }

    match folded.len() {
        0 => NameResolution::Missing,
        1 => NameResolution::Found(folded[0]),
        _ => NameResolution::Ambiguous(folded),
    }
}

/// The error for a name nothing in the scope is called by.
///
/// The field, method and variable parsers report the same message for the
/// same name, so the merged error mentions it once.
fn unresolved(
    ctx: &ParseContext,
    tracker: &Tracker,
    before: &TokenStream,
    name: &str,
    scope: Option<&TypeMeta>,
    root: bool,
) -> ParseOutcome {
    let mut known = Vec::<CompactString>::new();

    if let Some(scope) = scope {
        known.extend(ctx.fields(scope).into_iter().map(|field| field.name));
        known.extend(ctx.methods(scope).into_iter().map(|method| method.name));
    }

    if root {
        known.extend(
            ctx.config
                .variables
                .snapshot()
                .into_iter()
                .map(|variable| variable.name),
        );
        known.extend(ctx.locals.iter().map(|local| local.name.clone()));
    }

    let position = before.next_token_start();

    match did_you_mean(name, known.iter().map(CompactString::as_str)) {
        Some(hint) => ParseOutcome::SyntaxError(SyntaxFailure {
            position,
            message: format!("cannot resolve symbol '{name}', did you mean '{hint}'?"),
            priority: ErrorPriority::from(tracker.confidence())
                .max(ErrorPriority::PotentiallyRightParser),
            cause: None,
        }),

        None if root => unrecognized(before),

        None => tracker.error(position, format!("cannot resolve symbol '{name}'")),
    }
}

/// Reads a member name, or collects the completion candidates of the
/// member kind.
fn read_name(
    ctx: &ParseContext,
    tracker: &Tracker,
    stream: &mut TokenStream,
    root: bool,
    complete: impl FnOnce(CompletionInfo) -> ParseOutcome,
) -> Step<String> {
    let before = stream.clone();

    match stream.read_identifier() {
        Ok(name) if root && is_keyword(&name) => Err(unrecognized(&before)),
        Ok(name) => Ok(name),
        Err(TokenError::Completion(info)) => Err(complete(info)),
        Err(_) if root => Err(unrecognized(&before)),
        Err(error) => Err(ctx.interrupt(tracker, error)),
    }
}

/// `name`, `object.name` or `Class.name`.
pub(crate) struct FieldParser {
    target: Target,
    tracker: Tracker,
}

impl FieldParser {
    #[inline(always)]
    pub(crate) fn new(target: Target) -> Self {
        Self {
            target,
            tracker: Tracker::default(),
        }
    }
}

impl Parser for FieldParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let (ty, access) = self.target.enter(ctx, stream, &mut self.tracker)?;
        let root = self.target.is_root();
        let before = stream.clone();
        let name_start = stream.next_token_start();

        let name = read_name(ctx, &self.tracker, stream, root, |info| {
            ctx.complete(info, expectation).fields(&ty, access).finish()
        })?;

        if stream.peek_char() == Some('(') || stream.peek_str("->") {
            return Err(unrecognized(&before));
        }

        let fields = ctx.fields(&ty);

        let found = match resolve_name(&name, fields.iter().map(|field| field.name.as_str())) {
            NameResolution::Found(found) => vec![found],
            NameResolution::Ambiguous(names) => names,
            NameResolution::Missing => {
                return Err(unresolved(ctx, &self.tracker, &before, &name, Some(&ty), root));
            }
        };

        let mut candidates = fields
            .iter()
            .filter(|field| found.contains(&field.name.as_str()))
            .map(|field| {
                let field_ty = ctx.specialize(&field.ty, &ty);
                (expectation.rate(Some(&field_ty)), field)
            })
            .collect::<Vec<_>>();

        let best = candidates
            .iter()
            .map(|(rating, _)| *rating)
            .min()
            .unwrap_or(TypeMatch::None);

        candidates.retain(|(rating, _)| *rating == best);

        let field = match candidates.as_slice() {
            [(_, field)] => (*field).clone(),

            _ => {
                let names = candidates
                    .iter()
                    .map(|(_, field)| field.name.as_str())
                    .collect::<Vec<_>>();

                return Err(ParseOutcome::Ambiguous(Ambiguity {
                    position: name_start,
                    message: format!("ambiguous field reference: {}", names.join(" or ")),
                }));
            }
        };

        if access == Access::Static && !field.is_static {
            self.tracker.raise(Confidence::RightParser)?;

            return Err(self.tracker.error(
                name_start,
                format!(
                    "non-static field '{}' cannot be referenced from a static context",
                    field.name,
                ),
            ));
        }

        let start = self.target.start(name_start);
        let declared = ctx.specialize(&field.ty, &ty);
        let (target, parts) = self.target.receiver(ctx, field.is_static, start);
        let description = format!("field {}", field.name);

        let node = Node::new(NodeKind::Field { target, field }, start);

        let object = ObjectOutcome::produce(
            ctx,
            node,
            parts,
            Some(declared),
            start,
            stream.position(),
            description,
        )?;

        Ok(ParseOutcome::Object(object))
    }
}

/// `name(args)`, `object.name(args)` or `Class.name(args)`.
pub(crate) struct MethodParser {
    target: Target,
    tracker: Tracker,
}

impl MethodParser {
    #[inline(always)]
    pub(crate) fn new(target: Target) -> Self {
        Self {
            target,
            tracker: Tracker::default(),
        }
    }
}

impl Parser for MethodParser {
    fn step(
        mut self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let (ty, access) = self.target.enter(ctx, stream, &mut self.tracker)?;
        let root = self.target.is_root();
        let before = stream.clone();
        let name_start = stream.next_token_start();

        let name = read_name(ctx, &self.tracker, stream, root, |info| {
            ctx.complete(info, expectation).methods(&ty, access).finish()
        })?;

        if stream.peek_char() != Some('(') {
            return Err(unrecognized(&before));
        }

        let methods = ctx.methods(&ty);

        let found = match resolve_name(&name, methods.iter().map(|method| method.name.as_str())) {
            NameResolution::Found(found) => CompactString::from(found),

            NameResolution::Ambiguous(names) => {
                return Err(ParseOutcome::Ambiguous(Ambiguity {
                    position: name_start,
                    message: format!("ambiguous method reference: {}", names.join(" or ")),
                }));
            }

            NameResolution::Missing => {
                return Err(unresolved(ctx, &self.tracker, &before, &name, Some(&ty), root));
            }
        };

        let overloads = methods
            .into_iter()
            .filter(|method| method.name == found)
            .collect::<Vec<_>>();

        self.tracker.raise(Confidence::RightParser)?;

        let views = overloads
            .iter()
            .cloned()
            .flat_map(ExecutableView::of)
            .collect::<Vec<_>>();

        let arguments = parse_arguments(ctx, stream, &self.tracker, &views)?;

        let view = select(ctx, &self.tracker, name_start, &found, overloads, &arguments)?;

        if access == Access::Static && !view.executable.is_static {
            return Err(self.tracker.error(
                name_start,
                format!(
                    "non-static method '{}' cannot be referenced from a static context",
                    view.executable,
                ),
            ));
        }

        let start = self.target.start(name_start);
        let declared = ctx.specialize(&view.executable.output, &ty);
        let (target, mut parts) = self.target.receiver(ctx, view.executable.is_static, start);
        let (arguments, infos) = pack_arguments(ctx, &view, arguments, name_start)?;
        let description = format!("method {}", view.executable);

        parts.extend(infos);

        let node = Node::new(
            NodeKind::Invoke {
                target,
                executable: view.executable,
                arguments,
            },
            start,
        );

        let object = ObjectOutcome::produce(
            ctx,
            node,
            parts,
            Some(declared),
            start,
            stream.position(),
            description,
        )?;

        Ok(ParseOutcome::Object(object))
    }
}

/// A variable, or a lambda parameter.
#[derive(Default)]
pub(crate) struct VariableParser {
    tracker: Tracker,
}

impl Parser for VariableParser {
    fn step(
        self,
        ctx: &ParseContext,
        stream: &mut TokenStream,
        expectation: &Expectation,
    ) -> Step<ParseOutcome> {
        let before = stream.clone();
        let start = stream.next_token_start();

        let name = read_name(ctx, &self.tracker, stream, true, |info| {
            ctx.complete(info, expectation).variables().finish()
        })?;

        if stream.peek_char() == Some('(') || stream.peek_str("->") {
            return Err(unrecognized(&before));
        }

        let end = stream.position();

        if let Some((index, local)) = ctx.local(&name) {
            let description = format!("parameter {}", local.name);
            let declared = local.ty.clone();
            let node = Node::new(NodeKind::Local(index), start);

            let object =
                ObjectOutcome::produce(ctx, node, Vec::new(), Some(declared), start, end, description)?;

            return Ok(ParseOutcome::Object(object));
        }

        let variables = ctx.config.variables.snapshot();

        let variable = match resolve_name(&name, variables.iter().map(|variable| variable.name.as_str()))
        {
            NameResolution::Found(found) => variables.iter().find(|variable| variable.name == found),

            NameResolution::Ambiguous(names) => {
                return Err(ParseOutcome::Ambiguous(Ambiguity {
                    position: start,
                    message: format!("ambiguous variable reference: {}", names.join(" or ")),
                }));
            }

            NameResolution::Missing => None,
        };

        let Some(variable) = variable else {
            let scope = ctx.ty_of(ctx.root);

            return Err(unresolved(ctx, &self.tracker, &before, &name, scope.as_ref(), true));
        };

        let description = format!("variable {}", variable.name);
        let declared = variable.ty();
        let node = Node::new(NodeKind::Variable(variable.name.clone()), start);

        let object =
            ObjectOutcome::produce(ctx, node, Vec::new(), Some(declared), start, end, description)?;

        Ok(ParseOutcome::Object(object))
    }
}

/// Reads a parenthesized argument list. Every argument is parsed with the
/// types the overload `views` expect at its position as hints.
pub(crate) fn parse_arguments(
    ctx: &ParseContext,
    stream: &mut TokenStream,
    tracker: &Tracker,
    views: &[ExecutableView],
) -> Step<Vec<ObjectOutcome>> {
    if let Err(error) = stream.read_one_of(&['(']) {
        return Err(ctx.interrupt(tracker, error));
    }

    let mut arguments = Vec::new();

    if stream.peek_char() == Some(')') && !stream.caret_at_next_token() {
        let _ = stream.skip_str(")");

        return Ok(arguments);
    }

    loop {
        let mut hints = Vec::<TypeMeta>::new();

        for view in views {
            if let Some(param) = view.param(arguments.len()) {
                if !hints.contains(param) {
                    hints.push(param.clone());
                }
            }
        }

        let outcome = ExpressionParser::default().parse(ctx, stream, &Expectation::hinted(hints));
        let argument = into_object(tracker.lift(outcome))?;

        stream.set_position(argument.end);
        arguments.push(argument);

        match stream.read_one_of(&[',', ')']) {
            Ok(',') => continue,
            Ok(_) => return Ok(arguments),
            Err(error) => return Err(ctx.interrupt(tracker, error)),
        }
    }
}

/// Picks the overload that fits the arguments best.
pub(crate) fn select(
    ctx: &ParseContext,
    tracker: &Tracker,
    position: Site,
    name: &str,
    overloads: Vec<ExecutableMeta>,
    arguments: &[ObjectOutcome],
) -> Step<ExecutableView> {
    let types = arguments
        .iter()
        .map(|argument| ctx.ty_of(&argument.info))
        .collect::<Vec<_>>();

    let signature = || {
        types
            .iter()
            .map(|ty| match ty {
                Some(ty) => ty.to_string(),
                None => String::from("null"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    match select_executable(overloads, &types) {
        Selection::Unique(view, _) => Ok(view),

        Selection::Ambiguous(views) => {
            let names = views
                .iter()
                .map(|view| view.executable.to_string())
                .collect::<Vec<_>>();

            Err(ParseOutcome::Ambiguous(Ambiguity {
                position,
                message: format!("ambiguous call {name}({}): {}", signature(), names.join(" or ")),
            }))
        }

        Selection::NoMatch => Err(tracker.error(
            position,
            format!("no suitable overload found for {name}({})", signature()),
        )),
    }
}

/// Converts the arguments into the operand nodes of a call, packing the
/// trailing arguments of a variadic view into an array.
pub(crate) fn pack_arguments(
    ctx: &ParseContext,
    view: &ExecutableView,
    mut arguments: Vec<ObjectOutcome>,
    site: Site,
) -> Step<(Vec<Arc<Node>>, Vec<ObjectInfo>)> {
    let params = &view.executable.params;

    let (array, component) = match (view.variadic, params.last()) {
        (true, Some(array)) => match array.component() {
            Some(component) => (array.clone(), component.clone()),
            None => return Ok(unzip(arguments)),
        },

        _ => return Ok(unzip(arguments)),
    };

    let fixed = params.len().saturating_sub(1).min(arguments.len());
    let trailing = arguments.split_off(fixed);
    let site = trailing.first().map_or(site, |argument| argument.start);
    let (items, infos) = unzip(trailing);

    let node = Node::new(NodeKind::ArrayLiteral { component, items }, site);
    let packed = ctx.evaluate(&node, &infos.iter().collect::<Vec<_>>(), Some(array))?;

    let (mut nodes, mut parts) = unzip(arguments);

    nodes.push(node);
    parts.push(packed);

    Ok((nodes, parts))
}

fn unzip(arguments: Vec<ObjectOutcome>) -> (Vec<Arc<Node>>, Vec<ObjectInfo>) {
    arguments
        .into_iter()
        .map(|argument| (argument.node, argument.info))
        .unzip()
}

#[cfg(test)]
mod tests {
    use crate::parse::members::{resolve_name, NameResolution};

    #[test]
    fn test_name_resolution() {
        let known = ["value", "VALUE", "size", "Name"];

        assert_eq!(resolve_name("value", known), NameResolution::Found("value"));
        assert_eq!(resolve_name("SIZE", known), NameResolution::Found("size"));
        assert_eq!(resolve_name("name", known), NameResolution::Found("Name"));
        assert_eq!(
            resolve_name("Value", known),
            NameResolution::Ambiguous(vec!["value", "VALUE"]),
        );
        assert_eq!(resolve_name("length", known), NameResolution::Missing);
    }
}
