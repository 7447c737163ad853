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
        context::{Expectation, ParseContext},
        expression::ExpressionParser,
        into_object,
        members::{FieldParser, MethodParser, Target},
        merge,
        outcome::{Confidence, ObjectOutcome, ParseOutcome, Step, Tracker},
        Parser,
    },
    runtime::{Primitive, TypeMeta},
    syntax::TokenStream,
    tree::{ops::describe_type, Node, NodeKind},
};

/// Applies the member accesses and the indexing that follow a value.
pub(crate) fn object_tail(
    ctx: &ParseContext,
    stream: &mut TokenStream,
    tracker: &mut Tracker,
    mut object: ObjectOutcome,
    hints: &Expectation,
) -> Step<ParseOutcome> {
    loop {
        stream.set_position(object.end);

        if stream.peek_str(".") {
            let target = Target::Object(object);

            let outcome = merge(vec![
                FieldParser::new(target.clone()).parse(ctx, stream, hints),
                MethodParser::new(target).parse(ctx, stream, hints),
            ]);

            object = into_object(tracker.lift(outcome))?;

            continue;
        }

        if stream.peek_str("[") {
            object = index(ctx, stream, tracker, object)?;

            continue;
        }

        return Ok(ParseOutcome::Object(object));
    }
}

/// Applies the member accesses that follow a class name.
pub(crate) fn class_tail(
    ctx: &ParseContext,
    stream: &mut TokenStream,
    tracker: &mut Tracker,
    class: ParseOutcome,
    hints: &Expectation,
) -> Step<ParseOutcome> {
    let ParseOutcome::Class(class) = class else {
        return Ok(class);
    };

    stream.set_position(class.end);

    if !stream.peek_str(".") {
        return Ok(ParseOutcome::Class(class));
    }

    let target = Target::Class(class);

    let outcome = merge(vec![
        FieldParser::new(target.clone()).parse(ctx, stream, hints),
        MethodParser::new(target).parse(ctx, stream, hints),
    ]);

    let object = into_object(tracker.lift(outcome))?;

    object_tail(ctx, stream, tracker, object, hints)
}

fn index(
    ctx: &ParseContext,
    stream: &mut TokenStream,
    tracker: &mut Tracker,
    object: ObjectOutcome,
) -> Step<ObjectOutcome> {
    let open = stream.next_token_start();

    let _ = stream.skip_str("[");

    tracker.commit(Confidence::RightParser)?;

    let actual = ctx.ty_of(&object.info);

    let Some(component) = actual.as_ref().and_then(TypeMeta::component).cloned() else {
        return Err(tracker.error(
            open,
            format!("array type expected; found {}", describe_type(actual.as_ref())),
        ));
    };

    let int = TypeMeta::primitive(Primitive::Int);
    let outcome = ExpressionParser::default().parse(ctx, stream, &Expectation::typed(int));
    let index = into_object(tracker.lift(outcome))?;

    stream.set_position(index.end);

    if let Err(error) = stream.read_one_of(&[']']) {
        return Err(ctx.interrupt(tracker, error));
    }

    let start = object.start;
    let description = format!("{}[{}]", object.description, index.description);

    let node = Node::new(
        NodeKind::Index {
            target: object.node,
            index: index.node,
        },
        start,
    );

    ObjectOutcome::produce(
        ctx,
        node,
        vec![object.info, index.info],
        Some(component),
        start,
        stream.position(),
        description,
    )
}
