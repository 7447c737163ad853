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

use crate::{
    runtime::{
        ArrayValue,
        ClassMeta,
        ClassSchema,
        HierarchyNode,
        InvocationError,
        InvocationResult,
        Primitive,
        Record,
        SchemaProvider,
        TypeMeta,
        Value,
    },
    EngineConfig,
    ExpressionEngine,
};

pub(crate) fn person_type() -> TypeMeta {
    ClassMeta::new("demo.Person").into_type()
}

pub(crate) fn counter_type() -> TypeMeta {
    ClassMeta::new("demo.Counter").into_type()
}

pub(crate) fn box_type() -> TypeMeta {
    ClassMeta::new("demo.Box").into_type()
}

pub(crate) fn int_function_type() -> TypeMeta {
    let int = TypeMeta::primitive(Primitive::Int);

    ClassMeta::new("demo.IntFunction")
        .functional(vec![int.clone()], int)
        .into_type()
}

pub(crate) fn person(name: &str, age: i32) -> Value {
    let tags = ArrayValue::new(TypeMeta::string(), vec![Value::from("a"), Value::from("b")]);

    Record::new(person_type())
        .with("name", name)
        .with("age", age)
        .with("id", 1)
        .with("friend", Value::Null)
        .with("tags", Value::Array(tags))
        .into_value()
}

pub(crate) fn counter() -> Value {
    Record::new(counter_type()).with("count", 0).into_value()
}

pub(crate) fn boxed(value: i32) -> Value {
    Record::new(box_type())
        .with("value", value)
        .with("VALUE", value * 10)
        .into_value()
}

pub(crate) fn provider() -> SchemaProvider {
    let int = TypeMeta::primitive(Primitive::Int);
    let string = TypeMeta::string();
    let person = person_type();

    SchemaProvider::new()
        .with(
            ClassSchema::new(person.clone())
                .field("name", string.clone())
                .field("age", int.clone())
                .final_field("id", int.clone())
                .field("friend", person.clone())
                .field("tags", TypeMeta::array(string.clone()))
                .constant("MAX_AGE", int.clone(), 150)
                .method("getName", vec![], string.clone(), |this, _| field(this, "name"))
                .method(
                    "greet",
                    vec![string.clone()],
                    string.clone(),
                    |this, arguments| {
                        Ok(Value::from(format!(
                            "Hello, {}! I am {}.",
                            arguments[0],
                            field(this, "name")?,
                        )))
                    },
                )
                .method(
                    "apply",
                    vec![int_function_type(), int.clone()],
                    int.clone(),
                    |_, arguments| match &arguments[0] {
                        Value::Function(function) => function.call(&arguments[1..]),
                        _ => Err(InvocationError::failed("function expected")),
                    },
                )
                .variadic_method(
                    "sum",
                    vec![TypeMeta::array(int.clone())],
                    int.clone(),
                    |_, arguments| {
                        let Value::Array(items) = &arguments[0] else {
                            return Err(InvocationError::failed("array expected"));
                        };

                        let sum = items
                            .to_vec()
                            .iter()
                            .filter_map(Value::as_i64)
                            .sum::<i64>();

                        Ok(Value::Int(sum as i32))
                    },
                )
                .method("fail", vec![], int.clone(), |_, _| {
                    Err(InvocationError::failed("boom"))
                })
                .constructor(vec![string.clone(), int.clone()], {
                    let person = person.clone();

                    move |_, arguments| {
                        Ok(Record::new(person.clone())
                            .with("name", arguments[0].clone())
                            .with("age", arguments[1].clone())
                            .with("id", 0)
                            .with("friend", Value::Null)
                            .with("tags", Value::Array(ArrayValue::new(TypeMeta::string(), vec![])))
                            .into_value())
                    }
                }),
        )
        .with(
            ClassSchema::new(counter_type())
                .field("count", int.clone())
                .method("increment", vec![], int.clone(), |this, _| {
                    let Some(record) = this.downcast::<Record>() else {
                        return Err(InvocationError::failed("counter expected"));
                    };

                    let count = record.get("count").and_then(|count| count.as_i64()).unwrap_or(0) + 1;

                    record.set("count", Value::Int(count as i32));

                    Ok(Value::Int(count as i32))
                }),
        )
        .with(
            ClassSchema::new(box_type())
                .field("value", int.clone())
                .field("VALUE", int),
        )
        .with(ClassSchema::new(int_function_type()))
}

pub(crate) fn config() -> EngineConfig {
    let mut config = EngineConfig::new();

    config.imports.push("demo".into());
    config.variables.define("limit", 10);
    config.variables.define_final("answer", 42);

    config.hierarchy = Some(
        HierarchyNode::new("root")
            .child(
                HierarchyNode::new("numbers")
                    .child(HierarchyNode::leaf("pi", 3.14))
                    .child(HierarchyNode::leaf("e", 2.72)),
            )
            .child(HierarchyNode::new("strings").child(HierarchyNode::leaf("greeting", "hello"))),
    );

    config
}

pub(crate) fn engine() -> ExpressionEngine {
    ExpressionEngine::with_config(Arc::new(provider()), config())
}

fn field(this: &Value, name: &str) -> InvocationResult<Value> {
    this.downcast::<Record>()
        .and_then(|record| record.get(name))
        .ok_or_else(|| InvocationError::failed(format!("no field '{name}'")))
}
