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
    rating::TypeMatch,
    runtime::{ExecutableMeta, TypeMeta},
};

/// One way to call an executable.
///
/// Every executable has a regular view: one argument per parameter. A
/// variadic executable additionally has a variadic view, in which the last
/// (array typed) parameter accepts zero or more individual arguments of the
/// array component type. Both views compete during overload selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutableView {
    pub executable: ExecutableMeta,
    pub variadic: bool,
}

impl ExecutableView {
    /// Returns the views of the executable: the regular one, followed by the
    /// variadic one if the executable is variadic.
    pub fn of(executable: ExecutableMeta) -> Vec<Self> {
        let variadic = executable.variadic && executable.params.last().is_some();

        let mut result = Vec::with_capacity(2);

        if variadic {
            result.push(Self {
                executable: executable.clone(),
                variadic: true,
            });
        }

        result.insert(
            0,
            Self {
                executable,
                variadic: false,
            },
        );

        result
    }

    /// Returns true if the view can take `count` arguments.
    pub fn accepts(&self, count: usize) -> bool {
        let params = self.executable.params.len();

        match self.variadic {
            false => count == params,
            true => count + 1 >= params,
        }
    }

    /// The type the argument at the `index` position is expected to have,
    /// or None if the view takes fewer arguments.
    pub fn param(&self, index: usize) -> Option<&TypeMeta> {
        let params = &self.executable.params;

        if !self.variadic {
            return params.get(index);
        }

        let last = params.len().checked_sub(1)?;

        match index < last {
            true => params.get(index),
            false => params.get(last).and_then(TypeMeta::component),
        }
    }

    /// Rates the argument types against this view: the result is the worst
    /// of the per-argument ratings, or [TypeMatch::None] if the number of
    /// arguments does not fit.
    ///
    /// A missing argument type stands for `null`.
    pub fn rate(&self, arguments: &[Option<TypeMeta>]) -> TypeMatch {
        if !self.accepts(arguments.len()) {
            return TypeMatch::None;
        }

        let mut worst = TypeMatch::Full;

        for (index, argument) in arguments.iter().enumerate() {
            let rating = TypeMatch::rate(argument.as_ref(), self.param(index));

            if rating > worst {
                worst = rating;
            }

            if worst == TypeMatch::None {
                break;
            }
        }

        worst
    }
}

/// The outcome of [select_executable].
#[derive(Clone, Debug)]
pub enum Selection {
    /// A single best view.
    Unique(ExecutableView, TypeMatch),

    /// Several distinct executables share the best rating.
    Ambiguous(Vec<ExecutableView>),

    /// No view accepts the arguments.
    NoMatch,
}

/// Picks the view that best fits the argument types.
///
/// Views are rated by [ExecutableView::rate]. If the best rating belongs
/// to both views of the same executable, the regular view wins. If it
/// belongs to views of different executables, the selection is ambiguous.
pub fn select_executable(
    executables: impl IntoIterator<Item = ExecutableMeta>,
    arguments: &[Option<TypeMeta>],
) -> Selection {
    let mut best = TypeMatch::None;
    let mut winners: Vec<ExecutableView> = Vec::new();

    for executable in executables {
        for view in ExecutableView::of(executable) {
            let rating = view.rate(arguments);

            if rating == TypeMatch::None || rating > best {
                continue;
            }

            if rating < best {
                best = rating;
                winners.clear();
            }

            let duplicate = winners
                .iter()
                .any(|winner| winner.executable == view.executable);

            if !duplicate {
                winners.push(view);
            }
        }
    }

    match winners.len() {
        0 => Selection::NoMatch,
        1 => match winners.pop() {
            Some(view) => Selection::Unique(view, best),
            None => Selection::NoMatch,
        },
        _ => Selection::Ambiguous(winners),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        rating::{select_executable, ExecutableView, Selection, TypeMatch},
        runtime::{AccessLevel, ExecutableKind, ExecutableMeta, Primitive, TypeMeta},
    };

    fn callable(name: &str, params: Vec<TypeMeta>, variadic: bool, slot: usize) -> ExecutableMeta {
        ExecutableMeta {
            name: name.into(),
            kind: ExecutableKind::Method,
            params,
            output: TypeMeta::void(),
            variadic,
            is_static: true,
            declaring: TypeMeta::object(),
            access: AccessLevel::Public,
            slot,
        }
    }

    #[test]
    fn test_worst_argument_rule() {
        let int = TypeMeta::primitive(Primitive::Int);
        let long = TypeMeta::primitive(Primitive::Long);
        let string = TypeMeta::string();

        let view = ExecutableView::of(callable("put", vec![long.clone(), string.clone()], false, 0))
            .remove(0);

        let both = view.rate(&[Some(int.clone()), Some(string.clone())]);
        let first = TypeMatch::rate(Some(&int), Some(&long));

        assert_eq!(first, TypeMatch::PrimitiveConversion);
        assert_eq!(both, first);
        assert_eq!(view.rate(&[Some(int)]), TypeMatch::None);
    }

    #[test]
    fn test_variadic_views() {
        let string = TypeMeta::string();
        let strings = TypeMeta::array(string.clone());
        let join = callable("join", vec![string.clone(), strings.clone()], true, 0);

        let views = ExecutableView::of(join);

        assert_eq!(views.len(), 2);
        assert_eq!(
            views[0].rate(&[Some(string.clone()), Some(strings.clone())]),
            TypeMatch::Full,
        );
        assert_eq!(views[0].rate(&[Some(string.clone())]), TypeMatch::None);
        assert_eq!(views[1].rate(&[Some(string.clone())]), TypeMatch::Full);
        assert_eq!(
            views[1].rate(&[Some(string.clone()), Some(string.clone()), None]),
            TypeMatch::Full,
        );
        assert_eq!(
            views[1].rate(&[Some(string), Some(TypeMeta::primitive(Primitive::Int))]),
            TypeMatch::None,
        );
    }

    #[test]
    fn test_selection() {
        let int = TypeMeta::primitive(Primitive::Int);
        let long = TypeMeta::primitive(Primitive::Long);

        let overloads = vec![
            callable("max", vec![int.clone(), int.clone()], false, 0),
            callable("max", vec![long.clone(), long.clone()], false, 1),
        ];

        match select_executable(overloads.clone(), &[Some(int.clone()), Some(int.clone())]) {
            Selection::Unique(view, TypeMatch::Full) => assert_eq!(view.executable.slot, 0),
            other => panic!("Unexpected selection {other:?}."),
        }

        match select_executable(overloads.clone(), &[Some(int.clone()), Some(long.clone())]) {
            Selection::Unique(view, TypeMatch::PrimitiveConversion) => {
                assert_eq!(view.executable.slot, 1)
            }
            other => panic!("Unexpected selection {other:?}."),
        }

        assert!(matches!(
            select_executable(overloads, &[Some(TypeMeta::string())]),
            Selection::NoMatch,
        ));

        let ambiguous = vec![
            callable("show", vec![TypeMeta::string()], false, 0),
            callable("show", vec![TypeMeta::number()], false, 1),
        ];

        assert!(matches!(
            select_executable(ambiguous, &[None]),
            Selection::Ambiguous(views) if views.len() == 2,
        ));
    }

    #[test]
    fn test_regular_view_preferred() {
        let objects = TypeMeta::array(TypeMeta::object());
        let print = callable("print", vec![objects.clone()], true, 0);

        match select_executable(vec![print], &[Some(objects)]) {
            Selection::Unique(view, TypeMatch::Full) => assert!(!view.variadic),
            other => panic!("Unexpected selection {other:?}."),
        }
    }
}
