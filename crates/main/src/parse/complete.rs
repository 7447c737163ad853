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
use lady_deirdre::lexis::SiteSpan;
use log::trace;

use crate::{
    analysis::{merge_candidate, Candidate, CompletionKind},
    parse::{
        context::{Expectation, ParseContext},
        outcome::{CompletionOutcome, ParseOutcome, Tracker},
    },
    rating::{MatchRating, NameMatch, TypeMatch},
    runtime::{HierarchyNode, TypeMeta},
    syntax::{CompletionInfo, TokenError},
    PARSER_LOG,
};

/// How a member is reached.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Access {
    /// Unqualified, in the scope of the root object.
    Root,

    /// Through a value. Static members are reachable, but discouraged.
    Instance,

    /// Through a class name. Only static members are reachable.
    Static,
}

/// Collects the completion candidates for the token under the caret.
pub(crate) struct CompletionSink<'c, 'a> {
    ctx: &'c ParseContext<'a>,
    expectation: &'c Expectation,
    info: CompletionInfo,
    range: SiteSpan,
    pattern: String,
    candidates: Vec<Candidate>,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn complete<'c>(
        &'c self,
        info: CompletionInfo,
        expectation: &'c Expectation,
    ) -> CompletionSink<'c, 'a> {
        let boundary = self.config.completion_boundary;
        let range = boundary.range(&info);
        let pattern = String::from(boundary.pattern(&info));

        CompletionSink {
            ctx: self,
            expectation,
            info,
            range,
            pattern,
            candidates: Vec::new(),
        }
    }

    /// Converts a token stream interruption into an outcome.
    ///
    /// A completion request turns into the tokenizer's own suggestions, if
    /// any. The parsers that know what an identifier at the caret may refer
    /// to intercept identifier completions before they get here.
    pub(crate) fn interrupt(&self, tracker: &Tracker, error: TokenError) -> ParseOutcome {
        match error {
            TokenError::Completion(info) => {
                let expectation = Expectation::object();

                self.complete(info, &expectation).suggestions().finish()
            }

            TokenError::Syntax { position, message } => tracker.error(position, message),
        }
    }
}

impl<'c, 'a> CompletionSink<'c, 'a> {
    /// The fixed suggestions of the interrupted read.
    pub(crate) fn suggestions(mut self) -> Self {
        let suggestions = self.info.suggestions.clone();

        for suggestion in suggestions {
            self.push(
                CompletionKind::Keyword,
                &suggestion,
                String::from(suggestion.as_str()),
                None,
                TypeMatch::Full,
                false,
                None,
            );
        }

        self
    }

    pub(crate) fn keywords(mut self, keywords: &[&str]) -> Self {
        for keyword in keywords {
            self.push(
                CompletionKind::Keyword,
                keyword,
                String::from(*keyword),
                None,
                TypeMatch::Full,
                false,
                None,
            );
        }

        self
    }

    /// The fields of the `ty` type.
    pub(crate) fn fields(mut self, ty: &TypeMeta, access: Access) -> Self {
        for field in self.ctx.fields(ty) {
            if access == Access::Static && !field.is_static {
                continue;
            }

            let field_ty = self.ctx.specialize(&field.ty, ty);
            let rating = self.expectation.rate(Some(&field_ty));

            self.push(
                CompletionKind::Member,
                &field.name,
                String::from(field.name.as_str()),
                Some(field_ty.to_string()),
                rating,
                access == Access::Instance && field.is_static,
                Some(CompactString::from(field.declaring.qualified_name())),
            );
        }

        self
    }

    /// The methods of the `ty` type. Methods without parameters insert the
    /// whole call, the others insert the opening parenthesis.
    pub(crate) fn methods(mut self, ty: &TypeMeta, access: Access) -> Self {
        for method in self.ctx.methods(ty) {
            if access == Access::Static && !method.is_static {
                continue;
            }

            let output = self.ctx.specialize(&method.output, ty);
            let rating = self.expectation.rate(Some(&output));

            let insertion = match method.params.is_empty() {
                true => format!("{}()", method.name),
                false => format!("{}(", method.name),
            };

            let candidate = Candidate {
                kind: CompletionKind::Callable,
                display: method.to_string(),
                insertion,
                detail: Some(output.to_string()),
                range: self.range.clone(),
                rating: MatchRating::new(
                    NameMatch::rate(&self.pattern, &method.name),
                    rating,
                    access == Access::Instance && method.is_static,
                ),
                declaring: Some(CompactString::from(method.declaring.qualified_name())),
            };

            self.accept(candidate);
        }

        self
    }

    /// The configured variables and the lambda parameters in scope.
    pub(crate) fn variables(mut self) -> Self {
        for variable in self.ctx.config.variables.snapshot() {
            let ty = variable.ty();
            let rating = self.expectation.rate(Some(&ty));

            self.push(
                CompletionKind::Variable,
                &variable.name,
                String::from(variable.name.as_str()),
                Some(ty.to_string()),
                rating,
                false,
                None,
            );
        }

        let locals = self.ctx.locals.clone();

        for local in locals {
            let rating = self.expectation.rate(Some(&local.ty));

            self.push(
                CompletionKind::Variable,
                &local.name,
                String::from(local.name.as_str()),
                Some(local.ty.to_string()),
                rating,
                false,
                None,
            );
        }

        self
    }

    /// The classes reachable by a simple name, and the top-level packages.
    ///
    /// With a class index configured, the index narrows the search down to
    /// the classes whose names can match the pattern at all, and the classes
    /// that are not imported insert their qualified names. The ratings are
    /// the same either way.
    pub(crate) fn classes(mut self) -> Self {
        let qualified = match &self.ctx.config.class_index {
            Some(index) => index
                .candidates(&self.pattern)
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>(),

            None => self
                .ctx
                .provider
                .class_names()
                .into_iter()
                .filter(|name| self.ctx.config.is_imported(name))
                .map(String::from)
                .collect(),
        };

        for name in qualified {
            let simple = simple_name(&name);

            let insertion = match self.ctx.config.is_imported(&name) {
                true => String::from(simple),
                false => name.clone(),
            };

            self.push(
                CompletionKind::Type,
                simple,
                insertion,
                Some(name.clone()),
                TypeMatch::Full,
                false,
                None,
            );
        }

        for package in self.ctx.provider.packages() {
            if package.contains('.') {
                continue;
            }

            self.push(
                CompletionKind::Namespace,
                &package,
                String::from(package.as_str()),
                None,
                TypeMatch::Full,
                false,
                None,
            );
        }

        self
    }

    /// The classes and the subpackages of the `package`.
    pub(crate) fn package_members(mut self, package: &str) -> Self {
        for name in self.ctx.provider.class_names() {
            let Some(simple) = child_of(package, &name) else {
                continue;
            };

            self.push(
                CompletionKind::Type,
                simple,
                String::from(simple),
                Some(String::from(name.as_str())),
                TypeMatch::Full,
                false,
                None,
            );
        }

        for name in self.ctx.provider.packages() {
            let Some(simple) = child_of(package, &name) else {
                continue;
            };

            self.push(
                CompletionKind::Namespace,
                simple,
                String::from(simple),
                None,
                TypeMatch::Full,
                false,
                None,
            );
        }

        self
    }

    /// The children of a custom hierarchy node.
    pub(crate) fn hierarchy(mut self, node: &HierarchyNode) -> Self {
        for child in node.children() {
            let ty = child.ty();

            let rating = match &ty {
                Some(ty) => self.expectation.rate(Some(ty)),
                None => TypeMatch::Full,
            };

            self.push(
                CompletionKind::HIERARCHY,
                child.name(),
                String::from(child.name()),
                ty.map(|ty| ty.to_string()),
                rating,
                false,
                None,
            );
        }

        self
    }

    pub(crate) fn finish(self) -> ParseOutcome {
        trace!(
            target: PARSER_LOG,
            "{} completion candidates for {:?}.",
            self.candidates.len(),
            self.pattern,
        );

        ParseOutcome::Completions(CompletionOutcome {
            info: self.info,
            candidates: self.candidates,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        kind: CompletionKind,
        name: &str,
        insertion: String,
        detail: Option<String>,
        ty: TypeMatch,
        access_discouraged: bool,
        declaring: Option<CompactString>,
    ) {
        let candidate = Candidate {
            kind,
            display: String::from(name),
            insertion,
            detail,
            range: self.range.clone(),
            rating: MatchRating::new(
                NameMatch::rate(&self.pattern, name),
                ty,
                access_discouraged,
            ),
            declaring,
        };

        self.accept(candidate);
    }

    #[inline(always)]
    fn accept(&mut self, candidate: Candidate) {
        if candidate.rating.name == NameMatch::None {
            return;
        }

        merge_candidate(&mut self.candidates, candidate);
    }
}

fn simple_name(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(dot) => &qualified[(dot + 1)..],
        None => qualified,
    }
}

/// The last component of the `name` if the `name` lies directly in the
/// `package`.
fn child_of<'n>(package: &str, name: &'n str) -> Option<&'n str> {
    let rest = name.strip_prefix(package)?.strip_prefix('.')?;

    match rest.contains('.') {
        true => None,
        false => Some(rest),
    }
}

#[cfg(test)]
mod tests {
    use crate::parse::complete::{child_of, simple_name};

    #[test]
    fn test_name_helpers() {
        assert_eq!(simple_name("core.String"), "String");
        assert_eq!(simple_name("Standalone"), "Standalone");
        assert_eq!(child_of("demo", "demo.Person"), Some("Person"));
        assert_eq!(child_of("demo", "demo.inner.Item"), None);
        assert_eq!(child_of("demo", "demonstration.Item"), None);
    }
}
