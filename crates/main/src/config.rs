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

use crate::{
    matching::ClassIndex,
    runtime::{AccessLevel, HierarchyNode, Variables},
    syntax::CompletionBoundary,
};

/// How the engine decides the type of an already evaluated subexpression.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationMode {
    /// Members are looked up in the declared type of a subexpression, the
    /// way a compiler would.
    StaticTyping,

    /// Members are looked up in the runtime type of the subexpression's
    /// value whenever the value is known. For example, a field declared as
    /// `core.Object` that holds a string exposes the string methods.
    #[default]
    DynamicTyping,
}

/// A general configuration object for the [ExpressionEngine](crate::ExpressionEngine).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct EngineConfig {
    /// The default value is [EvaluationMode::DynamicTyping].
    ///
    /// Compiled expressions always use static typing, because they are not
    /// bound to a particular instance.
    pub evaluation_mode: EvaluationMode,

    /// Which part of the token under the caret a completion candidate
    /// replaces.
    pub completion_boundary: CompletionBoundary,

    /// Members with a lower access level are invisible to expressions.
    ///
    /// The default value is [AccessLevel::Public].
    pub minimum_access: AccessLevel,

    /// Imported packages (`a.b`) and classes (`a.b.C`).
    ///
    /// The simple names of imported classes and of the classes of imported
    /// packages resolve without qualification. The `core` package is always
    /// imported.
    pub imports: Vec<CompactString>,

    /// The variables expressions can read and assign.
    pub variables: Variables,

    /// The root of the custom hierarchy, addressed as `{a#b#c}`.
    pub hierarchy: Option<HierarchyNode>,

    /// A prebuilt index of class names. If set, class completions search
    /// the index instead of scanning all imported classes, and also suggest
    /// classes that are not imported (inserting their qualified names).
    pub class_index: Option<Arc<ClassIndex>>,

    /// The maximum number of returned completion candidates.
    ///
    /// The default value is 256.
    pub max_completions: usize,
}

impl Default for EngineConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl EngineConfig {
    /// The package imported implicitly.
    pub const CORE_PACKAGE: &'static str = "core";

    /// The default constructor for this configuration object.
    pub fn new() -> Self {
        Self {
            evaluation_mode: EvaluationMode::DynamicTyping,
            completion_boundary: CompletionBoundary::ReplaceUntilCaret,
            minimum_access: AccessLevel::Public,
            imports: Vec::new(),
            variables: Variables::new(),
            hierarchy: None,
            class_index: None,
            max_completions: 256,
        }
    }

    /// Returns true if the class with the `qualified` name can be referred
    /// to by its simple name.
    pub fn is_imported(&self, qualified: &str) -> bool {
        let package = match qualified.rfind('.') {
            Some(dot) => &qualified[..dot],
            None => return true,
        };

        package == Self::CORE_PACKAGE
            || self
                .imports
                .iter()
                .any(|import| *import == package || *import == qualified)
    }
}

#[cfg(test)]
mod tests {
    use crate::EngineConfig;

    #[test]
    fn test_imports() {
        let mut config = EngineConfig::new();

        config.imports.push("java.util".into());
        config.imports.push("log.Logger".into());

        assert!(config.is_imported("core.String"));
        assert!(config.is_imported("java.util.ArrayList"));
        assert!(!config.is_imported("java.util.concurrent.Future"));
        assert!(config.is_imported("log.Logger"));
        assert!(!config.is_imported("log.Level"));
        assert!(config.is_imported("Standalone"));
    }
}
