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

use crate::runtime::{TypeMeta, Value};

/// A node of a user-supplied tree of named values.
///
/// Expressions reach the tree through the `{a#b#c}` syntax: the path
/// components name the children of the root node, then the children of the
/// child, and so on. A node may carry a value, the result of the expression
/// that ends at this node.
///
/// ```
/// use expr_bar::runtime::{HierarchyNode, Value};
///
/// let root = HierarchyNode::new("")
///     .child(
///         HierarchyNode::new("numbers")
///             .child(HierarchyNode::leaf("pi", 3.14))
///             .child(HierarchyNode::leaf("e", 2.72)),
///     );
///
/// let e = root.find("numbers").and_then(|node| node.find("e"));
///
/// assert!(matches!(e.and_then(HierarchyNode::value), Some(Value::Double(_))));
/// ```
#[derive(Clone, Debug)]
pub struct HierarchyNode {
    name: CompactString,
    value: Option<Value>,
    ty: Option<TypeMeta>,
    children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Creates a node without a value.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            value: None,
            ty: None,
            children: Vec::new(),
        }
    }

    /// Creates a node that carries a value.
    pub fn leaf(name: impl Into<CompactString>, value: impl Into<Value>) -> Self {
        Self::new(name).with_value(value)
    }

    /// Sets the node value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the static type of the node value. By default, the type is
    /// taken from the value.
    pub fn with_type(mut self, ty: TypeMeta) -> Self {
        self.ty = Some(ty);
        self
    }

    /// Adds a child node.
    pub fn child(mut self, child: HierarchyNode) -> Self {
        self.children.push(child);
        self
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The type of the node value, if the node has one.
    pub fn ty(&self) -> Option<TypeMeta> {
        if let Some(ty) = &self.ty {
            return Some(ty.clone());
        }

        let value = self.value.as_ref()?;

        Some(value.type_meta().unwrap_or_else(TypeMeta::object))
    }

    #[inline(always)]
    pub fn children(&self) -> &[HierarchyNode] {
        &self.children
    }

    /// Looks up a child by name. An exact match wins over a case-insensitive
    /// one.
    pub fn find(&self, name: &str) -> Option<&HierarchyNode> {
        self.children
            .iter()
            .find(|child| child.name == name)
            .or_else(|| {
                self.children
                    .iter()
                    .find(|child| child.name.eq_ignore_ascii_case(name))
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{HierarchyNode, Primitive, TypeMeta};

    #[test]
    fn test_lookup() {
        let root = HierarchyNode::new("")
            .child(HierarchyNode::leaf("Pi", 3.14))
            .child(HierarchyNode::leaf("pi", 3.1416))
            .child(HierarchyNode::new("group"));

        assert_eq!(root.find("pi").and_then(|node| node.value()).map(|value| value.to_string()), Some(String::from("3.1416")));
        assert_eq!(root.find("PI").map(HierarchyNode::name), Some("Pi"));
        assert_eq!(root.find("group").and_then(HierarchyNode::ty), None);
        assert_eq!(
            root.find("Pi").and_then(HierarchyNode::ty),
            Some(TypeMeta::primitive(Primitive::Double)),
        );
    }
}
