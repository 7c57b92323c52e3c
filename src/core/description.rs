//! # Description Module / 描述模块
//!
//! A `Description` is the full path to a scope: the name of every parent
//! (root first) plus the name of the scope itself. Specs and test cases are
//! identified, logged and filtered by their description.
//!
//! `Description` 是作用域的完整路径：每个父作用域的名称（根在前）以及该作用域自身的名称。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchical, immutable path identifying a spec or test case scope.
/// 标识 spec 或测试用例作用域的不可变层级路径。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Description {
    parents: Vec<String>,
    name: String,
}

impl Description {
    pub fn new<P, S>(parents: P, name: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parents: parents.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }

    /// A root scope with no parents.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            parents: Vec::new(),
            name: name.into(),
        }
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a new description for a child scope. The receiver is left untouched.
    /// 返回子作用域的新描述，接收者保持不变。
    pub fn append(&self, name: impl Into<String>) -> Self {
        let mut parents = self.parents.clone();
        parents.push(self.name.clone());
        Self {
            parents,
            name: name.into(),
        }
    }

    /// True iff every segment of `other` (its parents and its name) appears
    /// somewhere among `self`'s parents.
    ///
    /// This is a containment check, not a prefix check: segment order is
    /// ignored and unrelated extra ancestors are allowed.
    pub fn has_parent(&self, other: &Description) -> bool {
        other
            .segments()
            .all(|segment| self.parents.iter().any(|parent| parent == segment))
    }

    /// Human readable name: every segment joined by a space.
    pub fn full_name(&self) -> String {
        self.segments().collect::<Vec<_>>().join(" ")
    }

    /// Stable identifier: every segment joined by `/`.
    pub fn id(&self) -> String {
        self.segments().collect::<Vec<_>>().join("/")
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.parents
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.name.as_str()))
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_and_id_join_every_segment() {
        let desc = Description::new(["A", "B"], "C");
        assert_eq!(desc.full_name(), "A B C");
        assert_eq!(desc.id(), "A/B/C");
    }

    #[test]
    fn append_pushes_name_into_parents() {
        let desc = Description::new(["A", "B"], "C");
        let child = desc.append("D");

        assert_eq!(child, Description::new(["A", "B", "C"], "D"));
        assert_eq!(desc, Description::new(["A", "B"], "C"));
    }

    #[test]
    fn root_has_no_parents() {
        let root = Description::root("Spec");
        assert!(root.parents().is_empty());
        assert_eq!(root.id(), "Spec");
    }

    #[test]
    fn has_parent_matches_real_ancestor() {
        let spec = Description::root("Spec");
        let test = spec.append("context").append("test");
        assert!(test.has_parent(&spec));
        assert!(test.has_parent(&spec.append("context")));
        assert!(!spec.has_parent(&test));
    }

    #[test]
    fn has_parent_ignores_segment_order() {
        // Containment semantics: reversed ancestors still count.
        let desc = Description::new(["B", "A", "unrelated"], "leaf");
        let other = Description::new(["A"], "B");
        assert!(desc.has_parent(&other));
    }

    #[test]
    fn has_parent_rejects_missing_segment() {
        let desc = Description::new(["A"], "leaf");
        let other = Description::new(["A"], "B");
        assert!(!desc.has_parent(&other));
    }
}
