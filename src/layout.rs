//! Output tree layout and relative cross-references
//!
//! Doc paths are `/`-separated, relative to the output root and carry no
//! extension (`architecture/components/Engine`). A cross-reference is always
//! computed from the folder of the *referencing* page.

use std::path::PathBuf;

use serde::Serialize;

pub const PROJECT_INDEX: &str = "project/index";
pub const REQUIREMENTS_INDEX: &str = "requirements/index";
pub const ARCHITECTURE_INDEX: &str = "architecture/index";
pub const DESIGN_INDEX: &str = "design/index";
pub const UNIT_TESTS_INDEX: &str = "unit_tests/index";

pub const REQUIREMENT_GROUPS: &str = "requirements/groups/{slug}";
pub const REQUIREMENT_ITEMS: &str = "requirements/items/{slug}";
pub const COMPONENTS: &str = "architecture/components/{slug}";
pub const INTERFACES: &str = "architecture/interfaces/{slug}";
pub const DATA_STRUCTURES: &str = "architecture/data_structures/{slug}";
pub const DESIGN_ITEMS: &str = "design/items/{slug}";
pub const TEST_STRATEGIES: &str = "unit_tests/strategies/{slug}";
pub const TEST_PLANS: &str = "unit_tests/plans/{slug}";
pub const TEST_CASES: &str = "unit_tests/cases/{slug}";

pub const STATIC_ATTACHMENTS: &str = "_static/attachments";
pub const STATIC_DESIGN_ATTACHMENTS: &str = "_static/design_attachments";
pub const STATIC_UNIT_ATTACHMENTS: &str = "_static/unit_attachments";
pub const STATIC_TEST_EVIDENCES: &str = "_static/unit_test_evidences";

/// Doc path pattern with a `{slug}` placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocPathTemplate(&'static str);

impl DocPathTemplate {
    pub const fn new(pattern: &'static str) -> Self {
        Self(pattern)
    }

    pub fn expand(&self, slug: &str) -> String {
        self.0.replace("{slug}", slug)
    }
}

/// `{label, doc_path}` pair as seen from one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossRef {
    pub label: String,
    pub doc_path: String,
}

impl CrossRef {
    pub fn new(label: impl Into<String>, doc_path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            doc_path: doc_path.into(),
        }
    }
}

/// Position of a page in the output tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    doc_path: String,
}

impl PageLocation {
    pub fn new(doc_path: impl Into<String>) -> Self {
        Self {
            doc_path: doc_path.into(),
        }
    }

    pub fn doc_path(&self) -> &str {
        &self.doc_path
    }

    fn segments(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    fn folder(&self) -> Vec<&str> {
        let mut segments = Self::segments(&self.doc_path);
        segments.pop();
        segments
    }

    /// Number of folders between the output root and this page
    pub fn depth(&self) -> usize {
        self.folder().len()
    }

    /// `../` chain from this page back to the output root
    pub fn static_prefix(&self) -> String {
        "../".repeat(self.depth())
    }

    /// Relative doc path from this page to `target` (root-relative doc path)
    pub fn link_to(&self, target: &str) -> String {
        let from = self.folder();
        let to = Self::segments(target);
        if to.is_empty() {
            return String::new();
        }
        let common = from
            .iter()
            .zip(&to[..to.len() - 1])
            .take_while(|(a, b)| a == b)
            .count();
        let mut link = "../".repeat(from.len() - common);
        link.push_str(&to[common..].join("/"));
        link
    }

    pub fn cross_ref(&self, label: impl Into<String>, target: &str) -> CrossRef {
        CrossRef::new(label, self.link_to(target))
    }

    /// Output file below the output root (`<doc_path>.<extension>`)
    pub fn output_file(&self, extension: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.doc_path, extension))
    }
}
