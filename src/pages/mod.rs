//! Page assemblers, one per document family
//!
//! Each assembler is a fold over the read-only catalog and indexes that
//! yields render requests. Nothing is written here except copied attachments.

pub mod architecture;
pub mod block_diagram;
pub mod class_diagram;
pub mod design;
pub mod project;
pub mod requirements;
pub mod unit_tests;

use std::path::PathBuf;

use serde::Serialize;

use crate::attachments::Materializer;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::index::Indexes;
use crate::layout::PageLocation;
use crate::resolve::Resolver;

/// Template keys of every page kind
pub mod templates {
    pub const PROJECT_INDEX: &str = "project/index.rst";
    pub const REQUIREMENTS_INDEX: &str = "requirements/index.rst";
    pub const REQUIREMENT_GROUP: &str = "requirements/group.rst";
    pub const REQUIREMENT_ITEM: &str = "requirements/item.rst";
    pub const ARCHITECTURE_INDEX: &str = "architecture/index.rst";
    pub const COMPONENT: &str = "architecture/component.rst";
    pub const INTERFACE: &str = "architecture/interface.rst";
    pub const DATA_STRUCTURE: &str = "architecture/data_structure.rst";
    pub const DESIGN_INDEX: &str = "design/index.rst";
    pub const UNIT: &str = "design/unit.rst";
    pub const UNIT_TESTS_INDEX: &str = "unit_tests/index.rst";
    pub const TEST_STRATEGY: &str = "unit_tests/strategy.rst";
    pub const TEST_PLAN: &str = "unit_tests/plan.rst";
    pub const TEST_CASE: &str = "unit_tests/test_case.rst";
    pub const CLASS_DIAGRAM: &str = "class_diagram.mmd";
    pub const BLOCK_DIAGRAM_PUML: &str = "block_diagram.puml";
    pub const BLOCK_DIAGRAM_MMD: &str = "block_diagram.mmd";

    pub const ALL: [&str; 17] = [
        PROJECT_INDEX,
        REQUIREMENTS_INDEX,
        REQUIREMENT_GROUP,
        REQUIREMENT_ITEM,
        ARCHITECTURE_INDEX,
        COMPONENT,
        INTERFACE,
        DATA_STRUCTURE,
        DESIGN_INDEX,
        UNIT,
        UNIT_TESTS_INDEX,
        TEST_STRATEGY,
        TEST_PLAN,
        TEST_CASE,
        CLASS_DIAGRAM,
        BLOCK_DIAGRAM_PUML,
        BLOCK_DIAGRAM_MMD,
    ];
}

/// One page to render: template key, context and output path relative to
/// the family's output root
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub template: String,
    pub context: serde_json::Value,
    pub output: PathBuf,
}

impl RenderRequest {
    pub fn new(
        template: &str,
        context: &impl Serialize,
        output: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            template: template.to_string(),
            context: serde_json::to_value(context)?,
            output: output.into(),
        })
    }

    /// `.rst` page at `page`
    pub fn page(template: &str, context: &impl Serialize, page: &PageLocation) -> Result<Self> {
        Self::new(template, context, page.output_file("rst"))
    }
}

/// Read-only state shared by the assemblers of one run
#[derive(Clone, Copy)]
pub struct AssemblyContext<'a> {
    pub catalog: &'a Catalog,
    pub indexes: &'a Indexes,
    pub attachments: &'a Materializer,
}

impl<'a> AssemblyContext<'a> {
    pub fn new(catalog: &'a Catalog, indexes: &'a Indexes, attachments: &'a Materializer) -> Self {
        Self {
            catalog,
            indexes,
            attachments,
        }
    }

    pub fn resolver(&self) -> Resolver<'a> {
        Resolver::new(self.indexes)
    }
}
