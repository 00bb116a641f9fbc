//! PlantUML and Mermaid block diagrams of components and interfaces
//!
//! Interface endpoints are the raw `provided_by` / `required_by` ids; the
//! diagram templates wire them to the component aliases.

use serde::Serialize;

use super::{templates, AssemblyContext, RenderRequest};
use crate::error::Result;

pub const PUML_FILE: &str = "block_diagram.puml";
pub const MMD_FILE: &str = "block_diagram.mmd";

#[derive(Debug, Serialize)]
struct ComponentBlock {
    label: String,
    id: String,
}

#[derive(Debug, Serialize)]
struct InterfaceBlock {
    label: String,
    id: String,
    provided_by: Vec<String>,
    required_by: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BlockDiagram {
    components: Vec<ComponentBlock>,
    interfaces: Vec<InterfaceBlock>,
}

pub fn assemble(ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
    let catalog = ctx.catalog;
    let diagram = BlockDiagram {
        components: catalog
            .components
            .iter()
            .map(|c| ComponentBlock {
                label: catalog.components.label_of(c),
                id: c.id().to_string(),
            })
            .collect(),
        interfaces: catalog
            .interfaces
            .iter()
            .map(|i| InterfaceBlock {
                label: catalog.interfaces.label_of(i),
                id: i.id().to_string(),
                provided_by: i.fields.provided_by.clone(),
                required_by: i.fields.required_by.clone(),
            })
            .collect(),
    };

    Ok(vec![
        RenderRequest::new(templates::BLOCK_DIAGRAM_PUML, &diagram, PUML_FILE)?,
        RenderRequest::new(templates::BLOCK_DIAGRAM_MMD, &diagram, MMD_FILE)?,
    ])
}
