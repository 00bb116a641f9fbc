//! Project overview page from the first `v_model` node

use serde::Serialize;

use super::{templates, AssemblyContext, RenderRequest};
use crate::error::Result;
use crate::layout::{self, PageLocation};

#[derive(Debug, Serialize)]
struct ProjectPage {
    title: String,
    description: Option<String>,
    client: Option<String>,
    version: Option<String>,
}

pub fn assemble(ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
    let catalog = ctx.catalog;
    let v_model = catalog.root(&catalog.v_models)?;
    let page = ProjectPage {
        title: catalog.v_models.label_of(v_model),
        description: v_model.fields.description.clone(),
        client: v_model.fields.client.clone(),
        version: v_model.fields.version.clone(),
    };
    Ok(vec![RenderRequest::page(
        templates::PROJECT_INDEX,
        &page,
        &PageLocation::new(layout::PROJECT_INDEX),
    )?])
}
