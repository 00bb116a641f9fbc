//! Requirements index, group pages and requirement pages
//!
//! Requirements are nested under the group whose id equals their `parent`.

use serde::Serialize;

use super::{templates, AssemblyContext, RenderRequest};
use crate::catalog::Collection;
use crate::error::Result;
use crate::index::HierarchyIndex;
use crate::layout::{self, PageLocation};
use crate::model::{RequirementFields, TypedNode};

#[derive(Debug, Serialize)]
struct RequirementRow {
    label: String,
    brief: Option<String>,
    slug: String,
    doc_path: String,
}

#[derive(Debug, Serialize)]
struct GroupRow {
    label: String,
    doc_path: String,
    description: Option<String>,
    requirements: Vec<RequirementRow>,
}

#[derive(Debug, Serialize)]
struct IndexPage {
    groups: Vec<GroupRow>,
}

#[derive(Debug, Serialize)]
struct GroupPage {
    group_label: String,
    description: Option<String>,
    requirements: Vec<RequirementRow>,
}

#[derive(Debug, Serialize)]
struct ItemPage {
    label: String,
    brief: Option<String>,
    details: Option<String>,
    rationale: Option<String>,
    acceptance_criteria: Option<String>,
}

fn rows(
    requirements: &[&TypedNode<RequirementFields>],
    collection: &Collection<RequirementFields>,
    index: &HierarchyIndex,
    from: &PageLocation,
) -> Vec<RequirementRow> {
    requirements
        .iter()
        .filter_map(|r| {
            let entry = index.get(r.id())?;
            Some(RequirementRow {
                label: collection.label_of(r),
                brief: r.fields.brief.clone(),
                slug: entry.slug.clone(),
                doc_path: from.link_to(&entry.doc_path),
            })
        })
        .collect()
}

pub fn assemble(ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
    let catalog = ctx.catalog;
    let groups_index = &ctx.indexes.requirement_groups;
    let items_index = &ctx.indexes.requirements;
    let index_page = PageLocation::new(layout::REQUIREMENTS_INDEX);
    let mut requests = Vec::new();
    let mut groups = Vec::new();

    for group in catalog.requirement_groups.iter() {
        let Some(entry) = groups_index.get(group.id()) else {
            continue;
        };
        let page = PageLocation::new(entry.doc_path.clone());
        let members = catalog.children(&catalog.requirements, &catalog.requirement_groups, group.id());

        requests.push(RenderRequest::page(
            templates::REQUIREMENT_GROUP,
            &GroupPage {
                group_label: entry.label.clone(),
                description: group.fields.description.clone(),
                requirements: rows(&members, &catalog.requirements, items_index, &page),
            },
            &page,
        )?);

        groups.push(GroupRow {
            label: entry.label.clone(),
            doc_path: index_page.link_to(&entry.doc_path),
            description: group.fields.description.clone(),
            requirements: rows(&members, &catalog.requirements, items_index, &index_page),
        });
    }

    for requirement in catalog.requirements.iter() {
        let Some(entry) = items_index.get(requirement.id()) else {
            continue;
        };
        let fields = &requirement.fields;
        requests.push(RenderRequest::page(
            templates::REQUIREMENT_ITEM,
            &ItemPage {
                label: entry.label.clone(),
                brief: fields.brief.clone(),
                details: fields.details.clone(),
                rationale: fields.rationale.clone(),
                acceptance_criteria: fields.acceptance_criteria.clone(),
            },
            &PageLocation::new(entry.doc_path.clone()),
        )?);
    }

    requests.push(RenderRequest::page(
        templates::REQUIREMENTS_INDEX,
        &IndexPage { groups },
        &index_page,
    )?);
    Ok(requests)
}
