//! Architecture index, component, interface and data structure pages
//!
//! Components are the children of the first `sw_architecture`. Interfaces and
//! data structures are listed globally. Component ↔ interface links come from
//! the interfaces' `provided_by` / `required_by` lists.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::{templates, AssemblyContext, RenderRequest};
use crate::attachments::AttachmentMeta;
use crate::error::Result;
use crate::index::HierarchyIndex;
use crate::layout::{self, CrossRef, PageLocation};
use crate::model::{ComponentFields, InterfaceFields, TypedNode};

#[derive(Debug, Clone, Serialize)]
struct InterfaceSummary {
    label: String,
    doc_path: String,
    direction: Option<String>,
    mode: Option<String>,
    comm_type: Option<String>,
    data_structures: Vec<CrossRef>,
}

#[derive(Debug, Serialize)]
struct ComponentLinks {
    requirements: Vec<CrossRef>,
    provided_interfaces: Vec<InterfaceSummary>,
    required_interfaces: Vec<InterfaceSummary>,
    data_structures: Vec<CrossRef>,
}

#[derive(Debug, Serialize)]
struct ComponentRow {
    label: String,
    slug: String,
    description: Option<String>,
    doc_path: String,
    #[serde(flatten)]
    links: ComponentLinks,
}

#[derive(Debug, Serialize)]
struct PageRow {
    label: String,
    slug: String,
    doc_path: String,
}

#[derive(Debug, Serialize)]
struct IndexPage {
    title: String,
    description: Option<String>,
    components: Vec<ComponentRow>,
    interfaces_all: Vec<PageRow>,
    data_structures_all: Vec<PageRow>,
    attachments: Vec<AttachmentMeta>,
}

#[derive(Debug, Serialize)]
struct ComponentPage {
    title: String,
    description: Option<String>,
    #[serde(flatten)]
    links: ComponentLinks,
}

#[derive(Debug, Serialize)]
struct InterfacePage {
    title: String,
    description: Option<String>,
    direction: Option<String>,
    mode: Option<String>,
    comm_type: Option<String>,
    provided_by: Vec<CrossRef>,
    required_by: Vec<CrossRef>,
    data_structures: Vec<CrossRef>,
    requirements: Vec<CrossRef>,
}

#[derive(Debug, Serialize)]
struct FieldRow {
    name: Option<String>,
    data_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct DataStructurePage {
    title: String,
    description: Option<String>,
    fields: Vec<FieldRow>,
}

fn page_rows(index: &HierarchyIndex, ids: impl Iterator<Item = String>, from: &PageLocation) -> Vec<PageRow> {
    ids.filter_map(|id| index.get(&id))
        .map(|entry| PageRow {
            label: entry.label.clone(),
            slug: entry.slug.clone(),
            doc_path: from.link_to(&entry.doc_path),
        })
        .collect()
}

fn interface_summary(
    ctx: &AssemblyContext<'_>,
    iface: &TypedNode<InterfaceFields>,
    from: &PageLocation,
) -> InterfaceSummary {
    let fields = &iface.fields;
    let doc_path = ctx
        .indexes
        .interfaces
        .get(iface.id())
        .map(|entry| from.link_to(&entry.doc_path))
        .unwrap_or_default();
    InterfaceSummary {
        label: ctx.catalog.interfaces.label_of(iface),
        doc_path,
        direction: fields.data_direction.clone(),
        mode: fields.communication.mode.clone(),
        comm_type: fields.communication.comm_type.clone(),
        data_structures: ctx.resolver().resolve_entity_refs(
            &fields.sw_data_structures,
            &ctx.indexes.data_structures,
            from,
        ),
    }
}

fn component_links(
    ctx: &AssemblyContext<'_>,
    component: &TypedNode<ComponentFields>,
    from: &PageLocation,
) -> ComponentLinks {
    let id = component.id();
    let mut provided = Vec::new();
    let mut required = Vec::new();
    let mut related: BTreeMap<String, CrossRef> = BTreeMap::new();

    for iface in ctx.catalog.interfaces.iter() {
        let provides = iface.fields.is_provided_by(id);
        let requires = iface.fields.is_required_by(id);
        if !provides && !requires {
            continue;
        }
        let summary = interface_summary(ctx, iface, from);
        for ds in &summary.data_structures {
            related.entry(ds.label.clone()).or_insert_with(|| ds.clone());
        }
        if provides {
            provided.push(summary.clone());
        }
        if requires {
            required.push(summary);
        }
    }

    ComponentLinks {
        requirements: ctx.resolver().resolve_entity_refs(
            &component.fields.sw_requirements,
            &ctx.indexes.requirements,
            from,
        ),
        provided_interfaces: provided,
        required_interfaces: required,
        data_structures: related.into_values().collect(),
    }
}

pub fn assemble(ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
    let catalog = ctx.catalog;
    let indexes = ctx.indexes;
    let arch = catalog.root(&catalog.architectures)?;
    let index_page = PageLocation::new(layout::ARCHITECTURE_INDEX);
    let mut requests = Vec::new();

    let attachments = arch
        .fields
        .attachments
        .iter()
        .filter_map(|id| match catalog.attachments.get(id) {
            Ok(att) => Some(att),
            Err(e) => {
                debug!("skipping architecture attachment: {}", e);
                None
            }
        });
    let attachments = ctx
        .attachments
        .materialize_all(attachments, layout::STATIC_ATTACHMENTS, &index_page);

    let mut components = Vec::new();
    for component in catalog.children(&catalog.components, &catalog.architectures, arch.id()) {
        let Some(entry) = indexes.components.get(component.id()) else {
            continue;
        };
        let page = PageLocation::new(entry.doc_path.clone());
        requests.push(RenderRequest::page(
            templates::COMPONENT,
            &ComponentPage {
                title: entry.label.clone(),
                description: component.fields.description.clone(),
                links: component_links(ctx, component, &page),
            },
            &page,
        )?);
        components.push(ComponentRow {
            label: entry.label.clone(),
            slug: entry.slug.clone(),
            description: component.fields.description.clone(),
            doc_path: index_page.link_to(&entry.doc_path),
            links: component_links(ctx, component, &index_page),
        });
    }

    let resolver = ctx.resolver();
    for iface in catalog.interfaces.iter() {
        let Some(entry) = indexes.interfaces.get(iface.id()) else {
            continue;
        };
        let page = PageLocation::new(entry.doc_path.clone());
        let fields = &iface.fields;
        requests.push(RenderRequest::page(
            templates::INTERFACE,
            &InterfacePage {
                title: entry.label.clone(),
                description: fields.description.clone(),
                direction: fields.data_direction.clone(),
                mode: fields.communication.mode.clone(),
                comm_type: fields.communication.comm_type.clone(),
                provided_by: resolver.resolve_entity_refs_or_raw(
                    &fields.provided_by,
                    &indexes.components,
                    &page,
                ),
                required_by: resolver.resolve_entity_refs_or_raw(
                    &fields.required_by,
                    &indexes.components,
                    &page,
                ),
                data_structures: resolver.resolve_entity_refs(
                    &fields.sw_data_structures,
                    &indexes.data_structures,
                    &page,
                ),
                requirements: resolver.resolve_entity_refs(
                    &fields.sw_requirements,
                    &indexes.requirements,
                    &page,
                ),
            },
            &page,
        )?);
    }

    for ds in catalog.data_structures.iter() {
        let Some(entry) = indexes.data_structures.get(ds.id()) else {
            continue;
        };
        let fields = ds
            .fields
            .fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                data_type: f.data_type.clone(),
            })
            .collect();
        requests.push(RenderRequest::page(
            templates::DATA_STRUCTURE,
            &DataStructurePage {
                title: entry.label.clone(),
                description: ds.fields.description.clone(),
                fields,
            },
            &PageLocation::new(entry.doc_path.clone()),
        )?);
    }

    let interface_ids = catalog.interfaces.iter().map(|i| i.id().to_string());
    let data_structure_ids = catalog.data_structures.iter().map(|d| d.id().to_string());
    requests.push(RenderRequest::page(
        templates::ARCHITECTURE_INDEX,
        &IndexPage {
            title: catalog.architectures.label_of(arch),
            description: arch.fields.description.clone(),
            components,
            interfaces_all: page_rows(&indexes.interfaces, interface_ids, &index_page),
            data_structures_all: page_rows(&indexes.data_structures, data_structure_ids, &index_page),
            attachments,
        },
        &index_page,
    )?);

    Ok(requests)
}
