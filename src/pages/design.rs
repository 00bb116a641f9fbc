//! Detailed design: index of the first `sw_design` and one page per unit
//!
//! Unit pages carry the `unit-<slug>` and `dt-<unit>-<type>` anchors that
//! type references elsewhere link to.

use serde::Serialize;
use serde_json::Value;

use super::{templates, AssemblyContext, RenderRequest};
use crate::attachments::AttachmentMeta;
use crate::error::Result;
use crate::index::data_type_anchor;
use crate::layout::{self, CrossRef, PageLocation};
use crate::model::{slugify, EnumValue, TypeSpec, TypedNode, UnitFields};
use crate::resolve::Resolver;

#[derive(Debug, Serialize)]
struct UnitRow {
    label: String,
    slug: String,
    description: Option<String>,
    doc_path: String,
}

#[derive(Debug, Serialize)]
struct IndexPage {
    title: String,
    description: Option<String>,
    units: Vec<UnitRow>,
    attachments: Vec<AttachmentMeta>,
}

/// Resolved type columns shared by attributes, parameters, returns and members
#[derive(Debug, Serialize)]
struct TypeColumns {
    data_type: Option<String>,
    data_type_display: String,
    unit_ref: Option<String>,
}

impl TypeColumns {
    fn resolve(resolver: &Resolver<'_>, spec: &TypeSpec, fallback: &str) -> Self {
        let ty = resolver.resolve_type_ref(spec);
        Self {
            data_type: ty.data_type_label(),
            data_type_display: ty.display_or(fallback),
            unit_ref: ty.unit_label(),
        }
    }

    /// Attributes only show a concrete data type; a unit reference is ignored
    fn data_type_only(resolver: &Resolver<'_>, spec: &TypeSpec) -> Self {
        let spec = TypeSpec {
            data_type: spec.data_type.clone(),
            unit_ref: None,
        };
        Self::resolve(resolver, &spec, "-")
    }
}

#[derive(Debug, Serialize)]
struct AttributeRow {
    label: String,
    description: Option<String>,
    scope: Option<String>,
    #[serde(flatten)]
    ty: TypeColumns,
}

#[derive(Debug, Serialize)]
struct ParameterRow {
    name: Option<String>,
    description: Option<String>,
    #[serde(flatten)]
    ty: TypeColumns,
}

#[derive(Debug, Serialize)]
struct ReturnRow {
    description: Option<String>,
    #[serde(flatten)]
    ty: TypeColumns,
}

#[derive(Debug, Serialize)]
struct MethodRow {
    label: String,
    description: Option<String>,
    scope: Option<String>,
    parameters: Vec<ParameterRow>,
    #[serde(rename = "return")]
    returns: Option<ReturnRow>,
}

#[derive(Debug, Serialize)]
struct MemberRow {
    name: Option<String>,
    #[serde(flatten)]
    ty: TypeColumns,
}

#[derive(Debug, Serialize)]
struct DataTypeRow {
    label: String,
    slug: String,
    anchor: String,
    kind: Option<String>,
    alias_of: Option<String>,
    description: Option<String>,
    fields: Vec<MemberRow>,
    enum_values: Vec<EnumValue>,
    function_pointer_parameters: Option<Value>,
    function_pointer_return: Option<Value>,
}

#[derive(Debug, Serialize)]
struct UnitPage {
    title: String,
    description: Option<String>,
    unit_slug: String,
    attributes: Vec<AttributeRow>,
    methods: Vec<MethodRow>,
    data_types: Vec<DataTypeRow>,
    provided_interfaces: Vec<CrossRef>,
    components_refs: Vec<CrossRef>,
    attachments: Vec<AttachmentMeta>,
}

/// Inserts the blank line RST needs between a colon-terminated line and a
/// nested bullet list
pub fn normalize_description(text: Option<&str>) -> Option<String> {
    text.map(|t| t.replace(":\n  -", ":\n\n  -"))
}

fn unit_page(
    ctx: &AssemblyContext<'_>,
    unit: &TypedNode<UnitFields>,
    slug: &str,
    page: &PageLocation,
) -> UnitPage {
    let catalog = ctx.catalog;
    let resolver = ctx.resolver();
    let id = unit.id();

    let attributes = catalog
        .children(&catalog.attributes, &catalog.units, id)
        .into_iter()
        .map(|a| AttributeRow {
            label: catalog.attributes.label_of(a),
            description: a.fields.description.clone(),
            scope: a.fields.scope.clone(),
            ty: TypeColumns::data_type_only(&resolver, &a.fields.ty),
        })
        .collect();

    let methods = catalog
        .children(&catalog.methods, &catalog.units, id)
        .into_iter()
        .map(|m| MethodRow {
            label: catalog.methods.label_of(m),
            description: m.fields.description.clone(),
            scope: m.fields.scope.clone(),
            parameters: m
                .fields
                .parameters
                .iter()
                .map(|p| ParameterRow {
                    name: p.name.clone(),
                    description: p.description.clone(),
                    ty: TypeColumns::resolve(&resolver, &p.ty, ""),
                })
                .collect(),
            returns: m.fields.returns.as_ref().map(|r| ReturnRow {
                description: r.description.clone(),
                ty: TypeColumns::resolve(&resolver, &r.ty, ""),
            }),
        })
        .collect();

    let data_types = catalog
        .children(&catalog.data_types, &catalog.units, id)
        .into_iter()
        .map(|dt| {
            let label = catalog.data_types.label_of(dt);
            let (dt_slug, anchor) = match ctx.indexes.data_types.get(dt.id()) {
                Some(entry) => (entry.slug.clone(), entry.anchor.clone()),
                None => {
                    let dt_slug = slugify(&label);
                    let anchor = data_type_anchor(slug, &dt_slug);
                    (dt_slug, anchor)
                }
            };
            let fields = &dt.fields;
            DataTypeRow {
                anchor,
                label,
                slug: dt_slug,
                kind: fields.kind.clone(),
                alias_of: fields.alias_of.clone(),
                description: fields.description.clone(),
                fields: fields
                    .fields
                    .iter()
                    .map(|f| MemberRow {
                        name: f.name.clone(),
                        ty: TypeColumns::resolve(&resolver, &f.ty, "-"),
                    })
                    .collect(),
                enum_values: fields.enum_values.clone(),
                function_pointer_parameters: fields.function_pointer_parameters.clone(),
                function_pointer_return: fields.function_pointer_return.clone(),
            }
        })
        .collect();

    let attachments = ctx.attachments.materialize_all(
        catalog.children(&catalog.attachments, &catalog.units, id),
        layout::STATIC_UNIT_ATTACHMENTS,
        page,
    );

    UnitPage {
        title: catalog.units.label_of(unit),
        description: unit.fields.description.clone(),
        unit_slug: slug.to_string(),
        attributes,
        methods,
        data_types,
        provided_interfaces: resolver.resolve_entity_refs(
            &unit.fields.interfaces_provided,
            &ctx.indexes.interfaces,
            page,
        ),
        components_refs: resolver.resolve_entity_refs(
            &unit.fields.sw_component_refs,
            &ctx.indexes.components,
            page,
        ),
        attachments,
    }
}

pub fn assemble(ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
    let catalog = ctx.catalog;
    let design = catalog.root(&catalog.designs)?;
    let index_page = PageLocation::new(layout::DESIGN_INDEX);
    let mut requests = Vec::new();
    let mut units = Vec::new();

    for unit in catalog.children(&catalog.units, &catalog.designs, design.id()) {
        let Some(entry) = ctx.indexes.units.get(unit.id()) else {
            continue;
        };
        let page = PageLocation::new(entry.doc_path.clone());
        requests.push(RenderRequest::page(
            templates::UNIT,
            &unit_page(ctx, unit, &entry.slug, &page),
            &page,
        )?);
        units.push(UnitRow {
            label: entry.label.clone(),
            slug: entry.slug.clone(),
            description: unit.fields.description.clone(),
            doc_path: index_page.link_to(&entry.doc_path),
        });
    }

    let attachments = ctx.attachments.materialize_all(
        catalog.children(&catalog.attachments, &catalog.designs, design.id()),
        layout::STATIC_DESIGN_ATTACHMENTS,
        &index_page,
    );

    requests.push(RenderRequest::page(
        templates::DESIGN_INDEX,
        &IndexPage {
            title: catalog.designs.label_of(design),
            description: normalize_description(design.fields.description.as_deref()),
            units,
            attachments,
        },
        &index_page,
    )?);
    Ok(requests)
}
