//! Relationship classification and class cards for diagrams

use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::model::{AttributeFields, MethodFields, RelationshipFields, TypedNode};
use crate::resolve::Resolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Association,
    Dependency,
    Aggregation,
    Composition,
    Realization,
    Generalization,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 6] = [
        RelationshipKind::Association,
        RelationshipKind::Dependency,
        RelationshipKind::Aggregation,
        RelationshipKind::Composition,
        RelationshipKind::Realization,
        RelationshipKind::Generalization,
    ];

    /// Exact discriminator match; anything else is not a relationship kind
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "association" => Some(RelationshipKind::Association),
            "dependency" => Some(RelationshipKind::Dependency),
            "aggregation" => Some(RelationshipKind::Aggregation),
            "composition" => Some(RelationshipKind::Composition),
            "realization" => Some(RelationshipKind::Realization),
            "generalization" => Some(RelationshipKind::Generalization),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Association => "association",
            RelationshipKind::Dependency => "dependency",
            RelationshipKind::Aggregation => "aggregation",
            RelationshipKind::Composition => "composition",
            RelationshipKind::Realization => "realization",
            RelationshipKind::Generalization => "generalization",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketEntry {
    pub id: Option<String>,
    pub origin_multiplicity: String,
    pub target_multiplicity: String,
}

/// Relationship entries grouped by kind, each bucket in encounter order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipBuckets {
    pub associations: Vec<BucketEntry>,
    pub dependencies: Vec<BucketEntry>,
    pub aggregations: Vec<BucketEntry>,
    pub compositions: Vec<BucketEntry>,
    pub realizations: Vec<BucketEntry>,
    pub generalizations: Vec<BucketEntry>,
}

impl RelationshipBuckets {
    pub fn bucket(&self, kind: RelationshipKind) -> &[BucketEntry] {
        match kind {
            RelationshipKind::Association => &self.associations,
            RelationshipKind::Dependency => &self.dependencies,
            RelationshipKind::Aggregation => &self.aggregations,
            RelationshipKind::Composition => &self.compositions,
            RelationshipKind::Realization => &self.realizations,
            RelationshipKind::Generalization => &self.generalizations,
        }
    }

    fn bucket_mut(&mut self, kind: RelationshipKind) -> &mut Vec<BucketEntry> {
        match kind {
            RelationshipKind::Association => &mut self.associations,
            RelationshipKind::Dependency => &mut self.dependencies,
            RelationshipKind::Aggregation => &mut self.aggregations,
            RelationshipKind::Composition => &mut self.compositions,
            RelationshipKind::Realization => &mut self.realizations,
            RelationshipKind::Generalization => &mut self.generalizations,
        }
    }

    pub fn len(&self) -> usize {
        RelationshipKind::ALL
            .iter()
            .map(|kind| self.bucket(*kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups relationship records by their `type`; unknown or missing kinds are dropped
pub fn classify_relationships<'a>(
    records: impl IntoIterator<Item = &'a TypedNode<RelationshipFields>>,
) -> RelationshipBuckets {
    let mut buckets = RelationshipBuckets::default();
    for record in records {
        let fields = &record.fields;
        let Some(kind) = fields.kind.as_deref().and_then(RelationshipKind::parse) else {
            debug!(id = %record.id(), kind = ?fields.kind, "dropping relationship of unknown kind");
            continue;
        };
        buckets.bucket_mut(kind).push(BucketEntry {
            id: fields.target.clone(),
            origin_multiplicity: fields.source_multiplicity.clone().unwrap_or_default(),
            target_multiplicity: fields.target_multiplicity.clone().unwrap_or_default(),
        });
    }
    buckets
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeRow {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub scope: Option<String>,
    pub multiplicity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterRow {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodRow {
    pub name: String,
    pub scope: Option<String>,
    pub return_type: String,
    pub parameters: Vec<ParameterRow>,
}

/// Summary of a unit (attributes and methods with resolved type labels)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCard {
    pub label: String,
    pub id: String,
    pub attributes: Vec<AttributeRow>,
    pub methods: Vec<MethodRow>,
}

/// Builds class cards from the catalog
pub struct ClassCards<'a> {
    catalog: &'a Catalog,
    resolver: Resolver<'a>,
}

impl<'a> ClassCards<'a> {
    pub fn new(catalog: &'a Catalog, resolver: Resolver<'a>) -> Self {
        Self { catalog, resolver }
    }

    /// Card for unit `id`; an unknown unit yields a card labelled with the raw id
    pub fn card(&self, id: &str) -> ClassCard {
        let label = match self.catalog.units.get(id) {
            Ok(unit) => self.catalog.units.label_of(unit),
            Err(e) => {
                debug!("class card for unknown unit: {}", e);
                id.to_string()
            }
        };

        let attributes = self
            .catalog
            .children(&self.catalog.attributes, &self.catalog.units, id)
            .into_iter()
            .map(|a| self.attribute_row(a))
            .collect();
        let methods = self
            .catalog
            .children(&self.catalog.methods, &self.catalog.units, id)
            .into_iter()
            .map(|m| self.method_row(m))
            .collect();

        ClassCard {
            label,
            id: id.to_string(),
            attributes,
            methods,
        }
    }

    /// One card per relationship target, in relationship order
    pub fn related<'r>(
        &self,
        relationships: impl IntoIterator<Item = &'r TypedNode<RelationshipFields>>,
    ) -> Vec<ClassCard> {
        relationships
            .into_iter()
            .filter_map(|r| r.fields.target.as_deref())
            .filter(|target| !target.is_empty())
            .map(|target| self.card(target))
            .collect()
    }

    fn attribute_row(&self, attribute: &TypedNode<AttributeFields>) -> AttributeRow {
        AttributeRow {
            name: self.catalog.attributes.label_of(attribute),
            ty: self.resolver.resolve_type_ref(&attribute.fields.ty).label,
            scope: attribute.fields.scope.clone(),
            multiplicity: attribute.fields.multiplicity.clone(),
        }
    }

    fn method_row(&self, method: &TypedNode<MethodFields>) -> MethodRow {
        let return_type = method
            .fields
            .returns
            .as_ref()
            .map(|ret| self.resolver.resolve_type_ref(&ret.ty).label)
            .unwrap_or_default();
        let parameters = method
            .fields
            .parameters
            .iter()
            .map(|p| ParameterRow {
                name: p.name.clone(),
                ty: self.resolver.resolve_type_ref(&p.ty).label,
            })
            .collect();

        MethodRow {
            name: self.catalog.methods.label_of(method),
            scope: method.fields.scope.clone(),
            return_type,
            parameters,
        }
    }
}
