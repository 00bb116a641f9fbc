//! Reference resolution against the run's indexes
//!
//! Lookups return `Result<_, ResolveError>`; the `resolve_*` helpers make the
//! degrade decision explicit (raw id as label, or skip the entry) and log it.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::index::{unit_anchor, DataTypeEntry, HierarchyIndex, IndexEntry, Indexes};
use crate::layout::{CrossRef, PageLocation};
use crate::model::{Profile, TypeSpec};

/// What a type reference pointed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeSource {
    DataType,
    Unit,
    None,
}

/// Resolved type reference: always a plain label, plus an anchor when the
/// target could be found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub label: String,
    pub anchor: Option<String>,
    pub source: TypeSource,
}

impl TypeRef {
    pub fn none() -> Self {
        Self {
            label: String::new(),
            anchor: None,
            source: TypeSource::None,
        }
    }

    fn unresolved(id: &str, source: TypeSource) -> Self {
        Self {
            label: id.to_string(),
            anchor: None,
            source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }

    /// `:ref:` role when an anchor is known, the plain label otherwise,
    /// `fallback` when the label is empty
    pub fn display_or(&self, fallback: &str) -> String {
        match &self.anchor {
            Some(anchor) => format!(":ref:`{} <{}>`", self.label, anchor),
            None if self.label.is_empty() => fallback.to_string(),
            None => self.label.clone(),
        }
    }

    /// Label when the reference came from `data_type`
    pub fn data_type_label(&self) -> Option<String> {
        (self.source == TypeSource::DataType).then(|| self.label.clone())
    }

    /// Label when the reference came from `unit_ref`
    pub fn unit_label(&self) -> Option<String> {
        (self.source == TypeSource::Unit).then(|| self.label.clone())
    }
}

/// Read-only resolver shared by every page assembler of a run
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    indexes: &'a Indexes,
}

impl<'a> Resolver<'a> {
    pub fn new(indexes: &'a Indexes) -> Self {
        Self { indexes }
    }

    pub fn indexes(&self) -> &'a Indexes {
        self.indexes
    }

    pub fn data_type(&self, id: &str) -> Result<&'a DataTypeEntry, ResolveError> {
        lookup(id, Profile::SwUnitDataType, |id| self.indexes.data_types.get(id))
    }

    pub fn unit(&self, id: &str) -> Result<&'a IndexEntry, ResolveError> {
        lookup(id, Profile::SwUnit, |id| self.indexes.units.get(id))
    }

    /// `data_type` first, then `unit_ref`, then the empty label
    pub fn resolve_type_ref(&self, spec: &TypeSpec) -> TypeRef {
        if let Some(id) = spec.data_type.as_deref().filter(|id| !id.is_empty()) {
            return match self.data_type(id) {
                Ok(dt) => TypeRef {
                    label: dt.label.clone(),
                    anchor: Some(dt.anchor.clone()),
                    source: TypeSource::DataType,
                },
                Err(e) => {
                    warn!("unresolved data type, using raw id: {}", e);
                    TypeRef::unresolved(id, TypeSource::DataType)
                }
            };
        }

        if let Some(id) = spec.unit_ref.as_deref().filter(|id| !id.is_empty()) {
            return match self.unit(id) {
                Ok(unit) => TypeRef {
                    label: unit.label.clone(),
                    anchor: Some(unit_anchor(&unit.slug)),
                    source: TypeSource::Unit,
                },
                Err(e) => {
                    warn!("unresolved unit reference, using raw id: {}", e);
                    TypeRef::unresolved(id, TypeSource::Unit)
                }
            };
        }

        TypeRef::none()
    }

    /// Cross-references for `ids`, skipping the ones that do not resolve
    pub fn resolve_entity_refs(
        &self,
        ids: &[String],
        index: &HierarchyIndex,
        from: &PageLocation,
    ) -> Vec<CrossRef> {
        ids.iter()
            .filter_map(|id| match index.link(id, from) {
                Some(link) => Some(link),
                None => {
                    debug!(%id, page = from.doc_path(), "skipping unresolved reference");
                    None
                }
            })
            .collect()
    }

    /// Cross-references for `ids`; unresolved ids become `{label: id, doc_path: ""}`
    pub fn resolve_entity_refs_or_raw(
        &self,
        ids: &[String],
        index: &HierarchyIndex,
        from: &PageLocation,
    ) -> Vec<CrossRef> {
        ids.iter()
            .map(|id| {
                index.link(id, from).unwrap_or_else(|| {
                    warn!(%id, page = from.doc_path(), "unresolved reference, keeping raw id");
                    CrossRef::new(id.clone(), "")
                })
            })
            .collect()
    }
}

fn lookup<'a, T>(
    id: &str,
    profile: Profile,
    get: impl FnOnce(&str) -> Option<&'a T>,
) -> Result<&'a T, ResolveError> {
    if id.is_empty() {
        return Err(ResolveError::Empty);
    }
    get(id).ok_or_else(|| ResolveError::NotFound {
        profile,
        id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::NodeRecord;

    fn indexes() -> Indexes {
        let catalog = Catalog::from_nodes(vec![
            NodeRecord::new("u1", "Brake Unit", Profile::SwUnit),
            NodeRecord::new("u2", "Wheel", Profile::SwUnit),
            NodeRecord::new("dt1", "force_t", Profile::SwUnitDataType).with_parent("u1"),
            NodeRecord::new("c1", "Engine", Profile::SwComponent),
        ]);
        Indexes::build(&catalog)
    }

    #[test]
    fn test_data_type_wins_over_unit_ref() {
        let indexes = indexes();
        let resolver = Resolver::new(&indexes);
        let spec = TypeSpec {
            data_type: Some("dt1".into()),
            unit_ref: Some("u2".into()),
        };
        let ty = resolver.resolve_type_ref(&spec);
        assert_eq!(ty.label, "force_t");
        assert_eq!(ty.source, TypeSource::DataType);
        assert_eq!(ty.display_or("-"), ":ref:`force_t <dt-Brake-Unit-force_t>`");
    }

    #[test]
    fn test_unit_ref_links_to_unit_anchor() {
        let indexes = indexes();
        let ty = Resolver::new(&indexes).resolve_type_ref(&TypeSpec::unit_ref("u2"));
        assert_eq!(ty.unit_label().as_deref(), Some("Wheel"));
        assert_eq!(ty.display_or(""), ":ref:`Wheel <unit-Wheel>`");
    }

    #[test]
    fn test_unresolved_data_type_falls_back_to_raw_id() {
        let indexes = indexes();
        let ty = Resolver::new(&indexes).resolve_type_ref(&TypeSpec::data_type("dt404"));
        assert_eq!(ty.label, "dt404");
        assert_eq!(ty.anchor, None);
        assert_eq!(ty.display_or("-"), "dt404");
    }

    #[test]
    fn test_no_reference_gives_empty_label() {
        let indexes = indexes();
        let ty = Resolver::new(&indexes).resolve_type_ref(&TypeSpec::default());
        assert_eq!(ty, TypeRef::none());
        assert_eq!(ty.label, "");
        assert_eq!(ty.display_or("-"), "-");
    }

    #[test]
    fn test_entity_refs_skip_or_keep_unresolved() {
        let indexes = indexes();
        let resolver = Resolver::new(&indexes);
        let from = PageLocation::new("architecture/interfaces/Drive");
        let ids = vec!["c1".to_string(), "c404".to_string()];

        let skipped = resolver.resolve_entity_refs(&ids, &indexes.components, &from);
        assert_eq!(skipped, vec![CrossRef::new("Engine", "../components/Engine")]);

        let kept = resolver.resolve_entity_refs_or_raw(&ids, &indexes.components, &from);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1], CrossRef::new("c404", ""));
    }

    #[test]
    fn test_lookup_reports_empty_and_missing() {
        let indexes = indexes();
        let resolver = Resolver::new(&indexes);
        assert_eq!(resolver.unit("").unwrap_err(), ResolveError::Empty);
        assert!(matches!(
            resolver.data_type("nope"),
            Err(ResolveError::NotFound { profile: Profile::SwUnitDataType, .. })
        ));
    }
}
