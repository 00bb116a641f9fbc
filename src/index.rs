//! Hierarchy indexes: id → {label, slug, doc path} per collection
//!
//! Built once per run from the catalog and only read afterwards. Slugs are
//! derived from labels; nodes are visited in id order so the result does not
//! depend on listing order. Two labels that slugify identically within one
//! collection are disambiguated by appending the node id to the later one.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::catalog::{Catalog, Collection};
use crate::layout::{self, CrossRef, DocPathTemplate, PageLocation};
use crate::model::slugify;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub label: String,
    pub slug: String,
    pub doc_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyIndex {
    entries: BTreeMap<String, IndexEntry>,
}

impl HierarchyIndex {
    pub fn build<F>(collection: &Collection<F>, template: DocPathTemplate) -> Self {
        let ids: BTreeSet<&str> = collection.iter().map(|n| n.id()).collect();
        let mut taken: HashMap<String, &str> = HashMap::new();
        let mut entries = BTreeMap::new();

        for id in ids {
            let Ok(node) = collection.get(id) else {
                continue;
            };
            let label = collection.label_of(node);
            let base = slugify(&label);
            let slug = claim_slug(&base, id, |candidate| taken.contains_key(candidate));
            if slug != base {
                warn!(
                    profile = %collection.profile(),
                    %id,
                    other = %taken.get(&base).copied().unwrap_or_default(),
                    "slug '{}' already taken, using '{}'",
                    base,
                    slug
                );
            }
            taken.insert(slug.clone(), id);
            entries.insert(
                id.to_string(),
                IndexEntry {
                    label,
                    doc_path: template.expand(&slug),
                    slug,
                },
            );
        }

        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    /// Cross-reference to `id` as seen from `from`
    pub fn link(&self, id: &str, from: &PageLocation) -> Option<CrossRef> {
        self.get(id)
            .map(|entry| from.cross_ref(entry.label.clone(), &entry.doc_path))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Unit data type with the anchor used to link it inside its unit page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataTypeEntry {
    pub label: String,
    pub slug: String,
    pub unit_slug: String,
    pub unit_label: String,
    pub anchor: String,
    pub doc_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataTypeIndex {
    entries: BTreeMap<String, DataTypeEntry>,
}

impl DataTypeIndex {
    /// Anchors are unique per unit; colliding type slugs get the node id appended
    pub fn build(catalog: &Catalog, units: &HierarchyIndex) -> Self {
        let ids: BTreeSet<&str> = catalog.data_types.iter().map(|dt| dt.id()).collect();
        let mut taken: HashSet<(String, String)> = HashSet::new();
        let mut entries = BTreeMap::new();

        for id in ids {
            let Ok(dt) = catalog.data_types.get(id) else {
                continue;
            };
            let label = catalog.data_types.label_of(dt);
            let unit = dt.node.parent.as_deref().and_then(|p| units.get(p));
            let unit_slug = unit.map(|u| u.slug.clone()).unwrap_or_default();

            let base = slugify(&label);
            let slug = claim_slug(&base, id, |candidate| {
                taken.contains(&(unit_slug.clone(), candidate.to_string()))
            });
            if slug != base {
                warn!(%id, unit = %unit_slug, "data type slug '{}' already taken, using '{}'", base, slug);
            }
            taken.insert((unit_slug.clone(), slug.clone()));

            entries.insert(
                id.to_string(),
                DataTypeEntry {
                    label,
                    unit_label: unit.map(|u| u.label.clone()).unwrap_or_default(),
                    doc_path: DocPathTemplate::new(layout::DESIGN_ITEMS).expand(&unit_slug),
                    anchor: data_type_anchor(&unit_slug, &slug),
                    unit_slug,
                    slug,
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&DataTypeEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `base` when free, else `base-<id>`, else `base-<id>-2`, `-3`, ...
fn claim_slug(base: &str, id: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    let with_id = format!("{}-{}", base, id);
    if !is_taken(&with_id) {
        return with_id;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", with_id, n);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub fn data_type_anchor(unit_slug: &str, slug: &str) -> String {
    if unit_slug.is_empty() {
        format!("dt-{}", slug)
    } else {
        format!("dt-{}-{}", unit_slug, slug)
    }
}

pub fn unit_anchor(unit_slug: &str) -> String {
    format!("unit-{}", unit_slug)
}

/// Every index of one run
#[derive(Debug, Clone, Default)]
pub struct Indexes {
    pub units: HierarchyIndex,
    pub data_types: DataTypeIndex,
    pub interfaces: HierarchyIndex,
    pub components: HierarchyIndex,
    pub data_structures: HierarchyIndex,
    pub requirements: HierarchyIndex,
    pub requirement_groups: HierarchyIndex,
    pub test_strategies: HierarchyIndex,
    pub test_plans: HierarchyIndex,
    pub test_cases: HierarchyIndex,
}

impl Indexes {
    pub fn build(catalog: &Catalog) -> Self {
        let units = HierarchyIndex::build(&catalog.units, DocPathTemplate::new(layout::DESIGN_ITEMS));
        let data_types = DataTypeIndex::build(catalog, &units);
        Self {
            data_types,
            units,
            interfaces: HierarchyIndex::build(
                &catalog.interfaces,
                DocPathTemplate::new(layout::INTERFACES),
            ),
            components: HierarchyIndex::build(
                &catalog.components,
                DocPathTemplate::new(layout::COMPONENTS),
            ),
            data_structures: HierarchyIndex::build(
                &catalog.data_structures,
                DocPathTemplate::new(layout::DATA_STRUCTURES),
            ),
            requirements: HierarchyIndex::build(
                &catalog.requirements,
                DocPathTemplate::new(layout::REQUIREMENT_ITEMS),
            ),
            requirement_groups: HierarchyIndex::build(
                &catalog.requirement_groups,
                DocPathTemplate::new(layout::REQUIREMENT_GROUPS),
            ),
            test_strategies: HierarchyIndex::build(
                &catalog.test_strategies,
                DocPathTemplate::new(layout::TEST_STRATEGIES),
            ),
            test_plans: HierarchyIndex::build(
                &catalog.test_plans,
                DocPathTemplate::new(layout::TEST_PLANS),
            ),
            test_cases: HierarchyIndex::build(
                &catalog.test_cases,
                DocPathTemplate::new(layout::TEST_CASES),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentFields, NodeRecord, Profile};
    use proptest::prelude::*;

    fn components(labels: &[(&str, &str)]) -> Collection<ComponentFields> {
        Collection::ingest(
            Profile::SwComponent,
            labels
                .iter()
                .map(|(id, label)| NodeRecord::new(*id, *label, Profile::SwComponent))
                .collect(),
        )
    }

    #[test]
    fn test_entries_use_template_and_slug() {
        let index = HierarchyIndex::build(
            &components(&[("c1", "Brake Controller")]),
            DocPathTemplate::new(layout::COMPONENTS),
        );
        let entry = index.get("c1").unwrap();
        assert_eq!(entry.label, "Brake Controller");
        assert_eq!(entry.slug, "Brake-Controller");
        assert_eq!(entry.doc_path, "architecture/components/Brake-Controller");
    }

    #[test]
    fn test_colliding_slugs_are_disambiguated_by_id() {
        let index = HierarchyIndex::build(
            &components(&[("c2", "Brake-Unit"), ("c1", "Brake Unit")]),
            DocPathTemplate::new(layout::COMPONENTS),
        );
        assert_eq!(index.get("c1").unwrap().slug, "Brake-Unit");
        assert_eq!(index.get("c2").unwrap().slug, "Brake-Unit-c2");
    }

    #[test]
    fn test_suffixed_slug_never_reuses_a_taken_one() {
        let index = HierarchyIndex::build(
            &components(&[("a", "X"), ("b", "X-c"), ("c", "X")]),
            DocPathTemplate::new(layout::COMPONENTS),
        );
        let paths: BTreeSet<&str> = index.iter().map(|(_, e)| e.doc_path.as_str()).collect();

        assert_eq!(paths.len(), 3);
        assert_eq!(index.get("a").unwrap().slug, "X");
        assert_eq!(index.get("b").unwrap().slug, "X-c");
        assert_eq!(index.get("c").unwrap().slug, "X-c-2");
    }

    #[test]
    fn test_link_is_relative_to_referencing_page() {
        let index = HierarchyIndex::build(
            &components(&[("c1", "Engine")]),
            DocPathTemplate::new(layout::COMPONENTS),
        );
        let from_iface = PageLocation::new("architecture/interfaces/Drive");
        assert_eq!(
            index.link("c1", &from_iface),
            Some(CrossRef::new("Engine", "../components/Engine"))
        );
        assert_eq!(index.link("c9", &from_iface), None);
    }

    #[test]
    fn test_data_type_anchor_uses_owning_unit() {
        let catalog = Catalog::from_nodes(vec![
            NodeRecord::new("u1", "Brake Unit", Profile::SwUnit),
            NodeRecord::new("dt1", "speed t", Profile::SwUnitDataType).with_parent("u1"),
            NodeRecord::new("dt2", "orphan", Profile::SwUnitDataType),
        ]);
        let indexes = Indexes::build(&catalog);

        let dt = indexes.data_types.get("dt1").unwrap();
        assert_eq!(dt.anchor, "dt-Brake-Unit-speed-t");
        assert_eq!(dt.doc_path, "design/items/Brake-Unit");
        assert_eq!(dt.unit_label, "Brake Unit");
        assert_eq!(indexes.data_types.get("dt2").unwrap().anchor, "dt-orphan");
    }

    #[test]
    fn test_data_type_anchors_are_unique_within_a_unit() {
        let catalog = Catalog::from_nodes(vec![
            NodeRecord::new("u1", "Brake", Profile::SwUnit),
            NodeRecord::new("u2", "Wheel", Profile::SwUnit),
            NodeRecord::new("dt1", "speed t", Profile::SwUnitDataType).with_parent("u1"),
            NodeRecord::new("dt2", "speed-t", Profile::SwUnitDataType).with_parent("u1"),
            NodeRecord::new("dt3", "speed t", Profile::SwUnitDataType).with_parent("u2"),
        ]);
        let indexes = Indexes::build(&catalog);

        assert_eq!(indexes.data_types.get("dt1").unwrap().anchor, "dt-Brake-speed-t");
        assert_eq!(indexes.data_types.get("dt2").unwrap().anchor, "dt-Brake-speed-t-dt2");
        // another unit keeps the plain slug
        assert_eq!(indexes.data_types.get("dt3").unwrap().anchor, "dt-Wheel-speed-t");
    }

    proptest! {
        #[test]
        fn prop_index_is_independent_of_listing_order(
            labels in proptest::collection::vec("[A-C]{1,2}( [A-C])?", 1..12),
            seed in any::<u64>(),
        ) {
            let records: Vec<NodeRecord> = labels
                .iter()
                .enumerate()
                .map(|(i, label)| NodeRecord::new(format!("n{}", i), label.clone(), Profile::SwComponent))
                .collect();
            let mut shuffled = records.clone();
            // deterministic rotation + reversal stands in for an arbitrary permutation
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            if seed % 2 == 0 {
                shuffled.reverse();
            }

            let template = DocPathTemplate::new(layout::COMPONENTS);
            let first = HierarchyIndex::build(
                &Collection::<ComponentFields>::ingest(Profile::SwComponent, records),
                template,
            );
            let second = HierarchyIndex::build(
                &Collection::<ComponentFields>::ingest(Profile::SwComponent, shuffled),
                template,
            );
            prop_assert_eq!(first, second);
        }
    }
}
