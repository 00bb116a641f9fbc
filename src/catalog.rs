//! Fetch-once snapshot of the node graph
//!
//! Every collection needed by a run is listed and fetched exactly once, decoded
//! against its profile schema, and then only read. Assemblers share the
//! catalog by reference.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::{DocgenError, RemoteError, ResolveError};
use crate::model::*;
use crate::repository::{NodeRepository, Snapshot};

/// Typed nodes of one profile, in listing order, with an id lookup
#[derive(Debug, Clone)]
pub struct Collection<F> {
    profile: Profile,
    items: Vec<TypedNode<F>>,
    by_id: HashMap<String, usize>,
}

impl<F> Collection<F>
where
    F: DeserializeOwned + Default,
{
    pub fn ingest(profile: Profile, records: Vec<NodeRecord>) -> Self {
        let items: Vec<TypedNode<F>> = records.into_iter().map(TypedNode::ingest).collect();
        let mut by_id = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            // first occurrence wins
            by_id.entry(item.node.id.clone()).or_insert(idx);
        }
        Self {
            profile,
            items,
            by_id,
        }
    }
}

impl<F> Collection<F> {
    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn get(&self, id: &str) -> std::result::Result<&TypedNode<F>, ResolveError> {
        if id.is_empty() {
            return Err(ResolveError::Empty);
        }
        self.by_id
            .get(id)
            .map(|&idx| &self.items[idx])
            .ok_or_else(|| ResolveError::NotFound {
                profile: self.profile,
                id: id.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypedNode<F>> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&TypedNode<F>> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Nodes whose `parent` equals `parent_id`
    pub fn children_of(&self, parent_id: &str) -> Vec<&TypedNode<F>> {
        self.items
            .iter()
            .filter(|n| n.node.is_child_of(parent_id))
            .collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.items.iter().map(|n| &n.node)
    }

    /// Display label of a node of this collection
    pub fn label_of(&self, node: &TypedNode<F>) -> String {
        node.node.display_label(self.profile)
    }
}

/// All collections of one generation run
#[derive(Debug, Clone)]
pub struct Catalog {
    pub v_models: Collection<VModelFields>,
    pub requirement_groups: Collection<RequirementGroupFields>,
    pub requirements: Collection<RequirementFields>,
    pub architectures: Collection<ArchitectureFields>,
    pub components: Collection<ComponentFields>,
    pub interfaces: Collection<InterfaceFields>,
    pub data_structures: Collection<DataStructureFields>,
    pub designs: Collection<DesignFields>,
    pub units: Collection<UnitFields>,
    pub attributes: Collection<AttributeFields>,
    pub methods: Collection<MethodFields>,
    pub relationships: Collection<RelationshipFields>,
    pub data_types: Collection<UnitDataTypeFields>,
    pub attachments: Collection<AttachmentFields>,
    pub test_strategies: Collection<TestStrategyFields>,
    pub test_plans: Collection<TestPlanFields>,
    pub test_cases: Collection<TestCaseFields>,
    failures: BTreeMap<Profile, RemoteError>,
    child_listings: HashMap<(Profile, String), Vec<ChildRef>>,
}

impl Catalog {
    /// Lists and fetches every node of `profiles`, at most `concurrency` gets in flight.
    ///
    /// A failed listing leaves the collection empty and is remembered for
    /// [`Catalog::root`]; a failed get skips that node.
    #[instrument(skip(repo, profiles), fields(profiles = profiles.len()))]
    pub async fn load(repo: &dyn NodeRepository, profiles: &[Profile], concurrency: usize) -> Self {
        let wanted: BTreeSet<Profile> = profiles.iter().copied().collect();
        let mut records = BTreeMap::new();
        let mut failures = BTreeMap::new();

        for &profile in &wanted {
            match fetch_collection(repo, profile, concurrency).await {
                Ok(nodes) => {
                    debug!(%profile, count = nodes.len(), "collection fetched");
                    records.insert(profile, nodes);
                }
                Err(e) => {
                    warn!(%profile, "listing failed, continuing with empty collection: {}", e);
                    failures.insert(profile, e);
                }
            }
        }

        let mut child_listings = HashMap::new();
        for profile in Profile::CONTAINERS {
            let Some(parents) = records.get(&profile) else {
                continue;
            };
            for parent in parents {
                match repo.list_children(profile, &parent.id).await {
                    Ok(children) => {
                        child_listings.insert((profile, parent.id.clone()), children);
                    }
                    Err(e) => {
                        debug!(%profile, id = %parent.id, "children listing failed, scanning by parent: {}", e)
                    }
                }
            }
        }

        let catalog = Self::assemble(records, failures, child_listings);
        info!(nodes = catalog.node_count(), "catalog loaded");
        catalog
    }

    /// Catalog over an already fetched node set (children derived from `parent`)
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeRecord>) -> Self {
        let mut records: BTreeMap<Profile, Vec<NodeRecord>> = BTreeMap::new();
        for node in nodes {
            match node.profile.parse::<Profile>() {
                Ok(profile) => records.entry(profile).or_default().push(node),
                Err(_) => debug!(id = %node.id, profile = %node.profile, "skipping node with unknown profile"),
            }
        }
        Self::assemble(records, BTreeMap::new(), HashMap::new())
    }

    fn assemble(
        mut records: BTreeMap<Profile, Vec<NodeRecord>>,
        failures: BTreeMap<Profile, RemoteError>,
        child_listings: HashMap<(Profile, String), Vec<ChildRef>>,
    ) -> Self {
        let mut take = |profile: Profile| records.remove(&profile).unwrap_or_default();
        Self {
            v_models: Collection::ingest(Profile::VModel, take(Profile::VModel)),
            requirement_groups: Collection::ingest(
                Profile::SwRequirementsGroup,
                take(Profile::SwRequirementsGroup),
            ),
            requirements: Collection::ingest(Profile::SwRequirement, take(Profile::SwRequirement)),
            architectures: Collection::ingest(Profile::SwArchitecture, take(Profile::SwArchitecture)),
            components: Collection::ingest(Profile::SwComponent, take(Profile::SwComponent)),
            interfaces: Collection::ingest(Profile::SwInterface, take(Profile::SwInterface)),
            data_structures: Collection::ingest(
                Profile::SwDataStructure,
                take(Profile::SwDataStructure),
            ),
            designs: Collection::ingest(Profile::SwDesign, take(Profile::SwDesign)),
            units: Collection::ingest(Profile::SwUnit, take(Profile::SwUnit)),
            attributes: Collection::ingest(Profile::SwUnitAttribute, take(Profile::SwUnitAttribute)),
            methods: Collection::ingest(Profile::SwUnitMethod, take(Profile::SwUnitMethod)),
            relationships: Collection::ingest(
                Profile::SwUnitRelationship,
                take(Profile::SwUnitRelationship),
            ),
            data_types: Collection::ingest(Profile::SwUnitDataType, take(Profile::SwUnitDataType)),
            attachments: Collection::ingest(Profile::Attachment, take(Profile::Attachment)),
            test_strategies: Collection::ingest(
                Profile::SwUnitTestStrategy,
                take(Profile::SwUnitTestStrategy),
            ),
            test_plans: Collection::ingest(Profile::SwUnitTestPlan, take(Profile::SwUnitTestPlan)),
            test_cases: Collection::ingest(Profile::SwUnitTestCase, take(Profile::SwUnitTestCase)),
            failures,
            child_listings,
        }
    }

    /// First node of a family root collection ("single active instance")
    pub fn root<'a, F>(&self, collection: &'a Collection<F>) -> crate::error::Result<&'a TypedNode<F>> {
        if let Some(first) = collection.first() {
            return Ok(first);
        }
        match self.failures.get(&collection.profile()) {
            Some(e) => Err(DocgenError::Remote(e.clone())),
            None => Err(DocgenError::MissingRoot {
                profile: collection.profile(),
            }),
        }
    }

    /// Children of the `parents` node `parent_id` within `collection`: the
    /// recorded child listing when it names any, otherwise a scan by `parent`
    pub fn children<'a, F, P>(
        &self,
        collection: &'a Collection<F>,
        parents: &Collection<P>,
        parent_id: &str,
    ) -> Vec<&'a TypedNode<F>> {
        let profile = collection.profile().as_str();
        let listed: Vec<&TypedNode<F>> = self
            .child_listings
            .get(&(parents.profile(), parent_id.to_string()))
            .map(|children| {
                children
                    .iter()
                    .filter(|c| c.profile == profile)
                    .filter_map(|c| collection.get(&c.id).ok())
                    .collect()
            })
            .unwrap_or_default();

        if listed.is_empty() {
            collection.children_of(parent_id)
        } else {
            listed
        }
    }

    pub fn failure(&self, profile: Profile) -> Option<&RemoteError> {
        self.failures.get(&profile)
    }

    pub fn node_count(&self) -> usize {
        self.records().count()
    }

    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> {
        self.v_models
            .records()
            .chain(self.requirement_groups.records())
            .chain(self.requirements.records())
            .chain(self.architectures.records())
            .chain(self.components.records())
            .chain(self.interfaces.records())
            .chain(self.data_structures.records())
            .chain(self.designs.records())
            .chain(self.units.records())
            .chain(self.attributes.records())
            .chain(self.methods.records())
            .chain(self.relationships.records())
            .chain(self.data_types.records())
            .chain(self.attachments.records())
            .chain(self.test_strategies.records())
            .chain(self.test_plans.records())
            .chain(self.test_cases.records())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.records().cloned().collect(),
        }
    }
}

async fn fetch_collection(
    repo: &dyn NodeRepository,
    profile: Profile,
    concurrency: usize,
) -> std::result::Result<Vec<NodeRecord>, RemoteError> {
    let listed = repo.list_nodes(profile).await?;

    let fetched: Vec<_> = stream::iter(listed.iter())
        .map(|summary| async move { (summary, repo.get_node(profile, &summary.id).await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    Ok(fetched
        .into_iter()
        .filter_map(|(summary, result)| match result {
            Ok(mut node) => {
                if node.profile.is_empty() {
                    node.profile = profile.as_str().to_string();
                }
                if node.parent.is_none() {
                    node.parent = summary.parent.clone();
                }
                Some(node)
            }
            Err(e) => {
                warn!(%profile, id = %summary.id, "skipping node: {}", e);
                None
            }
        })
        .collect())
}
