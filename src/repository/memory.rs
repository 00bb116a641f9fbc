//! In-memory repository backed by a fixed node set
//!
//! Children are derived from each node's `parent`. Snapshot files use the same
//! list shape as the REST listing (`{"nodes": [...]}` or a bare array).

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

use super::http::ListEnvelope;
use super::{NodeRepository, Result};
use crate::error::{DocgenError, RemoteError};
use crate::model::{ChildRef, NodeRecord, NodeSummary, Profile};

/// Serializable dump of a node graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeRecord>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let envelope: ListEnvelope<NodeRecord> = serde_json::from_str(text)?;
        Ok(Self {
            nodes: envelope.into_inner(),
        })
    }

    pub fn load(path: &Path) -> std::result::Result<Self, DocgenError> {
        let text = std::fs::read_to_string(path).map_err(|source| DocgenError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json(&text)?)
    }

    pub fn save(&self, path: &Path) -> std::result::Result<(), DocgenError> {
        let text = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DocgenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, text).map_err(|source| DocgenError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    nodes: Vec<NodeRecord>,
}

impl InMemoryRepository {
    pub fn new(nodes: Vec<NodeRecord>) -> Self {
        Self { nodes }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::new(snapshot.nodes)
    }

    pub fn insert(&mut self, node: NodeRecord) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn find(&self, profile: Profile, id: &str) -> Option<&NodeRecord> {
        self.nodes
            .iter()
            .find(|n| n.id == id && n.profile == profile.as_str())
    }

    fn not_found(profile: Profile, id: &str) -> RemoteError {
        RemoteError::NotFound {
            profile: profile.to_string(),
            id: id.to_string(),
        }
    }
}

#[async_trait]
impl NodeRepository for InMemoryRepository {
    async fn list_nodes(&self, profile: Profile) -> Result<Vec<NodeSummary>> {
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.profile == profile.as_str())
            .map(NodeRecord::summary)
            .collect())
    }

    async fn get_node(&self, profile: Profile, id: &str) -> Result<NodeRecord> {
        self.find(profile, id)
            .cloned()
            .ok_or_else(|| Self::not_found(profile, id))
    }

    async fn list_children(&self, profile: Profile, id: &str) -> Result<Vec<ChildRef>> {
        if self.find(profile, id).is_none() {
            return Err(Self::not_found(profile, id));
        }
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.is_child_of(id))
            .map(|n| ChildRef {
                id: n.id.clone(),
                profile: n.profile.clone(),
            })
            .collect())
    }
}
