//! NodeRepository trait — the sole API boundary between the generator and
//! the Hephora node graph.
//!
//! `HttpNodeRepository` talks to the REST service; `InMemoryRepository`
//! serves a fixed node set (snapshot files, tests).

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::model::{ChildRef, NodeRecord, NodeSummary, Profile};

pub use http::HttpNodeRepository;
pub use memory::{InMemoryRepository, Snapshot};

pub type Result<T> = std::result::Result<T, RemoteError>;

#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// All nodes of a profile (id, label, profile; parent when the backend provides it)
    async fn list_nodes(&self, profile: Profile) -> Result<Vec<NodeSummary>>;

    /// Full node record
    async fn get_node(&self, profile: Profile, id: &str) -> Result<NodeRecord>;

    /// Direct children of a node, any profile
    async fn list_children(&self, profile: Profile, id: &str) -> Result<Vec<ChildRef>>;
}
