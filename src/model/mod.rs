//! Node model
//!
//! Read-only snapshots of repository nodes plus the typed per-profile schemas
//! decoded from their `fields` map.

pub mod fields;
pub mod lenient;
mod node;
mod profile;

pub use fields::*;
pub use node::{decode_fields, slugify, ChildRef, NodeRecord, NodeSummary, TypedNode};
pub use profile::Profile;
