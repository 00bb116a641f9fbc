//! Hephora documentation generator
//!
//! Reads the node graph of a Hephora project (V-model, requirements,
//! architecture, detailed design, unit tests) and turns it into a Sphinx
//! source tree plus Mermaid and PlantUML diagrams.
//!
//! A run fetches every needed profile once into a [`Catalog`], builds the
//! hierarchy [`Indexes`] (slugs and doc paths), then lets each page assembler
//! produce [`RenderRequest`]s that a [`DocumentRenderer`] writes out.

pub mod attachments;
pub mod bootstrap;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod generator;
pub mod index;
pub mod layout;
pub mod model;
pub mod pages;
pub mod render;
pub mod repository;
pub mod resolve;

pub use catalog::Catalog;
pub use config::DocgenConfig;
pub use error::{DocgenError, Result};
pub use generator::{DocFamily, DocGenerator, FamilyReport, GenerationReport};
pub use index::Indexes;
pub use pages::RenderRequest;
pub use render::{DocumentRenderer, HandlebarsRenderer, RecordingRenderer};
pub use repository::{HttpNodeRepository, InMemoryRepository, NodeRepository, Snapshot};
