//! Generation run: fetch once, index once, then assemble and render each
//! requested document family.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::attachments::Materializer;
use crate::bootstrap::{ensure_sphinx_skeleton, ensure_toctree_entry};
use crate::catalog::Catalog;
use crate::config::DocgenConfig;
use crate::error::Result;
use crate::index::Indexes;
use crate::model::Profile;
use crate::pages::{self, AssemblyContext, RenderRequest};
use crate::render::DocumentRenderer;
use crate::repository::NodeRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocFamily {
    Project,
    Requirements,
    Architecture,
    Design,
    UnitTests,
    ClassDiagrams,
    BlockDiagram,
}

impl DocFamily {
    /// Run order
    pub const ALL: [DocFamily; 7] = [
        DocFamily::Project,
        DocFamily::Requirements,
        DocFamily::Architecture,
        DocFamily::Design,
        DocFamily::UnitTests,
        DocFamily::ClassDiagrams,
        DocFamily::BlockDiagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocFamily::Project => "project",
            DocFamily::Requirements => "requirements",
            DocFamily::Architecture => "architecture",
            DocFamily::Design => "design",
            DocFamily::UnitTests => "unit_tests",
            DocFamily::ClassDiagrams => "class_diagrams",
            DocFamily::BlockDiagram => "block_diagram",
        }
    }

    /// Profiles the family's pages read
    pub fn profiles(&self) -> &'static [Profile] {
        use Profile::*;
        match self {
            DocFamily::Project => &[VModel],
            DocFamily::Requirements => &[SwRequirementsGroup, SwRequirement],
            DocFamily::Architecture => &[
                SwArchitecture,
                SwComponent,
                SwInterface,
                SwDataStructure,
                SwRequirement,
                Attachment,
            ],
            DocFamily::Design => &[
                SwDesign,
                SwUnit,
                SwUnitAttribute,
                SwUnitMethod,
                SwUnitDataType,
                SwInterface,
                SwComponent,
                Attachment,
            ],
            DocFamily::UnitTests => &[
                SwUnitTestStrategy,
                SwUnitTestPlan,
                SwUnitTestCase,
                SwUnit,
                Attachment,
            ],
            DocFamily::ClassDiagrams => &[
                SwUnit,
                SwUnitAttribute,
                SwUnitMethod,
                SwUnitRelationship,
                SwUnitDataType,
            ],
            DocFamily::BlockDiagram => &[SwComponent, SwInterface],
        }
    }

    /// Sphinx families write below `docs_dir`, diagrams below their own folders
    pub fn is_sphinx(&self) -> bool {
        !matches!(self, DocFamily::ClassDiagrams | DocFamily::BlockDiagram)
    }

    pub fn output_root<'a>(&self, config: &'a DocgenConfig) -> &'a Path {
        match self {
            DocFamily::ClassDiagrams => &config.class_diagrams_dir,
            DocFamily::BlockDiagram => &config.block_diagram_dir,
            _ => &config.docs_dir,
        }
    }

    fn assemble(&self, ctx: &AssemblyContext<'_>) -> Result<Vec<RenderRequest>> {
        match self {
            DocFamily::Project => pages::project::assemble(ctx),
            DocFamily::Requirements => pages::requirements::assemble(ctx),
            DocFamily::Architecture => pages::architecture::assemble(ctx),
            DocFamily::Design => pages::design::assemble(ctx),
            DocFamily::UnitTests => pages::unit_tests::assemble(ctx),
            DocFamily::ClassDiagrams => pages::class_diagram::assemble(ctx),
            DocFamily::BlockDiagram => pages::block_diagram::assemble(ctx),
        }
    }
}

impl fmt::Display for DocFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Union of the profiles `families` read, in profile order
pub fn profiles_for(families: &[DocFamily]) -> Vec<Profile> {
    let set: BTreeSet<Profile> = families
        .iter()
        .flat_map(|f| f.profiles().iter().copied())
        .collect();
    set.into_iter().collect()
}

/// Outcome of one family
#[derive(Debug, Clone, Serialize)]
pub struct FamilyReport {
    pub family: DocFamily,
    pub written: Vec<PathBuf>,
    pub error: Option<String>,
}

impl FamilyReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub families: Vec<FamilyReport>,
}

impl GenerationReport {
    pub fn has_failures(&self) -> bool {
        self.families.iter().any(|f| !f.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FamilyReport> {
        self.families.iter().filter(|f| !f.is_success())
    }

    pub fn pages_written(&self) -> usize {
        self.families.iter().map(|f| f.written.len()).sum()
    }

    pub fn family(&self, family: DocFamily) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.family == family)
    }
}

pub struct DocGenerator {
    config: DocgenConfig,
    repository: Box<dyn NodeRepository>,
    renderer: Box<dyn DocumentRenderer>,
    attachment_base: Option<PathBuf>,
}

impl DocGenerator {
    pub fn new(
        config: DocgenConfig,
        repository: Box<dyn NodeRepository>,
        renderer: Box<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            config,
            repository,
            renderer,
            attachment_base: None,
        }
    }

    /// Directory relative attachment paths are read from (default: working directory)
    pub fn with_attachment_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.attachment_base = Some(dir.into());
        self
    }

    pub fn config(&self) -> &DocgenConfig {
        &self.config
    }

    pub fn bootstrap(&self) -> Result<()> {
        ensure_sphinx_skeleton(&self.config.docs_dir)
    }

    pub async fn load_catalog(&self, families: &[DocFamily]) -> Catalog {
        Catalog::load(
            self.repository.as_ref(),
            &profiles_for(families),
            self.config.fetch_concurrency,
        )
        .await
    }

    /// Fetches every profile and writes the result as a JSON snapshot
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn export_snapshot(&self, path: &Path) -> Result<usize> {
        let catalog = Catalog::load(
            self.repository.as_ref(),
            &Profile::ALL,
            self.config.fetch_concurrency,
        )
        .await;
        let snapshot = catalog.snapshot();
        snapshot.save(path)?;
        info!("Exported {} nodes to {}", snapshot.nodes.len(), path.display());
        Ok(snapshot.nodes.len())
    }

    /// Runs `families` in their fixed order. Only a failing bootstrap aborts the
    /// run; a failing family is recorded and the others still run.
    #[instrument(skip(self, families), fields(families = families.len()))]
    pub async fn run(&self, families: &[DocFamily]) -> Result<GenerationReport> {
        let selected: BTreeSet<DocFamily> = families.iter().copied().collect();
        let ordered: Vec<DocFamily> = DocFamily::ALL
            .into_iter()
            .filter(|f| selected.contains(f))
            .collect();

        if self.config.bootstrap && ordered.iter().any(DocFamily::is_sphinx) {
            self.bootstrap()?;
        }

        let catalog = self.load_catalog(&ordered).await;
        Ok(self.generate(&catalog, &ordered))
    }

    /// Assembles and renders `families` from an already loaded catalog
    pub fn generate(&self, catalog: &Catalog, families: &[DocFamily]) -> GenerationReport {
        let indexes = Indexes::build(catalog);
        let mut materializer = Materializer::new(&self.config.docs_dir);
        if let Some(base) = &self.attachment_base {
            materializer = materializer.with_base_dir(base);
        }
        let ctx = AssemblyContext::new(catalog, &indexes, &materializer);

        let mut report = GenerationReport::default();
        for &family in families {
            let mut written = Vec::new();
            let outcome = self.generate_family(family, &ctx, &mut written);
            let error = match outcome {
                Ok(()) => {
                    info!(%family, pages = written.len(), "family generated");
                    None
                }
                Err(e) => {
                    error!(%family, "family failed: {}", e);
                    Some(e.to_string())
                }
            };
            report.families.push(FamilyReport {
                family,
                written,
                error,
            });
        }
        report
    }

    fn generate_family(
        &self,
        family: DocFamily,
        ctx: &AssemblyContext<'_>,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let root = family.output_root(&self.config);
        for request in family.assemble(ctx)? {
            written.push(self.renderer.render(&request, root)?);
        }

        if family == DocFamily::UnitTests {
            let root_index = self.config.docs_dir.join("index.rst");
            if root_index.is_file() {
                ensure_toctree_entry(&root_index, "unit_tests/index")?;
            } else {
                debug!(path = %root_index.display(), "no root index, toctree left alone");
            }
        }
        Ok(())
    }
}
