//! Sphinx skeleton for the docs output root
//!
//! `conf.py` and the root `index.rst` are rewritten on every run. Section
//! indexes only get a placeholder when missing, so generated pages are never
//! clobbered.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{DocgenError, Result};

const CONF_PY: &str = r#"import sphinx_rtd_theme
project = "Hephora Generated Docs"
extensions = [
   "sphinx.ext.autosectionlabel",
   "sphinx_rtd_theme",
]
templates_path = ["_templates"]
exclude_patterns = []
html_theme = "sphinx_rtd_theme"
autosectionlabel_prefix_document = True
"#;

const INDEX_RST: &str = "Hephora Documentation
=====================

.. toctree::
   :maxdepth: 2

   project/index
   requirements/index
   architecture/index
   design/index
   unit_tests/index
";

/// Section folders with the title of their placeholder page
pub const SECTIONS: [(&str, &str); 5] = [
    ("project", "Project Overview"),
    ("requirements", "Software Requirements"),
    ("architecture", "Software Architecture"),
    ("design", "Software Design"),
    ("unit_tests", "Unit Tests"),
];

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| DocgenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| DocgenError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn placeholder(title: &str) -> String {
    format!(
        "{}\n{}\n\n.. note::\n   This section is created by bootstrap. Generators will populate it.\n",
        title,
        "=".repeat(title.chars().count())
    )
}

pub fn ensure_sphinx_skeleton(root: &Path) -> Result<()> {
    create_dir(root)?;
    create_dir(&root.join("_templates"))?;
    create_dir(&root.join("_static"))?;
    write(&root.join("conf.py"), CONF_PY)?;
    write(&root.join("index.rst"), INDEX_RST)?;

    for (section, title) in SECTIONS {
        let dir = root.join(section);
        create_dir(&dir)?;
        let index = dir.join("index.rst");
        if index.exists() {
            continue;
        }
        write(&index, &placeholder(title))?;
        debug!(section, "placeholder index written");
    }

    info!("Sphinx skeleton ready at {}", root.display());
    Ok(())
}

/// Adds `entry` to the first toctree of `root_index` when it is not listed yet.
/// The entry goes right after `design/index`, or at the end of the file.
pub fn ensure_toctree_entry(root_index: &Path, entry: &str) -> Result<()> {
    let text = fs::read_to_string(root_index).map_err(|source| DocgenError::Io {
        path: root_index.to_path_buf(),
        source,
    })?;
    if text.lines().any(|line| line.trim() == entry) {
        return Ok(());
    }

    let line = format!("   {}", entry);
    let mut lines: Vec<&str> = text.lines().collect();
    match lines.iter().position(|l| l.trim() == "design/index") {
        Some(pos) => lines.insert(pos + 1, &line),
        None => lines.push(&line),
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    write(root_index, &updated)?;
    info!(entry, "toctree entry added to {}", root_index.display());
    Ok(())
}
