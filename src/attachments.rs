//! Attachment materialization
//!
//! Copies an attachment's backing file into a `_static/...` folder of the
//! output tree and returns the link the referencing page should use. Nothing
//! here fails: a missing or uncopyable file still yields a best-effort link.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::PageLocation;
use crate::model::{AttachmentFields, TypedNode};

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "svg", "gif", "bmp", "webp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentMeta {
    pub filename: String,
    pub doc_path: String,
    pub description: Option<String>,
    pub is_image: bool,
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct Materializer {
    out_root: PathBuf,
    cwd: PathBuf,
}

impl Materializer {
    /// Relative attachment paths are resolved against the process working directory
    pub fn new(out_root: impl Into<PathBuf>) -> Self {
        Self {
            out_root: out_root.into(),
            cwd: std::env::current_dir().unwrap_or_default(),
        }
    }

    pub fn with_base_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn out_root(&self) -> &Path {
        &self.out_root
    }

    /// Copies the attachment below `static_dir` (output-root relative) and links
    /// it from `page`. `None` only when the node names no file at all.
    pub fn materialize(
        &self,
        attachment: &TypedNode<AttachmentFields>,
        static_dir: &str,
        page: &PageLocation,
    ) -> Option<AttachmentMeta> {
        let node = &attachment.node;
        let raw = attachment
            .fields
            .filepath
            .as_deref()
            .or_else(|| node.text("filepath"))
            .unwrap_or("")
            .trim();
        if raw.is_empty() {
            debug!(id = %node.id, "attachment without filepath");
            return None;
        }

        let src = Path::new(raw);
        let src = if src.is_absolute() {
            src.to_path_buf()
        } else {
            self.cwd.join(src)
        };
        let filename = src
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw.to_string());

        let doc_path = match self.copy_into(&src, static_dir, &filename) {
            Some(()) => format!("{}{}/{}", page.static_prefix(), static_dir, filename),
            None => fallback_link(raw, page),
        };

        Some(AttachmentMeta {
            is_image: is_image(&src),
            description: attachment
                .fields
                .description
                .clone()
                .or_else(|| node.text("description").map(str::to_string)),
            filename,
            doc_path,
        })
    }

    /// Materializes every attachment, dropping the ones without a file path
    pub fn materialize_all<'a>(
        &self,
        attachments: impl IntoIterator<Item = &'a TypedNode<AttachmentFields>>,
        static_dir: &str,
        page: &PageLocation,
    ) -> Vec<AttachmentMeta> {
        attachments
            .into_iter()
            .filter_map(|a| self.materialize(a, static_dir, page))
            .collect()
    }

    fn copy_into(&self, src: &Path, static_dir: &str, filename: &str) -> Option<()> {
        if !src.is_file() {
            warn!(path = %src.display(), "attachment file not found, linking original path");
            return None;
        }
        let dest_dir = self.out_root.join(static_dir);
        let dest = dest_dir.join(filename);
        let copied = std::fs::create_dir_all(&dest_dir).and_then(|_| std::fs::copy(src, &dest));
        match copied {
            Ok(_) => {
                debug!(from = %src.display(), to = %dest.display(), "attachment copied");
                Some(())
            }
            Err(e) => {
                warn!(path = %src.display(), "attachment copy failed, linking original path: {}", e);
                None
            }
        }
    }
}

/// Link to the original file: absolute and `..`-relative paths are kept,
/// other relative paths are prefixed so they resolve from the page folder
fn fallback_link(raw: &str, page: &PageLocation) -> String {
    if Path::new(raw).is_absolute() || raw.starts_with("..") {
        raw.replace('\\', "/")
    } else {
        format!("{}{}", page.static_prefix(), raw.replace('\\', "/"))
    }
}
