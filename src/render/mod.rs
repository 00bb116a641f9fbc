//! Document rendering
//!
//! The assemblers only produce `RenderRequest`s; a `DocumentRenderer` turns
//! them into files below an output root.

mod hbs;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::RenderError;
use crate::pages::RenderRequest;

pub use hbs::HandlebarsRenderer;

pub trait DocumentRenderer: Send + Sync {
    /// Renders `request` below `root` and returns the written path
    fn render(&self, request: &RenderRequest, root: &Path) -> Result<PathBuf, RenderError>;
}

/// Keeps requests in memory instead of writing them (dry runs, tests)
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    requests: Mutex<Vec<RenderRequest>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.requests().into_iter().map(|r| r.output).collect()
    }
}

impl DocumentRenderer for RecordingRenderer {
    fn render(&self, request: &RenderRequest, root: &Path) -> Result<PathBuf, RenderError> {
        let mut requests = self
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        requests.push(request.clone());
        Ok(root.join(&request.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recording_renderer_keeps_requests() {
        let renderer = RecordingRenderer::new();
        let request = RenderRequest::new("project/index.rst", &json!({"title": "X"}), "project/index.rst")
            .unwrap();
        let path = renderer.render(&request, Path::new("/out")).unwrap();

        assert_eq!(path, PathBuf::from("/out/project/index.rst"));
        assert_eq!(renderer.outputs(), vec![PathBuf::from("project/index.rst")]);
    }
}
