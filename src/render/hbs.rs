//! Handlebars renderer with built-in templates for every page key

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde_json::Value;
use tracing::{debug, info};

use super::DocumentRenderer;
use crate::error::RenderError;
use crate::pages::{templates, RenderRequest};

const BUILTIN: [(&str, &str); 17] = [
    (
        templates::PROJECT_INDEX,
        include_str!("../../templates/project/index.rst.hbs"),
    ),
    (
        templates::REQUIREMENTS_INDEX,
        include_str!("../../templates/requirements/index.rst.hbs"),
    ),
    (
        templates::REQUIREMENT_GROUP,
        include_str!("../../templates/requirements/group.rst.hbs"),
    ),
    (
        templates::REQUIREMENT_ITEM,
        include_str!("../../templates/requirements/item.rst.hbs"),
    ),
    (
        templates::ARCHITECTURE_INDEX,
        include_str!("../../templates/architecture/index.rst.hbs"),
    ),
    (
        templates::COMPONENT,
        include_str!("../../templates/architecture/component.rst.hbs"),
    ),
    (
        templates::INTERFACE,
        include_str!("../../templates/architecture/interface.rst.hbs"),
    ),
    (
        templates::DATA_STRUCTURE,
        include_str!("../../templates/architecture/data_structure.rst.hbs"),
    ),
    (
        templates::DESIGN_INDEX,
        include_str!("../../templates/design/index.rst.hbs"),
    ),
    (
        templates::UNIT,
        include_str!("../../templates/design/unit.rst.hbs"),
    ),
    (
        templates::UNIT_TESTS_INDEX,
        include_str!("../../templates/unit_tests/index.rst.hbs"),
    ),
    (
        templates::TEST_STRATEGY,
        include_str!("../../templates/unit_tests/strategy.rst.hbs"),
    ),
    (
        templates::TEST_PLAN,
        include_str!("../../templates/unit_tests/plan.rst.hbs"),
    ),
    (
        templates::TEST_CASE,
        include_str!("../../templates/unit_tests/test_case.rst.hbs"),
    ),
    (
        templates::CLASS_DIAGRAM,
        include_str!("../../templates/class_diagram.mmd.hbs"),
    ),
    (
        templates::BLOCK_DIAGRAM_PUML,
        include_str!("../../templates/block_diagram.puml.hbs"),
    ),
    (
        templates::BLOCK_DIAGRAM_MMD,
        include_str!("../../templates/block_diagram.mmd.hbs"),
    ),
];

/// Renders pages with handlebars. Output is plain text, nothing is escaped.
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Create a renderer with the built-in templates
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        // Register helpers
        handlebars.register_helper("underline", Box::new(underline_helper));
        handlebars.register_helper("ident", Box::new(ident_helper));
        handlebars.register_helper("visibility", Box::new(visibility_helper));
        handlebars.register_helper("json", Box::new(json_helper));

        let mut renderer = Self { handlebars };
        for (name, source) in BUILTIN {
            renderer.register_template(name, source)?;
        }
        Ok(renderer)
    }

    /// Built-in templates, replaced by `<key>.hbs` files found in `dir`
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self, RenderError> {
        let mut renderer = Self::new()?;
        if let Some(dir) = dir {
            renderer.load_overrides(dir)?;
        }
        Ok(renderer)
    }

    /// Registers every `<key>.hbs` present below `dir`; missing files keep the
    /// built-in template. Returns the number of overridden keys.
    pub fn load_overrides(&mut self, dir: &Path) -> Result<usize, RenderError> {
        let mut count = 0;
        for name in templates::ALL {
            let path = dir.join(format!("{}.hbs", name));
            if !path.is_file() {
                continue;
            }
            let source = fs::read_to_string(&path).map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;
            self.register_template(name, &source)?;
            debug!(template = name, path = %path.display(), "template overridden");
            count += 1;
        }
        if count > 0 {
            info!("Loaded {} template overrides from {}", count, dir.display());
        }
        Ok(count)
    }

    pub fn register_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.handlebars
            .register_template_string(name, source)
            .map_err(|e| RenderError::Template {
                name: name.to_string(),
                source: Box::new(e),
            })
    }

    pub fn render_to_string(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        if !self.handlebars.has_template(name) {
            return Err(RenderError::UnknownTemplate(name.to_string()));
        }
        self.handlebars
            .render(name, context)
            .map_err(|e| RenderError::Render {
                name: name.to_string(),
                source: Box::new(e),
            })
    }
}

impl DocumentRenderer for HandlebarsRenderer {
    fn render(&self, request: &RenderRequest, root: &Path) -> Result<PathBuf, RenderError> {
        let text = self.render_to_string(&request.template, &request.context)?;
        let path = root.join(&request.output);
        let io_err = |source| RenderError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        {
            let file = File::create(&path).map_err(io_err)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(text.as_bytes()).map_err(io_err)?;
            writer.flush().map_err(io_err)?;
        }
        debug!(template = %request.template, path = %path.display(), "page written");
        Ok(path)
    }
}

// Handlebars helpers

/// `{{underline title "="}}`: a line of the given character as wide as the title
fn underline_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let text = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    let mark = h.param(1).and_then(|v| v.value().as_str()).unwrap_or("=");
    out.write(&mark.repeat(text.chars().count().max(1)))?;
    Ok(())
}

/// Diagram identifier: everything but ASCII alphanumerics becomes `_`
fn ident_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(&ident(param))?;
    Ok(())
}

fn visibility_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    let param = h.param(0).and_then(|v| v.value().as_str()).unwrap_or("");
    out.write(visibility(param))?;
    Ok(())
}

fn json_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    if let Some(v) = h.param(0) {
        out.write(&serde_json::to_string(v.value()).unwrap_or_default())?;
    }
    Ok(())
}

pub(crate) fn ident(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// UML visibility marker for a scope name
pub(crate) fn visibility(scope: &str) -> &'static str {
    match scope.trim().to_ascii_lowercase().as_str() {
        "public" => "+",
        "private" => "-",
        "protected" => "#",
        "package" => "~",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(name: &str, context: Value) -> String {
        HandlebarsRenderer::new()
            .unwrap()
            .render_to_string(name, &context)
            .unwrap()
    }

    #[test]
    fn test_all_builtin_templates_registered() {
        let renderer = HandlebarsRenderer::new().unwrap();
        for name in templates::ALL {
            assert!(renderer.handlebars.has_template(name), "missing {}", name);
        }
    }

    #[test]
    fn test_unknown_template() {
        let renderer = HandlebarsRenderer::new().unwrap();
        let err = renderer.render_to_string("nope.rst", &json!({})).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate(ref n) if n == "nope.rst"));
    }

    #[test]
    fn test_project_page_title_is_underlined_and_not_escaped() {
        let text = render(
            templates::PROJECT_INDEX,
            json!({"title": "Brake & Co", "description": "a < b"}),
        );
        assert!(text.starts_with("Brake & Co\n==========\n"));
        assert!(text.contains("a < b"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(ident("u-1.a b"), "u_1_a_b");
        assert_eq!(visibility("Private"), "-");
        assert_eq!(visibility("package"), "~");
        assert_eq!(visibility(""), "");
    }

    #[test]
    fn test_class_diagram_arrows() {
        let text = render(
            templates::CLASS_DIAGRAM,
            json!({
                "main_class": {"label": "Brake", "id": "u1", "attributes": [
                    {"name": "force", "type": "force_t", "scope": "private", "multiplicity": null}
                ], "methods": []},
                "classes": [{"label": "Wheel", "id": "u2", "attributes": [], "methods": []}],
                "associations": [], "dependencies": [], "aggregations": [],
                "compositions": [{"id": "u2", "origin_multiplicity": "1", "target_multiplicity": "*"}],
                "realizations": [], "generalizations": [{"id": null}]
            }),
        );
        assert!(text.contains("class u1[\"Brake\"]"));
        assert!(text.contains("u1 : -force_t force"));
        assert!(text.contains("u1 \"1\" *-- \"*\" u2"));
        assert!(!text.contains("--|>"));
    }

    #[test]
    fn test_block_diagram_wires_endpoints() {
        let text = render(
            templates::BLOCK_DIAGRAM_PUML,
            json!({
                "components": [{"label": "Engine", "id": "c-1"}],
                "interfaces": [{"label": "Drive", "id": "i1", "provided_by": ["c-1"], "required_by": ["c2"]}]
            }),
        );
        assert!(text.starts_with("@startuml\n"));
        assert!(text.contains("component \"Engine\" as c_1"));
        assert!(text.contains("c_1 -- i1"));
        assert!(text.contains("c2 ..> i1 : requires"));
    }

    #[test]
    fn test_render_writes_nested_output() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = HandlebarsRenderer::new().unwrap();
        let request = RenderRequest::new(
            templates::TEST_CASE,
            &json!({"title": "TC 1", "steps": ["press", "hold"]}),
            "unit_tests/cases/TC-1.rst",
        )
        .unwrap();

        let path = renderer.render(&request, dir.path()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(path, dir.path().join("unit_tests/cases/TC-1.rst"));
        assert!(text.contains("#. press\n#. hold\n"));
    }

    #[test]
    fn test_overrides_replace_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("project")).unwrap();
        fs::write(dir.path().join("project/index.rst.hbs"), "custom {{title}}").unwrap();

        let renderer = HandlebarsRenderer::with_overrides(Some(dir.path())).unwrap();
        let text = renderer
            .render_to_string(templates::PROJECT_INDEX, &json!({"title": "X"}))
            .unwrap();
        assert_eq!(text, "custom X");
    }

    #[test]
    fn test_broken_override_is_a_template_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("class_diagram.mmd.hbs"), "{{#each}").unwrap();
        let err = HandlebarsRenderer::with_overrides(Some(dir.path()))
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::Template { .. }));
    }
}
