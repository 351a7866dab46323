use std::path::Path;

use tera::{Context, Tera};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub const MODULE: &str = "module.html";
pub const GUIDE: &str = "guide.html";
pub const FIXED_MODULE: &str = "fixed_module.html";
pub const INDEX: &str = "index.html";
pub const FEED_PAGE: &str = "feed.html";
pub const FEED: &str = "feed.xml";
pub const INFO_PLIST: &str = "Info.plist";
pub const DOCSET_JSON: &str = "docset.json";

pub const STYLE_CSS: &str = include_str!("../templates/style.css");

const BUILTIN: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    (MODULE, include_str!("../templates/module.html")),
    (GUIDE, include_str!("../templates/guide.html")),
    (FIXED_MODULE, include_str!("../templates/fixed_module.html")),
    (INDEX, include_str!("../templates/index.html")),
    (FEED_PAGE, include_str!("../templates/feed.html")),
    (FEED, include_str!("../templates/feed.xml")),
    (INFO_PLIST, include_str!("../templates/Info.plist")),
    (DOCSET_JSON, include_str!("../templates/docset.json")),
];

pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Built-in templates only
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN.iter().copied())?;
        Ok(Self { tera })
    }

    /// Built-in templates, with any same-named file in `theme_dir` taking
    /// precedence
    pub fn with_theme<P: AsRef<Path>>(theme_dir: P) -> Result<Self, TemplateError> {
        let mut renderer = Self::new()?;
        let theme_dir = theme_dir.as_ref();
        if !theme_dir.is_dir() {
            return Ok(renderer);
        }

        let mut overrides = Vec::new();
        for entry in WalkDir::new(theme_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if renderer.has_template(&name) {
                overrides.push((name, std::fs::read_to_string(entry.path())?));
            }
        }
        if !overrides.is_empty() {
            tracing::debug!("Theme overrides {} template(s)", overrides.len());
            renderer.tera.add_raw_templates(overrides)?;
        }

        Ok(renderer)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(template, context)?)
    }

    /// Render a template and write it directly to a file
    pub fn render_to_file(
        &self,
        template: &str,
        context: &Context,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        let rendered = self.render(template, context)?;

        // Ensure parent directory exists
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(output_path, rendered)?;
        Ok(())
    }
}
