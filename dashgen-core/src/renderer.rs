use std::path::Path;

use serde::Serialize;
use tera::Context;

use crate::template::{TemplateError, TemplateRenderer};

/// Per-page template values
#[derive(Default)]
pub struct RenderContext {
    context: Context,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_context<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }
}

/// Templates plus values shared by every page of the docset
pub struct Renderer {
    templates: TemplateRenderer,
    global: Context,
}

impl Renderer {
    pub fn new(templates: TemplateRenderer) -> Self {
        Self {
            templates,
            global: Context::new(),
        }
    }

    pub fn set_global_context<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.global.insert(key, value);
    }

    fn merged(&self, page: &RenderContext) -> Context {
        let mut context = self.global.clone();
        context.extend(page.context.clone());
        context
    }

    pub fn render(&self, template: &str, page: &RenderContext) -> Result<String, TemplateError> {
        self.templates.render(template, &self.merged(page))
    }

    pub fn render_to_file(
        &self,
        template: &str,
        page: &RenderContext,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        self.templates
            .render_to_file(template, &self.merged(page), output_path)
    }
}
