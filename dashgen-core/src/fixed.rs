use serde::Serialize;

use crate::anchors::dash_anchor;
use crate::classify::camelize;
use crate::config::FixedModule;
use crate::markdown::render_markdown;
use crate::renderer::{RenderContext, Renderer};
use crate::site::{Documentation, EntryKind, IndexEntry, SourceDocument};
use crate::template::{self, TemplateError};

#[derive(Serialize)]
struct FunctionView<'a> {
    name: &'a str,
    camel_case_name: String,
    signature: Option<&'a str>,
    description_html: String,
    dash_anchor: String,
}

/// A single page listing the functions of a configured module
pub fn collect_fixed_module(
    module: &FixedModule,
    renderer: &Renderer,
) -> Result<Documentation, TemplateError> {
    let mut entries = vec![IndexEntry::new(&module.name, EntryKind::Module, "", &module.name)];
    let mut functions = Vec::with_capacity(module.functions.len());

    for function in &module.functions {
        let entry = IndexEntry::new(
            camelize(&function.name),
            EntryKind::Function,
            &function.name,
            &module.name,
        );
        functions.push(FunctionView {
            name: &function.name,
            camel_case_name: entry.name.clone(),
            signature: function.signature.as_deref(),
            description_html: render_markdown(&function.description),
            dash_anchor: dash_anchor(&entry),
        });
        entries.push(entry);
    }

    let title = module.title.clone().unwrap_or_else(|| module.name.clone());
    let mut page = SourceDocument {
        name: module.name.clone(),
        title,
        description: Some(module.description.clone()).filter(|d| !d.is_empty()),
        ..Default::default()
    };

    let mut context = RenderContext::new();
    context.add_to_context("module", &page);
    context.add_to_context("functions", &functions);
    page.html = renderer.render(template::FIXED_MODULE, &context)?;

    Ok(Documentation {
        pages: vec![page],
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedFunction;
    use crate::template::TemplateRenderer;

    #[test]
    fn test_function_entries_and_anchors() {
        let module = FixedModule {
            name: "amp".into(),
            title: None,
            description: "Small utilities".into(),
            functions: vec![
                FixedFunction {
                    name: "is-array".into(),
                    signature: Some("isArray(value)".into()),
                    description: "Checks for an *array*.".into(),
                },
                FixedFunction {
                    name: "escape".into(),
                    signature: None,
                    description: String::new(),
                },
            ],
        };
        let renderer = Renderer::new(TemplateRenderer::new().unwrap());
        let docs = collect_fixed_module(&module, &renderer).unwrap();

        assert_eq!(
            docs.entries,
            vec![
                IndexEntry::new("amp", EntryKind::Module, "", "amp"),
                IndexEntry::new("isArray", EntryKind::Function, "is-array", "amp"),
                IndexEntry::new("escape", EntryKind::Function, "escape", "amp"),
            ]
        );

        let html = &docs.pages[0].html;
        assert!(html.contains(
            r#"<a name="//apple_ref/cpp/Function/isArray" class="dashAnchor"></a><a name="is-array"></a>"#
        ));
        assert!(html.contains("<em>array</em>"));
        assert!(html.contains("<h1>amp</h1>"));
    }
}
