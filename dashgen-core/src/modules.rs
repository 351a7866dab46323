use futures::future::try_join_all;
use tracing::{debug, info};

use crate::anchors::insert_anchors;
use crate::classify::{ModuleStyle, toc_to_index_entries};
use crate::config::Config;
use crate::markdown::render_readme;
use crate::remote::{CollectError, RegistryPackage, RemoteClient};
use crate::renderer::{RenderContext, Renderer};
use crate::site::{Documentation, IndexEntry, SourceDocument};
use crate::template::{self, TemplateError};

/// Names of every registry module, plain modules first
pub fn module_names(config: &Config) -> Vec<&str> {
    config
        .modules
        .modules
        .iter()
        .chain(&config.modules.class_modules)
        .map(String::as_str)
        .collect()
}

/// Fetch all configured modules from the registry and render their pages
pub async fn collect_modules(
    client: &RemoteClient,
    config: &Config,
    renderer: &Renderer,
) -> Result<Documentation, CollectError> {
    let names = module_names(config);
    info!("Fetching {} modules from {}", names.len(), config.modules.registry_url);

    let packages = try_join_all(
        names
            .iter()
            .map(|name| client.package(&config.modules.registry_url, name)),
    )
    .await?;

    let mut documentation = Documentation::default();
    for package in packages {
        let (page, entries) = module_page(&package, config, renderer)?;
        documentation.pages.push(page);
        documentation.entries.extend(entries);
    }

    Ok(documentation)
}

/// Render one registry package into its page and index entries
pub fn module_page(
    package: &RegistryPackage,
    config: &Config,
    renderer: &Renderer,
) -> Result<(SourceDocument, Vec<IndexEntry>), CollectError> {
    let readme = package
        .readme
        .as_deref()
        .ok_or_else(|| CollectError::MissingReadme(package.name.clone()))?;

    let mut page = readme_document(&package.name, readme, &config.modules.sections_to_remove);
    page.version = package.latest_version().map(str::to_string);
    page.description = package.description.clone();

    let style = ModuleStyle {
        is_class: config.is_class_module(&package.name),
        select_style: config.is_select_style(&package.name),
    };
    let entries = toc_to_index_entries(&package.name, style, &page.toc);
    debug!("{}: {} entries", package.name, entries.len());

    page.html = insert_anchors(&page.html, &entries);
    page.html = render_module(renderer, &page)?;

    Ok((page, entries))
}

/// Classify a single registry module without rendering its page
pub async fn fetch_module_entries(
    client: &RemoteClient,
    config: &Config,
    name: &str,
    style: ModuleStyle,
) -> Result<Vec<IndexEntry>, CollectError> {
    let package = client.package(&config.modules.registry_url, name).await?;
    let readme = package
        .readme
        .as_deref()
        .ok_or_else(|| CollectError::MissingReadme(package.name.clone()))?;
    let rendered = render_readme(name, readme, &config.modules.sections_to_remove);
    Ok(toc_to_index_entries(name, style, &rendered.toc))
}

fn readme_document(name: &str, readme: &str, sections_to_remove: &[String]) -> SourceDocument {
    let rendered = render_readme(name, readme, sections_to_remove);
    SourceDocument {
        name: name.to_string(),
        html: rendered.html,
        toc: rendered.toc,
        title: name.to_string(),
        order: 0,
        version: None,
        description: None,
    }
}

fn render_module(renderer: &Renderer, page: &SourceDocument) -> Result<String, TemplateError> {
    let mut context = RenderContext::new();
    context.add_to_context("module", page);
    renderer.render(template::MODULE, &context)
}
