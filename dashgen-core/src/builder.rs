use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::anchors::encode_uri_component;
use crate::archive::write_tarball;
use crate::config::Config;
use crate::index_db::write_search_index;
use crate::links::{LinkAudit, LinkRewriter};
use crate::remote::CollectError;
use crate::renderer::{RenderContext, Renderer};
use crate::site::{Documentation, EntryKind, IndexEntry, SourceDocument};
use crate::template::{self, TemplateError, TemplateRenderer};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Search index error: {0}")]
    SearchIndex(#[from] rusqlite::Error),

    #[error("Invalid audit pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Collect error: {0}")]
    Collect(#[from] CollectError),
}

/// Everything the collectors produced, merged
#[derive(Debug, Default)]
pub struct Bundle {
    pub pages: Vec<SourceDocument>,
    pub entries: Vec<IndexEntry>,
    /// Pages other pages may link to by module name
    pub module_names: Vec<String>,
    pub guide_names: Vec<String>,
}

impl Bundle {
    /// Guides first, then registry modules, then the rest
    pub fn aggregate(
        guides: Documentation,
        modules: Documentation,
        others: impl IntoIterator<Item = Documentation>,
    ) -> Self {
        let guide_names = guides.pages.iter().map(|p| p.name.clone()).collect();
        let module_names = modules.pages.iter().map(|p| p.name.clone()).collect();

        let mut bundle = Bundle {
            module_names,
            guide_names,
            ..Default::default()
        };
        for docs in [guides, modules].into_iter().chain(others) {
            bundle.pages.extend(docs.pages);
            bundle.entries.extend(docs.entries);
        }
        bundle
    }
}

#[derive(Debug, Serialize)]
struct EntryGroup<'a> {
    kind: EntryKind,
    entries: Vec<&'a IndexEntry>,
}

fn group_entries(entries: &[IndexEntry]) -> Vec<EntryGroup<'_>> {
    let mut groups: BTreeMap<EntryKind, Vec<&IndexEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.kind).or_default().push(entry);
    }
    groups
        .into_iter()
        .map(|(kind, entries)| EntryGroup { kind, entries })
        .collect()
}

/// Where every artifact of a build goes
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    name: String,
}

impl OutputLayout {
    pub fn new<P: AsRef<Path>>(root: P, name: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            name: name.to_string(),
        }
    }

    pub fn docset_dir(&self) -> PathBuf {
        self.root.join(format!("{}.docset", self.name))
    }

    pub fn contents_dir(&self) -> PathBuf {
        self.docset_dir().join("Contents")
    }

    pub fn search_index(&self) -> PathBuf {
        self.contents_dir().join("Resources/docSet.dsidx")
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.contents_dir().join("Resources/Documents")
    }

    pub fn feed_dir(&self) -> PathBuf {
        self.root.join("feed")
    }

    pub fn contribution_dir(&self) -> PathBuf {
        self.root.join("user-contribution")
    }

    pub fn tarball_name(&self) -> String {
        format!("{}.tgz", self.name)
    }
}

/// Summary of a finished build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub entries: usize,
    pub indexed: usize,
    pub suspicious_links: usize,
}

pub struct DocsetBuilder {
    output_dir: PathBuf,
    theme_dir: Option<PathBuf>,
    timestamp: Option<DateTime<Local>>,
}

impl Default for DocsetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocsetBuilder {
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from("./build"),
            theme_dir: None,
            timestamp: None,
        }
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn theme_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.theme_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Fix the build time used for the docset version
    pub fn timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn build(self, config: Config) -> Result<Docset, BuildError> {
        let templates = match &self.theme_dir {
            Some(dir) => TemplateRenderer::with_theme(dir)?,
            None => TemplateRenderer::new()?,
        };
        let mut renderer = Renderer::new(templates);
        renderer.set_global_context("docset_name", &config.docset.name);

        let timestamp = self.timestamp.unwrap_or_else(Local::now);
        let version = docset_version(&timestamp);

        Ok(Docset {
            layout: OutputLayout::new(&self.output_dir, &config.docset.name),
            theme_dir: self.theme_dir,
            renderer,
            version,
            config,
        })
    }
}

/// `2024-05-01/2024-05-01_13:45:00`
pub fn docset_version(timestamp: &DateTime<Local>) -> String {
    format!(
        "{}/{}",
        timestamp.format("%Y-%m-%d"),
        timestamp.format("%Y-%m-%d_%H:%M:%S")
    )
}

pub struct Docset {
    config: Config,
    layout: OutputLayout,
    theme_dir: Option<PathBuf>,
    renderer: Renderer,
    version: String,
}

impl Docset {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Template renderer the collectors render pages with
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Remove what a previous run left behind
    pub fn clean(&self) -> Result<(), BuildError> {
        for dir in [
            self.layout.docset_dir(),
            self.layout.feed_dir(),
            self.layout.contribution_dir(),
        ] {
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
        }
        Ok(())
    }

    /// Write the docset, feed and contribution directory for a bundle
    pub fn write(&self, bundle: &Bundle) -> Result<BuildReport, BuildError> {
        self.clean()?;
        let documents = self.layout.documents_dir();
        std::fs::create_dir_all(&documents)?;

        self.write_static_files()?;
        self.write_info_plist()?;

        let rewriter = LinkRewriter::new(
            &self.config.links,
            &bundle.module_names,
            &bundle.guide_names,
        );
        for page in &bundle.pages {
            std::fs::write(documents.join(page.file_name()), rewriter.rewrite(&page.html))?;
        }
        info!("Wrote {} pages", bundle.pages.len());

        let indexed = write_search_index(&self.layout.search_index(), &bundle.entries)?;
        info!("Indexed {} of {} entries", indexed, bundle.entries.len());

        let mut context = RenderContext::new();
        context.add_to_context("groups", &group_entries(&bundle.entries));
        self.renderer
            .render_to_file(template::INDEX, &context, &documents.join("index.html"))?;

        self.write_feed()?;
        self.write_contribution()?;

        let suspicious_links = LinkAudit::new(&self.config.audit)?.report(&bundle.pages);

        Ok(BuildReport {
            pages: bundle.pages.len(),
            entries: bundle.entries.len(),
            indexed,
            suspicious_links,
        })
    }

    fn write_static_files(&self) -> Result<(), BuildError> {
        let style = self
            .theme_dir
            .as_ref()
            .map(|dir| dir.join("style.css"))
            .filter(|p| p.is_file());
        let target = self.layout.documents_dir().join("style.css");
        match style {
            Some(path) => {
                std::fs::copy(path, target)?;
            }
            None => std::fs::write(target, template::STYLE_CSS)?,
        }

        copy_icon(
            self.config.docset.icon.as_deref(),
            &self.layout.docset_dir().join("icon.png"),
        )?;
        Ok(())
    }

    fn write_info_plist(&self) -> Result<(), BuildError> {
        let mut context = RenderContext::new();
        context.add_to_context("id", &self.config.docset.id);
        context.add_to_context("name", &self.config.docset.name);
        context.add_to_context("family", &self.config.docset.id);
        self.renderer.render_to_file(
            template::INFO_PLIST,
            &context,
            &self.layout.contents_dir().join("Info.plist"),
        )?;
        Ok(())
    }

    fn feed_base_url(&self) -> &str {
        self.config.docset.feed_base_url.trim_end_matches('/')
    }

    fn write_feed(&self) -> Result<(), BuildError> {
        let name = &self.config.docset.name;
        let feed_dir = self.layout.feed_dir();

        let mut context = RenderContext::new();
        context.add_to_context("version", &self.version);
        context.add_to_context(
            "url",
            &format!("{}/{}", self.feed_base_url(), self.layout.tarball_name()),
        );
        self.renderer
            .render_to_file(template::FEED, &context, &feed_dir.join(format!("{name}.xml")))?;

        let mut context = RenderContext::new();
        let feed_url = format!("{}/{name}.xml", self.feed_base_url());
        context.add_to_context("feed", &format!("dash-feed://{}", encode_uri_component(&feed_url)));
        context.add_to_context("name", name);
        self.renderer.render_to_file(
            template::FEED_PAGE,
            &context,
            &feed_dir.join(format!("{name}.html")),
        )?;

        write_tarball(
            &self.layout.docset_dir(),
            &feed_dir.join(self.layout.tarball_name()),
        )?;
        Ok(())
    }

    fn write_contribution(&self) -> Result<(), BuildError> {
        let docset = &self.config.docset;
        let dir = self.layout.contribution_dir();

        let mut context = RenderContext::new();
        context.add_to_context("name", &docset.name);
        context.add_to_context("version", &self.version);
        context.add_to_context("archive", &self.layout.tarball_name());
        context.add_to_context("author", &docset.author);
        context.add_to_context("author_link", &docset.author_link);
        self.renderer
            .render_to_file(template::DOCSET_JSON, &context, &dir.join("docset.json"))?;

        copy_icon(docset.icon.as_deref(), &dir.join("icon.png"))?;
        copy_icon(docset.icon_2x.as_deref(), &dir.join("icon@2x.png"))?;

        write_tarball(&self.layout.docset_dir(), &dir.join(self.layout.tarball_name()))?;
        Ok(())
    }
}

fn copy_icon(source: Option<&Path>, target: &Path) -> Result<(), BuildError> {
    let Some(source) = source else {
        return Ok(());
    };
    if !source.is_file() {
        warn!("Icon {} not found, skipping", source.display());
        return Ok(());
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, target)?;
    Ok(())
}
