pub mod anchors;
pub mod archive;
pub mod builder;
pub mod classify;
pub mod config;
pub mod fixed;
pub mod guides;
pub mod index_db;
pub mod links;
pub mod markdown;
pub mod modules;
pub mod remote;
pub mod renderer;
pub mod site;
pub mod template;

use std::path::Path;

use tracing::info;

// Re-export main types
pub use builder::{BuildError, BuildReport, Bundle, Docset, DocsetBuilder};
pub use classify::{ModuleStyle, toc_to_index_entries};
pub use config::Config;
pub use remote::{CollectError, RemoteClient};
pub use site::{Documentation, EntryKind, IndexEntry, SourceDocument, TocHeading};

/// Run every collector and package the result. Output of a previous run is
/// removed first. Collectors run concurrently; the first failure aborts the
/// build before anything new is written.
pub async fn build_docset(
    config: Config,
    output_dir: &Path,
    theme_dir: Option<&Path>,
) -> Result<BuildReport, BuildError> {
    let mut builder = DocsetBuilder::new().output_dir(output_dir);
    if let Some(theme) = theme_dir {
        builder = builder.theme_dir(theme);
    }
    let docset = builder.build(config)?;
    docset.clean()?;
    let config = docset.config();
    info!("Building {} docset {}", config.docset.name, docset.version());

    let client = RemoteClient::from_env(&config.guides.user_agent)?;
    let (guides, modules) = futures::try_join!(
        guides::collect_guides(&client, &config.guides, docset.renderer()),
        modules::collect_modules(&client, config, docset.renderer()),
    )?;

    let fixed = config
        .fixed_modules
        .iter()
        .map(|module| fixed::collect_fixed_module(module, docset.renderer()))
        .collect::<Result<Vec<_>, _>>()?;

    let bundle = Bundle::aggregate(guides, modules, fixed);
    let report = docset.write(&bundle)?;
    info!(
        "Docset written to {} ({} pages, {} entries)",
        docset.layout().docset_dir().display(),
        report.pages,
        report.entries
    );

    Ok(report)
}
