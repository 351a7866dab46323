use futures::future::try_join_all;
use tracing::info;

use crate::anchors::dash_anchor;
use crate::config::GuidesConfig;
use crate::markdown::{render_markdown, split_front_matter};
use crate::remote::{CollectError, ContentEntry, RemoteClient, RepoLocation};
use crate::renderer::{RenderContext, Renderer};
use crate::site::{Documentation, EntryKind, IndexEntry, SourceDocument};
use crate::template;

/// Fetch every guide of the configured repository directory and render the
/// guide pages.
pub async fn collect_guides(
    client: &RemoteClient,
    config: &GuidesConfig,
    renderer: &Renderer,
) -> Result<Documentation, CollectError> {
    if !config.enabled {
        return Ok(Documentation::default());
    }

    let location = RepoLocation {
        api_url: config.api_url.clone(),
        owner: config.owner.clone(),
        repo: config.repo.clone(),
    };
    info!("Fetching guides from {}/{}/{}", config.owner, config.repo, config.path);

    let listing = client.list_directory(&location, &config.path).await?;
    let wanted: Vec<ContentEntry> = listing
        .into_iter()
        .filter(|e| is_guide_file(&e.name, &config.guides_to_remove))
        .collect();

    let location = &location;
    let guides = try_join_all(wanted.iter().map(|entry| async move {
        let markdown = client.file_contents(location, &entry.path).await?;
        Ok::<_, CollectError>(parse_guide(guide_name(&entry.name), &markdown))
    }))
    .await?;
    info!("Fetched {} guides", guides.len());

    Ok(guides_documentation(guides, renderer)?)
}

fn is_guide_file(file_name: &str, guides_to_remove: &[String]) -> bool {
    file_name.ends_with(".md") && !guides_to_remove.iter().any(|g| file_name == format!("{g}.md"))
}

fn guide_name(file_name: &str) -> &str {
    file_name.strip_suffix(".md").unwrap_or(file_name)
}

/// A guide document before the page template is applied. Guides without an
/// `order` sort last; guides without a `pagetitle` use their file name.
pub fn parse_guide(name: &str, markdown: &str) -> SourceDocument {
    let (meta, body) = split_front_matter(markdown);
    SourceDocument {
        name: name.to_string(),
        html: render_markdown(body),
        toc: Vec::new(),
        title: meta.pagetitle.unwrap_or_else(|| name.to_string()),
        order: meta.order.unwrap_or(i64::MAX),
        version: None,
        description: None,
    }
}

/// Sort guides, give each a `Guide` entry and render its page
pub fn guides_documentation(
    mut guides: Vec<SourceDocument>,
    renderer: &Renderer,
) -> Result<Documentation, template::TemplateError> {
    guides.sort_by_key(|g| g.order);

    let mut entries = Vec::with_capacity(guides.len());
    for guide in &mut guides {
        let entry = IndexEntry::new(&guide.title, EntryKind::Guide, "", &guide.name);
        guide.html = format!("{}{}", dash_anchor(&entry), guide.html);

        let mut context = RenderContext::new();
        context.add_to_context("guide", &*guide);
        guide.html = renderer.render(template::GUIDE, &context)?;

        entries.push(entry);
    }

    Ok(Documentation {
        pages: guides,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateRenderer;

    #[test]
    fn test_guide_file_filter() {
        let remove = vec!["index".to_string()];
        assert!(is_guide_file("intro.md", &remove));
        assert!(!is_guide_file("index.md", &remove));
        assert!(!is_guide_file("image.png", &remove));
        assert_eq!(guide_name("intro.md"), "intro");
    }

    #[test]
    fn test_guides_sorted_and_indexed() {
        let renderer = Renderer::new(TemplateRenderer::new().unwrap());
        let guides = vec![
            parse_guide("second", "---\npagetitle: Second\norder: 2\n---\nTwo"),
            parse_guide("untitled", "No front matter"),
            parse_guide("first", "---\npagetitle: First\norder: 1\n---\nOne"),
        ];

        let docs = guides_documentation(guides, &renderer).unwrap();
        let names: Vec<&str> = docs.pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "untitled"]);

        assert_eq!(
            docs.entries[0],
            IndexEntry::new("First", EntryKind::Guide, "", "first")
        );
        assert_eq!(docs.entries[2].name, "untitled");
        assert!(docs.pages[0]
            .html
            .contains(r#"<a name="//apple_ref/cpp/Guide/First" class="dashAnchor"></a>"#));
        assert!(docs.pages[0].html.contains("<h1>First</h1>"));
    }

    #[tokio::test]
    async fn test_disabled_guides_skip_the_network() {
        let renderer = Renderer::new(TemplateRenderer::new().unwrap());
        let client = RemoteClient::new("dashgen-test").unwrap();
        let config = GuidesConfig {
            enabled: false,
            api_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        };

        let docs = collect_guides(&client, &config, &renderer).await.unwrap();
        assert!(docs.pages.is_empty());
        assert!(docs.entries.is_empty());
    }
}
