use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::{AuditConfig, LinksConfig};
use crate::site::SourceDocument;

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).unwrap());

/// Rewrites links to known modules and guides into links between the
/// generated pages.
pub struct LinkRewriter {
    /// (from, to) pairs, applied in order
    replacements: Vec<(String, String)>,
}

impl LinkRewriter {
    pub fn new<M, G>(config: &LinksConfig, modules: M, guides: G) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        let mut replacements = Vec::new();

        // `foo` must not touch the links of `foo-bar`
        for module in longest_first(modules) {
            let page = format!("href=\"{module}.html\"");
            let fragment = format!("href=\"{module}.html#{module}-");

            replacements.push((format!("href=\"#{module}\""), page.clone()));

            let mut docs_roots = vec![format!("/{}", config.docs_path)];
            for site in &config.site_urls {
                docs_roots.push(format!("{}/{}", site.trim_end_matches('/'), config.docs_path));
            }
            for root in docs_roots {
                for sep in ["#", "/#"] {
                    replacements.push((format!("href=\"{root}{sep}{module}\""), page.clone()));
                    replacements.push((format!("href=\"{root}{sep}{module}-"), fragment.clone()));
                }
            }

            for repo in &config.repo_urls {
                replacements.push((
                    format!("href=\"{}/{module}\"", repo.trim_end_matches('/')),
                    page.clone(),
                ));
            }
        }

        for guide in longest_first(guides) {
            let page = format!("href=\"{guide}.html\"");
            for site in &config.site_urls {
                let learn = format!("{}/{}/{guide}", site.trim_end_matches('/'), config.learn_path);
                replacements.push((format!("href=\"{learn}/\""), page.clone()));
                replacements.push((format!("href=\"{learn}\""), page.clone()));
            }
        }

        Self { replacements }
    }

    pub fn rewrite(&self, html: &str) -> String {
        let mut html = html.to_string();
        for (from, to) in &self.replacements {
            if html.contains(from.as_str()) {
                html = html.replace(from.as_str(), to);
            }
        }
        html
    }
}

fn longest_first<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    names.dedup();
    names
}

/// Every `href` of an anchor tag, in document order
pub fn extract_links(html: &str) -> Vec<String> {
    HREF.captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Outbound links that probably should have pointed into the docset.
pub struct LinkAudit {
    watch: Regex,
    ignore: Vec<Regex>,
}

impl LinkAudit {
    pub fn new(config: &AuditConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            watch: Regex::new(&config.watch_pattern)?,
            ignore: config
                .ignore_patterns
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Sorted, lowercased, de-duplicated suspicious links over all pages
    pub fn suspicious_links(&self, pages: &[SourceDocument]) -> Vec<String> {
        let links: BTreeSet<String> = pages
            .iter()
            .flat_map(|p| extract_links(&p.html))
            .map(|l| l.to_lowercase())
            .filter(|l| self.watch.is_match(l) && !self.ignore.iter().any(|i| i.is_match(l)))
            .collect();
        links.into_iter().collect()
    }

    /// Log suspicious links. Never fails.
    pub fn report(&self, pages: &[SourceDocument]) -> usize {
        let links = self.suspicious_links(pages);
        if !links.is_empty() {
            warn!("External links found:");
            for link in &links {
                warn!("- {}", link);
            }
        }
        links.len()
    }
}
