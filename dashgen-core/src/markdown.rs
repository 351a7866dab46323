use std::collections::HashSet;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use serde::Deserialize;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::site::TocHeading;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "InspiredGitHub";

/// Front matter of a guide
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GuideMeta {
    pub pagetitle: Option<String>,
    pub order: Option<i64>,
}

/// Split a leading `---` delimited YAML block off a markdown document.
/// Documents without one, or with one that doesn't parse, keep their full text.
pub fn split_front_matter(markdown: &str) -> (GuideMeta, &str) {
    let Some(rest) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return (GuideMeta::default(), markdown);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return match serde_yaml::from_str::<GuideMeta>(yaml) {
                Ok(meta) => (meta, body),
                Err(_) => (GuideMeta::default(), markdown),
            };
        }
        offset += line.len();
    }

    (GuideMeta::default(), markdown)
}

/// Markdown to HTML with highlighted fenced code blocks
pub fn render_markdown(markdown: &str) -> String {
    let events: Vec<Event> = Parser::new_ext(markdown, Options::all()).collect();
    let mut out = String::new();
    html::push_html(&mut out, highlight_code_blocks(events).into_iter());
    out
}

/// A README rendered for a module page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReadme {
    pub html: String,
    pub toc: Vec<TocHeading>,
    /// Text of the first level-1 heading
    pub title: Option<String>,
}

/// Render a README, dropping the named sections and putting a named anchor
/// `<module>-<slug>` in front of every remaining heading.
pub fn render_readme(module: &str, markdown: &str, sections_to_remove: &[String]) -> RenderedReadme {
    let remove: Vec<String> = sections_to_remove
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();

    let events: Vec<Event> = Parser::new_ext(markdown, Options::all()).collect();
    let mut processed = Vec::with_capacity(events.len());
    let mut toc = Vec::new();
    let mut title = None;
    let mut used_slugs: HashSet<String> = HashSet::new();
    let mut skipping: Option<HeadingLevel> = None;

    let mut i = 0;
    while i < events.len() {
        let Event::Start(Tag::Heading { level, .. }) = &events[i] else {
            if skipping.is_none() {
                processed.push(events[i].clone());
            }
            i += 1;
            continue;
        };
        let level = *level;

        let start = i;
        let mut end = i + 1;
        while end < events.len() && !matches!(events[end], Event::End(TagEnd::Heading(_))) {
            end += 1;
        }
        let inner = &events[start + 1..end.min(events.len())];
        let text = plain_text(inner);

        if let Some(skipped_level) = skipping {
            if level > skipped_level {
                i = end + 1;
                continue;
            }
            skipping = None;
        }
        if remove.contains(&text.trim().to_lowercase()) {
            skipping = Some(level);
            i = end + 1;
            continue;
        }

        let link_text = unique_slug(&mut used_slugs, &format!("{module}-{}", slugify(&text)));
        let mut inner_html = String::new();
        html::push_html(&mut inner_html, inner.iter().cloned());

        if level == HeadingLevel::H1 && title.is_none() {
            title = Some(text.trim().to_string());
        }
        toc.push(TocHeading {
            depth: level as u32,
            text: inner_html,
            link_text: link_text.clone(),
        });

        processed.push(Event::Html(format!("<a name=\"{link_text}\"></a>\n").into()));
        processed.extend(events[start..(end + 1).min(events.len())].iter().cloned());
        i = end + 1;
    }

    let mut out = String::new();
    html::push_html(&mut out, highlight_code_blocks(processed).into_iter());

    RenderedReadme {
        html: out,
        toc,
        title,
    }
}

fn highlight_code_blocks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut processed_events = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        let kind = match event {
            Event::Start(Tag::CodeBlock(kind)) => kind,
            other => {
                processed_events.push(other);
                continue;
            }
        };

        // Collect all text events until the end of the code block
        let mut code_content = String::new();
        for inner in iter.by_ref() {
            match inner {
                Event::End(TagEnd::CodeBlock) => break,
                Event::Text(text) => code_content.push_str(&text),
                _ => {}
            }
        }

        let lang = match &kind {
            CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or(""),
            CodeBlockKind::Indented => "",
        };
        processed_events.push(Event::Html(highlight(&code_content, lang).into()));
    }

    processed_events
}

fn highlight(code: &str, lang: &str) -> String {
    let plain = || format!("<pre><code>{}</code></pre>\n", html_escape::encode_text(code));
    if lang.is_empty() {
        return plain();
    }

    let syntax = SYNTAX_SET.find_syntax_by_token(lang).or_else(|| match lang {
        "json" => SYNTAX_SET.find_syntax_by_name("JavaScript"),
        "jade" | "pug" => SYNTAX_SET.find_syntax_by_name("HTML"),
        _ => None,
    });

    match (syntax, THEME_SET.themes.get(CODE_THEME)) {
        (Some(syntax), Some(theme)) => {
            highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme).unwrap_or_else(|_| plain())
        }
        _ => plain(),
    }
}

fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// `slug`, or `slug-N` with the smallest N not yet handed out on this page.
/// Every returned slug is recorded, including generated ones.
fn unique_slug(used: &mut HashSet<String>, slug: &str) -> String {
    let mut unique = slug.to_string();
    let mut n = 0;
    while used.contains(&unique) {
        n += 1;
        unique = format!("{slug}-{n}");
    }
    used.insert(unique.clone());
    unique
}
