use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::debug;

use crate::site::IndexEntry;

/// Characters escaped by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static OWNER_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+\.").unwrap());

pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// The marker Dash uses to build a page's table of contents
pub fn dash_anchor(entry: &IndexEntry) -> String {
    let short_name = OWNER_PREFIX.replace(&entry.name, "");
    format!(
        "<a name=\"//apple_ref/cpp/{}/{}\" class=\"dashAnchor\"></a>",
        entry.kind,
        encode_uri_component(&short_name)
    )
}

/// Put a Dash anchor in front of the named anchor each entry points at.
///
/// Entries without an anchor refer to the page itself and are placed at the
/// top. Only the first `<a name="...">` with exactly the entry's anchor is
/// marked; anchors that don't occur are left out.
pub fn insert_anchors(html: &str, entries: &[IndexEntry]) -> String {
    let mut html = html.to_string();
    let mut top = String::new();

    for entry in entries {
        let marker = dash_anchor(entry);
        if entry.anchor.is_empty() {
            top.push_str(&marker);
            continue;
        }

        let needle = format!("<a name=\"{}\"", entry.anchor);
        match html.find(&needle) {
            Some(pos) => html.insert_str(pos, &marker),
            None => debug!("No anchor '{}' for entry {}", entry.anchor, entry.name),
        }
    }

    top.push_str(&html);
    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::EntryKind;

    #[test]
    fn test_dash_anchor_strips_owner() {
        let entry = IndexEntry::new("Model.save", EntryKind::Method, "m-save", "model");
        assert_eq!(
            dash_anchor(&entry),
            r#"<a name="//apple_ref/cpp/Method/save" class="dashAnchor"></a>"#
        );
    }

    #[test]
    fn test_dash_anchor_encodes_name() {
        let entry = IndexEntry::new("Getting started", EntryKind::Guide, "", "start");
        assert_eq!(
            dash_anchor(&entry),
            r#"<a name="//apple_ref/cpp/Guide/Getting%20started" class="dashAnchor"></a>"#
        );
        assert_eq!(encode_uri_component("a/b?c=d&e(f)"), "a%2Fb%3Fc%3Dd%26e(f)");
    }

    #[test]
    fn test_insert_before_matching_anchor() {
        let html = r#"<a name="m-save"></a><h3>save</h3><a name="m-save-all"></a>"#;
        let entries = vec![
            IndexEntry::new("model", EntryKind::Module, "", "model"),
            IndexEntry::new("Model.saveAll", EntryKind::Method, "m-save-all", "model"),
            IndexEntry::new("Model.save", EntryKind::Method, "m-save", "model"),
        ];
        let out = insert_anchors(html, &entries);

        assert!(out.starts_with(r#"<a name="//apple_ref/cpp/Module/model""#));
        let save = out.find("cpp/Method/save\"").unwrap();
        let save_target = out.find(r#"<a name="m-save">"#).unwrap();
        let all = out.find("cpp/Method/saveAll").unwrap();
        let all_target = out.find(r#"<a name="m-save-all">"#).unwrap();
        assert!(save < save_target && save_target < all && all < all_target);
    }

    #[test]
    fn test_missing_anchor_is_skipped() {
        let html = "<p>nothing here</p>";
        let entries = vec![IndexEntry::new("X.y", EntryKind::Property, "x-y", "x")];
        assert_eq!(insert_anchors(html, &entries), html);
    }
}
