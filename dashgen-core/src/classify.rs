//! Turns a module's table of contents into search index entries.
//!
//! Only class-style modules get member entries: a member name is qualified
//! with the class name, which plain modules don't have. Headings at depth 3
//! (one level below the section headings of a README) are the members.

use std::sync::LazyLock;

use regex::Regex;

use crate::site::{EntryKind, IndexEntry, TocHeading};

const MEMBER_DEPTH: u32 = 3;

static CODE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+<code>.*").unwrap());
static SLASH_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/.*").unwrap());
static EXTEND_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+\.extend").unwrap());
static SELECT_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+- \[.*").unwrap());
static SKIPPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"proxied ES5|underscore methods").unwrap());
static CALL_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<code>.*\(").unwrap());

/// How a module's headings are interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleStyle {
    pub is_class: bool,
    /// Any heading with a call signature is a method
    pub select_style: bool,
}

impl ModuleStyle {
    pub fn class() -> Self {
        Self {
            is_class: true,
            select_style: false,
        }
    }
}

/// A depth-3 heading after name normalization
struct Member<'a> {
    name: &'a str,
    text: &'a str,
    select_style: bool,
}

struct Rule {
    applies: fn(&Member) -> bool,
    kind: EntryKind,
    qualify: fn(&str, &str) -> String,
}

/// First matching rule wins.
static RULES: &[Rule] = &[
    Rule {
        applies: |m| m.select_style && m.name.contains('('),
        kind: EntryKind::Method,
        qualify: |class, name| format!("{class}.{}", up_to_paren(name)),
    },
    Rule {
        applies: |m| m.name.starts_with('.') && m.name.contains('('),
        kind: EntryKind::Method,
        qualify: |class, name| format!("{class}{}", up_to_paren(name)),
    },
    Rule {
        applies: |m| m.name.starts_with('.'),
        kind: EntryKind::Property,
        qualify: |class, name| format!("{class}{name}"),
    },
    Rule {
        applies: |m| m.name.starts_with("constructor") || m.name.starts_with("new "),
        kind: EntryKind::Constructor,
        qualify: |class, _| class.to_string(),
    },
    Rule {
        applies: |m| {
            (m.text.contains("extend(") && m.name != "extend")
                || !CALL_SIGNATURE.is_match(m.text)
                || matches!(m.name, "url" | "urlRoot")
        },
        kind: EntryKind::Property,
        qualify: |class, name| format!("{class}.{name}"),
    },
    Rule {
        applies: |_| true,
        kind: EntryKind::Method,
        qualify: |class, name| format!("{class}.{name}"),
    },
];

/// Build the index entries for one module page
pub fn toc_to_index_entries(
    module: &str,
    style: ModuleStyle,
    toc: &[TocHeading],
) -> Vec<IndexEntry> {
    let mut entries = vec![IndexEntry::new(module, EntryKind::Module, "", module)];
    if !style.is_class {
        return entries;
    }

    let class_name = class_name(module);
    entries.push(IndexEntry::new(&class_name, EntryKind::Class, "", module));

    for heading in toc.iter().filter(|h| h.depth == MEMBER_DEPTH) {
        let name = member_name(&heading.text);
        if SKIPPED.is_match(&name) {
            continue;
        }

        let member = Member {
            name: &name,
            text: &heading.text,
            select_style: style.select_style,
        };
        if let Some(rule) = RULES.iter().find(|rule| (rule.applies)(&member)) {
            entries.push(IndexEntry::new(
                (rule.qualify)(&class_name, &name),
                rule.kind,
                &heading.link_text,
                module,
            ));
        }
    }

    entries
}

/// Strip signatures and disambiguation text from a heading
fn member_name(text: &str) -> String {
    let name = CODE_SUFFIX.replace(text, "");
    let name = SLASH_SUFFIX.replace(&name, "");
    let name = EXTEND_PREFIX.replace(&name, ".extend");
    SELECT_SUFFIX.replace(&name, "").into_owned()
}

fn up_to_paren(name: &str) -> &str {
    name.split('(').next().unwrap_or(name)
}

/// `ampersand-state` becomes `AmpersandState`
pub fn class_name(module: &str) -> String {
    capitalize(&camelize(module))
}

/// `is-array` becomes `isArray`. Runs of `-`, `_` and whitespace are removed
/// and the following character upper-cased.
pub fn camelize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.trim().chars() {
        if c == '-' || c == '_' || c.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn h3(text: &str, link: &str) -> TocHeading {
        TocHeading {
            depth: 3,
            text: text.to_string(),
            link_text: link.to_string(),
        }
    }

    fn summary(entries: &[IndexEntry]) -> Vec<(EntryKind, &str)> {
        entries.iter().map(|e| (e.kind, e.name.as_str())).collect()
    }

    #[test]
    fn test_plain_module_only_gets_module_entry() {
        let toc = vec![h3("set <code>foo.set(key)</code>", "foo-set")];
        let entries = toc_to_index_entries("foo", ModuleStyle::default(), &toc);
        assert_eq!(entries, vec![IndexEntry::new("foo", EntryKind::Module, "", "foo")]);
    }

    #[test]
    fn test_constructor_uses_class_name() {
        let toc = vec![h3("constructor(options)", "foo-constructor")];
        let entries = toc_to_index_entries("foo", ModuleStyle::class(), &toc);
        assert_eq!(
            summary(&entries),
            vec![
                (EntryKind::Module, "foo"),
                (EntryKind::Class, "Foo"),
                (EntryKind::Constructor, "Foo"),
            ]
        );
        assert_eq!(entries[2].anchor, "foo-constructor");
    }

    #[test]
    fn test_new_and_disambiguated_constructor() {
        let toc = vec![
            h3("new Thing(attrs)", "a"),
            h3("constructor/initialize <code>new Thing([attrs])</code>", "b"),
        ];
        let entries = toc_to_index_entries("my-thing", ModuleStyle::class(), &toc);
        assert_eq!(
            summary(&entries[2..]),
            vec![(EntryKind::Constructor, "MyThing"), (EntryKind::Constructor, "MyThing")]
        );
    }

    #[test]
    fn test_subcollection_members() {
        let toc = vec![
            h3(".extend()", "sub-extend"),
            h3("collection.extend(more)", "sub-extend-2"),
            h3(".models", "sub-models"),
        ];
        let entries = toc_to_index_entries("sub", ModuleStyle::class(), &toc);
        assert_eq!(
            summary(&entries[2..]),
            vec![
                (EntryKind::Method, "Sub.extend"),
                (EntryKind::Method, "Sub.extend"),
                (EntryKind::Property, "Sub.models"),
            ]
        );
    }

    #[test]
    fn test_url_is_property_even_with_signature() {
        let toc = vec![
            h3("url", "m-url"),
            h3("urlRoot <code>model.urlRoot()</code>", "m-urlroot"),
        ];
        let entries = toc_to_index_entries("model", ModuleStyle::class(), &toc);
        assert_eq!(
            summary(&entries[2..]),
            vec![(EntryKind::Property, "Model.url"), (EntryKind::Property, "Model.urlRoot")]
        );
    }

    #[test]
    fn test_methods_and_properties() {
        let toc = vec![
            h3("set <code>state.set(key, value)</code>", "s-set"),
            h3(
                "props <code>AmpersandState.extend({ props: {} })</code>",
                "s-props",
            ),
            h3(
                "extend <code>AmpersandState.extend({ props })</code>",
                "s-extend",
            ),
            h3("isNew", "s-isnew"),
        ];
        let entries = toc_to_index_entries("ampersand-state", ModuleStyle::class(), &toc);
        assert_eq!(
            summary(&entries[1..]),
            vec![
                (EntryKind::Class, "AmpersandState"),
                (EntryKind::Method, "AmpersandState.set"),
                (EntryKind::Property, "AmpersandState.props"),
                (EntryKind::Method, "AmpersandState.extend"),
                (EntryKind::Property, "AmpersandState.isNew"),
            ]
        );
    }

    #[test]
    fn test_skipped_and_non_member_headings() {
        let toc = vec![
            h3("proxied ES5 methods", "x"),
            h3("underscore methods (0.5)", "y"),
            TocHeading {
                depth: 2,
                text: "API Reference".into(),
                link_text: "api".into(),
            },
            TocHeading {
                depth: 4,
                text: "set <code>x.set()</code>".into(),
                link_text: "deep".into(),
            },
        ];
        let entries = toc_to_index_entries("coll", ModuleStyle::class(), &toc);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_select_style_signature_suffix() {
        let style = ModuleStyle {
            is_class: true,
            select_style: true,
        };
        let toc = vec![
            h3("setValue(value) - [Function]", "sv-setvalue"),
            h3("options - [Array]", "sv-options"),
        ];
        let entries = toc_to_index_entries("select-view", style, &toc);
        assert_eq!(
            summary(&entries[2..]),
            vec![
                (EntryKind::Method, "SelectView.setValue"),
                (EntryKind::Property, "SelectView.options"),
            ]
        );
    }

    #[test]
    fn test_classification_is_repeatable() {
        let toc = vec![
            h3("constructor(options)", "a"),
            h3("set <code>x.set(k)</code>", "b"),
            h3(".length", "c"),
        ];
        let first = toc_to_index_entries("foo", ModuleStyle::class(), &toc);
        let second = toc_to_index_entries("foo", ModuleStyle::class(), &toc);
        assert_eq!(first, second);
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("is-array"), "isArray");
        assert_eq!(camelize("ampersand_rest  collection"), "ampersandRestCollection");
        assert_eq!(class_name("ampersand-state"), "AmpersandState");
        assert_eq!(class_name(""), "");
    }
}
