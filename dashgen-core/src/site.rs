use std::fmt;

use serde::Serialize;

/// One heading of a rendered page's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocHeading {
    pub depth: u32,
    /// Inline HTML of the heading, e.g. `extend <code>Foo.extend(props)</code>`
    pub text: String,
    /// Value of the named anchor placed in front of the heading
    pub link_text: String,
}

/// A page produced by a collector. Finished HTML: anchors are inserted and the
/// page template is applied before a collector hands it over.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceDocument {
    pub name: String,
    pub html: String,
    pub toc: Vec<TocHeading>,
    pub title: String,
    pub order: i64,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl SourceDocument {
    pub fn file_name(&self) -> String {
        format!("{}.html", self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntryKind {
    Module,
    Class,
    Constructor,
    Method,
    Property,
    Function,
    Guide,
}

impl EntryKind {
    /// Dash entry type name
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Module => "Module",
            EntryKind::Class => "Class",
            EntryKind::Constructor => "Constructor",
            EntryKind::Method => "Method",
            EntryKind::Property => "Property",
            EntryKind::Function => "Function",
            EntryKind::Guide => "Guide",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub anchor: String,
    /// Name of the page the entry lives on
    pub module: String,
}

impl IndexEntry {
    pub fn new(
        name: impl Into<String>,
        kind: EntryKind,
        anchor: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            anchor: anchor.into(),
            module: module.into(),
        }
    }

    /// Location stored in the search index
    pub fn path(&self) -> String {
        format!("{}.html#{}", self.module, self.anchor)
    }
}

/// Output of one collector
#[derive(Debug, Clone, Default)]
pub struct Documentation {
    pub pages: Vec<SourceDocument>,
    pub entries: Vec<IndexEntry>,
}
