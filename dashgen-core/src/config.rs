use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parsing(#[from] toml::de::Error),
}

/// Everything a docset build needs to know, passed by reference through the
/// collectors and the packager.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub docset: DocsetConfig,
    pub modules: ModulesConfig,
    pub guides: GuidesConfig,
    pub links: LinksConfig,
    pub audit: AuditConfig,
    pub fixed_modules: Vec<FixedModule>,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }

    pub fn is_class_module(&self, name: &str) -> bool {
        self.modules.class_modules.iter().any(|m| m == name)
    }

    pub fn is_select_style(&self, name: &str) -> bool {
        self.modules.select_style_modules.iter().any(|m| m == name)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct DocsetConfig {
    /// Display name, also used for the `.docset` directory and archive names
    pub name: String,
    /// Bundle identifier written to Info.plist
    pub id: String,
    pub feed_base_url: String,
    pub author: String,
    pub author_link: String,
    pub icon: Option<PathBuf>,
    pub icon_2x: Option<PathBuf>,
}

impl Default for DocsetConfig {
    fn default() -> Self {
        Self {
            name: "Ampersand".into(),
            id: "ampersand".into(),
            feed_base_url: "https://example.com/docsets".into(),
            author: String::new(),
            author_link: String::new(),
            icon: None,
            icon_2x: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ModulesConfig {
    pub registry_url: String,
    pub modules: Vec<String>,
    /// Modules documenting a single constructor; these get class, method and
    /// property entries
    pub class_modules: Vec<String>,
    /// Class modules whose headings carry the signature after ` - [`
    pub select_style_modules: Vec<String>,
    /// README sections dropped before rendering, matched on heading text
    pub sections_to_remove: Vec<String>,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            registry_url: "https://registry.npmjs.org".into(),
            modules: Vec::new(),
            class_modules: Vec::new(),
            select_style_modules: Vec::new(),
            sections_to_remove: vec!["install".into(), "license".into()],
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct GuidesConfig {
    pub enabled: bool,
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    /// Guide file stems to skip
    pub guides_to_remove: Vec<String>,
    pub user_agent: String,
}

impl Default for GuidesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "https://api.github.com".into(),
            owner: "AmpersandJS".into(),
            repo: "ampersandjs.com".into(),
            path: "learn_markdown".into(),
            guides_to_remove: Vec::new(),
            user_agent: "dashgen".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct LinksConfig {
    /// Absolute site roots that host the module docs and guides
    pub site_urls: Vec<String>,
    /// Repository roots where `<root>/<module>` is a module's repository
    pub repo_urls: Vec<String>,
    pub docs_path: String,
    pub learn_path: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            site_urls: vec!["http://ampersandjs.com".into()],
            repo_urls: vec![
                "http://github.com/ampersandjs".into(),
                "https://github.com/ampersandjs".into(),
                "https://github.com/AmpersandJS".into(),
            ],
            docs_path: "docs".into(),
            learn_path: "learn".into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct AuditConfig {
    /// Lowercased links matching this pattern are reported...
    pub watch_pattern: String,
    /// ...unless they also match one of these
    pub ignore_patterns: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            watch_pattern: r"^https?://github\.com/ampersandjs".into(),
            ignore_patterns: vec![
                r"/ampersandjs/.*\.js$".into(),
                r"/ampersandjs/ampersand/(blob|issues)".into(),
            ],
        }
    }
}

/// A module described entirely in configuration: a bag of functions
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct FixedModule {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub functions: Vec<FixedFunction>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct FixedFunction {
    pub name: String,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub description: String,
}
