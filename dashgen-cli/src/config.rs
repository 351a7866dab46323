use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashgenConfig {
    /// Build configuration
    #[serde(default)]
    pub build: BuildConfig,
    /// Docset configuration (from dashgen-core)
    #[serde(flatten)]
    pub docset: dashgen_core::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory the docset, feed and contribution directories are written to
    pub output: String,
    /// Directory with template overrides
    pub theme: String,
    /// Configuration file path
    pub config: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: "./build".to_string(),
            theme: "./theme".to_string(),
            config: "./dashgen.toml".to_string(),
        }
    }
}

const LIST_KEYS: &[&str] = &[
    "modules.modules",
    "modules.class_modules",
    "modules.select_style_modules",
    "modules.sections_to_remove",
    "guides.guides_to_remove",
    "links.site_urls",
    "links.repo_urls",
    "audit.ignore_patterns",
];

impl DashgenConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (DASHGEN_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .try_get_one::<String>("config")
            .ok()
            .flatten()
            .cloned()
            .unwrap_or_else(|| BuildConfig::default().config);

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::new(&config_file, FileFormat::Toml));
        }

        // 3. Add environment variables with DASHGEN_ prefix
        let mut environment = Environment::with_prefix("DASHGEN")
            .prefix_separator("_")
            .separator("__") // Use double underscore for nested keys
            .list_separator(",")
            .try_parsing(true);
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment);

        // 4. Override with CLI arguments (highest priority)
        builder = builder.set_override("build.config", config_file.clone())?;
        for key in ["output", "theme"] {
            if let Some(value) = args.try_get_one::<String>(key).ok().flatten() {
                builder = builder.set_override(format!("build.{key}"), value.clone())?;
            }
        }

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn command() -> Command {
        Command::new("test")
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"))
    }

    #[test]
    fn test_default_config() {
        let config = DashgenConfig::default();
        assert_eq!(config.build.output, "./build");
        assert_eq!(config.build.theme, "./theme");
        assert_eq!(config.docset.docset.name, "Ampersand");
    }

    #[test]
    fn test_cli_args_override() {
        let matches = command()
            .try_get_matches_from(vec![
                "test",
                "--output",
                "/custom/output",
                "--config",
                "/does/not/exist.toml",
            ])
            .unwrap();

        let config = DashgenConfig::load(&matches).unwrap();
        assert_eq!(config.build.output, "/custom/output");
        assert_eq!(config.build.config, "/does/not/exist.toml");
        // Should still have defaults for non-overridden values
        assert_eq!(config.build.theme, "./theme");
        assert_eq!(config.docset.modules.registry_url, "https://registry.npmjs.org");
    }

    #[test]
    fn test_config_file_is_layered_over_defaults() {
        let dir = std::env::temp_dir().join(format!("dashgen-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("dashgen.toml");
        std::fs::write(
            &file,
            "[docset]\nname = \"Widgets\"\n\n[modules]\nclass_modules = [\"widget-view\"]\n",
        )
        .unwrap();

        let matches = command()
            .try_get_matches_from(vec!["test", "--config", file.to_str().unwrap()])
            .unwrap();
        let config = DashgenConfig::load(&matches).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.docset.docset.name, "Widgets");
        assert_eq!(config.docset.docset.id, "ampersand");
        assert!(config.docset.is_class_module("widget-view"));
    }

    #[test]
    fn test_environment_overrides_and_lists() {
        // SAFETY: no other test reads or writes these variables
        unsafe {
            std::env::set_var("DASHGEN_MODULES__SELECT_STYLE_MODULES", "a-view,b-view");
            std::env::set_var("DASHGEN_DOCSET__AUTHOR", "Env Author");
        }

        let matches = command()
            .try_get_matches_from(vec!["test", "--config", "/does/not/exist.toml"])
            .unwrap();
        let config = DashgenConfig::load(&matches);

        unsafe {
            std::env::remove_var("DASHGEN_MODULES__SELECT_STYLE_MODULES");
            std::env::remove_var("DASHGEN_DOCSET__AUTHOR");
        }

        let config = config.unwrap();
        assert_eq!(
            config.docset.modules.select_style_modules,
            vec!["a-view".to_string(), "b-view".to_string()]
        );
        assert!(config.docset.is_select_style("b-view"));
        assert_eq!(config.docset.docset.author, "Env Author");
    }
}
