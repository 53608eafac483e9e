use clap::Parser;
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub connection_string: String,
    pub pool_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    pub backend: String, // "gemini" or "mock"
    pub model: String,   // Model name
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

/// A named data source the ingestion endpoints accept, with its adapter type
/// ("tabular", "sql_ddl", "starburst", "image_diagram", "sql_lineage") and
/// adapter-specific options.
#[derive(Debug, Deserialize, Clone)]
pub struct DataSourceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub options: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub ai: AiConfig,
    #[serde(default = "default_data_sources")]
    pub data_sources: Vec<DataSourceConfig>,
    pub data_dir: String,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for upload spool files
    #[arg(long)]
    pub data_dir: Option<String>,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder();
        let mut file_found = args.config.is_some();

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/metacat/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    file_found = true;
                    break;
                }
            }
        }

        // Build the config, falling back to defaults when no file exists
        let mut config: AppConfig = if file_found {
            config_builder.build()?.try_deserialize()?
        } else {
            AppConfig::default()
        };

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(data_dir) = &args.data_dir {
            config.data_dir = data_dir.clone();
        }

        Ok(config)
    }

    /// Looks up a configured data source by name.
    pub fn data_source(&self, name: &str) -> Option<&DataSourceConfig> {
        self.data_sources.iter().find(|s| s.name == name)
    }
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2000
}

fn default_data_sources() -> Vec<DataSourceConfig> {
    vec![
        DataSourceConfig {
            name: "tabular-upload".to_string(),
            source_type: "tabular".to_string(),
            options: HashMap::new(),
        },
        DataSourceConfig {
            name: "sql-ddl-source".to_string(),
            source_type: "sql_ddl".to_string(),
            options: HashMap::new(),
        },
        DataSourceConfig {
            name: "starburst-connector".to_string(),
            source_type: "starburst".to_string(),
            options: HashMap::new(),
        },
        DataSourceConfig {
            name: "image-diagram-processor".to_string(),
            source_type: "image_diagram".to_string(),
            options: HashMap::new(),
        },
        DataSourceConfig {
            name: "sql-lineage-parser".to_string(),
            source_type: "sql_lineage".to_string(),
            options: HashMap::new(),
        },
    ]
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                connection_string: "metacat.db".to_string(),
                pool_size: 5,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8003,
            },
            ai: AiConfig {
                backend: "mock".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_key: None,
                api_url: None,
                temperature: default_temperature(),
                max_output_tokens: default_max_output_tokens(),
            },
            data_sources: default_data_sources(),
            data_dir: "data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_lists_every_adapter_source() {
        let config = AppConfig::default();
        let types: Vec<&str> = config
            .data_sources
            .iter()
            .map(|s| s.source_type.as_str())
            .collect();
        assert_eq!(
            types,
            vec!["tabular", "sql_ddl", "starburst", "image_diagram", "sql_lineage"]
        );
    }

    #[test]
    fn data_source_lookup_is_by_name() {
        let config = AppConfig::default();
        assert_eq!(
            config.data_source("sql-ddl-source").map(|s| s.source_type.as_str()),
            Some("sql_ddl")
        );
        assert!(config.data_source("unknown").is_none());
    }
}
