use clap::ValueEnum;
use lettercraft_compiler_html::Mode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "lettercraft.config.json";

/// Lettercraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory containing letter settings files
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// Directory compiled letters are written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Outputs to produce for each letter
    #[serde(default = "default_emit")]
    pub emit: Vec<Emit>,

    /// Pretty print HTML
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Emit {
    Preview,
    Export,
}

impl Emit {
    pub fn mode(self) -> Mode {
        match self {
            Emit::Preview => Mode::Preview,
            Emit::Export => Mode::Export,
        }
    }

    /// Output file extension, e.g. `letter.preview.html`
    pub fn extension(self) -> &'static str {
        match self {
            Emit::Preview => "preview.html",
            Emit::Export => "export.html",
        }
    }
}

fn default_src_dir() -> String {
    "letters".to_string()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_emit() -> Vec<Emit> {
    vec![Emit::Preview, Emit::Export]
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.src_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            out_dir: default_out_dir(),
            emit: default_emit(),
            pretty: default_pretty(),
        }
    }
}
