use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::interceptor::interceptor::{DEFAULT_OUTPUT_SELECTOR, DEFAULT_SUBMIT_SELECTOR};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-relay",
    version,
    about = "Submit page forms in place and render the response into the form"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-relay.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Click a submit control and print what lands in each output slot
    Submit {
        /// Page document (YAML, or JSON by extension)
        #[arg(long)]
        page: String,

        /// Index of the submit control to click, in document order
        #[arg(long, default_value_t = 0)]
        control: usize,

        /// Set a field before submitting: name=value (repeatable)
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Override the page URL that form actions resolve against
        #[arg(long)]
        base_url: Option<String>,
    },

    /// List forms, their actions, submit controls and payloads
    Inspect {
        /// Page document (YAML, or JSON by extension)
        #[arg(long)]
        page: String,
    },
}

/// Parse a `name=value` pair. The value may be empty or contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-relay.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_submit_selector")]
    pub submit_selector: String,

    #[serde(default = "default_output_selector")]
    pub output_selector: String,

    /// Request timeout; unset means requests are never cut off
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// JSONL trace of every completed submission
    #[serde(default)]
    pub trace_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            submit_selector: default_submit_selector(),
            output_selector: default_output_selector(),
            timeout_ms: None,
            trace_file: None,
        }
    }
}

fn default_submit_selector() -> String { DEFAULT_SUBMIT_SELECTOR.to_string() }
fn default_output_selector() -> String { DEFAULT_OUTPUT_SELECTOR.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-relay.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}
