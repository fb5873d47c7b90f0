//! Configuration for the gastro app
//!
//! CLI arguments and environment variables using clap. A `.env` file is
//! loaded before parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gastro_advisor::{AdvisorConfig, DEFAULT_BASE_URL};
use gastro_store::BackendConfig;

use crate::cli::Command;
use crate::context::Session;

/// Gastro Care - gastritis symptom tracker and diet helper
#[derive(Parser, Debug, Clone)]
#[command(name = "gastro")]
#[command(about = "Track gastritis symptoms, review care advice and check foods")]
pub struct Args {
    /// Backend project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Backend public anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_anon_key: Option<String>,

    /// Session token of the signed-in user
    #[arg(long, env = "SUPABASE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Signed-in user id; guest mode when absent
    #[arg(long, env = "GASTRO_USER_ID")]
    pub user_id: Option<String>,

    /// API key for the food advisor
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Preferred advisor model (default: gpt-5-nano)
    #[arg(long, env = "OPENAI_MODEL")]
    pub openai_model: Option<String>,

    /// Completion API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Directory for guest-mode data
    #[arg(long, env = "GASTRO_DATA_DIR", default_value = ".gastro")]
    pub data_dir: PathBuf,

    /// Backend request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Food advisor request timeout in seconds
    #[arg(long, env = "ADVISOR_TIMEOUT_SECS", default_value = "60")]
    pub advisor_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Args {
    /// Validate configuration. Backend settings are required for every command.
    pub fn validate(&self) -> Result<(), String> {
        let url = present(&self.supabase_url).ok_or("SUPABASE_URL is required")?;
        if present(&self.supabase_anon_key).is_none() {
            return Err("SUPABASE_ANON_KEY is required".to_string());
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("SUPABASE_URL must be an http(s) URL, got {}", url));
        }
        if present(&self.user_id).is_some() && present(&self.access_token).is_none() {
            return Err("GASTRO_USER_ID requires SUPABASE_ACCESS_TOKEN".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be greater than zero".to_string());
        }
        if self.advisor_timeout_secs == 0 {
            return Err("ADVISOR_TIMEOUT_SECS must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            url: present(&self.supabase_url).unwrap_or_default().to_string(),
            anon_key: present(&self.supabase_anon_key).unwrap_or_default().to_string(),
            access_token: present(&self.access_token).map(str::to_string),
            timeout_secs: self.request_timeout_secs,
        }
    }

    /// Advisor settings. A missing key only fails the `advise` command.
    pub fn advisor_config(&self) -> AdvisorConfig {
        AdvisorConfig {
            api_key: present(&self.openai_api_key).map(str::to_string),
            model: present(&self.openai_model).map(str::to_string),
            base_url: self.openai_base_url.clone(),
            timeout_secs: self.advisor_timeout_secs,
        }
    }

    pub fn session(&self) -> Session {
        match present(&self.user_id) {
            Some(user_id) => Session::Authenticated {
                user_id: user_id.to_string(),
            },
            None => Session::Guest,
        }
    }
}
