//! Backend connection settings.

/// Connection settings for the hosted backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://project.supabase.co`
    pub url: String,
    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,
    /// Session token of the signed-in user; the anon key is used when absent
    pub access_token: Option<String>,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// Both the URL and the anon key are required.
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("backend URL is required".to_string());
        }
        if self.anon_key.trim().is_empty() {
            return Err("backend anon key is required".to_string());
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(format!("backend URL must be http(s): {}", self.url));
        }
        Ok(())
    }

    /// Bearer token for requests.
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    pub(crate) fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
