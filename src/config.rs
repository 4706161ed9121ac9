//! Runtime configuration for the E-utilities clients.
//!
//! Values are read once from the environment and handed to
//! [`crate::pubmed::PubmedClient::new`]; nothing is stored globally.

use std::env;

/// Default NCBI E-utilities endpoint
pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Placeholder contact address used when `PUBMED_EMAIL` is unset
pub const DEFAULT_EMAIL: &str = "your.email@example.com";

/// Tool name reported to NCBI when `PUBMED_TOOL` is unset
pub const DEFAULT_TOOL: &str = "rustpubmed";

/// Caller identity and endpoint for PubMed requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Contact email sent with every request
    pub email: String,
    /// Tool name sent with every request
    pub tool: String,
    /// E-utilities base URL (no trailing slash)
    pub base_url: String,
}

impl Config {
    /// Build configuration from `PUBMED_EMAIL`, `PUBMED_TOOL` and `PUBMED_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            email: non_empty("PUBMED_EMAIL").unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            tool: non_empty("PUBMED_TOOL").unwrap_or_else(|| DEFAULT_TOOL.to_string()),
            base_url: non_empty("PUBMED_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Same identity, different endpoint (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            tool: DEFAULT_TOOL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reads_values_and_ignores_blank() {
        let vars: HashMap<&str, &str> = [
            ("PUBMED_EMAIL", "me@lab.org"),
            ("PUBMED_TOOL", "   "),
            ("PUBMED_BASE_URL", "http://localhost:9000/eutils/"),
        ]
        .into_iter()
        .collect();

        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.email, "me@lab.org");
        assert_eq!(config.tool, DEFAULT_TOOL);
        assert_eq!(config.base_url, "http://localhost:9000/eutils");
    }
}
