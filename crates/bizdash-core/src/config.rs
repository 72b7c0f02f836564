use std::env;

use serde::{Deserialize, Serialize};

const DEFAULT_IDENTITY_BASE: &str = "https://api.clerk.com/v1";
const DEFAULT_BUSINESS_INFO_BASE: &str = "https://mybusinessbusinessinformation.googleapis.com/v1";
const DEFAULT_ACCOUNT_MGMT_BASE: &str = "https://mybusinessaccountmanagement.googleapis.com/v1";
const DEFAULT_LEGACY_BASE: &str = "https://mybusiness.googleapis.com/v4";
const DEFAULT_PERFORMANCE_BASE: &str = "https://businessprofileperformance.googleapis.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory user avatar uploads are written to after validation.
    pub upload_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            upload_dir: "data/uploads".into(),
        }
    }
}

/// Identity provider connection settings. The management secret authenticates
/// this server against the provider's backend API and is never sent to
/// browsers or to Google.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("IDENTITY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_BASE.to_string()),
            api_secret: env::var("IDENTITY_API_SECRET").unwrap_or_default(),
            timeout_secs: 30,
        }
    }
}

/// Base URLs for the Business Profile API family. Each surface lives on its
/// own host; the legacy v4 API still serves reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbpConfig {
    pub business_info_base: String,
    pub account_mgmt_base: String,
    pub legacy_base: String,
    pub performance_base: String,
    pub accounts_page_size: u32,
    pub timeout_secs: u64,
}

impl Default for GbpConfig {
    fn default() -> Self {
        Self {
            business_info_base: env::var("GBP_BUSINESS_INFO_BASE")
                .unwrap_or_else(|_| DEFAULT_BUSINESS_INFO_BASE.to_string()),
            account_mgmt_base: env::var("GBP_ACCOUNT_MGMT_BASE")
                .unwrap_or_else(|_| DEFAULT_ACCOUNT_MGMT_BASE.to_string()),
            legacy_base: env::var("GBP_LEGACY_BASE")
                .unwrap_or_else(|_| DEFAULT_LEGACY_BASE.to_string()),
            performance_base: env::var("GBP_PERFORMANCE_BASE")
                .unwrap_or_else(|_| DEFAULT_PERFORMANCE_BASE.to_string()),
            accounts_page_size: 50,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    pub gbp: GbpConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(host) = env::var("BIZDASH_HOST") {
            config.server.host = host;
        }
        if let Some(port) = env::var("BIZDASH_PORT").ok().and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }
        if let Ok(dir) = env::var("BIZDASH_UPLOAD_DIR") {
            config.server.upload_dir = dir;
        }
        if let Some(size) = env::var("GBP_ACCOUNTS_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.gbp.accounts_page_size = size;
        }

        config
    }
}
