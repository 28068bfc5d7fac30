mod basic;
mod google;

pub use basic::BasicConfig;
pub use google::{GOOGLE_OAUTH_SCOPES, GoogleConfig, GoogleResolvedConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Google OAuth + Search Console settings (see `google` table in config.toml).
    #[serde(default)]
    pub google: GoogleConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "SITEPUSH_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `SITEPUSH_`-prefixed environment variables (`__` separates nested keys).
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        };
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from every source.
    ///
    /// Missing Google client credentials are not fatal here; the OAuth endpoints
    /// report them as configuration errors on use.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn google(&self) -> GoogleResolvedConfig {
        self.google.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_google_endpoints() {
        let cfg = Config::default();
        let google = cfg.google();

        assert_eq!(cfg.basic.listen_port, 8188);
        assert_eq!(
            google.token_url.as_str(),
            "https://oauth2.googleapis.com/token"
        );
        assert_eq!(google.scopes, GOOGLE_OAUTH_SCOPES);
        assert!(!google.has_client_identity());
    }

    #[test]
    fn figment_merges_nested_toml_tables() {
        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(
                r#"
                [basic]
                listen_port = 9000

                [google]
                client_id = "cid"
                client_secret = "secret"
                redirect_uri = "https://example.com/admin/google-callback"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(cfg.basic.listen_port, 9000);
        let google = cfg.google();
        assert!(google.has_client_identity());
        assert_eq!(
            google.redirect_uri.as_str(),
            "https://example.com/admin/google-callback"
        );
    }
}
