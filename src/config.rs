use crate::provider::AppState;
use itertools::Itertools;
use leptos::prelude::Callback;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};
use url::Url;

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("ConfigError: The provider domain must not be empty"))]
    EmptyDomain,

    #[snafu(display("ConfigError: The client id must not be empty"))]
    EmptyClientId,

    #[snafu(display("ConfigError: Could not decode configuration: {source}"))]
    Decode { source: serde_json::Error },
}

/// Static configuration of the identity provider client.
///
/// Deserializes from the shape commonly found in an `auth_config.json`:
/// ```json
/// { "domain": "my-tenant.example.com", "clientId": "abc123" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Domain of your identity provider tenant, e.g. "my-tenant.example.com".
    pub domain: String,

    /// The identifier of this application as registered with the identity provider.
    #[serde(alias = "client_id")]
    pub client_id: String,

    /// Url the identity provider redirects to after login.
    /// Defaults to the origin of the page the application is served from.
    #[serde(default, alias = "redirect_uri")]
    pub redirect_uri: Option<Url>,

    /// API identifier access tokens should be issued for.
    #[serde(default)]
    pub audience: Option<String>,

    /// Additional scopes to request. `openid` is always requested.
    #[serde(default)]
    pub scope: Vec<String>,
}

impl AuthConfig {
    pub fn new(domain: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            redirect_uri: None,
            audience: None,
            scope: Vec::new(),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
        self.redirect_uri = Some(redirect_uri);
        self
    }

    /// Decodes and validates a JSON configuration record.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AuthConfig = serde_json::from_str(json).context(DecodeSnafu {})?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(!self.domain.trim().is_empty(), EmptyDomainSnafu);
        ensure!(!self.client_id.trim().is_empty(), EmptyClientIdSnafu);
        Ok(())
    }

    /// The configured redirect target, falling back to `origin`.
    pub fn redirect_uri_or(&self, origin: &Url) -> Url {
        self.redirect_uri.clone().unwrap_or_else(|| origin.clone())
    }

    /// Space separated scope parameter. Always contains `openid` exactly once.
    pub fn scope_string(&self) -> String {
        self.scope
            .iter()
            .map(|it| it.trim())
            .filter(|it| !it.is_empty() && *it != "openid")
            .chain(["openid"])
            .unique()
            .join(" ")
    }
}

/// Options for [`init_auth_session`](crate::init_auth_session).
#[derive(Debug)]
pub struct UseAuthOptions {
    pub config: AuthConfig,

    /// Called once the return leg of a redirect login was processed, receiving the `AppState`
    /// attached to the original login request (or an empty one if the code exchange failed).
    ///
    /// When not set, the visible url is replaced with the current path (or the `target_url` of
    /// the `AppState`), dropping the `code` and `state` query parameters. No page reload happens
    /// and no new history entry is created.
    pub on_redirect_callback: Option<Callback<AppState>>,
}

impl UseAuthOptions {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            on_redirect_callback: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;

    #[test]
    fn decode_auth_config_json() {
        let config =
            AuthConfig::from_json(r#"{ "domain": "tenant.example.com", "clientId": "abc123" }"#)
                .unwrap();
        assert_that(config).is_equal_to(AuthConfig::new("tenant.example.com", "abc123"));
    }

    #[test]
    fn decode_snake_case_aliases() {
        let config = AuthConfig::from_json(
            r#"{ "domain": "d", "client_id": "c", "redirect_uri": "https://app.example/" }"#,
        )
        .unwrap();
        assert_that(config.redirect_uri)
            .is_equal_to(Some(Url::parse("https://app.example/").unwrap()));
    }

    #[test]
    fn reject_empty_domain() {
        let result = AuthConfig::from_json(r#"{ "domain": " ", "clientId": "abc123" }"#);
        assert_that(matches!(result, Err(ConfigError::EmptyDomain))).is_true();
    }

    #[test]
    fn reject_empty_client_id() {
        let result = AuthConfig::from_json(r#"{ "domain": "d", "clientId": "" }"#);
        assert_that(matches!(result, Err(ConfigError::EmptyClientId))).is_true();
    }

    #[test]
    fn reject_malformed_json() {
        let result = AuthConfig::from_json(r#"{ "domain": "d" }"#);
        assert_that(matches!(result, Err(ConfigError::Decode { .. }))).is_true();
    }

    #[test]
    fn redirect_uri_defaults_to_origin() {
        let origin = Url::parse("https://app.example/").unwrap();
        let config = AuthConfig::new("d", "c");
        assert_that(config.redirect_uri_or(&origin)).is_equal_to(origin.clone());

        let explicit = Url::parse("https://app.example/callback").unwrap();
        let config = config.with_redirect_uri(explicit.clone());
        assert_that(config.redirect_uri_or(&origin)).is_equal_to(explicit);
    }

    #[test]
    fn scope_always_contains_openid_once() {
        let mut config = AuthConfig::new("d", "c");
        assert_that(config.scope_string()).is_equal_to("openid".to_owned());

        config.scope = vec![
            " profile ".to_owned(),
            "openid".to_owned(),
            "email".to_owned(),
            "profile".to_owned(),
        ];
        assert_that(config.scope_string()).is_equal_to("profile email openid".to_owned());
    }
}
