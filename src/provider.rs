use crate::config::AuthConfig;
use crate::params::OidcErrorCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snafu::Snafu;
use std::collections::HashMap;
use std::rc::Rc;
use time::OffsetDateTime;
use url::Url;

/// Errors reported by an identity provider client.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum ProviderError {
    /// The provider answered with an OAuth/OIDC error,
    /// e.g. `login_required`, `consent_required` or a state mismatch on code exchange.
    #[snafu(display("ProviderError: Rejected with '{error}': {error_description:?}"))]
    Rejected {
        error: OidcErrorCode,
        error_description: Option<String>,
    },

    #[snafu(display("ProviderError: Could not reach the provider: {message}"))]
    Network { message: String },

    #[snafu(display("ProviderError: The popup was closed or blocked"))]
    PopupClosed,

    #[snafu(display("ProviderError: {message}"))]
    Other { message: String },
}

/// Arbitrary payload attached to a login request by the application and handed back unchanged
/// after the redirect returned to us.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// In-app location the user should land on after the login completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppState {
    pub fn with_target_url(target_url: impl Into<String>) -> Self {
        Self {
            target_url: Some(target_url.into()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.target_url.is_none() && self.extra.is_empty()
    }
}

/// Result of processing the return leg of a redirect login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedirectLoginResult {
    pub app_state: AppState,
}

/// Standard OpenID Connect profile claims of the logged-in user.
///
/// See: <https://openid.net/specs/openid-connect-core-1_0.html#StandardClaims>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// (sub) Subject identifier. Unique within the issuer, never reassigned.
    pub sub: String,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub nickname: Option<String>,
    pub preferred_username: Option<String>,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    /// Url of the user's profile picture.
    pub picture: Option<String>,
    pub locale: Option<String>,
    #[serde(default, with = "time::serde::timestamp::option")]
    pub updated_at: Option<OffsetDateTime>,
    #[serde(flatten)]
    pub remaining: HashMap<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            name: None,
            given_name: None,
            family_name: None,
            nickname: None,
            preferred_username: None,
            email: None,
            email_verified: None,
            picture: None,
            locale: None,
            updated_at: None,
            remaining: HashMap::new(),
        }
    }

    /// Best human readable name available for this user.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.nickname.as_deref())
            .or(self.preferred_username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(self.sub.as_str())
    }
}

/// Claims of the ID token currently held by the provider client.
///
/// See: <https://openid.net/specs/openid-connect-core-1_0.html#IDToken>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// (iss) Issuer identifier.
    pub iss: String,
    /// (sub) Subject identifier.
    pub sub: String,
    /// (aud) Audience(s) the token is intended for.
    pub aud: Audiences,
    /// (exp) Expiration time.
    #[serde(with = "time::serde::timestamp")]
    pub exp: OffsetDateTime,
    /// (iat) Time at which the token was issued.
    #[serde(with = "time::serde::timestamp")]
    pub iat: OffsetDateTime,
    pub nonce: Option<String>,
    /// The raw, encoded ID token.
    #[serde(rename = "__raw")]
    pub raw: Option<String>,
    #[serde(flatten)]
    pub remaining: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audiences {
    Single(String),
    Multiple(Vec<String>),
}

impl Audiences {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audiences::Single(single) => single == audience,
            Audiences::Multiple(multiple) => multiple.iter().any(|it| it == audience),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginOptions {
    /// Payload handed back to us after the redirect returned.
    pub app_state: Option<AppState>,

    /// Overrides the configured redirect target for this login only.
    pub redirect_uri: Option<Url>,

    /// Forwarded to the provider, e.g. `login` or `none`.
    pub prompt: Option<String>,

    pub login_hint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogoutOptions {
    /// Where the provider should send the user after the logout. Defaults to the provider setting.
    pub return_to: Option<Url>,

    /// Also end the session at a federated upstream provider.
    pub federated: bool,

    /// Only clear local provider state, do not navigate to the provider.
    pub local_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenOptions {
    pub audience: Option<String>,
    pub scope: Option<String>,

    /// Bypass any cached token.
    pub ignore_cache: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopupOptions {
    pub audience: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimsOptions {
    pub audience: Option<String>,
    pub scope: Option<String>,
}

/// Client of an external identity provider implementing the redirect-based login flow.
///
/// Everything protocol related (code exchange, token validation, token storage) happens behind
/// this trait. Implementations are used from a single thread and are therefore not required to
/// be `Send`.
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Whether the provider currently holds a valid session.
    async fn is_authenticated(&self) -> Result<bool, ProviderError>;

    /// Profile of the logged-in user. `None` if nobody is logged in.
    async fn get_user(&self) -> Result<Option<UserProfile>, ProviderError>;

    /// Processes the return leg of a redirect login by exchanging the code found in `url`.
    /// May fail, e.g. on a state mismatch or a replayed code.
    async fn handle_redirect_callback(&self, url: &Url)
    -> Result<RedirectLoginResult, ProviderError>;

    /// Navigates the browser to the provider's login page.
    async fn login_with_redirect(&self, options: LoginOptions) -> Result<(), ProviderError>;

    /// Clears provider session state and redirects or reloads as configured.
    async fn logout(&self, options: LogoutOptions) -> Result<(), ProviderError>;

    async fn get_token_silently(&self, options: TokenOptions) -> Result<String, ProviderError>;

    async fn get_token_with_popup(&self, options: PopupOptions) -> Result<String, ProviderError>;

    async fn get_id_token_claims(
        &self,
        options: ClaimsOptions,
    ) -> Result<Option<IdTokenClaims>, ProviderError>;
}

/// Asynchronously constructs the identity provider client from static configuration.
#[async_trait(?Send)]
pub trait ProviderFactory {
    async fn create(&self, config: &AuthConfig) -> Result<Rc<dyn IdentityProvider>, ProviderError>;
}
