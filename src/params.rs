use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Query parameters an identity provider may append to our url when redirecting back to us.
///
/// Parsed by [`parse_auth_params`]. Parameters of no interest to the authentication flow are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthParams {
    /// Short-lived authorization code. Present on the return leg of a successful redirect login.
    pub code: Option<String>,

    /// Opaque state value the provider echoes back alongside the `code`.
    pub state: Option<String>,

    /// Error code, present when the provider rejected the login.
    pub error: Option<String>,

    pub error_description: Option<String>,

    pub error_uri: Option<String>,
}

impl AuthParams {
    /// `true` when this is the return leg of a redirect-based login carrying an authorization code.
    pub fn is_redirect_callback(&self) -> bool {
        self.code.is_some()
    }

    /// `true` when the provider reported a login failure.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The typed error response, if the provider reported a login failure.
    pub fn error_response(&self) -> Option<ErrorResponse> {
        self.error.as_deref().map(|error| ErrorResponse {
            error: OidcErrorCode::from(error),
            error_description: self.error_description.clone(),
            error_uri: self.error_uri.clone(),
        })
    }
}

/// Parses the authentication related parameters out of a query string.
///
/// Accepts the query with or without its leading `?`. Values are percent- and
/// `+`-decoded. When a parameter occurs more than once, the first occurrence wins.
/// `code` and `error` count as absent when they carry an empty value.
pub fn parse_auth_params(query: &str) -> AuthParams {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut params = AuthParams::default();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let slot = match &*key {
            "code" => &mut params.code,
            "state" => &mut params.state,
            "error" => &mut params.error,
            "error_description" => &mut params.error_description,
            "error_uri" => &mut params.error_uri,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    params.code = params.code.filter(|it| !it.is_empty());
    params.error = params.error.filter(|it| !it.is_empty());
    params
}

/// Error codes an authorization endpoint may answer with.
///
/// See [RFC 6749 Section 4.1.2.1](https://datatracker.ietf.org/doc/html/rfc6749#section-4.1.2.1)
/// and [OpenID Connect Core Section 3.1.2.6](https://openid.net/specs/openid-connect-core-1_0.html#AuthError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum KnownOidcErrorCode {
    /// The request is missing a required parameter, includes an invalid parameter value,
    /// includes a parameter more than once, or is otherwise malformed.
    #[serde(rename = "invalid_request")]
    InvalidRequest,

    /// The client is not authorized to request an authorization code using this method.
    #[serde(rename = "unauthorized_client")]
    UnauthorizedClient,

    /// The resource owner or authorization server denied the request.
    #[serde(rename = "access_denied")]
    AccessDenied,

    #[serde(rename = "unsupported_response_type")]
    UnsupportedResponseType,

    /// The requested scope is invalid, unknown, or malformed.
    #[serde(rename = "invalid_scope")]
    InvalidScope,

    /// The authorization server encountered an unexpected condition that prevented it from
    /// fulfilling the request.
    #[serde(rename = "server_error")]
    ServerError,

    #[serde(rename = "temporarily_unavailable")]
    TemporarilyUnavailable,

    /// The provider requires some form of end-user interaction to proceed.
    #[serde(rename = "interaction_required")]
    InteractionRequired,

    /// The provider requires end-user authentication.
    #[serde(rename = "login_required")]
    LoginRequired,

    #[serde(rename = "account_selection_required")]
    AccountSelectionRequired,

    /// The provider requires end-user consent.
    #[serde(rename = "consent_required")]
    ConsentRequired,
}

impl KnownOidcErrorCode {
    const ALL: [KnownOidcErrorCode; 11] = [
        KnownOidcErrorCode::InvalidRequest,
        KnownOidcErrorCode::UnauthorizedClient,
        KnownOidcErrorCode::AccessDenied,
        KnownOidcErrorCode::UnsupportedResponseType,
        KnownOidcErrorCode::InvalidScope,
        KnownOidcErrorCode::ServerError,
        KnownOidcErrorCode::TemporarilyUnavailable,
        KnownOidcErrorCode::InteractionRequired,
        KnownOidcErrorCode::LoginRequired,
        KnownOidcErrorCode::AccountSelectionRequired,
        KnownOidcErrorCode::ConsentRequired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KnownOidcErrorCode::InvalidRequest => "invalid_request",
            KnownOidcErrorCode::UnauthorizedClient => "unauthorized_client",
            KnownOidcErrorCode::AccessDenied => "access_denied",
            KnownOidcErrorCode::UnsupportedResponseType => "unsupported_response_type",
            KnownOidcErrorCode::InvalidScope => "invalid_scope",
            KnownOidcErrorCode::ServerError => "server_error",
            KnownOidcErrorCode::TemporarilyUnavailable => "temporarily_unavailable",
            KnownOidcErrorCode::InteractionRequired => "interaction_required",
            KnownOidcErrorCode::LoginRequired => "login_required",
            KnownOidcErrorCode::AccountSelectionRequired => "account_selection_required",
            KnownOidcErrorCode::ConsentRequired => "consent_required",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OidcErrorCode {
    Known(KnownOidcErrorCode),
    Unknown(String),
}

impl OidcErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            OidcErrorCode::Known(known) => known.as_str(),
            OidcErrorCode::Unknown(unknown) => unknown.as_str(),
        }
    }

    /// Errors which a fresh interactive login may resolve.
    pub fn requires_interaction(&self) -> bool {
        matches!(
            self,
            OidcErrorCode::Known(
                KnownOidcErrorCode::InteractionRequired
                    | KnownOidcErrorCode::LoginRequired
                    | KnownOidcErrorCode::AccountSelectionRequired
                    | KnownOidcErrorCode::ConsentRequired
            )
        )
    }
}

impl From<&str> for OidcErrorCode {
    fn from(code: &str) -> Self {
        KnownOidcErrorCode::ALL
            .into_iter()
            .find(|known| known.as_str() == code)
            .map_or_else(|| OidcErrorCode::Unknown(code.to_owned()), OidcErrorCode::Known)
    }
}

impl Display for OidcErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth/OIDC error response received from the identity provider as query parameters
/// of the redirect back to us.
///
/// # Common Error Codes
/// - `access_denied`: The user or authorization server denied the request
/// - `login_required`: The user must authenticate interactively
///
/// See [RFC 6749 Section 4.1.2.1](https://datatracker.ietf.org/doc/html/rfc6749#section-4.1.2.1) for details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    /// The error code (e.g., `access_denied`).
    pub error: OidcErrorCode,

    /// OPTIONAL. Human-readable ASCII text providing additional information.
    pub error_description: Option<String>,

    /// OPTIONAL. A URI identifying a human-readable web page with information about the error.
    pub error_uri: Option<String>,
}
