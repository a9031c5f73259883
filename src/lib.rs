//! Redirect-based identity provider login for Leptos single-page applications.
//!
//! Wrap your application in an [`AuthProvider`] (or render the ready-made [`App`]) and access the
//! session anywhere below it using [`use_auth_session`].
//!
//! The identity provider itself is abstracted by the [`IdentityProvider`] and [`ProviderFactory`]
//! traits. This crate drives the session lifecycle around them: client construction, processing
//! the return leg of a redirect login and recovering from errors the provider reported in the url
//! the application was started with.

pub mod components;
pub mod config;
pub mod error;
pub mod hooks;
pub mod location;
pub mod params;
pub mod provider;
pub mod recovery;
pub mod session;

pub use components::*;
pub use config::{AuthConfig, ConfigError, UseAuthOptions};
pub use error::AuthError;
pub use hooks::{
    AuthSession, SharedProviderFactory, init_auth_session, try_use_auth_session, use_auth_session,
};
pub use params::{AuthParams, ErrorResponse, KnownOidcErrorCode, OidcErrorCode};
pub use provider::{
    AppState, Audiences, ClaimsOptions, IdTokenClaims, IdentityProvider, LoginOptions,
    LogoutOptions, PopupOptions, ProviderError, ProviderFactory, RedirectLoginResult,
    TokenOptions, UserProfile,
};
pub use recovery::{ErrorNotice, ErrorRecovery};
pub use session::{InitOutcome, Session, SessionController, SessionPhase};
pub use url::Url;

/// Mounts the complete [`App`] to the document body.
#[cfg(feature = "csr")]
pub fn mount_app(config: AuthConfig, factory: SharedProviderFactory) {
    use leptos::prelude::*;

    leptos::mount::mount_to_body(move || view! { <App config=config factory=factory/> })
}
