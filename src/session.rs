use crate::config::AuthConfig;
use crate::error::{AuthError, NotInitializedSnafu, ProviderSnafu};
use crate::params::parse_auth_params;
use crate::provider::{
    AppState, ClaimsOptions, IdTokenClaims, IdentityProvider, LoginOptions, LogoutOptions,
    PopupOptions, ProviderError, ProviderFactory, RedirectLoginResult, TokenOptions, UserProfile,
};
use snafu::{OptionExt, ResultExt};
use std::cell::{OnceCell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use url::Url;

/// Lifecycle phase of a [`Session`].
///
/// `Uninitialized → Loading → {Authenticated, Unauthenticated}`. Only an explicit logout moves
/// an `Authenticated` session to `Unauthenticated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Uninitialized,
    Loading,
    Authenticated,
    Unauthenticated,
}

/// What we know about the user's authentication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub phase: SessionPhase,

    /// Profile of the logged-in user. Only ever present in the `Authenticated` phase.
    pub user: Option<UserProfile>,
}

impl Session {
    /// `true` until initialization completed. Views depending on the authentication state
    /// should not be rendered while loading.
    pub fn loading(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Uninitialized | SessionPhase::Loading
        )
    }

    /// `None` while the authentication state is not yet known.
    pub fn is_authenticated(&self) -> Option<bool> {
        match self.phase {
            SessionPhase::Uninitialized | SessionPhase::Loading => None,
            SessionPhase::Authenticated => Some(true),
            SessionPhase::Unauthenticated => Some(false),
        }
    }
}

/// Result of [`SessionController::initialize`].
#[derive(Debug, Clone, PartialEq)]
pub enum InitOutcome {
    Authenticated { user: Option<UserProfile> },
    Unauthenticated,

    /// Initialization did not complete. The session stays in its loading state.
    Failed { error: AuthError },
}

/// Single source of truth for the authentication state. Mediates all calls into the identity
/// provider client, which it creates exactly once during [`initialize`](Self::initialize).
pub struct SessionController {
    config: AuthConfig,
    client: OnceCell<Rc<dyn IdentityProvider>>,
    session: RefCell<Session>,
}

impl Debug for SessionController {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("config", &self.config)
            .field("client_bound", &self.client.get().is_some())
            .field("session", &self.session.borrow())
            .finish()
    }
}

impl SessionController {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
            session: RefCell::new(Session::default()),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        self.session.borrow().loading()
    }

    /// Constructs the provider client, processes a pending redirect callback found in
    /// `current_url` and determines the authentication state.
    ///
    /// `on_redirect` is only called when `current_url` carries an authorization code. It receives
    /// the `AppState` of the original login request, or an empty one if the code exchange failed.
    ///
    /// Must only be called once. Any further call fails with `AuthError::AlreadyInitialized`
    /// without touching the session.
    pub async fn initialize(
        &self,
        factory: &dyn ProviderFactory,
        current_url: &Url,
        on_redirect: impl FnOnce(AppState),
    ) -> InitOutcome {
        if self.session.borrow().phase != SessionPhase::Uninitialized {
            tracing::warn!("Ignoring repeated initialization of the auth session");
            return InitOutcome::Failed {
                error: AuthError::AlreadyInitialized,
            };
        }
        self.session.borrow_mut().phase = SessionPhase::Loading;
        tracing::trace!(domain = %self.config.domain, "Initializing auth session...");

        let client = match factory.create(&self.config).await {
            Ok(client) => client,
            Err(err) => {
                tracing::error!(
                    ?err,
                    "Could not construct identity provider client. Auth session stays loading."
                );
                return InitOutcome::Failed {
                    error: AuthError::ClientConstruction { source: err },
                };
            }
        };
        if self.client.set(Rc::clone(&client)).is_err() {
            return InitOutcome::Failed {
                error: AuthError::AlreadyInitialized,
            };
        }

        let params = parse_auth_params(current_url.query().unwrap_or_default());
        if params.is_redirect_callback() {
            tracing::trace!("Received an authorization code. Processing redirect callback.");
            let app_state = match client.handle_redirect_callback(current_url).await {
                Ok(RedirectLoginResult { app_state }) => app_state,
                Err(err) => {
                    tracing::error!(
                        ?err,
                        "Could not process redirect callback. Continuing with an empty app state."
                    );
                    AppState::default()
                }
            };
            on_redirect(app_state);
        }

        match resolve_user(client.as_ref()).await {
            Ok(Some(user)) => {
                tracing::debug!(sub = %user.sub, "User is authenticated");
                let mut session = self.session.borrow_mut();
                session.phase = SessionPhase::Authenticated;
                session.user = Some(user.clone());
                InitOutcome::Authenticated { user: Some(user) }
            }
            Ok(None) => {
                tracing::debug!("User is not authenticated");
                let mut session = self.session.borrow_mut();
                session.phase = SessionPhase::Unauthenticated;
                session.user = None;
                InitOutcome::Unauthenticated
            }
            Err(err) => {
                tracing::error!(
                    ?err,
                    "Could not determine authentication state. Auth session stays loading."
                );
                InitOutcome::Failed {
                    error: AuthError::Provider { source: err },
                }
            }
        }
    }

    fn client(&self) -> Result<Rc<dyn IdentityProvider>, AuthError> {
        self.client.get().cloned().context(NotInitializedSnafu)
    }

    /// Redirects the browser to the provider's login page.
    pub async fn login(&self, options: LoginOptions) -> Result<(), AuthError> {
        tracing::trace!("Logging in...");
        self.client()?
            .login_with_redirect(options)
            .await
            .context(ProviderSnafu)
    }

    /// Ends the provider session. The in-memory session becomes `Unauthenticated`.
    pub async fn logout(&self, options: LogoutOptions) -> Result<(), AuthError> {
        tracing::trace!("Logging out...");
        self.client()?.logout(options).await.context(ProviderSnafu)?;

        let mut session = self.session.borrow_mut();
        if session.phase == SessionPhase::Authenticated {
            session.phase = SessionPhase::Unauthenticated;
            session.user = None;
        }
        Ok(())
    }

    pub async fn get_id_token_claims(
        &self,
        options: ClaimsOptions,
    ) -> Result<Option<IdTokenClaims>, AuthError> {
        self.client()?
            .get_id_token_claims(options)
            .await
            .context(ProviderSnafu)
    }

    pub async fn get_token_silently(&self, options: TokenOptions) -> Result<String, AuthError> {
        self.client()?
            .get_token_silently(options)
            .await
            .context(ProviderSnafu)
    }

    pub async fn get_token_with_popup(&self, options: PopupOptions) -> Result<String, AuthError> {
        self.client()?
            .get_token_with_popup(options)
            .await
            .context(ProviderSnafu)
    }
}

/// The logged-in user, `None` if the provider holds no session.
async fn resolve_user(client: &dyn IdentityProvider) -> Result<Option<UserProfile>, ProviderError> {
    if !client.is_authenticated().await? {
        return Ok(None);
    }
    match client.get_user().await? {
        Some(user) => Ok(Some(user)),
        None => {
            tracing::warn!(
                "Provider reports an authenticated session but returned no user profile"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assertr::prelude::*;

    #[test]
    fn fresh_session_is_loading_with_unknown_status() {
        let session = Session::default();
        assert_that(session.loading()).is_true();
        assert_that(session.is_authenticated()).is_equal_to(None);
    }

    #[test]
    fn resolved_sessions_are_not_loading() {
        let authenticated = Session {
            phase: SessionPhase::Authenticated,
            user: Some(UserProfile::new("u")),
        };
        assert_that(authenticated.loading()).is_false();
        assert_that(authenticated.is_authenticated()).is_equal_to(Some(true));

        let unauthenticated = Session {
            phase: SessionPhase::Unauthenticated,
            user: None,
        };
        assert_that(unauthenticated.loading()).is_false();
        assert_that(unauthenticated.is_authenticated()).is_equal_to(Some(false));
    }

    #[test]
    fn controller_starts_uninitialized() {
        let controller = SessionController::new(AuthConfig::new("d", "c"));
        assert_that(controller.session().phase).is_equal_to(SessionPhase::Uninitialized);
        assert_that(controller.loading()).is_true();
    }
}
