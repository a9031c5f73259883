use crate::config::UseAuthOptions;
use crate::error::AuthError;
use crate::location::{current_url, origin_of, redirect_target, replace_current_entry};
use crate::provider::{
    AppState, ClaimsOptions, IdTokenClaims, LoginOptions, LogoutOptions, PopupOptions,
    ProviderFactory, TokenOptions, UserProfile,
};
use crate::session::{Session, SessionController};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use std::rc::Rc;
use std::sync::Arc;

/// Provider factory shareable across the component tree.
pub type SharedProviderFactory = Arc<dyn ProviderFactory + Send + Sync>;

/// Reactive handle to the authentication session.
///
/// Provided as context by [`init_auth_session`]. Use
/// ```no_run
/// use leptos_redirect_auth::use_auth_session;
///
/// let auth = use_auth_session();
/// ```
/// in any component rendered below the component that initialized the session.
///
/// All signals are read-only. The session only changes through initialization and logout.
#[derive(Debug, Clone, Copy)]
pub struct AuthSession {
    controller: StoredValue<Rc<SessionController>, LocalStorage>,
    set_session: WriteSignal<Session>,

    /// The complete session. Prefer the derived signals below.
    pub session: Signal<Session>,

    /// `true` until the session finished initializing.
    pub loading: Signal<bool>,

    /// `None` while loading.
    pub is_authenticated: Signal<Option<bool>>,

    pub user: Signal<Option<UserProfile>>,
}

/// Creates the session, provides it as context and starts its initialization in the background.
///
/// Must be called exactly once, below a `Router`.
pub fn init_auth_session(options: UseAuthOptions, factory: SharedProviderFactory) -> AuthSession {
    tracing::trace!("Initializing auth session...");

    let UseAuthOptions {
        mut config,
        on_redirect_callback,
    } = options;

    let url = current_url();
    if let Some(url) = &url {
        config.redirect_uri = Some(config.redirect_uri_or(&origin_of(url)));
    }

    let controller = Rc::new(SessionController::new(config));
    let (session, set_session) = signal(Session::default());

    let auth = AuthSession {
        controller: StoredValue::new_local(Rc::clone(&controller)),
        set_session,
        session: session.into(),
        loading: Signal::derive(move || session.read().loading()),
        is_authenticated: Signal::derive(move || session.read().is_authenticated()),
        user: Signal::derive(move || session.read().user.clone()),
    };

    // We guarantee that the AuthSession is provided as context.
    provide_context(auth);

    let Some(url) = url else {
        tracing::error!("Could not read the current location. Auth session stays loading.");
        return auth;
    };

    let navigate = use_navigate();
    spawn_local(async move {
        let on_redirect = |app_state: AppState| match on_redirect_callback {
            Some(callback) => callback.run(app_state),
            None => replace_current_entry(&navigate, &redirect_target(&url, &app_state)),
        };
        let outcome = controller
            .initialize(factory.as_ref(), &url, on_redirect)
            .await;
        tracing::debug!(?outcome, "Auth session initialization finished");
        set_session.set(controller.session());
    });

    auth
}

/// Fetches the [`AuthSession`] provided by [`init_auth_session`].
///
/// # Panics
/// If no session was initialized above the calling component.
pub fn use_auth_session() -> AuthSession {
    expect_context::<AuthSession>()
}

pub fn try_use_auth_session() -> Option<AuthSession> {
    use_context::<AuthSession>()
}

impl AuthSession {
    /// Read-only access to the underlying controller.
    pub fn controller(&self) -> Rc<SessionController> {
        self.controller.get_value()
    }

    pub async fn login(&self, options: LoginOptions) -> Result<(), AuthError> {
        self.controller().login(options).await
    }

    pub async fn logout(&self, options: LogoutOptions) -> Result<(), AuthError> {
        let controller = self.controller();
        let result = controller.logout(options).await;
        self.set_session.set(controller.session());
        result
    }

    pub async fn get_id_token_claims(
        &self,
        options: ClaimsOptions,
    ) -> Result<Option<IdTokenClaims>, AuthError> {
        self.controller().get_id_token_claims(options).await
    }

    pub async fn get_token_silently(&self, options: TokenOptions) -> Result<String, AuthError> {
        self.controller().get_token_silently(options).await
    }

    pub async fn get_token_with_popup(&self, options: PopupOptions) -> Result<String, AuthError> {
        self.controller().get_token_with_popup(options).await
    }

    /// Starts a login in the background. Failures are logged.
    pub fn spawn_login(&self, options: LoginOptions) {
        let this = *self;
        spawn_local(async move {
            if let Err(err) = this.login(options).await {
                tracing::error!(?err, "Could not log in.");
            }
        });
    }

    /// Starts a logout in the background. Failures are logged.
    pub fn spawn_logout(&self, options: LogoutOptions) {
        let this = *self;
        spawn_local(async move {
            if let Err(err) = this.logout(options).await {
                tracing::error!(?err, "Could not log out.");
            }
        });
    }
}
