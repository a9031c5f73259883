use async_trait::async_trait;
use leptos_redirect_auth::{
    AppState, AuthConfig, ClaimsOptions, IdTokenClaims, IdentityProvider, LoginOptions,
    LogoutOptions, PopupOptions, ProviderError, ProviderFactory, RedirectLoginResult,
    TokenOptions, UserProfile,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use url::Url;

/// Scripted identity provider recording every call made to it.
#[derive(Debug)]
pub struct FakeProvider {
    pub authenticated: Cell<bool>,
    pub user: RefCell<Option<UserProfile>>,
    pub callback_result: RefCell<Result<RedirectLoginResult, ProviderError>>,
    pub status_error: RefCell<Option<ProviderError>>,
    pub token_result: RefCell<Result<String, ProviderError>>,

    pub redirect_callbacks: RefCell<Vec<Url>>,
    pub logins: Cell<usize>,
    pub logouts: Cell<usize>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            authenticated: Cell::new(false),
            user: RefCell::new(None),
            callback_result: RefCell::new(Ok(RedirectLoginResult::default())),
            status_error: RefCell::new(None),
            token_result: RefCell::new(Ok("access-token".to_owned())),
            redirect_callbacks: RefCell::new(Vec::new()),
            logins: Cell::new(0),
            logouts: Cell::new(0),
        }
    }
}

impl FakeProvider {
    pub fn logged_in_as(user: UserProfile) -> Self {
        Self {
            authenticated: Cell::new(true),
            user: RefCell::new(Some(user)),
            ..Default::default()
        }
    }

    pub fn with_callback_result(self, result: Result<AppState, ProviderError>) -> Self {
        self.callback_result
            .replace(result.map(|app_state| RedirectLoginResult { app_state }));
        self
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeProvider {
    async fn is_authenticated(&self) -> Result<bool, ProviderError> {
        match self.status_error.borrow().clone() {
            Some(err) => Err(err),
            None => Ok(self.authenticated.get()),
        }
    }

    async fn get_user(&self) -> Result<Option<UserProfile>, ProviderError> {
        Ok(self.user.borrow().clone())
    }

    async fn handle_redirect_callback(
        &self,
        url: &Url,
    ) -> Result<RedirectLoginResult, ProviderError> {
        self.redirect_callbacks.borrow_mut().push(url.clone());
        let result = self.callback_result.borrow().clone();
        if result.is_ok() {
            self.authenticated.set(true);
        }
        result
    }

    async fn login_with_redirect(&self, _options: LoginOptions) -> Result<(), ProviderError> {
        self.logins.set(self.logins.get() + 1);
        Ok(())
    }

    async fn logout(&self, _options: LogoutOptions) -> Result<(), ProviderError> {
        self.logouts.set(self.logouts.get() + 1);
        self.authenticated.set(false);
        Ok(())
    }

    async fn get_token_silently(&self, _options: TokenOptions) -> Result<String, ProviderError> {
        self.token_result.borrow().clone()
    }

    async fn get_token_with_popup(&self, _options: PopupOptions) -> Result<String, ProviderError> {
        Err(ProviderError::PopupClosed)
    }

    async fn get_id_token_claims(
        &self,
        _options: ClaimsOptions,
    ) -> Result<Option<IdTokenClaims>, ProviderError> {
        Ok(None)
    }
}

/// Hands out a shared [`FakeProvider`], or fails construction.
#[derive(Debug)]
pub struct FakeFactory {
    pub provider: Rc<FakeProvider>,
    pub construction_error: Option<ProviderError>,
    pub created: Cell<usize>,
}

impl FakeFactory {
    pub fn new(provider: FakeProvider) -> Self {
        Self {
            provider: Rc::new(provider),
            construction_error: None,
            created: Cell::new(0),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            construction_error: Some(error),
            ..Self::new(FakeProvider::default())
        }
    }
}

#[async_trait(?Send)]
impl ProviderFactory for FakeFactory {
    async fn create(&self, _config: &AuthConfig) -> Result<Rc<dyn IdentityProvider>, ProviderError> {
        self.created.set(self.created.get() + 1);
        match &self.construction_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.provider.clone()),
        }
    }
}
