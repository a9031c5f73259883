use crate::location::strip_query;
use crate::params::{AuthParams, parse_auth_params};
use url::Url;

/// Message shown when the provider reported an error without an `error_description`.
pub const MISSING_DESCRIPTION: &str = "No further details were provided.";

/// A login failure reported by the identity provider, displayed to the user in a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub title: String,
    pub message: String,
}

impl ErrorNotice {
    /// Notice for the provider error carried in `params`, if any.
    pub fn from_params(params: &AuthParams) -> Option<Self> {
        let title = params.error.clone()?;
        let message = params
            .error_description
            .clone()
            .filter(|it| !it.trim().is_empty())
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_owned());
        Some(Self { title, message })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupCheck {
    /// No provider error in the inbound url. Nothing to do.
    Clean,

    /// A provider error was found. The visible url should be replaced with `cleaned_url`.
    ErrorDetected { cleaned_url: Url },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Idle,

    /// A logout must be issued now. The intent was already cleared.
    ForceLogout,
}

/// Tracks a provider-reported login error from its detection in the inbound url, through the
/// modal presenting it, up to the forced logout invalidating the broken session.
///
/// The forced logout is only released once the session finished loading and the user dismissed
/// the modal, in whatever order these two things happen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRecovery {
    notice: Option<ErrorNotice>,
    force_logout: bool,
}

impl ErrorRecovery {
    pub fn notice(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref()
    }

    /// The modal is visible exactly while a notice is held.
    pub fn modal_visible(&self) -> bool {
        self.notice.is_some()
    }

    pub fn force_logout_pending(&self) -> bool {
        self.force_logout
    }

    /// Inspects the url the application was started with for a provider error.
    pub fn check_startup(&mut self, current_url: &Url) -> StartupCheck {
        let params = parse_auth_params(current_url.query().unwrap_or_default());
        let Some(notice) = ErrorNotice::from_params(&params) else {
            return StartupCheck::Clean;
        };

        tracing::debug!(?notice, "Identity provider reported a login error");
        self.notice = Some(notice);
        self.force_logout = true;
        StartupCheck::ErrorDetected {
            cleaned_url: strip_query(current_url),
        }
    }

    /// The user acknowledged the error. Only hides the modal.
    pub fn dismiss(&mut self) {
        self.notice = None;
    }

    pub fn should_force_logout(&self, loading: bool) -> bool {
        self.force_logout && !loading && !self.modal_visible()
    }

    /// Decides whether the forced logout must be issued now. Does so at most once per error.
    pub fn reconcile(&mut self, loading: bool) -> Reconciliation {
        if self.should_force_logout(loading) {
            self.force_logout = false;
            Reconciliation::ForceLogout
        } else {
            Reconciliation::Idle
        }
    }
}
