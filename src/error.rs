use crate::provider::ProviderError;
use snafu::Snafu;

/// An enumeration representing various authentication-related errors.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AuthError {
    /// An operation was attempted before the identity provider client was bound.
    #[snafu(display("AuthError: The identity provider client is not yet initialized"))]
    NotInitialized,

    #[snafu(display("AuthError: Initialization was already started"))]
    AlreadyInitialized,

    #[snafu(display("AuthError: Could not construct the identity provider client"))]
    ClientConstruction { source: ProviderError },

    /// Error reported by the identity provider. The source is passed on unchanged.
    #[snafu(display("AuthError: The identity provider reported an error: {source}"))]
    Provider { source: ProviderError },
}

impl AuthError {
    /// Access the error reported by the identity provider, if this error originated there.
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            AuthError::ClientConstruction { source } | AuthError::Provider { source } => {
                Some(source)
            }
            AuthError::NotInitialized | AuthError::AlreadyInitialized => None,
        }
    }
}
