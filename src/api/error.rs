/// Errors raised while talking to the identity platform or Microsoft Graph.
///
/// Messages carry the downstream response for diagnostics but never a client secret or token.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("login rejected: {0}")]
    LoginError(String),
    #[error("access denied: {0}")]
    Forbidden(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("unexpected API response: {0}")]
    UnexpectedApiResponse(String),
    #[error("invalid API response ({1}): {0}")]
    InvalidResponse(String, String),
    #[error("rate limit exceeded: {0}")]
    RateExceeded(String),
    /* device code flow: user has not finished signing in yet */
    #[error("authorization pending")]
    AuthorizationPending,
    /* device code flow: polling too fast */
    #[error("polling interval too short")]
    SlowDown,
    #[error("no active session")]
    NotConnected,
    #[error("internal error: {0}")]
    InternalError(String),
}
