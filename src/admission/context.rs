use crate::models::{AuthenticationToken, AuthorizationToken};

/// The per-request outcome of credential resolution.
///
/// Holds at most one first-party principal, at most one third-party
/// principal, and whether the first-party credential arrived via a
/// request parameter rather than only via cookies. The admission
/// middleware builds this once per request and attaches it to the
/// request extensions, so every downstream stage observes identical
/// values; it is dropped when the request completes.
///
/// Absence of a principal is not an error at this layer. Whether an
/// anonymous request is acceptable is an authorization decision that
/// belongs to the handler consuming this context.
#[derive(Clone, Debug, Default)]
pub struct ResolvedContext {
    /// The authenticated first-party token, if a credential was supplied.
    pub authentication: Option<AuthenticationToken>,
    /// True iff at least one `auth_token` parameter occurrence existed,
    /// even when the same value also arrived as a cookie.
    pub token_is_from_parameter: bool,
    /// The authorized third-party token, if a Bearer credential was
    /// supplied.
    pub authorization: Option<AuthorizationToken>,
}
