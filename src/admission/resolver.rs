use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::context::ResolvedContext;
use crate::store::TokenStore;

/// The cookie and parameter key that carries the first-party credential.
pub const AUTHENTICATION_TOKEN_KEY: &str = "auth_token";
/// The header that carries third-party credentials.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// The only Authorization scheme admission understands.
pub const BEARER_SCHEME: &str = "Bearer";

/// Why a request was refused admission.
///
/// The first two variants are authentication failures and map to 401 at
/// the HTTP boundary; `Store` is a lookup fault, not an admission
/// decision, and maps to 500.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// Two or more differing values were supplied for what must be a
    /// single credential.
    #[error("conflicting credentials: {0}")]
    ConflictingCredentials(&'static str),
    /// A supplied credential does not resolve in the token store, or
    /// resolves to a token that is no longer valid.
    #[error("unknown or invalid credential: {0}")]
    UnknownOrInvalidCredential(&'static str),
    /// The token store failed while looking up a credential.
    #[error("token store lookup failed: {0}")]
    Store(String),
}

/// Resolves the credentials on one inbound request against the token
/// store.
///
/// The resolver owns no state besides the injected store handle; a
/// `resolve` call is a pure function of the request's cookies,
/// parameters, and headers plus the store's current contents. Concurrent
/// invocations are fully independent.
pub struct AdmissionResolver {
    store: Arc<dyn TokenStore>,
}

// First occurrence wins; every later occurrence must match it exactly.
fn claim<'a>(
    claimed: &mut Option<&'a str>,
    candidate: &'a str,
    conflict: &'static str,
) -> Result<(), AdmissionError> {
    match claimed {
        None => {
            *claimed = Some(candidate);
            Ok(())
        }
        Some(seen) if *seen == candidate => Ok(()),
        Some(_) => Err(AdmissionError::ConflictingCredentials(conflict)),
    }
}

impl AdmissionResolver {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        AdmissionResolver { store }
    }

    /// Runs the admission procedure for one request.
    ///
    /// Determines the authenticated first-party principal from
    /// `auth_token` cookies and parameters, and independently the
    /// authorized third-party principal from `Authorization: Bearer`
    /// headers. There is no concern how many times a credential is sent
    /// as long as every occurrence is identical. Supplying no credential
    /// at all is legal and yields an absent principal.
    pub async fn resolve(
        &self,
        cookies: &[(String, String)],
        parameters: &HashMap<String, Vec<String>>,
        headers: &[(String, String)],
    ) -> Result<ResolvedContext, AdmissionError> {
        // Gather the authentication-token candidates from the cookies.
        let mut auth_token: Option<&str> = None;
        for (name, value) in cookies {
            if name == AUTHENTICATION_TOKEN_KEY {
                claim(
                    &mut auth_token,
                    value,
                    "multiple, different authentication tokens were given",
                )?;
            }
        }

        // Then from the parameters, which may carry multiple values under
        // the one key. A parameter occurrence sets the from-parameter
        // flag even when the same value also arrived as a cookie.
        let mut token_is_from_parameter = false;
        if let Some(values) = parameters.get(AUTHENTICATION_TOKEN_KEY) {
            if !values.is_empty() {
                token_is_from_parameter = true;
            }
            for value in values {
                claim(
                    &mut auth_token,
                    value,
                    "multiple, different authentication tokens were given",
                )?;
            }
        }

        // Resolve the claimed token, if any, against the store.
        let authentication = match auth_token {
            None => None,
            Some(candidate) => {
                let token = self
                    .store
                    .authentication_token(candidate)
                    .await
                    .map_err(AdmissionError::Store)?
                    .ok_or(AdmissionError::UnknownOrInvalidCredential(
                        "the authentication token is unknown",
                    ))?;
                if !token.is_valid() {
                    return Err(AdmissionError::UnknownOrInvalidCredential(
                        "this token is no longer valid",
                    ));
                }
                Some(token)
            }
        };

        // Gather the third-party credential from the Authorization
        // headers, of which there may be multiple. Only the Bearer scheme
        // is understood; values that do not split into exactly two parts
        // carry an unsupported or malformed scheme and are skipped.
        let mut bearer: Option<&str> = None;
        for (name, value) in headers {
            if !name.eq_ignore_ascii_case(AUTHORIZATION_HEADER) {
                continue;
            }
            let parts: Vec<&str> = value.split(' ').collect();
            if parts.len() != 2 {
                continue;
            }
            if parts[0] == BEARER_SCHEME {
                claim(
                    &mut bearer,
                    parts[1],
                    "multiple, different third-party credentials were given",
                )?;
            }
        }

        let authorization = match bearer {
            None => None,
            Some(candidate) => {
                let token = self
                    .store
                    .authorization_token(candidate)
                    .await
                    .map_err(AdmissionError::Store)?;
                match token {
                    Some(token) if token.is_valid() => Some(token),
                    _ => {
                        return Err(AdmissionError::UnknownOrInvalidCredential(
                            "the authorization token is unknown or expired",
                        ));
                    }
                }
            }
        };

        debug!(
            authenticated = authentication.is_some(),
            authorized = authorization.is_some(),
            token_is_from_parameter,
            "request admitted"
        );

        Ok(ResolvedContext {
            authentication,
            token_is_from_parameter,
            authorization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthenticationToken, AuthorizationToken};
    use crate::store::memory_store::{MemoryConfig, MemoryStore};

    fn cookies(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    fn parameters(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(n, vs)| (n.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    fn resolver_with_tokens(
        authentication: Vec<AuthenticationToken>,
        authorization: Vec<AuthorizationToken>,
    ) -> AdmissionResolver {
        let store = MemoryStore::new(&MemoryConfig {
            authentication_tokens: authentication,
            authorization_tokens: authorization,
        });
        AdmissionResolver::new(Arc::new(store))
    }

    fn session_token(access_token: &str) -> AuthenticationToken {
        let mut token = AuthenticationToken::new("adam", 3600);
        token.access_token = access_token.to_string();
        token
    }

    fn bearer_token(access_token: &str) -> AuthorizationToken {
        let mut token = AuthorizationToken::new("dashboard", "adam", HashMap::new(), 3600);
        token.access_token = access_token.to_string();
        token
    }

    #[tokio::test]
    async fn cookie_token_resolves_without_parameter_flag() {
        let resolver = resolver_with_tokens(vec![session_token("T1")], vec![]);

        let context = resolver
            .resolve(&cookies(&[("auth_token", "T1")]), &HashMap::new(), &[])
            .await
            .expect("resolution should succeed");

        assert_eq!(
            context.authentication.map(|t| t.access_token),
            Some("T1".to_string())
        );
        assert!(!context.token_is_from_parameter);
        assert!(context.authorization.is_none());
    }

    #[tokio::test]
    async fn parameter_token_sets_parameter_flag() {
        let resolver = resolver_with_tokens(vec![session_token("T1")], vec![]);

        let context = resolver
            .resolve(&[], &parameters(&[("auth_token", &["T1"])]), &[])
            .await
            .expect("resolution should succeed");

        assert!(context.token_is_from_parameter);
    }

    #[tokio::test]
    async fn matching_cookie_and_parameter_set_parameter_flag() {
        let resolver = resolver_with_tokens(vec![session_token("T1")], vec![]);

        let context = resolver
            .resolve(
                &cookies(&[("auth_token", "T1")]),
                &parameters(&[("auth_token", &["T1"])]),
                &[],
            )
            .await
            .expect("identical duplicates are not a conflict");

        assert!(context.token_is_from_parameter);
        assert!(context.authentication.is_some());
    }

    #[tokio::test]
    async fn differing_cookie_and_parameter_conflict() {
        let resolver = resolver_with_tokens(vec![session_token("T1")], vec![]);

        let error = resolver
            .resolve(
                &cookies(&[("auth_token", "T1")]),
                &parameters(&[("auth_token", &["T2"])]),
                &[],
            )
            .await
            .expect_err("differing tokens must conflict");

        assert!(matches!(error, AdmissionError::ConflictingCredentials(_)));
    }

    #[tokio::test]
    async fn differing_cookies_conflict() {
        let resolver = resolver_with_tokens(vec![session_token("T1")], vec![]);

        let error = resolver
            .resolve(
                &cookies(&[("auth_token", "T1"), ("auth_token", "T2")]),
                &HashMap::new(),
                &[],
            )
            .await
            .expect_err("differing cookies must conflict");

        assert!(matches!(error, AdmissionError::ConflictingCredentials(_)));
    }

    #[tokio::test]
    async fn differing_parameter_values_conflict() {
        let resolver = resolver_with_tokens(vec![session_token("T1")], vec![]);

        let error = resolver
            .resolve(&[], &parameters(&[("auth_token", &["T1", "T2"])]), &[])
            .await
            .expect_err("differing parameter values must conflict");

        assert!(matches!(error, AdmissionError::ConflictingCredentials(_)));
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let resolver = resolver_with_tokens(vec![], vec![]);

        let error = resolver
            .resolve(&cookies(&[("auth_token", "nope")]), &HashMap::new(), &[])
            .await
            .expect_err("unknown token must be rejected");

        assert_eq!(
            error,
            AdmissionError::UnknownOrInvalidCredential("the authentication token is unknown")
        );
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let mut token = session_token("T1");
        token.expires = token.granted - 1;
        let resolver = resolver_with_tokens(vec![token], vec![]);

        let error = resolver
            .resolve(&cookies(&[("auth_token", "T1")]), &HashMap::new(), &[])
            .await
            .expect_err("expired token must be rejected");

        assert_eq!(
            error,
            AdmissionError::UnknownOrInvalidCredential("this token is no longer valid")
        );
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let mut token = session_token("T1");
        token.invalidated = true;
        let resolver = resolver_with_tokens(vec![token], vec![]);

        let error = resolver
            .resolve(&cookies(&[("auth_token", "T1")]), &HashMap::new(), &[])
            .await
            .expect_err("revoked token must be rejected");

        assert!(matches!(
            error,
            AdmissionError::UnknownOrInvalidCredential(_)
        ));
    }

    #[tokio::test]
    async fn no_credentials_is_anonymous_not_an_error() {
        let resolver = resolver_with_tokens(vec![], vec![]);

        let context = resolver
            .resolve(&[], &HashMap::new(), &[])
            .await
            .expect("anonymous requests are admitted");

        assert!(context.authentication.is_none());
        assert!(!context.token_is_from_parameter);
        assert!(context.authorization.is_none());
    }

    #[tokio::test]
    async fn parameter_key_with_no_values_does_not_set_flag() {
        let resolver = resolver_with_tokens(vec![], vec![]);

        let context = resolver
            .resolve(&[], &parameters(&[("auth_token", &[])]), &[])
            .await
            .expect("an empty value list is not a credential");

        assert!(!context.token_is_from_parameter);
        assert!(context.authentication.is_none());
    }

    #[tokio::test]
    async fn repeated_identical_bearer_headers_resolve_once() {
        let resolver = resolver_with_tokens(vec![], vec![bearer_token("AAA")]);

        let context = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[
                    ("Authorization", "Bearer AAA"),
                    ("Authorization", "Bearer AAA"),
                ]),
            )
            .await
            .expect("identical bearer headers are not a conflict");

        assert_eq!(
            context.authorization.map(|t| t.access_token),
            Some("AAA".to_string())
        );
    }

    #[tokio::test]
    async fn differing_bearer_headers_conflict() {
        let resolver = resolver_with_tokens(vec![], vec![bearer_token("AAA")]);

        let error = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[
                    ("Authorization", "Bearer AAA"),
                    ("Authorization", "Bearer BBB"),
                ]),
            )
            .await
            .expect_err("differing bearer credentials must conflict");

        assert!(matches!(error, AdmissionError::ConflictingCredentials(_)));
    }

    #[tokio::test]
    async fn non_bearer_schemes_are_ignored() {
        let resolver = resolver_with_tokens(vec![], vec![]);

        let context = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[("Authorization", "Basic xyz")]),
            )
            .await
            .expect("non-Bearer schemes do not participate in admission");

        assert!(context.authorization.is_none());
    }

    #[tokio::test]
    async fn malformed_headers_are_ignored_alongside_a_valid_bearer() {
        let resolver = resolver_with_tokens(vec![], vec![bearer_token("AAA")]);

        let context = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[
                    ("Authorization", "Bearer"),
                    ("Authorization", "Bearer AAA extra"),
                    ("Authorization", "Basic xyz"),
                    ("Authorization", "Bearer AAA"),
                ]),
            )
            .await
            .expect("malformed headers must not affect resolution");

        assert_eq!(
            context.authorization.map(|t| t.access_token),
            Some("AAA".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_bearer_token_is_rejected() {
        let resolver = resolver_with_tokens(vec![], vec![]);

        let error = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[("Authorization", "Bearer nope")]),
            )
            .await
            .expect_err("unknown bearer token must be rejected");

        assert_eq!(
            error,
            AdmissionError::UnknownOrInvalidCredential(
                "the authorization token is unknown or expired"
            )
        );
    }

    #[tokio::test]
    async fn expired_bearer_token_is_rejected() {
        let mut token = bearer_token("AAA");
        token.expires = token.granted - 1;
        let resolver = resolver_with_tokens(vec![], vec![token]);

        let error = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[("Authorization", "Bearer AAA")]),
            )
            .await
            .expect_err("expired bearer token must be rejected");

        assert!(matches!(
            error,
            AdmissionError::UnknownOrInvalidCredential(_)
        ));
    }

    #[tokio::test]
    async fn header_name_comparison_is_case_insensitive() {
        let resolver = resolver_with_tokens(vec![], vec![bearer_token("AAA")]);

        let context = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[("authorization", "Bearer AAA")]),
            )
            .await
            .expect("header names compare case-insensitively");

        assert!(context.authorization.is_some());
    }

    #[tokio::test]
    async fn bearer_scheme_comparison_is_exact() {
        let resolver = resolver_with_tokens(vec![], vec![bearer_token("AAA")]);

        let context = resolver
            .resolve(
                &[],
                &HashMap::new(),
                &headers(&[("Authorization", "bearer AAA")]),
            )
            .await
            .expect("a lowercase scheme is an unsupported scheme, not an error");

        assert!(context.authorization.is_none());
    }

    #[tokio::test]
    async fn principals_resolve_independently() {
        let resolver = resolver_with_tokens(vec![session_token("T1")], vec![bearer_token("AAA")]);

        let context = resolver
            .resolve(
                &cookies(&[("auth_token", "T1")]),
                &HashMap::new(),
                &headers(&[("Authorization", "Bearer AAA")]),
            )
            .await
            .expect("both principals should resolve");

        assert!(context.authentication.is_some());
        assert!(context.authorization.is_some());
    }
}
