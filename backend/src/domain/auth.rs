//! Caller identity handed over by the OAuth provider, and the post-login
//! redirect policy.
//!
//! The identity is display-only; nothing in the account paths consults it.

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::domain::{AccountValidationError, EmailAddress};

/// Path used when a requested redirect target is not acceptable.
pub const FALLBACK_REDIRECT_PATH: &str = "/dashboard";

/// Signed-in caller as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionIdentity {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl SessionIdentity {
    /// Normalise provider-supplied fields: trim everything, drop blanks and
    /// require a well-formed email.
    ///
    /// # Errors
    /// The email is blank or malformed.
    pub fn new(
        name: Option<&str>,
        email: &str,
        image: Option<&str>,
    ) -> Result<Self, AccountValidationError> {
        let email = EmailAddress::parse(Some(email))?;
        let keep = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        Ok(Self {
            name: keep(name),
            email: email.to_string(),
            image: keep(image),
        })
    }
}

/// Where to send the browser after sign-in.
///
/// Relative targets (`/...`) are appended to `base`; absolute targets on the
/// same origin are kept; anything else, including unparsable input, lands on
/// [`FALLBACK_REDIRECT_PATH`].
#[must_use]
pub fn resolve_redirect(base: &Url, target: &str) -> Url {
    let fallback = || join(base, FALLBACK_REDIRECT_PATH).unwrap_or_else(|| base.clone());
    if target.starts_with('/') {
        return join(base, target).unwrap_or_else(fallback);
    }
    match Url::parse(target) {
        Ok(url) if url.origin() == base.origin() => url,
        _ => fallback(),
    }
}

fn join(base: &Url, path: &str) -> Option<Url> {
    let root = base.as_str().trim_end_matches('/');
    Url::parse(&format!("{root}{path}")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn base() -> Url {
        Url::parse("https://app.example.com").expect("valid base")
    }

    #[rstest]
    #[case("/settings", "https://app.example.com/settings")]
    #[case("https://app.example.com/users?x=1", "https://app.example.com/users?x=1")]
    #[case("https://evil.example.net/phish", "https://app.example.com/dashboard")]
    #[case("http://app.example.com/users", "https://app.example.com/dashboard")]
    #[case("javascript:alert(1)", "https://app.example.com/dashboard")]
    #[case("not a url", "https://app.example.com/dashboard")]
    fn redirect_policy(base: Url, #[case] target: &str, #[case] expected: &str) {
        assert_eq!(resolve_redirect(&base, target).as_str(), expected);
    }

    #[rstest]
    fn relative_targets_keep_base_path() {
        let base = Url::parse("https://example.com/app/").expect("valid base");
        assert_eq!(
            resolve_redirect(&base, "/users").as_str(),
            "https://example.com/app/users"
        );
    }

    #[rstest]
    fn identity_trims_and_drops_blank_fields() {
        let identity =
            SessionIdentity::new(Some("  "), " ann@example.com ", Some(" https://img/a.png "))
                .expect("valid identity");
        assert_eq!(identity.name, None);
        assert_eq!(identity.email, "ann@example.com");
        assert_eq!(identity.image.as_deref(), Some("https://img/a.png"));
    }

    #[rstest]
    fn identity_requires_valid_email() {
        assert_eq!(
            SessionIdentity::new(None, "nobody", None),
            Err(AccountValidationError::InvalidEmail)
        );
    }
}
