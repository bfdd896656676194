use std::fmt;

use crate::credential::DelegatedCredential;

/// The identity resulting from a successful SPNEGO negotiation.
///
/// The name usually has the `user@REALM` form. A delegated credential is
/// present only if the client explicitly allowed delegation.
///
/// # Examples
///
/// ```
/// use spnego_core::KerberosPrincipal;
///
/// let principal = KerberosPrincipal::new("jdoe@EXAMPLE.COM");
/// assert_eq!(principal.user_name(), "jdoe");
/// assert_eq!(principal.realm(), Some("EXAMPLE.COM"));
/// assert!(principal.delegated_credential().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KerberosPrincipal {
    name: String,
    delegated_credential: Option<DelegatedCredential>,
}

impl KerberosPrincipal {
    /// Creates a principal without a delegated credential.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delegated_credential: None,
        }
    }

    /// Attaches the credential the client delegated during negotiation.
    pub fn with_delegated_credential(mut self, credential: DelegatedCredential) -> Self {
        self.delegated_credential = Some(credential);
        self
    }

    /// Returns the full principal name, realm included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the delegated credential, if any.
    pub fn delegated_credential(&self) -> Option<&DelegatedCredential> {
        self.delegated_credential.as_ref()
    }

    /// Returns the name without its realm.
    ///
    /// The realm is everything after the *last* `@`. A name without `@` is
    /// returned unchanged.
    pub fn user_name(&self) -> &str {
        match self.name.rfind('@') {
            Some(index) => &self.name[..index],
            None => &self.name,
        }
    }

    /// Returns the realm, if the name carries one.
    pub fn realm(&self) -> Option<&str> {
        self.name.rfind('@').map(|index| &self.name[index + 1..])
    }
}

impl fmt::Display for KerberosPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_name_strips_realm() {
        assert_eq!(KerberosPrincipal::new("jdoe@EXAMPLE.COM").user_name(), "jdoe");
    }

    #[test]
    fn user_name_uses_last_at_sign() {
        let principal = KerberosPrincipal::new("j@d@REALM");

        assert_eq!(principal.user_name(), "j@d");
        assert_eq!(principal.realm(), Some("REALM"));
    }

    #[test]
    fn name_without_realm_is_unchanged() {
        let principal = KerberosPrincipal::new("jdoe");

        assert_eq!(principal.user_name(), "jdoe");
        assert_eq!(principal.realm(), None);
    }

    #[test]
    fn empty_name_is_allowed() {
        let principal = KerberosPrincipal::new("");

        assert_eq!(principal.user_name(), "");
        assert_eq!(principal.realm(), None);
    }

    #[test]
    fn trailing_at_gives_empty_realm() {
        let principal = KerberosPrincipal::new("service@");

        assert_eq!(principal.user_name(), "service");
        assert_eq!(principal.realm(), Some(""));
    }

    #[test]
    fn display_shows_full_name() {
        assert_eq!(
            KerberosPrincipal::new("alice@CORP.LOCAL").to_string(),
            "alice@CORP.LOCAL"
        );
    }
}
