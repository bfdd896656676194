use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::TransportError;

/// A GSS credential handle produced outside this crate.
///
/// Implementations wrap whatever the GSS binding hands out (a
/// `libgssapi::credential::Cred`, an SSPI handle, ...). The only operation
/// this crate needs is [`dispose`](Self::dispose), which releases the
/// underlying key material.
pub trait GssCredential: Send + Sync {
    /// Releases the credential.
    ///
    /// Called at most once by [`ScopedCredential`]. Implementations should
    /// tolerate being disposed more than once when shared elsewhere.
    ///
    /// # Errors
    ///
    /// A failed release is reported as [`TransportError::Gss`] carrying the
    /// status of `gss_release_cred`.
    fn dispose(&self) -> Result<(), TransportError>;
}

/// Opaque handle to a credential delegated by an authenticated client.
///
/// Cloning shares the same handle; equality is handle identity, so a
/// credential read back from a principal compares equal to the one that was
/// stored there.
///
/// # Security Properties
///
/// - Debug and Display output never shows the credential
/// - Release only happens through [`dispose`](Self::dispose) or a
///   [`ScopedCredential`]
#[derive(Clone)]
pub struct DelegatedCredential {
    handle: Arc<dyn GssCredential>,
}

impl DelegatedCredential {
    /// Wraps a credential handle.
    pub fn new(credential: impl GssCredential + 'static) -> Self {
        Self {
            handle: Arc::new(credential),
        }
    }

    /// Returns `true` if both values refer to the same handle.
    pub fn same_handle(&self, other: &DelegatedCredential) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }

    /// Releases the underlying credential.
    pub fn dispose(&self) -> Result<(), TransportError> {
        self.handle.dispose()
    }
}

impl PartialEq for DelegatedCredential {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(other)
    }
}

impl Eq for DelegatedCredential {}

impl fmt::Debug for DelegatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DelegatedCredential([REDACTED])")
    }
}

impl fmt::Display for DelegatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// A credential whose release is tied to this value's lifetime.
///
/// When created with `dispose = true` the credential is disposed exactly
/// once, when the `ScopedCredential` is dropped. That covers every exit path
/// of whoever owns it, including early returns and unwinding.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use spnego_core::{DelegatedCredential, GssCredential, ScopedCredential, TransportError};
///
/// struct Counted(Arc<AtomicUsize>);
///
/// impl GssCredential for Counted {
///     fn dispose(&self) -> Result<(), TransportError> {
///         self.0.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let disposals = Arc::new(AtomicUsize::new(0));
/// let credential = DelegatedCredential::new(Counted(disposals.clone()));
///
/// drop(ScopedCredential::new(credential, true));
/// assert_eq!(disposals.load(Ordering::SeqCst), 1);
/// ```
pub struct ScopedCredential {
    credential: DelegatedCredential,
    dispose: bool,
}

impl ScopedCredential {
    /// Takes ownership of `credential`, disposing it on drop if `dispose` is set.
    pub fn new(credential: DelegatedCredential, dispose: bool) -> Self {
        Self {
            credential,
            dispose,
        }
    }

    /// Returns the held credential.
    pub fn credential(&self) -> &DelegatedCredential {
        &self.credential
    }

    /// Returns `true` if the credential is disposed on drop.
    pub fn disposes_on_drop(&self) -> bool {
        self.dispose
    }
}

impl Drop for ScopedCredential {
    fn drop(&mut self) {
        if !self.dispose {
            return;
        }
        if let Err(error) = self.credential.dispose() {
            tracing::warn!(%error, "failed to dispose GSS credential");
        }
    }
}

impl fmt::Debug for ScopedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedCredential")
            .field("credential", &self.credential)
            .field("dispose", &self.dispose)
            .finish()
    }
}

/// A password that never shows up in formatted output.
///
/// Access requires the explicit [`expose_secret`](Self::expose_secret) call.
// Do NOT derive Clone, Debug or Serialize: each would bypass redaction.
#[derive(Deserialize)]
#[serde(transparent)]
pub struct Password {
    inner: String,
}

impl Password {
    /// Wraps a password.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Explicitly exposes the password.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
