//! Session-scoped holder of the raw API credential.

use std::rc::Rc;

use anyhow::{Context, Result};
use devportal_core::db::SessionStore;
use zeroize::Zeroize;

use crate::model::CredentialDescriptor;

/// Session storage key of the raw credential.
pub const SESSION_KEY: &str = "devportal.playground.api_key";

const MASK: &str = "••••••";
const MAX_VISIBLE: usize = 9;

/// Holds the pasted credential for the lifetime of the session.
///
/// The in-memory copy is zeroized whenever it is replaced, cleared, or the
/// vault is dropped.
pub struct KeyVault {
    raw: String,
    store: Rc<SessionStore>,
}

impl KeyVault {
    /// Empty vault bound to `store`. Nothing is read from the store.
    pub fn new(store: Rc<SessionStore>) -> Self {
        Self {
            raw: String::new(),
            store,
        }
    }

    /// Rebuild a vault from whatever the session store still holds.
    pub fn restore(store: Rc<SessionStore>) -> Result<Self> {
        let raw = store
            .get(SESSION_KEY)
            .context("Failed to read credential from session store")?
            .unwrap_or_default();
        Ok(Self { raw, store })
    }

    /// Store the trimmed value. An empty value removes the stored entry.
    pub fn set_raw_credential(&mut self, value: &str) -> Result<()> {
        self.raw.zeroize();
        self.raw = value.trim().to_string();
        if self.raw.is_empty() {
            self.store
                .remove(SESSION_KEY)
                .context("Failed to remove credential from session store")?;
        } else {
            self.store
                .set(SESSION_KEY, &self.raw)
                .context("Failed to write credential to session store")?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.raw.zeroize();
        self.raw.clear();
        self.store
            .remove(SESSION_KEY)
            .context("Failed to remove credential from session store")
    }

    /// The raw credential, if one is set.
    pub fn raw(&self) -> Option<&str> {
        (!self.raw.is_empty()).then_some(self.raw.as_str())
    }

    pub fn has_credential(&self) -> bool {
        !self.raw.is_empty()
    }

    /// Display form that never reveals the full secret, e.g. `sk_dev_ab••••••`.
    /// At most a third of the key, and never more than nine characters, is shown.
    pub fn masked(&self) -> Option<String> {
        let raw = self.raw()?;
        let shown = (raw.chars().count() / 3).min(MAX_VISIBLE);
        let head: String = raw.chars().take(shown).collect();
        Some(format!("{head}{MASK}"))
    }

    pub fn matched<'a>(&self, descriptors: &'a [CredentialDescriptor]) -> Option<&'a CredentialDescriptor> {
        match_against_descriptors(&self.raw, descriptors)
    }
}

impl Drop for KeyVault {
    fn drop(&mut self) {
        self.raw.zeroize();
    }
}

impl std::fmt::Debug for KeyVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyVault")
            .field("raw", &self.masked())
            .finish_non_exhaustive()
    }
}

/// First active descriptor whose prefix starts the trimmed raw key.
pub fn match_against_descriptors<'a>(
    raw: &str,
    descriptors: &'a [CredentialDescriptor],
) -> Option<&'a CredentialDescriptor> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    descriptors
        .iter()
        .filter(|d| d.is_active)
        .find(|d| raw.starts_with(&d.key_prefix))
}
