//! Round-robin pool of API credentials.
//!
//! The pool owns an ordered, non-empty list of credentials and a cursor.
//! The cursor only moves through [`CredentialPool::rotate`] and always wraps,
//! so `0 <= cursor < size` holds for the lifetime of the pool.

use std::fmt;

use crate::errors::{Result, VtUrlsError};

/// Ordered credential list plus rotation cursor.
#[derive(Clone)]
pub struct CredentialPool {
    credentials: Vec<String>,
    cursor: usize,
}

impl CredentialPool {
    /// Build a pool from caller-supplied credentials.
    ///
    /// Fails with `InvalidConfiguration` when the collection is empty.
    pub fn new<I, S>(credentials: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let credentials: Vec<String> = credentials.into_iter().map(Into::into).collect();
        if credentials.is_empty() {
            return Err(VtUrlsError::configuration(
                "at least one API credential must be provided",
            ));
        }
        Ok(Self {
            credentials,
            cursor: 0,
        })
    }

    /// Credential at the cursor.
    pub fn current(&self) -> &str {
        &self.credentials[self.cursor]
    }

    /// Advance the cursor, wrapping at the end of the list.
    pub fn rotate(&mut self) {
        self.cursor = (self.cursor + 1) % self.credentials.len();
    }

    /// Number of credentials in the pool (always at least one).
    pub fn size(&self) -> usize {
        self.credentials.len()
    }

    /// Zero-based cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// One-based position of the current credential, for log messages.
    pub fn position(&self) -> usize {
        self.cursor + 1
    }
}

// Credential values must never end up in logs.
impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("size", &self.credentials.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
