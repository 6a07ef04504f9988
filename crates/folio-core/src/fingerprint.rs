//! Anonymous client identity derived from request headers.
//!
//! A fingerprint is a heuristic: two browsers with identical headers behind
//! the same proxy hash to the same value and share one like.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const DELIMITER: &str = "|";

/// Hex-encoded SHA-256 of a client's header signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap a value previously produced by [`ClientSignature::fingerprint`].
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The request headers a fingerprint is derived from.
#[derive(Debug, Clone, Default)]
pub struct ClientSignature {
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
    pub accept_encoding: Option<String>,
    pub forwarded_for: Option<String>,
    pub real_ip: Option<String>,
    /// Socket peer address, used for the stored IP when no proxy header is set.
    pub peer_addr: Option<String>,
}

impl ClientSignature {
    /// First hop of `X-Forwarded-For`, i.e. the originating client.
    pub fn first_forwarded_hop(&self) -> Option<&str> {
        self.forwarded_for
            .as_deref()
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
    }

    /// Order-sensitive digest over the signature headers. Missing headers
    /// contribute an empty segment so positions never shift.
    pub fn fingerprint(&self) -> Fingerprint {
        let parts = [
            self.user_agent.as_deref().unwrap_or_default(),
            self.accept_language.as_deref().unwrap_or_default(),
            self.accept_encoding.as_deref().unwrap_or_default(),
            self.first_forwarded_hop().unwrap_or_default(),
            self.real_ip.as_deref().unwrap_or_default(),
        ];

        let mut hasher = Sha256::new();
        hasher.update(parts.join(DELIMITER).as_bytes());
        Fingerprint(hex::encode(hasher.finalize()))
    }

    /// Best-effort client address recorded on the like row.
    pub fn ip_address(&self) -> String {
        self.first_forwarded_hop()
            .or(self.real_ip.as_deref())
            .or(self.peer_addr.as_deref())
            .unwrap_or("unknown")
            .to_string()
    }
}
