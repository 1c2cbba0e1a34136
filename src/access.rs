//! Anti-forgery token and capability checks for detail lookups.

use crate::error::DetailError;
use crate::fingerprint::{Fingerprint, FingerprintBuilder};
use std::collections::BTreeSet;

/// Capability an operator needs to inspect module usage.
pub const REQUIRED_CAPABILITY: &str = "manage_options";

/// Action the session token is bound to.
pub const NONCE_ACTION: &str = "module_usage_tracker_nonce";

/// Per-session access state: the expected token and the operator's capabilities.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    nonce: Fingerprint,
    capabilities: BTreeSet<String>,
}

impl AccessGuard {
    /// Create a guard whose token is derived from `session_secret`.
    pub fn new<I, S>(session_secret: &str, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let nonce = FingerprintBuilder::new()
            .str(session_secret)
            .str(NONCE_ACTION)
            .finish();
        Self {
            nonce,
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a guard with a secret unique to this process.
    pub fn ephemeral<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let secret = format!("{}:{}", std::process::id(), started);
        Self::new(&secret, capabilities)
    }

    /// The token callers must present with a detail request.
    pub fn nonce(&self) -> String {
        self.nonce.as_hex()
    }

    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    /// Validate the presented token, then the operator's capability.
    pub fn verify(&self, token: Option<&str>) -> Result<(), DetailError> {
        let valid_token = token
            .and_then(|t| t.parse::<Fingerprint>().ok())
            .is_some_and(|t| t == self.nonce);
        if !valid_token {
            tracing::debug!("Rejected detail request with missing or stale token");
            return Err(DetailError::Unauthorized);
        }
        if !self.can(REQUIRED_CAPABILITY) {
            tracing::debug!("Rejected detail request: operator lacks {}", REQUIRED_CAPABILITY);
            return Err(DetailError::Unauthorized);
        }
        Ok(())
    }
}
