//! Per-request record of whether any policy was applied
//!
//! Every dispatch marks the tracker before invoking the handler action. At the
//! end of a request the host calls [`PolicyTracker::verify_applied`], which
//! fails if nothing was dispatched, so a handler that forgot to authorize is
//! rejected instead of silently serving data.

use crate::error::{AuthzError, Result};
use crate::types::HandlerKind;
use tracing::{debug, warn};

/// Tracking flag owned by one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTracker {
    applied: bool,
    filtered: bool,
    authorized: bool,
    skipped: bool,
}

impl PolicyTracker {
    /// Fresh tracker, nothing applied
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatch of `kind` (idempotent)
    pub fn mark_applied(&mut self, kind: HandlerKind) {
        self.applied = true;
        match kind {
            HandlerKind::Filter => self.filtered = true,
            HandlerKind::Authorization => self.authorized = true,
        }
    }

    pub fn applied(&self) -> bool {
        self.applied
    }

    /// Overwrite the flag, for tests or deliberate bypass
    ///
    /// Clearing it also clears every per-kind record.
    pub fn set_applied(&mut self, applied: bool) {
        if applied {
            self.applied = true;
        } else {
            *self = Self::default();
        }
    }

    /// Whether `kind` was dispatched (or verification was skipped)
    pub fn applied_kind(&self, kind: HandlerKind) -> bool {
        self.skipped
            || match kind {
                HandlerKind::Filter => self.filtered,
                HandlerKind::Authorization => self.authorized,
            }
    }

    /// Fail unless some policy was applied
    pub fn verify_applied(&self) -> Result<()> {
        if self.applied {
            return Ok(());
        }
        warn!("Request finished without applying any policy");
        Err(AuthzError::PolicyNotApplied(
            "no policy was applied to this request".to_string(),
        ))
    }

    /// Fail unless a filter handler was dispatched
    pub fn verify_filtered(&self) -> Result<()> {
        self.verify_kind(HandlerKind::Filter)
    }

    /// Fail unless an authorization handler was dispatched
    pub fn verify_authorized(&self) -> Result<()> {
        self.verify_kind(HandlerKind::Authorization)
    }

    fn verify_kind(&self, kind: HandlerKind) -> Result<()> {
        if self.applied_kind(kind) {
            return Ok(());
        }
        warn!("Request finished without applying a {} policy", kind);
        Err(AuthzError::PolicyNotApplied(format!(
            "no {} policy was applied to this request",
            kind
        )))
    }

    /// Mark the request as verified without dispatching anything
    ///
    /// Callers should say why next to the call.
    pub fn skip_verify(&mut self) {
        debug!("Policy verification skipped");
        self.applied = true;
        self.skipped = true;
    }
}
