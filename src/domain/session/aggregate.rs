//! Session aggregate entity.
//!
//! A session is one user's pass through the interview. It carries the single
//! `current_domain` pointer; only [`Session::transition_domain`] moves it.

use std::collections::BTreeMap;

use crate::domain::foundation::{
    AssessmentError, DomainArea, ErrorCode, SessionId, SessionStatus, Timestamp, ValidationError,
};
use serde::{Deserialize, Serialize};

use super::recovery::{verify_token, RecoveryToken};

/// Maximum length for the contact email.
pub const MAX_EMAIL_LENGTH: usize = 320;

/// Outcome of a successful domain transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainTransition {
    /// The pointer moved to the next domain.
    Advanced { from: DomainArea, to: DomainArea },
    /// The last domain is done; the session is ready for synthesis.
    Completed { from: DomainArea },
}

impl DomainTransition {
    /// Returns the domain that was left.
    pub fn from(&self) -> DomainArea {
        match self {
            DomainTransition::Advanced { from, .. } | DomainTransition::Completed { from } => *from,
        }
    }

    /// Returns the new domain, if any.
    pub fn to(&self) -> Option<DomainArea> {
        match self {
            DomainTransition::Advanced { to, .. } => Some(*to),
            DomainTransition::Completed { .. } => None,
        }
    }
}

/// Session aggregate.
///
/// # Invariants
///
/// - `status` only moves forward, except for abandonment (terminal)
/// - `current_domain` only moves to its registry successor
/// - expired or abandoned sessions reject every write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    email: String,
    recovery_token_hash: String,
    status: SessionStatus,
    current_domain: DomainArea,
    /// Summaries recorded when each domain was closed.
    domain_summaries: BTreeMap<DomainArea, String>,
    created_at: Timestamp,
    updated_at: Timestamp,
    expires_at: Timestamp,
}

impl Session {
    /// Starts a new session at the first domain.
    ///
    /// Returns the session together with the plaintext recovery token, which
    /// is never stored.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the email is empty, too long or malformed
    pub fn start(
        email: impl Into<String>,
        ttl_days: i64,
    ) -> Result<(Self, RecoveryToken), ValidationError> {
        let email = email.into().trim().to_string();
        Self::validate_email(&email)?;

        let token = RecoveryToken::generate();
        let now = Timestamp::now();
        let session = Self {
            id: SessionId::new(),
            email,
            recovery_token_hash: token.hash(),
            status: SessionStatus::Started,
            current_domain: DomainArea::first(),
            domain_summaries: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            expires_at: now.add_days(ttl_days),
        };
        Ok((session, token))
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        email: String,
        recovery_token_hash: String,
        status: SessionStatus,
        current_domain: DomainArea,
        domain_summaries: BTreeMap<DomainArea, String>,
        created_at: Timestamp,
        updated_at: Timestamp,
        expires_at: Timestamp,
    ) -> Self {
        Self {
            id,
            email,
            recovery_token_hash,
            status,
            current_domain,
            domain_summaries,
            created_at,
            updated_at,
            expires_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn recovery_token_hash(&self) -> &str {
        &self.recovery_token_hash
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_domain(&self) -> DomainArea {
        self.current_domain
    }

    pub fn domain_summaries(&self) -> &BTreeMap<DomainArea, String> {
        &self.domain_summaries
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn expires_at(&self) -> &Timestamp {
        &self.expires_at
    }

    /// Returns true once the session lifetime has elapsed at `now`.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    /// Checks a recovery token against the stored hash.
    pub fn verify_recovery_token(&self, token: &str) -> bool {
        verify_token(token, &self.recovery_token_hash)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Guards
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates that the session accepts writes at `now`.
    ///
    /// # Errors
    ///
    /// - `Expired` once the lifetime has elapsed
    /// - `StateConflict(SESSION_ABANDONED)` after abandonment
    pub fn ensure_writable(&self, now: &Timestamp) -> Result<(), AssessmentError> {
        if self.is_expired_at(now) {
            return Err(AssessmentError::Expired(self.id));
        }
        if self.status.is_terminal() {
            return Err(AssessmentError::conflict(
                ErrorCode::SessionAbandoned,
                "Session has been abandoned",
            ));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Moves the status forward to `target`.
    ///
    /// Returns `false` when the session has already reached `target`, which
    /// keeps replays harmless.
    ///
    /// # Errors
    ///
    /// - `StateConflict(INVALID_STATE_TRANSITION)` for a backward move or any
    ///   move out of `Abandoned`
    pub fn advance_status(&mut self, target: SessionStatus) -> Result<bool, AssessmentError> {
        if target != SessionStatus::Abandoned
            && !self.status.is_terminal()
            && self.status.has_reached(&target)
        {
            return Ok(false);
        }
        if !self.status.can_transition_to(&target) {
            return Err(AssessmentError::conflict(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move session from {} to {}", self.status, target),
            ));
        }
        self.status = target;
        self.updated_at = Timestamp::now();
        Ok(true)
    }

    /// Closes the current domain.
    ///
    /// `uncovered_topic_ids` must be computed from the ledger by the caller;
    /// any remaining id refuses the transition.
    ///
    /// # Errors
    ///
    /// - `StateConflict` listing the uncovered topic ids
    pub fn transition_domain(
        &mut self,
        summary: impl Into<String>,
        uncovered_topic_ids: Vec<String>,
    ) -> Result<DomainTransition, AssessmentError> {
        if !uncovered_topic_ids.is_empty() {
            return Err(AssessmentError::uncovered_topics(
                self.current_domain,
                uncovered_topic_ids,
            ));
        }

        let from = self.current_domain;
        let summary = summary.into();
        if !summary.trim().is_empty() {
            self.domain_summaries.insert(from, summary.trim().to_string());
        }

        let transition = match from.next() {
            Some(to) => {
                self.current_domain = to;
                self.advance_status(SessionStatus::InProgress)?;
                DomainTransition::Advanced { from, to }
            }
            None => {
                self.advance_status(SessionStatus::Synthesizing)?;
                DomainTransition::Completed { from }
            }
        };
        self.updated_at = Timestamp::now();
        Ok(transition)
    }

    /// Abandons the session. Terminal.
    pub fn abandon(&mut self) -> Result<(), AssessmentError> {
        self.advance_status(SessionStatus::Abandoned).map(|_| ())
    }

    fn validate_email(email: &str) -> Result<(), ValidationError> {
        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(ValidationError::too_long("email", MAX_EMAIL_LENGTH, email.len()));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ValidationError::invalid_format("email", "expected name@host")),
        }
    }
}
