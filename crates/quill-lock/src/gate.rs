//! Session gate: the Locked/Unlocked state machine
//!
//! The gate owns the ephemeral session state for the lifetime of a process
//! and is the sole writer of the persisted records. Every operation that
//! consults the clock takes `now_ms` explicitly.

use crate::autolock::AutoLock;
use crate::credential::{self, Credential};
use crate::error::Result;
use crate::settings::SecuritySettings;
use crate::store::LockStore;

/// Ephemeral session state, derived at startup and mutated only by
/// `login`/`logout`/`disable_security`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocked,
}

/// The session gate. One per process; cycles between `Locked` and
/// `Unlocked` with no terminal state.
pub struct SessionGate<S: LockStore> {
    store: S,
    settings: Option<SecuritySettings>,
    state: SessionState,
}

impl<S: LockStore> SessionGate<S> {
    /// Initialize from the store and compute the starting state:
    ///
    /// 1. No settings, or lock disabled: Unlocked.
    /// 2. Lock enabled but no activity stamp: Locked.
    /// 3. Otherwise Unlocked only while the idle window is still open
    ///    (strict `<`; a restart inside the window survives).
    pub fn initialize(store: S, now_ms: u64) -> Result<Self> {
        let settings = store.load_settings()?;

        let state = match &settings {
            None => SessionState::Unlocked,
            Some(s) if !s.is_enabled => SessionState::Unlocked,
            Some(s) => match store.load_last_activity()? {
                None => SessionState::Locked,
                Some(last_activity) => {
                    let policy = AutoLock::new(s.auto_lock_timeout);
                    if policy.is_expired(last_activity, now_ms) {
                        SessionState::Locked
                    } else {
                        SessionState::Unlocked
                    }
                }
            },
        };

        tracing::debug!("Session gate initialized: {:?}", state);

        Ok(Self {
            store,
            settings,
            state,
        })
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == SessionState::Unlocked
    }

    /// The cached security settings, if configured
    pub fn settings(&self) -> Option<&SecuritySettings> {
        self.settings.as_ref()
    }

    /// Whether any lock is configured and enabled
    pub fn is_security_enabled(&self) -> bool {
        self.settings.as_ref().map(|s| s.is_enabled).unwrap_or(false)
    }

    /// Check a candidate credential against the configured one. Pure
    /// decision; does not change state or count attempts.
    pub fn verify(&self, candidate: &Credential) -> bool {
        credential::verify(self.settings.as_ref(), candidate)
    }

    /// Transition to Unlocked and stamp activity.
    ///
    /// Callers invoke this only after a successful credential or biometric
    /// check; the gate itself does not re-verify.
    pub fn login(&mut self, now_ms: u64) -> Result<()> {
        self.store.save_last_activity(now_ms)?;
        self.state = SessionState::Unlocked;
        tracing::debug!("Session unlocked");
        Ok(())
    }

    /// Transition to Locked. Unconditional.
    ///
    /// Deliberately leaves the stored settings and activity stamp in place:
    /// a relaunch within the idle window will auto-unlock. Ambiguous source
    /// behavior, kept as-is pending product input (see DESIGN.md).
    pub fn logout(&mut self) {
        self.state = SessionState::Locked;
        tracing::debug!("Session locked");
    }

    /// Refresh the activity stamp without changing state
    pub fn record_activity(&mut self, now_ms: u64) -> Result<()> {
        self.store.save_last_activity(now_ms)
    }

    /// Persist a new configuration wholesale and replace the cached one.
    ///
    /// When the new configuration is enabled, the activity stamp is
    /// refreshed so the freshly configured lock does not immediately demand
    /// re-entry. Session state is left untouched; callers run this from an
    /// unlocked context.
    pub fn setup_security(&mut self, settings: SecuritySettings, now_ms: u64) -> Result<()> {
        settings.validate()?;

        self.store.save_settings(&settings)?;
        if settings.is_enabled {
            self.store.save_last_activity(now_ms)?;
        }

        tracing::debug!(
            "Security configured: method {:?}, auto-lock {} min",
            settings.auth_type,
            settings.auto_lock_timeout
        );
        self.settings = Some(settings);
        Ok(())
    }

    /// Remove both persisted records and force Unlocked
    pub fn disable_security(&mut self) -> Result<()> {
        self.store.clear()?;
        self.settings = None;
        self.state = SessionState::Unlocked;
        tracing::debug!("Security disabled");
        Ok(())
    }

    /// Tear down the gate, returning the store to the caller
    pub fn teardown(self) -> S {
        self.store
    }
}
