//! Quill Lock - Local authentication and session-lock core
//!
//! This crate provides the lock-screen subsystem of the Quill diary: the
//! credential model, the pure verifier, the idle-timeout policy, the
//! biometric capability probe, and the session gate state machine. The
//! diary itself is an external collaborator; the gate only needs to be told
//! when to unlock and lock.
//!
//! # Security Notice
//! Credentials are stored and compared as plain values with no hashing and
//! no attempt limiting. That mirrors the system this crate reimplements and
//! is recorded as an open design question in DESIGN.md, not an endorsement.

pub mod autolock;
pub mod biometric;
pub mod credential;
pub mod error;
pub mod gate;
pub mod settings;
pub mod store;
pub mod wizard;

pub use autolock::AutoLock;
pub use biometric::{BiometricProbe, BiometricPrompt, PlatformBiometrics, UnsupportedPlatform};
pub use credential::{verify, Credential};
pub use error::{LockError, Result};
pub use gate::{SessionGate, SessionState};
pub use settings::{AuthMethod, SecuritySettings};
pub use store::{FileStore, LockStore, MemoryStore};
pub use wizard::{SetupStep, SetupWizard};

/// Minimum PIN length
pub const PIN_MIN_LENGTH: usize = 4;

/// Maximum PIN length
pub const PIN_MAX_LENGTH: usize = 6;

/// Minimum password length
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Minimum number of dots in a pattern
pub const PATTERN_MIN_LENGTH: usize = 4;

/// Number of cells on the pattern grid (3x3)
pub const PATTERN_GRID_CELLS: usize = 9;

/// Auto-lock timeout choices offered by the settings UI, in minutes
pub const AUTO_LOCK_OPTIONS: [u32; 5] = [1, 5, 15, 30, 60];

/// Default auto-lock timeout in minutes
pub const DEFAULT_AUTO_LOCK_MINUTES: u32 = 5;
