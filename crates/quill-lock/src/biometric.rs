//! Biometric capability probe
//!
//! The platform side (hardware query, enrollment query, the challenge
//! dialog itself) lives behind `PlatformBiometrics`. `BiometricProbe` is the
//! adapter the rest of the crate talks to: it collapses every platform
//! error to `false`/unavailable, so callers only ever see a yes/no answer.

use std::time::Duration;

use crate::error::Result;

/// Bounded wait for a single platform challenge
pub const CHALLENGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Labels shown by the platform challenge dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricPrompt {
    pub message: String,
    pub fallback_label: String,
    pub cancel_label: String,
}

impl Default for BiometricPrompt {
    fn default() -> Self {
        Self {
            message: "Authenticate to access your diary".to_string(),
            fallback_label: "Use PIN instead".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Capability interface implemented per platform.
///
/// Implementations may fail; the probe turns every failure into "no".
pub trait PlatformBiometrics {
    /// Whether biometric hardware is present
    fn has_hardware(&self) -> Result<bool>;

    /// Whether at least one biometric credential is enrolled
    fn has_enrolled(&self) -> Result<bool>;

    /// Present a single challenge dialog and report the platform verdict.
    ///
    /// Implementations must resolve within `timeout`; non-response counts
    /// as failure.
    fn authenticate(&self, prompt: &BiometricPrompt, timeout: Duration) -> Result<bool>;
}

/// Platform variant for builds without biometric support (e.g. a
/// browser-hosted build): always unavailable, never errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

impl PlatformBiometrics for UnsupportedPlatform {
    fn has_hardware(&self) -> Result<bool> {
        Ok(false)
    }

    fn has_enrolled(&self) -> Result<bool> {
        Ok(false)
    }

    fn authenticate(&self, _prompt: &BiometricPrompt, _timeout: Duration) -> Result<bool> {
        Ok(false)
    }
}

/// Error-collapsing adapter over a platform implementation
pub struct BiometricProbe {
    platform: Box<dyn PlatformBiometrics>,
    prompt: BiometricPrompt,
}

impl BiometricProbe {
    /// Wrap a platform implementation selected at startup
    pub fn new(platform: Box<dyn PlatformBiometrics>) -> Self {
        Self {
            platform,
            prompt: BiometricPrompt::default(),
        }
    }

    /// A probe that always reports unavailable
    pub fn unavailable() -> Self {
        Self::new(Box::new(UnsupportedPlatform))
    }

    /// Override the challenge dialog labels
    pub fn with_prompt(mut self, prompt: BiometricPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// True only if hardware is present AND a credential is enrolled.
    /// Any platform error reads as unavailable.
    pub fn is_available(&self) -> bool {
        let hardware = self.platform.has_hardware().unwrap_or_else(|e| {
            tracing::warn!("Biometric hardware query failed: {}", e);
            false
        });
        if !hardware {
            return false;
        }

        self.platform.has_enrolled().unwrap_or_else(|e| {
            tracing::warn!("Biometric enrollment query failed: {}", e);
            false
        })
    }

    /// Present one platform challenge. Denied, errored, and timed-out all
    /// collapse to `false`; the caller decides whether to re-offer.
    pub fn challenge(&self) -> bool {
        if !self.is_available() {
            return false;
        }

        match self.platform.authenticate(&self.prompt, CHALLENGE_TIMEOUT) {
            Ok(success) => success,
            Err(e) => {
                tracing::warn!("Biometric challenge failed: {}", e);
                false
            }
        }
    }
}
