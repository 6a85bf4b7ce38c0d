//! Three-step security setup flow
//!
//! Policy and validation only; rendering belongs to the caller. The flow is
//! forward-only with a back transition that preserves everything already
//! typed. Credential buffers are wiped when the wizard is dropped.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{LockError, Result};
use crate::settings::{
    validate_password, validate_pattern, validate_pin, AuthMethod, SecuritySettings,
};
use crate::{AUTO_LOCK_OPTIONS, DEFAULT_AUTO_LOCK_MINUTES, PATTERN_GRID_CELLS};

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// Select pin, password, or pattern
    ChooseMethod,
    /// Enter and confirm the chosen credential
    EnterCredential,
    /// Biometric shortcut and auto-lock timeout
    Options,
}

/// Setup wizard state for one configuration session
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SetupWizard {
    #[zeroize(skip)]
    step: SetupStep,
    #[zeroize(skip)]
    method: AuthMethod,

    pin: String,
    confirm_pin: String,
    password: String,
    confirm_password: String,
    pattern: Vec<u8>,
    confirm_pattern: Vec<u8>,
    #[zeroize(skip)]
    confirming_pattern: bool,

    #[zeroize(skip)]
    biometric_requested: bool,
    #[zeroize(skip)]
    auto_lock_minutes: u32,
}

impl Default for SetupWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupWizard {
    pub fn new() -> Self {
        Self {
            step: SetupStep::ChooseMethod,
            method: AuthMethod::Pin,
            pin: String::new(),
            confirm_pin: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            pattern: Vec::new(),
            confirm_pattern: Vec::new(),
            confirming_pattern: false,
            biometric_requested: false,
            auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
        }
    }

    pub fn step(&self) -> SetupStep {
        self.step
    }

    pub fn method(&self) -> AuthMethod {
        self.method
    }

    /// Select the primary method. Only legal at the first step; biometric
    /// is a layered shortcut, never the primary method.
    pub fn choose_method(&mut self, method: AuthMethod) -> Result<()> {
        if self.step != SetupStep::ChooseMethod {
            return Err(LockError::SetupStep(
                "method can only be chosen at the first step".to_string(),
            ));
        }
        if method == AuthMethod::Biometric {
            return Err(LockError::InvalidSetup(
                "biometric cannot be the primary method".to_string(),
            ));
        }

        self.method = method;
        Ok(())
    }

    pub fn set_pin(&mut self, pin: impl Into<String>) {
        self.pin = pin.into();
    }

    pub fn set_confirm_pin(&mut self, pin: impl Into<String>) {
        self.confirm_pin = pin.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_confirm_password(&mut self, password: impl Into<String>) {
        self.confirm_password = password.into();
    }

    /// Add a dot to the active drawing pass. Duplicates and off-grid
    /// indices are ignored, mirroring the drawing surface. Returns whether
    /// the dot was accepted.
    pub fn push_pattern_dot(&mut self, cell: u8) -> bool {
        if cell as usize >= PATTERN_GRID_CELLS {
            return false;
        }

        let target = if self.confirming_pattern {
            &mut self.confirm_pattern
        } else {
            &mut self.pattern
        };

        if target.contains(&cell) {
            return false;
        }

        target.push(cell);
        true
    }

    /// The pattern drawn in the active pass
    pub fn active_pattern(&self) -> &[u8] {
        if self.confirming_pattern {
            &self.confirm_pattern
        } else {
            &self.pattern
        }
    }

    /// Start the second, independent drawing pass
    pub fn begin_pattern_confirm(&mut self) {
        self.confirming_pattern = true;
    }

    pub fn is_confirming_pattern(&self) -> bool {
        self.confirming_pattern
    }

    /// Clear only the active drawing pass
    pub fn clear_pattern(&mut self) {
        if self.confirming_pattern {
            self.confirm_pattern.clear();
        } else {
            self.pattern.clear();
        }
    }

    pub fn set_biometric(&mut self, requested: bool) {
        self.biometric_requested = requested;
    }

    /// Choose the auto-lock timeout from the fixed option set
    pub fn set_auto_lock(&mut self, minutes: u32) -> Result<()> {
        if !AUTO_LOCK_OPTIONS.contains(&minutes) {
            return Err(LockError::InvalidSetup(format!(
                "auto-lock timeout must be one of {:?} minutes",
                AUTO_LOCK_OPTIONS
            )));
        }

        self.auto_lock_minutes = minutes;
        Ok(())
    }

    /// The step-2 gating predicate: the credential is well-formed and the
    /// confirmation matches.
    pub fn credentials_valid(&self) -> bool {
        match self.method {
            AuthMethod::Pin => validate_pin(&self.pin).is_ok() && self.pin == self.confirm_pin,
            AuthMethod::Password => {
                validate_password(&self.password).is_ok() && self.password == self.confirm_password
            }
            AuthMethod::Pattern => {
                validate_pattern(&self.pattern).is_ok() && self.pattern == self.confirm_pattern
            }
            AuthMethod::Biometric => false,
        }
    }

    /// Advance to the next step. Leaving the credential step requires the
    /// validation predicate to hold.
    pub fn next(&mut self) -> Result<()> {
        match self.step {
            SetupStep::ChooseMethod => {
                self.step = SetupStep::EnterCredential;
                Ok(())
            }
            SetupStep::EnterCredential => {
                if !self.credentials_valid() {
                    return Err(LockError::InvalidSetup(
                        "credential is incomplete or the confirmation does not match".to_string(),
                    ));
                }
                self.step = SetupStep::Options;
                Ok(())
            }
            SetupStep::Options => Err(LockError::SetupStep(
                "already at the final step".to_string(),
            )),
        }
    }

    /// Go back one step. Typed fields persist across back/forward
    /// navigation within one wizard session.
    pub fn back(&mut self) {
        self.step = match self.step {
            SetupStep::ChooseMethod => SetupStep::ChooseMethod,
            SetupStep::EnterCredential => SetupStep::ChooseMethod,
            SetupStep::Options => SetupStep::EnterCredential,
        };
    }

    /// Abort the session: wipe everything typed and return to the first
    /// step with defaults, leaving the wizard ready for a fresh run.
    /// No side effects beyond the wizard itself.
    pub fn cancel(&mut self) {
        // Dropping the previous state zeroizes the credential buffers
        *self = Self::new();
    }

    /// Assemble the final settings record. Only legal at the last step.
    /// The biometric shortcut is kept only when the probe reported the
    /// capability available.
    pub fn finish(&self, biometric_available: bool) -> Result<SecuritySettings> {
        if self.step != SetupStep::Options {
            return Err(LockError::SetupStep(
                "setup is not at the final step".to_string(),
            ));
        }
        if !self.credentials_valid() {
            return Err(LockError::InvalidSetup(
                "credential is incomplete or the confirmation does not match".to_string(),
            ));
        }

        let mut settings = SecuritySettings {
            is_enabled: true,
            auth_type: self.method,
            pin: None,
            password: None,
            pattern: None,
            biometric_enabled: self.biometric_requested && biometric_available,
            auto_lock_timeout: self.auto_lock_minutes,
        };

        match self.method {
            AuthMethod::Pin => settings.pin = Some(self.pin.clone()),
            AuthMethod::Password => settings.password = Some(self.password.clone()),
            AuthMethod::Pattern => settings.pattern = Some(self.pattern.clone()),
            AuthMethod::Biometric => unreachable!("rejected by choose_method"),
        }

        Ok(settings)
    }
}
