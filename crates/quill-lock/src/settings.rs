//! Security settings record and credential-shape validation
//!
//! `SecuritySettings` is the single persisted security configuration of the
//! diary. Field names serialize as camelCase to stay wire-compatible with
//! records written by earlier releases of the app.

use serde::{Deserialize, Serialize};

use crate::error::{LockError, Result};
use crate::{
    PASSWORD_MIN_LENGTH, PATTERN_GRID_CELLS, PATTERN_MIN_LENGTH, PIN_MAX_LENGTH, PIN_MIN_LENGTH,
};

/// Primary verification method.
///
/// `Biometric` exists in the wire format but is never produced as a primary
/// method by the setup wizard; the biometric shortcut is layered on top of
/// the other three via `biometric_enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Pin,
    Password,
    Pattern,
    Biometric,
}

impl AuthMethod {
    /// Human-readable label for display surfaces
    pub fn label(&self) -> &'static str {
        match self {
            AuthMethod::Pin => "PIN",
            AuthMethod::Password => "Password",
            AuthMethod::Pattern => "Pattern",
            AuthMethod::Biometric => "Biometric",
        }
    }
}

/// The persisted security configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    /// Whether any lock is active
    pub is_enabled: bool,

    /// Primary verification method
    pub auth_type: AuthMethod,

    /// Numeric code, 4-6 digits, present only for `AuthMethod::Pin`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,

    /// Free-form secret, length >= 6, present only for `AuthMethod::Password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Ordered cell indices on the 3x3 grid, present only for `AuthMethod::Pattern`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Vec<u8>>,

    /// Whether biometric unlock is additionally accepted as a shortcut
    pub biometric_enabled: bool,

    /// Minutes of inactivity after which the session expires
    pub auto_lock_timeout: u32,
}

impl SecuritySettings {
    /// A disabled record: no lock configured, the app is always authenticated.
    pub fn disabled() -> Self {
        Self {
            is_enabled: false,
            auth_type: AuthMethod::Pin,
            pin: None,
            password: None,
            pattern: None,
            biometric_enabled: false,
            auto_lock_timeout: crate::DEFAULT_AUTO_LOCK_MINUTES,
        }
    }

    /// Check the record invariant: when enabled, exactly one credential is
    /// populated and it matches `auth_type`.
    pub fn validate(&self) -> Result<()> {
        if !self.is_enabled {
            return Ok(());
        }

        let populated = [
            self.pin.is_some(),
            self.password.is_some(),
            self.pattern.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();

        if populated != 1 {
            return Err(LockError::InvalidSettings(format!(
                "expected exactly one stored credential, found {}",
                populated
            )));
        }

        match self.auth_type {
            AuthMethod::Pin => {
                let pin = self
                    .pin
                    .as_deref()
                    .ok_or_else(|| missing_credential("pin"))?;
                validate_pin(pin)
            }
            AuthMethod::Password => {
                let password = self
                    .password
                    .as_deref()
                    .ok_or_else(|| missing_credential("password"))?;
                validate_password(password)
            }
            AuthMethod::Pattern => {
                let pattern = self
                    .pattern
                    .as_deref()
                    .ok_or_else(|| missing_credential("pattern"))?;
                validate_pattern(pattern)
            }
            AuthMethod::Biometric => Err(LockError::InvalidSettings(
                "biometric cannot be the primary method of an enabled record".to_string(),
            )),
        }
    }
}

fn missing_credential(kind: &str) -> LockError {
    LockError::InvalidSettings(format!("auth type is {} but no {0} is stored", kind))
}

/// Validate PIN shape: 4-6 characters, digits only
pub fn validate_pin(pin: &str) -> Result<()> {
    if pin.len() < PIN_MIN_LENGTH || pin.len() > PIN_MAX_LENGTH {
        return Err(LockError::InvalidSettings(format!(
            "PIN must be between {} and {} digits",
            PIN_MIN_LENGTH, PIN_MAX_LENGTH
        )));
    }

    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(LockError::InvalidSettings(
            "PIN must contain only digits".to_string(),
        ));
    }

    Ok(())
}

/// Validate password shape: minimum length only
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < PASSWORD_MIN_LENGTH {
        return Err(LockError::InvalidSettings(format!(
            "password must be at least {} characters",
            PASSWORD_MIN_LENGTH
        )));
    }

    Ok(())
}

/// Validate pattern shape: >= 4 distinct cells, all on the 3x3 grid
pub fn validate_pattern(pattern: &[u8]) -> Result<()> {
    if pattern.len() < PATTERN_MIN_LENGTH {
        return Err(LockError::InvalidSettings(format!(
            "pattern must connect at least {} dots",
            PATTERN_MIN_LENGTH
        )));
    }

    if pattern.iter().any(|&cell| cell as usize >= PATTERN_GRID_CELLS) {
        return Err(LockError::InvalidSettings(format!(
            "pattern cells must be in 0..{}",
            PATTERN_GRID_CELLS
        )));
    }

    for (i, cell) in pattern.iter().enumerate() {
        if pattern[..i].contains(cell) {
            return Err(LockError::InvalidSettings(
                "pattern cells must be distinct".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin_settings(pin: &str) -> SecuritySettings {
        SecuritySettings {
            is_enabled: true,
            auth_type: AuthMethod::Pin,
            pin: Some(pin.to_string()),
            password: None,
            pattern: None,
            biometric_enabled: false,
            auto_lock_timeout: 5,
        }
    }

    #[test]
    fn test_valid_pin_record() {
        assert!(pin_settings("1234").validate().is_ok());
        assert!(pin_settings("123456").validate().is_ok());
    }

    #[test]
    fn test_pin_shape_rejected() {
        assert!(pin_settings("123").validate().is_err());
        assert!(pin_settings("1234567").validate().is_err());
        assert!(pin_settings("12a4").validate().is_err());
    }

    #[test]
    fn test_exactly_one_credential() {
        let mut settings = pin_settings("1234");
        settings.password = Some("hunter22".to_string());
        assert!(settings.validate().is_err());

        settings.pin = None;
        settings.password = None;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_disabled_record_always_valid() {
        let settings = SecuritySettings::disabled();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_biometric_primary_rejected_when_enabled() {
        let mut settings = pin_settings("1234");
        settings.auth_type = AuthMethod::Biometric;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_pattern_rules() {
        assert!(validate_pattern(&[0, 1, 2, 3]).is_ok());
        assert!(validate_pattern(&[0, 1, 2]).is_err());
        assert!(validate_pattern(&[0, 1, 2, 9]).is_err());
        assert!(validate_pattern(&[0, 1, 2, 1]).is_err());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let settings = pin_settings("1234");
        let json = serde_json::to_string(&settings).unwrap();

        assert!(json.contains("\"isEnabled\":true"));
        assert!(json.contains("\"authType\":\"pin\""));
        assert!(json.contains("\"autoLockTimeout\":5"));
        // Unpopulated credentials stay off the wire entirely
        assert!(!json.contains("password"));

        let parsed: SecuritySettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, settings);
    }
}
