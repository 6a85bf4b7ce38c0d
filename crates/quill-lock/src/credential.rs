//! Candidate credentials and the pure verification decision
//!
//! Verification is a plain equality check against the stored record. There
//! is no attempt counting or backoff here; a mismatch is a normal `false`
//! outcome, and repeated failures are the caller's problem to surface.

use crate::settings::{AuthMethod, SecuritySettings};

/// A credential supplied by the user at the lock screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Pin(String),
    Password(String),
    Pattern(Vec<u8>),
}

impl Credential {
    /// The auth method this candidate is attempting
    pub fn method(&self) -> AuthMethod {
        match self {
            Credential::Pin(_) => AuthMethod::Pin,
            Credential::Password(_) => AuthMethod::Password,
            Credential::Pattern(_) => AuthMethod::Pattern,
        }
    }
}

/// Decide whether `candidate` matches the stored credential.
///
/// Returns `false` when no settings exist, when the candidate's method does
/// not match the configured `auth_type`, or on any value mismatch. Pattern
/// comparison is order-sensitive: a reversed or rotated drawing is a
/// different pattern.
pub fn verify(settings: Option<&SecuritySettings>, candidate: &Credential) -> bool {
    let settings = match settings {
        Some(s) => s,
        None => return false,
    };

    if candidate.method() != settings.auth_type {
        return false;
    }

    match candidate {
        Credential::Pin(input) => settings.pin.as_deref() == Some(input.as_str()),
        Credential::Password(input) => settings.password.as_deref() == Some(input.as_str()),
        Credential::Pattern(input) => settings.pattern.as_deref() == Some(input.as_slice()),
    }
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

    fn pattern_settings(pattern: &[u8]) -> SecuritySettings {
        SecuritySettings {
            is_enabled: true,
            auth_type: AuthMethod::Pattern,
            pin: None,
            password: None,
            pattern: Some(pattern.to_vec()),
            biometric_enabled: false,
            auto_lock_timeout: 5,
        }
    }

    #[test]
    fn test_pin_match() {
        let settings = pin_settings("1234");
        assert!(verify(Some(&settings), &Credential::Pin("1234".to_string())));
        assert!(!verify(Some(&settings), &Credential::Pin("4321".to_string())));
    }

    #[test]
    fn test_missing_settings_never_match() {
        assert!(!verify(None, &Credential::Pin("1234".to_string())));
    }

    #[test]
    fn test_method_mismatch_never_matches() {
        // Stored PIN, candidate password with the same bytes
        let settings = pin_settings("123456");
        assert!(!verify(
            Some(&settings),
            &Credential::Password("123456".to_string())
        ));
    }

    #[test]
    fn test_pattern_order_matters() {
        let settings = pattern_settings(&[0, 1, 2, 3]);
        assert!(verify(
            Some(&settings),
            &Credential::Pattern(vec![0, 1, 2, 3])
        ));
        assert!(!verify(
            Some(&settings),
            &Credential::Pattern(vec![3, 2, 1, 0])
        ));
    }

    #[test]
    fn test_pattern_prefix_is_not_a_match() {
        let settings = pattern_settings(&[0, 1, 2, 3, 4]);
        assert!(!verify(
            Some(&settings),
            &Credential::Pattern(vec![0, 1, 2, 3])
        ));
    }
}
