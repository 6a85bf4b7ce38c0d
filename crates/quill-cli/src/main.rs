//! Quill CLI - thin caller for the diary session-lock core
//!
//! Each invocation is one "process start": the gate replays its startup
//! decision against the stored records, so `status` after an idle gap shows
//! exactly what the app's lock screen would decide.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quill_lock::{
    AuthMethod, AutoLock, BiometricProbe, Credential, FileStore, LockStore, SessionGate,
    SessionState, SetupWizard, DEFAULT_AUTO_LOCK_MINUTES,
};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Session lock for the Quill diary", long_about = None)]
#[command(version)]
struct Cli {
    /// Override the lock file location
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the lock state the app would start in right now
    Status,

    /// Configure a lock
    #[command(subcommand)]
    Setup(SetupCommands),

    /// Verify a credential and open the session
    Unlock {
        #[command(flatten)]
        credential: CredentialArgs,
    },

    /// Refresh the activity stamp (keeps the idle window open)
    Touch,

    /// Remove the lock and both stored records
    Disable {
        #[command(flatten)]
        credential: CredentialArgs,
    },
}

#[derive(Subcommand)]
enum SetupCommands {
    /// Lock with a 4-6 digit PIN
    Pin {
        /// The PIN
        #[arg(long)]
        pin: String,

        /// Confirmation entry
        #[arg(long)]
        confirm: String,

        #[command(flatten)]
        options: SetupOptions,
    },

    /// Lock with a password (6 characters minimum)
    Password {
        /// The password
        #[arg(long)]
        password: String,

        /// Confirmation entry
        #[arg(long)]
        confirm: String,

        #[command(flatten)]
        options: SetupOptions,
    },

    /// Lock with a 3x3 grid pattern
    Pattern {
        /// Cell indices in drawing order, e.g. "0,1,2,5"
        #[arg(long)]
        pattern: String,

        /// Confirmation drawing pass
        #[arg(long)]
        confirm: String,

        #[command(flatten)]
        options: SetupOptions,
    },
}

#[derive(clap::Args)]
struct SetupOptions {
    /// Also accept biometric unlock where the platform supports it
    #[arg(long)]
    biometric: bool,

    /// Auto-lock timeout in minutes (1, 5, 15, 30, or 60)
    #[arg(long, default_value_t = DEFAULT_AUTO_LOCK_MINUTES)]
    timeout: u32,

    /// Current PIN, required when an existing lock is still locked
    #[arg(long, conflicts_with_all = ["current_password", "current_pattern"])]
    current_pin: Option<String>,

    /// Current password, required when an existing lock is still locked
    #[arg(long, conflicts_with_all = ["current_pin", "current_pattern"])]
    current_password: Option<String>,

    /// Current pattern (cell indices in drawing order), required when an
    /// existing lock is still locked
    #[arg(long, conflicts_with_all = ["current_pin", "current_password"])]
    current_pattern: Option<String>,
}

impl SetupOptions {
    fn current_credential(&self) -> Result<Option<Credential>> {
        if let Some(pin) = &self.current_pin {
            return Ok(Some(Credential::Pin(pin.clone())));
        }
        if let Some(password) = &self.current_password {
            return Ok(Some(Credential::Password(password.clone())));
        }
        if let Some(pattern) = &self.current_pattern {
            return Ok(Some(Credential::Pattern(parse_pattern(pattern)?)));
        }
        Ok(None)
    }
}

#[derive(clap::Args)]
struct CredentialArgs {
    /// PIN credential
    #[arg(long, conflicts_with_all = ["password", "pattern"])]
    pin: Option<String>,

    /// Password credential
    #[arg(long, conflicts_with_all = ["pin", "pattern"])]
    password: Option<String>,

    /// Pattern credential, cell indices in drawing order, e.g. "0,1,2,5"
    #[arg(long, conflicts_with_all = ["pin", "password"])]
    pattern: Option<String>,
}

impl CredentialArgs {
    fn into_credential(self) -> Result<Option<Credential>> {
        if let Some(pin) = self.pin {
            return Ok(Some(Credential::Pin(pin)));
        }
        if let Some(password) = self.password {
            return Ok(Some(Credential::Password(password)));
        }
        if let Some(pattern) = self.pattern {
            return Ok(Some(Credential::Pattern(parse_pattern(&pattern)?)));
        }
        Ok(None)
    }
}

fn parse_pattern(input: &str) -> Result<Vec<u8>> {
    input
        .split(',')
        .map(|cell| {
            cell.trim()
                .parse::<u8>()
                .with_context(|| format!("invalid pattern cell '{}'", cell.trim()))
        })
        .collect()
}

fn open_store(path: Option<PathBuf>) -> Result<FileStore> {
    match path {
        Some(p) => Ok(FileStore::with_path(p)),
        None => FileStore::open_default().context("could not open the lock store"),
    }
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::from_default_env().add_directive("quill=info".parse()?))
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.store)?;

    match cli.command {
        Commands::Status => handle_status(store),
        Commands::Setup(cmd) => handle_setup(store, cmd),
        Commands::Unlock { credential } => handle_unlock(store, credential),
        Commands::Touch => handle_touch(store),
        Commands::Disable { credential } => handle_disable(store, credential),
    }
}

fn handle_status(store: FileStore) -> Result<()> {
    let now = now_ms();
    let last_activity = store.load_last_activity()?;
    let gate = SessionGate::initialize(store, now)?;

    match gate.state() {
        SessionState::Unlocked => println!("Session: Unlocked"),
        SessionState::Locked => println!("Session: Locked"),
    }

    match gate.settings() {
        None => println!("Lock: not configured"),
        Some(settings) if !settings.is_enabled => println!("Lock: disabled"),
        Some(settings) => {
            println!("Lock: {}", settings.auth_type.label());
            println!(
                "Biometric shortcut: {}",
                if settings.biometric_enabled { "on" } else { "off" }
            );
            println!("Auto-lock: {} min", settings.auto_lock_timeout);

            if let Some(last) = last_activity {
                let policy = AutoLock::new(settings.auto_lock_timeout);
                let remaining = policy.remaining_ms(last, now);
                println!("Idle window remaining: {}s", remaining / 1000);
            }
        }
    }

    Ok(())
}

fn handle_setup(store: FileStore, cmd: SetupCommands) -> Result<()> {
    let now = now_ms();
    let mut gate = SessionGate::initialize(store, now)?;

    let mut wizard = SetupWizard::new();

    let options = match cmd {
        SetupCommands::Pin {
            pin,
            confirm,
            options,
        } => {
            wizard.choose_method(AuthMethod::Pin)?;
            wizard.next()?;
            wizard.set_pin(pin);
            wizard.set_confirm_pin(confirm);
            options
        }
        SetupCommands::Password {
            password,
            confirm,
            options,
        } => {
            wizard.choose_method(AuthMethod::Password)?;
            wizard.next()?;
            wizard.set_password(password);
            wizard.set_confirm_password(confirm);
            options
        }
        SetupCommands::Pattern {
            pattern,
            confirm,
            options,
        } => {
            wizard.choose_method(AuthMethod::Pattern)?;
            wizard.next()?;
            for cell in parse_pattern(&pattern)? {
                wizard.push_pattern_dot(cell);
            }
            wizard.begin_pattern_confirm();
            for cell in parse_pattern(&confirm)? {
                wizard.push_pattern_dot(cell);
            }
            options
        }
    };

    // Reconfiguring is an unlocked-context operation, same as disabling: a
    // locked session must present the existing credential before the stored
    // one can be replaced.
    if gate.is_security_enabled() && !gate.is_unlocked() {
        let candidate = options.current_credential()?.context(
            "session is locked: provide --current-pin, --current-password, or --current-pattern to reconfigure",
        )?;

        if !gate.verify(&candidate) {
            bail!("Invalid credentials");
        }
        gate.login(now)?;
    }

    if !wizard.credentials_valid() {
        bail!("credential is invalid or the confirmation does not match");
    }
    wizard.next()?;

    wizard.set_auto_lock(options.timeout)?;

    // This build has no biometric platform; the shortcut is only kept when
    // the capability probe reports available.
    let probe = BiometricProbe::unavailable();
    wizard.set_biometric(options.biometric);
    if options.biometric && !probe.is_available() {
        println!("Note: biometric unavailable on this platform, shortcut not enabled");
    }
    let settings = wizard.finish(probe.is_available())?;

    gate.setup_security(settings, now)?;
    gate.login(now)?;

    println!("✓ Lock configured");
    Ok(())
}

fn handle_unlock(store: FileStore, credential: CredentialArgs) -> Result<()> {
    let now = now_ms();
    let mut gate = SessionGate::initialize(store, now)?;

    if !gate.is_security_enabled() {
        println!("No lock configured; session is always unlocked");
        return Ok(());
    }

    if gate.is_unlocked() {
        gate.record_activity(now)?;
        println!("✓ Session already unlocked (idle window refreshed)");
        return Ok(());
    }

    let candidate = credential
        .into_credential()?
        .context("a credential is required: --pin, --password, or --pattern")?;

    if !gate.verify(&candidate) {
        bail!("Invalid credentials");
    }

    gate.login(now)?;
    println!("✓ Unlocked");
    Ok(())
}

fn handle_touch(store: FileStore) -> Result<()> {
    let now = now_ms();
    let mut gate = SessionGate::initialize(store, now)?;

    if !gate.is_unlocked() {
        bail!("Session is locked; unlock before recording activity");
    }

    gate.record_activity(now)?;
    println!("✓ Activity recorded");
    Ok(())
}

fn handle_disable(store: FileStore, credential: CredentialArgs) -> Result<()> {
    let now = now_ms();
    let mut gate = SessionGate::initialize(store, now)?;

    if !gate.is_security_enabled() {
        println!("No lock configured");
        return Ok(());
    }

    // Disabling is an unlocked-context operation: a locked session must
    // present the credential first.
    if !gate.is_unlocked() {
        let candidate = credential
            .into_credential()?
            .context("session is locked: provide --pin, --password, or --pattern to disable")?;

        if !gate.verify(&candidate) {
            bail!("Invalid credentials");
        }
        gate.login(now)?;
    }

    gate.disable_security()?;
    println!("✓ Lock removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_lock::SecuritySettings;
    use std::path::Path;

    fn setup_pin_cmd(pin: &str, confirm: &str, current_pin: Option<&str>) -> SetupCommands {
        SetupCommands::Pin {
            pin: pin.to_string(),
            confirm: confirm.to_string(),
            options: SetupOptions {
                biometric: false,
                timeout: 5,
                current_pin: current_pin.map(str::to_string),
                current_password: None,
                current_pattern: None,
            },
        }
    }

    fn stored_pin(path: &Path) -> Option<String> {
        FileStore::with_path(path.to_path_buf())
            .load_settings()
            .unwrap()
            .and_then(|s| s.pin)
    }

    #[test]
    fn test_parse_pattern() {
        assert_eq!(parse_pattern("0,1,2,5").unwrap(), vec![0, 1, 2, 5]);
        assert_eq!(parse_pattern("0, 1, 2, 5").unwrap(), vec![0, 1, 2, 5]);
        assert!(parse_pattern("0,x,2").is_err());
        assert!(parse_pattern("").is_err());
    }

    #[test]
    fn test_setup_then_status_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock.json");

        handle_setup(
            FileStore::with_path(path.clone()),
            setup_pin_cmd("1234", "1234", None),
        )
        .unwrap();

        assert_eq!(stored_pin(&path).as_deref(), Some("1234"));

        // The next launch starts inside the idle window
        let gate = SessionGate::initialize(FileStore::with_path(path), now_ms()).unwrap();
        assert!(gate.is_unlocked());
        assert_eq!(gate.settings().unwrap().auto_lock_timeout, 5);
    }

    #[test]
    fn test_setup_requires_credential_while_locked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock.json");

        // Enabled lock with no activity stamp: the gate starts Locked
        let mut store = FileStore::with_path(path.clone());
        store
            .save_settings(&SecuritySettings {
                is_enabled: true,
                auth_type: AuthMethod::Pin,
                pin: Some("1234".to_string()),
                password: None,
                pattern: None,
                biometric_enabled: false,
                auto_lock_timeout: 5,
            })
            .unwrap();

        // Overwriting without the existing credential must fail and leave
        // the stored record untouched
        assert!(handle_setup(
            FileStore::with_path(path.clone()),
            setup_pin_cmd("9999", "9999", None),
        )
        .is_err());
        assert_eq!(stored_pin(&path).as_deref(), Some("1234"));

        // A wrong current credential fails the same way
        assert!(handle_setup(
            FileStore::with_path(path.clone()),
            setup_pin_cmd("9999", "9999", Some("0000")),
        )
        .is_err());
        assert_eq!(stored_pin(&path).as_deref(), Some("1234"));

        // Presenting the existing PIN allows the reconfiguration
        handle_setup(
            FileStore::with_path(path.clone()),
            setup_pin_cmd("9999", "9999", Some("1234")),
        )
        .unwrap();
        assert_eq!(stored_pin(&path).as_deref(), Some("9999"));
    }

    #[test]
    fn test_setup_over_unlocked_session_needs_no_credential() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lock.json");

        handle_setup(
            FileStore::with_path(path.clone()),
            setup_pin_cmd("1234", "1234", None),
        )
        .unwrap();

        // Still inside the idle window, so reconfiguring is an unlocked
        // operation
        handle_setup(
            FileStore::with_path(path.clone()),
            setup_pin_cmd("9999", "9999", None),
        )
        .unwrap();
        assert_eq!(stored_pin(&path).as_deref(), Some("9999"));
    }
}
