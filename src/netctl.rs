/*!
 * OS network control
 *
 * Thin synchronous wrappers over the `netsh wlan` command surface. Each
 * operation issues exactly one external command and reports success as a
 * boolean; process launch failures and unexpected exits are soft failures
 * (`false`), never a crash. Retry policy belongs to the caller.
 *
 * These calls mutate OS-global state (the profile store and the active
 * connection). They are NOT safe to run concurrently against the same
 * target network; the running session owns the profile store for its
 * duration.
 */

use std::path::Path;
use std::process::{Command, Output};

use regex::RegexBuilder;
use tracing::{debug, error};

/// Whether the `netsh` command surface exists on this platform.
///
/// Checked once at run start; a failing check is fatal before any attempt is
/// made.
pub fn platform_supported() -> bool {
    cfg!(target_os = "windows")
}

/// Injected seam over the OS network stack so the attempt loop can be
/// exercised against a deterministic fake.
pub trait NetworkControl {
    /// Drop the active wireless connection, whatever it is.
    fn disconnect(&self) -> bool;

    /// Remove the stored profile for `ssid`. Also reports true when netsh
    /// succeeds because there was nothing to delete.
    fn delete_profile(&self, ssid: &str) -> bool;

    /// Register the profile document at `path` with the OS store.
    fn add_profile(&self, path: &Path) -> bool;

    /// Request a connection to `ssid` using its stored profile.
    fn connect(&self, ssid: &str) -> bool;

    /// Whether `ssid` is currently visible in a network scan.
    fn ssid_visible(&self, ssid: &str) -> bool;

    /// Whether the wireless interface is connected with `ssid` as the
    /// active network.
    fn connected_to(&self, ssid: &str) -> bool;
}

/// `netsh wlan`-backed implementation.
pub struct NetshControl;

impl NetshControl {
    pub fn new() -> Self {
        NetshControl
    }

    fn run(&self, operation: &str, args: &[String]) -> Option<Output> {
        match Command::new("netsh").args(args).output() {
            Ok(output) => {
                debug!(
                    "{}: netsh exited with {:?}",
                    operation,
                    output.status.code()
                );
                Some(output)
            }
            Err(err) => {
                error!("{}: failed to launch netsh: {}", operation, err);
                None
            }
        }
    }

    fn run_ok(&self, operation: &str, args: &[String]) -> bool {
        self.run(operation, args)
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl Default for NetshControl {
    fn default() -> Self {
        NetshControl::new()
    }
}

impl NetworkControl for NetshControl {
    fn disconnect(&self) -> bool {
        self.run_ok(
            "disconnect",
            &["wlan".into(), "disconnect".into()],
        )
    }

    fn delete_profile(&self, ssid: &str) -> bool {
        self.run_ok(
            "delete-profile",
            &[
                "wlan".into(),
                "delete".into(),
                "profile".into(),
                format!("name={ssid}"),
            ],
        )
    }

    fn add_profile(&self, path: &Path) -> bool {
        self.run_ok(
            "add-profile",
            &[
                "wlan".into(),
                "add".into(),
                "profile".into(),
                format!("filename={}", path.display()),
            ],
        )
    }

    fn connect(&self, ssid: &str) -> bool {
        self.run_ok(
            "connect",
            &[
                "wlan".into(),
                "connect".into(),
                format!("name={ssid}"),
                format!("ssid={ssid}"),
            ],
        )
    }

    fn ssid_visible(&self, ssid: &str) -> bool {
        let output = match self.run(
            "scan",
            &["wlan".into(), "show".into(), "networks".into()],
        ) {
            Some(output) if output.status.success() => output,
            _ => return false,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        scan_lists_ssid(&stdout, ssid)
    }

    fn connected_to(&self, ssid: &str) -> bool {
        let output = match self.run(
            "status",
            &["wlan".into(), "show".into(), "interfaces".into()],
        ) {
            Some(output) if output.status.success() => output,
            _ => return false,
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        interface_connected_to(&stdout, ssid)
    }
}

/// Whole-word, case-insensitive SSID match over `netsh wlan show networks`
/// output.
fn scan_lists_ssid(stdout: &str, ssid: &str) -> bool {
    word_match(ssid)
        .map(|re| re.is_match(stdout))
        .unwrap_or(false)
}

/// `netsh wlan show interfaces` confirmation: a `State : connected` line
/// (not `disconnected`) plus the SSID appearing as a whole word.
fn interface_connected_to(stdout: &str, ssid: &str) -> bool {
    let state_connected = stdout.lines().any(|line| {
        let line = line.trim();
        if !line.to_ascii_lowercase().starts_with("state") {
            return false;
        }
        match line.split(':').nth(1) {
            Some(value) => value.trim().eq_ignore_ascii_case("connected"),
            None => false,
        }
    });

    state_connected
        && word_match(ssid)
            .map(|re| re.is_match(stdout))
            .unwrap_or(false)
}

fn word_match(ssid: &str) -> Option<regex::Regex> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(ssid)))
        .case_insensitive(true)
        .build()
        .map_err(|err| error!("ssid match pattern failed: {}", err))
        .ok()
}
