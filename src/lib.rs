/*!
 * wifikey - online WiFi credential audit loop with resumable progress
 *
 * Iterates candidate passwords from a wordlist, applies each through the
 * Windows `netsh wlan` profile mechanism, and observes the connection
 * outcome. A JSON resume index keyed by (network, wordlist) records the
 * byte offset of the last attempt so interrupted runs pick up where they
 * stopped.
 *
 * For auditing networks you are authorized to test. Educational use only.
 */

pub mod blast;
pub mod codebook;
pub mod error;
pub mod index;
pub mod logging;
pub mod netctl;
pub mod paths;
pub mod profile;
pub mod wait;
pub mod wordlist;

pub use blast::{BlastConfig, BlastOutcome, Timing};
pub use error::{BlastError, Result};
pub use netctl::{NetshControl, NetworkControl};
pub use paths::Workspace;
