/*!
 * Bounded polling
 *
 * A single primitive replaces the nested sleep loops the attempt sequence
 * needs: probe a condition at a fixed interval until it holds, the deadline
 * passes, or the run is cancelled.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How a bounded wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The probe returned true before the deadline.
    Satisfied,
    /// The deadline passed without the probe returning true.
    TimedOut,
    /// The cancellation flag was raised while waiting.
    Cancelled,
}

/// Poll `probe` every `interval` until it returns true or `deadline` passes.
///
/// The probe runs at least once even if the deadline has already passed, so
/// an immediately-true condition is never reported as a timeout. The cancel
/// flag is checked between probes.
pub fn poll_until(
    deadline: Instant,
    interval: Duration,
    cancel: &AtomicBool,
    mut probe: impl FnMut() -> bool,
) -> WaitOutcome {
    loop {
        if probe() {
            return WaitOutcome::Satisfied;
        }

        if cancel.load(Ordering::SeqCst) {
            return WaitOutcome::Cancelled;
        }

        if Instant::now() >= deadline {
            return WaitOutcome::TimedOut;
        }

        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(1);

    #[test]
    fn test_immediate_satisfaction() {
        let cancel = AtomicBool::new(false);
        // Deadline already in the past: the probe must still run once.
        let outcome = poll_until(Instant::now(), TICK, &cancel, || true);
        assert_eq!(outcome, WaitOutcome::Satisfied);
    }

    #[test]
    fn test_times_out() {
        let cancel = AtomicBool::new(false);
        let deadline = Instant::now() + Duration::from_millis(20);
        let outcome = poll_until(deadline, TICK, &cancel, || false);
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_cancelled() {
        let cancel = AtomicBool::new(true);
        let deadline = Instant::now() + Duration::from_secs(60);
        let outcome = poll_until(deadline, TICK, &cancel, || false);
        assert_eq!(outcome, WaitOutcome::Cancelled);
    }

    #[test]
    fn test_becomes_true_after_a_few_probes() {
        let cancel = AtomicBool::new(false);
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut calls = 0;
        let outcome = poll_until(deadline, TICK, &cancel, || {
            calls += 1;
            calls >= 3
        });
        assert_eq!(outcome, WaitOutcome::Satisfied);
        assert_eq!(calls, 3);
    }
}
