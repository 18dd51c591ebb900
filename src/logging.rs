/*!
 * Log setup
 *
 * Leveled output to the console and to a daily-rotated file under the
 * workspace's `Log` directory. The returned guard flushes the file writer
 * when dropped, so the caller holds it for the life of the run.
 */

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `verbose` lifts the default level from
/// info to debug; `RUST_LOG` still overrides either.
pub fn init(log_dir: &Path, verbose: bool) -> WorkerGuard {
    let filter = env_filter(verbose);

    let file_appender = tracing_appender::rolling::daily(log_dir, "wifikey.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    guard
}

/// Console-only variant for commands that have no log directory.
pub fn init_console(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
