/*!
 * wifikey CLI
 *
 * Online WiFi credential audit loop with resumable progress, plus a
 * Cartesian-product codebook generator. Windows only: the attempt loop
 * drives the `netsh wlan` command surface.
 */

mod cli;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;

use cli::{Args, Mode};
use wifikey::blast::{self, BlastConfig, BlastOutcome, Timing};
use wifikey::netctl::{platform_supported, NetshControl};
use wifikey::paths::Workspace;
use wifikey::{codebook, logging};

fn main() -> Result<()> {
    let args = Args::parse();

    eprintln!("\nwifikey v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("================================");
    eprintln!("For networks you are authorized to audit. Educational use only.\n");

    match args.mode {
        Mode::Blast {
            ssid,
            wordlist,
            output,
            timeout,
        } => {
            let workspace =
                Workspace::init(&output).context("failed to initialize output directories")?;
            let _guard = logging::init(&workspace.log_dir, args.verbose);

            // Environment gate: fatal before any attempt is made.
            if !platform_supported() {
                bail!("unsupported platform: the netsh command surface requires Windows");
            }

            let cancel = Arc::new(AtomicBool::new(false));
            {
                let cancel = Arc::clone(&cancel);
                ctrlc::set_handler(move || {
                    eprintln!("\nStopping after the current step...");
                    cancel.store(true, Ordering::SeqCst);
                })
                .context("failed to install Ctrl-C handler")?;
            }

            let config = BlastConfig {
                ssid,
                wordlist,
                timing: Timing {
                    phase_timeout: Duration::from_secs(timeout),
                    ..Timing::default()
                },
            };

            let ctl = NetshControl::new();
            let started = Instant::now();
            match blast::run(&ctl, &workspace, &config, &cancel) {
                Ok(BlastOutcome::Found { password, attempts }) => {
                    println!("\n{}", "Password found!".green().bold());
                    println!("   Network:  {}", config.ssid.yellow());
                    println!("   Password: {}", password.green().bold());
                    println!("   Attempts: {}", attempts);
                    println!("   Elapsed:  {:.1?}", started.elapsed());
                }
                Ok(BlastOutcome::Exhausted { attempts }) => {
                    println!(
                        "\n{}",
                        format!(
                            "Wordlist exhausted after {} attempts - no password found.",
                            attempts
                        )
                        .yellow()
                    );
                    println!("   Elapsed:  {:.1?}", started.elapsed());
                }
                Ok(BlastOutcome::Interrupted { attempts }) => {
                    println!(
                        "\n{}",
                        format!("Stopped by user after {} attempts.", attempts).yellow()
                    );
                    println!("   Progress saved - rerun the same command to resume.");
                }
                Err(err) => {
                    eprintln!("\n{} {}", "Run aborted:".red().bold(), err);
                    // Flush the file logger before exiting non-zero.
                    drop(_guard);
                    std::process::exit(1);
                }
            }
        }

        Mode::Generate {
            output,
            charset,
            length,
            per_file,
        } => {
            logging::init_console(args.verbose);

            let stats = codebook::generate(&output, &charset, length, per_file)
                .context("codebook generation failed")?;

            println!("\n{}", "Codebook generated.".green().bold());
            println!("   Passwords: {}", stats.passwords);
            println!("   Files:     {}", stats.files);
            println!("   Directory: {}", stats.directory.display());
        }
    }

    Ok(())
}
