/*!
 * Codebook generation
 *
 * Writes the full Cartesian product of a character set at a fixed length
 * into numbered wordlist files, bounding how many lines land in each file
 * so individual codebooks stay manageable.
 */

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

/// Subdirectory created under the output path.
pub const CODEBOOK_DIR: &str = "Codebook";

/// Summary of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodebookStats {
    pub files: u64,
    pub passwords: u64,
    pub directory: PathBuf,
}

/// Generate every `length`-character combination of `charset` under
/// `output_dir`, at most `per_file` lines per file.
///
/// Any existing codebook directory is replaced.
pub fn generate(output_dir: &Path, charset: &str, length: usize, per_file: u64) -> Result<CodebookStats> {
    let symbols: Vec<char> = charset.chars().collect();
    if symbols.is_empty() {
        bail!("character set is empty");
    }
    if length == 0 {
        bail!("password length must be at least 1");
    }

    let total = (symbols.len() as u128)
        .checked_pow(length as u32)
        .filter(|&n| n <= u64::MAX as u128)
        .map(|n| n as u64)
        .context("combination count overflows; shorten the length or charset")?;
    if per_file == 0 {
        bail!("per-file line count must be at least 1");
    }

    let dir = output_dir.join(CODEBOOK_DIR);
    if dir.exists() {
        fs::remove_dir_all(&dir)
            .with_context(|| format!("failed to clear {}", dir.display()))?;
        info!("removed directory: {}", dir.display());
    }
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    info!("created directory: {}", dir.display());

    warn!("generating codebook: {} combinations", total);
    let started = Instant::now();

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {eta}")
            .unwrap()
            .progress_chars("█▓▒░-"),
    );

    let mut files: u64 = 0;
    let mut written_in_file: u64 = 0;
    let mut writer = open_chunk(&dir, files)?;

    // Odometer over charset indices, least-significant position last.
    let mut odometer = vec![0usize; length];
    let mut password = String::with_capacity(length);
    for generated in 0..total {
        if written_in_file >= per_file {
            writer.flush()?;
            files += 1;
            written_in_file = 0;
            writer = open_chunk(&dir, files)?;
        }

        password.clear();
        for &idx in &odometer {
            password.push(symbols[idx]);
        }
        writeln!(writer, "{password}")?;
        written_in_file += 1;

        for position in (0..length).rev() {
            odometer[position] += 1;
            if odometer[position] < symbols.len() {
                break;
            }
            odometer[position] = 0;
        }

        if generated % 4096 == 0 {
            pb.set_position(generated);
        }
    }
    writer.flush()?;
    pb.finish_with_message("Done");

    warn!(
        "codebook generated: {} passwords in {} files - elapsed: {:?}",
        total,
        files + 1,
        started.elapsed()
    );

    Ok(CodebookStats {
        files: files + 1,
        passwords: total,
        directory: dir,
    })
}

fn open_chunk(dir: &Path, serial: u64) -> Result<BufWriter<File>> {
    let path = dir.join(format!("Serial_Number{serial}.txt"));
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
