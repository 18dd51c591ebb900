/*!
 * Wordlist reading with a resumable byte cursor
 *
 * The wordlist is a newline-delimited password file consumed sequentially.
 * The cursor counts raw bytes (line terminators included), so a persisted
 * offset can be restored with a plain seek. Lines that are empty after
 * trimming advance the cursor but are never surfaced as candidates.
 */

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

/// Sequential reader over a wordlist file, tracking total bytes consumed.
pub struct WordlistReader {
    reader: BufReader<File>,
    offset: u64,
}

impl WordlistReader {
    /// Open `path` and seek to `resume_offset`.
    pub fn open(path: &Path, resume_offset: u64) -> io::Result<Self> {
        let mut file = File::open(path)?;
        if resume_offset > 0 {
            file.seek(SeekFrom::Start(resume_offset))?;
            debug!("wordlist cursor restored at byte {}", resume_offset);
        }

        Ok(WordlistReader {
            reader: BufReader::new(file),
            offset: resume_offset,
        })
    }

    /// Bytes consumed so far, including the current candidate's line.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next non-empty candidate, or `None` at end of file.
    ///
    /// The offset advances by the raw length of every line read, including
    /// blank ones that are skipped. Wordlists are not required to be valid
    /// UTF-8; undecodable bytes are replaced rather than rejected.
    pub fn next_candidate(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();

        loop {
            line.clear();
            let consumed = self.reader.read_until(b'\n', &mut line)?;
            if consumed == 0 {
                return Ok(None);
            }
            self.offset += consumed as u64;

            let candidate = String::from_utf8_lossy(&line);
            let candidate = candidate.trim();
            if !candidate.is_empty() {
                return Ok(Some(candidate.to_string()));
            }
        }
    }
}
