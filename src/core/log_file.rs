// eximscope - GPL-3.0-or-later
// This file is part of eximscope.
//
// Copyright (C) 2025 Daniel Freiermuth
//
// eximscope is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// eximscope is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with eximscope.  If not, see <https://www.gnu.org/licenses/>.

//! Reading a mainlog file into memory as parsed records.

use crate::parser::{line::LogRecord, parse_line, ParseError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read log file '{path}': {cause}")]
    Io {
        path: PathBuf,
        cause: std::io::Error,
    },
}

/// A line that did not produce a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedLine {
    pub line_number: usize,
    pub raw: String,
    pub reason: ParseError,
}

/// Parsed records in file order plus everything that was skipped
#[derive(Debug, Default)]
pub struct ParsedLog {
    pub records: Vec<LogRecord>,
    pub unparsed: Vec<UnparsedLine>,
}

impl ParsedLog {
    /// Parse every line of `content`. Unparsed lines are logged and collected, never fatal.
    pub fn from_content(content: &str) -> Self {
        profiling::scope!("ParsedLog::from_content");

        let mut parsed = Self::default();
        for (idx, raw) in content.lines().enumerate() {
            let line_number = idx + 1;
            match parse_line(raw, line_number) {
                Ok(record) => parsed.records.push(record),
                Err(reason) => {
                    tracing::warn!("Line {line_number} not parsed ({reason}): {}", raw.trim());
                    parsed.unparsed.push(UnparsedLine {
                        line_number,
                        raw: raw.to_string(),
                        reason,
                    });
                }
            }
        }
        parsed
    }

    /// Read and parse a log file. Failing to read the file is the only fatal error.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let start_time = Instant::now();

        // Lossy conversion keeps going on stray non-UTF8 bytes in headers
        let buffer = std::fs::read(path).map_err(|cause| LoadError::Io {
            path: path.to_path_buf(),
            cause,
        })?;
        tracing::debug!("Read {} bytes from {}", buffer.len(), path.display());

        let content = String::from_utf8_lossy(&buffer);
        let parsed = Self::from_content(&content);

        tracing::info!(
            "Parsed {} records ({} unparsed) from {} in {:?}",
            parsed.records.len(),
            parsed.unparsed.len(),
            path.display(),
            start_time.elapsed()
        );
        Ok(parsed)
    }

    pub fn total_lines(&self) -> usize {
        self.records.len() + self.unparsed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
2024-01-10 08:15:30 host1 ABC-1: <= alice@example.com H=a [192.0.2.1] P=esmtps X=TLS1.3
this line is garbage

2024-13-10 08:15:30 host1 ABC-2: <= bob@example.com bad month
2024-01-10 08:16:00 host1 ABC-1: => carol@example.org R=dnslookup T=remote_smtp H=b [198.51.100.2]
";

    #[test]
    fn test_from_content_keeps_file_order() {
        let parsed = ParsedLog::from_content(SAMPLE);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].line_number(), 1);
        assert_eq!(parsed.records[1].line_number(), 5);
        assert_eq!(parsed.total_lines(), 5);
    }

    #[test]
    fn test_unparsed_lines_are_collected() {
        let parsed = ParsedLog::from_content(SAMPLE);
        let reasons: Vec<(usize, &ParseError)> = parsed
            .unparsed
            .iter()
            .map(|u| (u.line_number, &u.reason))
            .collect();
        assert_eq!(reasons.len(), 3);
        assert_eq!(reasons[0], (2, &ParseError::LineFormat));
        assert_eq!(reasons[1], (3, &ParseError::LineFormat));
        assert!(matches!(reasons[2], (4, ParseError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write temp file");

        let parsed = ParsedLog::load(file.path()).expect("load temp file");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].participant_address(), "carol@example.org");
    }

    #[test]
    fn test_load_handles_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(b"\xff\xfe broken header\n").expect("write temp file");
        file.write_all(SAMPLE.as_bytes()).expect("write temp file");

        let parsed = ParsedLog::load(file.path()).expect("load temp file");
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.unparsed[0].line_number, 1);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let result = ParsedLog::load(&dir.path().join("does-not-exist.log"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
