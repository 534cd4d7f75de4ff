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

pub mod line;
pub mod scanners;

use chrono::{NaiveDateTime, Timelike};
use fancy_regex::Regex;
use line::{Direction, LogRecord};
use std::sync::LazyLock;
use thiserror::Error;

// DATE TIME HOST MESSAGE_ID: DIRECTION EMAIL DETAILS
static MAINLOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2})\s+[\w.-]+\s+([A-Za-z0-9-]+):\s+(<=|=>|==|<>)\s+([\w.-]+@[\w.-]+)\s*(.*)",
    )
    .expect("valid regex literal")
});

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Why a line did not produce a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line does not match the mainlog format")]
    LineFormat,
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

/// Parse one mainlog line into a record.
///
/// The line must match the top level grammar from its start; trailing text
/// ends up in the details. After that the detail scanners add their
/// optional annotations.
pub fn parse_line(raw: &str, line_number: usize) -> Result<LogRecord, ParseError> {
    profiling::scope!("parse_line");

    let caps = match MAINLOG_LINE.captures(raw) {
        Ok(Some(caps)) => caps,
        Ok(None) => return Err(ParseError::LineFormat),
        Err(e) => {
            tracing::debug!("Regex backtracking failed on line {line_number}: {e}");
            return Err(ParseError::LineFormat);
        }
    };

    let timestamp_str = format!("{} {}", &caps[1], &caps[2]);
    let timestamp = parse_timestamp(&timestamp_str)
        .ok_or_else(|| ParseError::InvalidTimestamp(timestamp_str.clone()))?;

    // Unreachable error: the line pattern only admits the four direction tokens
    let direction = Direction::from_token(&caps[4]).ok_or(ParseError::LineFormat)?;
    let details = caps[6].to_string();
    let annotations = scanners::annotate(&details, scanners::DEFAULT_SCANNERS);

    Ok(LogRecord::new(
        line_number,
        timestamp,
        caps[3].to_string(),
        direction,
        caps[5].to_string(),
        details,
        annotations,
    ))
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let ts = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()?;
    // chrono accepts second 60 as a leap second, the log never writes one
    if ts.nanosecond() >= 1_000_000_000 {
        return None;
    }
    Some(ts)
}
