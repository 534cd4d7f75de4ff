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

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date '{0}', expected YYYY-MM-DD or 'YYYY-MM-DD HH:MM:SS'")]
pub struct DateArgError(pub String);

/// Inclusive time range with optional bounds, compared at second precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeWindow {
    pub const fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    /// Window without bounds, contains every timestamp
    pub const fn unbounded() -> Self {
        Self::new(None, None)
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start.is_none_or(|start| ts >= start) && self.end.is_none_or(|end| ts <= end)
    }
}

/// Parse a window bound from the command line.
///
/// A bare date means midnight of that day, so `--end-date 2024-01-10`
/// excludes everything logged later on the 10th.
pub fn parse_date_arg(s: &str) -> Result<NaiveDateTime, DateArgError> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(ts);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| DateArgError(s.to_string()))
}
