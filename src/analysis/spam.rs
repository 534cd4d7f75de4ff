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

use crate::core::FrequencyCounter;
use crate::parser::line::{Direction, LogRecord};
use fancy_regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_SPAM_SCORE_THRESHOLD: f64 = 5.0;

// Stricter than the parser's scanner: SpamAssassin only, unsigned decimal score
static SPAMASSASSIN_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"SpamAssassin.*score=(\d+\.\d+)").expect("valid regex literal")
});

/// Delivered messages per participant address
pub fn spam_senders(records: &[LogRecord]) -> FrequencyCounter<&str> {
    profiling::scope!("spam_senders");
    records
        .iter()
        .filter(|r| r.direction() == Direction::Sent)
        .map(LogRecord::participant_address)
        .collect()
}

fn spamassassin_score(details: &str) -> Option<f64> {
    SPAMASSASSIN_SCORE
        .captures(details)
        .ok()
        .flatten()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A record together with the SpamAssassin score it was selected by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRecord<'a> {
    pub record: &'a LogRecord,
    pub score: f64,
}

/// Records with a SpamAssassin score strictly above `threshold`
pub fn high_spam_scores(records: &[LogRecord], threshold: f64) -> Vec<ScoredRecord<'_>> {
    profiling::scope!("high_spam_scores");
    records
        .iter()
        .filter_map(|record| {
            spamassassin_score(record.details())
                .filter(|&score| score > threshold)
                .map(|score| ScoredRecord { record, score })
        })
        .collect()
}
