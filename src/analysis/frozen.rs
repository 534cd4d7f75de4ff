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

use super::is_match;
use crate::core::FrequencyCounter;
use crate::parser::line::LogRecord;
use fancy_regex::Regex;
use std::sync::LazyLock;

const HOUR_FORMAT: &str = "%Y-%m-%d %H:00";

static FROZEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)frozen").expect("valid regex literal"));

/// Records whose details mention freezing in any casing
pub fn frozen_messages(records: &[LogRecord]) -> Vec<&LogRecord> {
    profiling::scope!("frozen_messages");
    records
        .iter()
        .filter(|r| is_match(&FROZEN, r.details()))
        .collect()
}

/// Bucket frozen messages by hour, keys in first-seen order
pub fn frozen_by_hour(frozen: &[&LogRecord]) -> FrequencyCounter<String> {
    frozen
        .iter()
        .map(|r| r.timestamp().format(HOUR_FORMAT).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::records;

    #[test]
    fn test_frozen_list_is_case_insensitive() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: <= a@example.com Message is frozen",
            "2024-01-10 08:00:01 mx A-2: <= b@example.com message is FROZEN by operator",
            "2024-01-10 08:00:02 mx A-3: <= c@example.com delivered",
            "2024-01-10 08:00:03 mx A-4: <= d@example.com UNFROZEN by admin",
        ]);
        assert!(records[0].frozen());
        assert!(!records[1].frozen());

        let ids: Vec<&str> = frozen_messages(&records)
            .iter()
            .map(|r| r.message_id())
            .collect();
        assert_eq!(ids, vec!["A-1", "A-2", "A-4"]);
    }

    #[test]
    fn test_frozen_by_hour() {
        let records = records(&[
            "2024-01-10 08:05:00 mx A-1: <= a@example.com Message is frozen",
            "2024-01-10 08:59:59 mx A-2: <= b@example.com Message is frozen",
            "2024-01-10 10:00:00 mx A-3: <= c@example.com Message is frozen",
            "2024-01-10 09:30:00 mx A-4: <= d@example.com Message is frozen",
        ]);
        let frozen = frozen_messages(&records);
        let by_hour = frozen_by_hour(&frozen);
        let buckets: Vec<(&str, usize)> = by_hour.iter().map(|(k, v)| (k.as_str(), v)).collect();
        assert_eq!(
            buckets,
            vec![
                ("2024-01-10 08:00", 2),
                ("2024-01-10 10:00", 1),
                ("2024-01-10 09:00", 1)
            ]
        );
        assert_eq!(by_hour.total(), frozen.len());
    }
}
