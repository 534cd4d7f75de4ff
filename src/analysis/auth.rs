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
use crate::parser::line::{Direction, LogRecord};
use fancy_regex::Regex;
use std::sync::LazyLock;

// Broader than the parser's dovecot_login pattern
static AUTH_FAILURE_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)authentication failure").expect("valid regex literal"));

/// Received messages whose details report an authentication failure
pub fn auth_failures(records: &[LogRecord]) -> Vec<&LogRecord> {
    profiling::scope!("auth_failures");
    records
        .iter()
        .filter(|r| r.direction() == Direction::Received)
        .filter(|r| is_match(&AUTH_FAILURE_PHRASE, r.details()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::records;

    #[test]
    fn test_only_received_lines() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: <= a@example.com Authentication Failure for a",
            "2024-01-10 08:00:01 mx A-2: => b@example.com authentication failure for b",
            "2024-01-10 08:00:02 mx A-3: <= c@example.com AUTHENTICATION FAILURE",
            "2024-01-10 08:00:03 mx A-4: <= d@example.com all fine",
        ]);
        let ids: Vec<&str> = auth_failures(&records)
            .iter()
            .map(|r| r.message_id())
            .collect();
        assert_eq!(ids, vec!["A-1", "A-3"]);
    }

    #[test]
    fn test_dovecot_failure_is_not_the_generic_phrase() {
        let records = records(&[
            "2024-01-10 08:15:30 host1 ABCD1234-5678-90: <= user@example.com dovecot_login authenticator failed for host.example [203.0.113.5]: 535 Incorrect authentication data",
        ]);
        assert!(records[0].auth_failure());
        assert!(auth_failures(&records).is_empty());
    }
}
