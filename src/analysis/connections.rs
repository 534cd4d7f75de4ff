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

//! Per-IP counts: refused connections, failure patterns and send volume.

use super::{bracketed_ip, is_match};
use crate::core::{FrequencyCounter, TimeWindow};
use crate::parser::line::{Direction, LogRecord};
use fancy_regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_MIN_SENDS: usize = 1000;

static REFUSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)refused").expect("valid regex literal"));

static FAILURE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(refused|failed|frozen)").expect("valid regex literal"));

/// Count records mentioning a refusal per bracketed IP.
/// Refusals without an IP in the details are not counted.
pub fn connection_refusals(records: &[LogRecord]) -> FrequencyCounter<&str> {
    profiling::scope!("connection_refusals");
    records
        .iter()
        .filter(|r| is_match(&REFUSED, r.details()))
        .filter_map(|r| bracketed_ip(r.details()))
        .collect()
}

/// Count records mentioning a refusal, failure or freeze per bracketed IP
pub fn ip_failure_patterns(records: &[LogRecord]) -> FrequencyCounter<&str> {
    profiling::scope!("ip_failure_patterns");
    records
        .iter()
        .filter(|r| is_match(&FAILURE_PATTERN, r.details()))
        .filter_map(|r| bracketed_ip(r.details()))
        .collect()
}

/// Count SMTP deliveries per remote IP inside `window`, keeping only IPs
/// with at least `min_sends` deliveries.
pub fn ip_send_volume(
    records: &[LogRecord],
    window: TimeWindow,
    min_sends: usize,
) -> FrequencyCounter<&str> {
    profiling::scope!("ip_send_volume");
    records
        .iter()
        .filter(|r| r.direction() == Direction::Sent && r.details().contains("smtp"))
        .filter(|r| window.contains(r.timestamp()))
        .filter_map(|r| bracketed_ip(r.details()))
        .collect::<FrequencyCounter<&str>>()
        .at_least(min_sends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::{records, MIXED_LOG};
    use crate::core::parse_date_arg;

    #[test]
    fn test_refusals_per_ip() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: <= a@example.com H=x [192.0.2.1] Connection REFUSED",
            "2024-01-10 08:00:01 mx A-2: <= b@example.com H=x [192.0.2.1] refused relay",
            "2024-01-10 08:00:02 mx A-3: <= c@example.com H=y [192.0.2.2] refused",
            "2024-01-10 08:00:03 mx A-4: <= d@example.com refused but no address",
            "2024-01-10 08:00:04 mx A-5: <= e@example.com H=z [192.0.2.3] accepted",
        ]);
        let counter = connection_refusals(&records);
        assert_eq!(counter.get("192.0.2.1"), 2);
        assert_eq!(counter.get("192.0.2.2"), 1);
        assert_eq!(counter.get("192.0.2.3"), 0);
        assert_eq!(counter.len(), 2);
    }

    #[test]
    fn test_failure_patterns_combine() {
        let records = records(MIXED_LOG);
        let counter = ip_failure_patterns(&records);
        // One refused line and one failed line from the same address
        assert_eq!(counter.get("198.51.100.9"), 2);
        // The dovecot line says "failed" and carries a bracketed address
        assert_eq!(counter.get("203.0.113.5"), 1);
        assert!(counter.iter().all(|(_, count)| count > 0));
    }

    #[test]
    fn test_frozen_counts_as_failure_pattern() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: <> x@example.com H=q [192.0.2.44] message is Frozen",
        ]);
        assert_eq!(ip_failure_patterns(&records).get("192.0.2.44"), 1);
    }

    fn send_log() -> Vec<LogRecord> {
        records(&[
            "2024-01-10 08:00:00 mx A-1: => a@example.com T=remote_smtp H=a [192.0.2.1]",
            "2024-01-10 09:00:00 mx A-2: => b@example.com T=remote_smtp H=a [192.0.2.1]",
            "2024-01-11 10:00:00 mx A-3: => c@example.com T=remote_smtp H=a [192.0.2.1]",
            "2024-01-10 08:30:00 mx A-4: => d@example.com T=remote_smtp H=b [192.0.2.2]",
            "2024-01-10 08:40:00 mx A-5: == e@example.com T=remote_smtp H=b [192.0.2.2]",
            "2024-01-10 08:50:00 mx A-6: => f@example.com T=local_delivery H=b [192.0.2.2]",
            "2024-01-10 08:55:00 mx A-7: => g@example.com T=remote_smtp no address",
        ])
    }

    #[test]
    fn test_send_volume_counts_smtp_deliveries() {
        let records = send_log();
        let counter = ip_send_volume(&records, TimeWindow::unbounded(), 0);
        assert_eq!(counter.get("192.0.2.1"), 3);
        assert_eq!(counter.get("192.0.2.2"), 1);
        assert_eq!(counter.len(), 2);
    }

    #[test]
    fn test_send_volume_threshold_is_subset() {
        let records = send_log();
        let all = ip_send_volume(&records, TimeWindow::unbounded(), 0);
        let filtered = ip_send_volume(&records, TimeWindow::unbounded(), 2);

        assert!(filtered.iter().all(|(_, count)| count >= 2));
        for (ip, count) in filtered.iter() {
            assert_eq!(all.get(*ip), count);
        }
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_send_volume_window() {
        let records = send_log();
        let window = TimeWindow::new(
            Some(parse_date_arg("2024-01-10 08:00:00").expect("valid")),
            Some(parse_date_arg("2024-01-10 09:00:00").expect("valid")),
        );
        let counter = ip_send_volume(&records, window, 1);
        assert_eq!(counter.get("192.0.2.1"), 2);
        assert_eq!(counter.get("192.0.2.2"), 1);
    }

    #[test]
    fn test_default_minimum_hides_small_senders() {
        let records = send_log();
        assert!(ip_send_volume(&records, TimeWindow::unbounded(), DEFAULT_MIN_SENDS).is_empty());
    }
}
