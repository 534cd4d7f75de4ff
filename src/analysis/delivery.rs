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
use serde::Serialize;
use std::sync::LazyLock;

const TLS_MARKER: &str = "X=TLS";

static DEFERRED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)deferred").expect("valid regex literal"));

/// Bounces and deferrals are counted independently, a record may be both
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BounceDeferredCounts {
    pub bounces: usize,
    pub deferred: usize,
}

/// Partition of all records by whether they carry a TLS cipher field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TlsUsage {
    pub enabled: usize,
    pub disabled: usize,
}

pub fn bounces_deferred(records: &[LogRecord]) -> BounceDeferredCounts {
    profiling::scope!("bounces_deferred");
    BounceDeferredCounts {
        bounces: records
            .iter()
            .filter(|r| r.direction() == Direction::BounceOrNoSender)
            .count(),
        deferred: records
            .iter()
            .filter(|r| is_match(&DEFERRED, r.details()))
            .count(),
    }
}

/// Counts every record, not only deliveries
pub fn tls_usage(records: &[LogRecord]) -> TlsUsage {
    profiling::scope!("tls_usage");
    let enabled = records
        .iter()
        .filter(|r| r.details().contains(TLS_MARKER))
        .count();
    TlsUsage {
        enabled,
        disabled: records.len() - enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::{records, MIXED_LOG};

    #[test]
    fn test_bounces_and_deferred_overlap() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: <> a@example.com R=bounce message DEFERRED",
            "2024-01-10 08:00:01 mx A-2: <> b@example.com R=bounce",
            "2024-01-10 08:00:02 mx A-3: => c@example.com Deferred: retry later",
            "2024-01-10 08:00:03 mx A-4: => d@example.com delivered",
        ]);
        assert_eq!(
            bounces_deferred(&records),
            BounceDeferredCounts {
                bounces: 2,
                deferred: 2
            }
        );
    }

    #[test]
    fn test_defer_is_not_deferred() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: == a@example.com defer (-53): retry time not reached",
        ]);
        assert_eq!(bounces_deferred(&records).deferred, 0);
    }

    #[test]
    fn test_tls_partitions_all_records() {
        let records = records(MIXED_LOG);
        let usage = tls_usage(&records);
        assert_eq!(usage.enabled + usage.disabled, records.len());
        assert_eq!(usage.enabled, 2);
    }

    #[test]
    fn test_tls_on_sent_line_with_other_annotations() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: => a@example.com H=mx [192.0.2.1] X=TLS1.3 SpamAssassin score=9.1 Message is frozen",
        ]);
        assert_eq!(
            tls_usage(&records),
            TlsUsage {
                enabled: 1,
                disabled: 0
            }
        );
    }

    #[test]
    fn test_tls_marker_is_case_sensitive() {
        let records = records(&["2024-01-10 08:00:00 mx A-1: <= a@example.com x=tls1.3"]);
        assert_eq!(tls_usage(&records).disabled, 1);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(tls_usage(&[]), TlsUsage::default());
        assert_eq!(bounces_deferred(&[]), BounceDeferredCounts::default());
    }
}
