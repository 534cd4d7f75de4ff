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

//! Analyses over the parsed record sequence.
//!
//! Every analysis is a plain function taking the whole slice of records and
//! returning a fresh value. They re-scan the details text with their own
//! patterns instead of relying on the annotations set by the parser.

pub mod auth;
pub mod connections;
pub mod delivery;
pub mod frozen;
pub mod spam;

use crate::core::{FrequencyCounter, TimeWindow};
use crate::parser::line::LogRecord;
use fancy_regex::Regex;
use std::sync::LazyLock;

pub use auth::auth_failures;
pub use connections::{connection_refusals, ip_failure_patterns, ip_send_volume};
pub use delivery::{bounces_deferred, tls_usage, BounceDeferredCounts, TlsUsage};
pub use frozen::{frozen_by_hour, frozen_messages};
pub use spam::{high_spam_scores, spam_senders, ScoredRecord};

static BRACKETED_IP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{1,3}(?:\.\d{1,3}){3})\]").expect("valid regex literal")
});

/// First bracketed dotted-quad in `details`, e.g. `H=mx [192.0.2.1]`
pub fn bracketed_ip(details: &str) -> Option<&str> {
    BRACKETED_IP
        .captures(details)
        .ok()
        .flatten()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub(crate) fn is_match(regex: &Regex, text: &str) -> bool {
    regex.is_match(text).unwrap_or(false)
}

/// Selectable analyses, in the order they are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Analysis {
    AuthFailures,
    ConnectionRefusals,
    BouncesDeferred,
    TlsUsage,
    SpamPatterns,
    FrozenMessages,
    SpamScores,
    IpAnalysis,
    IpSendCount,
}

impl Analysis {
    pub const ALL: [Self; 9] = [
        Self::AuthFailures,
        Self::ConnectionRefusals,
        Self::BouncesDeferred,
        Self::TlsUsage,
        Self::SpamPatterns,
        Self::FrozenMessages,
        Self::SpamScores,
        Self::IpAnalysis,
        Self::IpSendCount,
    ];

    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthFailures => "authentication failures",
            Self::ConnectionRefusals => "refused connections",
            Self::BouncesDeferred => "bounced and deferred messages",
            Self::TlsUsage => "TLS usage",
            Self::SpamPatterns => "spam sender patterns",
            Self::FrozenMessages => "frozen messages",
            Self::SpamScores => "spam scores",
            Self::IpAnalysis => "IPs related to failures and frozen messages",
            Self::IpSendCount => "sends per IP",
        }
    }
}

/// Semantic parameters of the analyses that take any
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub spam_score_threshold: f64,
    pub send_window: TimeWindow,
    pub min_sends: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            spam_score_threshold: spam::DEFAULT_SPAM_SCORE_THRESHOLD,
            send_window: TimeWindow::unbounded(),
            min_sends: connections::DEFAULT_MIN_SENDS,
        }
    }
}

/// Result of one analysis, handed to the reporter
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome<'a> {
    AuthFailures(Vec<&'a LogRecord>),
    ConnectionRefusals(FrequencyCounter<&'a str>),
    BouncesDeferred(BounceDeferredCounts),
    TlsUsage(TlsUsage),
    SpamPatterns(FrequencyCounter<&'a str>),
    FrozenMessages {
        messages: Vec<&'a LogRecord>,
        by_hour: FrequencyCounter<String>,
    },
    SpamScores(Vec<ScoredRecord<'a>>),
    IpAnalysis(FrequencyCounter<&'a str>),
    IpSendCount(FrequencyCounter<&'a str>),
}

/// Run a single analysis over all records
pub fn run<'a>(
    analysis: Analysis,
    records: &'a [LogRecord],
    params: &AnalysisParams,
) -> AnalysisOutcome<'a> {
    tracing::info!("Analyzing {}...", analysis.description());
    let outcome = match analysis {
        Analysis::AuthFailures => AnalysisOutcome::AuthFailures(auth_failures(records)),
        Analysis::ConnectionRefusals => {
            AnalysisOutcome::ConnectionRefusals(connection_refusals(records))
        }
        Analysis::BouncesDeferred => AnalysisOutcome::BouncesDeferred(bounces_deferred(records)),
        Analysis::TlsUsage => AnalysisOutcome::TlsUsage(tls_usage(records)),
        Analysis::SpamPatterns => AnalysisOutcome::SpamPatterns(spam_senders(records)),
        Analysis::FrozenMessages => {
            let messages = frozen_messages(records);
            let by_hour = frozen_by_hour(&messages);
            AnalysisOutcome::FrozenMessages { messages, by_hour }
        }
        Analysis::SpamScores => {
            AnalysisOutcome::SpamScores(high_spam_scores(records, params.spam_score_threshold))
        }
        Analysis::IpAnalysis => AnalysisOutcome::IpAnalysis(ip_failure_patterns(records)),
        Analysis::IpSendCount => AnalysisOutcome::IpSendCount(ip_send_volume(
            records,
            params.send_window,
            params.min_sends,
        )),
    };
    tracing::debug!("{} produced {} entries", analysis.description(), outcome.len());
    outcome
}

impl AnalysisOutcome<'_> {
    /// Number of listed records or counted keys
    pub fn len(&self) -> usize {
        match self {
            Self::AuthFailures(records) => records.len(),
            Self::SpamScores(scored) => scored.len(),
            Self::FrozenMessages { messages, .. } => messages.len(),
            Self::ConnectionRefusals(counter)
            | Self::SpamPatterns(counter)
            | Self::IpAnalysis(counter)
            | Self::IpSendCount(counter) => counter.len(),
            Self::BouncesDeferred(_) | Self::TlsUsage(_) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
