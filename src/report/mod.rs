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

//! Console reports for analysis outcomes.
//!
//! Presentation thresholds are applied here and only here: the analyses
//! hand over complete results and the report decides what to show.

pub mod chart;

use crate::analysis::{AnalysisOutcome, ScoredRecord};
use crate::config::AnalyzerConfig;
use crate::core::FrequencyCounter;
use crate::parser::line::LogRecord;
use chart::render_bar_chart;
use std::io::{self, Write};

/// Presentation settings for a report run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub refusal_threshold: usize,
    pub spam_sender_threshold: usize,
    pub ip_threshold: usize,
    pub min_sends: usize,
    pub charts: bool,
    pub chart_top_n: usize,
    pub chart_width: usize,
}

impl ReportOptions {
    pub const fn from_config(config: &AnalyzerConfig, charts: bool) -> Self {
        Self {
            refusal_threshold: config.refusal_threshold,
            spam_sender_threshold: config.spam_sender_threshold,
            ip_threshold: config.ip_threshold,
            min_sends: config.min_sends,
            charts,
            chart_top_n: config.chart_top_n,
            chart_width: config.chart_width,
        }
    }
}

fn write_record_line<W: Write>(out: &mut W, record: &LogRecord) -> io::Result<()> {
    writeln!(
        out,
        "[{}] ID: {} - {} - Details: {}",
        record.timestamp(),
        record.message_id(),
        record.participant_address(),
        record.details()
    )
}

fn write_counter<W: Write>(
    out: &mut W,
    counter: &FrequencyCounter<&str>,
    threshold: usize,
    describe: impl Fn(&str, usize) -> String,
) -> io::Result<()> {
    for (key, count) in counter.most_common() {
        if count >= threshold {
            writeln!(out, "{}", describe(*key, count))?;
        }
    }
    Ok(())
}

fn chart_top<W: Write>(
    out: &mut W,
    title: &str,
    counter: &FrequencyCounter<&str>,
    options: &ReportOptions,
) -> io::Result<()> {
    let entries: Vec<(&str, usize)> = counter
        .top(options.chart_top_n)
        .into_iter()
        .map(|(k, v)| (*k, v))
        .collect();
    render_bar_chart(out, title, &entries, options.chart_width)
}

/// Write the report section for one analysis outcome
pub fn write_report<W: Write>(
    out: &mut W,
    outcome: &AnalysisOutcome<'_>,
    options: &ReportOptions,
) -> io::Result<()> {
    match outcome {
        AnalysisOutcome::AuthFailures(records) => {
            writeln!(out, "=== Authentication Failures ===")?;
            for record in records {
                write_record_line(out, record)?;
            }
            writeln!(out, "Total authentication failures: {}\n", records.len())?;
        }
        AnalysisOutcome::ConnectionRefusals(counter) => {
            writeln!(out, "=== Refused Connections ===")?;
            write_counter(out, counter, options.refusal_threshold, |ip, count| {
                format!("IP: {ip} - {count} refused connections")
            })?;
            writeln!(out)?;
            if options.charts {
                chart_top(out, "Top IPs by refused connections", counter, options)?;
            }
        }
        AnalysisOutcome::BouncesDeferred(counts) => {
            writeln!(out, "=== Bounced and Deferred Messages ===")?;
            writeln!(out, "Bounced messages (no sender): {}", counts.bounces)?;
            writeln!(out, "Deferred messages: {}\n", counts.deferred)?;
        }
        AnalysisOutcome::TlsUsage(usage) => {
            writeln!(out, "=== TLS Usage ===")?;
            writeln!(out, "Messages with TLS: {}", usage.enabled)?;
            writeln!(out, "Messages without TLS: {}\n", usage.disabled)?;
        }
        AnalysisOutcome::SpamPatterns(counter) => {
            writeln!(out, "=== Spam Patterns ===")?;
            write_counter(out, counter, options.spam_sender_threshold, |sender, count| {
                format!("Sender: {sender} - sent {count} messages")
            })?;
            writeln!(out)?;
            if options.charts {
                chart_top(out, "Top senders by sent messages", counter, options)?;
            }
        }
        AnalysisOutcome::FrozenMessages { messages, by_hour } => {
            writeln!(out, "=== Frozen Messages ===")?;
            for record in messages {
                write_record_line(out, record)?;
            }
            writeln!(out, "Total frozen messages: {}\n", messages.len())?;
            if options.charts {
                let entries: Vec<(&str, usize)> =
                    by_hour.iter().map(|(hour, count)| (hour.as_str(), count)).collect();
                render_bar_chart(out, "Frozen messages per hour", &entries, options.chart_width)?;
            }
        }
        AnalysisOutcome::SpamScores(scored) => {
            writeln!(out, "=== Messages With High Spam Scores ===")?;
            for ScoredRecord { record, score } in scored {
                writeln!(
                    out,
                    "[{}] ID: {} - {} - Score: {score:.1} - Details: {}",
                    record.timestamp(),
                    record.message_id(),
                    record.participant_address(),
                    record.details()
                )?;
            }
            writeln!(out, "Total messages with high spam score: {}\n", scored.len())?;
        }
        AnalysisOutcome::IpAnalysis(counter) => {
            writeln!(out, "=== IPs Related to Failures and Frozen Messages ===")?;
            write_counter(out, counter, options.ip_threshold, |ip, count| {
                format!("IP: {ip} - seen in {count} log lines")
            })?;
            writeln!(out)?;
        }
        AnalysisOutcome::IpSendCount(counter) => {
            writeln!(out, "=== Sends per IP ===")?;
            write_counter(out, counter, options.min_sends, |ip, count| {
                format!("IP: {ip} - sends: {count}")
            })?;
            writeln!(
                out,
                "Total IPs with at least {} sends: {}\n",
                options.min_sends,
                counter.len()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::{records, MIXED_LOG};
    use crate::analysis::{run, Analysis, AnalysisParams};

    fn render(outcome: &AnalysisOutcome<'_>, options: &ReportOptions) -> String {
        let mut out = Vec::new();
        write_report(&mut out, outcome, options).expect("write to vec");
        String::from_utf8(out).expect("utf8 output")
    }

    fn options(charts: bool) -> ReportOptions {
        ReportOptions {
            refusal_threshold: 1,
            spam_sender_threshold: 1,
            ip_threshold: 2,
            min_sends: 1,
            charts,
            chart_top_n: 10,
            chart_width: 10,
        }
    }

    #[test]
    fn test_auth_failure_report() {
        let records = records(MIXED_LOG);
        let outcome = run(Analysis::AuthFailures, &records, &AnalysisParams::default());
        let text = render(&outcome, &options(false));
        assert!(text.starts_with("=== Authentication Failures ==="));
        assert!(text.contains("ID: HHH-8 - trent@example.com"));
        assert!(text.contains("Total authentication failures: 1"));
    }

    #[test]
    fn test_presentation_threshold_hides_small_counts() {
        let records = records(MIXED_LOG);
        let outcome = run(Analysis::IpAnalysis, &records, &AnalysisParams::default());
        let text = render(&outcome, &options(false));
        assert!(text.contains("IP: 198.51.100.9 - seen in 2 log lines"));
        // Counted by the analysis but below the display threshold of 2
        assert!(!text.contains("203.0.113.5"));
    }

    #[test]
    fn test_charts_are_optional() {
        let records = records(MIXED_LOG);
        let outcome = run(Analysis::SpamPatterns, &records, &AnalysisParams::default());

        let with_chart = render(&outcome, &options(true));
        assert!(with_chart.contains("--- Top senders by sent messages ---"));
        assert!(with_chart.contains("Sender: bob@example.org - sent 2 messages"));

        let without_chart = render(&outcome, &options(false));
        assert!(!without_chart.contains("---"));
    }

    #[test]
    fn test_frozen_report_with_hour_chart() {
        let records = records(MIXED_LOG);
        let outcome = run(Analysis::FrozenMessages, &records, &AnalysisParams::default());
        let text = render(&outcome, &options(true));
        assert!(text.contains("Total frozen messages: 1"));
        assert!(text.contains("2024-01-10 08:00 | "));
    }

    #[test]
    fn test_pair_reports() {
        let records = records(MIXED_LOG);
        let params = AnalysisParams::default();

        let text = render(&run(Analysis::BouncesDeferred, &records, &params), &options(false));
        assert!(text.contains("Bounced messages (no sender): 1"));
        assert!(text.contains("Deferred messages: 1"));

        let text = render(&run(Analysis::TlsUsage, &records, &params), &options(false));
        assert!(text.contains("Messages with TLS: 2"));
        assert!(text.contains("Messages without TLS: 8"));
    }

    #[test]
    fn test_spam_score_report_shows_score() {
        let records = records(MIXED_LOG);
        let outcome = run(Analysis::SpamScores, &records, &AnalysisParams::default());
        let text = render(&outcome, &options(false));
        assert!(text.contains("Score: 6.2"));
        assert!(text.contains("Total messages with high spam score: 1"));
    }

    #[test]
    fn test_spam_score_report_prints_selected_score() {
        let records = records(&[
            "2024-01-10 08:00:00 mx A-1: <= a@example.com X-Spam-Flag: NO score=1.0 SpamAssassin score=6.2",
        ]);
        let outcome = run(Analysis::SpamScores, &records, &AnalysisParams::default());
        assert_eq!(outcome.len(), 1);
        let text = render(&outcome, &options(false));
        assert!(text.contains("Score: 6.2 - Details:"));
        assert!(!text.contains("Score: 1.0"));
    }
}
