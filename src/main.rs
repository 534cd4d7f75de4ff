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

use anyhow::{Context, Result};
use clap::Parser;
use eximscope::analysis::{self, Analysis, AnalysisParams};
use eximscope::config::AnalyzerConfig;
use eximscope::core::{parse_date_arg, ParsedLog, TimeWindow};
use eximscope::report::{write_report, ReportOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[cfg(feature = "ram-profiling")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Parser, Debug)]
#[command(name = "eximscope")]
#[command(author = "Daniel Freiermuth")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "Security-focused analyzer for Exim mainlog files", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Args {
    /// Path to the exim_mainlog file
    #[arg(value_name = "LOGFILE", required_unless_present = "write_default_config")]
    logfile: Option<PathBuf>,

    /// Report authentication failures
    #[arg(long)]
    auth_failures: bool,

    /// Report refused connections per IP
    #[arg(long)]
    connection_refusals: bool,

    /// Report bounced and deferred messages
    #[arg(long)]
    bounces_deferred: bool,

    /// Report TLS usage
    #[arg(long)]
    tls_usage: bool,

    /// Report senders by number of sent messages
    #[arg(long)]
    spam_patterns: bool,

    /// Report frozen messages
    #[arg(long)]
    frozen_messages: bool,

    /// Report messages with a high SpamAssassin score
    #[arg(long)]
    spam_scores: bool,

    /// Report IPs associated with failures and frozen messages
    #[arg(long)]
    ip_analysis: bool,

    /// Report the number of SMTP sends per IP
    #[arg(long)]
    ip_send_count: bool,

    /// Run every analysis
    #[arg(long)]
    all: bool,

    /// Start of the send count window (YYYY-MM-DD or "YYYY-MM-DD HH:MM:SS")
    #[arg(long, value_parser = parse_date_arg)]
    start_date: Option<chrono::NaiveDateTime>,

    /// End of the send count window, inclusive (a bare date means midnight)
    #[arg(long, value_parser = parse_date_arg)]
    end_date: Option<chrono::NaiveDateTime>,

    /// Minimum sends per IP for the send count report [default: 1000]
    #[arg(long)]
    min_sends: Option<usize>,

    /// Display threshold for refused connection and IP reports [default: 10]
    #[arg(long)]
    threshold: Option<usize>,

    /// Spam scores above this value are reported [default: 5.0]
    #[arg(long)]
    spam_threshold: Option<f64>,

    /// Do not draw bar charts
    #[arg(long)]
    no_charts: bool,

    /// Use this config file instead of the one in the user config directory
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the default config to the user config directory and exit
    #[arg(long)]
    write_default_config: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Path for the DHAT heap profiling output (only used when built with --features ram-profiling)
    #[cfg(feature = "ram-profiling")]
    #[arg(
        long = "profile-output",
        value_name = "PROFILE_FILE",
        default_value = "dhat-heap.json"
    )]
    profile_output: PathBuf,
}

impl Args {
    fn selected_analyses(&self) -> Vec<Analysis> {
        if self.all {
            return Analysis::ALL.to_vec();
        }
        let flags = [
            (self.auth_failures, Analysis::AuthFailures),
            (self.connection_refusals, Analysis::ConnectionRefusals),
            (self.bounces_deferred, Analysis::BouncesDeferred),
            (self.tls_usage, Analysis::TlsUsage),
            (self.spam_patterns, Analysis::SpamPatterns),
            (self.frozen_messages, Analysis::FrozenMessages),
            (self.spam_scores, Analysis::SpamScores),
            (self.ip_analysis, Analysis::IpAnalysis),
            (self.ip_send_count, Analysis::IpSendCount),
        ];
        flags
            .into_iter()
            .filter_map(|(enabled, analysis)| enabled.then_some(analysis))
            .collect()
    }

    /// Config file values, overridden by explicit flags
    fn effective_config(&self) -> Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::load_from(path)?,
            None => AnalyzerConfig::load(),
        };
        if let Some(min_sends) = self.min_sends {
            config.min_sends = min_sends;
        }
        if let Some(threshold) = self.threshold {
            config.refusal_threshold = threshold;
            config.ip_threshold = threshold;
        }
        if let Some(spam_threshold) = self.spam_threshold {
            config.spam_score_threshold = spam_threshold;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    eximscope::init_logging(args.debug);

    #[cfg(feature = "ram-profiling")]
    let _profiler = {
        tracing::info!("RAM profiling enabled, output: {:?}", args.profile_output);
        dhat::Profiler::builder()
            .file_name(args.profile_output.clone())
            .build()
    };

    #[cfg(feature = "cpu-profiling")]
    {
        tracing::info!("CPU profiling enabled with Tracy - run Tracy profiler to connect");
    }

    tracing::info!(
        "eximscope starting up (version {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    if args.write_default_config {
        let path = AnalyzerConfig::default()
            .save()
            .context("Failed to write default config")?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let config = args.effective_config()?;
    let Some(logfile) = args.logfile.as_deref() else {
        anyhow::bail!("No log file given");
    };

    let analyses = args.selected_analyses();
    if analyses.is_empty() {
        tracing::warn!("No analysis selected, only parsing. Use --all or one of the report flags");
    }

    let parsed = ParsedLog::load(logfile)
        .with_context(|| format!("Failed to load {}", logfile.display()))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "Total parsed entries: {}\n", parsed.records.len())?;

    let params = AnalysisParams {
        spam_score_threshold: config.spam_score_threshold,
        send_window: TimeWindow::new(args.start_date, args.end_date),
        min_sends: config.min_sends,
    };
    let options = ReportOptions::from_config(&config, !args.no_charts);

    for analysis in analyses {
        let outcome = analysis::run(analysis, &parsed.records, &params);
        write_report(&mut out, &outcome, &options)
            .with_context(|| format!("Failed to write {} report", analysis.description()))?;
    }
    out.flush()?;

    tracing::info!("Analysis complete");
    Ok(())
}
