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

//! Dump parsed mainlog records as JSON lines.

use anyhow::{Context, Result};
use clap::Parser;
use eximscope::core::ParsedLog;
use eximscope::parser::line::LogRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eximscope-export")]
#[command(author = "Daniel Freiermuth")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "Export parsed Exim mainlog records as JSON lines", long_about = None)]
struct Args {
    /// Path to the exim_mainlog file
    #[arg(value_name = "LOGFILE")]
    logfile: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn write_records<W: Write>(out: &mut W, records: &[LogRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    eximscope::init_logging(args.debug);

    let parsed = ParsedLog::load(&args.logfile)
        .with_context(|| format!("Failed to load {}", args.logfile.display()))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_records(&mut BufWriter::new(file), &parsed.records)?;
            tracing::info!("Wrote {} records to {}", parsed.records.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            write_records(&mut BufWriter::new(stdout.lock()), &parsed.records)?;
        }
    }

    tracing::info!(
        "Exported {} of {} lines ({} unparsed)",
        parsed.records.len(),
        parsed.total_lines(),
        parsed.unparsed.len()
    );
    Ok(())
}
