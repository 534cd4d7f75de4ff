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

//! Horizontal text bar charts.

use std::io::{self, Write};

const BAR_CHAR: char = '█';

/// Length of a bar for `count`, scaled so that `max` fills `width`.
/// Non-zero counts always get at least one character.
fn bar_len(count: usize, max: usize, width: usize) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    ((count * width).div_ceil(max)).clamp(1, width.max(1))
}

/// Render `entries` as one labelled bar per line, in the given order
pub fn render_bar_chart<W: Write>(
    out: &mut W,
    title: &str,
    entries: &[(&str, usize)],
    width: usize,
) -> io::Result<()> {
    writeln!(out, "--- {title} ---")?;
    if entries.is_empty() {
        writeln!(out, "(no data)")?;
        return writeln!(out);
    }

    let max = entries.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let label_width = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    for (label, count) in entries {
        let bar: String = std::iter::repeat_n(BAR_CHAR, bar_len(*count, max, width)).collect();
        writeln!(out, "{label:<label_width$} | {bar} {count}")?;
    }
    writeln!(out)
}
