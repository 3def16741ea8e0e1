use std::borrow::Cow;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Renders rows as an aligned plain-text table.
///
/// Columns listed as [`Align::Right`] in `alignments` are padded on the left,
/// which keeps currency amounts lined up on their decimal point. Missing
/// alignment entries default to left.
pub fn render_table(headers: &[String], rows: &[Vec<String>], alignments: &[Align]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, alignments));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, &[]));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, alignments));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>], alignments: &[Align]) {
    print!("{}", render_table(headers, rows, alignments));
}

fn format_row(values: &[String], widths: &[usize], alignments: &[Align]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let cell = sanitize_cell(value);
            let padding = " ".repeat(width.saturating_sub(display_width(&cell)));
            match alignments.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{cell}{padding}"),
                Align::Right => format!("{padding}{cell}"),
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
