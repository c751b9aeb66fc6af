use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Cell width in chars, not bytes. Wide glyphs such as Hangul still take
/// two terminal columns, so columns after them can drift.
fn width(cell: &str) -> usize {
    cell.chars().count()
}

fn pad(cell: &str, target: usize) -> String {
    let mut padded = cell.to_string();
    padded.extend(std::iter::repeat(' ').take(target.saturating_sub(width(cell))));
    padded
}

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(width(cell));
            }
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i]))
        .collect();
    lines.push(header_row.join("  ").trim_end().to_string());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    lines.push(sep.join("  "));

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(cell, widths.get(i).copied().unwrap_or(0)))
            .collect();
        lines.push(cells.join("  ").trim_end().to_string());
    }

    lines.join("\n")
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", render_table(headers, rows));
}
