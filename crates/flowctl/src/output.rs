//! Output helpers for the `flowctl` CLI.

use std::io::{self, Write};

use serde::Serialize;

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print a table with headers and rows to stdout.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_table(&mut handle, headers, rows);
}

/// Write a table with column widths computed from the data. Nothing is
/// written for an empty table.
pub fn write_table<W: Write>(w: &mut W, headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    write_row(w, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|&n| "-".repeat(n)).collect();
    write_row(w, &rule, &widths);
    for row in rows {
        write_row(w, row, &widths);
    }
}

fn write_row<W: Write>(w: &mut W, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            let _ = write!(w, "  ");
        }
        match widths.get(i) {
            Some(&width) if i < last => {
                let pad = width.saturating_sub(cell.chars().count());
                let _ = write!(w, "{}{}", cell, " ".repeat(pad));
            }
            _ => {
                let _ = write!(w, "{}", cell);
            }
        }
    }
    let _ = writeln!(w);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_aligns_columns() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            &["RUN", "STEP"],
            &[
                vec!["run-1".into(), "certificate".into()],
                vec!["r2".into(), "a".into()],
            ],
        );
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            "RUN    STEP\n-----  -----------\nrun-1  certificate\nr2     a\n"
        );
    }

    #[test]
    fn empty_table_prints_nothing() {
        let mut buf = Vec::new();
        write_table(&mut buf, &["A"], &[]);
        assert!(buf.is_empty());
    }
}
