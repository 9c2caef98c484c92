// Normalization of the time-series store's CSV query output
use crate::domain::telemetry::Sample;
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

// The Flux query API answers in CSV, with or without leading `#`
// annotation rows depending on the requested dialect. Tables are
// separated by blank lines and each starts with its own header row.
struct Header {
    time_index: Option<usize>,
    field_columns: Vec<(usize, String)>,
    error_index: Option<usize>,
}

impl Header {
    fn from_columns(cells: &[String], fields: &[String]) -> Self {
        let time_index = cells.iter().position(|c| c == "_time");
        let field_columns = cells
            .iter()
            .enumerate()
            .filter(|(_, name)| fields.iter().any(|f| f == *name))
            .map(|(index, name)| (index, name.clone()))
            .collect();

        // An error table ("error,reference") has no _time column
        let error_index = if time_index.is_none() {
            cells.iter().position(|c| c == "error")
        } else {
            None
        };

        Self {
            time_index,
            field_columns,
            error_index,
        }
    }
}

/// Parse the pivoted CSV body into samples, in source order. Cells that
/// are empty, unparsable, or non-finite coerce to missing values; rows
/// without a parsable timestamp are dropped. An embedded error table
/// surfaces as a failure.
pub fn parse_series(body: &str, fields: &[String]) -> Result<Vec<Sample>> {
    let mut rows = Vec::new();
    let mut header: Option<Header> = None;

    for raw_line in body.lines() {
        let line = raw_line.trim_end_matches('\r');

        if line.is_empty() || line.starts_with('#') {
            // Table boundary or annotation row: the next row is a header
            header = None;
            continue;
        }

        let cells = split_csv_line(line);
        match &header {
            None => header = Some(Header::from_columns(&cells, fields)),
            Some(current) => {
                if let Some(sample) = parse_row(current, &cells)? {
                    rows.push(sample);
                }
            }
        }
    }

    Ok(rows)
}

fn parse_row(header: &Header, cells: &[String]) -> Result<Option<Sample>> {
    if let Some(error_index) = header.error_index {
        if let Some(message) = cells.get(error_index) {
            if !message.is_empty() {
                bail!("time-series store reported: {}", message);
            }
        }
        return Ok(None);
    }

    let Some(time_index) = header.time_index else {
        return Ok(None);
    };
    let Some(time) = cells
        .get(time_index)
        .and_then(|cell| DateTime::parse_from_rfc3339(cell).ok())
    else {
        return Ok(None);
    };

    let mut values = BTreeMap::new();
    for (index, name) in &header.field_columns {
        if let Some(value) = cells.get(*index).and_then(|cell| cell.parse::<f64>().ok()) {
            if value.is_finite() {
                values.insert(name.clone(), value);
            }
        }
    }

    Ok(Some(Sample::new(time.with_timezone(&Utc), values)))
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    cells.push(current);
    cells
}
