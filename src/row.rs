use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, instrument, trace};

use crate::dom::{Document, NodeId};

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y, %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%B %d, %Y %I:%M %p",
];

// What a browser prints for a date by default, minus the zone name.
const BROWSER_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// One row of the live table. `element` is only meaningful until the next
/// population of the table body.
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    pub element: NodeId,
    pub name: String,
    pub id: u64,
    pub status: String,
    pub assignee_a: String,
    pub assignee_b: String,
    pub timestamp: DateTime<Utc>,
}

/// Rows in DOM order plus how many of them belong to the current user.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub rows: Vec<RowRecord>,
    pub yours_a: usize,
    pub yours_b: usize,
}

#[instrument(skip(doc), level = "debug")]
pub fn extract(doc: &Document, body: NodeId, username: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for &row in doc.children(body) {
        let cells = doc.children(row);
        let cell_text = |idx: usize| -> String {
            match cells.get(idx) {
                Some(&cell) => doc.inner_text(cell),
                None => {
                    debug!("Row {row:?} has no cell {idx}");
                    String::new()
                }
            }
        };

        let (name, id) = split_name_and_id(&cell_text(0));
        let assignee_a = cell_text(2);
        let assignee_b = cell_text(3);

        // A player can't be A and B for the same cell.
        if !username.is_empty() && assignee_a == username {
            extraction.yours_a += 1;
        } else if !username.is_empty() && assignee_b == username {
            extraction.yours_b += 1;
        }

        let record = RowRecord {
            element: row,
            name,
            id,
            status: cell_text(1),
            assignee_a,
            assignee_b,
            timestamp: parse_timestamp(&cell_text(4)),
        };
        trace!("Extracted {record:?}");
        extraction.rows.push(record);
    }

    debug!(
        "Extracted {} rows, yours A: {}, yours B: {}",
        extraction.rows.len(),
        extraction.yours_a,
        extraction.yours_b
    );
    extraction
}

/// Splits `"<name> (<id>)"`. A missing or non-numeric id reads as 0.
pub fn split_name_and_id(text: &str) -> (String, u64) {
    match text.split_once(" (") {
        Some((name, rest)) => {
            let digits = rest.split(')').next().unwrap_or_default();
            let id = digits.trim().parse().unwrap_or_else(|_| {
                debug!("Malformed id in \"{text}\"");
                0
            });
            (name.to_string(), id)
        }
        None => {
            debug!("No id in \"{text}\"");
            (text.to_string(), 0)
        }
    }
}

/// Parses the host's locale formatted time. Unparseable text yields the
/// minimum timestamp so the row still sorts.
pub fn parse_timestamp(text: &str) -> DateTime<Utc> {
    let text = text.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return t.with_timezone(&Utc);
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(text) {
        return t.with_timezone(&Utc);
    }
    let without_zone_name = text.split_once(" (").map_or(text, |(head, _)| head);
    if let Ok(t) = DateTime::parse_from_str(without_zone_name, BROWSER_FORMAT) {
        return t.with_timezone(&Utc);
    }
    for format in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, format) {
            return t.and_utc();
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        && let Some(t) = d.and_hms_opt(0, 0, 0)
    {
        return t.and_utc();
    }
    debug!("Malformed timestamp \"{text}\"");
    DateTime::<Utc>::MIN_UTC
}
