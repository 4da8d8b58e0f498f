use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::table::TableRow;

/// Which header feeds the `name` display slot when both exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// A quantity column wins; an exact `name` column is the fallback
    #[default]
    QtyPreferred,
    /// An exact `name` column wins; quantity is the fallback
    NameAuthoritative,
}

/// Options controlling table parsing
#[derive(Debug, Clone, Copy)]
pub struct TableOptions {
    pub delimiter: u8,
    pub name_policy: NamePolicy,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            name_policy: NamePolicy::default(),
        }
    }
}

/// Header text recognized as the marker-number column
const NUMBER_HEADERS: &[&str] = &["number", "s.no.", "s.no", "sno", "no.", "no"];

/// Header written for the `name` slot by [`write_table`]
const NAME_SLOT_HEADER: &str = "Qty";

fn part_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"part\s*no").expect("part number pattern is valid"))
}

/// Column index for each `TableRow` field, inferred from the header row
#[derive(Debug, Default, PartialEq, Eq)]
struct ColumnRoles {
    number: Option<usize>,
    part_number: Option<usize>,
    description: Option<usize>,
    name: Option<usize>,
}

impl ColumnRoles {
    fn infer(headers: &csv::StringRecord, policy: NamePolicy) -> Self {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |matches: &dyn Fn(&str) -> bool| lowered.iter().position(|h| matches(h.as_str()));

        let is_part_number = |h: &str| part_number_pattern().is_match(h);

        let number = find(&|h: &str| {
            NUMBER_HEADERS.contains(&h) || (h.contains("number") && !h.contains("part"))
        });
        let part_number = find(&is_part_number);
        let description = find(&|h: &str| h.contains("description"));
        let quantity = find(&|h: &str| h.contains("qty") || h.contains("quantity"));
        let exact_name = find(&|h: &str| h == "name");

        let name = match policy {
            NamePolicy::QtyPreferred => quantity.or(exact_name),
            NamePolicy::NameAuthoritative => exact_name.or(quantity),
        };

        // Roles not found by keyword fall back to a header literally named
        // after the field.
        let literal = |key: &str| headers.iter().position(|h| h == key);

        Self {
            number: number.or_else(|| literal("number")),
            part_number: part_number.or_else(|| literal("partNumber")),
            description: description.or_else(|| literal("description")),
            name: name.or_else(|| literal("name")),
        }
    }
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}

/// A multi-column record whose only content is its number, e.g. `2,,,`
fn is_placeholder(record: &csv::StringRecord, number: Option<usize>) -> bool {
    record.len() > 1
        && record
            .iter()
            .enumerate()
            .all(|(i, f)| Some(i) == number || f.trim().is_empty())
}

/// Parse a parts table with default options
#[must_use]
pub fn parse_table(text: &str) -> Vec<TableRow> {
    parse_table_with(text, TableOptions::default())
}

/// Parse a parts table.
///
/// The header row is mandatory and determines which column feeds each
/// field. Blank records, records with an empty number and placeholder
/// records (a number and nothing else) are skipped without consuming an id,
/// so ids run 1, 2, 3... over the returned rows. A malformed record ends
/// parsing and the rows read so far are returned.
#[must_use]
pub fn parse_table_with(text: &str, options: TableOptions) -> Vec<TableRow> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            warn!(error = %e, "Unreadable table header");
            return Vec::new();
        }
    };
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Vec::new();
    }

    let roles = ColumnRoles::infer(&headers, options.name_policy);
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, rows = rows.len(), "Malformed table record, stopping");
                break;
            }
        };
        if is_blank(&record) {
            continue;
        }
        if is_placeholder(&record, roles.number) {
            debug!(
                line = record.position().map(|p| p.line()),
                number = %cell(&record, roles.number),
                "Skipping number-only table record"
            );
            continue;
        }

        let number = cell(&record, roles.number);
        if number.is_empty() {
            continue;
        }

        rows.push(TableRow {
            id: rows.len() + 1,
            number,
            part_number: cell(&record, roles.part_number),
            description: cell(&record, roles.description),
            name: cell(&record, roles.name),
        });
    }

    rows
}

/// Parse a parts table from a local file
///
/// # Errors
///
/// Returns the IO error if the file cannot be read.
pub fn parse_table_file(path: &Path, options: TableOptions) -> std::io::Result<Vec<TableRow>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_table_with(&content, options))
}

/// Serialize rows as CSV with recognized headers.
///
/// A row with nothing but a number is written as a placeholder record, which
/// [`parse_table`] skips when reading it back.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_table(rows: &[TableRow]) -> Result<String, csv::Error> {
    write_table_with(rows, b',')
}

/// [`write_table`] with a custom delimiter
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_table_with(rows: &[TableRow], delimiter: u8) -> Result<String, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(["Number", "Part No.", "Description", NAME_SLOT_HEADER])?;
    for row in rows {
        writer.write_record([&row.number, &row.part_number, &row.description, &row.name])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
