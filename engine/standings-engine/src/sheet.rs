//! Raw spreadsheet rows and header assignment
//!
//! A sheet arrives as rows of nullable string cells. Row 0 is the header; the
//! header and data rows may disagree in length.

use std::collections::HashMap;

/// A single spreadsheet cell
pub type Cell = Option<String>;

/// An ordered row of cells
pub type RawRow = Vec<Cell>;

/// Header row followed by data rows
pub type RawSheet = Vec<RawRow>;

/// Whether every cell of the row is null (an empty row counts as null)
pub fn is_null_row(row: &[Cell]) -> bool {
    row.iter().all(Option::is_none)
}

/// Drop fully-null rows, keeping the order of the rest
pub fn filter_null_rows(sheet: &[RawRow]) -> RawSheet {
    sheet.iter().filter(|row| !is_null_row(row)).cloned().collect()
}

/// Cell at a fixed column, `None` when the row is short or the cell is null
pub fn cell(row: &[Cell], index: usize) -> Option<&str> {
    row.get(index).and_then(|c| c.as_deref())
}

/// Cell at a fixed column, additionally treating the empty string as absent
pub fn non_blank(row: &[Cell], index: usize) -> Option<&str> {
    cell(row, index).filter(|value| !value.is_empty())
}

/// Loose numeric coercion of a cell.
///
/// Missing cells are NaN, blank cells are 0, anything else must parse as a
/// float or becomes NaN.
pub fn loose_number(value: Option<&str>) -> f64 {
    match value {
        None => f64::NAN,
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
    }
}

/// A data row with header-derived field names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, Cell>,
}

impl Record {
    /// Value of a named field; `None` when the field is absent or null
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|c| c.as_deref())
    }

    /// Whether the header produced this field at all
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of named fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no named fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Cell)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

/// Zip header cell `i` with data cell `i` for every row.
///
/// Header cells beyond a row's length map to null; data cells beyond the
/// header are dropped; null header cells produce no field.
pub fn assign_header(header: &[Cell], rows: &[RawRow]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    name.as_ref().map(|name| (name.clone(), row.get(i).cloned().flatten()))
                })
                .collect()
        })
        .collect()
}

/// A header-assigned sheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Non-null header names in sheet order
    pub columns: Vec<String>,
    /// One record per data row
    pub records: Vec<Record>,
}

impl Table {
    /// Build a table from a sheet whose first row is the header
    pub fn from_sheet(sheet: &[RawRow]) -> Self {
        let Some((header, rows)) = sheet.split_first() else {
            return Self::default();
        };

        Self {
            columns: header.iter().flatten().cloned().collect(),
            records: assign_header(header, rows),
        }
    }

    /// Whether the header names the given column
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Data rows of a sheet, without its header
pub fn data_rows(sheet: &[RawRow]) -> &[RawRow] {
    sheet.get(1..).unwrap_or(&[])
}

#[cfg(test)]
pub(crate) fn sheet_from(rows: &[&[Option<&str>]]) -> RawSheet {
    rows.iter().map(|row| row.iter().map(|c| c.map(str::to_string)).collect()).collect()
}
