//! CSV export of business records

use crate::{error::SearchResult, types::Business};
use std::path::Path;

/// Placeholder written for absent optional fields
pub const MISSING: &str = "N/A";

/// Byte order mark spreadsheet tools need to detect UTF-8 (Chinese text)
pub const UTF8_BOM: &str = "\u{feff}";

pub const CSV_HEADER: [&str; 9] = [
    "Name",
    "Address",
    "Phone",
    "Rating",
    "Website",
    "Hours",
    "Category",
    "Price Level",
    "Distance",
];

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| MISSING.to_string())
}

fn row(business: &Business) -> Vec<String> {
    vec![
        business.name.clone(),
        business.address.clone(),
        or_missing(business.phone.clone()),
        or_missing(business.rating.map(|r| r.to_string())),
        or_missing(business.website.clone()),
        or_missing(business.hours.as_ref().map(ToString::to_string)),
        business.category.clone(),
        or_missing(business.price_level.map(|p| p.to_string())),
        or_missing(business.distance.clone()),
    ]
}

/// Render businesses as CSV with a header line; every field is quoted
pub fn to_csv(businesses: &[Business]) -> String {
    let mut lines = Vec::with_capacity(businesses.len() + 1);
    lines.push(CSV_HEADER.join(","));

    for business in businesses {
        let fields: Vec<String> = row(business).iter().map(|f| quote(f)).collect();
        lines.push(fields.join(","));
    }

    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

/// Write the CSV rendering of `businesses` to `path`, optionally prefixed
/// with [`UTF8_BOM`]
pub fn write_csv(
    path: impl AsRef<Path>,
    businesses: &[Business],
    with_bom: bool,
) -> SearchResult<()> {
    let mut contents = String::new();
    if with_bom {
        contents.push_str(UTF8_BOM);
    }
    contents.push_str(&to_csv(businesses));
    std::fs::write(path, contents)?;
    Ok(())
}
