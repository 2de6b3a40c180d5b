// Inventory parser - Tolerant spreadsheet (CSV) reader
use crate::domain::plot::{InventoryRecord, PlotStatus};

const ID_TERMS: &[&str] = &["plot", "id", "number", "no"];
const STATUS_TERMS: &[&str] = &["status", "state"];
const PRICE_TERMS: &[&str] = &["price", "cost", "amount"];
const SQFT_TERMS: &[&str] = &["sqft", "area", "size"];
const CUSTOMER_TERMS: &[&str] = &["customer", "buyer", "name"];

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    id: Option<usize>,
    status: Option<usize>,
    price: Option<usize>,
    sq_ft: Option<usize>,
    customer: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let headers: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |terms: &[&str]| {
            headers
                .iter()
                .position(|h| terms.iter().any(|t| h.contains(t)))
        };

        Self {
            id: find(ID_TERMS),
            status: find(STATUS_TERMS),
            price: find(PRICE_TERMS),
            sq_ft: find(SQFT_TERMS),
            customer: find(CUSTOMER_TERMS),
        }
    }
}

/// Parses inventory rows out of CSV text.
///
/// Columns are located by loose header matching, unknown columns are ignored
/// and malformed rows are skipped. Never fails; unusable input yields an
/// empty list.
pub fn parse(text: &str) -> Vec<InventoryRecord> {
    let mut rows = split_records(text).into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };

    let columns = ColumnMap::from_header(&header);
    let Some(id_idx) = columns.id else {
        tracing::debug!("Inventory header has no plot id column: {:?}", header);
        return Vec::new();
    };

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }

        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(String::as_str);

        let plot_id = match cell(Some(id_idx)) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let status = PlotStatus::classify(cell(columns.status).unwrap_or_default());

        records.push(InventoryRecord {
            plot_id,
            status,
            price: cell(columns.price).and_then(parse_number),
            sq_ft: cell(columns.sq_ft).and_then(parse_number),
            customer_name: cell(columns.customer)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        });
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} inventory rows without a plot id", skipped);
    }

    records
}

/// Reads the leading number of a cell, so "1200 sqft" gives 1200. Currency
/// symbols in front and thousands separators are ignored.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(['$', '₹', '€', '£'])
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let prefix = &cleaned[..numeric_prefix_len(&cleaned)];
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte length of the longest `[+-]digits[.digits][e[+-]digits]` prefix.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if has_digits || frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

/// Splits CSV text into trimmed fields per record. Double-quoted fields may
/// contain commas, doubled quotes and line breaks.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            // A quote only opens a field; anywhere else it is literal.
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' => fields.push(std::mem::take(&mut field).trim().to_string()),
            '\r' => {}
            '\n' => {
                fields.push(std::mem::take(&mut field).trim().to_string());
                records.push(std::mem::take(&mut fields));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field.trim().to_string());
        records.push(fields);
    }

    records
}
