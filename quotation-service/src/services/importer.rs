//! Product file import.
//!
//! Accepts comma- or tab-separated files with a header row. The delimiter is
//! taken from the header: comma when it holds more commas than tabs, tab
//! otherwise. Rows that cannot be turned into a [`Product`] are skipped and
//! reported with their 1-based line number; the header is line 1.

use crate::models::Product;
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use thiserror::Error;

pub const REQUIRED_HEADERS: [&str; 7] = [
    "title",
    "size",
    "variant sku",
    "cost price",
    "variant price",
    "gst",
    "image src",
];

const DEFAULT_SIZE: &str = "Standard";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File must contain a header row and at least one data row.")]
    TooShort,

    #[error("Missing expected headers: {missing}. Found in file: {found}.")]
    MissingHeaders { missing: String, found: String },

    #[error("Failed to read file: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub products: Vec<Product>,
    pub skipped: Vec<SkippedRow>,
}

struct Columns {
    title: usize,
    size: usize,
    sku: usize,
    cost_price: usize,
    variant_price: usize,
    gst: usize,
    image_src: usize,
}

impl Columns {
    fn from_headers(headers: &[String]) -> Result<Self, ImportError> {
        let missing: Vec<&str> = REQUIRED_HEADERS
            .iter()
            .copied()
            .filter(|h| !headers.iter().any(|found| found == h))
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::MissingHeaders {
                missing: missing.join(", "),
                found: headers.join(", "),
            });
        }

        let index = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
        Ok(Self {
            title: index("title"),
            size: index("size"),
            sku: index("variant sku"),
            cost_price: index("cost price"),
            variant_price: index("variant price"),
            gst: index("gst"),
            image_src: index("image src"),
        })
    }

    fn required_len(&self) -> usize {
        [
            self.title,
            self.sku,
            self.cost_price,
            self.variant_price,
            self.gst,
            self.image_src,
        ]
        .into_iter()
        .max()
        .unwrap_or_default()
            + 1
    }
}

fn detect_delimiter(header_line: &str) -> u8 {
    let commas = header_line.matches(',').count();
    let tabs = header_line.matches('\t').count();
    if commas > tabs { b',' } else { b'\t' }
}

fn normalize_header(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_lowercase()
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    raw.trim().parse::<Decimal>().ok()
}

/// 1-based line of the record starting at `byte`. The reader reports the
/// offset before any blank lines it skipped, so those are stepped over first.
fn line_number(content: &str, byte: u64) -> u64 {
    let bytes = content.as_bytes();
    let start = usize::try_from(byte).unwrap_or(bytes.len()).min(bytes.len());
    let blank = bytes[start..]
        .iter()
        .take_while(|&&b| b == b'\r' || b == b'\n')
        .count();
    let newlines = bytes[..start + blank].iter().filter(|&&b| b == b'\n').count();
    newlines as u64 + 1
}

/// Parse a product file into products plus a list of skipped rows.
pub fn parse_products(content: &str) -> Result<ImportReport, ImportError> {
    let content = content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .trim_end_matches(&['\r', '\n'][..]);

    let mut lines = content.lines();
    let header_line = lines.next().unwrap_or_default();
    if lines.next().is_none() {
        return Err(ImportError::TooShort);
    }

    let delimiter = detect_delimiter(header_line);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .quoting(delimiter == b',')
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header_record = records.next().ok_or(ImportError::TooShort)??;
    let headers: Vec<String> = header_record.iter().map(normalize_header).collect();
    let columns = Columns::from_headers(&headers)?;

    let mut report = ImportReport::default();
    for record in records {
        let record = record?;
        let line = record
            .position()
            .map(|p| line_number(content, p.byte()))
            .unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }

        match product_from_record(&record, &columns) {
            Ok(product) => report.products.push(product),
            Err(reason) => {
                tracing::warn!(line, reason = %reason, "Skipping product row");
                report.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    Ok(report)
}

fn product_from_record(record: &StringRecord, columns: &Columns) -> Result<Product, String> {
    if record.len() < columns.required_len() {
        return Err(format!(
            "expected at least {} columns, got {}",
            columns.required_len(),
            record.len()
        ));
    }

    let field = |index: usize| record.get(index).unwrap_or_default();
    let title = field(columns.title);
    let sku = field(columns.sku);
    if title.is_empty() || sku.is_empty() {
        return Err("missing title or SKU".to_string());
    }

    let (Some(cost_price), Some(variant_price), Some(gst)) = (
        parse_amount(field(columns.cost_price)),
        parse_amount(field(columns.variant_price)),
        parse_amount(field(columns.gst)),
    ) else {
        return Err(format!(
            "invalid numeric value(s) for '{}': cost price '{}', variant price '{}', GST '{}'",
            title,
            field(columns.cost_price),
            field(columns.variant_price),
            field(columns.gst)
        ));
    };

    if cost_price.is_sign_negative() || variant_price.is_sign_negative() || gst.is_sign_negative()
    {
        return Err(format!("negative price or GST for '{}'", title));
    }

    let size = field(columns.size);
    Ok(Product {
        id: sku.to_string(),
        title: title.to_string(),
        size: if size.is_empty() { DEFAULT_SIZE } else { size }.to_string(),
        sku: sku.to_string(),
        cost_price,
        variant_price,
        gst,
        image_src: field(columns.image_src).to_string(),
    })
}
