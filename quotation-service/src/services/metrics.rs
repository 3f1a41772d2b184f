//! Domain counters. Exported with the HTTP metrics at /metrics.

use crate::models::{DocumentKind, QuotationStatus};
use metrics::counter;

pub fn record_document_created(kind: DocumentKind) {
    counter!("documents_created_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_status_update(status: QuotationStatus) {
    counter!("quotation_status_updates_total", "status" => status.as_str()).increment(1);
}

pub fn record_import_rows(imported: usize, skipped: usize) {
    counter!("catalog_import_rows_total", "outcome" => "imported").increment(imported as u64);
    counter!("catalog_import_rows_total", "outcome" => "skipped").increment(skipped as u64);
}
