use kiabi_po_to_report::{
    DocumentExtraction, ExtractOptions, PoReport, build_report, extract_pdf_bytes,
};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub report: PoReport,
    /// Raw extracted observations across the whole batch, before pivoting.
    pub row_count: usize,
    /// Uploaded file names that failed to parse and were skipped.
    pub failed_files: Vec<String>,
}

impl BatchOutcome {
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.row_count > 0 && !self.report.pivots.is_empty()
    }
}

/// Extract every uploaded PDF and fold the results into one report.
/// Per-file parse failures are logged and the batch continues with zero
/// rows for that file; a malformed PDF and an empty PO land on the same
/// empty-result path.
pub fn process_uploads(files: &[(String, Vec<u8>)], options: &ExtractOptions) -> BatchOutcome {
    let mut extractions = Vec::with_capacity(files.len());
    let mut failed_files = Vec::new();

    for (file_name, bytes) in files {
        match extract_pdf_bytes(bytes, options) {
            Ok(extraction) => {
                worker::console_log!(
                    "extracted {} rows from '{}' (booking sheet: {})",
                    extraction.rows.len(),
                    file_name,
                    extraction.booking_sheet
                );
                extractions.push(extraction);
            }
            Err(error) => {
                worker::console_error!("failed to parse '{file_name}': {error}");
                failed_files.push(file_name.clone());
            }
        }
    }

    let (report, row_count) = fold_extractions(&extractions, options);
    BatchOutcome {
        report,
        row_count,
        failed_files,
    }
}

/// Pure folding step: merge metadata per the configured policy and pivot
/// the combined row set.
#[must_use]
pub fn fold_extractions(
    extractions: &[DocumentExtraction],
    options: &ExtractOptions,
) -> (PoReport, usize) {
    let row_count = extractions
        .iter()
        .map(|extraction| extraction.rows.len())
        .sum();
    (build_report(extractions, options), row_count)
}

/// Attachment filename for the spreadsheet download, keyed by the booking
/// number with anything URL-hostile percent-encoded.
#[must_use]
pub fn download_filename(booking: &str) -> String {
    format!("po-summary-{}.csv", urlencoding::encode(booking))
}

pub fn csv_attachment(outcome: &BatchOutcome) -> Result<(String, String), ApiError> {
    let csv = kiabi_po_to_report::csv_report_to_string(&outcome.report)?;
    Ok((csv, download_filename(&outcome.report.metadata.booking)))
}
