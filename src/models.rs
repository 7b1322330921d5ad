use serde::{Deserialize, Serialize};

/// Letterhead printed on the report; override with the COMPANY_NAME var.
pub const DEFAULT_COMPANY_NAME: &str = "Cotton Clothing BD Limited";

/// Multipart field carrying the uploaded PDFs.
pub const UPLOAD_FIELD_NAME: &str = "pdf_files";

/// Upper bound on PDFs accepted per batch.
pub const MAX_UPLOAD_FILES: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
