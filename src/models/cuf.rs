use serde::{Deserialize, Serialize};

/// Fields packed into a CUF (Código Único de Facturación).
///
/// The tax authority encodes these positionally in the decimal expansion of
/// the 42-hex-digit authorization prefix. All eight fields are plain digit
/// strings; an undecodable CUF leaves every field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CufFields {
    pub branch_office: String,
    pub modality: String,
    pub emission_type: String,
    pub document_type: String,
    pub sector: String,
    pub invoice_number: String,
    pub point_of_sale: String,
    pub check_digit: String,
}

impl CufFields {
    /// True when decoding populated the record.
    pub fn is_decoded(&self) -> bool {
        !self.branch_office.is_empty()
    }
}
