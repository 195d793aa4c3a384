use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One row of the SAS `sales_registers` table.
///
/// Built from a decoded+filtered SIAT row by the ledger mapper; the
/// authorization code is the table's unique key, so re-syncing a period
/// updates rows in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRegister {
    pub authorization_code: String,
    pub invoice_date: NaiveDate,
    pub invoice_number: i64,
    pub customer_nit: String,
    pub customer_name: String,
    pub total_sale_amount: BigDecimal,
    pub status: String,
    pub branch_office: Option<String>,
    pub modality: Option<String>,
    pub emission_type: Option<String>,
    pub document_type: Option<String>,
    pub sector: Option<String>,
    pub point_of_sale: Option<String>,
    pub synced_at: DateTime<Utc>,
}
