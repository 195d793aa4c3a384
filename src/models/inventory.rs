use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One invoice row from the operational inventory system.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct InventoryInvoice {
    /// CUF assigned by SIAT at emission time; matching key. NULL for
    /// invoices emitted before the online regime.
    pub cuf: Option<String>,
    pub invoice_number: Option<i64>,
    pub customer_nit: Option<String>,
    pub customer_name: Option<String>,
    pub total: Option<BigDecimal>,
    pub branch_office: Option<i64>,
    pub invoice_date: Option<NaiveDate>,
}
