use serde::{Deserialize, Serialize};

use super::CufFields;

/// One row of the SIAT sales export (CONSULTA VENTAS CSV).
///
/// Columns arrive string-typed from the export; the total amount is parsed to
/// decimal only at comparison/summation time so a bad value stays a row-level
/// problem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiatSalesRecord {
    /// CODIGO DE AUTORIZACIÓN — the CUF, matching key against inventory.
    pub authorization_code: String,
    /// FECHA DE LA FACTURA
    pub invoice_date: String,
    /// Nro. DE LA FACTURA as declared on the export (the reconciliation uses
    /// the number decoded from the CUF instead).
    pub declared_invoice_number: String,
    /// NIT / CI CLIENTE
    pub customer_nit: String,
    /// NOMBRE O RAZON SOCIAL
    pub customer_name: String,
    /// IMPORTE TOTAL DE LA VENTA, decimal-parseable string in Bs.
    pub total_amount: String,
    /// ESTADO (VIGENTE / ANULADA)
    pub status: String,
    /// Fields decoded from the authorization code. Empty until the decode
    /// pass runs; empty afterwards too when the code was undecodable.
    pub cuf: CufFields,
}
