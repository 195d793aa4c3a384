use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::ValidationError;
use crate::models::SiatSalesRecord;

/// SIAT CONSULTA VENTAS column headers.
pub const COL_AUTHORIZATION_CODE: &str = "CODIGO DE AUTORIZACIÓN";
pub const COL_INVOICE_DATE: &str = "FECHA DE LA FACTURA";
pub const COL_INVOICE_NUMBER: &str = "Nro. DE LA FACTURA";
pub const COL_CUSTOMER_NIT: &str = "NIT / CI CLIENTE";
pub const COL_CUSTOMER_NAME: &str = "NOMBRE O RAZON SOCIAL";
pub const COL_TOTAL_AMOUNT: &str = "IMPORTE TOTAL DE LA VENTA";
pub const COL_STATUS: &str = "ESTADO";

const DATASET: &str = "siat";

/// Load the SIAT sales export. The file is expected clean (extraction and
/// encoding repair happen upstream); what is checked here is structure:
/// the columns the reconciliation depends on must exist, before any row is
/// materialized.
pub fn load_siat_csv(path: &Path) -> Result<Vec<SiatSalesRecord>, ValidationError> {
    let file = File::open(path)?;
    let rows = read_siat(file)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "SIAT export loaded");
    Ok(rows)
}

/// Parse a SIAT export from any reader.
pub fn read_siat<R: Read>(reader: R) -> Result<Vec<SiatSalesRecord>, ValidationError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let required = |name: &str| {
        position(name).ok_or_else(|| ValidationError::MissingColumn {
            dataset: DATASET.to_string(),
            column: name.to_string(),
        })
    };

    // Structural precondition: fail before reading a single row.
    let auth_idx = required(COL_AUTHORIZATION_CODE)?;
    let amount_idx = required(COL_TOTAL_AMOUNT)?;
    let nit_idx = required(COL_CUSTOMER_NIT)?;
    let date_idx = position(COL_INVOICE_DATE);
    let number_idx = position(COL_INVOICE_NUMBER);
    let name_idx = position(COL_CUSTOMER_NAME);
    let status_idx = position(COL_STATUS);

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(SiatSalesRecord {
            authorization_code: field(&record, Some(auth_idx)),
            invoice_date: field(&record, date_idx),
            declared_invoice_number: field(&record, number_idx),
            customer_nit: field(&record, Some(nit_idx)),
            customer_name: field(&record, name_idx),
            total_amount: field(&record, Some(amount_idx)),
            status: field(&record, status_idx),
            cuf: Default::default(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_by_header_name() {
        let csv = "\
CODIGO DE AUTORIZACIÓN,FECHA DE LA FACTURA,NIT / CI CLIENTE,IMPORTE TOTAL DE LA VENTA,ESTADO
ABC123,01/09/2025,1234567,150.50,VIGENTE
DEF456,02/09/2025,7654321,99.99,ANULADA
";
        let rows = read_siat(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].authorization_code, "ABC123");
        assert_eq!(rows[0].total_amount, "150.50");
        assert_eq!(rows[1].status, "ANULADA");
        // Columns absent from the file come back empty, not missing.
        assert_eq!(rows[0].customer_name, "");
    }

    #[test]
    fn missing_key_column_is_structural() {
        let csv = "\
FECHA DE LA FACTURA,NIT / CI CLIENTE,IMPORTE TOTAL DE LA VENTA
01/09/2025,1234567,150.50
";
        let err = read_siat(csv.as_bytes()).unwrap_err();
        match err {
            ValidationError::MissingColumn { dataset, column } => {
                assert_eq!(dataset, "siat");
                assert_eq!(column, COL_AUTHORIZATION_CODE);
            }
            other => panic!("expected MissingColumn, got {other}"),
        }
    }
}
