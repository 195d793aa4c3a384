use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::models::InventoryInvoice;

/// Fetch the inventory invoices for one reporting period.
///
/// Reduced projection of the operational sales query: only the columns the
/// reconciliation compares. Casts pin the SQL types to what
/// `InventoryInvoice` decodes.
pub async fn fetch_inventory_invoices(
    pool: &MySqlPool,
    date_from: NaiveDate,
    date_to: NaiveDate,
) -> Result<Vec<InventoryInvoice>, sqlx::Error> {
    sqlx::query_as::<_, InventoryInvoice>(
        r#"
        SELECT fs.cuf,
               CAST(f.nFactura AS SIGNED) AS invoice_number,
               CAST(f.ClienteNit AS CHAR) AS customer_nit,
               f.ClienteFactura AS customer_name,
               f.total,
               CAST(fs.codigoSucursal AS SIGNED) AS branch_office,
               CAST(f.fechaFac AS DATE) AS invoice_date
        FROM factura f
        INNER JOIN factura_siat fs ON fs.factura_id = f.idFactura
        WHERE f.fechaFac BETWEEN ? AND ?
        ORDER BY f.fechaFac DESC, f.nFactura DESC
        "#,
    )
    .bind(date_from)
    .bind(date_to)
    .fetch_all(pool)
    .await
}
