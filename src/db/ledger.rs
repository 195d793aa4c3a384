use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::models::SalesRegister;

const UPSERT_COLUMNS: &str = "authorization_code, invoice_date, invoice_number, \
     customer_nit, customer_name, total_sale_amount, status, \
     branch_office, modality, emission_type, document_type, sector, \
     point_of_sale, synced_at";

/// Upsert a batch of sales registers inside one transaction.
///
/// All-or-nothing per run: any chunk failing rolls the whole transaction
/// back, leaving the ledger exactly as before. Returns the total affected
/// row count (MySQL counts 1 per insert, 2 per update).
pub async fn upsert_batch(
    pool: &MySqlPool,
    registers: &[SalesRegister],
    batch_size: usize,
) -> Result<u64, sqlx::Error> {
    if registers.is_empty() {
        return Ok(0);
    }
    let batch_size = batch_size.max(1);

    let mut tx = pool.begin().await?;
    let mut affected = 0u64;

    for chunk in registers.chunks(batch_size) {
        let mut query_builder: QueryBuilder<MySql> =
            QueryBuilder::new(format!("INSERT INTO sales_registers ({UPSERT_COLUMNS}) "));

        query_builder.push_values(chunk, |mut b, register| {
            b.push_bind(&register.authorization_code)
                .push_bind(register.invoice_date)
                .push_bind(register.invoice_number)
                .push_bind(&register.customer_nit)
                .push_bind(&register.customer_name)
                .push_bind(register.total_sale_amount.clone())
                .push_bind(&register.status)
                .push_bind(register.branch_office.clone())
                .push_bind(register.modality.clone())
                .push_bind(register.emission_type.clone())
                .push_bind(register.document_type.clone())
                .push_bind(register.sector.clone())
                .push_bind(register.point_of_sale.clone())
                .push_bind(register.synced_at);
        });

        query_builder.push(
            " ON DUPLICATE KEY UPDATE \
             invoice_date = VALUES(invoice_date), \
             invoice_number = VALUES(invoice_number), \
             customer_nit = VALUES(customer_nit), \
             customer_name = VALUES(customer_name), \
             total_sale_amount = VALUES(total_sale_amount), \
             status = VALUES(status), \
             branch_office = VALUES(branch_office), \
             modality = VALUES(modality), \
             emission_type = VALUES(emission_type), \
             document_type = VALUES(document_type), \
             sector = VALUES(sector), \
             point_of_sale = VALUES(point_of_sale), \
             synced_at = VALUES(synced_at)",
        );

        let result = query_builder.build().execute(&mut *tx).await;
        match result {
            Ok(done) => {
                affected += done.rows_affected();
                tracing::debug!(
                    chunk = chunk.len(),
                    rows_affected = done.rows_affected(),
                    "upsert chunk executed"
                );
            }
            Err(e) => {
                // Dropping the transaction rolls everything back.
                tracing::error!(error = %e, "ledger upsert failed, rolling back run");
                return Err(e);
            }
        }
    }

    tx.commit().await?;
    Ok(affected)
}
