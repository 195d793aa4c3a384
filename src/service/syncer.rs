use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::db::ledger;
use crate::error::ValidationError;
use crate::models::{SalesRegister, SiatSalesRecord};
use crate::service::validator::{parse_amount, parse_int_lenient};

/// Counters for one transform pass, returned by value per run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TransformStats {
    pub total_rows: usize,
    pub successful: usize,
    pub errors: usize,
}

/// Result of one sync attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub total_rows: usize,
    pub inserted: u64,
    pub updated: u64,
    pub dry_run: bool,
    pub message: String,
    pub transform: TransformStats,
}

/// Pushes validated SIAT rows into the SAS accounting ledger.
///
/// The write is all-or-nothing: one transaction per run, rolled back on the
/// first failure. The authorization code is the ledger's unique key, so a
/// re-run of the same period updates in place.
pub struct LedgerSyncer {
    pool: Option<MySqlPool>,
    batch_size: usize,
}

impl LedgerSyncer {
    pub fn new(pool: Option<MySqlPool>, batch_size: usize) -> Self {
        Self { pool, batch_size }
    }

    /// Map one decoded+filtered SIAT row to the ledger schema.
    pub fn map_row(row: &SiatSalesRecord) -> Result<SalesRegister, String> {
        if row.authorization_code.is_empty() {
            return Err("missing authorization code".to_string());
        }
        let invoice_date = parse_invoice_date(&row.invoice_date)
            .ok_or_else(|| format!("unparseable invoice date '{}'", row.invoice_date))?;
        // Prefer the CUF-decoded number; fall back to the declared one.
        let invoice_number = parse_int_lenient(&row.cuf.invoice_number)
            .or_else(|| parse_int_lenient(&row.declared_invoice_number))
            .ok_or_else(|| "no numeric invoice number".to_string())?;
        let total_sale_amount = parse_amount(&row.total_amount)
            .ok_or_else(|| format!("unparseable total amount '{}'", row.total_amount))?;

        let optional = |value: &str| {
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        };

        Ok(SalesRegister {
            authorization_code: row.authorization_code.clone(),
            invoice_date,
            invoice_number,
            customer_nit: row.customer_nit.clone(),
            customer_name: row.customer_name.clone(),
            total_sale_amount,
            status: row.status.clone(),
            branch_office: optional(&row.cuf.branch_office),
            modality: optional(&row.cuf.modality),
            emission_type: optional(&row.cuf.emission_type),
            document_type: optional(&row.cuf.document_type),
            sector: optional(&row.cuf.sector),
            point_of_sale: optional(&row.cuf.point_of_sale),
            synced_at: Utc::now(),
        })
    }

    /// Transform a batch. Per-row failures are logged and counted; the rows
    /// that map cleanly are returned.
    pub fn transform(rows: &[SiatSalesRecord]) -> (Vec<SalesRegister>, TransformStats) {
        let mut stats = TransformStats {
            total_rows: rows.len(),
            ..Default::default()
        };
        let mut registers = Vec::with_capacity(rows.len());

        for row in rows {
            match Self::map_row(row) {
                Ok(register) => {
                    registers.push(register);
                    stats.successful += 1;
                }
                Err(reason) => {
                    stats.errors += 1;
                    tracing::warn!(
                        cuf = %row.authorization_code,
                        reason,
                        "row not mappable to ledger schema"
                    );
                }
            }
        }

        (registers, stats)
    }

    /// Sync a validated dataset to the ledger.
    ///
    /// Refuses when the validation gate failed, unless `force` overrides it
    /// (the override is the caller's policy, not this core's). `dry_run`
    /// transforms and reports without touching the store.
    pub async fn sync(
        &self,
        rows: &[SiatSalesRecord],
        validation_passed: bool,
        force: bool,
        dry_run: bool,
    ) -> Result<SyncOutcome, ValidationError> {
        if !validation_passed && !force {
            return Err(ValidationError::SyncRejected(
                "SIAT vs inventory validation did not pass".to_string(),
            ));
        }

        let (registers, transform) = Self::transform(rows);
        if transform.errors > 0 {
            return Err(ValidationError::SyncRejected(format!(
                "transformation failed for {} of {} rows",
                transform.errors, transform.total_rows
            )));
        }

        if dry_run {
            tracing::info!(rows = registers.len(), "dry run, skipping ledger write");
            return Ok(SyncOutcome {
                total_rows: registers.len(),
                inserted: registers.len() as u64,
                updated: 0,
                dry_run: true,
                message: format!("dry run: would sync {} rows", registers.len()),
                transform,
            });
        }

        let pool = self
            .pool
            .as_ref()
            .ok_or(ValidationError::LedgerNotConfigured)?;

        let affected = ledger::upsert_batch(pool, &registers, self.batch_size).await?;

        // MySQL reports 1 affected row per insert and 2 per update.
        let total = registers.len() as u64;
        let updated = affected.saturating_sub(total);
        let inserted = total.saturating_sub(updated);

        tracing::info!(total, inserted, updated, "ledger sync committed");

        Ok(SyncOutcome {
            total_rows: registers.len(),
            inserted,
            updated,
            dry_run: false,
            message: format!("synced {total} rows ({inserted} new, {updated} updated)"),
            transform,
        })
    }
}

fn parse_invoice_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CufFields;

    fn mappable_row() -> SiatSalesRecord {
        SiatSalesRecord {
            authorization_code: "ABC".to_string(),
            invoice_date: "01/09/2025".to_string(),
            customer_nit: "1234567".to_string(),
            customer_name: "ACME SRL".to_string(),
            total_amount: "150.50".to_string(),
            status: "VIGENTE".to_string(),
            cuf: CufFields {
                branch_office: "0002".to_string(),
                modality: "2".to_string(),
                invoice_number: "0000123456".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn maps_decoded_row() {
        let register = LedgerSyncer::map_row(&mappable_row()).unwrap();
        assert_eq!(register.invoice_number, 123456);
        assert_eq!(register.invoice_date, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(register.branch_office.as_deref(), Some("0002"));
        assert_eq!(register.total_sale_amount, "150.50".parse().unwrap());
    }

    #[test]
    fn transform_counts_failures() {
        let mut bad = mappable_row();
        bad.invoice_date = "yesterday".to_string();
        let (registers, stats) = LedgerSyncer::transform(&[mappable_row(), bad]);
        assert_eq!(registers.len(), 1);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.errors, 1);
    }

    #[tokio::test]
    async fn gate_blocks_sync_unless_forced() {
        let syncer = LedgerSyncer::new(None, 100);
        let rows = [mappable_row()];

        let err = syncer.sync(&rows, false, false, true).await.unwrap_err();
        assert!(matches!(err, ValidationError::SyncRejected(_)));

        // Forced dry run goes through without a configured ledger.
        let outcome = syncer.sync(&rows, false, true, true).await.unwrap();
        assert!(outcome.dry_run);
        assert_eq!(outcome.total_rows, 1);
    }

    #[tokio::test]
    async fn live_sync_requires_ledger_config() {
        let syncer = LedgerSyncer::new(None, 100);
        let err = syncer
            .sync(&[mappable_row()], true, false, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ValidationError::LedgerNotConfigured));
    }
}
