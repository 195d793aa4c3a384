use chrono::NaiveDate;
use sqlx::MySqlPool;
use std::path::Path;

use crate::config::AppConfig;
use crate::db::queries;
use crate::error::ValidationError;
use crate::models::{SiatSalesRecord, ValidationResult, ValidationStats};
use crate::service::syncer::{LedgerSyncer, SyncOutcome};
use crate::service::{cuf_decoder, loader, report, SalesValidator};

/// Everything one validation run produces. The filtered rows are kept because
/// they are the ledger mapper's input contract (decoded fields + original
/// columns).
#[derive(Debug)]
pub struct RunOutput {
    pub result: ValidationResult,
    pub stats: ValidationStats,
    pub decoded: usize,
    pub failed: usize,
    pub filtered_rows: Vec<SiatSalesRecord>,
}

/// Orchestrates a full run: load export, decode CUFs, filter, fetch
/// inventory, reconcile, and optionally report and sync.
pub struct ValidationService {
    pool: MySqlPool,
    ledger_pool: Option<MySqlPool>,
    config: AppConfig,
}

impl ValidationService {
    pub fn new(pool: MySqlPool, ledger_pool: Option<MySqlPool>, config: AppConfig) -> Self {
        Self {
            pool,
            ledger_pool,
            config,
        }
    }

    pub async fn run_validation(
        &self,
        csv_path: &Path,
        date_from: NaiveDate,
        date_to: NaiveDate,
        modality: &str,
        report_dir: Option<&Path>,
    ) -> Result<RunOutput, ValidationError> {
        tracing::info!(
            csv = %csv_path.display(),
            %date_from,
            %date_to,
            modality,
            "starting validation run"
        );

        let rows = loader::load_siat_csv(csv_path)?;
        let outcome = cuf_decoder::decode_batch(rows);

        let inventory = queries::fetch_inventory_invoices(&self.pool, date_from, date_to).await?;
        tracing::info!(rows = inventory.len(), "inventory invoices fetched");

        let validator = SalesValidator::new();
        let filtered_rows = validator.filter_by_modality(outcome.rows, modality);
        let (result, stats) = validator.reconcile(&filtered_rows, &inventory)?;

        tracing::info!(
            matched = stats.matched_count,
            match_rate = stats.match_rate,
            amount_difference_pct = stats.amount_difference_pct,
            passed = stats.passes(),
            "validation run finished"
        );

        if let Some(dir) = report_dir {
            report::write_report(&result, &stats, dir)?;
        }

        Ok(RunOutput {
            result,
            stats,
            decoded: outcome.decoded,
            failed: outcome.failed,
            filtered_rows,
        })
    }

    /// Validate, then push the filtered dataset into the ledger when the gate
    /// passes (or `force` is set).
    pub async fn run_sync(
        &self,
        csv_path: &Path,
        date_from: NaiveDate,
        date_to: NaiveDate,
        modality: &str,
        dry_run: bool,
        force: bool,
    ) -> Result<(RunOutput, SyncOutcome), ValidationError> {
        let run = self
            .run_validation(csv_path, date_from, date_to, modality, None)
            .await?;

        let syncer = LedgerSyncer::new(self.ledger_pool.clone(), self.config.sync.batch_size);
        let outcome = syncer
            .sync(&run.filtered_rows, run.stats.passes(), force, dry_run)
            .await?;

        Ok((run, outcome))
    }

    pub fn default_modality(&self) -> &str {
        &self.config.sync.modality
    }
}
