use bigdecimal::{BigDecimal, ToPrimitive};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;
use crate::models::{InventoryInvoice, MatchedPair, SiatSalesRecord, ValidationResult, ValidationStats};

/// Write the reconciliation report: a key/value summary plus one CSV per
/// non-empty view. Returns the files written.
pub fn write_report(
    result: &ValidationResult,
    stats: &ValidationStats,
    dir: &Path,
) -> Result<Vec<PathBuf>, ValidationError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    written.push(write_summary(stats, dir)?);

    if !result.matched_invoices.is_empty() {
        written.push(write_pairs(&result.matched_invoices, dir, "perfect_matches.csv")?);
    }
    if !result.only_in_siat.is_empty() {
        written.push(write_siat_rows(&result.only_in_siat, dir, "only_in_siat.csv")?);
    }
    if !result.only_in_inventory.is_empty() {
        written.push(write_inventory_rows(
            &result.only_in_inventory,
            dir,
            "only_in_inventory.csv",
        )?);
    }
    if !result.amount_mismatches.is_empty() {
        written.push(write_pairs(&result.amount_mismatches, dir, "amount_mismatches.csv")?);
    }
    if !result.customer_mismatches.is_empty() {
        written.push(write_pairs(
            &result.customer_mismatches,
            dir,
            "customer_mismatches.csv",
        )?);
    }
    if !result.other_mismatches.is_empty() {
        written.push(write_pairs(&result.other_mismatches, dir, "other_mismatches.csv")?);
    }

    tracing::info!(dir = %dir.display(), files = written.len(), "report written");
    Ok(written)
}

fn money(value: &BigDecimal) -> String {
    format!("{:.2}", value.to_f64().unwrap_or(0.0))
}

fn write_summary(stats: &ValidationStats, dir: &Path) -> Result<PathBuf, ValidationError> {
    let path = dir.join("summary.csv");
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["Metric", "Value"])?;

    let rows: Vec<(&str, String)> = vec![
        ("Total SIAT", stats.total_siat.to_string()),
        ("Total Inventory", stats.total_inventory.to_string()),
        ("Perfect Matches", stats.matched_count.to_string()),
        ("Match Rate (%)", format!("{:.2}", stats.match_rate)),
        ("SIAT Total Amount (Bs.)", money(&stats.total_siat_amount)),
        (
            "Inventory Total Amount (Bs.)",
            money(&stats.total_inventory_amount),
        ),
        ("Amount Difference (Bs.)", money(&stats.amount_difference)),
        (
            "Amount Difference (%)",
            format!("{:.4}", stats.amount_difference_pct),
        ),
        ("Only in SIAT", stats.only_siat_count.to_string()),
        ("Only in Inventory", stats.only_inventory_count.to_string()),
        ("Amount Mismatches", stats.amount_mismatch_count.to_string()),
        (
            "Customer Mismatches",
            stats.customer_mismatch_count.to_string(),
        ),
        ("Other Mismatches", stats.other_mismatch_count.to_string()),
    ];
    for (metric, value) in rows {
        writer.write_record([metric, value.as_str()])?;
    }

    writer.flush()?;
    Ok(path)
}

fn write_pairs(pairs: &[MatchedPair], dir: &Path, name: &str) -> Result<PathBuf, ValidationError> {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "cuf",
        "siat_invoice_number",
        "inventory_invoice_number",
        "siat_nit",
        "inventory_nit",
        "siat_amount",
        "inventory_amount",
        "siat_branch",
        "inventory_branch",
    ])?;

    for pair in pairs {
        writer.write_record([
            pair.siat.authorization_code.clone(),
            pair.siat.cuf.invoice_number.clone(),
            pair.inventory
                .invoice_number
                .map(|v| v.to_string())
                .unwrap_or_default(),
            pair.siat.customer_nit.clone(),
            pair.inventory.customer_nit.clone().unwrap_or_default(),
            pair.siat.total_amount.clone(),
            pair.inventory
                .total
                .as_ref()
                .map(money)
                .unwrap_or_default(),
            pair.siat.cuf.branch_office.clone(),
            pair.inventory
                .branch_office
                .map(|v| v.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(path)
}

fn write_siat_rows(
    rows: &[SiatSalesRecord],
    dir: &Path,
    name: &str,
) -> Result<PathBuf, ValidationError> {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "cuf",
        "invoice_date",
        "invoice_number",
        "customer_nit",
        "customer_name",
        "total_amount",
        "status",
    ])?;

    for row in rows {
        writer.write_record([
            row.authorization_code.clone(),
            row.invoice_date.clone(),
            row.cuf.invoice_number.clone(),
            row.customer_nit.clone(),
            row.customer_name.clone(),
            row.total_amount.clone(),
            row.status.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(path)
}

fn write_inventory_rows(
    rows: &[InventoryInvoice],
    dir: &Path,
    name: &str,
) -> Result<PathBuf, ValidationError> {
    let path = dir.join(name);
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "cuf",
        "invoice_number",
        "customer_nit",
        "customer_name",
        "total",
        "branch_office",
        "invoice_date",
    ])?;

    for row in rows {
        writer.write_record([
            row.cuf.clone().unwrap_or_default(),
            row.invoice_number.map(|v| v.to_string()).unwrap_or_default(),
            row.customer_nit.clone().unwrap_or_default(),
            row.customer_name.clone().unwrap_or_default(),
            row.total.as_ref().map(money).unwrap_or_default(),
            row.branch_office.map(|v| v.to_string()).unwrap_or_default(),
            row.invoice_date.map(|d| d.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(path)
}
