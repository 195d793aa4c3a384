use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use indexmap::IndexSet;
use num_bigint::BigInt;
use std::collections::HashMap;

use crate::error::ValidationError;
use crate::models::{
    InventoryInvoice, MatchedPair, SiatSalesRecord, ValidationResult, ValidationStats,
};

/// Reconciles the SIAT sales export against the inventory system of record.
///
/// Matching key is the CUF. A run filters the SIAT side to one MODALIDAD,
/// partitions both sides by key, compares matched pairs field by field and
/// aggregates the counts and amount totals the sync gate runs on.
pub struct SalesValidator {
    /// Amount comparison tolerance, in Bs. Differences up to and including
    /// this value are not mismatches.
    tolerance: BigDecimal,
}

impl SalesValidator {
    pub fn new() -> Self {
        Self {
            // 0.01 Bs
            tolerance: BigDecimal::new(BigInt::from(1), 2),
        }
    }

    /// Keep only rows of the given MODALIDAD (2 = INVENTARIOS,
    /// 3 = ALQUILERES), preserving order.
    ///
    /// When no row carries a populated modality field at all (the decode pass
    /// did not run, or nothing decoded) the dataset is passed through
    /// unchanged. Deliberate leniency: some callers pre-filter.
    pub fn filter_by_modality(
        &self,
        rows: Vec<SiatSalesRecord>,
        modality: &str,
    ) -> Vec<SiatSalesRecord> {
        if !rows.iter().any(|r| !r.cuf.modality.is_empty()) {
            tracing::warn!("MODALIDAD not populated on any row, returning dataset unchanged");
            return rows;
        }

        let original = rows.len();
        let filtered: Vec<SiatSalesRecord> = rows
            .into_iter()
            .filter(|r| r.cuf.modality == modality)
            .collect();
        tracing::info!(
            modality,
            original,
            kept = filtered.len(),
            excluded = original - filtered.len(),
            "filtered SIAT rows by MODALIDAD"
        );
        filtered
    }

    /// Partition both sides by CUF membership.
    ///
    /// Rows without a key are dropped from consideration. Duplicate keys are
    /// kept: matching is on key membership, not 1:1 row correspondence.
    /// Returns (matched SIAT rows, SIAT-only rows, inventory-only rows).
    pub fn match_by_cuf(
        &self,
        siat: &[SiatSalesRecord],
        inventory: &[InventoryInvoice],
    ) -> (
        Vec<SiatSalesRecord>,
        Vec<SiatSalesRecord>,
        Vec<InventoryInvoice>,
    ) {
        let siat_keys: IndexSet<&str> = siat
            .iter()
            .map(|r| r.authorization_code.as_str())
            .filter(|k| !k.is_empty())
            .collect();
        let inventory_keys: IndexSet<&str> = inventory
            .iter()
            .filter_map(|r| r.cuf.as_deref())
            .filter(|k| !k.is_empty())
            .collect();

        let matched_keys: IndexSet<&str> =
            siat_keys.intersection(&inventory_keys).copied().collect();

        tracing::info!(
            siat_keys = siat_keys.len(),
            inventory_keys = inventory_keys.len(),
            matched = matched_keys.len(),
            only_siat = siat_keys.len() - matched_keys.len(),
            only_inventory = inventory_keys.len() - matched_keys.len(),
            "matched invoices by CUF"
        );

        let matched_siat: Vec<SiatSalesRecord> = siat
            .iter()
            .filter(|r| matched_keys.contains(r.authorization_code.as_str()))
            .cloned()
            .collect();
        let only_siat: Vec<SiatSalesRecord> = siat
            .iter()
            .filter(|r| {
                let key = r.authorization_code.as_str();
                !key.is_empty() && !matched_keys.contains(key)
            })
            .cloned()
            .collect();
        let only_inventory: Vec<InventoryInvoice> = inventory
            .iter()
            .filter(|r| match r.cuf.as_deref() {
                Some(key) if !key.is_empty() => !matched_keys.contains(key),
                _ => false,
            })
            .cloned()
            .collect();

        (matched_siat, only_siat, only_inventory)
    }

    /// Field-level comparison of matched rows.
    ///
    /// Inner join on the CUF; a key duplicated on either side yields one pair
    /// per combination. Each pair runs three independent checks (amount,
    /// customer NIT, other fields); a pair lands in every mismatch view it
    /// triggers, or in the perfect-match view when none fire. A value that
    /// cannot be parsed disables that check for the pair and is counted, not
    /// flagged.
    pub fn compare_fields(
        &self,
        matched_siat: &[SiatSalesRecord],
        inventory: &[InventoryInvoice],
    ) -> ValidationResult {
        let mut by_cuf: HashMap<&str, Vec<&InventoryInvoice>> = HashMap::new();
        for inv in inventory {
            if let Some(key) = inv.cuf.as_deref() {
                if !key.is_empty() {
                    by_cuf.entry(key).or_default().push(inv);
                }
            }
        }

        let mut result = ValidationResult::default();

        for siat_row in matched_siat {
            let Some(candidates) = by_cuf.get(siat_row.authorization_code.as_str()) else {
                continue;
            };

            for inv_row in candidates {
                let pair = MatchedPair {
                    siat: siat_row.clone(),
                    inventory: (*inv_row).clone(),
                };
                let mut has_mismatch = false;

                // Amount
                match (parse_amount(&siat_row.total_amount), inv_row.total.as_ref()) {
                    (Some(siat_amount), Some(inv_amount)) => {
                        if (&siat_amount - inv_amount).abs() > self.tolerance {
                            result.amount_mismatches.push(pair.clone());
                            has_mismatch = true;
                        }
                    }
                    _ => {
                        result.diagnostics.amount_unparseable += 1;
                        tracing::warn!(
                            cuf = %siat_row.authorization_code,
                            "could not compare amounts"
                        );
                    }
                }

                // Customer NIT
                let siat_nit = normalize_nit(&siat_row.customer_nit);
                let inv_nit = normalize_nit(inv_row.customer_nit.as_deref().unwrap_or(""));
                if siat_nit != inv_nit {
                    tracing::debug!(
                        cuf = %siat_row.authorization_code,
                        %siat_nit,
                        %inv_nit,
                        "NIT mismatch"
                    );
                    result.customer_mismatches.push(pair.clone());
                    has_mismatch = true;
                }

                // Other fields: invoice number and branch from the CUF.
                let mut other_field_mismatch = false;

                match (
                    parse_int_lenient(&siat_row.cuf.invoice_number),
                    inv_row.invoice_number,
                ) {
                    (Some(siat_number), Some(inv_number)) => {
                        if siat_number != inv_number {
                            tracing::debug!(
                                cuf = %siat_row.authorization_code,
                                siat_number,
                                inv_number,
                                "invoice number mismatch"
                            );
                            other_field_mismatch = true;
                        }
                    }
                    _ => {
                        result.diagnostics.invoice_number_unparseable += 1;
                        tracing::warn!(
                            cuf = %siat_row.authorization_code,
                            "could not compare invoice numbers"
                        );
                    }
                }

                match (
                    parse_int_lenient(&siat_row.cuf.branch_office),
                    inv_row.branch_office,
                ) {
                    (Some(siat_branch), Some(inv_branch)) => {
                        if siat_branch != inv_branch {
                            tracing::debug!(
                                cuf = %siat_row.authorization_code,
                                siat_branch,
                                inv_branch,
                                "branch mismatch"
                            );
                            other_field_mismatch = true;
                        }
                    }
                    _ => {
                        result.diagnostics.branch_unparseable += 1;
                        tracing::warn!(
                            cuf = %siat_row.authorization_code,
                            "could not compare branches"
                        );
                    }
                }

                if other_field_mismatch {
                    result.other_mismatches.push(pair.clone());
                    has_mismatch = true;
                }

                if !has_mismatch {
                    result.matched_invoices.push(pair);
                }
            }
        }

        tracing::info!(
            perfect = result.matched_invoices.len(),
            amount = result.amount_mismatches.len(),
            customer = result.customer_mismatches.len(),
            other = result.other_mismatches.len(),
            "field comparison finished"
        );

        result
    }

    /// Run the full reconciliation on an already modality-filtered SIAT
    /// dataset: key matching, field comparison, statistics.
    pub fn reconcile(
        &self,
        siat_filtered: &[SiatSalesRecord],
        inventory: &[InventoryInvoice],
    ) -> Result<(ValidationResult, ValidationStats), ValidationError> {
        let (matched_siat, only_siat, only_inventory) = self.match_by_cuf(siat_filtered, inventory);

        let mut result = self.compare_fields(&matched_siat, inventory);
        result.only_in_siat = only_siat;
        result.only_in_inventory = only_inventory;

        let stats = self.compute_stats(&result, siat_filtered, inventory)?;

        Ok((result, stats))
    }

    /// Filter by MODALIDAD, then reconcile.
    pub fn validate(
        &self,
        siat: Vec<SiatSalesRecord>,
        inventory: &[InventoryInvoice],
        modality: &str,
    ) -> Result<(ValidationResult, ValidationStats), ValidationError> {
        let filtered = self.filter_by_modality(siat, modality);
        self.reconcile(&filtered, inventory)
    }

    /// Aggregate counts and amount totals for one run.
    ///
    /// Totals sum the full filtered datasets, not just the matched rows.
    /// Rows whose amount does not parse are skipped and logged; a non-empty
    /// SIAT dataset yielding zero parseable amounts is fatal — the gate would
    /// otherwise run on a silent zero.
    pub fn compute_stats(
        &self,
        result: &ValidationResult,
        siat_filtered: &[SiatSalesRecord],
        inventory: &[InventoryInvoice],
    ) -> Result<ValidationStats, ValidationError> {
        let total_siat = siat_filtered.len();
        let total_inventory = inventory.len();
        let matched_count = result.matched_invoices.len();

        let match_rate = if total_siat > 0 {
            matched_count as f64 / total_siat as f64 * 100.0
        } else {
            0.0
        };

        let mut total_siat_amount = BigDecimal::zero();
        let mut siat_parsed = 0usize;
        for row in siat_filtered {
            match parse_amount(&row.total_amount) {
                Some(amount) => {
                    total_siat_amount += amount;
                    siat_parsed += 1;
                }
                None => {
                    tracing::warn!(
                        cuf = %row.authorization_code,
                        value = %row.total_amount,
                        "skipping unparseable SIAT amount in total"
                    );
                }
            }
        }
        if total_siat > 0 && siat_parsed == 0 {
            return Err(ValidationError::DataType {
                dataset: "siat".to_string(),
                detail: format!("0 of {total_siat} rows have a numeric total amount"),
            });
        }

        let mut total_inventory_amount = BigDecimal::zero();
        for row in inventory {
            match row.total.as_ref() {
                Some(total) => total_inventory_amount += total,
                None => {
                    tracing::warn!(cuf = ?row.cuf, "skipping NULL inventory total");
                }
            }
        }

        let amount_difference = (&total_siat_amount - &total_inventory_amount).abs();
        let amount_difference_pct = if total_inventory_amount > BigDecimal::zero() {
            match (amount_difference.to_f64(), total_inventory_amount.to_f64()) {
                (Some(difference), Some(total)) if total > 0.0 => difference / total * 100.0,
                _ => 0.0,
            }
        } else {
            0.0
        };

        Ok(ValidationStats {
            total_siat,
            total_inventory,
            matched_count,
            only_siat_count: result.only_in_siat.len(),
            only_inventory_count: result.only_in_inventory.len(),
            amount_mismatch_count: result.amount_mismatches.len(),
            customer_mismatch_count: result.customer_mismatches.len(),
            other_mismatch_count: result.other_mismatches.len(),
            match_rate,
            total_siat_amount,
            total_inventory_amount,
            amount_difference,
            amount_difference_pct,
        })
    }
}

impl Default for SalesValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Decimal parse of an exported amount. Empty or malformed values are None;
/// the caller decides whether that is skip-and-log or fatal.
pub fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<BigDecimal>().ok()
}

/// Numeric reading of a formatted identifier: "007" and "7.0" both read as 7.
pub fn parse_int_lenient(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v as i64)
}

/// NIT normalization before comparison: uppercase, strip spaces, hyphens and
/// periods.
pub fn normalize_nit(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.'))
        .collect()
}
