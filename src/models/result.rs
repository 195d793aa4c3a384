use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{InventoryInvoice, SiatSalesRecord};

/// A SIAT row joined to an inventory row on the CUF.
///
/// Duplicate CUFs on either side produce one pair per combination (cross
/// product), matching the source system's join semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPair {
    pub siat: SiatSalesRecord,
    pub inventory: InventoryInvoice,
}

/// Partition of a reconciliation run into its six views.
///
/// A matched pair with no flagged check lands in `matched_invoices`; a pair
/// can appear in several mismatch views at once (the three checks are
/// independent) but never in `matched_invoices` as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub matched_invoices: Vec<MatchedPair>,
    pub only_in_siat: Vec<SiatSalesRecord>,
    pub only_in_inventory: Vec<InventoryInvoice>,
    pub amount_mismatches: Vec<MatchedPair>,
    pub customer_mismatches: Vec<MatchedPair>,
    pub other_mismatches: Vec<MatchedPair>,
    pub diagnostics: ComparisonDiagnostics,
}

/// Checks that could not be evaluated for a pair (unparseable value on one
/// side). Distinct from a mismatch: the check is skipped, not failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonDiagnostics {
    pub amount_unparseable: usize,
    pub invoice_number_unparseable: usize,
    pub branch_unparseable: usize,
}

/// Aggregates for one reconciliation run. Computed once, immutable; feeds the
/// sync gate and the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_siat: usize,
    pub total_inventory: usize,
    pub matched_count: usize,
    pub only_siat_count: usize,
    pub only_inventory_count: usize,
    pub amount_mismatch_count: usize,
    pub customer_mismatch_count: usize,
    pub other_mismatch_count: usize,
    pub match_rate: f64,
    pub total_siat_amount: BigDecimal,
    pub total_inventory_amount: BigDecimal,
    pub amount_difference: BigDecimal,
    pub amount_difference_pct: f64,
}

/// Ceiling on the aggregate amount divergence, in percent.
pub const AMOUNT_DIFFERENCE_PCT_LIMIT: f64 = 0.5;

impl ValidationStats {
    /// Sync gate. Unmatched rows alone do not fail a run: SIAT-only rows are
    /// expected (voided or duplicate filings). Only the aggregate amount
    /// divergence and per-invoice amount mismatches block.
    pub fn passes(&self) -> bool {
        self.amount_difference_pct <= AMOUNT_DIFFERENCE_PCT_LIMIT
            && self.amount_mismatch_count == 0
    }
}
