use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use siat_sales_validator::error::ValidationError;
use siat_sales_validator::models::{CufFields, InventoryInvoice, SiatSalesRecord};
use siat_sales_validator::service::cuf_decoder::decode_batch;
use siat_sales_validator::service::{loader, report, SalesValidator};

fn siat_row(
    key: &str,
    amount: &str,
    nit: &str,
    invoice_number: &str,
    branch: &str,
) -> SiatSalesRecord {
    SiatSalesRecord {
        authorization_code: key.to_string(),
        customer_nit: nit.to_string(),
        total_amount: amount.to_string(),
        cuf: CufFields {
            branch_office: branch.to_string(),
            modality: "2".to_string(),
            invoice_number: invoice_number.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn inventory_row(key: &str, amount: &str, nit: &str, invoice: i64, branch: i64) -> InventoryInvoice {
    InventoryInvoice {
        cuf: Some(key.to_string()),
        invoice_number: Some(invoice),
        customer_nit: Some(nit.to_string()),
        customer_name: Some("ACME SRL".to_string()),
        total: Some(amount.parse::<BigDecimal>().unwrap()),
        branch_office: Some(branch),
        invoice_date: None,
    }
}

/// Formatting differences that normalization is supposed to absorb: NIT
/// "123-4" vs "1234", invoice "007" vs 7, branch "01" vs 1.
#[test]
fn normalization_equalizes_formatted_fields() {
    let validator = SalesValidator::new();
    let siat = vec![siat_row("A", "100.00", "123-4", "007", "01")];
    let inventory = vec![inventory_row("A", "100.00", "1234", 7, 1)];

    let (result, stats) = validator.validate(siat, &inventory, "2").unwrap();

    assert_eq!(result.matched_invoices.len(), 1);
    assert!(result.amount_mismatches.is_empty());
    assert!(result.customer_mismatches.is_empty());
    assert!(result.other_mismatches.is_empty());
    assert_eq!(stats.match_rate, 100.0);
    assert!(stats.passes());
}

#[test]
fn disjoint_keys_land_in_only_views() {
    let validator = SalesValidator::new();
    let siat = vec![siat_row("B", "50.00", "1", "1", "1")];
    let inventory = vec![inventory_row("C", "50.00", "2", 2, 1)];

    let (result, stats) = validator.validate(siat, &inventory, "2").unwrap();

    assert_eq!(stats.only_siat_count, 1);
    assert_eq!(stats.only_inventory_count, 1);
    assert_eq!(stats.matched_count, 0);
    assert_eq!(result.only_in_siat[0].authorization_code, "B");
    assert_eq!(result.only_in_inventory[0].cuf.as_deref(), Some("C"));
}

#[test]
fn pair_can_fail_several_checks_at_once() {
    let validator = SalesValidator::new();
    let siat = vec![siat_row("K", "100.00", "111", "7", "1")];
    let inventory = vec![inventory_row("K", "300.00", "222", 7, 1)];

    let (result, _) = validator.validate(siat, &inventory, "2").unwrap();

    assert_eq!(result.amount_mismatches.len(), 1);
    assert_eq!(result.customer_mismatches.len(), 1);
    assert!(result.matched_invoices.is_empty());
}

/// Whole chain without a database: CSV text -> loader -> CUF decode ->
/// modality filter -> reconciliation.
#[test]
fn csv_to_reconciliation_pipeline() {
    // Authorization code whose decimal expansion ends in known fields:
    // branch 0002, modality 2, invoice number 0000123456.
    let remainder = format!("{}{}{}{}{}{}{}{}", "0002", "2", "1", "1", "01", "0000123456", "0015", "7");
    let decimal = format!("123456789012345678901234567{remainder}");
    let code = BigInt::parse_bytes(decimal.as_bytes(), 10)
        .unwrap()
        .to_str_radix(16)
        .to_uppercase();

    let csv = format!(
        "CODIGO DE AUTORIZACIÓN,NIT / CI CLIENTE,IMPORTE TOTAL DE LA VENTA,ESTADO\n\
         {code},1234567,150.50,VIGENTE\n"
    );

    let rows = loader::read_siat(csv.as_bytes()).unwrap();
    let outcome = decode_batch(rows);
    assert_eq!(outcome.decoded, 1);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.rows[0].cuf.modality, "2");

    let inventory = vec![inventory_row(&code, "150.50", "1234567", 123456, 2)];

    let validator = SalesValidator::new();
    let filtered = validator.filter_by_modality(outcome.rows, "2");
    assert_eq!(filtered.len(), 1);

    let (result, stats) = validator.reconcile(&filtered, &inventory).unwrap();
    assert_eq!(result.matched_invoices.len(), 1);
    assert_eq!(stats.match_rate, 100.0);
    assert!(stats.passes());
}

#[test]
fn loader_rejects_export_without_key_column() {
    let csv = "NIT / CI CLIENTE,IMPORTE TOTAL DE LA VENTA\n123,10.00\n";
    let err = loader::read_siat(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ValidationError::MissingColumn { .. }));
}

#[test]
fn report_writes_only_non_empty_views() {
    let validator = SalesValidator::new();
    let siat = vec![
        siat_row("A", "100.00", "123", "7", "1"),
        siat_row("B", "50.00", "456", "8", "1"),
    ];
    let inventory = vec![inventory_row("A", "100.00", "123", 7, 1)];

    let (result, stats) = validator.validate(siat, &inventory, "2").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let written = report::write_report(&result, &stats, dir.path()).unwrap();

    assert!(dir.path().join("summary.csv").exists());
    assert!(dir.path().join("perfect_matches.csv").exists());
    assert!(dir.path().join("only_in_siat.csv").exists());
    // Nothing was inventory-only or mismatched.
    assert!(!dir.path().join("only_in_inventory.csv").exists());
    assert!(!dir.path().join("amount_mismatches.csv").exists());
    assert_eq!(written.len(), 3);

    let summary = std::fs::read_to_string(dir.path().join("summary.csv")).unwrap();
    assert!(summary.contains("Match Rate (%),50.00"));
    assert!(summary.contains("SIAT Total Amount (Bs.),150.00"));
}
