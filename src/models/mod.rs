pub mod cuf;
pub mod inventory;
pub mod ledger;
pub mod result;
pub mod sales;

pub use cuf::CufFields;
pub use inventory::InventoryInvoice;
pub use ledger::SalesRegister;
pub use result::{
    ComparisonDiagnostics, MatchedPair, ValidationResult, ValidationStats,
};
pub use sales::SiatSalesRecord;
