pub mod cuf_decoder;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod syncer;
pub mod validator;

pub use pipeline::{RunOutput, ValidationService};
pub use syncer::LedgerSyncer;
pub use validator::SalesValidator;
