pub mod ledger;
pub mod pool;
pub mod queries;

pub use pool::create_pool;
