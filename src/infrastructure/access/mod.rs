//! Access evaluation over group capabilities

mod evaluator;
mod static_table;

pub use evaluator::AccessEvaluator;
pub use static_table::StaticCapabilityTable;
