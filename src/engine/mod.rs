pub mod capacity;
pub mod rules;
pub mod sql;
pub mod store;
pub mod workload;

pub use rules::{Decision, EvaluationError, LeaveEvaluator, LeavePolicy};
