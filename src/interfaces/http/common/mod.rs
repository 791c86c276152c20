//! Shared HTTP building blocks: problem responses and validated extraction.

pub mod problem;
pub mod validated_json;

pub use problem::{Problem, APPLICATION_PROBLEM_JSON};
pub use validated_json::{BusinessRules, ValidatedJson, ValidatedJsonRejection};
