//! Field validation, duplicate-submission guard and derived fields

pub use loandesk_forms::*;
