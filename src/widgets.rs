//! Data grid and searchable select lifecycles

pub use loandesk_widgets::*;
