//! Numbers, dates, the document abstraction and timers
//!
//! # Examples
//!
//! ```
//! use loandesk::core::dates::calculate_days;
//! use loandesk::core::numeric::NumberFormat;
//!
//! assert_eq!(calculate_days("2025-01-01", "2025-01-31"), 30);
//! assert_eq!(NumberFormat::default().parse_currency("₹1,250.00"), 1250.0);
//! ```

pub use loandesk_core::*;
