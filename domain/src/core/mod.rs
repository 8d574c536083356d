//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: UTF-8 safe string helpers used when summarizing rationales

pub mod error;
pub mod string;
