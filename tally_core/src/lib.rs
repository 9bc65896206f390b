#![forbid(unsafe_code)]

//! Core engine for estimating the humanitarian impact of charitable
//! donations.
//!
//! This crate provides:
//! - Domain types (categories, effects, recipients, donors, donations)
//! - Data validation with a fail-fast startup pass
//! - Discounted present-value primitives
//! - The effects-based cost-per-life calculation
//! - Combined assumptions (baseline + user overrides) and its queries
//! - Donor/recipient/category aggregate statistics and CSV reports
//!
//! Every exposed computation is a pure function over an explicit
//! [`CombinedAssumptions`] snapshot; the engine holds no process-wide
//! state and performs no I/O outside dataset/config loading and report
//! writing.

pub mod types;
pub mod error;
pub mod validate;
pub mod discount;
pub mod effects;
pub mod assumptions;
pub mod stats;
pub mod catalog;
pub mod dataset;
pub mod config;
pub mod logging;
pub mod report;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use assumptions::{
    AssumptionOverrides, CategoryOverride, CombinedAssumptions, GlobalParameterOverrides,
    RecipientCategoryOverride, RecipientOverride,
};
pub use catalog::{build_default_catalog, default_catalog};
pub use config::Config;
pub use discount::discounted_window_value;
pub use effects::{apply_adjustments, cost_per_life_for_effects, lives_per_dollar, SIMULATION_SPEND};
pub use stats::{
    category_statistics, donor_statistics, recipient_statistics, CategoryShare,
    CategoryStatistics, DonorStatistics, RecipientStatistics,
};
pub use validate::{crash_instead_of_fallback, validate_dataset};
pub use report::{write_donor_report, write_recipient_report};
