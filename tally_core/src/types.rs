//! Core domain types for the donation impact model.
//!
//! This module defines the fundamental types used throughout the engine:
//! - Global model parameters (discounting, population dynamics, weights)
//! - Cause categories and their benefit effects
//! - Recipients, donors, and the donation ledger
//! - The full inbound dataset shape

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Allowed deviation when a recipient's category fractions are summed
/// against 1.0.
pub const WEIGHT_NORMALIZATION_TOLERANCE: f64 = 1e-6;

// ============================================================================
// Global Parameters
// ============================================================================

/// Process-wide model parameters applied uniformly to every calculation.
///
/// Held as an immutable snapshot per calculation pass; field domains are
/// enforced by `validate::validate_global_parameters`, not by construction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalParameters {
    /// Annual discount rate applied to future benefits (>= 0).
    pub discount_rate: f64,
    /// Annual population growth rate (any sign).
    pub population_growth_rate: f64,
    /// How many years into the future effects are integrated over (> 0).
    pub time_horizon_years: f64,
    /// Present-day population size (> 0).
    pub current_population: f64,
    /// Optional population cap, expressed as a multiple of the current
    /// population (>= 0). Absent means uncapped.
    #[serde(default)]
    pub population_limit: Option<f64>,
    /// QALYs that make up one statistical life (> 0).
    pub years_per_life: f64,
    /// Welfare weight for simple animals, relative to human = 1.0.
    pub simple_animal_weight: f64,
    /// Welfare weight for medium-complexity animals.
    pub medium_animal_weight: f64,
    /// Welfare weight for complex animals.
    pub complex_animal_weight: f64,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            discount_rate: 0.02,
            population_growth_rate: 0.01,
            time_horizon_years: 100.0,
            current_population: 8.1e9,
            population_limit: Some(1.25),
            years_per_life: 70.0,
            simple_animal_weight: 0.002,
            medium_animal_weight: 0.02,
            complex_animal_weight: 0.2,
        }
    }
}

/// Which population an effect benefits.
///
/// A closed enumeration so the weight lookup is exhaustive; an unknown tag
/// fails at deserialization instead of probing a dictionary at runtime.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TargetPopulation {
    #[default]
    Human,
    SimpleAnimal,
    MediumAnimal,
    ComplexAnimal,
}

impl TargetPopulation {
    /// Welfare weight multiplier for this population. Human is always 1.0.
    pub fn weight(&self, params: &GlobalParameters) -> f64 {
        match self {
            TargetPopulation::Human => 1.0,
            TargetPopulation::SimpleAnimal => params.simple_animal_weight,
            TargetPopulation::MediumAnimal => params.medium_animal_weight,
            TargetPopulation::ComplexAnimal => params.complex_animal_weight,
        }
    }
}

// ============================================================================
// Effects and Categories
// ============================================================================

/// The benefit-unit specification of an effect: exactly one of the two
/// causal pathways.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BenefitSpec {
    /// Direct pathway: dollars per quality-adjusted life year (nonzero;
    /// negative denotes harm).
    CostPerQaly { cost_per_qaly: f64 },
    /// Probabilistic pathway: dollars buy micro-probabilities of an outcome
    /// that changes QALYs for a fraction of the (growing, capped)
    /// population.
    Microprobability {
        cost_per_microprobability: f64,
        population_fraction_affected: f64,
        qaly_improvement_per_year: f64,
    },
}

/// A single time-windowed causal pathway attached to a category (or, after
/// recipient adjustment, to a recipient-category pairing).
///
/// The effect is active over `[start_time, start_time + window_length)`
/// years from now.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub effect_id: String,
    pub start_time: f64,
    pub window_length: f64,
    #[serde(flatten)]
    pub benefit: BenefitSpec,
    #[serde(default)]
    pub target_population: TargetPopulation,
}

/// A cause area with a non-empty list of effects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub effects: Vec<Effect>,
}

// ============================================================================
// Recipient Overrides
// ============================================================================

/// Numeric fields of an effect that a recipient adjustment may touch.
/// Absent fields are left alone.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EffectPatch {
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub window_length: Option<f64>,
    #[serde(default)]
    pub cost_per_qaly: Option<f64>,
    #[serde(default)]
    pub cost_per_microprobability: Option<f64>,
    #[serde(default)]
    pub population_fraction_affected: Option<f64>,
    #[serde(default)]
    pub qaly_improvement_per_year: Option<f64>,
}

/// How an adjustment is applied to the addressed effect.
#[derive(Clone, Copy, Debug)]
pub enum AdjustmentMode<'a> {
    /// Present patch fields replace the effect's values.
    Replace(&'a EffectPatch),
    /// Present patch fields scale the effect's values.
    Scale(&'a EffectPatch),
}

/// A recipient-level modification of one category effect, addressed by
/// `effect_id`. Exactly one of `overrides` / `multipliers` must be present;
/// `mode()` surfaces anything else as a data error.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EffectAdjustment {
    pub effect_id: String,
    #[serde(default)]
    pub overrides: Option<EffectPatch>,
    #[serde(default)]
    pub multipliers: Option<EffectPatch>,
}

impl EffectAdjustment {
    /// Resolve which form this adjustment takes.
    pub fn mode(&self) -> crate::Result<AdjustmentMode<'_>> {
        match (&self.overrides, &self.multipliers) {
            (Some(patch), None) => Ok(AdjustmentMode::Replace(patch)),
            (None, Some(patch)) => Ok(AdjustmentMode::Scale(patch)),
            (Some(_), Some(_)) => Err(crate::Error::Domain {
                field: "overrides/multipliers".into(),
                context: format!("effect adjustment '{}'", self.effect_id),
                message: "both forms supplied; exactly one is honored".into(),
            }),
            (None, None) => Err(crate::Error::MissingField {
                field: "overrides/multipliers".into(),
                context: format!("effect adjustment '{}'", self.effect_id),
            }),
        }
    }
}

// ============================================================================
// Recipients, Donors, Donations
// ============================================================================

/// A recipient's stake in one category: the fraction of its work in that
/// cause (fractions sum to 1 across the recipient) plus optional effect
/// adjustments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipientCategory {
    pub fraction: f64,
    #[serde(default)]
    pub effects: Option<Vec<EffectAdjustment>>,
}

/// A donation-receiving entity, mapped over the categories it works in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: String,
    pub name: String,
    pub categories: HashMap<String, RecipientCategory>,
}

/// A donor in the ledger. `total_donated` may exceed the sum of itemized
/// donations, representing known-but-unitemized giving.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: String,
    pub name: String,
    pub net_worth: f64,
    #[serde(default)]
    pub total_donated: Option<f64>,
}

/// One entry in the donation ledger. `credit` is the fraction of the gift
/// attributable to this donor when it was jointly funded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub donor_id: String,
    pub recipient_id: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub credit: Option<f64>,
}

impl Donation {
    /// Dollars attributable to this donor: `amount * credit`, with full
    /// credit when none is recorded.
    pub fn credited_amount(&self) -> f64 {
        self.amount * self.credit.unwrap_or(1.0)
    }
}

// ============================================================================
// Dataset
// ============================================================================

/// The full inbound data contract: everything the engine needs for one
/// calculation pass, produced by an external data-compilation step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub global_parameters: GlobalParameters,
    pub categories: HashMap<String, Category>,
    #[serde(default)]
    pub recipients: HashMap<String, Recipient>,
    #[serde(default)]
    pub donors: HashMap<String, Donor>,
    #[serde(default)]
    pub donations: Vec<Donation>,
}
