//! Combined assumptions: baseline data merged with user overrides.
//!
//! A [`CombinedAssumptions`] value is the single source of truth for one
//! calculation pass. It is built once from the baseline dataset plus an
//! optional override tree, queried repeatedly, and thrown away when the
//! overrides change; nothing here mutates a snapshot in place.
//!
//! The builder performs no validation. Baseline integrity is the startup
//! validator's job and override integrity is the override editor's; the
//! queries still fail loudly on anything unusable they encounter.

use crate::effects::{apply_adjustments, cost_per_life_for_effects, SIMULATION_SPEND};
use crate::types::*;
use crate::validate::crash_instead_of_fallback;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Override tree
// ============================================================================

/// Field-by-field overrides for [`GlobalParameters`]; absent fields keep
/// the baseline value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalParameterOverrides {
    #[serde(default)]
    pub discount_rate: Option<f64>,
    #[serde(default)]
    pub population_growth_rate: Option<f64>,
    #[serde(default)]
    pub time_horizon_years: Option<f64>,
    #[serde(default)]
    pub current_population: Option<f64>,
    #[serde(default)]
    pub population_limit: Option<f64>,
    #[serde(default)]
    pub years_per_life: Option<f64>,
    #[serde(default)]
    pub simple_animal_weight: Option<f64>,
    #[serde(default)]
    pub medium_animal_weight: Option<f64>,
    #[serde(default)]
    pub complex_animal_weight: Option<f64>,
}

/// A category override: the effects list replaces the baseline wholesale.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOverride {
    pub effects: Vec<Effect>,
}

/// A recipient-category override: the adjustment list replaces whatever the
/// baseline recipient carried for that category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipientCategoryOverride {
    pub effects: Vec<EffectAdjustment>,
}

/// A recipient override, keyed by category id.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipientOverride {
    pub categories: HashMap<String, RecipientCategoryOverride>,
}

/// The full user-supplied override tree. Owned by the caller (typically
/// loaded from whatever store the host application persists edits in) and
/// passed in explicitly; the engine holds no state of its own.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionOverrides {
    #[serde(default)]
    pub global_parameters: Option<GlobalParameterOverrides>,
    #[serde(default)]
    pub categories: HashMap<String, CategoryOverride>,
    #[serde(default)]
    pub recipients: HashMap<String, RecipientOverride>,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Baseline data with overrides folded in; immutable for its lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedAssumptions {
    pub global_parameters: GlobalParameters,
    pub categories: HashMap<String, Category>,
    pub recipients: HashMap<String, Recipient>,
}

impl CombinedAssumptions {
    /// Merge the baseline with an optional override tree.
    ///
    /// Global parameters merge field by field; a category or
    /// recipient-category effects override replaces the baseline list
    /// outright. Overrides addressing unknown ids are logged and skipped.
    pub fn build(baseline: &Dataset, overrides: Option<&AssumptionOverrides>) -> Self {
        let mut snapshot = Self {
            global_parameters: baseline.global_parameters.clone(),
            categories: baseline.categories.clone(),
            recipients: baseline.recipients.clone(),
        };

        let Some(tree) = overrides else {
            return snapshot;
        };

        if let Some(gp) = &tree.global_parameters {
            merge_global_parameters(&mut snapshot.global_parameters, gp);
        }

        for (id, category_override) in &tree.categories {
            match snapshot.categories.get_mut(id) {
                Some(category) => {
                    category.effects = category_override.effects.clone();
                }
                None => tracing::warn!("Override for unknown category '{}' ignored", id),
            }
        }

        for (id, recipient_override) in &tree.recipients {
            let Some(recipient) = snapshot.recipients.get_mut(id) else {
                tracing::warn!("Override for unknown recipient '{}' ignored", id);
                continue;
            };
            for (category_id, rc_override) in &recipient_override.categories {
                match recipient.categories.get_mut(category_id) {
                    Some(rc) => {
                        rc.effects = Some(rc_override.effects.clone());
                    }
                    None => tracing::warn!(
                        "Override for recipient '{}' names category '{}' it has no stake in, ignored",
                        id,
                        category_id
                    ),
                }
            }
        }

        snapshot
    }

    /// Cost per life of donating flatly to a category.
    pub fn cost_per_life_for_category(&self, category_id: &str) -> Result<f64> {
        let category = self.categories.get(category_id).ok_or_else(|| Error::Lookup {
            kind: "category",
            id: category_id.to_string(),
        })?;
        cost_per_life_for_effects(
            &category.effects,
            &self.global_parameters,
            &format!("category '{}'", category.id),
        )
    }

    /// Cost per life for one of a recipient's categories, with the
    /// recipient's effect adjustments applied.
    pub fn cost_per_life_for_recipient_category(
        &self,
        recipient_id: &str,
        category_id: &str,
    ) -> Result<f64> {
        let recipient = self.lookup_recipient(recipient_id)?;
        let rc = recipient
            .categories
            .get(category_id)
            .ok_or_else(|| Error::MissingReference {
                kind: "category",
                id: category_id.to_string(),
                context: format!("recipient '{}'", recipient.id),
            })?;
        self.recipient_category_cost(recipient, category_id, rc)
    }

    /// Cost per life of donating to a recipient: the weighted harmonic
    /// blend of its categories' figures.
    ///
    /// Simulated lives accumulate per category at each category's fraction
    /// of the notional spend; the blend fails if the fractions do not sum
    /// to 1 within tolerance or if the total cancels to zero lives.
    pub fn cost_per_life_for_recipient(&self, recipient_id: &str) -> Result<f64> {
        let recipient = self.lookup_recipient(recipient_id)?;

        let mut total_weight = 0.0;
        let mut lives = 0.0;
        for (category_id, rc) in &recipient.categories {
            let cost_per_life = self.recipient_category_cost(recipient, category_id, rc)?;
            lives += SIMULATION_SPEND * rc.fraction / cost_per_life;
            total_weight += rc.fraction;
        }

        if total_weight == 0.0 {
            return crash_instead_of_fallback(format!(
                "recipient '{}' has zero total category weight",
                recipient.id
            ));
        }
        if (total_weight - 1.0).abs() > WEIGHT_NORMALIZATION_TOLERANCE {
            return Err(Error::Domain {
                field: "fraction".into(),
                context: format!("recipient '{}'", recipient.id),
                message: format!("category fractions sum to {total_weight}, expected 1"),
            });
        }
        if lives == 0.0 {
            return crash_instead_of_fallback(format!(
                "recipient '{}' produced exactly zero lives across its categories",
                recipient.id
            ));
        }
        Ok(SIMULATION_SPEND / lives)
    }

    /// Lives saved by one ledger entry, at the donor's credited share.
    pub fn lives_saved_for_donation(&self, donation: &Donation) -> Result<f64> {
        let cost_per_life = self.cost_per_life_for_recipient(&donation.recipient_id)?;
        Ok(donation.credited_amount() / cost_per_life)
    }

    /// Lives saved by a flat donation of `amount` to a category.
    pub fn lives_saved_for_amount(&self, category_id: &str, amount: f64) -> Result<f64> {
        Ok(amount / self.cost_per_life_for_category(category_id)?)
    }

    fn lookup_recipient(&self, recipient_id: &str) -> Result<&Recipient> {
        self.recipients.get(recipient_id).ok_or_else(|| Error::Lookup {
            kind: "recipient",
            id: recipient_id.to_string(),
        })
    }

    fn recipient_category_cost(
        &self,
        recipient: &Recipient,
        category_id: &str,
        rc: &RecipientCategory,
    ) -> Result<f64> {
        let category = self.categories.get(category_id).ok_or_else(|| {
            Error::MissingReference {
                kind: "category",
                id: category_id.to_string(),
                context: format!("recipient '{}'", recipient.id),
            }
        })?;
        let context = format!("recipient '{}', category '{}'", recipient.id, category.id);
        match &rc.effects {
            Some(adjustments) => {
                let adjusted = apply_adjustments(&category.effects, adjustments, &context)?;
                cost_per_life_for_effects(&adjusted, &self.global_parameters, &context)
            }
            None => cost_per_life_for_effects(
                &category.effects,
                &self.global_parameters,
                &context,
            ),
        }
    }
}

fn merge_global_parameters(params: &mut GlobalParameters, overrides: &GlobalParameterOverrides) {
    if let Some(value) = overrides.discount_rate {
        params.discount_rate = value;
    }
    if let Some(value) = overrides.population_growth_rate {
        params.population_growth_rate = value;
    }
    if let Some(value) = overrides.time_horizon_years {
        params.time_horizon_years = value;
    }
    if let Some(value) = overrides.current_population {
        params.current_population = value;
    }
    if let Some(value) = overrides.population_limit {
        params.population_limit = Some(value);
    }
    if let Some(value) = overrides.years_per_life {
        params.years_per_life = value;
    }
    if let Some(value) = overrides.simple_animal_weight {
        params.simple_animal_weight = value;
    }
    if let Some(value) = overrides.medium_animal_weight {
        params.medium_animal_weight = value;
    }
    if let Some(value) = overrides.complex_animal_weight {
        params.complex_animal_weight = value;
    }
}
