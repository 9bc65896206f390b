//! Effects calculation engine.
//!
//! Reduces a list of effects to one scalar cost per life under the current
//! global parameters. Each effect contributes lives-per-dollar
//! independently and contributions sum; the overall figure is normalized
//! through a fixed notional spend so categories with one effect and with
//! many stay comparable.
//!
//! Sign convention: a harmful effect yields negative lives-per-dollar and
//! propagates to a negative cost per life. That is a result, not an error.
//! An exact zero, on the other hand, is never usable and fails loudly.

use crate::discount::{capped_growth_integral, discounted_window_value};
use crate::types::*;
use crate::validate::crash_instead_of_fallback;
use crate::{Error, Result};

/// Notional spend used to normalize cost-per-life across effect lists.
pub const SIMULATION_SPEND: f64 = 1_000_000.0;

/// One microprobability is a 1-in-a-million chance.
const MICROPROBABILITY: f64 = 1e-6;

/// The effect's active window clipped to `[0, time_horizon_years]`.
fn clipped_window(effect: &Effect, params: &GlobalParameters) -> (f64, f64) {
    let start = effect.start_time.max(0.0);
    let end = (effect.start_time + effect.window_length).min(params.time_horizon_years);
    (start, end)
}

/// Statistical lives produced per dollar by one effect.
///
/// A window entirely outside the time horizon contributes 0.
pub fn lives_per_dollar(effect: &Effect, params: &GlobalParameters) -> Result<f64> {
    let (start, end) = clipped_window(effect, params);
    if start >= end {
        tracing::debug!(
            "Effect '{}' window [{}, {}) lies outside the horizon, contributes nothing",
            effect.effect_id,
            effect.start_time,
            effect.start_time + effect.window_length
        );
        return Ok(0.0);
    }

    let weight = effect.target_population.weight(params);
    let qalys_per_dollar = match &effect.benefit {
        BenefitSpec::CostPerQaly { cost_per_qaly } => {
            if *cost_per_qaly == 0.0 {
                return crash_instead_of_fallback(format!(
                    "effect '{}' has a zero costPerQaly",
                    effect.effect_id
                ));
            }
            (1.0 / cost_per_qaly) * discounted_window_value(params.discount_rate, start, end)
        }
        BenefitSpec::Microprobability {
            cost_per_microprobability,
            population_fraction_affected,
            qaly_improvement_per_year,
        } => {
            if *cost_per_microprobability == 0.0 {
                return crash_instead_of_fallback(format!(
                    "effect '{}' has a zero costPerMicroprobability",
                    effect.effect_id
                ));
            }
            (MICROPROBABILITY / cost_per_microprobability)
                * population_fraction_affected
                * qaly_improvement_per_year
                * params.current_population
                * capped_growth_integral(params, start, end)
        }
    };

    Ok(qalys_per_dollar * weight / params.years_per_life)
}

/// Reduce an effect list to a single cost-per-life figure.
///
/// Simulates spending [`SIMULATION_SPEND`] dollars across the effects and
/// inverts the lives produced. `context` names the owner (category or
/// recipient-category) in failure messages.
pub fn cost_per_life_for_effects(
    effects: &[Effect],
    params: &GlobalParameters,
    context: &str,
) -> Result<f64> {
    if effects.is_empty() {
        return Err(Error::Calculation(format!("{context} has no effects")));
    }

    let mut lives = 0.0;
    for effect in effects {
        lives += lives_per_dollar(effect, params)? * SIMULATION_SPEND;
    }

    if lives == 0.0 {
        return crash_instead_of_fallback(format!(
            "{context} produced exactly zero lives for a ${SIMULATION_SPEND} spend"
        ));
    }
    let cost_per_life = SIMULATION_SPEND / lives;
    if cost_per_life == 0.0 {
        return crash_instead_of_fallback(format!(
            "{context} evaluated to a zero cost per life"
        ));
    }
    Ok(cost_per_life)
}

/// Apply a recipient's effect adjustments to a category's effect list,
/// returning the adjusted copy.
///
/// Each adjustment must address an effect present in the list; a `Replace`
/// patch sets the fields it names, a `Scale` patch multiplies them. A patch
/// field belonging to the other benefit pathway is a data mismatch.
pub fn apply_adjustments(
    effects: &[Effect],
    adjustments: &[EffectAdjustment],
    context: &str,
) -> Result<Vec<Effect>> {
    let mut adjusted = effects.to_vec();
    for adjustment in adjustments {
        let effect = adjusted
            .iter_mut()
            .find(|e| e.effect_id == adjustment.effect_id)
            .ok_or_else(|| Error::MissingReference {
                kind: "effect",
                id: adjustment.effect_id.clone(),
                context: context.to_string(),
            })?;
        match adjustment.mode()? {
            AdjustmentMode::Replace(patch) => apply_patch(effect, patch, false, context)?,
            AdjustmentMode::Scale(patch) => apply_patch(effect, patch, true, context)?,
        }
    }
    Ok(adjusted)
}

fn apply_patch(effect: &mut Effect, patch: &EffectPatch, scale: bool, context: &str) -> Result<()> {
    let apply = |slot: &mut f64, value: f64| {
        if scale {
            *slot *= value;
        } else {
            *slot = value;
        }
    };

    if let Some(value) = patch.start_time {
        apply(&mut effect.start_time, value);
    }
    if let Some(value) = patch.window_length {
        apply(&mut effect.window_length, value);
    }

    let effect_id = effect.effect_id.clone();
    let mismatch = move |field: &str| {
        Err(Error::Domain {
            field: field.to_string(),
            context: context.to_string(),
            message: format!("patch targets a field effect '{effect_id}' does not have"),
        })
    };

    match &mut effect.benefit {
        BenefitSpec::CostPerQaly { cost_per_qaly } => {
            if let Some(value) = patch.cost_per_qaly {
                apply(cost_per_qaly, value);
            }
            if patch.cost_per_microprobability.is_some()
                || patch.population_fraction_affected.is_some()
                || patch.qaly_improvement_per_year.is_some()
            {
                return mismatch("costPerMicroprobability");
            }
        }
        BenefitSpec::Microprobability {
            cost_per_microprobability,
            population_fraction_affected,
            qaly_improvement_per_year,
        } => {
            if let Some(value) = patch.cost_per_microprobability {
                apply(cost_per_microprobability, value);
            }
            if let Some(value) = patch.population_fraction_affected {
                apply(population_fraction_affected, value);
            }
            if let Some(value) = patch.qaly_improvement_per_year {
                apply(qaly_improvement_per_year, value);
            }
            if patch.cost_per_qaly.is_some() {
                return mismatch("costPerQaly");
            }
        }
    }
    Ok(())
}
