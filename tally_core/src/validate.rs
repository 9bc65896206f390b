//! Data integrity checks for the impact model.
//!
//! The engine crashes instead of silently computing wrong answers: every
//! check here either returns the value unchanged or fails with a message
//! naming the field and where it came from. Nothing substitutes a default.
//!
//! Layers:
//! - assertion primitives (`require_*`) used throughout the engine,
//! - structural validators for each entity,
//! - referential validators tying ids back to their tables,
//! - `validate_dataset`, the startup pass that aggregates every failure
//!   into one composite error.

use crate::types::*;
use crate::{Error, Result};
use std::collections::HashSet;

// ============================================================================
// Assertion primitives
// ============================================================================

/// Reject absence. Falsy-but-defined values (0, empty string, empty list)
/// pass untouched.
pub fn require_present<T>(value: Option<T>, field: &str, context: &str) -> Result<T> {
    value.ok_or_else(|| Error::MissingField {
        field: field.to_string(),
        context: context.to_string(),
    })
}

/// Reject NaN and infinities; any finite number passes.
pub fn require_number(value: f64, field: &str, context: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NotANumber {
            field: field.to_string(),
            context: context.to_string(),
            value,
        })
    }
}

/// A finite number strictly greater than zero.
pub fn require_positive(value: f64, field: &str, context: &str) -> Result<f64> {
    let value = require_number(value, field, context)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(domain(field, context, format!("{value} is not > 0")))
    }
}

/// A finite number greater than or equal to zero.
pub fn require_non_negative(value: f64, field: &str, context: &str) -> Result<f64> {
    let value = require_number(value, field, context)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(domain(field, context, format!("{value} is not >= 0")))
    }
}

/// A finite number other than zero; sign is free (negative denotes harm).
pub fn require_nonzero(value: f64, field: &str, context: &str) -> Result<f64> {
    let value = require_number(value, field, context)?;
    if value != 0.0 {
        Ok(value)
    } else {
        Err(domain(field, context, "zero is not a usable value".into()))
    }
}

/// A finite number in `(0, 1]`, used for category fractions and credits.
pub fn require_fraction(value: f64, field: &str, context: &str) -> Result<f64> {
    let value = require_number(value, field, context)?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(domain(field, context, format!("{value} is not in (0, 1]")))
    }
}

/// A slice with at least one element.
pub fn require_non_empty<'a, T>(values: &'a [T], field: &str, context: &str) -> Result<&'a [T]> {
    if values.is_empty() {
        Err(domain(field, context, "must not be empty".into()))
    } else {
        Ok(values)
    }
}

/// Unconditional failure, used at every point where legacy logic might have
/// substituted a fallback value (0, infinity, skip) instead of surfacing a
/// defect.
pub fn crash_instead_of_fallback<T>(message: impl Into<String>) -> Result<T> {
    Err(Error::NoFallback(message.into()))
}

fn domain(field: &str, context: &str, message: String) -> Error {
    Error::Domain {
        field: field.to_string(),
        context: context.to_string(),
        message,
    }
}

// ============================================================================
// Structural validators
// ============================================================================

/// Validate one effect's window and benefit specification.
pub fn validate_effect(effect: &Effect, context: &str) -> Result<()> {
    if effect.effect_id.is_empty() {
        return Err(Error::MissingField {
            field: "effectId".into(),
            context: context.to_string(),
        });
    }
    let context = format!("{context}, effect '{}'", effect.effect_id);
    require_non_negative(effect.start_time, "startTime", &context)?;
    require_positive(effect.window_length, "windowLength", &context)?;

    match &effect.benefit {
        BenefitSpec::CostPerQaly { cost_per_qaly } => {
            require_nonzero(*cost_per_qaly, "costPerQaly", &context)?;
        }
        BenefitSpec::Microprobability {
            cost_per_microprobability,
            population_fraction_affected,
            qaly_improvement_per_year,
        } => {
            require_nonzero(
                *cost_per_microprobability,
                "costPerMicroprobability",
                &context,
            )?;
            require_positive(
                *population_fraction_affected,
                "populationFractionAffected",
                &context,
            )?;
            require_nonzero(*qaly_improvement_per_year, "qalyImprovementPerYear", &context)?;
        }
    }
    Ok(())
}

/// Validate a category: non-empty effects, unique effect ids, each effect
/// individually valid.
pub fn validate_category(category: &Category) -> Result<()> {
    let context = format!("category '{}'", category.id);
    if category.name.is_empty() {
        return Err(Error::MissingField {
            field: "name".into(),
            context,
        });
    }
    require_non_empty(&category.effects, "effects", &context)?;

    let mut seen = HashSet::new();
    for effect in &category.effects {
        validate_effect(effect, &context)?;
        if !seen.insert(effect.effect_id.as_str()) {
            return Err(domain(
                "effectId",
                &context,
                format!("duplicate effect id '{}'", effect.effect_id),
            ));
        }
    }
    Ok(())
}

fn validate_patch_numbers(patch: &EffectPatch, context: &str) -> Result<()> {
    let fields = [
        (patch.start_time, "startTime"),
        (patch.window_length, "windowLength"),
        (patch.cost_per_qaly, "costPerQaly"),
        (patch.cost_per_microprobability, "costPerMicroprobability"),
        (patch.population_fraction_affected, "populationFractionAffected"),
        (patch.qaly_improvement_per_year, "qalyImprovementPerYear"),
    ];
    for (value, field) in fields {
        if let Some(value) = value {
            require_number(value, field, context)?;
        }
    }
    Ok(())
}

fn validate_adjustment(adjustment: &EffectAdjustment, context: &str) -> Result<()> {
    if adjustment.effect_id.is_empty() {
        return Err(Error::MissingField {
            field: "effectId".into(),
            context: context.to_string(),
        });
    }
    let context = format!("{context}, adjustment of effect '{}'", adjustment.effect_id);
    match adjustment.mode()? {
        AdjustmentMode::Replace(patch) => {
            validate_patch_numbers(patch, &context)?;
            // replacement values must respect the same domains as the
            // fields they replace
            if let Some(value) = patch.start_time {
                require_non_negative(value, "startTime", &context)?;
            }
            if let Some(value) = patch.window_length {
                require_positive(value, "windowLength", &context)?;
            }
            if let Some(value) = patch.cost_per_qaly {
                require_nonzero(value, "costPerQaly", &context)?;
            }
            if let Some(value) = patch.cost_per_microprobability {
                require_nonzero(value, "costPerMicroprobability", &context)?;
            }
            if let Some(value) = patch.population_fraction_affected {
                require_positive(value, "populationFractionAffected", &context)?;
            }
            if let Some(value) = patch.qaly_improvement_per_year {
                require_nonzero(value, "qalyImprovementPerYear", &context)?;
            }
        }
        AdjustmentMode::Scale(patch) => {
            validate_patch_numbers(patch, &context)?;
        }
    }
    Ok(())
}

/// Validate a recipient: fraction domains, fractions summing to 1 within
/// tolerance, and well-formed effect adjustments.
pub fn validate_recipient(recipient: &Recipient) -> Result<()> {
    let context = format!("recipient '{}'", recipient.id);
    if recipient.categories.is_empty() {
        return Err(domain("categories", &context, "must not be empty".into()));
    }

    let mut total = 0.0;
    for (category_id, rc) in &recipient.categories {
        let category_context = format!("{context}, category '{category_id}'");
        total += require_fraction(rc.fraction, "fraction", &category_context)?;
        if let Some(adjustments) = &rc.effects {
            for adjustment in adjustments {
                validate_adjustment(adjustment, &category_context)?;
            }
        }
    }
    if (total - 1.0).abs() > WEIGHT_NORMALIZATION_TOLERANCE {
        return Err(domain(
            "fraction",
            &context,
            format!("category fractions sum to {total}, expected 1"),
        ));
    }
    Ok(())
}

/// Validate global parameters against their documented domains.
pub fn validate_global_parameters(params: &GlobalParameters) -> Result<()> {
    let context = "global parameters";
    require_non_negative(params.discount_rate, "discountRate", context)?;
    require_number(params.population_growth_rate, "populationGrowthRate", context)?;
    require_positive(params.time_horizon_years, "timeHorizonYears", context)?;
    require_positive(params.current_population, "currentPopulation", context)?;
    if let Some(limit) = params.population_limit {
        require_non_negative(limit, "populationLimit", context)?;
    }
    require_positive(params.years_per_life, "yearsPerLife", context)?;
    require_non_negative(params.simple_animal_weight, "simpleAnimalWeight", context)?;
    require_non_negative(params.medium_animal_weight, "mediumAnimalWeight", context)?;
    require_non_negative(params.complex_animal_weight, "complexAnimalWeight", context)?;
    Ok(())
}

/// Validate a donor record.
pub fn validate_donor(donor: &Donor) -> Result<()> {
    let context = format!("donor '{}'", donor.id);
    require_positive(donor.net_worth, "netWorth", &context)?;
    if let Some(total) = donor.total_donated {
        require_positive(total, "totalDonated", &context)?;
    }
    Ok(())
}

/// Validate one ledger entry. `index` locates it in failure messages.
pub fn validate_donation(donation: &Donation, index: usize) -> Result<()> {
    let context = format!("donation #{index}");
    require_positive(donation.amount, "amount", &context)?;
    if let Some(credit) = donation.credit {
        require_fraction(credit, "credit", &context)?;
    }
    Ok(())
}

// ============================================================================
// Startup pass
// ============================================================================

/// Run every structural and referential validator over the loaded dataset.
///
/// Collects all failures and reports them as one composite error so a single
/// run surfaces everything wrong with the data. Must pass before any
/// calculation is trusted.
pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    fn check(errors: &mut Vec<String>, result: Result<()>) {
        if let Err(e) = result {
            errors.push(e.to_string());
        }
    }

    let mut errors = Vec::new();

    check(&mut errors, validate_global_parameters(&dataset.global_parameters));

    for (key, category) in &dataset.categories {
        if key != &category.id {
            errors.push(format!(
                "category key '{key}' doesn't match category.id '{}'",
                category.id
            ));
        }
        check(&mut errors, validate_category(category));
    }

    for (key, recipient) in &dataset.recipients {
        if key != &recipient.id {
            errors.push(format!(
                "recipient key '{key}' doesn't match recipient.id '{}'",
                recipient.id
            ));
        }
        check(&mut errors, validate_recipient(recipient));
        check(&mut errors, validate_recipient_references(recipient, dataset));
    }

    for (key, donor) in &dataset.donors {
        if key != &donor.id {
            errors.push(format!(
                "donor key '{key}' doesn't match donor.id '{}'",
                donor.id
            ));
        }
        check(&mut errors, validate_donor(donor));
    }

    for (index, donation) in dataset.donations.iter().enumerate() {
        check(&mut errors, validate_donation(donation, index));
        if !dataset.donors.contains_key(&donation.donor_id) {
            errors.push(
                Error::MissingReference {
                    kind: "donor",
                    id: donation.donor_id.clone(),
                    context: format!("donation #{index}"),
                }
                .to_string(),
            );
        }
        if !dataset.recipients.contains_key(&donation.recipient_id) {
            errors.push(
                Error::MissingReference {
                    kind: "recipient",
                    id: donation.recipient_id.clone(),
                    context: format!("donation #{index}"),
                }
                .to_string(),
            );
        }
    }

    if errors.is_empty() {
        tracing::info!(
            "Dataset validated: {} categories, {} recipients, {} donors, {} donations",
            dataset.categories.len(),
            dataset.recipients.len(),
            dataset.donors.len(),
            dataset.donations.len()
        );
        Ok(())
    } else {
        Err(Error::DatasetInvalid(errors.join("\n")))
    }
}

/// Confirm every category id a recipient references exists, and that every
/// effect adjustment addresses an effect the category actually declares.
fn validate_recipient_references(recipient: &Recipient, dataset: &Dataset) -> Result<()> {
    for (category_id, rc) in &recipient.categories {
        let Some(category) = dataset.categories.get(category_id) else {
            return Err(Error::MissingReference {
                kind: "category",
                id: category_id.clone(),
                context: format!("recipient '{}'", recipient.id),
            });
        };
        if let Some(adjustments) = &rc.effects {
            for adjustment in adjustments {
                if !category
                    .effects
                    .iter()
                    .any(|e| e.effect_id == adjustment.effect_id)
                {
                    return Err(Error::MissingReference {
                        kind: "effect",
                        id: adjustment.effect_id.clone(),
                        context: format!(
                            "recipient '{}', category '{}'",
                            recipient.id, category.id
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}
