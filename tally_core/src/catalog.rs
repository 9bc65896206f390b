//! Built-in default catalog of cause categories.
//!
//! Ships the baseline categories and global parameters the engine runs on
//! when the host application supplies no dataset of its own. Real
//! deployments load a compiled dataset instead; the defaults here keep the
//! engine usable stand-alone and give tests a realistic fixture.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Dataset> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog.
pub fn default_catalog() -> &'static Dataset {
    &DEFAULT_CATALOG
}

/// Build the default catalog from scratch.
///
/// Prefer [`default_catalog`] outside tests; this is retained for test
/// fixtures that want to mutate a private copy.
pub fn build_default_catalog() -> Dataset {
    let mut categories = HashMap::new();

    categories.insert(
        "global-health".into(),
        Category {
            id: "global-health".into(),
            name: "Global Health".into(),
            effects: vec![Effect {
                effect_id: "direct-treatment".into(),
                start_time: 0.0,
                window_length: 20.0,
                benefit: BenefitSpec::CostPerQaly { cost_per_qaly: 40.0 },
                target_population: TargetPopulation::Human,
            }],
        },
    );

    categories.insert(
        "animal-welfare".into(),
        Category {
            id: "animal-welfare".into(),
            name: "Animal Welfare".into(),
            effects: vec![Effect {
                effect_id: "welfare-reform".into(),
                start_time: 0.0,
                window_length: 10.0,
                benefit: BenefitSpec::CostPerQaly { cost_per_qaly: 2.5 },
                target_population: TargetPopulation::MediumAnimal,
            }],
        },
    );

    categories.insert(
        "catastrophic-risk".into(),
        Category {
            id: "catastrophic-risk".into(),
            name: "Catastrophic Risk Reduction".into(),
            effects: vec![Effect {
                effect_id: "risk-reduction".into(),
                start_time: 0.0,
                window_length: 100.0,
                benefit: BenefitSpec::Microprobability {
                    cost_per_microprobability: 250_000.0,
                    population_fraction_affected: 1.0,
                    qaly_improvement_per_year: 1.0,
                },
                target_population: TargetPopulation::Human,
            }],
        },
    );

    categories.insert(
        "economic-growth".into(),
        Category {
            id: "economic-growth".into(),
            name: "Economic Growth".into(),
            effects: vec![
                Effect {
                    effect_id: "income-gains".into(),
                    start_time: 2.0,
                    window_length: 28.0,
                    benefit: BenefitSpec::CostPerQaly { cost_per_qaly: 120.0 },
                    target_population: TargetPopulation::Human,
                },
                // crowding-out of local markets, a net drag on the same window
                Effect {
                    effect_id: "displacement".into(),
                    start_time: 2.0,
                    window_length: 28.0,
                    benefit: BenefitSpec::CostPerQaly {
                        cost_per_qaly: -1500.0,
                    },
                    target_population: TargetPopulation::Human,
                },
            ],
        },
    );

    Dataset {
        global_parameters: GlobalParameters::default(),
        categories,
        recipients: HashMap::new(),
        donors: HashMap::new(),
        donations: vec![],
    }
}
