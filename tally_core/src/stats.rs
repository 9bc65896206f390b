//! Aggregate statistics over the donation ledger.
//!
//! Rolls per-donation figures up into donor, recipient, and category
//! totals for display and ranking. No new math lives here; every number is
//! repeated application of the snapshot queries, and the rollups stay
//! additively consistent with the per-donation figures they are built from.

use crate::assumptions::CombinedAssumptions;
use crate::types::*;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Per-donor totals and ranking figures.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorStatistics {
    pub donor_id: String,
    pub name: String,
    pub net_worth: f64,
    /// Credited dollars across itemized ledger entries.
    pub itemized_donated: f64,
    /// Declared total where one exists and exceeds the itemized sum,
    /// otherwise the itemized sum.
    pub total_donated: f64,
    pub lives_saved: f64,
    /// `total_donated / lives_saved`; the IEEE quotient (infinity at zero
    /// lives) is reported as-is and never fed back into the engine.
    pub cost_per_life: f64,
}

/// Per-recipient totals with category attribution.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientStatistics {
    pub recipient_id: String,
    pub name: String,
    pub total_received: f64,
    pub lives_saved: f64,
    pub cost_per_life: f64,
    /// The category holding the recipient's largest fraction.
    pub primary_category_id: String,
    pub category_breakdown: Vec<CategoryShare>,
}

/// One category's share of a recipient's impact.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category_id: String,
    pub fraction: f64,
    pub lives_saved: f64,
}

/// Per-category totals attributed through recipient fractions.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatistics {
    pub category_id: String,
    pub name: String,
    pub total_received: f64,
    pub lives_saved: f64,
    pub cost_per_life: f64,
}

#[derive(Default)]
struct Tally {
    donated: f64,
    lives: f64,
}

/// Full donor statistics over the ledger.
///
/// Donors whose declared total exceeds their itemized giving are
/// extrapolated for the remainder at their own itemized average cost per
/// life; with nothing itemized there is no average to extrapolate from and
/// the declared total stands on the itemized lives alone. Donors with
/// nothing donated at all are dropped. Sorted by lives saved, descending.
pub fn donor_statistics(
    snapshot: &CombinedAssumptions,
    donors: &HashMap<String, Donor>,
    donations: &[Donation],
) -> Result<Vec<DonorStatistics>> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for (index, donation) in donations.iter().enumerate() {
        if !donors.contains_key(&donation.donor_id) {
            return Err(Error::MissingReference {
                kind: "donor",
                id: donation.donor_id.clone(),
                context: format!("donation #{index}"),
            });
        }
        let lives = snapshot.lives_saved_for_donation(donation)?;
        let tally = tallies.entry(donation.donor_id.as_str()).or_default();
        tally.donated += donation.credited_amount();
        tally.lives += lives;
    }

    let mut stats = Vec::new();
    for donor in donors.values() {
        let tally = tallies.remove(donor.id.as_str()).unwrap_or_default();
        let itemized = tally.donated;
        let mut lives = tally.lives;

        let total_donated = match donor.total_donated {
            Some(declared) => declared.max(itemized),
            None => itemized,
        };
        if total_donated == 0.0 {
            continue;
        }

        let unitemized = total_donated - itemized;
        if unitemized > 0.0 && itemized > 0.0 && lives != 0.0 {
            let average_cost_per_life = itemized / lives;
            let extrapolated = unitemized / average_cost_per_life;
            tracing::debug!(
                "Donor '{}': extrapolating {} unitemized dollars to {} lives",
                donor.id,
                unitemized,
                extrapolated
            );
            lives += extrapolated;
        }

        stats.push(DonorStatistics {
            donor_id: donor.id.clone(),
            name: donor.name.clone(),
            net_worth: donor.net_worth,
            itemized_donated: itemized,
            total_donated,
            lives_saved: lives,
            cost_per_life: total_donated / lives,
        });
    }

    stats.sort_by(|a, b| b.lives_saved.total_cmp(&a.lives_saved));
    Ok(stats)
}

/// Per-recipient rollups for every recipient appearing in the ledger.
/// Sorted by lives saved, descending.
pub fn recipient_statistics(
    snapshot: &CombinedAssumptions,
    donations: &[Donation],
) -> Result<Vec<RecipientStatistics>> {
    let mut received: HashMap<&str, f64> = HashMap::new();
    for donation in donations {
        *received.entry(donation.recipient_id.as_str()).or_default() +=
            donation.credited_amount();
    }

    let mut stats = Vec::new();
    for (recipient_id, total_received) in received {
        let recipient = snapshot
            .recipients
            .get(recipient_id)
            .ok_or_else(|| Error::Lookup {
                kind: "recipient",
                id: recipient_id.to_string(),
            })?;
        let cost_per_life = snapshot.cost_per_life_for_recipient(recipient_id)?;

        let mut breakdown = Vec::new();
        for (category_id, rc) in &recipient.categories {
            let category_cost =
                snapshot.cost_per_life_for_recipient_category(recipient_id, category_id)?;
            breakdown.push(CategoryShare {
                category_id: category_id.clone(),
                fraction: rc.fraction,
                lives_saved: total_received * rc.fraction / category_cost,
            });
        }
        breakdown.sort_by(|a, b| b.fraction.total_cmp(&a.fraction));
        let primary_category_id = breakdown
            .first()
            .map(|share| share.category_id.clone())
            .unwrap_or_default();

        stats.push(RecipientStatistics {
            recipient_id: recipient_id.to_string(),
            name: recipient.name.clone(),
            total_received,
            lives_saved: total_received / cost_per_life,
            cost_per_life,
            primary_category_id,
            category_breakdown: breakdown,
        });
    }

    stats.sort_by(|a, b| b.lives_saved.total_cmp(&a.lives_saved));
    Ok(stats)
}

/// Per-category rollups, attributing each donation through its recipient's
/// category fractions. Sorted by lives saved, descending.
pub fn category_statistics(
    snapshot: &CombinedAssumptions,
    donations: &[Donation],
) -> Result<Vec<CategoryStatistics>> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for donation in donations {
        let recipient = snapshot
            .recipients
            .get(donation.recipient_id.as_str())
            .ok_or_else(|| Error::Lookup {
                kind: "recipient",
                id: donation.recipient_id.clone(),
            })?;
        let credited = donation.credited_amount();
        for (category_id, rc) in &recipient.categories {
            let category_cost = snapshot
                .cost_per_life_for_recipient_category(&donation.recipient_id, category_id)?;
            let share = credited * rc.fraction;
            let tally = tallies.entry(category_id.as_str()).or_default();
            tally.donated += share;
            tally.lives += share / category_cost;
        }
    }

    let mut stats = Vec::new();
    for (category_id, tally) in tallies {
        let category = snapshot
            .categories
            .get(category_id)
            .ok_or_else(|| Error::Lookup {
                kind: "category",
                id: category_id.to_string(),
            })?;
        stats.push(CategoryStatistics {
            category_id: category_id.to_string(),
            name: category.name.clone(),
            total_received: tally.donated,
            lives_saved: tally.lives,
            cost_per_life: tally.donated / tally.lives,
        });
    }

    stats.sort_by(|a, b| b.lives_saved.total_cmp(&a.lives_saved));
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn qaly_effect(id: &str, cost_per_qaly: f64) -> Effect {
        Effect {
            effect_id: id.into(),
            start_time: 0.0,
            window_length: 1.0,
            benefit: BenefitSpec::CostPerQaly { cost_per_qaly },
            target_population: TargetPopulation::Human,
        }
    }

    fn donation(donor: &str, recipient: &str, amount: f64, credit: Option<f64>) -> Donation {
        Donation {
            donor_id: donor.into(),
            recipient_id: recipient.into(),
            amount,
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            credit,
        }
    }

    /// Categories at $4,000/life ("aid") and $8,000/life ("research"); one
    /// recipient wholly in aid, one split evenly.
    fn fixture() -> Dataset {
        let parameters = GlobalParameters {
            discount_rate: 0.0,
            population_growth_rate: 0.0,
            population_limit: None,
            years_per_life: 10.0,
            ..GlobalParameters::default()
        };

        let categories = HashMap::from([
            (
                "aid".to_string(),
                Category {
                    id: "aid".into(),
                    name: "Aid".into(),
                    effects: vec![qaly_effect("aid-direct", 400.0)],
                },
            ),
            (
                "research".to_string(),
                Category {
                    id: "research".into(),
                    name: "Research".into(),
                    effects: vec![qaly_effect("research-direct", 800.0)],
                },
            ),
        ]);

        let recipients = HashMap::from([
            (
                "aid-org".to_string(),
                Recipient {
                    id: "aid-org".into(),
                    name: "Aid Org".into(),
                    categories: HashMap::from([(
                        "aid".into(),
                        RecipientCategory {
                            fraction: 1.0,
                            effects: None,
                        },
                    )]),
                },
            ),
            (
                "mixed-org".to_string(),
                Recipient {
                    id: "mixed-org".into(),
                    name: "Mixed Org".into(),
                    categories: HashMap::from([
                        (
                            "aid".into(),
                            RecipientCategory {
                                fraction: 0.5,
                                effects: None,
                            },
                        ),
                        (
                            "research".into(),
                            RecipientCategory {
                                fraction: 0.5,
                                effects: None,
                            },
                        ),
                    ]),
                },
            ),
        ]);

        let donors = HashMap::from([
            (
                "alice".to_string(),
                Donor {
                    id: "alice".into(),
                    name: "Alice".into(),
                    net_worth: 1e7,
                    total_donated: None,
                },
            ),
            (
                "bob".to_string(),
                Donor {
                    id: "bob".into(),
                    name: "Bob".into(),
                    net_worth: 5e6,
                    total_donated: None,
                },
            ),
        ]);

        Dataset {
            global_parameters: parameters,
            categories,
            recipients,
            donors,
            donations: vec![
                donation("alice", "aid-org", 40_000.0, None),
                donation("alice", "mixed-org", 16_000.0, None),
                donation("bob", "aid-org", 8_000.0, Some(0.5)),
            ],
        }
    }

    #[test]
    fn test_donor_statistics_totals_and_order() {
        let dataset = fixture();
        let snapshot = CombinedAssumptions::build(&dataset, None);
        let stats = donor_statistics(&snapshot, &dataset.donors, &dataset.donations).unwrap();

        assert_eq!(stats.len(), 2);
        // alice: 40k at $4k/life = 10 lives, 16k at $16k/3 blend = 3 lives
        assert_eq!(stats[0].donor_id, "alice");
        assert!((stats[0].lives_saved - 13.0).abs() < 1e-9);
        assert!((stats[0].total_donated - 56_000.0).abs() < 1e-9);
        // bob: half credit on 8k => 4k at $4k/life = 1 life
        assert_eq!(stats[1].donor_id, "bob");
        assert!((stats[1].lives_saved - 1.0).abs() < 1e-9);
        assert!((stats[1].total_donated - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_donor_extrapolation_from_itemized_average() {
        let mut dataset = fixture();
        dataset.donations = vec![donation("alice", "aid-org", 200_000.0, None)];
        dataset.donors.get_mut("alice").unwrap().total_donated = Some(1_000_000.0);

        let snapshot = CombinedAssumptions::build(&dataset, None);
        let stats = donor_statistics(&snapshot, &dataset.donors, &dataset.donations).unwrap();
        let alice = stats.iter().find(|s| s.donor_id == "alice").unwrap();

        // 200k itemized at $4k/life = 50 lives; the remaining 800k at the
        // same average adds 200 more
        assert!((alice.lives_saved - 250.0).abs() < 1e-9);
        assert!((alice.total_donated - 1_000_000.0).abs() < 1e-9);
        assert!((alice.cost_per_life - 4_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_donor_extrapolation_skipped_without_itemized_giving() {
        let mut dataset = fixture();
        dataset.donations = vec![];
        dataset.donors.get_mut("alice").unwrap().total_donated = Some(500_000.0);

        let snapshot = CombinedAssumptions::build(&dataset, None);
        let stats = donor_statistics(&snapshot, &dataset.donors, &dataset.donations).unwrap();
        let alice = stats.iter().find(|s| s.donor_id == "alice").unwrap();

        assert_eq!(alice.lives_saved, 0.0);
        assert!((alice.total_donated - 500_000.0).abs() < 1e-9);
        assert!(alice.cost_per_life.is_infinite());
    }

    #[test]
    fn test_donors_with_nothing_donated_are_dropped() {
        let mut dataset = fixture();
        dataset.donations = vec![donation("alice", "aid-org", 4_000.0, None)];

        let snapshot = CombinedAssumptions::build(&dataset, None);
        let stats = donor_statistics(&snapshot, &dataset.donors, &dataset.donations).unwrap();

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].donor_id, "alice");
    }

    #[test]
    fn test_recipient_statistics_rollup() {
        let dataset = fixture();
        let snapshot = CombinedAssumptions::build(&dataset, None);
        let stats = recipient_statistics(&snapshot, &dataset.donations).unwrap();

        assert_eq!(stats.len(), 2);
        // aid-org: 40k + 4k credited at $4k/life = 11 lives
        assert_eq!(stats[0].recipient_id, "aid-org");
        assert!((stats[0].total_received - 44_000.0).abs() < 1e-9);
        assert!((stats[0].lives_saved - 11.0).abs() < 1e-9);
        assert_eq!(stats[0].primary_category_id, "aid");

        // mixed-org: 16k at the $16k/3 blend = 3 lives
        assert_eq!(stats[1].recipient_id, "mixed-org");
        assert!((stats[1].lives_saved - 3.0).abs() < 1e-9);
        assert_eq!(stats[1].category_breakdown.len(), 2);
        let breakdown_total: f64 = stats[1]
            .category_breakdown
            .iter()
            .map(|share| share.lives_saved)
            .sum();
        assert!((breakdown_total - stats[1].lives_saved).abs() < 1e-9);
    }

    #[test]
    fn test_category_statistics_attribution() {
        let dataset = fixture();
        let snapshot = CombinedAssumptions::build(&dataset, None);
        let stats = category_statistics(&snapshot, &dataset.donations).unwrap();

        assert_eq!(stats.len(), 2);
        let aid = stats.iter().find(|s| s.category_id == "aid").unwrap();
        let research = stats.iter().find(|s| s.category_id == "research").unwrap();

        // aid: 44k direct + 8k of the mixed gift; research: the other 8k
        assert!((aid.total_received - 52_000.0).abs() < 1e-9);
        assert!((research.total_received - 8_000.0).abs() < 1e-9);
        assert!((aid.lives_saved - 13.0).abs() < 1e-9);
        assert!((research.lives_saved - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rollups_are_additively_consistent() {
        let dataset = fixture();
        let snapshot = CombinedAssumptions::build(&dataset, None);

        let by_donation: f64 = dataset
            .donations
            .iter()
            .map(|d| snapshot.lives_saved_for_donation(d).unwrap())
            .sum();
        let by_donor: f64 = donor_statistics(&snapshot, &dataset.donors, &dataset.donations)
            .unwrap()
            .iter()
            .map(|s| s.lives_saved)
            .sum();
        let by_recipient: f64 = recipient_statistics(&snapshot, &dataset.donations)
            .unwrap()
            .iter()
            .map(|s| s.lives_saved)
            .sum();
        let by_category: f64 = category_statistics(&snapshot, &dataset.donations)
            .unwrap()
            .iter()
            .map(|s| s.lives_saved)
            .sum();

        assert!((by_donor - by_donation).abs() < 1e-9);
        assert!((by_recipient - by_donation).abs() < 1e-9);
        assert!((by_category - by_donation).abs() < 1e-9);
    }

    #[test]
    fn test_donation_with_unknown_donor_fails() {
        let dataset = fixture();
        let snapshot = CombinedAssumptions::build(&dataset, None);
        let stray = vec![donation("ghost", "aid-org", 100.0, None)];
        let err = donor_statistics(&snapshot, &dataset.donors, &stray).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ghost"));
        assert!(message.contains("donation #0"));
    }
}
