//! CSV export of aggregate statistics.
//!
//! Writes the donor and recipient rollups as flat CSV files for whatever
//! downstream tooling wants them (spreadsheets, dashboards). Breakdown
//! detail stays in the typed structs; the rows here are the ranking
//! columns only.

use crate::stats::{DonorStatistics, RecipientStatistics};
use crate::Result;
use std::path::Path;

#[derive(Debug, serde::Serialize)]
struct DonorRow {
    donor_id: String,
    name: String,
    total_donated: f64,
    lives_saved: f64,
    cost_per_life: f64,
}

impl From<&DonorStatistics> for DonorRow {
    fn from(stats: &DonorStatistics) -> Self {
        DonorRow {
            donor_id: stats.donor_id.clone(),
            name: stats.name.clone(),
            total_donated: stats.total_donated,
            lives_saved: stats.lives_saved,
            cost_per_life: stats.cost_per_life,
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct RecipientRow {
    recipient_id: String,
    name: String,
    primary_category_id: String,
    total_received: f64,
    lives_saved: f64,
    cost_per_life: f64,
}

impl From<&RecipientStatistics> for RecipientRow {
    fn from(stats: &RecipientStatistics) -> Self {
        RecipientRow {
            recipient_id: stats.recipient_id.clone(),
            name: stats.name.clone(),
            primary_category_id: stats.primary_category_id.clone(),
            total_received: stats.total_received,
            lives_saved: stats.lives_saved,
            cost_per_life: stats.cost_per_life,
        }
    }
}

/// Write donor statistics to a CSV file, replacing any existing report.
pub fn write_donor_report(stats: &[DonorStatistics], path: &Path) -> Result<()> {
    write_rows(path, stats.iter().map(DonorRow::from))?;
    tracing::info!("Wrote {} donor rows to {:?}", stats.len(), path);
    Ok(())
}

/// Write recipient statistics to a CSV file, replacing any existing report.
pub fn write_recipient_report(stats: &[RecipientStatistics], path: &Path) -> Result<()> {
    write_rows(path, stats.iter().map(RecipientRow::from))?;
    tracing::info!("Wrote {} recipient rows to {:?}", stats.len(), path);
    Ok(())
}

fn write_rows<R: serde::Serialize>(
    path: &Path,
    rows: impl Iterator<Item = R>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CategoryShare;

    fn donor_stats() -> Vec<DonorStatistics> {
        vec![
            DonorStatistics {
                donor_id: "alice".into(),
                name: "Alice".into(),
                net_worth: 1e7,
                itemized_donated: 56_000.0,
                total_donated: 56_000.0,
                lives_saved: 13.0,
                cost_per_life: 56_000.0 / 13.0,
            },
            DonorStatistics {
                donor_id: "bob".into(),
                name: "Bob".into(),
                net_worth: 5e6,
                itemized_donated: 4_000.0,
                total_donated: 4_000.0,
                lives_saved: 1.0,
                cost_per_life: 4_000.0,
            },
        ]
    }

    #[test]
    fn test_donor_report_rows_and_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("donors.csv");

        write_donor_report(&donor_stats(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["donor_id", "name", "total_donated", "lives_saved", "cost_per_life"]
        );
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_recipient_report_round_trips() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("reports").join("recipients.csv");

        let stats = vec![RecipientStatistics {
            recipient_id: "org".into(),
            name: "Org".into(),
            total_received: 44_000.0,
            lives_saved: 11.0,
            cost_per_life: 4_000.0,
            primary_category_id: "aid".into(),
            category_breakdown: vec![CategoryShare {
                category_id: "aid".into(),
                fraction: 1.0,
                lives_saved: 11.0,
            }],
        }];
        write_recipient_report(&stats, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "org");
        assert_eq!(&record[2], "aid");
    }

    #[test]
    fn test_report_overwrites_previous_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("donors.csv");

        write_donor_report(&donor_stats(), &path).unwrap();
        write_donor_report(&donor_stats()[..1].to_vec(), &path).unwrap();

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 1);
    }
}
