use std::collections::BTreeMap;

use crate::dedup;
use crate::error::EngineError;
use crate::models::{CountryEditors, ParticipationRecord, ProjectShare};

const TOP_PROJECTS: usize = 10;

pub fn by_country(records: &[ParticipationRecord]) -> Vec<CountryEditors> {
    let mut groups: BTreeMap<(&str, &str, i32, &str), u64> = BTreeMap::new();
    for record in records {
        *groups
            .entry((
                record.country.as_str(),
                record.campaign.as_str(),
                record.cohort_year,
                record.iso_code.as_str(),
            ))
            .or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((country, _, _, iso_code), editors_count)| CountryEditors {
            country: country.to_string(),
            iso_code: iso_code.to_string(),
            editors_count,
        })
        .collect()
}

pub fn by_project(
    records: &[ParticipationRecord],
    target_month_key: &str,
) -> Result<Vec<ProjectShare>, EngineError> {
    let mut groups: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for record in records {
        *groups
            .entry((record.sequence_number.as_str(), record.project.as_str()))
            .or_insert(0) += 1;
    }

    let months = dedup::month_key_index(records);
    let mut rows: Vec<(&str, u64)> = groups
        .into_iter()
        .filter(|((sequence_number, _), _)| {
            months.get(*sequence_number).map(String::as_str) == Some(target_month_key)
        })
        .map(|((_, project), count)| (project, count))
        .collect();

    if rows.is_empty() {
        return Err(EngineError::NoDataForMonth {
            month_key: target_month_key.to_string(),
        });
    }

    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    // The share denominator is the whole month, not just the rows kept.
    let total: u64 = rows.iter().map(|(_, count)| *count).sum();
    rows.truncate(TOP_PROJECTS);

    Ok(rows
        .into_iter()
        .map(|(project, editors_count)| ProjectShare {
            project: project.to_string(),
            editors_count,
            percentage: round2(editors_count as f64 * 100.0 / total as f64),
        })
        .collect())
}

pub fn by_month(
    records: &[ParticipationRecord],
    project_filter: Option<&str>,
) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for record in records {
        if let Some(project) = project_filter {
            if record.project != project {
                continue;
            }
        }
        *counts.entry(record.sequence_number.clone()).or_insert(0) += 1;
    }
    counts
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
