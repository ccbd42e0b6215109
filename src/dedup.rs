use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{ActivityRecord, MonthOption, ParticipationRecord};

type GroupKey = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    i32,
);

// One row per unique (user, month, project, country) participation;
// edit_count carries the number of raw events collapsed into it.
pub fn deduplicate(records: &[ActivityRecord]) -> Vec<ParticipationRecord> {
    let mut groups: HashMap<GroupKey, u64> = HashMap::new();
    for record in records {
        let key = (
            record.user_id.clone(),
            record.sequence_number.clone(),
            record.month_key.clone(),
            record.project.clone(),
            record.country.clone(),
            record.iso_code.clone(),
            record.campaign.clone(),
            record.cohort_year,
        );
        *groups.entry(key).or_insert(0) += 1;
    }

    let mut participation: Vec<ParticipationRecord> = groups
        .into_iter()
        .map(
            |(
                (user_id, sequence_number, month_key, project, country, iso_code, campaign, cohort_year),
                edit_count,
            )| ParticipationRecord {
                user_id,
                campaign,
                cohort_year,
                month_key,
                sequence_number,
                project,
                country,
                iso_code,
                edit_count,
            },
        )
        .collect();

    // Lexical order on sequence_number is chronological because the token
    // is zero-padded YYYY-MM; user_id is the final tiebreak.
    participation.sort_by(|a, b| {
        (
            &a.sequence_number,
            &a.month_key,
            &a.country,
            &a.campaign,
            a.cohort_year,
            &a.project,
            &a.user_id,
        )
            .cmp(&(
                &b.sequence_number,
                &b.month_key,
                &b.country,
                &b.campaign,
                b.cohort_year,
                &b.project,
                &b.user_id,
            ))
    });
    participation
}

pub fn month_key_index(records: &[ParticipationRecord]) -> BTreeMap<String, String> {
    records
        .iter()
        .map(|record| (record.sequence_number.clone(), record.month_key.clone()))
        .collect()
}

pub fn distinct_months(records: &[ParticipationRecord]) -> Vec<MonthOption> {
    month_key_index(records)
        .into_iter()
        .map(|(sequence_number, month_key)| MonthOption {
            sequence_number,
            month_key,
        })
        .collect()
}

pub fn distinct_projects(records: &[ParticipationRecord]) -> Vec<String> {
    let projects: BTreeSet<&str> = records
        .iter()
        .map(|record| record.project.as_str())
        .collect();
    projects.into_iter().map(str::to_string).collect()
}
