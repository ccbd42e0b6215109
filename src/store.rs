use std::collections::{BTreeMap, BTreeSet};

use crate::error::EngineError;
use crate::models::{ActivityRecord, CampaignCohorts};

// Read-only after load; every query works on a filtered copy.
pub struct RecordStore {
    records: Vec<ActivityRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<ActivityRecord>) -> Self {
        Self { records }
    }

    pub fn filter(
        &self,
        campaign: &str,
        cohort_year: i32,
    ) -> Result<Vec<ActivityRecord>, EngineError> {
        let matched: Vec<ActivityRecord> = self
            .records
            .iter()
            .filter(|record| record.campaign == campaign && record.cohort_year == cohort_year)
            .cloned()
            .collect();

        if matched.is_empty() {
            return Err(EngineError::EmptyResult {
                campaign: campaign.to_string(),
                cohort_year,
            });
        }
        Ok(matched)
    }

    pub fn campaigns(&self) -> Vec<CampaignCohorts> {
        let mut cohorts: BTreeMap<&str, BTreeSet<i32>> = BTreeMap::new();
        for record in &self.records {
            cohorts
                .entry(record.campaign.as_str())
                .or_default()
                .insert(record.cohort_year);
        }
        cohorts
            .into_iter()
            .map(|(campaign, years)| CampaignCohorts {
                campaign: campaign.to_string(),
                cohort_years: years.into_iter().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(campaign: &str, cohort_year: i32, user_id: &str) -> ActivityRecord {
        ActivityRecord {
            user_id: user_id.to_string(),
            campaign: campaign.to_string(),
            cohort_year,
            month_key: "September-2021".to_string(),
            sequence_number: "2021-09".to_string(),
            project: "commonswiki".to_string(),
            country: "Germany".to_string(),
            iso_code: "DE".to_string(),
        }
    }

    #[test]
    fn filter_returns_only_matching_records() {
        let store = RecordStore::new(vec![
            record("Wiki Loves Monuments", 2021, "a"),
            record("Wiki Loves Monuments", 2022, "b"),
            record("Wiki Loves Earth", 2021, "c"),
        ]);

        let matched = store
            .filter("Wiki Loves Monuments", 2021)
            .expect("records exist");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].user_id, "a");
    }

    #[test]
    fn filter_with_no_matches_is_an_error() {
        let store = RecordStore::new(vec![record("Wiki Loves Monuments", 2021, "a")]);
        let err = store
            .filter("Wiki Loves Africa", 2021)
            .expect_err("nothing matches");
        assert!(matches!(
            err,
            EngineError::EmptyResult { cohort_year: 2021, .. }
        ));
    }

    #[test]
    fn campaigns_lists_each_cohort_once() {
        let store = RecordStore::new(vec![
            record("Wiki Loves Monuments", 2021, "a"),
            record("Wiki Loves Monuments", 2021, "b"),
            record("Wiki Loves Monuments", 2022, "c"),
            record("Wiki Loves Earth", 2021, "d"),
        ]);

        let campaigns = store.campaigns();
        assert_eq!(
            campaigns,
            vec![
                CampaignCohorts {
                    campaign: "Wiki Loves Earth".to_string(),
                    cohort_years: vec![2021],
                },
                CampaignCohorts {
                    campaign: "Wiki Loves Monuments".to_string(),
                    cohort_years: vec![2021, 2022],
                },
            ]
        );
    }
}
