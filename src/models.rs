use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::month;

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRecord {
    pub user_id: String,
    pub campaign: String,
    pub cohort_year: i32,
    pub month_key: String,
    pub sequence_number: String,
    pub project: String,
    pub country: String,
    pub iso_code: String,
}

impl ActivityRecord {
    // Token consistency is enforced once, at load time; downstream
    // aggregation relies on sequence_number and month_key agreeing.
    pub fn validate(&self, location: &str) -> Result<(), EngineError> {
        let schema = |reason: String| EngineError::Schema {
            location: location.to_string(),
            reason,
        };

        let sequence = month::parse_sequence(&self.sequence_number)
            .map_err(|err| schema(err.to_string()))?;
        let (key_month, key_year) = month::parse_month_key(&self.month_key).ok_or_else(|| {
            schema(format!(
                "month key {:?} is not of the form \"MonthName-Year\"",
                self.month_key
            ))
        })?;
        if sequence.month() != key_month || sequence.year() != key_year {
            return Err(schema(format!(
                "sequence number {:?} disagrees with month key {:?}",
                self.sequence_number, self.month_key
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipationRecord {
    pub user_id: String,
    pub campaign: String,
    pub cohort_year: i32,
    pub month_key: String,
    pub sequence_number: String,
    pub project: String,
    pub country: String,
    pub iso_code: String,
    pub edit_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryEditors {
    pub country: String,
    pub iso_code: String,
    pub editors_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectShare {
    pub project: String,
    pub editors_count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub month_key: String,
    pub editors_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignCohorts {
    pub campaign: String,
    pub cohort_years: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOption {
    pub sequence_number: String,
    pub month_key: String,
}
