use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("schema violation at {location}: {reason}")]
    Schema { location: String, reason: String },

    #[error("no activity records for campaign {campaign:?} in cohort year {cohort_year}")]
    EmptyResult { campaign: String, cohort_year: i32 },

    #[error("malformed sequence number {token:?}, expected zero-padded \"YYYY-MM\"")]
    MalformedSequence { token: String },

    #[error("no participation data for month {month_key:?}")]
    NoDataForMonth { month_key: String },

    #[error("timeline walk failed at step {step}")]
    TimelineStep {
        step: usize,
        #[source]
        source: Box<EngineError>,
    },
}
