use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::models::ActivityRecord;
use crate::store::RecordStore;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("CREATE SCHEMA IF NOT EXISTS campaign_retention")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS campaign_retention.activity (
            id uuid PRIMARY KEY,
            user_id text NOT NULL,
            campaign text NOT NULL,
            cohort_year integer NOT NULL,
            month_key text NOT NULL,
            sequence_number text NOT NULL,
            project text NOT NULL,
            country text NOT NULL,
            iso_code text NOT NULL,
            source_key text UNIQUE,
            imported_at timestamptz NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS activity_campaign_cohort_idx \
         ON campaign_retention.activity (campaign, cohort_year)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let events = vec![
        ("seed-001", "PhotonHunter", "Wiki Loves Monuments", 2021, "September-2021", "2021-09", "commonswiki", "Germany", "DE"),
        ("seed-002", "PhotonHunter", "Wiki Loves Monuments", 2021, "September-2021", "2021-09", "commonswiki", "Germany", "DE"),
        ("seed-003", "MarbleArch", "Wiki Loves Monuments", 2021, "September-2021", "2021-09", "dewiki", "Germany", "DE"),
        ("seed-004", "LensOfLagos", "Wiki Loves Monuments", 2021, "September-2021", "2021-09", "commonswiki", "Nigeria", "NG"),
        ("seed-005", "PhotonHunter", "Wiki Loves Monuments", 2021, "October-2021", "2021-10", "commonswiki", "Germany", "DE"),
        ("seed-006", "LensOfLagos", "Wiki Loves Monuments", 2021, "November-2021", "2021-11", "enwiki", "Nigeria", "NG"),
        ("seed-007", "MarbleArch", "Wiki Loves Monuments", 2021, "December-2021", "2021-12", "wikidatawiki", "Germany", "DE"),
        ("seed-008", "LensOfLagos", "Wiki Loves Monuments", 2021, "January-2022", "2022-01", "enwiki", "Nigeria", "NG"),
        ("seed-009", "ShutterRani", "Wiki Loves Earth", 2021, "June-2021", "2021-06", "commonswiki", "India", "IN"),
        ("seed-010", "ShutterRani", "Wiki Loves Earth", 2021, "July-2021", "2021-07", "hiwiki", "India", "IN"),
        ("seed-011", "TrailPetrel", "Wiki Loves Earth", 2021, "June-2021", "2021-06", "commonswiki", "Estonia", "EE"),
        ("seed-012", "TrailPetrel", "Wiki Loves Earth", 2021, "September-2021", "2021-09", "etwiki", "Estonia", "EE"),
    ];

    for (source_key, user_id, campaign, cohort_year, month_key, sequence_number, project, country, iso_code) in events {
        let record = ActivityRecord {
            user_id: user_id.to_string(),
            campaign: campaign.to_string(),
            cohort_year,
            month_key: month_key.to_string(),
            sequence_number: sequence_number.to_string(),
            project: project.to_string(),
            country: country.to_string(),
            iso_code: iso_code.to_string(),
        };
        record.validate(source_key)?;
        insert_event(pool, &record, source_key).await?;
    }

    Ok(())
}

async fn insert_event(
    pool: &PgPool,
    record: &ActivityRecord,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO campaign_retention.activity
        (id, user_id, campaign, cohort_year, month_key, sequence_number,
         project, country, iso_code, source_key, imported_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&record.user_id)
    .bind(&record.campaign)
    .bind(record.cohort_year)
    .bind(&record.month_key)
    .bind(&record.sequence_number)
    .bind(&record.project)
    .bind(&record.country)
    .bind(&record.iso_code)
    .bind(source_key)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        user_id: String,
        campaign: String,
        cohort_year: i32,
        month_key: String,
        sequence_number: String,
        project: String,
        country: String,
        iso_code: String,
        #[serde(default)]
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let record = ActivityRecord {
            user_id: row.user_id,
            campaign: row.campaign,
            cohort_year: row.cohort_year,
            month_key: row.month_key,
            sequence_number: row.sequence_number,
            project: row.project,
            country: row.country,
            iso_code: row.iso_code,
        };
        // Header occupies line 1.
        record.validate(&format!("{}:{}", csv_path.display(), index + 2))?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_event(pool, &record, &source_key).await? {
            inserted += 1;
        }
    }

    info!(inserted, "imported activity events");
    Ok(inserted)
}

pub async fn load_records(pool: &PgPool) -> anyhow::Result<RecordStore> {
    let rows = sqlx::query(
        "SELECT id, user_id, campaign, cohort_year, month_key, sequence_number, \
         project, country, iso_code \
         FROM campaign_retention.activity",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let id: Uuid = row.get("id");
        let record = ActivityRecord {
            user_id: row.get("user_id"),
            campaign: row.get("campaign"),
            cohort_year: row.get("cohort_year"),
            month_key: row.get("month_key"),
            sequence_number: row.get("sequence_number"),
            project: row.get("project"),
            country: row.get("country"),
            iso_code: row.get("iso_code"),
        };
        record.validate(&format!("activity row {id}"))?;
        records.push(record);
    }

    info!(count = records.len(), "loaded activity records");
    Ok(RecordStore::new(records))
}
