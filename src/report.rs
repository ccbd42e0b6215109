use std::fmt::Write;

use crate::models::{CountryEditors, ProjectShare, TimelinePoint};

pub fn build_report(
    campaign: &str,
    cohort_year: i32,
    target_month_key: &str,
    timeline: &[TimelinePoint],
    countries: &[CountryEditors],
    shares: &[ProjectShare],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Campaign Retention Report");
    let _ = writeln!(
        output,
        "Generated for {}, cohort {} ({} month timeline)",
        campaign,
        cohort_year,
        timeline.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Active Editors");

    for point in timeline.iter() {
        let _ = writeln!(
            output,
            "- {}: {} editors",
            point.month_key, point.editors_count
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Participation by Country");

    if countries.is_empty() {
        let _ = writeln!(output, "No country participation recorded.");
    } else {
        for country in countries.iter() {
            let _ = writeln!(
                output,
                "- {} ({}): {} editors",
                country.country, country.iso_code, country.editors_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Projects in {target_month_key}");

    if shares.is_empty() {
        let _ = writeln!(output, "No project activity recorded for this month.");
    } else {
        for (rank, share) in shares.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {}: {} editors ({:.2}%)",
                rank + 1,
                share.project,
                share.editors_count,
                share.percentage
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_every_section() {
        let timeline = vec![
            TimelinePoint {
                month_key: "September-2021".to_string(),
                editors_count: 3,
            },
            TimelinePoint {
                month_key: "October-2021".to_string(),
                editors_count: 0,
            },
        ];
        let countries = vec![CountryEditors {
            country: "Germany".to_string(),
            iso_code: "DE".to_string(),
            editors_count: 3,
        }];
        let shares = vec![ProjectShare {
            project: "commonswiki".to_string(),
            editors_count: 3,
            percentage: 100.0,
        }];

        let report = build_report(
            "Wiki Loves Monuments",
            2021,
            "September-2021",
            &timeline,
            &countries,
            &shares,
        );

        assert!(report.contains("# Campaign Retention Report"));
        assert!(report.contains("- October-2021: 0 editors"));
        assert!(report.contains("- Germany (DE): 3 editors"));
        assert!(report.contains("1. commonswiki: 3 editors (100.00%)"));
    }
}
