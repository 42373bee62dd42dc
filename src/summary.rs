use crate::models::{JobRecord, ScrapeConfig, is_available};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const COMPLETENESS_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub scraped_on: NaiveDate,
    pub source_name: String,
    pub source_url: String,
    pub by_category: Vec<(String, usize)>,
    pub by_location: Vec<(String, usize)>,
}

impl Summary {
    pub fn from_jobs(jobs: &[JobRecord], config: &ScrapeConfig, scraped_on: NaiveDate) -> Self {
        Self {
            total: jobs.len(),
            scraped_on,
            source_name: config.source_name.clone(),
            source_url: config.target_url.clone(),
            by_category: count_by(jobs, |job| job.category.as_str()),
            by_location: count_by(jobs, |job| job.location.as_str()),
        }
    }
}

/// Frequency count, largest group first, equal counts in label order.
pub fn count_by<'a>(
    jobs: &'a [JobRecord],
    key: impl Fn(&'a JobRecord) -> &'a str,
) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for job in jobs {
        *counts.entry(key(job)).or_default() += 1;
    }

    let mut groups: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    groups
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completeness {
    pub complete: usize,
    pub total: usize,
}

impl Completeness {
    /// Counts records that carry a title, category and location.
    pub fn of(jobs: &[JobRecord]) -> Self {
        let complete = jobs
            .iter()
            .filter(|job| {
                [&job.title, &job.category, &job.location]
                    .iter()
                    .all(|v| is_available(v))
            })
            .count();
        Self {
            complete,
            total: jobs.len(),
        }
    }

    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.complete * 100) as f64 / self.total as f64
        }
    }

    pub fn is_acceptable(&self) -> bool {
        self.total > 0 && self.rate() >= COMPLETENESS_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NOT_AVAILABLE;

    fn job(category: &str, location: &str) -> JobRecord {
        let mut job = JobRecord::new("T".into(), "https://x.test/j".into(), "1".into());
        job.category = category.into();
        job.location = location.into();
        job
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    #[test]
    fn groups_sorted_by_count_then_label() {
        let jobs = vec![
            job("QA", "Kochi"),
            job("Engineering", "Kochi"),
            job("Design", "Trivandrum"),
            job("Engineering", "Kochi"),
            job("Admin", "Trivandrum"),
        ];
        let summary = Summary::from_jobs(&jobs, &ScrapeConfig::default(), day());

        assert_eq!(summary.total, 5);
        assert_eq!(
            summary.by_category,
            vec![
                ("Engineering".to_string(), 2),
                ("Admin".to_string(), 1),
                ("Design".to_string(), 1),
                ("QA".to_string(), 1),
            ]
        );
        assert_eq!(
            summary.by_location,
            vec![("Kochi".to_string(), 3), ("Trivandrum".to_string(), 2)]
        );
    }

    #[test]
    fn breakdowns_sum_to_total_including_missing_labels() {
        let jobs = vec![
            job("Engineering", NOT_AVAILABLE),
            job(NOT_AVAILABLE, "Kochi"),
            job("Engineering", "Kochi"),
        ];
        let summary = Summary::from_jobs(&jobs, &ScrapeConfig::default(), day());
        let cat: usize = summary.by_category.iter().map(|(_, n)| n).sum();
        let loc: usize = summary.by_location.iter().map(|(_, n)| n).sum();
        assert_eq!(cat, summary.total);
        assert_eq!(loc, summary.total);
    }

    #[test]
    fn empty_input_has_empty_breakdowns() {
        let summary = Summary::from_jobs(&[], &ScrapeConfig::default(), day());
        assert_eq!(summary.total, 0);
        assert!(summary.by_category.is_empty());
        assert!(summary.by_location.is_empty());
    }

    #[test]
    fn completeness_rate() {
        let jobs = vec![
            job("Engineering", "Kochi"),
            job(NOT_AVAILABLE, "Kochi"),
            job("QA", "Kochi"),
            job("QA", "Kochi"),
            job("QA", "Kochi"),
        ];
        let c = Completeness::of(&jobs);
        assert_eq!(c.complete, 4);
        assert!((c.rate() - 80.0).abs() < f64::EPSILON);
        assert!(c.is_acceptable());
        assert!(!Completeness::of(&[]).is_acceptable());
    }
}
