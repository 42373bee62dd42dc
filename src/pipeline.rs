use crate::Result;
use crate::models::{JobRecord, ScrapeConfig};
use crate::summary::{Completeness, Summary};
use crate::writer::save_to_xlsx;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;

pub trait Crawler {
    fn start_crawl(&self, scraped_on: NaiveDate) -> Result<Vec<JobRecord>>;
}

pub struct ScrapePipeline {
    config: ScrapeConfig,
    scraped_on: NaiveDate,
}

#[must_use = "pipeline must end with .save() to write the report"]
pub struct PipelineWithJobs {
    config: ScrapeConfig,
    scraped_on: NaiveDate,
    jobs: Vec<JobRecord>,
}

#[derive(Debug)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub summary: Summary,
}

impl ScrapePipeline {
    pub fn new(config: ScrapeConfig) -> Self {
        Self {
            config,
            scraped_on: Local::now().date_naive(),
        }
    }

    /// Pins the run date, mainly so tests get stable output.
    pub fn scraped_on(mut self, date: NaiveDate) -> Self {
        self.scraped_on = date;
        self
    }

    pub fn crawl<C>(self, client: &C) -> Result<PipelineWithJobs>
    where
        C: Crawler,
    {
        let jobs = client.start_crawl(self.scraped_on)?;

        let completeness = Completeness::of(&jobs);
        if jobs.is_empty() {
            log::warn!("⚠️ No jobs found, the report will be empty");
        } else {
            log::info!(
                "📊 Data completeness: {}/{} jobs ({:.1}%) have all essential fields",
                completeness.complete,
                completeness.total,
                completeness.rate()
            );
            if !completeness.is_acceptable() {
                log::warn!("⚠️ Low completion rate, the site structure may have changed");
            }
        }

        Ok(PipelineWithJobs {
            config: self.config,
            scraped_on: self.scraped_on,
            jobs,
        })
    }
}

impl PipelineWithJobs {
    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn save(self) -> Result<RunReport> {
        let summary = Summary::from_jobs(&self.jobs, &self.config, self.scraped_on);
        let path = self.config.output_path;

        save_to_xlsx(&self.jobs, &summary, &path)
            .inspect(|_| log::info!("✅ Saved {} jobs to {}", summary.total, path.display()))
            .inspect_err(|e| log::error!("❌ Failed to save {}: {}", path.display(), e))?;

        Ok(RunReport {
            output_path: path,
            summary,
        })
    }
}
