use crate::Result;
use crate::error::ScrapeError;
use crate::models::{Column, JobRecord};
use crate::rules::{ExtractionRule, ListingBlock, apply_rules};
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

const PAGINATION_CONTAINERS: &str = "div.pagination, nav.pagination, ul.pagination, div.pager";
const PAGINATION_WORDS: [&str; 5] = ["next", "more", "»", ">", "page"];

pub trait JobCrawler {
    /// CSS selector matching one container per job listing.
    fn listing_selector(&self) -> &str;

    fn rules(&self) -> &[ExtractionRule];

    fn source_url(&self) -> &Url;

    /// Native identifier carried by the listing markup, if the site has one.
    fn native_job_id(&self, block: &ListingBlock) -> Option<String>;

    fn parse_jobs(&self, html: &str, scraped_on: NaiveDate) -> Result<Vec<JobRecord>> {
        let document = Html::parse_document(html);
        let listing_selector = Selector::parse(self.listing_selector())
            .map_err(|e| ScrapeError::Selector(format!("{}: {e:?}", self.listing_selector())))?;

        if self.has_next_page(&document) {
            log::info!("📄 Pagination detected, scraping the first page only");
        } else {
            log::info!("📄 No pagination detected");
        }

        let blocks: Vec<ElementRef> = document.select(&listing_selector).collect();
        if blocks.is_empty() {
            log::warn!(
                "No listing containers matched `{}`; the page layout may have changed",
                self.listing_selector()
            );
            return Ok(Vec::new());
        }
        log::info!("📋 Found {} job postings", blocks.len());

        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(blocks.len());

        for (index, element) in blocks.into_iter().enumerate() {
            let block = ListingBlock::new(element, self.source_url());
            match self.build_record(&block, index, scraped_on) {
                Some(mut job) => {
                    job.job_id = unique_job_id(&mut seen, &job.job_url, &job.job_id, index);
                    log::debug!("[{}] {} ({})", index + 1, job.title, job.job_id);
                    jobs.push(job);
                }
                None => log::warn!("Skipped listing {}: no title or job URL", index + 1),
            }
        }

        log::info!("✅ Extracted {} jobs", jobs.len());
        Ok(jobs)
    }

    /// Applies the rule list to one block. Blocks without a title or URL yield `None`.
    fn build_record(
        &self,
        block: &ListingBlock,
        index: usize,
        scraped_on: NaiveDate,
    ) -> Option<JobRecord> {
        let mut found = apply_rules(self.rules(), block);

        let title = found.remove(&Column::Title)?;
        let job_url = found.remove(&Column::JobUrl)?;
        let job_id = self
            .native_job_id(block)
            .or_else(|| job_id_from_url(&job_url))
            .unwrap_or_else(|| format!("JOB-{:03}", index + 1));

        let mut job = JobRecord::new(title, job_url, job_id);
        for column in Column::ALL {
            if let Some(value) = found.remove(&column) {
                job.set(column, value);
            }
        }
        job.scraped_date = scraped_on.format("%Y-%m-%d").to_string();
        job.source_url = self.source_url().to_string();
        Some(job)
    }

    /// Reports whether the page offers a way to more listings. Never followed.
    fn has_next_page(&self, document: &Html) -> bool {
        let containers = Selector::parse(PAGINATION_CONTAINERS)
            .map(|s| document.select(&s).next().is_some())
            .unwrap_or(false);

        let anchors = Selector::parse("a")
            .map(|s| {
                document.select(&s).any(|a| {
                    let text = a.text().collect::<String>().to_lowercase();
                    PAGINATION_WORDS.iter().any(|w| text.contains(w))
                })
            })
            .unwrap_or(false);

        let buttons = Selector::parse("button")
            .map(|s| {
                document.select(&s).any(|b| {
                    b.text()
                        .collect::<String>()
                        .to_lowercase()
                        .contains("load more")
                })
            })
            .unwrap_or(false);

        containers || anchors || buttons
    }
}

/// Claims an id that no earlier listing with the same URL holds, suffixing
/// the listing's 1-based position and then a counter until one is free.
fn unique_job_id(
    seen: &mut HashSet<(String, String)>,
    job_url: &str,
    job_id: &str,
    index: usize,
) -> String {
    let mut candidate = job_id.to_string();
    let mut attempt = 1;
    while !seen.insert((job_url.to_string(), candidate.clone())) {
        candidate = match attempt {
            1 => format!("{job_id}-{}", index + 1),
            n => format!("{job_id}-{}-{n}", index + 1),
        };
        attempt += 1;
    }
    candidate
}

/// Picks an identifier out of a job URL: an id-like query parameter, or
/// the last path segment.
pub fn job_id_from_url(job_url: &str) -> Option<String> {
    let url = Url::parse(job_url).ok()?;

    if let Some((_, v)) = url
        .query_pairs()
        .find(|(k, v)| matches!(k.as_ref(), "id" | "job_id" | "jobId" | "job") && !v.is_empty())
    {
        return Some(v.into_owned());
    }

    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.trim_end_matches(".html").to_string())
        .filter(|s| !s.is_empty())
}
