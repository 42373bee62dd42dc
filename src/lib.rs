pub mod client;
pub mod clients;
pub mod crawler;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod summary;
pub mod utils;
pub mod writer;

pub use client::{HttpFetcher, PageFetcher};
pub use clients::TechversantClient;
pub use crawler::JobCrawler;
pub use error::ScrapeError;
pub use models::{Column, JobRecord, NOT_AVAILABLE, ScrapeConfig};
pub use pipeline::{Crawler, PipelineWithJobs, RunReport, ScrapePipeline};
pub use summary::Summary;
pub use writer::{JOBS_SHEET, SUMMARY_SHEET, save_to_xlsx};

pub type Result<T> = std::result::Result<T, ScrapeError>;
