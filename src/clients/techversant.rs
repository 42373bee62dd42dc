use crate::Result;
use crate::client::PageFetcher;
use crate::crawler::JobCrawler;
use crate::models::{Column, JobRecord, ScrapeConfig};
use crate::pipeline::Crawler;
use crate::rules::{
    ExtractionRule, ListingBlock, email_in_text, first_page_link, first_pattern_match,
    labelled_value, list_after_headings, mailto_address, paragraph_after_heading,
    prefixed_value, text_of,
};
use crate::utils::{element_text, normalize_posting_date};
use chrono::NaiveDate;
use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;
use url::Url;

const LISTING_SELECTOR: &str = "section.crr_app_stt";
const APPLY_BUTTON: &str = "a.crr_app_nw";

static EXPERIENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\d+\+?\s*years?\s*of\s*experience",
        r"(?i)minimum\s*of\s*\d+\s*years",
        r"(?i)\d+\+\s*years?\s*in",
        r"(?i)minimum\s*\d+\s*years",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const SKILL_HEADINGS: [&str; 4] = [
    "Preferred Skills",
    "Required Skills",
    "Must-Have Skills",
    "Technical Stack",
];

const RULES: &[ExtractionRule] = &[
    ExtractionRule::new("title.heading_class", Column::Title, |b| {
        text_of(b, "h3.crr_app_hh")
    }),
    ExtractionRule::new("title.any_heading", Column::Title, |b| {
        text_of(b, "h1, h2, h3, h4")
    }),
    ExtractionRule::new("category.tag_class", Column::Category, |b| {
        text_of(b, "span.crr_app_tp.bluecrr")
    }),
    ExtractionRule::new("category.label", Column::Category, |b| {
        labelled_value(b, &["Category", "Department"])
    }),
    ExtractionRule::new("location.place_class", Column::Location, |b| {
        text_of(b, "span.crr_app_plc")
    }),
    ExtractionRule::new("location.label", Column::Location, |b| {
        labelled_value(b, &["Location"])
    }),
    ExtractionRule::new("experience.label", Column::Experience, |b| {
        labelled_value(b, &["Experience"])
    }),
    ExtractionRule::new("experience.pattern", Column::Experience, |b| {
        first_pattern_match(b, &EXPERIENCE_PATTERNS)
    }),
    ExtractionRule::new("posting_date.posted_on", Column::PostingDate, posted_on_paragraph),
    ExtractionRule::new("posting_date.label", Column::PostingDate, |b| {
        prefixed_value(b, &["Posted on", "Date Posted"]).and_then(|v| normalize_posting_date(&v))
    }),
    ExtractionRule::new("description.important_to_us", Column::Description, |b| {
        paragraph_after_heading(b, "What's important to us:")
    }),
    ExtractionRule::new("description.label", Column::Description, |b| {
        labelled_value(b, &["Job Description"])
    }),
    ExtractionRule::new("skills.headed_lists", Column::Skills, |b| {
        let skills = list_after_headings(b, &SKILL_HEADINGS);
        if skills.is_empty() {
            None
        } else {
            Some(skills.join("; "))
        }
    }),
    ExtractionRule::new("contact_email.mailto", Column::ContactEmail, mailto_address),
    ExtractionRule::new("contact_email.pattern", Column::ContactEmail, email_in_text),
    ExtractionRule::new("benefits.company_offers", Column::Benefits, |b| {
        paragraph_after_heading(b, "What Company Offers:")
    }),
    ExtractionRule::new("benefits.label", Column::Benefits, |b| {
        labelled_value(b, &["Benefits"])
    }),
    ExtractionRule::new("salary.label", Column::Salary, |b| {
        labelled_value(b, &["Salary", "CTC", "Compensation"])
    }),
    ExtractionRule::new("job_url.apply_button", Column::JobUrl, |b| {
        b.select_first(APPLY_BUTTON)
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| b.resolve(href))
    }),
    ExtractionRule::new("job_url.first_link", Column::JobUrl, first_page_link),
];

fn posted_on_paragraph(block: &ListingBlock) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    block
        .element
        .select(&selector)
        .map(element_text)
        .find(|text| text.contains("Posted on"))
        .and_then(|text| normalize_posting_date(&text))
}

/// Client for the Techversant Infotech talent page.
pub struct TechversantClient<F> {
    fetcher: F,
    source_url: Url,
}

impl<F: PageFetcher> TechversantClient<F> {
    pub fn new(config: &ScrapeConfig, fetcher: F) -> Result<Self> {
        Ok(Self {
            fetcher,
            source_url: Url::parse(&config.target_url)?,
        })
    }
}

impl<F> JobCrawler for TechversantClient<F> {
    fn listing_selector(&self) -> &str {
        LISTING_SELECTOR
    }

    fn rules(&self) -> &[ExtractionRule] {
        RULES
    }

    fn source_url(&self) -> &Url {
        &self.source_url
    }

    fn native_job_id(&self, block: &ListingBlock) -> Option<String> {
        let from_button = block.select_first(APPLY_BUTTON).and_then(|a| {
            ["datatitle", "data-job-id", "data-id"]
                .iter()
                .find_map(|attr| a.value().attr(attr))
                .map(str::to_string)
        });

        from_button
            .or_else(|| {
                ["data-job-id", "id"]
                    .iter()
                    .find_map(|attr| block.element.value().attr(attr))
                    .map(str::to_string)
            })
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

impl<F: PageFetcher> Crawler for TechversantClient<F> {
    fn start_crawl(&self, scraped_on: NaiveDate) -> Result<Vec<JobRecord>> {
        log::info!("🔍 Starting job scraping from {}", self.source_url);
        let html = self.fetcher.fetch(self.source_url.as_str())?;
        self.parse_jobs(&html, scraped_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NOT_AVAILABLE;

    struct NoFetch;

    impl PageFetcher for NoFetch {
        fn fetch(&self, _url: &str) -> Result<String> {
            unreachable!("parse-only tests never fetch")
        }
    }

    fn client() -> TechversantClient<NoFetch> {
        TechversantClient::new(&ScrapeConfig::default(), NoFetch).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    const FULL_LISTING: &str = r#"
        <html><body>
        <section class="crr_app_stt">
            <h3 class="crr_app_hh">Senior Rust Engineer</h3>
            <span class="crr_app_tp bluecrr">Engineering</span>
            <span class="crr_app_plc">Kochi</span>
            <p>Posted on 12th March 2024</p>
            <p><strong>What's important to us:</strong></p>
            <p>You care about reliable systems.</p>
            <p>We expect 5+ years of experience building services.</p>
            <p><strong>Required Skills</strong></p>
            <ul><li>Rust</li><li>PostgreSQL</li></ul>
            <p><strong>Technical Stack</strong></p>
            <ul><li>Tokio</li></ul>
            <p><strong>What Company Offers:</strong></p>
            <p>Medical insurance and flexible hours.</p>
            <p>Salary: 18-24 LPA</p>
            <a href="mailto:careers@techversantinfotech.com?subject=Rust">Email us</a>
            <a class="crr_app_nw" href="/talent/apply/" datatitle="TV-1042">Apply Now</a>
        </section>
        </body></html>
    "#;

    #[test]
    fn extracts_every_field_of_a_full_listing() {
        let jobs = client().parse_jobs(FULL_LISTING, day()).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];

        assert_eq!(job.title, "Senior Rust Engineer");
        assert_eq!(job.category, "Engineering");
        assert_eq!(job.location, "Kochi");
        assert_eq!(job.experience, "5+ years of experience");
        assert_eq!(job.posting_date, "2024-03-12");
        assert_eq!(job.description, "You care about reliable systems.");
        assert_eq!(job.skills, "Rust; PostgreSQL; Tokio");
        assert_eq!(job.contact_email, "careers@techversantinfotech.com");
        assert_eq!(job.benefits, "Medical insurance and flexible hours.");
        assert_eq!(job.salary, "18-24 LPA");
        assert_eq!(job.job_url, "https://techversantinfotech.com/talent/apply/");
        assert_eq!(job.job_id, "TV-1042");
        assert_eq!(job.scraped_date, "2024-03-20");
        assert_eq!(job.source_url, "https://techversantinfotech.com/talent/");
    }

    #[test]
    fn label_rules_fill_in_for_missing_classes() {
        let html = r#"
            <section class="crr_app_stt">
                <h2>QA Analyst</h2>
                <ul>
                    <li>Location: Trivandrum</li>
                    <li>Experience: 2-4 years</li>
                    <li>Department: Quality</li>
                </ul>
                <p>Write to hr@techversantinfotech.com</p>
                <a href="https://techversantinfotech.com/jobs?id=88">Details</a>
            </section>
        "#;
        let jobs = client().parse_jobs(html, day()).unwrap();
        let job = &jobs[0];

        assert_eq!(job.title, "QA Analyst");
        assert_eq!(job.location, "Trivandrum");
        assert_eq!(job.experience, "2-4 years");
        assert_eq!(job.category, "Quality");
        assert_eq!(job.contact_email, "hr@techversantinfotech.com");
        assert_eq!(job.job_id, "88");
        assert_eq!(job.salary, NOT_AVAILABLE);
        assert_eq!(job.posting_date, NOT_AVAILABLE);
    }

    #[test]
    fn listing_without_link_is_excluded() {
        let html = r#"
            <section class="crr_app_stt"><h3 class="crr_app_hh">Orphan</h3></section>
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Designer</h3>
                <a class="crr_app_nw" href="/talent/apply/">Apply</a>
            </section>
        "#;
        let jobs = client().parse_jobs(html, day()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Designer");
    }

    #[test]
    fn shared_apply_url_gets_unique_ids() {
        let html = r#"
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Designer</h3>
                <a class="crr_app_nw" href="/talent/apply/">Apply</a>
            </section>
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Developer</h3>
                <a class="crr_app_nw" href="/talent/apply/">Apply</a>
            </section>
        "#;
        let jobs = client().parse_jobs(html, day()).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_id, "apply");
        assert_eq!(jobs[1].job_id, "apply-2");
    }

    #[test]
    fn suffixed_ids_never_repeat_on_a_shared_url() {
        let html = r#"
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Tester</h3>
                <a class="crr_app_nw" href="/talent/apply/" datatitle="x-3">Apply</a>
            </section>
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Designer</h3>
                <a class="crr_app_nw" href="/talent/apply/" datatitle="x">Apply</a>
            </section>
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Developer</h3>
                <a class="crr_app_nw" href="/talent/apply/" datatitle="x">Apply</a>
            </section>
        "#;
        let jobs = client().parse_jobs(html, day()).unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["x-3", "x", "x-3-2"]);
    }

    #[test]
    fn missing_container_yields_no_records() {
        let jobs = client()
            .parse_jobs("<html><body><p>We are hiring soon</p></body></html>", day())
            .unwrap();
        assert!(jobs.is_empty());
    }

    #[test]
    fn pagination_is_detected_but_not_followed() {
        let c = client();
        let with = scraper::Html::parse_document(r#"<ul class="pagination"><li>1</li></ul>"#);
        let without = scraper::Html::parse_document("<p>Only listings</p>");
        assert!(c.has_next_page(&with));
        assert!(!c.has_next_page(&without));
    }

    #[test]
    fn next_link_and_load_more_button_count_as_pagination() {
        let c = client();
        let next_link = scraper::Html::parse_document(r#"<a href="/talent/page/2/">Next »</a>"#);
        let load_more = scraper::Html::parse_document("<button type=\"button\">Load more jobs</button>");
        let unrelated = scraper::Html::parse_document(
            r#"<a href="/about/">About us</a><button>Submit</button>"#,
        );
        assert!(c.has_next_page(&next_link));
        assert!(c.has_next_page(&load_more));
        assert!(!c.has_next_page(&unrelated));
    }

    #[test]
    fn experience_prose_does_not_hide_the_years_pattern() {
        let html = r#"
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Cloud Engineer</h3>
                <ul><li>Experience with AWS is a plus</li></ul>
                <p>We need 3+ years of experience in Rust.</p>
                <a class="crr_app_nw" href="/talent/apply/">Apply</a>
            </section>
        "#;
        let jobs = client().parse_jobs(html, day()).unwrap();
        assert_eq!(jobs[0].experience, "3+ years of experience");
    }

    #[test]
    fn labels_on_one_line_split_at_line_break() {
        let html = r#"
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Backend Developer</h3>
                <p><strong>Location:</strong> Kochi <br><strong>Experience:</strong> 3-5 years</p>
                <a class="crr_app_nw" href="/talent/apply/">Apply</a>
            </section>
        "#;
        let jobs = client().parse_jobs(html, day()).unwrap();
        assert_eq!(jobs[0].location, "Kochi");
        assert_eq!(jobs[0].experience, "3-5 years");
    }

    #[test]
    fn heading_reading_not_available_is_skipped() {
        let html = r#"
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">N/A</h3>
                <a class="crr_app_nw" href="/talent/apply/">Apply</a>
            </section>
            <section class="crr_app_stt">
                <h3 class="crr_app_hh">Designer</h3>
                <a class="crr_app_nw" href="/talent/apply/">Apply</a>
            </section>
        "#;
        let jobs = client().parse_jobs(html, day()).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Designer");
    }
}
