use std::path::PathBuf;
use std::time::Duration;

/// Marker written in place of any field the page did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn is_available(value: &str) -> bool {
    !value.is_empty() && value != NOT_AVAILABLE
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub target_url: String,
    pub output_path: PathBuf,
    pub source_name: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            target_url: "https://techversantinfotech.com/talent/".to_string(),
            output_path: PathBuf::from("Techversant_Jobs.xlsx"),
            source_name: "Techversant Infotech".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Columns of the Jobs sheet, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    Category,
    Location,
    Experience,
    PostingDate,
    Description,
    Skills,
    ContactEmail,
    Benefits,
    Salary,
    JobUrl,
    JobId,
    ScrapedDate,
    SourceUrl,
}

impl Column {
    pub const ALL: [Column; 14] = [
        Column::Title,
        Column::Category,
        Column::Location,
        Column::Experience,
        Column::PostingDate,
        Column::Description,
        Column::Skills,
        Column::ContactEmail,
        Column::Benefits,
        Column::Salary,
        Column::JobUrl,
        Column::JobId,
        Column::ScrapedDate,
        Column::SourceUrl,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Self::Title => "JobTitle",
            Self::Category => "JobCategory",
            Self::Location => "Location",
            Self::Experience => "ExperienceRequired",
            Self::PostingDate => "PostingDate",
            Self::Description => "JobDescriptionSummary",
            Self::Skills => "SkillsRequired",
            Self::ContactEmail => "ContactEmail",
            Self::Benefits => "CompanyBenefits",
            Self::Salary => "Salary",
            Self::JobUrl => "JobURL",
            Self::JobId => "JobID",
            Self::ScrapedDate => "ScrapedDate",
            Self::SourceUrl => "SourceURL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub title: String,
    pub category: String,
    pub location: String,
    pub experience: String,
    pub posting_date: String,
    pub description: String,
    pub skills: String,
    pub contact_email: String,
    pub benefits: String,
    pub salary: String,
    pub job_url: String,
    pub job_id: String,
    pub scraped_date: String,
    pub source_url: String,
}

impl JobRecord {
    /// Every optional field starts out as [`NOT_AVAILABLE`].
    pub fn new(title: String, job_url: String, job_id: String) -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            title,
            category: na(),
            location: na(),
            experience: na(),
            posting_date: na(),
            description: na(),
            skills: na(),
            contact_email: na(),
            benefits: na(),
            salary: na(),
            job_url,
            job_id,
            scraped_date: na(),
            source_url: na(),
        }
    }

    pub fn value(&self, column: Column) -> &str {
        match column {
            Column::Title => &self.title,
            Column::Category => &self.category,
            Column::Location => &self.location,
            Column::Experience => &self.experience,
            Column::PostingDate => &self.posting_date,
            Column::Description => &self.description,
            Column::Skills => &self.skills,
            Column::ContactEmail => &self.contact_email,
            Column::Benefits => &self.benefits,
            Column::Salary => &self.salary,
            Column::JobUrl => &self.job_url,
            Column::JobId => &self.job_id,
            Column::ScrapedDate => &self.scraped_date,
            Column::SourceUrl => &self.source_url,
        }
    }

    pub fn set(&mut self, column: Column, value: String) {
        let slot = match column {
            Column::Title => &mut self.title,
            Column::Category => &mut self.category,
            Column::Location => &mut self.location,
            Column::Experience => &mut self.experience,
            Column::PostingDate => &mut self.posting_date,
            Column::Description => &mut self.description,
            Column::Skills => &mut self.skills,
            Column::ContactEmail => &mut self.contact_email,
            Column::Benefits => &mut self.benefits,
            Column::Salary => &mut self.salary,
            Column::JobUrl => &mut self.job_url,
            Column::JobId => &mut self.job_id,
            Column::ScrapedDate => &mut self.scraped_date,
            Column::SourceUrl => &mut self.source_url,
        };
        *slot = value;
    }

    pub fn row(&self) -> Vec<&str> {
        Column::ALL.iter().map(|c| self.value(*c)).collect()
    }
}
