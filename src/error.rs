use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    /// Network failures abort the run; everything else is a local problem.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Status { .. })
    }
}
