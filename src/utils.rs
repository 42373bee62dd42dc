use chrono::NaiveDate;
use regex::Regex;
use scraper::ElementRef;
use scraper::node::Node;
use std::sync::LazyLock;

static POSTED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(date\s+)?posted(\s+on)?\s*:?\s*").unwrap());
static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());

/// Elements that start a new visual line when rendered.
const LINE_BREAKING_TAGS: [&str; 17] = [
    "br", "p", "div", "li", "ul", "ol", "tr", "td", "dd", "dt", "section", "h1", "h2", "h3",
    "h4", "h5", "h6",
];

const DATE_FORMATS: [&str; 8] = [
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn element_text(element: ElementRef) -> String {
    normalize_ws(&element.text().collect::<String>())
}

/// Text of an element split where the page would break lines, each line
/// whitespace-normalized. Empty lines are dropped.
pub fn element_lines(element: ElementRef) -> Vec<String> {
    let mut raw = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => raw.push_str(text),
            Node::Element(el) if LINE_BREAKING_TAGS.contains(&el.name()) => raw.push('\n'),
            _ => {}
        }
    }
    raw.lines()
        .map(normalize_ws)
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Turns "Posted on 12th March 2024" into "2024-03-12".
/// Text that no known format can parse is returned cleaned but unparsed.
pub fn normalize_posting_date(raw: &str) -> Option<String> {
    let text = normalize_ws(&POSTED_PREFIX.replace(raw, ""));
    let text = ORDINAL_SUFFIX.replace_all(&text, "$1").to_string();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .or(Some(text))
}
