//! Named extraction rules and the building blocks site clients compose them from.
//!
//! A rule maps one listing block to an optional field value. Clients hand the
//! crawler an ordered rule list; for each column the first rule that yields a
//! value wins and anything left unresolved becomes [`NOT_AVAILABLE`].
//!
//! [`NOT_AVAILABLE`]: crate::models::NOT_AVAILABLE

use crate::models::{Column, is_available};
use crate::utils::{element_lines, element_text, non_empty, normalize_ws};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static LABEL_CONTAINERS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, li, span, div, td, dd, strong").unwrap());

/// Labels careers pages put in front of a value, always followed by a colon.
static KNOWN_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:location|experience|category|department|salary|ctc|compensation|benefits|job description|job type|qualifications?|skills|openings|date posted|posted on)\s*:",
    )
    .unwrap()
});

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// One repeating listing container together with what rules need to read it.
pub struct ListingBlock<'a> {
    pub element: ElementRef<'a>,
    pub text: String,
    pub base_url: &'a Url,
}

impl<'a> ListingBlock<'a> {
    pub fn new(element: ElementRef<'a>, base_url: &'a Url) -> Self {
        let text = element_text(element);
        Self {
            element,
            text,
            base_url,
        }
    }

    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'a>> {
        let selector = Selector::parse(selector).ok()?;
        self.element.select(&selector).next()
    }

    pub fn resolve(&self, href: &str) -> Option<String> {
        self.base_url.join(href.trim()).ok().map(String::from)
    }
}

pub type RuleFn = fn(&ListingBlock) -> Option<String>;

#[derive(Clone, Copy)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub column: Column,
    extract: RuleFn,
}

impl ExtractionRule {
    pub const fn new(name: &'static str, column: Column, extract: RuleFn) -> Self {
        Self {
            name,
            column,
            extract,
        }
    }

    pub fn apply(&self, block: &ListingBlock) -> Option<String> {
        (self.extract)(block)
            .map(|v| normalize_ws(&v))
            .filter(|v| is_available(v))
    }
}

impl std::fmt::Debug for ExtractionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionRule")
            .field("name", &self.name)
            .field("column", &self.column)
            .finish()
    }
}

/// Runs every rule in order and keeps the first hit per column.
pub fn apply_rules(rules: &[ExtractionRule], block: &ListingBlock) -> HashMap<Column, String> {
    let mut found = HashMap::new();
    for rule in rules {
        if found.contains_key(&rule.column) {
            continue;
        }
        if let Some(value) = rule.apply(block) {
            log::trace!("rule {} matched: {}", rule.name, value);
            found.insert(rule.column, value);
        }
    }
    found
}

pub fn text_of(block: &ListingBlock, selector: &str) -> Option<String> {
    block.select_first(selector).map(element_text)
}

/// Value of a `Label: value` pair, e.g. `<li>Location: Kochi</li>`.
///
/// The colon is required. The value stops at a line break or at the next
/// known label, and the tightest element carrying the pair wins.
pub fn labelled_value(block: &ListingBlock, labels: &[&str]) -> Option<String> {
    find_label(block, labels, true)
}

/// Like [`labelled_value`] but the colon is optional, for prefixes that read
/// as prose such as "Posted on 12 March 2024".
pub fn prefixed_value(block: &ListingBlock, labels: &[&str]) -> Option<String> {
    find_label(block, labels, false)
}

fn find_label(block: &ListingBlock, labels: &[&str], colon_required: bool) -> Option<String> {
    labels.iter().find_map(|label| {
        block
            .element
            .select(&LABEL_CONTAINERS)
            .filter_map(|el| {
                let lines = element_lines(el);
                let value = lines
                    .iter()
                    .flat_map(|line| label_segments(line))
                    .find_map(|segment| value_after_label(segment, label, colon_required))
                    .map(str::to_string)?;
                Some((lines.iter().map(String::len).sum::<usize>(), value))
            })
            .min_by_key(|(len, _)| *len)
            .map(|(_, value)| value)
    })
}

/// Splits one line at every known label so neighbouring pairs stay apart.
fn label_segments(line: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = KNOWN_LABEL.find_iter(line).map(|m| m.start()).collect();
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }
    let ends = starts.iter().skip(1).copied().chain(std::iter::once(line.len()));
    starts
        .iter()
        .zip(ends)
        .map(|(&start, end)| line[start..end].trim())
        .collect()
}

fn value_after_label<'s>(segment: &'s str, label: &str, colon_required: bool) -> Option<&'s str> {
    let head = segment.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }

    let rest = &segment[label.len()..];
    if rest.chars().next().is_some_and(char::is_alphanumeric) {
        return None;
    }
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix(':') {
        Some(after) => after,
        None if colon_required => return None,
        None => rest,
    };

    let value = rest.trim();
    if value.is_empty() { None } else { Some(value) }
}

/// First match of any pattern over the block text.
pub fn first_pattern_match(block: &ListingBlock, patterns: &[Regex]) -> Option<String> {
    patterns
        .iter()
        .find_map(|re| re.find(&block.text))
        .map(|m| m.as_str().to_string())
}

fn heading_elements<'a>(
    block: &ListingBlock<'a>,
    matches: impl Fn(&str) -> bool,
) -> Vec<ElementRef<'a>> {
    let Ok(selector) = Selector::parse("strong, b") else {
        return Vec::new();
    };
    block
        .element
        .select(&selector)
        .filter(|el| matches(&element_text(*el)))
        .collect()
}

fn next_sibling_named<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == tag)
}

fn parent_element<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Paragraph that follows a bold heading such as "What Company Offers:".
/// Falls back to the rest of the heading's own paragraph.
pub fn paragraph_after_heading(block: &ListingBlock, heading: &str) -> Option<String> {
    let wanted = normalize_heading(heading);
    let strong = heading_elements(block, |text| normalize_heading(text) == wanted)
        .into_iter()
        .next()?;
    let parent = parent_element(strong)?;

    if let Some(p) = next_sibling_named(parent, "p") {
        return non_empty(element_text(p));
    }

    let own = element_text(parent);
    let heading_text = element_text(strong);
    own.strip_prefix(&heading_text)
        .map(|rest| rest.trim().to_string())
        .and_then(non_empty)
}

/// List items under every bold heading containing one of `keywords`.
pub fn list_after_headings(block: &ListingBlock, keywords: &[&str]) -> Vec<String> {
    let Ok(li) = Selector::parse("li") else {
        return Vec::new();
    };
    heading_elements(block, |text| keywords.iter().any(|k| text.contains(k)))
        .into_iter()
        .filter_map(parent_element)
        .filter_map(|parent| next_sibling_named(parent, "ul"))
        .flat_map(|ul| ul.select(&li).map(element_text).collect::<Vec<_>>())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn mailto_address(block: &ListingBlock) -> Option<String> {
    let selector = Selector::parse(r#"a[href^="mailto:"], a[href^="MAILTO:"]"#).ok()?;
    block.element.select(&selector).find_map(|a| {
        let href = a.value().attr("href")?;
        let address = href.get("mailto:".len()..)?;
        let address = address.split('?').next()?.trim();
        non_empty(address.to_string())
    })
}

pub fn email_in_text(block: &ListingBlock) -> Option<String> {
    EMAIL.find(&block.text).map(|m| m.as_str().to_string())
}

/// First link that points at a page rather than a mail client or fragment.
pub fn first_page_link(block: &ListingBlock) -> Option<String> {
    let selector = Selector::parse("a[href]").ok()?;
    block.element.select(&selector).find_map(|a| {
        let href = a.value().attr("href")?.trim();
        let lower = href.to_ascii_lowercase();
        if href.is_empty()
            || href.starts_with('#')
            || lower.starts_with("mailto:")
            || lower.starts_with("javascript:")
            || lower.starts_with("tel:")
        {
            return None;
        }
        block.resolve(href)
    })
}

fn normalize_heading(text: &str) -> String {
    normalize_ws(&text.replace('\u{2019}', "'"))
        .trim_end_matches(':')
        .trim()
        .to_lowercase()
}
