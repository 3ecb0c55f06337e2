//! Search results page parsing.
//!
//! The results list lives at `div.search-results-holder ul.search-results`;
//! each `li` holds one anchor with the decision link, an `h4` title, an info
//! block whose non-empty lines are date, company, decision and optional
//! extras, and a tag span.
//!
//! A missing results list means the page layout changed and is fatal. A
//! single broken entry is not: it comes back as an [`EntryError`] next to the
//! parsed records.

use crate::error::{EntryError, ScrapeError};
use crate::output::{decision_id_from_location, MetadataRecord, SearchPage};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static SEL_RESULTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.search-results-holder ul.search-results").unwrap());
static SEL_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());
static SEL_ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static SEL_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("h4").unwrap());
static SEL_INFO: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.search-result__info-main").unwrap());
static SEL_TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("span.search-result__tag").unwrap());

/// Parse one search results page requested at offset `start`.
pub fn parse_results_page(html: &str, start: usize) -> Result<SearchPage, ScrapeError> {
    let document = Html::parse_document(html);

    let list = document
        .select(&SEL_RESULTS)
        .next()
        .ok_or_else(|| ScrapeError::MalformedHtml {
            start,
            detail: "no 'div.search-results-holder ul.search-results' element".into(),
        })?;

    let mut page = SearchPage {
        start,
        ..SearchPage::default()
    };

    // Direct children only; nested lists inside an entry are not entries.
    let items = list
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| SEL_ITEM.matches(el));

    for (index, item) in items.enumerate() {
        match parse_entry(item, start + index) {
            Ok(record) => page.records.push(record),
            Err(e) => page.malformed.push(e),
        }
    }

    Ok(page)
}

/// Parse a single `li` result item. `index` is its absolute position in the
/// result set and only used for error messages.
pub fn parse_entry(item: ElementRef<'_>, index: usize) -> Result<MetadataRecord, EntryError> {
    let missing = |element: &str| EntryError::MissingElement {
        index,
        element: element.to_string(),
    };

    let anchor = item.select(&SEL_ANCHOR).next().ok_or_else(|| missing("anchor"))?;
    let location = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(|| missing("anchor href"))?
        .to_string();

    let title = anchor
        .select(&SEL_TITLE)
        .next()
        .map(|el| text_of(el).trim().to_string())
        .ok_or_else(|| missing("h4 title"))?;

    let info = anchor
        .select(&SEL_INFO)
        .next()
        .map(text_of)
        .ok_or_else(|| missing("info block"))?;

    let tag = anchor
        .select(&SEL_TAG)
        .next()
        .map(|el| text_of(el).trim().to_string())
        .ok_or_else(|| missing("tag"))?;

    let lines = metadata_lines(&info);
    let [date, company, decision, extras @ ..] = lines.as_slice() else {
        return Err(EntryError::TooFewMetadataLines {
            index,
            found: lines.len(),
        });
    };

    let decision_id =
        decision_id_from_location(&location).ok_or_else(|| EntryError::NoDecisionId {
            index,
            location: location.clone(),
        })?;

    Ok(MetadataRecord {
        decision_id,
        location,
        title,
        date: date.clone(),
        company: company.clone(),
        decision: decision.clone(),
        extras: extras.join(","),
        tag,
    })
}

/// Split an info block into trimmed, non-empty lines.
pub fn metadata_lines(info: &str) -> Vec<String> {
    info.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}
