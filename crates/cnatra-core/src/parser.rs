//! Interpretation of "View Schedule" response pages.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::page_state::{has_published_schedule_in, selector};

static FONT_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</?font\b[^>]*>").unwrap());
static BR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\b[^>]*>").unwrap());

/// One row of the flight-event table, keyed by column header.
pub type ScheduleEvent = BTreeMap<String, String>;

/// Published schedule for a squadron on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub front_page_url: String,
    #[serde(default)]
    pub events: Vec<ScheduleEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Published(ScheduleEntry),
    /// The server has not published a schedule for the day yet.
    Unpublished,
}

impl ScheduleOutcome {
    pub fn into_entry(self) -> Option<ScheduleEntry> {
        match self {
            ScheduleOutcome::Published(entry) => Some(entry),
            ScheduleOutcome::Unpublished => None,
        }
    }
}

/// Entries keyed by date string. Unpublished dates have no key.
pub type ScheduleBatchResult = BTreeMap<String, ScheduleEntry>;

pub fn parse(html: &str, front_page_url: &str) -> ScheduleOutcome {
    let document = Html::parse_document(html);
    if !has_published_schedule_in(&document) {
        return ScheduleOutcome::Unpublished;
    }

    ScheduleOutcome::Published(ScheduleEntry {
        notes: notes_markup(&document).map(|markup| clean_notes(&markup)),
        front_page_url: front_page_url.to_string(),
        // TODO: parse the flight-event table once its column layout is pinned down.
        events: Vec::new(),
    })
}

fn notes_markup(document: &Html) -> Option<String> {
    let table = document.select(&selector("table#dgCoversheet")).next()?;
    if let Some(font) = table.select(&selector("td font")).next() {
        return Some(font.html());
    }
    table
        .select(&selector("td"))
        .next()
        .map(|cell| cell.inner_html())
}

/// Strip `<font>` tags, turn `<br>` tags into newlines and decode common entities.
///
/// Runs once over serialized markup. Escaped tags in the notes text come out as literal
/// tag text, so the output is not meant to be fed back in.
pub fn clean_notes(markup: &str) -> String {
    decode_entities(&strip_markup(markup))
}

fn strip_markup(markup: &str) -> String {
    let without_font = FONT_TAG.replace_all(markup, "");
    BR_TAG.replace_all(&without_font, "\n").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.cnatra.navy.mil/scheds/tw1/SQ-VT-7/!2021-12-18!VT-7!Frontpage.pdf";

    fn schedule_page(notes: &str) -> String {
        format!(
            r#"<html><body>
            <table id="dgCoversheet"><tr><td><font face="Arial" size="2">{notes}</font></td></tr></table>
            <table id="dgEvents"><tr><td>Brief</td><td>EDT</td></tr></table>
            </body></html>"#
        )
    }

    #[test]
    fn test_unpublished_marker_wins() {
        let html = format!(
            "{}<p class=\"messageL\">Schedule not published.</p>",
            schedule_page("LINE ONE")
        );
        assert_eq!(parse(&html, URL), ScheduleOutcome::Unpublished);
    }

    #[test]
    fn test_notes_are_cleaned() {
        let html = schedule_page(
            "SAFETY STANDDOWN 0700<br>NO FLY DAY<BR/><font color=red>BRIEF</font> AT 0800 &amp; CHOW",
        );
        let entry = parse(&html, URL).into_entry().unwrap();
        assert_eq!(
            entry.notes.as_deref(),
            Some("SAFETY STANDDOWN 0700\nNO FLY DAY\nBRIEF AT 0800 & CHOW")
        );
        assert_eq!(entry.front_page_url, URL);
        assert!(entry.events.is_empty());
    }

    #[test]
    fn test_missing_notes_table() {
        let html = "<html><body><table id=\"dgEvents\"></table></body></html>";
        let entry = parse(html, URL).into_entry().unwrap();
        assert_eq!(entry.notes, None);
    }

    #[test]
    fn test_notes_without_font_use_cell() {
        let html = r#"<table id="dgCoversheet"><tr><td>A<br>B</td></tr></table>"#;
        let entry = parse(html, URL).into_entry().unwrap();
        assert_eq!(entry.notes.as_deref(), Some("A\nB"));
    }

    #[test]
    fn test_clean_notes_variants() {
        assert_eq!(
            clean_notes(r#"<FONT SIZE="2">x<Br />y<br>z</FONT><font/>"#),
            "x\ny\nz"
        );
    }

    #[test]
    fn test_strip_markup_is_idempotent() {
        for markup in [
            "<font>ALPHA<br>BRAVO<br/>CHARLIE &amp; DELTA</font>",
            "<font>USE &lt;br&gt; TAG</font>",
            "<FONT><font>NESTED</font></FONT><BR >",
        ] {
            let once = strip_markup(markup);
            assert_eq!(strip_markup(&once), once);
        }
    }

    #[test]
    fn test_escaped_tags_stay_literal() {
        assert_eq!(clean_notes("<font>USE &lt;br&gt; TAG</font>"), "USE <br> TAG");
        assert_eq!(
            clean_notes("&lt;font color=red&gt;HOT&lt;/font&gt;"),
            "<font color=red>HOT</font>"
        );
    }

    #[test]
    fn test_escaped_tags_in_page_notes() {
        let html = schedule_page("SEE &lt;BR&gt; CODE &amp;amp; STUFF");
        let entry = parse(&html, URL).into_entry().unwrap();
        assert_eq!(entry.notes.as_deref(), Some("SEE <BR> CODE &amp; STUFF"));
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = ScheduleEntry {
            notes: None,
            front_page_url: URL.to_string(),
            events: Vec::new(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["frontPageUrl"], URL);
        assert!(json.get("notes").is_none());
    }
}
