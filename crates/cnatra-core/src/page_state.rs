//! Hidden form state captured from a schedule page and the postbacks built from it.

use scraper::{Html, Selector};

use crate::date_codec::DateNumber;
use crate::error::ScheduleError;

pub const VIEW_STATE: &str = "__VIEWSTATE";
pub const VIEW_STATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";
pub const EVENT_VALIDATION: &str = "__EVENTVALIDATION";
pub const EVENT_TARGET: &str = "__EVENTTARGET";
pub const EVENT_ARGUMENT: &str = "__EVENTARGUMENT";
pub const VIEW_SCHEDULE_BUTTON: &str = "btnViewSched";

pub const CALENDAR_TARGET: &str = "ctrlCalendar";
pub const VIEW_SCHEDULE_LABEL: &str = "View Schedule";

const NO_DATA_MARKER: &str = "p.messageL";

/// The three opaque tokens a page requires to be echoed back on the next request.
///
/// Values are read-only once extracted; building a postback clones them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    view_state: String,
    view_state_generator: String,
    event_validation: String,
}

impl PageState {
    pub fn new(
        view_state: impl Into<String>,
        view_state_generator: impl Into<String>,
        event_validation: impl Into<String>,
    ) -> Self {
        Self {
            view_state: view_state.into(),
            view_state_generator: view_state_generator.into(),
            event_validation: event_validation.into(),
        }
    }

    pub fn view_state(&self) -> &str {
        &self.view_state
    }

    pub fn view_state_generator(&self) -> &str {
        &self.view_state_generator
    }

    pub fn event_validation(&self) -> &str {
        &self.event_validation
    }

    fn fields(&self) -> [(&'static str, String); 3] {
        [
            (VIEW_STATE, self.view_state.clone()),
            (VIEW_STATE_GENERATOR, self.view_state_generator.clone()),
            (EVENT_VALIDATION, self.event_validation.clone()),
        ]
    }
}

/// One form submission against a squadron's schedule page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostbackRequest {
    /// Initial page load; sent without a body.
    BaseLoad,
    /// A click on a day in the calendar widget.
    CalendarClick {
        state: PageState,
        date_number: DateNumber,
    },
    /// A click on the "View Schedule" button.
    ViewSchedule { state: PageState },
}

impl PostbackRequest {
    pub fn calendar_click(state: &PageState, date_number: DateNumber) -> Self {
        PostbackRequest::CalendarClick {
            state: state.clone(),
            date_number,
        }
    }

    pub fn view_schedule(state: &PageState) -> Self {
        PostbackRequest::ViewSchedule {
            state: state.clone(),
        }
    }

    /// Ordered form fields, using the names the server expects.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            PostbackRequest::BaseLoad => Vec::new(),
            PostbackRequest::CalendarClick { state, date_number } => {
                let mut fields = state.fields().to_vec();
                fields.push((EVENT_TARGET, CALENDAR_TARGET.to_string()));
                fields.push((EVENT_ARGUMENT, date_number.to_string()));
                fields
            }
            PostbackRequest::ViewSchedule { state } => {
                let mut fields = state.fields().to_vec();
                fields.push((VIEW_SCHEDULE_BUTTON, VIEW_SCHEDULE_LABEL.to_string()));
                fields
            }
        }
    }

    /// `application/x-www-form-urlencoded` body; empty for a base load.
    pub fn encode_body(&self) -> String {
        self.form_fields()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn has_body(&self) -> bool {
        !matches!(self, PostbackRequest::BaseLoad)
    }
}

pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid built-in selector {css}: {err}"))
}

fn token_value(
    document: &Html,
    token: &'static str,
    css: &'static str,
) -> Result<String, ScheduleError> {
    document
        .select(&selector(css))
        .next()
        .and_then(|element| element.value().attr("value"))
        .map(str::to_string)
        .ok_or(ScheduleError::MissingStateToken { token })
}

/// Read the three state tokens from a page.
pub fn extract(html: &str) -> Result<PageState, ScheduleError> {
    let document = Html::parse_document(html);
    extract_from(&document)
}

pub(crate) fn extract_from(document: &Html) -> Result<PageState, ScheduleError> {
    Ok(PageState {
        view_state: token_value(document, VIEW_STATE, "#__VIEWSTATE")?,
        view_state_generator: token_value(
            document,
            VIEW_STATE_GENERATOR,
            "#__VIEWSTATEGENERATOR",
        )?,
        event_validation: token_value(document, EVENT_VALIDATION, "#__EVENTVALIDATION")?,
    })
}

/// False when the page carries the "no data" marker.
pub fn has_published_schedule(html: &str) -> bool {
    has_published_schedule_in(&Html::parse_document(html))
}

pub(crate) fn has_published_schedule_in(document: &Html) -> bool {
    document.select(&selector(NO_DATA_MARKER)).next().is_none()
}
