#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use cnatra_core::date_codec::{self, DateNumber};
use cnatra_core::{PostbackRequest, Transport, TransportError};
use reqwest::StatusCode;

pub const SCHEDULE_URL: &str = "https://schedules.test/schedule_data.aspx?sq=";

pub fn state_page(view_state: &str, generator: &str, validation: &str) -> String {
    format!(
        r#"<html><body><form method="post" action="./schedule_data.aspx">
        <input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="{view_state}" />
        <input type="hidden" name="__VIEWSTATEGENERATOR" id="__VIEWSTATEGENERATOR" value="{generator}" />
        <input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="{validation}" />
        </form></body></html>"#
    )
}

pub fn published_page(date: &str) -> String {
    format!(
        r#"<html><body>
        <table id="dgCoversheet"><tr><td><font face="Arial">NOTES FOR {date}<br>BRIEF 0700</font></td></tr></table>
        <table id="dgEvents"></table>
        </body></html>"#
    )
}

pub fn unpublished_page() -> String {
    r#"<html><body><p class="messageL">Schedule is not yet published.</p></body></html>"#
        .to_string()
}

/// In-process stand-in for the schedule site.
///
/// Calendar clicks answer with a page whose view state names the selected date number, so
/// the following "View Schedule" postback can be checked against it.
#[derive(Default)]
pub struct FakeSite {
    pub unpublished: HashSet<String>,
    pub fail_calendar_on: HashSet<String>,
    pub broken_date_pages: HashSet<String>,
    pub base_failures: Mutex<HashMap<String, usize>>,
    pub not_found: HashSet<String>,
    pub requests: Mutex<Vec<(String, PostbackRequest)>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unpublished(mut self, date: &str) -> Self {
        self.unpublished.insert(date.to_string());
        self
    }

    pub fn fail_calendar_on(mut self, date: &str) -> Self {
        self.fail_calendar_on.insert(date.to_string());
        self
    }

    pub fn broken_date_page(mut self, date: &str) -> Self {
        self.broken_date_pages.insert(date.to_string());
        self
    }

    pub fn fail_base_loads(self, squadron_id: &str, times: usize) -> Self {
        self.base_failures
            .lock()
            .unwrap()
            .insert(format!("{SCHEDULE_URL}{squadron_id}"), times);
        self
    }

    pub fn not_found(mut self, squadron_id: &str) -> Self {
        self.not_found.insert(format!("{SCHEDULE_URL}{squadron_id}"));
        self
    }

    pub fn requests(&self) -> Vec<(String, PostbackRequest)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, squadron_id: &str) -> Vec<PostbackRequest> {
        let url = format!("{SCHEDULE_URL}{squadron_id}");
        self.requests()
            .into_iter()
            .filter(|(requested, _)| *requested == url)
            .map(|(_, request)| request)
            .collect()
    }

    fn respond(&self, url: &str, request: &PostbackRequest) -> Result<String, TransportError> {
        if self.not_found.contains(url) {
            return Err(TransportError::Status {
                status: StatusCode::NOT_FOUND,
                url: url.to_string(),
            });
        }

        match request {
            PostbackRequest::BaseLoad => {
                let mut failures = self.base_failures.lock().unwrap();
                if let Some(remaining) = failures.get_mut(url) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(TransportError::Unavailable("connection reset".into()));
                    }
                }
                Ok(state_page("BASE-VS", "BASE-GEN", "BASE-EV"))
            }
            PostbackRequest::CalendarClick { date_number, .. } => {
                let date = decode(*date_number);
                if self.fail_calendar_on.contains(&date) {
                    return Err(TransportError::Status {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        url: url.to_string(),
                    });
                }
                if self.broken_date_pages.contains(&date) {
                    return Ok("<html><body>Session expired</body></html>".to_string());
                }
                Ok(state_page(
                    &format!("DATE-{date_number}"),
                    &format!("GEN-{date_number}"),
                    &format!("EV-{date_number}"),
                ))
            }
            PostbackRequest::ViewSchedule { state } => {
                let days = state
                    .view_state()
                    .trim_start_matches("DATE-")
                    .parse::<i64>()
                    .map_err(|_| TransportError::Unavailable("unexpected view state".into()))?;
                let date = decode(DateNumber::from_days(days));
                if self.unpublished.contains(&date) {
                    Ok(unpublished_page())
                } else {
                    Ok(published_page(&date))
                }
            }
        }
    }
}

fn decode(number: DateNumber) -> String {
    date_codec::decode(number).unwrap_or_default()
}

impl Transport for FakeSite {
    async fn postback(&self, url: &str, request: &PostbackRequest) -> Result<String, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), request.clone()));
        self.respond(url, request)
    }
}
