//! Replays the browser's postback sequence for one squadron.
//!
//! A session loads the squadron's page once to capture its base state, then walks each
//! requested date through two postbacks: a calendar click on the date and a click on
//! "View Schedule". Each postback echoes the state tokens of the page before it, so the
//! exchanges of a session are strictly sequential.

use tracing::{debug, info};

use crate::date_codec::{self, DateNumber};
use crate::error::ScheduleError;
use crate::page_state::{self, PageState, PostbackRequest};
use crate::parser::{self, ScheduleBatchResult, ScheduleOutcome};
use crate::transport::{Transport, squadron_url};

/// Progress of a single date through the postback sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStep {
    Start,
    /// The calendar click succeeded; holds the state of the date page.
    DateSelected(PageState),
    /// Holds the raw "View Schedule" response.
    ScheduleRequested(String),
    Done(ScheduleOutcome),
}

pub struct ScheduleSession<'t, T> {
    transport: &'t T,
    squadron_id: String,
    url: String,
}

impl<'t, T: Transport> ScheduleSession<'t, T> {
    pub fn new(transport: &'t T, schedule_url: &str, squadron_id: &str) -> Self {
        Self {
            transport,
            squadron_id: squadron_id.to_string(),
            url: squadron_url(schedule_url, squadron_id),
        }
    }

    pub fn squadron_id(&self) -> &str {
        &self.squadron_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the published schedules for `dates`, in input order.
    ///
    /// Issues `1 + 2 * dates.len()` exchanges. Dates whose schedule is not published yet
    /// are absent from the result. Any error aborts the whole batch and discards the
    /// entries gathered so far.
    pub async fn fetch_schedules<S: AsRef<str>>(
        &self,
        dates: &[S],
    ) -> Result<ScheduleBatchResult, ScheduleError> {
        if dates.is_empty() {
            return Err(ScheduleError::EmptyBatch);
        }
        let encoded = dates
            .iter()
            .map(|date| {
                let date: &str = date.as_ref();
                date_codec::encode(date).map(|number| (date, number))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(squadron = %self.squadron_id, dates = encoded.len(), "Starting schedule session");
        let base_state = self.load_base_state().await?;

        let mut schedules = ScheduleBatchResult::new();
        for (date, number) in encoded {
            match self.walk_date(&base_state, date, number).await? {
                ScheduleOutcome::Published(entry) => {
                    schedules.insert(date.to_string(), entry);
                }
                ScheduleOutcome::Unpublished => {
                    debug!(squadron = %self.squadron_id, date, "Schedule not published yet");
                }
            }
        }

        info!(
            squadron = %self.squadron_id,
            published = schedules.len(),
            "Schedule session finished"
        );
        Ok(schedules)
    }

    async fn load_base_state(&self) -> Result<PageState, ScheduleError> {
        let html = self
            .transport
            .postback(&self.url, &PostbackRequest::BaseLoad)
            .await?;
        page_state::extract(&html)
    }

    async fn walk_date(
        &self,
        base_state: &PageState,
        date: &str,
        number: DateNumber,
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let mut step = DateStep::Start;
        loop {
            step = match step {
                DateStep::Done(outcome) => return Ok(outcome),
                pending => self.advance(pending, base_state, date, number).await?,
            };
        }
    }

    /// Perform the exchange (if any) that moves `step` forward by one state.
    pub async fn advance(
        &self,
        step: DateStep,
        base_state: &PageState,
        date: &str,
        number: DateNumber,
    ) -> Result<DateStep, ScheduleError> {
        match step {
            DateStep::Start => {
                debug!(squadron = %self.squadron_id, date, date_number = %number, "Selecting date");
                let request = PostbackRequest::calendar_click(base_state, number);
                let html = self.transport.postback(&self.url, &request).await?;
                Ok(DateStep::DateSelected(page_state::extract(&html)?))
            }
            DateStep::DateSelected(date_state) => {
                debug!(squadron = %self.squadron_id, date, "Requesting schedule");
                let request = PostbackRequest::view_schedule(&date_state);
                let html = self.transport.postback(&self.url, &request).await?;
                Ok(DateStep::ScheduleRequested(html))
            }
            DateStep::ScheduleRequested(html) => {
                let front_page = date_codec::front_page_url(&self.squadron_id, date);
                Ok(DateStep::Done(parser::parse(&html, &front_page)))
            }
            done @ DateStep::Done(_) => Ok(done),
        }
    }
}
