use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{parse_event_date, EventType, Semester, SubmissionRecord, SubmissionStatus};

/// Active filter selections for a dashboard.
///
/// `month` and the `start_date`/`end_date` pair are mutually exclusive when set
/// through [`FilterConfig::apply`]; if both are present anyway, month wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    pub status: Option<SubmissionStatus>,
    pub batch: Option<String>,
    pub semester: Option<Semester>,
    pub event_type: Option<EventType>,
    pub month: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One edit to a filter dimension; `None` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Status(Option<SubmissionStatus>),
    Batch(Option<String>),
    Semester(Option<Semester>),
    EventType(Option<EventType>),
    Month(Option<u32>),
    StartDate(Option<NaiveDate>),
    EndDate(Option<NaiveDate>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("month must be between 1 and 12 (found {0})")]
    InvalidMonth(u32),
    #[error("{field} has unrecognized value '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// The time predicate actually evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Any,
    Month(u32),
    Range { start: NaiveDate, end: NaiveDate },
}

impl FilterConfig {
    /// Apply a change, clearing the competing time filter when a new one is chosen.
    pub fn apply(&mut self, change: FilterChange) -> Result<(), FilterError> {
        match change {
            FilterChange::Status(status) => self.status = status,
            FilterChange::Batch(batch) => self.batch = batch.filter(|b| !b.trim().is_empty()),
            FilterChange::Semester(semester) => self.semester = semester,
            FilterChange::EventType(event_type) => self.event_type = event_type,
            FilterChange::Month(month) => {
                if let Some(month) = month {
                    validate_month(month)?;
                    self.start_date = None;
                    self.end_date = None;
                }
                self.month = month;
            }
            FilterChange::StartDate(date) => {
                if date.is_some() {
                    self.month = None;
                }
                self.start_date = date;
            }
            FilterChange::EndDate(date) => {
                if date.is_some() {
                    self.month = None;
                }
                self.end_date = date;
            }
        }
        Ok(())
    }

    pub fn with(mut self, change: FilterChange) -> Result<Self, FilterError> {
        self.apply(change)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterConfig::default()
    }

    /// A date range only takes effect once both ends are chosen.
    pub fn time_window(&self) -> TimeWindow {
        if let Some(month) = self.month {
            return TimeWindow::Month(month);
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => TimeWindow::Range { start, end },
            _ => TimeWindow::Any,
        }
    }

    pub fn matches(&self, record: &SubmissionRecord) -> bool {
        let content = &record.content;

        if self.status.is_some_and(|status| record.status != status) {
            return false;
        }
        if self
            .batch
            .as_deref()
            .is_some_and(|batch| content.batch != batch)
        {
            return false;
        }
        if self
            .semester
            .is_some_and(|semester| content.semester != semester)
        {
            return false;
        }
        if self
            .event_type
            .is_some_and(|event_type| content.event_type != event_type)
        {
            return false;
        }

        match self.time_window() {
            TimeWindow::Any => true,
            TimeWindow::Month(month) => content
                .event_date
                .is_some_and(|date| date.month() == month),
            // Calendar dates compare whole days, so `end` is inclusive through end of day.
            TimeWindow::Range { start, end } => content
                .event_date
                .is_some_and(|date| date >= start && date <= end),
        }
    }

    /// Full re-evaluation over the current record set, preserving input order.
    pub fn evaluate(&self, records: &[SubmissionRecord]) -> Vec<SubmissionRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

fn validate_month(month: u32) -> Result<(), FilterError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(FilterError::InvalidMonth(month))
    }
}

/// Query-string form of a filter configuration. Empty values mean "all".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterQuery {
    pub status: Option<String>,
    pub batch: Option<String>,
    pub semester: Option<String>,
    pub event_type: Option<String>,
    pub month: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<FilterQuery> for FilterConfig {
    type Error = FilterError;

    /// Builds the configuration as given; both time modes may be present, in
    /// which case evaluation honours the month.
    fn try_from(query: FilterQuery) -> Result<Self, Self::Error> {
        let status = non_empty(query.status)
            .map(|raw| {
                SubmissionStatus::parse(&raw).ok_or(FilterError::InvalidValue {
                    field: "status",
                    value: raw,
                })
            })
            .transpose()?;
        let semester = non_empty(query.semester)
            .map(|raw| {
                Semester::parse(&raw).ok_or(FilterError::InvalidValue {
                    field: "semester",
                    value: raw,
                })
            })
            .transpose()?;
        let event_type = non_empty(query.event_type)
            .map(|raw| {
                EventType::parse(&raw).ok_or(FilterError::InvalidValue {
                    field: "eventType",
                    value: raw,
                })
            })
            .transpose()?;
        let month = non_empty(query.month)
            .map(|raw| match raw.trim().parse::<u32>() {
                Ok(month) => validate_month(month).map(|_| month),
                Err(_) => Err(FilterError::InvalidValue {
                    field: "month",
                    value: raw,
                }),
            })
            .transpose()?;

        Ok(FilterConfig {
            status,
            batch: non_empty(query.batch),
            semester,
            event_type,
            month,
            start_date: date_param("startDate", query.start_date)?,
            end_date: date_param("endDate", query.end_date)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn date_param(field: &'static str, raw: Option<String>) -> Result<Option<NaiveDate>, FilterError> {
    non_empty(raw)
        .map(|raw| parse_event_date(&raw).ok_or(FilterError::InvalidValue { field, value: raw }))
        .transpose()
}
