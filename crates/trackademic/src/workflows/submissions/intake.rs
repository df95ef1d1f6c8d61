use std::fmt;

use validator::ValidateUrl;

use super::domain::{
    parse_event_date, EventLevel, EventType, PrincipalId, Semester, SubmissionContent,
    SubmissionDraft,
};
use super::identity::Principal;

/// Why a single field was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    Malformed(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Missing => write!(f, "{} is required", self.field),
            FieldProblem::Malformed(expected) => {
                write!(f, "{} must be {}", self.field, expected)
            }
        }
    }
}

/// All field problems found in one draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("submission failed validation: {}", summarize(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_problem(&self, field: &str) -> bool {
        self.fields.iter().any(|error| error.field == field)
    }
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Guard converting raw drafts into validated submission content.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn content_from_draft(
        &self,
        principal: &Principal,
        draft: SubmissionDraft,
    ) -> Result<SubmissionContent, ValidationError> {
        let mut fields = Vec::new();

        let event_name = required(&mut fields, "eventName", &draft.event_name);
        let organizer = required(&mut fields, "organizer", &draft.organizer);
        let hosting_institution =
            required(&mut fields, "hostingInstitution", &draft.hosting_institution);

        let event_type = parsed(&mut fields, "eventType", &draft.event_type, |raw| {
            EventType::parse(raw).ok_or("one of Workshop, Symposium, Seminar, Competition, Internship")
        });
        let level = parsed(&mut fields, "level", &draft.level, |raw| {
            EventLevel::parse(raw)
                .ok_or("one of Intra-college, Inter-college, State, National, International")
        });
        let event_date = parsed(&mut fields, "eventDate", &draft.event_date, |raw| {
            parse_event_date(raw).ok_or("a calendar date (YYYY-MM-DD)")
        });
        let semester = parsed(&mut fields, "semester", &draft.semester, |raw| {
            Semester::parse(raw).ok_or("a semester number between 1 and 8")
        });
        let certificate_link = parsed(
            &mut fields,
            "certificateLink",
            &draft.certificate_link,
            |raw| {
                if is_web_link(raw) {
                    Ok(raw.to_string())
                } else {
                    Err("a well-formed http(s) URL")
                }
            },
        );

        let department = owner_field(&mut fields, "department", principal.department.as_deref());
        let batch = owner_field(&mut fields, "batch", principal.batch.as_deref());

        let (
            Some(event_name),
            Some(organizer),
            Some(hosting_institution),
            Some(event_type),
            Some(level),
            Some(event_date),
            Some(semester),
            Some(certificate_link),
            Some(department),
            Some(batch),
        ) = (
            event_name,
            organizer,
            hosting_institution,
            event_type,
            level,
            event_date,
            semester,
            certificate_link,
            department,
            batch,
        )
        else {
            return Err(ValidationError { fields });
        };

        let owner_id = if principal.id.is_blank() {
            PrincipalId::derive_from_email(&principal.email)
        } else {
            principal.id.clone()
        };

        Ok(SubmissionContent {
            owner_id,
            email: principal.email.clone(),
            display_name: principal.display_name.clone(),
            department,
            batch,
            semester,
            event_name,
            event_type,
            organizer,
            hosting_institution,
            level,
            event_date: Some(event_date),
            certificate_link,
        })
    }
}

fn required(fields: &mut Vec<FieldError>, field: &'static str, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fields.push(FieldError {
            field,
            problem: FieldProblem::Missing,
        });
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parsed<T>(
    fields: &mut Vec<FieldError>,
    field: &'static str,
    raw: &str,
    parse: impl FnOnce(&str) -> Result<T, &'static str>,
) -> Option<T> {
    let value = required(fields, field, raw)?;
    match parse(&value) {
        Ok(parsed) => Some(parsed),
        Err(expected) => {
            fields.push(FieldError {
                field,
                problem: FieldProblem::Malformed(expected),
            });
            None
        }
    }
}

fn owner_field(
    fields: &mut Vec<FieldError>,
    field: &'static str,
    value: Option<&str>,
) -> Option<String> {
    required(fields, field, value.unwrap_or_default())
}

fn is_web_link(raw: &str) -> bool {
    let lowered = raw.to_ascii_lowercase();
    (lowered.starts_with("https://") || lowered.starts_with("http://")) && raw.validate_url()
}
