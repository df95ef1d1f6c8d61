use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for stored submissions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    /// Fallback owner id taken from the tail of the email local part.
    pub fn derive_from_email(email: &str) -> Self {
        let local = email.split('@').next().unwrap_or_default();
        let skip = local.chars().count().saturating_sub(7);
        PrincipalId(local.chars().skip(skip).collect())
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review state stored on every submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Workshop,
    Symposium,
    Seminar,
    Competition,
    Internship,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Workshop,
        EventType::Symposium,
        EventType::Seminar,
        EventType::Competition,
        EventType::Internship,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EventType::Workshop => "Workshop",
            EventType::Symposium => "Symposium",
            EventType::Seminar => "Seminar",
            EventType::Competition => "Competition",
            EventType::Internship => "Internship",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value))
    }
}

/// Reach of the event, from a single campus up to international.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventLevel {
    #[serde(rename = "Intra-college")]
    IntraCollege,
    #[serde(rename = "Inter-college")]
    InterCollege,
    State,
    National,
    International,
}

impl EventLevel {
    pub const ALL: [EventLevel; 5] = [
        EventLevel::IntraCollege,
        EventLevel::InterCollege,
        EventLevel::State,
        EventLevel::National,
        EventLevel::International,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EventLevel::IntraCollege => "Intra-college",
            EventLevel::InterCollege => "Inter-college",
            EventLevel::State => "State",
            EventLevel::National => "National",
            EventLevel::International => "International",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(value))
    }
}

/// Academic semester, 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Semester(u8);

impl Semester {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 8;

    pub fn new(value: u8) -> Option<Self> {
        (Self::FIRST..=Self::LAST)
            .contains(&value)
            .then_some(Semester(value))
    }

    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u8>().ok().and_then(Self::new)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw form input from a student, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionDraft {
    pub event_name: String,
    pub event_type: String,
    pub organizer: String,
    pub hosting_institution: String,
    pub level: String,
    pub event_date: String,
    pub semester: String,
    pub certificate_link: String,
}

/// Every field a submitter controls, owner details included.
///
/// Duplicate detection compares two contents for equality, so this struct
/// deliberately excludes the stamp fields (`id`, `lastModified`) and `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionContent {
    pub owner_id: PrincipalId,
    pub email: String,
    pub display_name: String,
    pub department: String,
    pub batch: String,
    pub semester: Semester,
    pub event_name: String,
    pub event_type: EventType,
    pub organizer: String,
    pub hosting_institution: String,
    pub level: EventLevel,
    /// `None` when a stored document carries a missing or unreadable date.
    #[serde(default, deserialize_with = "lenient_date")]
    pub event_date: Option<NaiveDate>,
    pub certificate_link: String,
}

impl SubmissionContent {
    /// This content as it would be written over `stored`: owner and department
    /// never change once a record exists.
    pub fn anchored_to(self, stored: &SubmissionContent) -> SubmissionContent {
        SubmissionContent {
            owner_id: stored.owner_id.clone(),
            department: stored.department.clone(),
            ..self
        }
    }
}

/// A stored submission as the repository hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    #[serde(flatten)]
    pub content: SubmissionContent,
    #[serde(default)]
    pub status: SubmissionStatus,
    pub last_modified: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn is_owned_by(&self, owner: &PrincipalId) -> bool {
        &self.content.owner_id == owner
    }

    pub fn belongs_to(&self, department: &str) -> bool {
        self.content.department == department
    }
}

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_event_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_event_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_owner_id_from_email_tail() {
        assert_eq!(
            PrincipalId::derive_from_email("cs2022123@cit.edu.in"),
            PrincipalId("2022123".to_string())
        );
        assert_eq!(
            PrincipalId::derive_from_email("ab@cit.edu.in"),
            PrincipalId("ab".to_string())
        );
    }

    #[test]
    fn semester_bounds_are_enforced() {
        assert!(Semester::new(0).is_none());
        assert_eq!(Semester::parse(" 4 ").map(Semester::get), Some(4));
        assert!(Semester::parse("9").is_none());
        assert!(Semester::parse("Even").is_none());
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(EventType::parse("workshop"), Some(EventType::Workshop));
        assert_eq!(EventLevel::parse("inter-college"), Some(EventLevel::InterCollege));
        assert_eq!(SubmissionStatus::parse("APPROVED"), Some(SubmissionStatus::Approved));
        assert!(EventType::parse("Hackathon").is_none());
    }

    #[test]
    fn record_without_status_defaults_to_pending() {
        let raw = serde_json::json!({
            "id": "s1",
            "ownerId": "2022123",
            "email": "student1@cit.edu.in",
            "displayName": "Asha",
            "department": "CSE",
            "batch": "2022-2027",
            "semester": 4,
            "eventName": "AI/ML Workshop",
            "eventType": "Workshop",
            "organizer": "CSE Dept, CIT",
            "hostingInstitution": "CIT",
            "level": "Intra-college",
            "eventDate": "not-a-date",
            "certificateLink": "https://drive.google.com/drive/folders/1a2b",
            "lastModified": "2024-03-16T00:00:00Z"
        });

        let record: SubmissionRecord = serde_json::from_value(raw).expect("record parses");
        assert_eq!(record.status, SubmissionStatus::Pending);
        assert_eq!(record.content.event_date, None);
        assert_eq!(record.content.level, EventLevel::IntraCollege);
    }
}
