use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use trackademic::workflows::submissions::{
    EventLevel, EventType, InMemoryIdentityDirectory, Principal, PrincipalId, Role, Semester,
    SubmissionContent, SubmissionId, SubmissionRecord, SubmissionStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn account(
    id: &str,
    email: &str,
    role: Role,
    department: &str,
    batch: Option<&str>,
    display_name: &str,
) -> Principal {
    Principal {
        id: PrincipalId(id.to_string()),
        email: email.to_string(),
        role,
        department: Some(department.to_string()),
        batch: batch.map(str::to_string),
        display_name: display_name.to_string(),
        onboarding_complete: true,
    }
}

/// Onboarded demo accounts: one student and one staff member per department.
pub(crate) fn demo_accounts() -> Vec<Principal> {
    vec![
        account(
            "2022123",
            "student@cit.edu.in",
            Role::Student,
            "CSE",
            Some("2022-2027"),
            "Student User",
        ),
        account(
            "staff-cse",
            "staff@cit.edu.in",
            Role::Staff,
            "CSE",
            None,
            "Staff User",
        ),
        account(
            "2022124",
            "student2@cit.edu.in",
            Role::Student,
            "ECE",
            Some("2022-2027"),
            "ECE Student",
        ),
        account(
            "staff-ece",
            "staff2@cit.edu.in",
            Role::Staff,
            "ECE",
            None,
            "ECE Staff",
        ),
    ]
}

pub(crate) fn demo_directory() -> InMemoryIdentityDirectory {
    InMemoryIdentityDirectory::with_accounts(demo_accounts())
}

struct SeedRow {
    id: &'static str,
    owner: &'static str,
    email: &'static str,
    department: &'static str,
    event_name: &'static str,
    event_type: EventType,
    organizer: &'static str,
    hosting_institution: &'static str,
    level: EventLevel,
    event_date: (i32, u32, u32),
    certificate_link: &'static str,
    last_modified: (i32, u32, u32),
}

const SEED_ROWS: &[SeedRow] = &[
    SeedRow {
        id: "s1",
        owner: "2022123",
        email: "student@cit.edu.in",
        department: "CSE",
        event_name: "AI/ML Workshop",
        event_type: EventType::Workshop,
        organizer: "CSE Dept, CIT",
        hosting_institution: "CIT",
        level: EventLevel::IntraCollege,
        event_date: (2024, 3, 15),
        certificate_link: "https://drive.google.com/drive/folders/1a2b3c4d5e6f7g8h9i0j",
        last_modified: (2024, 3, 16),
    },
    SeedRow {
        id: "s2",
        owner: "2022123",
        email: "student@cit.edu.in",
        department: "CSE",
        event_name: "National Coding Challenge",
        event_type: EventType::Competition,
        organizer: "Tech Innovators",
        hosting_institution: "IIT Madras",
        level: EventLevel::National,
        event_date: (2024, 4, 20),
        certificate_link: "https://drive.google.com/drive/folders/9j8i7h6g5f4e3d2c1b0a",
        last_modified: (2024, 4, 22),
    },
    SeedRow {
        id: "s3",
        owner: "2022124",
        email: "student2@cit.edu.in",
        department: "ECE",
        event_name: "Electronics Seminar",
        event_type: EventType::Seminar,
        organizer: "ECE Dept, CIT",
        hosting_institution: "CIT",
        level: EventLevel::IntraCollege,
        event_date: (2024, 2, 10),
        certificate_link: "https://drive.google.com/drive/folders/x1y2z3a4b5c6d7e8f9g0",
        last_modified: (2024, 2, 11),
    },
    SeedRow {
        id: "s4",
        owner: "2022125",
        email: "student3@cit.edu.in",
        department: "ECE",
        event_name: "5G Technology Symposium",
        event_type: EventType::Symposium,
        organizer: "ECE Dept, CIT",
        hosting_institution: "CIT",
        level: EventLevel::IntraCollege,
        event_date: (2024, 5, 1),
        certificate_link: "https://drive.google.com/drive/folders/x1y2z3a4b5c6d7e8f9g1",
        last_modified: (2024, 5, 2),
    },
];

fn midnight((year, month, day): (i32, u32, u32)) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sample records for local runs and the CLI demo.
pub(crate) fn demo_records() -> Vec<SubmissionRecord> {
    SEED_ROWS
        .iter()
        .filter_map(|row| {
            let (year, month, day) = row.event_date;
            Some(SubmissionRecord {
                id: SubmissionId(row.id.to_string()),
                content: SubmissionContent {
                    owner_id: PrincipalId(row.owner.to_string()),
                    email: row.email.to_string(),
                    display_name: row.email.split('@').next().unwrap_or_default().to_string(),
                    department: row.department.to_string(),
                    batch: "2022-2027".to_string(),
                    semester: Semester::new(4)?,
                    event_name: row.event_name.to_string(),
                    event_type: row.event_type,
                    organizer: row.organizer.to_string(),
                    hosting_institution: row.hosting_institution.to_string(),
                    level: row.level,
                    event_date: NaiveDate::from_ymd_opt(year, month, day),
                    certificate_link: row.certificate_link.to_string(),
                },
                status: SubmissionStatus::Pending,
                last_modified: midnight(row.last_modified)?,
            })
        })
        .collect()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_month(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(format!("'{raw}' is not a month number between 1 and 12")),
    }
}

pub(crate) fn parse_semester(raw: &str) -> Result<Semester, String> {
    Semester::parse(raw).ok_or_else(|| format!("'{raw}' is not a semester between 1 and 8"))
}
