use serde::Serialize;

use super::domain::{SubmissionRecord, DATE_FORMAT};
use super::identity::Role;

/// Exportable fields, named exactly as they appear on a serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportColumn {
    OwnerId,
    DisplayName,
    Email,
    Department,
    Batch,
    Semester,
    EventName,
    EventType,
    Organizer,
    HostingInstitution,
    Level,
    EventDate,
    CertificateLink,
    Status,
    LastModified,
}

const STUDENT_COLUMNS: &[ExportColumn] = &[
    ExportColumn::OwnerId,
    ExportColumn::DisplayName,
    ExportColumn::Email,
    ExportColumn::Department,
    ExportColumn::Batch,
    ExportColumn::Semester,
    ExportColumn::EventName,
    ExportColumn::EventType,
    ExportColumn::Organizer,
    ExportColumn::HostingInstitution,
    ExportColumn::Level,
    ExportColumn::EventDate,
    ExportColumn::CertificateLink,
    ExportColumn::Status,
    ExportColumn::LastModified,
];

// Staff sheets drop the internal owner identifier and keep name and email.
const STAFF_COLUMNS: &[ExportColumn] = &[
    ExportColumn::DisplayName,
    ExportColumn::Email,
    ExportColumn::Department,
    ExportColumn::Batch,
    ExportColumn::Semester,
    ExportColumn::EventName,
    ExportColumn::EventType,
    ExportColumn::Organizer,
    ExportColumn::HostingInstitution,
    ExportColumn::Level,
    ExportColumn::EventDate,
    ExportColumn::CertificateLink,
    ExportColumn::Status,
    ExportColumn::LastModified,
];

impl ExportColumn {
    pub const fn header(self) -> &'static str {
        match self {
            ExportColumn::OwnerId => "ownerId",
            ExportColumn::DisplayName => "displayName",
            ExportColumn::Email => "email",
            ExportColumn::Department => "department",
            ExportColumn::Batch => "batch",
            ExportColumn::Semester => "semester",
            ExportColumn::EventName => "eventName",
            ExportColumn::EventType => "eventType",
            ExportColumn::Organizer => "organizer",
            ExportColumn::HostingInstitution => "hostingInstitution",
            ExportColumn::Level => "level",
            ExportColumn::EventDate => "eventDate",
            ExportColumn::CertificateLink => "certificateLink",
            ExportColumn::Status => "status",
            ExportColumn::LastModified => "lastModified",
        }
    }

    /// Fixed column set for an audience. The raw record id is never exported.
    pub fn for_role(role: Role) -> &'static [ExportColumn] {
        match role {
            Role::Student => STUDENT_COLUMNS,
            Role::Staff => STAFF_COLUMNS,
        }
    }

    fn cell(self, record: &SubmissionRecord) -> String {
        let content = &record.content;
        match self {
            ExportColumn::OwnerId => content.owner_id.to_string(),
            ExportColumn::DisplayName => content.display_name.clone(),
            ExportColumn::Email => content.email.clone(),
            ExportColumn::Department => content.department.clone(),
            ExportColumn::Batch => content.batch.clone(),
            ExportColumn::Semester => content.semester.to_string(),
            ExportColumn::EventName => content.event_name.clone(),
            ExportColumn::EventType => content.event_type.label().to_string(),
            ExportColumn::Organizer => content.organizer.clone(),
            ExportColumn::HostingInstitution => content.hosting_institution.clone(),
            ExportColumn::Level => content.level.label().to_string(),
            ExportColumn::EventDate => content
                .event_date
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            ExportColumn::CertificateLink => content.certificate_link.clone(),
            ExportColumn::Status => record.status.label().to_string(),
            ExportColumn::LastModified => record.last_modified.to_rfc3339(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to finalize export buffer: {0}")]
    Buffer(String),
}

/// Flat table ready for a spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub file_stem: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.file_stem)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|err| ExportError::Buffer(err.error().to_string()))
    }
}

/// Maps a filtered record sequence onto the audience's column set.
#[derive(Debug, Clone)]
pub struct ExportProjector {
    app_name: String,
}

impl ExportProjector {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn file_stem(&self, department: &str) -> String {
        format!("{}_{}_Records", self.app_name, department)
    }

    /// Rows follow `records` order exactly.
    pub fn project(
        &self,
        role: Role,
        department: &str,
        records: &[SubmissionRecord],
    ) -> ExportTable {
        let columns = ExportColumn::for_role(role);
        ExportTable {
            file_stem: self.file_stem(department),
            columns: columns.iter().map(|column| column.header()).collect(),
            rows: records
                .iter()
                .map(|record| columns.iter().map(|column| column.cell(record)).collect())
                .collect(),
        }
    }
}
