use super::domain::{SubmissionContent, SubmissionId, SubmissionRecord};

/// What to do with a candidate submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No earlier record shares the owner and event name.
    Create(SubmissionContent),
    /// Same owner and event name with identical content; nothing is written.
    Duplicate { existing: SubmissionId },
    /// Same owner and event name with different content; the stored record is
    /// replaced in place under its existing id.
    Overwrite {
        existing: SubmissionId,
        content: SubmissionContent,
    },
}

/// Decides between create, overwrite, and duplicate rejection.
///
/// Records match on owner plus event name only. Event date and type are not
/// part of the key, so two distinct events sharing a name collide. Content is
/// compared as it would be stored, with the stored owner and department.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateResolver;

impl DuplicateResolver {
    pub fn resolve(
        &self,
        candidate: SubmissionContent,
        existing: &[SubmissionRecord],
    ) -> Resolution {
        let matched = existing.iter().find(|record| {
            record.content.owner_id == candidate.owner_id
                && record.content.event_name == candidate.event_name
        });

        let Some(record) = matched else {
            return Resolution::Create(candidate);
        };
        let content = candidate.anchored_to(&record.content);
        if record.content == content {
            Resolution::Duplicate {
                existing: record.id.clone(),
            }
        } else {
            Resolution::Overwrite {
                existing: record.id.clone(),
                content,
            }
        }
    }
}
