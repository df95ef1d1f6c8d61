use super::common::*;
use crate::workflows::submissions::domain::{SubmissionDraft, SubmissionStatus};
use crate::workflows::submissions::identity::Principal;
use crate::workflows::submissions::intake::IntakeGuard;
use crate::workflows::submissions::repository::SubmissionRepository;
use crate::workflows::submissions::resolver::{DuplicateResolver, Resolution};
use crate::workflows::submissions::review::ReviewDecision;
use crate::workflows::submissions::service::{ErrorKind, SubmissionOutcome, SubmissionServiceError};

#[tokio::test]
async fn identical_resubmission_is_rejected_without_writing() {
    let (service, store) = build_service();

    let first = service
        .submit(&student(), draft())
        .await
        .expect("first submission succeeds");
    let original = first.record().clone();

    let err = service
        .submit(&student(), draft())
        .await
        .expect_err("identical submission is a duplicate");

    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    match err {
        SubmissionServiceError::DuplicateEntry { existing } => assert_eq!(existing, original.id),
        other => panic!("expected duplicate entry, got {other:?}"),
    }
    assert_eq!(store.len(), 1);
    let stored = store
        .fetch(&original.id)
        .await
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, original, "duplicate must leave the record untouched");
}

#[tokio::test]
async fn changed_fields_overwrite_in_place_and_reset_review() {
    let (service, store) = build_service();
    let mut seeded = record("s1", "CSE", "AI/ML Workshop", Some(date(2024, 3, 15)), SubmissionStatus::Approved);
    seeded.content.owner_id = student().id;
    seeded.content.organizer = "Old organizer".to_string();
    store.seed([seeded.clone()]).expect("seed succeeds");

    let outcome = service
        .submit(&student(), draft())
        .await
        .expect("overwrite succeeds");

    let SubmissionOutcome::Overwritten(updated) = &outcome else {
        panic!("expected overwrite, got {outcome:?}");
    };
    assert_eq!(outcome.message(), "Entry updated successfully (overwritten).");
    assert_eq!(updated.id, seeded.id);
    assert_eq!(updated.content.organizer, "CSE Dept, CIT");
    assert_eq!(updated.status, SubmissionStatus::Pending);
    assert!(updated.last_modified > seeded.last_modified);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn different_event_name_creates_a_new_record() {
    let (service, store) = build_service();
    service
        .submit(&student(), draft())
        .await
        .expect("first submission succeeds");

    let second = service
        .submit(
            &student(),
            SubmissionDraft {
                event_name: "National Coding Challenge".to_string(),
                event_type: "Competition".to_string(),
                level: "National".to_string(),
                ..draft()
            },
        )
        .await
        .expect("second submission succeeds");

    assert!(matches!(second, SubmissionOutcome::Created(_)));
    assert_eq!(second.record().status, SubmissionStatus::Pending);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn same_event_name_from_another_owner_does_not_collide() {
    let (service, store) = build_service();
    service
        .submit(&student(), draft())
        .await
        .expect("first owner submits");
    let other = service
        .submit(&second_student(), draft())
        .await
        .expect("second owner submits");

    assert!(matches!(other, SubmissionOutcome::Created(_)));
    assert_eq!(store.len(), 2);
}

#[test]
fn event_date_is_not_part_of_the_match_key() {
    let guard = IntakeGuard;
    let stored = guard
        .content_from_draft(&student(), draft())
        .expect("draft validates");
    let mut existing = record("s1", "CSE", "AI/ML Workshop", stored.event_date, SubmissionStatus::Pending);
    existing.content = stored;

    let moved = guard
        .content_from_draft(
            &student(),
            SubmissionDraft {
                event_date: "2025-01-20".to_string(),
                ..draft()
            },
        )
        .expect("draft validates");

    match DuplicateResolver.resolve(moved.clone(), &[existing.clone()]) {
        Resolution::Overwrite { existing: id, content } => {
            assert_eq!(id, existing.id);
            assert_eq!(content, moved);
        }
        other => panic!("expected overwrite, got {other:?}"),
    }
}

#[test]
fn status_alone_never_distinguishes_duplicates() {
    let content = IntakeGuard
        .content_from_draft(&student(), draft())
        .expect("draft validates");
    let mut approved = record("s9", "CSE", "AI/ML Workshop", content.event_date, SubmissionStatus::Approved);
    approved.content = content.clone();

    assert_eq!(
        DuplicateResolver.resolve(content, &[approved]),
        Resolution::Duplicate {
            existing: crate::workflows::submissions::domain::SubmissionId("s9".to_string()),
        }
    );
}

#[tokio::test]
async fn identical_resubmission_after_department_change_stays_a_duplicate() {
    let (service, store) = build_service();
    let first = service
        .submit(&student(), draft())
        .await
        .expect("first submission succeeds");
    let approved = service
        .review(&staff(), &first.record().id, ReviewDecision::Approved)
        .await
        .expect("review succeeds");
    assert_eq!(approved.status, SubmissionStatus::Approved);
    let before = store
        .fetch(&first.record().id)
        .await
        .expect("fetch succeeds")
        .expect("record present");

    let moved = Principal {
        department: Some("ECE".to_string()),
        ..student()
    };
    for _ in 0..3 {
        let err = service
            .submit(&moved, draft())
            .await
            .expect_err("same fields are still a duplicate");
        assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    }

    let after = store
        .fetch(&first.record().id)
        .await
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(after, before);
    assert_eq!(after.content.department, "CSE");
    assert_eq!(after.status, SubmissionStatus::Approved);
}
