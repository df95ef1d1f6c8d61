//! End-to-end scenarios for the submission and review workflow.
//!
//! Everything goes through the public service facade and the reference store,
//! with live views standing in for the student and staff dashboards.

mod common {
    use std::sync::Arc;

    use trackademic::config::WorkspaceConfig;
    use trackademic::workflows::submissions::{
        InMemorySubmissionStore, Principal, PrincipalId, ReviewPolicy, Role, SubmissionDraft,
        SubmissionService,
    };

    pub(super) fn service() -> (
        SubmissionService<InMemorySubmissionStore>,
        InMemorySubmissionStore,
    ) {
        let store = InMemorySubmissionStore::new("trackademic-e2e");
        let workspace = WorkspaceConfig {
            app_id: store.app_id().to_string(),
            app_name: "Trackademic".to_string(),
            review_policy: ReviewPolicy::Open,
        };
        let service = SubmissionService::new(Arc::new(store.clone()), &workspace);
        (service, store)
    }

    pub(super) fn student(id: &str, email: &str) -> Principal {
        Principal {
            id: PrincipalId(id.to_string()),
            email: email.to_string(),
            role: Role::Student,
            department: Some("CSE".to_string()),
            batch: Some("2022-2027".to_string()),
            display_name: format!("Student {id}"),
            onboarding_complete: true,
        }
    }

    pub(super) fn staff() -> Principal {
        Principal {
            id: PrincipalId("staff-cse".to_string()),
            email: "staff@cit.edu.in".to_string(),
            role: Role::Staff,
            department: Some("CSE".to_string()),
            batch: None,
            display_name: "Dr. Lakshmi".to_string(),
            onboarding_complete: true,
        }
    }

    pub(super) fn draft(event_name: &str, event_date: &str, semester: u8) -> SubmissionDraft {
        SubmissionDraft {
            event_name: event_name.to_string(),
            event_type: "Workshop".to_string(),
            organizer: "CSE Dept, CIT".to_string(),
            hosting_institution: "CIT".to_string(),
            level: "Intra-college".to_string(),
            event_date: event_date.to_string(),
            semester: semester.to_string(),
            certificate_link: "https://drive.google.com/drive/folders/evidence".to_string(),
        }
    }
}

use chrono::NaiveDate;
use common::*;
use trackademic::workflows::submissions::{
    FilterChange, FilterConfig, ReviewDecision, Semester, SubmissionStatus, TimeWindow,
};

#[tokio::test]
async fn approval_reaches_the_owners_live_view() {
    let (service, _store) = service();
    let owner = student("stu-1", "student@cit.edu.in");

    let submitted = service
        .submit(&owner, draft("AI Workshop", "2024-03-15", 4))
        .await
        .expect("submission succeeds");

    let mut owner_view = service
        .open_view(&owner, FilterConfig::default())
        .await
        .expect("owner view opens");
    let staff_view = service
        .open_view(&staff(), FilterConfig::default())
        .await
        .expect("staff view opens");

    assert_eq!(staff_view.visible().len(), 1);
    assert_eq!(staff_view.visible()[0].status, SubmissionStatus::Pending);

    service
        .review(&staff(), &submitted.record().id, ReviewDecision::Approved)
        .await
        .expect("review succeeds");

    let visible = owner_view.next_push().await.expect("owner receives push");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, submitted.record().id);
    assert_eq!(visible[0].status, SubmissionStatus::Approved);
}

#[tokio::test]
async fn semester_filter_drives_the_export() {
    let (service, _store) = service();
    let first = student("stu-1", "student@cit.edu.in");
    let second = student("stu-2", "student3@cit.edu.in");

    for (owner, draft) in [
        (&first, draft("Compiler Bootcamp", "2024-01-12", 3)),
        (&first, draft("Rust Systems Workshop", "2024-02-03", 4)),
        (&second, draft("Cloud Native Summit", "2024-02-21", 4)),
    ] {
        service
            .submit(owner, draft)
            .await
            .expect("submission succeeds");
    }

    let mut view = service
        .open_view(&staff(), FilterConfig::default())
        .await
        .expect("staff view opens");
    assert_eq!(view.visible().len(), 3);

    let visible = view
        .update_filter(FilterChange::Semester(Semester::new(4)))
        .expect("semester applies")
        .to_vec();
    assert_eq!(visible.len(), 2);

    let table = service
        .export(&staff(), &visible)
        .expect("export builds");
    assert_eq!(table.len(), 2);
    let csv = String::from_utf8(table.to_csv().expect("csv renders")).expect("utf-8");
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn month_and_range_filters_replace_each_other() {
    let (service, _store) = service();
    let owner = student("stu-1", "student@cit.edu.in");
    for draft in [
        draft("AI Workshop", "2024-03-15", 4),
        draft("Spring Symposium", "2023-03-02", 2),
        draft("Coding Challenge", "2024-04-20", 4),
        draft("Summer Internship", "2024-06-10", 5),
    ] {
        service
            .submit(&owner, draft)
            .await
            .expect("submission succeeds");
    }

    let mut view = service
        .open_view(&staff(), FilterConfig::default())
        .await
        .expect("staff view opens");

    let march = view
        .update_filter(FilterChange::Month(Some(3)))
        .expect("month applies")
        .iter()
        .map(|record| record.content.event_name.clone())
        .collect::<Vec<_>>();
    assert_eq!(march.len(), 2);
    assert!(march.contains(&"AI Workshop".to_string()));
    assert!(march.contains(&"Spring Symposium".to_string()));

    let start = NaiveDate::from_ymd_opt(2024, 4, 1).expect("valid date");
    view.update_filter(FilterChange::StartDate(Some(start)))
        .expect("start date applies");
    assert_eq!(view.filters().month, None);
    assert_eq!(view.filters().start_date, Some(start));

    let end = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
    let ranged = view
        .update_filter(FilterChange::EndDate(Some(end)))
        .expect("end date applies")
        .iter()
        .map(|record| record.content.event_name.clone())
        .collect::<Vec<_>>();

    assert_eq!(view.filters().time_window(), TimeWindow::Range { start, end });
    assert_eq!(ranged.len(), 2);
    assert!(ranged.contains(&"Coding Challenge".to_string()));
    assert!(ranged.contains(&"Summer Internship".to_string()));
}
