use crate::infra::{demo_directory, demo_records};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use trackademic::config::WorkspaceConfig;
use trackademic::error::AppError;
use trackademic::workflows::submissions::{
    FilterConfig, IdentityProvider, InMemorySubmissionStore, LiveView, Principal,
    ReviewDecision, Role, Semester, SubmissionDraft, SubmissionService, SubmissionStatus,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Department whose staff dashboard is shown
    #[arg(long, default_value = "CSE")]
    pub(crate) department: String,
    /// Only show records from this semester (1-8)
    #[arg(long, value_parser = crate::infra::parse_semester)]
    pub(crate) semester: Option<Semester>,
    /// Only show records whose event falls in this month (1-12), any year
    #[arg(long, value_parser = crate::infra::parse_month, conflicts_with_all = ["start_date", "end_date"])]
    pub(crate) month: Option<u32>,
    /// Start of an event date range (YYYY-MM-DD); needs --end-date to take effect
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// End of an event date range (YYYY-MM-DD), inclusive
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Write the filtered export to this CSV file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

impl DemoArgs {
    fn filters(&self) -> FilterConfig {
        FilterConfig {
            semester: self.semester,
            month: self.month,
            start_date: self.start_date,
            end_date: self.end_date,
            ..FilterConfig::default()
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let workspace = WorkspaceConfig::default();
    let store = InMemorySubmissionStore::new(workspace.app_id.clone());
    store.seed(demo_records())?;
    let directory = demo_directory();
    let service = SubmissionService::new(Arc::new(store.clone()), &workspace);

    println!("{} submission demo", workspace.app_name);
    println!("- Collection: {} ({} seeded records)", store.collection_path(), store.len());

    let Some(reviewer) = sign_in_as(&directory, Role::Staff, &args.department).await else {
        println!("  No staff account for department {}", args.department);
        return Ok(());
    };
    let Some(submitter) = sign_in_as(&directory, Role::Student, &args.department).await else {
        println!("  No student account for department {}", args.department);
        return Ok(());
    };

    let mut view = match service.open_view(&reviewer, FilterConfig::default()).await {
        Ok(view) => view,
        Err(err) => {
            println!("  Staff dashboard unavailable: {}", err);
            return Ok(());
        }
    };
    println!(
        "\nStaff dashboard for {} ({})",
        args.department, reviewer.display_name
    );
    render_view(&view);

    println!("\nStudent intake ({})", submitter.email);
    let draft = SubmissionDraft {
        event_name: "Rust Systems Workshop".to_string(),
        event_type: "Workshop".to_string(),
        organizer: format!("{} Dept, CIT", args.department),
        hosting_institution: "CIT".to_string(),
        level: "Intra-college".to_string(),
        event_date: "2024-03-22".to_string(),
        semester: "4".to_string(),
        certificate_link: "https://drive.google.com/drive/folders/rust-systems".to_string(),
    };
    let revised = SubmissionDraft {
        hosting_institution: "IIT Madras".to_string(),
        level: "Inter-college".to_string(),
        ..draft.clone()
    };

    for (label, attempt) in [("first", draft.clone()), ("repeat", draft), ("revised", revised)] {
        match service.submit(&submitter, attempt).await {
            Ok(outcome) => println!("- {label} submission: {}", outcome.message()),
            Err(err) => println!("- {label} submission: {} [{:?}]", err, err.kind()),
        }
    }
    let pushed = match view.next_push().await {
        Ok(records) => records.len(),
        Err(err) => {
            println!("  Live updates stopped: {}", err);
            return Ok(());
        }
    };
    println!("- Staff dashboard updated live ({pushed} visible)");

    let pending: Vec<_> = view
        .visible()
        .iter()
        .filter(|record| record.status == SubmissionStatus::Pending)
        .map(|record| record.id.clone())
        .collect();
    println!("\nReview pass");
    for (index, id) in pending.iter().enumerate() {
        let decision = if index % 3 == 2 {
            ReviewDecision::Rejected
        } else {
            ReviewDecision::Approved
        };
        match service.review(&reviewer, id, decision).await {
            Ok(ack) => println!(
                "- {}: {} -> {}",
                ack.id,
                ack.previous.label(),
                ack.status.label()
            ),
            Err(err) => println!("- {}: not applied ({})", id, err),
        }
    }
    view.sync();

    let filters = args.filters();
    if !filters.is_empty() {
        println!("\nApplying dashboard filters");
        view.replace_filters(filters);
    }
    render_view(&view);

    let table = match service.export(&reviewer, view.visible()) {
        Ok(table) => table,
        Err(err) => {
            println!("  Export unavailable: {}", err);
            return Ok(());
        }
    };
    let csv = table.to_csv()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            println!(
                "\nExported {} rows to {} (suggested name {})",
                table.len(),
                path.display(),
                table.file_name()
            );
        }
        None => {
            println!("\n{} ({} rows)", table.file_name(), table.len());
            print!("{}", String::from_utf8_lossy(&csv));
        }
    }

    view.close();
    Ok(())
}

async fn sign_in_as<I>(directory: &I, role: Role, department: &str) -> Option<Principal>
where
    I: IdentityProvider,
{
    for account in crate::infra::demo_accounts() {
        if account.role == role && account.department.as_deref() == Some(department) {
            return directory
                .sign_in(&account.email)
                .await
                .ok()
                .map(|session| session.principal);
        }
    }
    None
}

fn render_view(view: &LiveView) {
    let visible = view.visible();
    println!(
        "- {} of {} records visible ({})",
        visible.len(),
        view.all().len(),
        view.scope()
    );
    for record in visible {
        let date = record
            .content
            .event_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "undated".to_string());
        println!(
            "  - [{}] {} | {} | sem {} | {} | {}",
            record.status.label(),
            record.content.event_name,
            record.content.event_type.label(),
            record.content.semester,
            date,
            record.content.email
        );
    }
}
