use crate::infra::{demo_applications, LocalBackend, DEMO_JOB_ID};
use clap::Args;
use hiring_pipeline::config::AppConfig;
use hiring_pipeline::error::AppError;
use hiring_pipeline::pipeline::{
    ApplicantSource, ApplicationStatus, ApplicationStatusService, Board, DragOutcome,
    HttpPipelineClient, JobId, MemoryApplicationRepository, Notifier, PipelineController,
    QueryCache, RecordingNotifier, StatusUpdater, TracingNotifier,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct BoardArgs {
    /// Job posting whose applicants should be shown
    #[arg(long, default_value = DEMO_JOB_ID)]
    pub(crate) job: String,
    /// Base URL of the pipeline service (defaults to APP_API_BASE_URL)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct MoveArgs {
    /// Job posting the application belongs to
    #[arg(long, default_value = DEMO_JOB_ID)]
    pub(crate) job: String,
    /// Application to drag
    #[arg(long)]
    pub(crate) application: String,
    /// Destination column, e.g. "Interview" or in_review
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: ApplicationStatus,
    /// Base URL of the pipeline service (defaults to APP_API_BASE_URL)
    #[arg(long)]
    pub(crate) base_url: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the failed-update portion of the walk-through
    #[arg(long)]
    pub(crate) skip_failure: bool,
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    raw.parse::<ApplicationStatus>()
        .map_err(|err| err.to_string())
}

fn http_controller<N>(
    job: String,
    base_url: Option<String>,
    notifier: Arc<N>,
) -> Result<PipelineController<HttpPipelineClient, HttpPipelineClient, N>, AppError>
where
    N: Notifier + 'static,
{
    let config = AppConfig::load()?;
    let timeout = config.client.timeout();
    let base_url = base_url.unwrap_or(config.client.base_url);
    let client = Arc::new(HttpPipelineClient::new(&base_url, timeout)?);
    Ok(PipelineController::new(
        JobId(job),
        Arc::new(QueryCache::new()),
        client.clone(),
        client,
        notifier,
    ))
}

pub(crate) async fn run_board(args: BoardArgs) -> Result<(), AppError> {
    let BoardArgs { job, base_url } = args;
    let mut controller = http_controller(job, base_url, Arc::new(TracingNotifier))?;

    controller.sync().await?;
    render_board(controller.job_id(), controller.board());
    Ok(())
}

pub(crate) async fn run_move(args: MoveArgs) -> Result<(), AppError> {
    let MoveArgs {
        job,
        application,
        status,
        base_url,
    } = args;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut controller = http_controller(job, base_url, notifier.clone())?;

    controller.sync().await?;
    drop_and_wait(&mut controller, &application, status).await?;
    render_notifications(&notifier);

    controller.sync().await?;
    render_board(controller.job_id(), controller.board());
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(MemoryApplicationRepository::seeded(demo_applications()));
    let service = Arc::new(ApplicationStatusService::new(repository));
    let backend = Arc::new(LocalBackend::new(service));
    let notifier = Arc::new(RecordingNotifier::default());
    let mut controller = PipelineController::new(
        JobId::from(DEMO_JOB_ID),
        Arc::new(QueryCache::new()),
        backend.clone(),
        backend.clone(),
        notifier.clone(),
    );

    println!("Applicant pipeline demo");
    controller.sync().await?;
    render_board(controller.job_id(), controller.board());

    println!("\nReorder: app-002 dropped onto app-001 (no backend call)");
    let result = controller.drag_end("app-002", Some("app-001"));
    describe_outcome(&result.outcome);

    println!("\nMove: app-001 dropped onto the Interview column");
    drop_and_wait(&mut controller, "app-001", ApplicationStatus::Interview).await?;
    controller.sync().await?;
    render_board(controller.job_id(), controller.board());

    if !args.skip_failure {
        println!("\nMove while the backend is offline: app-003 onto Rejected");
        backend.set_offline(true);
        drop_and_wait(&mut controller, "app-003", ApplicationStatus::Rejected).await?;
        println!("Board keeps the optimistic move until the next refetch:");
        render_board(controller.job_id(), controller.board());
        backend.set_offline(false);
    }

    render_notifications(&notifier);
    Ok(())
}

/// Drop a card on a column and wait for the dispatched update, if any.
///
/// A failed update is reported through the notifier, not as an error.
async fn drop_and_wait<S, U, N>(
    controller: &mut PipelineController<S, U, N>,
    application: &str,
    status: ApplicationStatus,
) -> Result<(), AppError>
where
    S: ApplicantSource + 'static,
    U: StatusUpdater + 'static,
    N: Notifier + 'static,
{
    controller.drag_start(application);
    let result = controller.drag_end(application, Some(status.label()));
    describe_outcome(&result.outcome);

    if let Some(handle) = result.dispatched {
        let _ = handle.await?;
    }
    Ok(())
}

fn describe_outcome(outcome: &DragOutcome) {
    match outcome {
        DragOutcome::Unchanged => println!("- nothing moved"),
        DragOutcome::Reordered { status, from, to } => {
            println!("- reordered {status}: position {from} -> {to}")
        }
        DragOutcome::Moved(transition) => println!(
            "- {} moved {} -> {} (status update sent)",
            transition.application_id, transition.from, transition.to
        ),
    }
}

fn render_board(job_id: &JobId, board: &Board) {
    println!("\nBoard for {job_id} ({} applications)", board.len());
    for column in board.columns() {
        println!("{} ({})", column.status, column.len());
        for application in &column.items {
            let accommodations = if application.applicant.accommodations.is_empty() {
                String::new()
            } else {
                format!(
                    " [accommodations: {}]",
                    application.applicant.accommodations.join(", ")
                )
            };
            println!(
                "  - {} | {} | submitted {}{}",
                application.id,
                application.applicant.display_name,
                application.submitted_at.format("%Y-%m-%d %H:%M"),
                accommodations
            );
        }
    }
}

fn render_notifications(notifier: &RecordingNotifier) {
    let events = notifier.events();
    if events.is_empty() {
        println!("\nNotifications: none");
        return;
    }
    println!("\nNotifications");
    for event in events {
        println!("- {event}");
    }
}
