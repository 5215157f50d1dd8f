mod auth;
mod config;
mod db;
mod deadline;
mod filter;
mod models;
mod stats;
mod ui;

use std::io;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing_subscriber::EnvFilter;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::auth::{SessionContext, SessionEvent, SubscriptionHandle};
use crate::ui::components::notice::Notice;
use crate::ui::{
    dashboard::{self, DashboardAction, DashboardState},
    login::{self, LoginAction, LoginMode, LoginState},
    payment_wizard::{self, PaymentWizardAction, PaymentWizardState},
    payments::{self, PaymentAction, PaymentsState},
    project_wizard::{self, ProjectWizardAction, ProjectWizardState},
    projects::{self, ProjectAction, ProjectsState},
};

/// Terminal dashboard for projects, deadlines and installment payments
#[derive(Parser, Debug)]
#[command(name = "project-manager", version)]
struct Args {
    /// Override DATABASE_URL from the environment
    #[arg(long)]
    database_url: Option<String>,
    /// Write logs to this file instead of LOG_FILE
    #[arg(long)]
    log_file: Option<String>,
}

// Represents the current screen in the app
enum AppScreen {
    Login,
    Dashboard,
    Projects,
    ProjectWizard,
    Payments,
    PaymentWizard,
}

// Main application state
struct AppState {
    db: db::Database,
    session: SessionContext,
    session_log: Option<SubscriptionHandle>,
    screen: AppScreen,
    login_state: Option<LoginState>,
    dashboard_state: Option<DashboardState>,
    projects_state: Option<ProjectsState>,
    project_wizard_state: Option<ProjectWizardState>,
    payments_state: Option<PaymentsState>,
    payment_wizard_state: Option<PaymentWizardState>,
}

impl AppState {
    fn new(db: db::Database) -> Self {
        Self {
            db,
            session: SessionContext::new(),
            session_log: None,
            screen: AppScreen::Login,
            login_state: Some(LoginState::new()),
            dashboard_state: None,
            projects_state: None,
            project_wizard_state: None,
            payments_state: None,
            payment_wizard_state: None,
        }
    }
}

fn init_logging(config: &config::Config) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to a file; stdout belongs to the terminal UI
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration, letting CLI flags win over the environment
    let mut config = config::init()?;
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = log_file;
    }

    init_logging(&config)?;
    tracing::info!("starting project manager");

    // Initialize database connection
    let db = db::init(&config).await?;
    tracing::info!("database connection established");

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state and mirror session changes into the log
    let mut app_state = AppState::new(db);
    let handle = app_state.session.subscribe(|event| match event {
        SessionEvent::SignedIn(user) => tracing::info!(email = %user.email, "session opened"),
        SessionEvent::SignedOut => tracing::info!("session closed"),
    });
    app_state.session_log = Some(handle);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Tear down the session before the terminal
    if let Some(handle) = app_state.session_log.take() {
        app_state.session.unsubscribe(handle);
    }
    app_state.session.dispose();

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| match app_state.screen {
            AppScreen::Login => {
                if let Some(state) = &mut app_state.login_state {
                    login::render_login(f, state);
                }
            }
            AppScreen::Dashboard => {
                if let Some(state) = &mut app_state.dashboard_state {
                    dashboard::render_dashboard(f, state);
                }
            }
            AppScreen::Projects => {
                if let Some(state) = &mut app_state.projects_state {
                    projects::render_projects(f, state);
                }
            }
            AppScreen::ProjectWizard => {
                if let Some(state) = &mut app_state.project_wizard_state {
                    project_wizard::render_project_wizard(f, state);
                }
            }
            AppScreen::Payments => {
                if let Some(state) = &mut app_state.payments_state {
                    payments::render_payments(f, state);
                }
            }
            AppScreen::PaymentWizard => {
                if let Some(state) = &mut app_state.payment_wizard_state {
                    payment_wizard::render_payment_wizard(f, state);
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Login => handle_login_screen(app_state).await?,
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await?,
            AppScreen::Projects => handle_projects_screen(app_state).await?,
            AppScreen::ProjectWizard => handle_project_wizard_screen(app_state).await?,
            AppScreen::Payments => handle_payments_screen(app_state).await?,
            AppScreen::PaymentWizard => handle_payment_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_dashboard_screen(app_state: &mut AppState) -> Result<()> {
    if !app_state.session.is_authenticated() {
        app_state.login_state = Some(LoginState::new());
        app_state.screen = AppScreen::Login;
        return Ok(());
    }

    let email = app_state
        .session
        .current_user()
        .map(|user| user.email.clone())
        .unwrap_or_default();
    let projects = app_state.db.load_projects().await?;

    app_state.dashboard_state = Some(DashboardState::new(email, projects));
    app_state.screen = AppScreen::Dashboard;

    Ok(())
}

async fn load_projects_screen(app_state: &mut AppState, notice: Option<Notice>) -> Result<()> {
    let projects = app_state.db.load_projects().await?;

    let mut state = ProjectsState::new(projects);
    if let Some(notice) = notice {
        state.set_notice(notice);
    }
    app_state.projects_state = Some(state);
    app_state.screen = AppScreen::Projects;

    Ok(())
}

async fn load_payments_screen(app_state: &mut AppState, notice: Option<Notice>) -> Result<()> {
    let payments = app_state.db.load_payments().await?;

    let mut state = PaymentsState::new(payments);
    if let Some(notice) = notice {
        state.set_notice(notice);
    }
    app_state.payments_state = Some(state);
    app_state.screen = AppScreen::Payments;

    Ok(())
}

// Leaving a wizard must never take the app down with it; if the list
// behind it cannot be reloaded, the wizard stays up with a notice.
async fn close_project_wizard(app_state: &mut AppState) {
    if let Err(err) = load_projects_screen(app_state, None).await {
        tracing::error!(error = %err, "failed to load projects");
        if let Some(state) = &mut app_state.project_wizard_state {
            state.set_notice(Notice::error(format!("Could not load projects: {}", err)));
        }
    }
}

async fn close_payment_wizard(app_state: &mut AppState) {
    if let Err(err) = load_payments_screen(app_state, None).await {
        tracing::error!(error = %err, "failed to load payments");
        if let Some(state) = &mut app_state.payment_wizard_state {
            state.set_notice(Notice::error(format!("Could not load payments: {}", err)));
        }
    }
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.login_state {
        Some(state) => login::handle_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(LoginAction::Exit) => return Ok(true),
        Some(LoginAction::Submit {
            email,
            password,
            mode,
        }) => {
            let result = match mode {
                LoginMode::SignIn => {
                    app_state
                        .session
                        .sign_in(&app_state.db, &email, &password)
                        .await
                }
                LoginMode::SignUp => {
                    app_state
                        .session
                        .sign_up(&app_state.db, &email, &password)
                        .await
                }
            };

            match result {
                Ok(_) => {
                    if let Err(err) = load_dashboard_screen(app_state).await {
                        tracing::error!(error = %err, "failed to load dashboard");
                        if let Some(state) = &mut app_state.login_state {
                            state.set_notice(Notice::error(format!(
                                "Could not load dashboard: {}",
                                err
                            )));
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "authentication failed");
                    if let Some(state) = &mut app_state.login_state {
                        state.set_notice(Notice::error(err.to_string()));
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.dashboard_state {
        Some(state) => dashboard::handle_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(DashboardAction::Exit) => return Ok(true),
        Some(DashboardAction::OpenProjects) => {
            if let Err(err) = load_projects_screen(app_state, None).await {
                tracing::error!(error = %err, "failed to load projects");
                if let Some(state) = &mut app_state.dashboard_state {
                    state.set_notice(Notice::error(format!("Could not load projects: {}", err)));
                }
            }
        }
        Some(DashboardAction::OpenPayments) => {
            if let Err(err) = load_payments_screen(app_state, None).await {
                tracing::error!(error = %err, "failed to load payments");
                if let Some(state) = &mut app_state.dashboard_state {
                    state.set_notice(Notice::error(format!("Could not load payments: {}", err)));
                }
            }
        }
        Some(DashboardAction::Refresh) => {
            if let Err(err) = load_dashboard_screen(app_state).await {
                tracing::error!(error = %err, "failed to refresh dashboard");
                if let Some(state) = &mut app_state.dashboard_state {
                    state.set_notice(Notice::error(format!("Could not refresh: {}", err)));
                }
            }
        }
        Some(DashboardAction::SignOut) => {
            app_state.session.sign_out();
            app_state.login_state = Some(LoginState::new());
            app_state.screen = AppScreen::Login;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_projects_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.projects_state {
        Some(state) => projects::handle_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(ProjectAction::Back) => {
            if let Err(err) = load_dashboard_screen(app_state).await {
                tracing::error!(error = %err, "failed to load dashboard");
                if let Some(state) = &mut app_state.projects_state {
                    state.set_notice(Notice::error(format!("Could not go back: {}", err)));
                }
            }
        }
        Some(ProjectAction::NewProject) => {
            app_state.project_wizard_state = Some(ProjectWizardState::new());
            app_state.screen = AppScreen::ProjectWizard;
        }
        Some(ProjectAction::EditProject(project_id)) => {
            match app_state.db.get_project(project_id).await {
                Ok(project) => {
                    app_state.project_wizard_state = Some(ProjectWizardState::from_existing(project));
                    app_state.screen = AppScreen::ProjectWizard;
                }
                Err(err) => {
                    tracing::error!(error = %err, project_id, "failed to load project");
                    if let Some(state) = &mut app_state.projects_state {
                        state.set_notice(Notice::error(format!("Could not load project: {}", err)));
                    }
                }
            }
        }
        Some(ProjectAction::DeleteProject(project_id)) => {
            match app_state.db.delete_project(project_id).await {
                Ok(()) => {
                    if let Err(err) =
                        load_projects_screen(app_state, Some(Notice::info("Project deleted"))).await
                    {
                        tracing::error!(error = %err, "failed to reload projects");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, project_id, "failed to delete project");
                    if let Some(state) = &mut app_state.projects_state {
                        state.set_notice(Notice::error(format!(
                            "Could not delete project: {}",
                            err
                        )));
                    }
                }
            }
        }
        Some(ProjectAction::Refresh) => {
            if let Err(err) = load_projects_screen(app_state, None).await {
                tracing::error!(error = %err, "failed to refresh projects");
                if let Some(state) = &mut app_state.projects_state {
                    state.set_notice(Notice::error(format!("Could not refresh: {}", err)));
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_project_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.project_wizard_state {
        Some(state) => project_wizard::handle_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(ProjectWizardAction::Cancel) => {
            close_project_wizard(app_state).await;
        }
        Some(ProjectWizardAction::Save(project)) => {
            let result = if project.id == 0 {
                app_state.db.create_project(&project).await
            } else {
                app_state.db.update_project(&project).await
            };

            match result {
                Ok(saved) => {
                    let notice = Notice::info(format!("Saved \"{}\"", saved.name));
                    if let Err(err) = load_projects_screen(app_state, Some(notice)).await {
                        tracing::error!(error = %err, "failed to reload projects");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to save project");
                    if let Some(state) = &mut app_state.project_wizard_state {
                        state.set_notice(Notice::error(format!("Could not save: {}", err)));
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_payments_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.payments_state {
        Some(state) => payments::handle_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(PaymentAction::Back) => {
            if let Err(err) = load_dashboard_screen(app_state).await {
                tracing::error!(error = %err, "failed to load dashboard");
                if let Some(state) = &mut app_state.payments_state {
                    state.set_notice(Notice::error(format!("Could not go back: {}", err)));
                }
            }
        }
        Some(PaymentAction::NewPayment) => match app_state.db.load_projects().await {
            Ok(projects) if projects.is_empty() => {
                if let Some(state) = &mut app_state.payments_state {
                    state.set_notice(Notice::error("Create a project before adding payments"));
                }
            }
            Ok(projects) => {
                app_state.payment_wizard_state = Some(PaymentWizardState::new(projects));
                app_state.screen = AppScreen::PaymentWizard;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load projects");
                if let Some(state) = &mut app_state.payments_state {
                    state.set_notice(Notice::error(format!("Could not load projects: {}", err)));
                }
            }
        },
        Some(PaymentAction::EditPayment(payment_id)) => {
            let loaded = match app_state.db.get_payment(payment_id).await {
                Ok(payment) => match app_state.db.load_projects().await {
                    Ok(projects) => Ok((payment, projects)),
                    Err(err) => Err(err),
                },
                Err(err) => Err(err),
            };

            match loaded {
                Ok((payment, projects)) => {
                    app_state.payment_wizard_state =
                        Some(PaymentWizardState::from_existing(payment, projects));
                    app_state.screen = AppScreen::PaymentWizard;
                }
                Err(err) => {
                    tracing::error!(error = %err, payment_id, "failed to load payment");
                    if let Some(state) = &mut app_state.payments_state {
                        state.set_notice(Notice::error(format!("Could not load payment: {}", err)));
                    }
                }
            }
        }
        Some(PaymentAction::DeletePayment(payment_id)) => {
            match app_state.db.delete_payment(payment_id).await {
                Ok(()) => {
                    if let Err(err) =
                        load_payments_screen(app_state, Some(Notice::info("Payment deleted"))).await
                    {
                        tracing::error!(error = %err, "failed to reload payments");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, payment_id, "failed to delete payment");
                    if let Some(state) = &mut app_state.payments_state {
                        state.set_notice(Notice::error(format!(
                            "Could not delete payment: {}",
                            err
                        )));
                    }
                }
            }
        }
        Some(PaymentAction::MarkPaid(payment_id)) => {
            let today = chrono::Local::now().date_naive();
            match app_state.db.mark_payment_paid(payment_id, today).await {
                Ok(_) => {
                    if let Err(err) =
                        load_payments_screen(app_state, Some(Notice::info("Marked as paid"))).await
                    {
                        tracing::error!(error = %err, "failed to reload payments");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, payment_id, "failed to mark payment paid");
                    if let Some(state) = &mut app_state.payments_state {
                        state.set_notice(Notice::error(format!("Could not mark paid: {}", err)));
                    }
                }
            }
        }
        Some(PaymentAction::Refresh) => {
            if let Err(err) = load_payments_screen(app_state, None).await {
                tracing::error!(error = %err, "failed to refresh payments");
                if let Some(state) = &mut app_state.payments_state {
                    state.set_notice(Notice::error(format!("Could not refresh: {}", err)));
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_payment_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.payment_wizard_state {
        Some(state) => payment_wizard::handle_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(PaymentWizardAction::Cancel) => {
            close_payment_wizard(app_state).await;
        }
        Some(PaymentWizardAction::Save(payment)) => {
            let result = if payment.id == 0 {
                app_state.db.create_payment(&payment).await
            } else {
                app_state.db.update_payment(&payment).await
            };

            match result {
                Ok(_) => {
                    if let Err(err) =
                        load_payments_screen(app_state, Some(Notice::info("Payment saved"))).await
                    {
                        tracing::error!(error = %err, "failed to reload payments");
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to save payment");
                    if let Some(state) = &mut app_state.payment_wizard_state {
                        state.set_notice(Notice::error(format!("Could not save: {}", err)));
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sqlx::postgres::PgPoolOptions;
    use std::time::Duration;

    fn unreachable_db() -> db::Database {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy("postgres://127.0.0.1:1/unreachable")
            .unwrap();
        db::Database::from_pool(pool)
    }

    fn sample_project() -> crate::models::Project {
        crate::models::Project {
            id: 1,
            name: "Site A".to_string(),
            description: None,
            status: crate::models::ProjectStatus::Todo,
            start_date: None,
            end_date: None,
            budget: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn closing_the_payment_wizard_survives_a_backend_failure() {
        let mut app_state = AppState::new(unreachable_db());
        app_state.payment_wizard_state = Some(PaymentWizardState::new(vec![sample_project()]));
        app_state.screen = AppScreen::PaymentWizard;

        close_payment_wizard(&mut app_state).await;

        assert!(matches!(app_state.screen, AppScreen::PaymentWizard));
        let state = app_state.payment_wizard_state.as_ref().unwrap();
        assert!(state.notice.is_some());
    }

    #[tokio::test]
    async fn closing_the_project_wizard_survives_a_backend_failure() {
        let mut app_state = AppState::new(unreachable_db());
        app_state.project_wizard_state = Some(ProjectWizardState::new());
        app_state.screen = AppScreen::ProjectWizard;

        close_project_wizard(&mut app_state).await;

        assert!(matches!(app_state.screen, AppScreen::ProjectWizard));
        let state = app_state.project_wizard_state.as_ref().unwrap();
        assert!(state.notice.is_some());
    }
}
