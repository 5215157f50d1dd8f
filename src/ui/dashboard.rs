use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::deadline::DeadlineBand;
use crate::models::{Project, ProjectStatus};
use crate::stats::ProjectStats;
use crate::ui::components::notice::{render_notice, Notice};

// How many of the newest projects the overview lists
const RECENT_LIMIT: usize = 5;

pub struct DashboardState {
    user_email: String,
    projects: Vec<Project>,
    stats: ProjectStats,
    upcoming: Vec<Project>,
    delayed: Vec<Project>,
    today: NaiveDate,
    pub notice: Option<Notice>,
}

impl DashboardState {
    pub fn new(user_email: String, projects: Vec<Project>) -> Self {
        let today = chrono::Local::now().date_naive();
        let stats = ProjectStats::collect(&projects);
        let upcoming = upcoming_deadlines(&projects, today);
        let delayed = delayed_projects(&projects, today);
        Self {
            user_email,
            projects,
            stats,
            upcoming,
            delayed,
            today,
            notice: None,
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }
}

/// Unfinished projects whose end date falls within the next week,
/// soonest first.
fn upcoming_deadlines(projects: &[Project], today: NaiveDate) -> Vec<Project> {
    let mut upcoming: Vec<Project> = projects
        .iter()
        .filter(|p| p.status != ProjectStatus::Done)
        .filter(|p| {
            p.end_date.map_or(false, |end| {
                matches!(
                    DeadlineBand::classify(end, today),
                    DeadlineBand::DueToday | DeadlineBand::DueSoon { .. }
                )
            })
        })
        .cloned()
        .collect();
    upcoming.sort_by_key(|p| p.end_date);
    upcoming
}

/// Projects needing attention: explicitly delayed, or past their end
/// date without being done.
fn delayed_projects(projects: &[Project], today: NaiveDate) -> Vec<Project> {
    projects
        .iter()
        .filter(|p| {
            p.status == ProjectStatus::Delay
                || (p.status != ProjectStatus::Done
                    && p.end_date.map_or(false, |end| end < today))
        })
        .cloned()
        .collect()
}

pub enum DashboardAction {
    OpenProjects,
    OpenPayments,
    Refresh,
    SignOut,
    Exit,
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(5),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let header = Paragraph::new(format!("Signed in as {}", state.user_email))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title("Dashboard"));
    frame.render_widget(header, chunks[0]);

    render_stat_cards(frame, chunks[1], &state.stats);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(chunks[2]);

    render_recent(frame, lists[0], state);
    render_upcoming(frame, lists[1], state);
    render_delayed(frame, lists[2], state);

    render_notice(frame, chunks[3], state.notice.as_ref());

    let help = Paragraph::new(
        "P - Projects | F - Payments | R - Refresh | O - Sign out | Q - Quit",
    )
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, chunks[4]);
}

fn render_recent<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let items: Vec<ListItem> = state
        .projects
        .iter()
        .take(RECENT_LIMIT)
        .map(|project| {
            ListItem::new(Spans::from(vec![
                Span::raw(project.name.as_str()),
                Span::raw(" - "),
                Span::styled(
                    project.status.label(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
            ]))
        })
        .collect();
    let recent = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Recent Projects"),
    );
    frame.render_widget(recent, area);
}

fn render_upcoming<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let items: Vec<ListItem> = state
        .upcoming
        .iter()
        .map(|project| {
            let detail = project
                .end_date
                .map(|end| DeadlineBand::classify(end, state.today))
                .map_or(("".to_string(), Color::White), |band| {
                    (band.summary(), band.color())
                });
            ListItem::new(Spans::from(vec![
                Span::raw(project.name.as_str()),
                Span::raw(" - "),
                Span::styled(detail.0, Style::default().fg(detail.1)),
            ]))
        })
        .collect();
    let upcoming = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Upcoming Deadlines"),
    );
    frame.render_widget(upcoming, area);
}

fn render_delayed<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let items: Vec<ListItem> = state
        .delayed
        .iter()
        .map(|project| {
            let detail = match project.end_date.map(|end| DeadlineBand::classify(end, state.today))
            {
                Some(band @ DeadlineBand::Overdue { .. }) => band.summary(),
                _ => project.status.label().to_string(),
            };
            ListItem::new(Spans::from(vec![
                Span::raw(project.name.as_str()),
                Span::raw(" - "),
                Span::styled(detail, Style::default().fg(Color::Red)),
            ]))
        })
        .collect();
    let delayed = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Delayed Projects")
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(delayed, area);
}

fn render_stat_cards<B: Backend>(frame: &mut Frame<B>, area: Rect, stats: &ProjectStats) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(14),
                Constraint::Percentage(14),
                Constraint::Percentage(15),
                Constraint::Percentage(14),
                Constraint::Percentage(14),
                Constraint::Percentage(15),
                Constraint::Percentage(14),
            ]
            .as_ref(),
        )
        .split(area);

    let values = [
        ("Total", stats.total.to_string(), Color::White),
        ("To Do", stats.todo.to_string(), Color::Gray),
        ("In Progress", stats.in_progress.to_string(), Color::Blue),
        ("Done", stats.done.to_string(), Color::Green),
        ("Delayed", stats.delay.to_string(), Color::Red),
        ("Maintenance", stats.maintenance.to_string(), Color::Cyan),
        ("Budget", format!("{:.0}", stats.total_budget), Color::Yellow),
    ];

    for (i, (name, value, color)) in values.iter().enumerate() {
        let card = Paragraph::new(vec![
            Spans::from(Span::styled(
                value.clone(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )),
            Spans::from(Span::raw(*name)),
        ])
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(card, cards[i]);
    }
}

pub fn handle_input(_state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Some(DashboardAction::Exit)),
            KeyCode::Char('p') => return Ok(Some(DashboardAction::OpenProjects)),
            KeyCode::Char('f') => return Ok(Some(DashboardAction::OpenPayments)),
            KeyCode::Char('r') => return Ok(Some(DashboardAction::Refresh)),
            KeyCode::Char('o') => return Ok(Some(DashboardAction::SignOut)),
            _ => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    fn project(name: &str, status: ProjectStatus, end_date: Option<NaiveDate>) -> Project {
        Project {
            id: 0,
            name: name.to_string(),
            description: None,
            status,
            start_date: None,
            end_date,
            budget: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn upcoming_lists_unfinished_projects_due_within_a_week() {
        let projects = vec![
            project("Next week", ProjectStatus::InProgress, Some(today() + Duration::days(6))),
            project("Today", ProjectStatus::Todo, Some(today())),
            project("Far out", ProjectStatus::InProgress, Some(today() + Duration::days(10))),
            project("Finished", ProjectStatus::Done, Some(today() + Duration::days(2))),
            project("Open ended", ProjectStatus::InProgress, None),
        ];

        let upcoming = upcoming_deadlines(&projects, today());
        let names: Vec<&str> = upcoming.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Today", "Next week"]);
    }

    #[test]
    fn delayed_includes_explicit_delays_and_missed_end_dates() {
        let projects = vec![
            project("Flagged", ProjectStatus::Delay, Some(today() + Duration::days(30))),
            project("Slipped", ProjectStatus::InProgress, Some(today() - Duration::days(2))),
            project("Shipped late", ProjectStatus::Done, Some(today() - Duration::days(2))),
            project("On track", ProjectStatus::Todo, Some(today() + Duration::days(30))),
        ];

        let delayed = delayed_projects(&projects, today());
        let names: Vec<&str> = delayed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Flagged", "Slipped"]);
    }
}
