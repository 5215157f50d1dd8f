use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::deadline::DeadlineBand;
use crate::filter::ProjectFilter;
use crate::models::{Project, ProjectStatus};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::notice::{render_notice, Notice};

#[derive(Clone, Copy, PartialEq)]
enum InputMode {
    Browse,
    Search,
    Range,
}

#[derive(Clone, Copy, PartialEq)]
enum RangeField {
    From,
    To,
}

// Represents the state of the project table screen
pub struct ProjectsState {
    projects: Vec<Project>,
    visible: Vec<Project>,
    filter: ProjectFilter,
    table_state: TableState,
    show_delete_confirmation: bool,
    input_mode: InputMode,
    range_field: RangeField,
    from_date: DateInputState,
    to_date: DateInputState,
    today: NaiveDate,
    pub notice: Option<Notice>,
}

impl ProjectsState {
    pub fn new(projects: Vec<Project>) -> Self {
        let today = chrono::Local::now().date_naive();
        let mut state = Self {
            projects,
            visible: Vec::new(),
            filter: ProjectFilter::default(),
            table_state: TableState::default(),
            show_delete_confirmation: false,
            input_mode: InputMode::Browse,
            range_field: RangeField::From,
            from_date: DateInputState::new(today),
            to_date: DateInputState::new(today),
            today,
            notice: None,
        };
        state.refresh_visible();
        state
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    fn refresh_visible(&mut self) {
        self.visible = self
            .filter
            .apply(&self.projects)
            .into_iter()
            .cloned()
            .collect();
        if self.visible.is_empty() {
            self.table_state.select(None);
        } else {
            let selected = self.table_state.selected().unwrap_or(0);
            self.table_state
                .select(Some(selected.min(self.visible.len() - 1)));
        }
    }

    pub fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i >= self.visible.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.table_state.selected().and_then(|i| self.visible.get(i))
    }

    pub fn selected_project_id(&self) -> Option<i32> {
        self.selected_project().map(|p| p.id)
    }

    fn cycle_status_filter(&mut self) {
        self.filter.status = match self.filter.status {
            None => Some(ProjectStatus::ALL[0]),
            Some(current) => {
                let index = ProjectStatus::ALL
                    .iter()
                    .position(|s| *s == current)
                    .unwrap_or(0);
                ProjectStatus::ALL.get(index + 1).copied()
            }
        };
        self.refresh_visible();
    }

    fn begin_range_edit(&mut self) {
        self.input_mode = InputMode::Range;
        self.range_field = RangeField::From;
        if let Some((from, to)) = self.filter.date_range {
            self.from_date = DateInputState::new(from);
            self.to_date = DateInputState::new(to);
        }
        self.from_date.editing = true;
        self.to_date.editing = false;
    }

    fn switch_range_field(&mut self) {
        self.range_field = match self.range_field {
            RangeField::From => RangeField::To,
            RangeField::To => RangeField::From,
        };
        self.from_date.editing = self.range_field == RangeField::From;
        self.to_date.editing = self.range_field == RangeField::To;
    }

    fn commit_range(&mut self) {
        // An inverted range would silently match nothing; apply it in order
        let (from, to) = if self.from_date.date <= self.to_date.date {
            (self.from_date.date, self.to_date.date)
        } else {
            (self.to_date.date, self.from_date.date)
        };
        self.filter.date_range = Some((from, to));
        self.from_date.editing = false;
        self.to_date.editing = false;
        self.input_mode = InputMode::Browse;
        self.refresh_visible();
    }

    fn cancel_range(&mut self) {
        self.from_date.editing = false;
        self.to_date.editing = false;
        self.input_mode = InputMode::Browse;
    }
}

pub enum ProjectAction {
    Back,
    NewProject,
    EditProject(i32),
    DeleteProject(i32),
    Refresh,
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    render_filter_bar(frame, chunks[0], state);
    render_table(frame, chunks[1], state);
    render_notice(frame, chunks[2], state.notice.as_ref());

    let help_text = match state.input_mode {
        InputMode::Search => "Type to search | Enter/Esc - Done",
        InputMode::Range => {
            "Digits - Edit date | Left/Right - Date part | Tab - From/To | Enter - Apply | Esc - Cancel"
        }
        InputMode::Browse => {
            "/ Search | S - Status | G - Date range | C - Clear | N - New | E - Edit | D - Delete | R - Refresh | Esc - Back"
        }
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, chunks[3]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_filter_bar<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &ProjectsState) {
    let search = if state.input_mode == InputMode::Search {
        format!("{}|", state.filter.search)
    } else if state.filter.search.is_empty() {
        "-".to_string()
    } else {
        state.filter.search.clone()
    };

    let status = state
        .filter
        .status
        .map_or("All", |s| s.label());

    let range = if state.input_mode == InputMode::Range {
        format!(
            "{} .. {}",
            state.from_date.display_string(),
            state.to_date.display_string()
        )
    } else {
        match state.filter.date_range {
            Some((from, to)) => format!("{} .. {}", from, to),
            None => "Any".to_string(),
        }
    };

    let title = if state.filter.is_empty() {
        "Filter"
    } else {
        "Filter (active)"
    };
    let bar = Paragraph::new(Spans::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::Yellow)),
        Span::raw(search),
        Span::styled("  Status: ", Style::default().fg(Color::Yellow)),
        Span::raw(status),
        Span::styled("  Dates: ", Style::default().fg(Color::Yellow)),
        Span::raw(range),
    ]))
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(bar, area);
}

fn render_table<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut ProjectsState) {
    let today = state.today;
    let rows: Vec<Row> = state
        .visible
        .iter()
        .map(|project| {
            let start = project
                .start_date
                .map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string());

            let (end, deadline) = match project.end_date {
                Some(date) => {
                    let band = DeadlineBand::classify(date, today);
                    (
                        Cell::from(date.format("%Y-%m-%d").to_string())
                            .style(Style::default().fg(band.color())),
                        Cell::from(band.summary()).style(Style::default().fg(band.color())),
                    )
                }
                None => (Cell::from("-"), Cell::from("-")),
            };

            let budget = project
                .budget
                .map_or("-".to_string(), |b| format!("{:.0}", b));

            Row::new(vec![
                Cell::from(project.name.clone()),
                Cell::from(project.status.label()),
                Cell::from(format!("{}%", project.status.progress_percent())),
                Cell::from(start),
                end,
                deadline,
                Cell::from(budget),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(
            Row::new(vec![
                "Name", "Status", "Progress", "Start", "End", "Deadline", "Budget",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Projects ({})", state.visible.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Percentage(25),
            Constraint::Percentage(13),
            Constraint::Percentage(9),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(16),
            Constraint::Percentage(13),
        ]);

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this project?"),
        Spans::from(""),
        Spans::from("All associated payments will also be deleted."),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(popup, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_input(state: &mut ProjectsState) -> Result<Option<ProjectAction>> {
    if let Event::Key(key) = event::read()? {
        match state.input_mode {
            InputMode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    state.input_mode = InputMode::Browse;
                }
                KeyCode::Char(c) => {
                    state.filter.search.push(c);
                    state.refresh_visible();
                }
                KeyCode::Backspace => {
                    state.filter.search.pop();
                    state.refresh_visible();
                }
                _ => {}
            },
            InputMode::Range => match key.code {
                KeyCode::Enter => state.commit_range(),
                KeyCode::Esc => state.cancel_range(),
                KeyCode::Tab | KeyCode::BackTab => state.switch_range_field(),
                code => match state.range_field {
                    RangeField::From => state.from_date.handle_input(code),
                    RangeField::To => state.to_date.handle_input(code),
                },
            },
            InputMode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    if state.show_delete_confirmation {
                        state.show_delete_confirmation = false;
                    } else {
                        return Ok(Some(ProjectAction::Back));
                    }
                }
                KeyCode::Char('y') => {
                    if state.show_delete_confirmation {
                        state.show_delete_confirmation = false;
                        if let Some(id) = state.selected_project_id() {
                            return Ok(Some(ProjectAction::DeleteProject(id)));
                        }
                    }
                }
                KeyCode::Char('n') => {
                    if state.show_delete_confirmation {
                        state.show_delete_confirmation = false;
                    } else {
                        return Ok(Some(ProjectAction::NewProject));
                    }
                }
                KeyCode::Char('e') => {
                    if !state.show_delete_confirmation {
                        if let Some(id) = state.selected_project_id() {
                            return Ok(Some(ProjectAction::EditProject(id)));
                        }
                    }
                }
                KeyCode::Char('d') => {
                    if !state.show_delete_confirmation && state.selected_project().is_some() {
                        state.show_delete_confirmation = true;
                    }
                }
                KeyCode::Char('r') => {
                    if !state.show_delete_confirmation {
                        return Ok(Some(ProjectAction::Refresh));
                    }
                }
                KeyCode::Char('/') => {
                    if !state.show_delete_confirmation {
                        state.input_mode = InputMode::Search;
                    }
                }
                KeyCode::Char('s') => {
                    if !state.show_delete_confirmation {
                        state.cycle_status_filter();
                    }
                }
                KeyCode::Char('g') => {
                    if !state.show_delete_confirmation {
                        state.begin_range_edit();
                    }
                }
                KeyCode::Char('c') => {
                    if !state.show_delete_confirmation {
                        state.filter.clear();
                        state.refresh_visible();
                    }
                }
                KeyCode::Down => state.next(),
                KeyCode::Up => state.previous(),
                _ => {}
            },
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn committing_an_inverted_range_swaps_the_endpoints() {
        let mut state = ProjectsState::new(Vec::new());
        state.begin_range_edit();
        state.from_date = DateInputState::new(date(2025, 12, 31));
        state.to_date = DateInputState::new(date(2025, 1, 1));

        state.commit_range();

        assert_eq!(
            state.filter.date_range,
            Some((date(2025, 1, 1), date(2025, 12, 31)))
        );
    }

    #[test]
    fn committing_an_ordered_range_keeps_it_as_entered() {
        let mut state = ProjectsState::new(Vec::new());
        state.begin_range_edit();
        state.from_date = DateInputState::new(date(2025, 1, 1));
        state.to_date = DateInputState::new(date(2025, 6, 30));

        state.commit_range();

        assert_eq!(
            state.filter.date_range,
            Some((date(2025, 1, 1), date(2025, 6, 30)))
        );
    }
}
