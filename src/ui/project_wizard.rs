use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::{Project, ProjectStatus};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::notice::{render_notice, Notice};

pub enum ProjectWizardAction {
    Cancel,
    Save(Project),
}

#[derive(Clone, Copy, PartialEq)]
pub enum ProjectField {
    Name,
    Description,
    Status,
    StartDate,
    EndDate,
    Budget,
}

pub struct ProjectWizardState {
    pub project: Project,
    pub budget_input: String,
    pub current_field: ProjectField,
    pub editing: bool,
    pub start_date_state: DateInputState,
    pub end_date_state: DateInputState,
    pub notice: Option<Notice>,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        let today = chrono::Local::now().date_naive();

        Self {
            project: Project {
                id: 0,
                name: String::new(),
                description: None,
                status: ProjectStatus::Todo,
                start_date: None,
                end_date: None,
                budget: None,
                created_at: chrono::Utc::now(),
            },
            budget_input: String::new(),
            current_field: ProjectField::Name,
            editing: false,
            start_date_state: DateInputState::new(today),
            end_date_state: DateInputState::new(today),
            notice: None,
        }
    }

    pub fn from_existing(project: Project) -> Self {
        let today = chrono::Local::now().date_naive();
        let budget_input = project
            .budget
            .map_or(String::new(), |b| format!("{}", b));

        Self {
            budget_input,
            current_field: ProjectField::Name,
            editing: false,
            start_date_state: DateInputState::new(project.start_date.unwrap_or(today)),
            end_date_state: DateInputState::new(project.end_date.unwrap_or(today)),
            notice: None,
            project,
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            match self.current_field {
                ProjectField::StartDate => {
                    // Editing an unset date gives it a value first
                    if self.project.start_date.is_none() {
                        self.project.start_date = Some(self.start_date_state.date);
                    }
                    self.start_date_state.toggle_editing();
                }
                ProjectField::EndDate => {
                    if self.project.end_date.is_none() {
                        self.project.end_date = Some(self.end_date_state.date);
                    }
                    self.end_date_state.toggle_editing();
                }
                _ => {}
            }
        } else {
            self.start_date_state.editing = false;
            self.end_date_state.editing = false;
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Description,
            ProjectField::Description => ProjectField::Status,
            ProjectField::Status => ProjectField::StartDate,
            ProjectField::StartDate => ProjectField::EndDate,
            ProjectField::EndDate => ProjectField::Budget,
            ProjectField::Budget => ProjectField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Name => ProjectField::Budget,
            ProjectField::Description => ProjectField::Name,
            ProjectField::Status => ProjectField::Description,
            ProjectField::StartDate => ProjectField::Status,
            ProjectField::EndDate => ProjectField::StartDate,
            ProjectField::Budget => ProjectField::EndDate,
        };
    }

    pub fn clear_current_field(&mut self) {
        match self.current_field {
            ProjectField::StartDate => self.project.start_date = None,
            ProjectField::EndDate => self.project.end_date = None,
            ProjectField::Budget => self.budget_input.clear(),
            ProjectField::Description => self.project.description = None,
            _ => {}
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            ProjectField::Name => match key {
                KeyCode::Char(c) => self.project.name.push(c),
                KeyCode::Backspace => {
                    self.project.name.pop();
                }
                _ => {}
            },
            ProjectField::Description => match key {
                KeyCode::Char(c) => {
                    self.project
                        .description
                        .get_or_insert_with(String::new)
                        .push(c);
                }
                KeyCode::Backspace => {
                    if let Some(description) = &mut self.project.description {
                        description.pop();
                    }
                }
                _ => {}
            },
            ProjectField::Status => match key {
                KeyCode::Left => self.cycle_status(-1),
                KeyCode::Right => self.cycle_status(1),
                _ => {}
            },
            ProjectField::StartDate => {
                self.start_date_state.handle_input(key);
                self.project.start_date = Some(self.start_date_state.date);
            }
            ProjectField::EndDate => {
                self.end_date_state.handle_input(key);
                self.project.end_date = Some(self.end_date_state.date);
            }
            ProjectField::Budget => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    self.budget_input.push(c);
                }
                KeyCode::Backspace => {
                    self.budget_input.pop();
                }
                _ => {}
            },
        }
    }

    fn cycle_status(&mut self, step: i32) {
        let index = ProjectStatus::ALL
            .iter()
            .position(|s| *s == self.project.status)
            .unwrap_or(0) as i32;
        let len = ProjectStatus::ALL.len() as i32;
        let next = (index + step).rem_euclid(len) as usize;
        self.project.status = ProjectStatus::ALL[next];
    }

    pub fn is_valid(&self) -> bool {
        !self.project.name.is_empty()
    }

    /// Folds the text buffers back into the record before saving.
    fn finished_project(&self) -> Project {
        let mut project = self.project.clone();
        if project
            .description
            .as_ref()
            .map_or(false, |d| d.is_empty())
        {
            project.description = None;
        }
        project.budget = parse_budget(&self.budget_input);
        project
    }
}

/// Budget as typed by the user; anything that is not a finite number
/// counts as "no budget".
pub fn parse_budget(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|b| b.is_finite())
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.project.id == 0 {
        "New Project"
    } else {
        "Edit Project"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    render_notice(f, chunks[2], state.notice.as_ref());

    let help_text = if state.editing {
        match state.current_field {
            ProjectField::Status => "Left/Right - Change status | Enter - Save field | Esc - Cancel editing",
            ProjectField::StartDate | ProjectField::EndDate => {
                "Enter - Save field | Left/Right - Switch date part | Esc - Cancel editing"
            }
            _ => "Enter - Save field | Esc - Cancel editing",
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate | X - Clear field | S - Save project | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState, area: Rect) {
    let field_names = ["Name", "Description", "Status", "Start Date", "End Date", "Budget"];

    let start_date_str = if state.current_field == ProjectField::StartDate && state.editing {
        state.start_date_state.display_string()
    } else {
        state
            .project
            .start_date
            .map_or("Not set".to_string(), |d| d.format("%Y-%m-%d").to_string())
    };
    let end_date_str = if state.current_field == ProjectField::EndDate && state.editing {
        state.end_date_state.display_string()
    } else {
        state
            .project
            .end_date
            .map_or("Not set".to_string(), |d| d.format("%Y-%m-%d").to_string())
    };

    let status_str = if state.current_field == ProjectField::Status && state.editing {
        format!("< {} >", state.project.status.label())
    } else {
        state.project.status.label().to_string()
    };

    let field_values = [
        state.project.name.clone(),
        state.project.description.clone().unwrap_or_default(),
        status_str,
        start_date_str,
        end_date_str,
        state.budget_input.clone(),
    ];

    let items: Vec<ListItem> = field_names
        .iter()
        .zip(field_values.iter())
        .enumerate()
        .map(|(i, (name, value))| {
            let focused = i == state.current_field as usize;
            let content = if focused && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), Style::default().fg(Color::Yellow)),
                    Span::styled(value.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ])
            } else {
                let style = if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Spans::from(vec![
                    Span::styled(format!("{}: ", name), style),
                    Span::raw(value.clone()),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Project Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProjectWizardState) -> Result<Option<ProjectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(ProjectWizardAction::Cancel));
                }
            }
            KeyCode::Enter => {
                state.toggle_editing();
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('x') if !state.editing => {
                state.clear_current_field();
            }
            KeyCode::Char('s') if !state.editing => {
                if state.is_valid() {
                    return Ok(Some(ProjectWizardAction::Save(state.finished_project())));
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn budget_parses_numbers_and_rejects_the_rest() {
        assert_eq!(parse_budget("1000"), Some(1000.0));
        assert_eq!(parse_budget(" 2500.50 "), Some(2500.5));
        assert_eq!(parse_budget(""), None);
        assert_eq!(parse_budget("abc"), None);
        assert_eq!(parse_budget("12a"), None);
        assert_eq!(parse_budget("inf"), None);
    }

    #[test]
    fn empty_description_is_dropped_on_save() {
        let mut state = ProjectWizardState::new();
        state.project.name = "Site A".to_string();
        state.project.description = Some(String::new());
        let project = state.finished_project();
        assert_eq!(project.description, None);
    }

    #[test]
    fn status_cycles_through_all_five_values() {
        let mut state = ProjectWizardState::new();
        assert_eq!(state.project.status, ProjectStatus::Todo);
        for _ in 0..ProjectStatus::ALL.len() {
            state.cycle_status(1);
        }
        assert_eq!(state.project.status, ProjectStatus::Todo);
        state.cycle_status(-1);
        assert_eq!(state.project.status, ProjectStatus::Maintenance);
    }
}
