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

use crate::models::{Payment, PaymentStatus, Project};
use crate::ui::components::date_input::DateInputState;
use crate::ui::components::notice::{render_notice, Notice};

pub enum PaymentWizardAction {
    Cancel,
    Save(Payment),
}

#[derive(Clone, Copy, PartialEq)]
pub enum PaymentField {
    Project,
    Amount,
    InstallmentNumber,
    TotalInstallments,
    DueDate,
    PaidDate,
    Description,
}

pub struct PaymentWizardState {
    pub payment: Payment,
    projects: Vec<Project>,
    project_index: usize,
    amount_input: String,
    installment_input: String,
    total_input: String,
    pub current_field: PaymentField,
    pub editing: bool,
    due_date_state: DateInputState,
    paid_date_state: DateInputState,
    pub notice: Option<Notice>,
}

impl PaymentWizardState {
    /// `projects` must be non-empty; the caller refuses to open the
    /// wizard when there is nothing to attach a payment to.
    pub fn new(projects: Vec<Project>) -> Self {
        let today = chrono::Local::now().date_naive();
        let first = &projects[0];

        Self {
            payment: Payment {
                id: 0,
                project_id: first.id,
                project_name: first.name.clone(),
                amount: 0.0,
                installment_number: 1,
                total_installments: 1,
                due_date: today,
                paid_date: None,
                status: PaymentStatus::Pending,
                description: None,
            },
            projects,
            project_index: 0,
            amount_input: String::new(),
            installment_input: "1".to_string(),
            total_input: "1".to_string(),
            current_field: PaymentField::Project,
            editing: false,
            due_date_state: DateInputState::new(today),
            paid_date_state: DateInputState::new(today),
            notice: None,
        }
    }

    pub fn from_existing(payment: Payment, projects: Vec<Project>) -> Self {
        let today = chrono::Local::now().date_naive();
        let project_index = projects
            .iter()
            .position(|p| p.id == payment.project_id)
            .unwrap_or(0);

        Self {
            amount_input: format!("{}", payment.amount),
            installment_input: payment.installment_number.to_string(),
            total_input: payment.total_installments.to_string(),
            project_index,
            projects,
            current_field: PaymentField::Project,
            editing: false,
            due_date_state: DateInputState::new(payment.due_date),
            paid_date_state: DateInputState::new(payment.paid_date.unwrap_or(today)),
            notice: None,
            payment,
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            match self.current_field {
                PaymentField::DueDate => self.due_date_state.toggle_editing(),
                PaymentField::PaidDate => {
                    if self.payment.paid_date.is_none() {
                        self.payment.paid_date = Some(self.paid_date_state.date);
                    }
                    self.paid_date_state.toggle_editing();
                }
                _ => {}
            }
        } else {
            self.due_date_state.editing = false;
            self.paid_date_state.editing = false;
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            PaymentField::Project => PaymentField::Amount,
            PaymentField::Amount => PaymentField::InstallmentNumber,
            PaymentField::InstallmentNumber => PaymentField::TotalInstallments,
            PaymentField::TotalInstallments => PaymentField::DueDate,
            PaymentField::DueDate => PaymentField::PaidDate,
            PaymentField::PaidDate => PaymentField::Description,
            PaymentField::Description => PaymentField::Project,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            PaymentField::Project => PaymentField::Description,
            PaymentField::Amount => PaymentField::Project,
            PaymentField::InstallmentNumber => PaymentField::Amount,
            PaymentField::TotalInstallments => PaymentField::InstallmentNumber,
            PaymentField::DueDate => PaymentField::TotalInstallments,
            PaymentField::PaidDate => PaymentField::DueDate,
            PaymentField::Description => PaymentField::PaidDate,
        };
    }

    pub fn clear_current_field(&mut self) {
        match self.current_field {
            PaymentField::PaidDate => self.payment.paid_date = None,
            PaymentField::Description => self.payment.description = None,
            PaymentField::Amount => self.amount_input.clear(),
            _ => {}
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            PaymentField::Project => match key {
                KeyCode::Left => self.cycle_project(-1),
                KeyCode::Right => self.cycle_project(1),
                _ => {}
            },
            PaymentField::Amount => edit_number_buffer(&mut self.amount_input, key, true),
            PaymentField::InstallmentNumber => {
                edit_number_buffer(&mut self.installment_input, key, false)
            }
            PaymentField::TotalInstallments => {
                edit_number_buffer(&mut self.total_input, key, false)
            }
            PaymentField::DueDate => {
                self.due_date_state.handle_input(key);
                self.payment.due_date = self.due_date_state.date;
            }
            PaymentField::PaidDate => {
                self.paid_date_state.handle_input(key);
                self.payment.paid_date = Some(self.paid_date_state.date);
            }
            PaymentField::Description => match key {
                KeyCode::Char(c) => {
                    self.payment
                        .description
                        .get_or_insert_with(String::new)
                        .push(c);
                }
                KeyCode::Backspace => {
                    if let Some(description) = &mut self.payment.description {
                        description.pop();
                    }
                }
                _ => {}
            },
        }
    }

    fn cycle_project(&mut self, step: i32) {
        let len = self.projects.len() as i32;
        self.project_index = (self.project_index as i32 + step).rem_euclid(len) as usize;
        let project = &self.projects[self.project_index];
        self.payment.project_id = project.id;
        self.payment.project_name = project.name.clone();
    }

    fn parsed_amount(&self) -> Option<f64> {
        self.amount_input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite() && *a >= 0.0)
    }

    pub fn is_valid(&self) -> bool {
        self.parsed_amount().is_some()
            && self
                .installment_input
                .parse::<i32>()
                .map_or(false, |n| n >= 1)
            && self.total_input.parse::<i32>().map_or(false, |n| n >= 1)
    }

    /// Folds the text buffers back into the record. A paid date makes
    /// the payment `paid`, otherwise it is stored `pending`; overdue is
    /// never written.
    fn finished_payment(&self) -> Payment {
        let mut payment = self.payment.clone();
        payment.amount = self.parsed_amount().unwrap_or(0.0);
        payment.installment_number = self.installment_input.parse().unwrap_or(1);
        payment.total_installments = self.total_input.parse().unwrap_or(1);
        payment.status = if payment.paid_date.is_some() {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        };
        if payment
            .description
            .as_ref()
            .map_or(false, |d| d.is_empty())
        {
            payment.description = None;
        }
        payment
    }
}

fn edit_number_buffer(buffer: &mut String, key: KeyCode, allow_decimal: bool) {
    match key {
        KeyCode::Char(c) if c.is_ascii_digit() || (allow_decimal && c == '.') => {
            buffer.push(c);
        }
        KeyCode::Backspace => {
            buffer.pop();
        }
        _ => {}
    }
}

pub fn render_payment_wizard<B: Backend>(f: &mut Frame<B>, state: &mut PaymentWizardState) {
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

    let title_text = if state.payment.id == 0 {
        "New Payment"
    } else {
        "Edit Payment"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    render_notice(f, chunks[2], state.notice.as_ref());

    let help_text = if state.editing {
        match state.current_field {
            PaymentField::Project => "Left/Right - Change project | Enter - Save field | Esc - Cancel editing",
            PaymentField::DueDate | PaymentField::PaidDate => {
                "Enter - Save field | Left/Right - Switch date part | Esc - Cancel editing"
            }
            _ => "Enter - Save field | Esc - Cancel editing",
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate | X - Clear field | S - Save payment | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut PaymentWizardState, area: Rect) {
    let field_names = [
        "Project",
        "Amount",
        "Installment",
        "Of Total",
        "Due Date",
        "Paid Date",
        "Description",
    ];

    let project_str = if state.current_field == PaymentField::Project && state.editing {
        format!("< {} >", state.payment.project_name)
    } else {
        state.payment.project_name.clone()
    };

    let due_date_str = if state.current_field == PaymentField::DueDate && state.editing {
        state.due_date_state.display_string()
    } else {
        state.payment.due_date.format("%Y-%m-%d").to_string()
    };
    let paid_date_str = if state.current_field == PaymentField::PaidDate && state.editing {
        state.paid_date_state.display_string()
    } else {
        state
            .payment
            .paid_date
            .map_or("Not set".to_string(), |d| d.format("%Y-%m-%d").to_string())
    };

    let field_values = [
        project_str,
        state.amount_input.clone(),
        state.installment_input.clone(),
        state.total_input.clone(),
        due_date_str,
        paid_date_str,
        state.payment.description.clone().unwrap_or_default(),
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
        .block(Block::default().borders(Borders::ALL).title("Payment Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut PaymentWizardState) -> Result<Option<PaymentWizardAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(PaymentWizardAction::Cancel));
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
                    return Ok(Some(PaymentWizardAction::Save(state.finished_payment())));
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
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn projects() -> Vec<Project> {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        vec![
            Project {
                id: 1,
                name: "Site A".to_string(),
                description: None,
                status: crate::models::ProjectStatus::Todo,
                start_date: None,
                end_date: None,
                budget: None,
                created_at,
            },
            Project {
                id: 2,
                name: "Site B".to_string(),
                description: None,
                status: crate::models::ProjectStatus::Done,
                start_date: None,
                end_date: None,
                budget: None,
                created_at,
            },
        ]
    }

    #[test]
    fn saving_with_a_paid_date_stores_paid() {
        let mut state = PaymentWizardState::new(projects());
        state.amount_input = "100".to_string();
        state.payment.paid_date = chrono::NaiveDate::from_ymd_opt(2025, 7, 10);
        let payment = state.finished_payment();
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.amount, 100.0);
    }

    #[test]
    fn saving_without_a_paid_date_stores_pending() {
        let mut state = PaymentWizardState::new(projects());
        state.amount_input = "100".to_string();
        let payment = state.finished_payment();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.paid_date, None);
    }

    #[test]
    fn cycling_projects_updates_id_and_name() {
        let mut state = PaymentWizardState::new(projects());
        assert_eq!(state.payment.project_id, 1);
        state.cycle_project(1);
        assert_eq!(state.payment.project_id, 2);
        assert_eq!(state.payment.project_name, "Site B");
        state.cycle_project(1);
        assert_eq!(state.payment.project_id, 1);
    }

    #[test]
    fn validity_requires_amount_and_positive_installments() {
        let mut state = PaymentWizardState::new(projects());
        assert!(!state.is_valid());
        state.amount_input = "100".to_string();
        assert!(state.is_valid());
        state.installment_input = "0".to_string();
        assert!(!state.is_valid());
    }
}
