use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::{Payment, PaymentStatus};
use crate::stats::PaymentStats;
use crate::ui::components::notice::{render_notice, Notice};

// Represents the state of the payments screen
pub struct PaymentsState {
    payments: Vec<Payment>,
    stats: PaymentStats,
    table_state: TableState,
    show_delete_confirmation: bool,
    today: NaiveDate,
    pub notice: Option<Notice>,
}

impl PaymentsState {
    pub fn new(payments: Vec<Payment>) -> Self {
        let today = chrono::Local::now().date_naive();
        let stats = PaymentStats::collect(&payments, today);
        let mut table_state = TableState::default();
        if !payments.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            payments,
            stats,
            table_state,
            show_delete_confirmation: false,
            today,
            notice: None,
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn next(&mut self) {
        if self.payments.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i >= self.payments.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.payments.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => self.payments.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_payment(&self) -> Option<&Payment> {
        self.table_state
            .selected()
            .and_then(|i| self.payments.get(i))
    }

    pub fn selected_payment_id(&self) -> Option<i32> {
        self.selected_payment().map(|p| p.id)
    }

    fn selected_is_unpaid(&self) -> bool {
        self.selected_payment()
            .map_or(false, |p| p.effective_status(self.today) != PaymentStatus::Paid)
    }
}

pub enum PaymentAction {
    Back,
    NewPayment,
    EditPayment(i32),
    DeletePayment(i32),
    MarkPaid(i32),
    Refresh,
}

pub fn render_payments<B: Backend>(frame: &mut Frame<B>, state: &mut PaymentsState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(size);

    render_stats_header(frame, chunks[0], &state.stats);
    render_progress(frame, chunks[1], state);
    render_table(frame, chunks[2], state);
    render_notice(frame, chunks[3], state.notice.as_ref());

    let help = Paragraph::new(
        "N - New | E - Edit | D - Delete | P - Mark paid | R - Refresh | Esc - Back",
    )
    .style(Style::default().fg(Color::Gray))
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, chunks[4]);

    if state.show_delete_confirmation {
        render_delete_confirmation(frame, size);
    }
}

fn render_stats_header<B: Backend>(frame: &mut Frame<B>, area: Rect, stats: &PaymentStats) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ]
            .as_ref(),
        )
        .split(area);

    let values = [
        ("Total", stats.total_amount, Color::Blue),
        ("Paid", stats.paid_amount, Color::Green),
        ("Pending", stats.pending_amount, Color::Yellow),
        ("Overdue", stats.overdue_amount, Color::Red),
    ];

    for (i, (name, amount, color)) in values.iter().enumerate() {
        let card = Paragraph::new(vec![
            Spans::from(Span::styled(
                format!("{:.0}", amount),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )),
            Spans::from(Span::raw(*name)),
        ])
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(card, cards[i]);
    }
}

fn render_progress<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &PaymentsState) {
    let label = format!(
        "{}% paid ({} of {} installments)",
        state.stats.progress_percent(),
        state.stats.paid_count,
        state.payments.len()
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Payment Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(state.stats.progress_percent().min(100))
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_table<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut PaymentsState) {
    let today = state.today;
    let rows: Vec<Row> = state
        .payments
        .iter()
        .map(|payment| {
            let status = payment.effective_status(today);
            let status_color = match status {
                PaymentStatus::Paid => Color::Green,
                PaymentStatus::Pending => Color::Yellow,
                PaymentStatus::Overdue => Color::Red,
            };

            Row::new(vec![
                Cell::from(format!(
                    "{} ({}/{})",
                    payment.project_name, payment.installment_number, payment.total_installments
                )),
                Cell::from(format!("{:.0}", payment.amount)),
                Cell::from(payment.due_date.format("%Y-%m-%d").to_string()),
                Cell::from(
                    payment
                        .paid_date
                        .map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string()),
                ),
                Cell::from(status.label()).style(Style::default().fg(status_color)),
                Cell::from(payment.description.clone().unwrap_or_default()),
            ])
        })
        .collect();

    let table = Table::new(rows)
        .header(
            Row::new(vec!["Project", "Amount", "Due", "Paid", "Status", "Description"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Payments ({})", state.payments.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .widths(&[
            Constraint::Percentage(25),
            Constraint::Percentage(12),
            Constraint::Percentage(13),
            Constraint::Percentage(13),
            Constraint::Percentage(12),
            Constraint::Percentage(25),
        ]);

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from("Are you sure you want to delete this payment?"),
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

pub fn handle_input(state: &mut PaymentsState) -> Result<Option<PaymentAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if state.show_delete_confirmation {
                    state.show_delete_confirmation = false;
                } else {
                    return Ok(Some(PaymentAction::Back));
                }
            }
            KeyCode::Char('y') => {
                if state.show_delete_confirmation {
                    state.show_delete_confirmation = false;
                    if let Some(id) = state.selected_payment_id() {
                        return Ok(Some(PaymentAction::DeletePayment(id)));
                    }
                }
            }
            KeyCode::Char('n') => {
                if state.show_delete_confirmation {
                    state.show_delete_confirmation = false;
                } else {
                    return Ok(Some(PaymentAction::NewPayment));
                }
            }
            KeyCode::Char('e') => {
                if !state.show_delete_confirmation {
                    if let Some(id) = state.selected_payment_id() {
                        return Ok(Some(PaymentAction::EditPayment(id)));
                    }
                }
            }
            KeyCode::Char('d') => {
                if !state.show_delete_confirmation && state.selected_payment().is_some() {
                    state.show_delete_confirmation = true;
                }
            }
            KeyCode::Char('p') => {
                if !state.show_delete_confirmation && state.selected_is_unpaid() {
                    if let Some(id) = state.selected_payment_id() {
                        return Ok(Some(PaymentAction::MarkPaid(id)));
                    }
                }
            }
            KeyCode::Char('r') => {
                if !state.show_delete_confirmation {
                    return Ok(Some(PaymentAction::Refresh));
                }
            }
            KeyCode::Down => {
                if !state.show_delete_confirmation {
                    state.next();
                }
            }
            KeyCode::Up => {
                if !state.show_delete_confirmation {
                    state.previous();
                }
            }
            _ => {}
        }
    }
    Ok(None)
}
