use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::components::notice::{render_notice, Notice};

#[derive(Clone, Copy, PartialEq)]
pub enum LoginField {
    Email,
    Password,
}

#[derive(Clone, Copy, PartialEq)]
pub enum LoginMode {
    SignIn,
    SignUp,
}

pub enum LoginAction {
    Submit {
        email: String,
        password: String,
        mode: LoginMode,
    },
    Exit,
}

pub struct LoginState {
    pub email: String,
    pub password: String,
    pub current_field: LoginField,
    pub mode: LoginMode,
    pub notice: Option<Notice>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            current_field: LoginField::Email,
            mode: LoginMode::SignIn,
            notice: None,
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::SignUp,
            LoginMode::SignUp => LoginMode::SignIn,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        let field = match self.current_field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        };
        match key {
            KeyCode::Char(c) => field.push(c),
            KeyCode::Backspace => {
                field.pop();
            }
            _ => {}
        }
    }

    pub fn is_valid(&self) -> bool {
        self.email.contains('@') && !self.password.is_empty()
    }
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &mut LoginState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title_text = match state.mode {
        LoginMode::SignIn => "Project Manager - Sign In",
        LoginMode::SignUp => "Project Manager - Create Account",
    };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let masked: String = "*".repeat(state.password.len());
    let fields = [("Email", state.email.as_str()), ("Password", masked.as_str())];

    let items: Vec<ListItem> = fields
        .iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let selected = i == state.current_field as usize;
            let style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let cursor = if selected { "|" } else { "" };
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", name), style),
                Span::styled(
                    format!("{}{}", value, cursor),
                    style.add_modifier(if selected { Modifier::BOLD } else { Modifier::empty() }),
                ),
            ]))
        })
        .collect();

    let form = List::new(items).block(Block::default().borders(Borders::ALL).title("Credentials"));
    frame.render_widget(form, chunks[1]);

    render_notice(frame, chunks[2], state.notice.as_ref());

    let help_text = match state.mode {
        LoginMode::SignIn => {
            "Tab - Switch field | Enter - Sign in | F2 - Create account instead | Esc - Quit"
        }
        LoginMode::SignUp => {
            "Tab - Switch field | Enter - Create account | F2 - Sign in instead | Esc - Quit"
        }
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[4]);
}

pub fn handle_input(state: &mut LoginState) -> Result<Option<LoginAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                return Ok(Some(LoginAction::Exit));
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                state.next_field();
            }
            KeyCode::F(2) => {
                state.notice = None;
                state.toggle_mode();
            }
            KeyCode::Enter => {
                if state.is_valid() {
                    return Ok(Some(LoginAction::Submit {
                        email: state.email.clone(),
                        password: state.password.clone(),
                        mode: state.mode,
                    }));
                }
                state.set_notice(Notice::error("Enter an email address and a password"));
            }
            code => {
                state.edit_current_field(code);
            }
        }
    }
    Ok(None)
}
