use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Keyboard-driven editor for one calendar date. Digits are collected
/// per part (YYYY, MM, DD) and committed once the part is complete;
/// Left/Right move between parts.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub buffer: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            buffer: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.buffer.clear();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.buffer.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.buffer.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                let expected_len = match self.date_part {
                    DatePart::Year => 4,
                    DatePart::Month | DatePart::Day => 2,
                };
                if self.buffer.len() >= expected_len {
                    self.commit_buffer();
                    self.buffer.clear();
                }
            }
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn commit_buffer(&mut self) {
        let new_date = match self.date_part {
            DatePart::Year => self
                .buffer
                .parse::<i32>()
                .ok()
                .filter(|y| (1900..=2100).contains(y))
                .and_then(|y| self.date.with_year(y)),
            DatePart::Month => self
                .buffer
                .parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .and_then(|m| self.date.with_month(m)),
            DatePart::Day => self
                .buffer
                .parse::<u32>()
                .ok()
                .filter(|d| (1..=31).contains(d))
                .and_then(|d| self.date.with_day(d)),
        };
        // Out-of-range input (e.g. Feb 30) leaves the date unchanged
        if let Some(date) = new_date {
            self.date = date;
        }
    }

    pub fn display_string(&self) -> String {
        if !self.editing {
            return self.date.format("%Y-%m-%d").to_string();
        }

        let cursor = if self.buffer.is_empty() {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.buffer)
        };

        match self.date_part {
            DatePart::Year => format!(
                "{}{}-{:02}-{:02}",
                self.date.year(),
                cursor,
                self.date.month(),
                self.date.day()
            ),
            DatePart::Month => format!(
                "{}-{:02}{}-{:02}",
                self.date.year(),
                self.date.month(),
                cursor,
                self.date.day()
            ),
            DatePart::Day => format!(
                "{}-{:02}-{:02}{}",
                self.date.year(),
                self.date.month(),
                self.date.day(),
                cursor
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state() -> DateInputState {
        let mut s = DateInputState::new(NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
        s.toggle_editing();
        s
    }

    fn type_digits(s: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            s.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_a_full_year_commits_it() {
        let mut s = state();
        type_digits(&mut s, "2030");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2030, 7, 15).unwrap());
    }

    #[test]
    fn invalid_day_leaves_the_date_unchanged() {
        let mut s = state();
        s.next_date_part();
        s.next_date_part();
        type_digits(&mut s, "99");
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
    }

    #[test]
    fn arrows_cycle_through_the_parts() {
        let mut s = state();
        s.handle_input(KeyCode::Right);
        assert!(s.date_part == DatePart::Month);
        s.handle_input(KeyCode::Left);
        assert!(s.date_part == DatePart::Year);
    }
}
