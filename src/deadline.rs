use chrono::NaiveDate;
use tui::style::Color;

/// Coarse classification of the time remaining until a deadline,
/// carrying the day difference for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineBand {
    Overdue { days: i64 },
    DueToday,
    DueSoon { days: i64 },
    Normal { days: i64 },
}

impl DeadlineBand {
    pub fn classify(end_date: NaiveDate, today: NaiveDate) -> Self {
        let diff = (end_date - today).num_days();
        if diff < 0 {
            DeadlineBand::Overdue { days: -diff }
        } else if diff == 0 {
            DeadlineBand::DueToday
        } else if diff <= 7 {
            DeadlineBand::DueSoon { days: diff }
        } else {
            DeadlineBand::Normal { days: diff }
        }
    }

    pub fn color(&self) -> Color {
        match self {
            DeadlineBand::Overdue { .. } => Color::Red,
            DeadlineBand::DueToday => Color::Magenta,
            DeadlineBand::DueSoon { .. } => Color::Yellow,
            DeadlineBand::Normal { .. } => Color::White,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            DeadlineBand::Overdue { days } => format!("{} days overdue", days),
            DeadlineBand::DueToday => "due today".to_string(),
            DeadlineBand::DueSoon { days } => format!("{} days left", days),
            DeadlineBand::Normal { days } => format!("{} days left", days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    #[test]
    fn end_date_today_is_due_today() {
        assert_eq!(DeadlineBand::classify(today(), today()), DeadlineBand::DueToday);
    }

    #[test]
    fn three_days_past_is_overdue_by_three() {
        let end = today() - Duration::days(3);
        assert_eq!(
            DeadlineBand::classify(end, today()),
            DeadlineBand::Overdue { days: 3 }
        );
    }

    #[test]
    fn within_a_week_is_due_soon() {
        let end = today() + Duration::days(1);
        assert_eq!(
            DeadlineBand::classify(end, today()),
            DeadlineBand::DueSoon { days: 1 }
        );
        let end = today() + Duration::days(7);
        assert_eq!(
            DeadlineBand::classify(end, today()),
            DeadlineBand::DueSoon { days: 7 }
        );
    }

    #[test]
    fn ten_days_out_is_normal() {
        let end = today() + Duration::days(10);
        assert_eq!(
            DeadlineBand::classify(end, today()),
            DeadlineBand::Normal { days: 10 }
        );
        let end = today() + Duration::days(8);
        assert_eq!(
            DeadlineBand::classify(end, today()),
            DeadlineBand::Normal { days: 8 }
        );
    }
}
