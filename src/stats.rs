use chrono::NaiveDate;

use crate::models::{Payment, PaymentStatus, Project, ProjectStatus};

/// Aggregate counts and budget sum over a project list. Projects with
/// no budget contribute zero to the sum.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProjectStats {
    pub total: usize,
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub delay: usize,
    pub maintenance: usize,
    pub total_budget: f64,
}

impl ProjectStats {
    pub fn collect(projects: &[Project]) -> Self {
        let mut stats = Self::default();
        for project in projects {
            stats.total += 1;
            match project.status {
                ProjectStatus::Todo => stats.todo += 1,
                ProjectStatus::InProgress => stats.in_progress += 1,
                ProjectStatus::Done => stats.done += 1,
                ProjectStatus::Delay => stats.delay += 1,
                ProjectStatus::Maintenance => stats.maintenance += 1,
            }
            stats.total_budget += project.budget.unwrap_or(0.0);
        }
        stats
    }
}

/// Amounts and counts per effective payment status, for the payments
/// screen header.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PaymentStats {
    pub total_amount: f64,
    pub paid_amount: f64,
    pub pending_amount: f64,
    pub overdue_amount: f64,
    pub paid_count: usize,
    pub pending_count: usize,
    pub overdue_count: usize,
}

impl PaymentStats {
    pub fn collect(payments: &[Payment], today: NaiveDate) -> Self {
        let mut stats = Self::default();
        for payment in payments {
            stats.total_amount += payment.amount;
            match payment.effective_status(today) {
                PaymentStatus::Paid => {
                    stats.paid_amount += payment.amount;
                    stats.paid_count += 1;
                }
                PaymentStatus::Pending => {
                    stats.pending_amount += payment.amount;
                    stats.pending_count += 1;
                }
                PaymentStatus::Overdue => {
                    stats.overdue_amount += payment.amount;
                    stats.overdue_count += 1;
                }
            }
        }
        stats
    }

    /// Share of the total amount already paid, rounded to whole percent.
    pub fn progress_percent(&self) -> u16 {
        if self.total_amount > 0.0 {
            ((self.paid_amount / self.total_amount) * 100.0).round() as u16
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn project(name: &str, status: ProjectStatus, budget: Option<f64>) -> Project {
        Project {
            id: 0,
            name: name.to_string(),
            description: None,
            status,
            start_date: None,
            end_date: None,
            budget,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn payment(status: PaymentStatus, amount: f64, due_date: NaiveDate) -> Payment {
        Payment {
            id: 0,
            project_id: 1,
            project_name: "Site A".to_string(),
            amount,
            installment_number: 1,
            total_installments: 1,
            due_date,
            paid_date: None,
            status,
            description: None,
        }
    }

    #[test]
    fn total_equals_list_length() {
        let projects = vec![
            project("a", ProjectStatus::Todo, Some(10.0)),
            project("b", ProjectStatus::Done, None),
            project("c", ProjectStatus::Delay, Some(5.0)),
        ];
        let stats = ProjectStats::collect(&projects);
        assert_eq!(stats.total, projects.len());
    }

    #[test]
    fn missing_budget_contributes_zero() {
        let projects = vec![
            project("a", ProjectStatus::Todo, None),
            project("b", ProjectStatus::Todo, Some(250.0)),
        ];
        let stats = ProjectStats::collect(&projects);
        assert_eq!(stats.total_budget, 250.0);
    }

    #[test]
    fn counts_and_budget_match_the_worked_example() {
        // [Site A/done/1000, Site B/todo/no budget]
        let projects = vec![
            project("Site A", ProjectStatus::Done, Some(1000.0)),
            project("Site B", ProjectStatus::Todo, None),
        ];
        let stats = ProjectStats::collect(&projects);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.done, 1);
        assert_eq!(stats.todo, 1);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.total_budget, 1000.0);
    }

    #[test]
    fn empty_list_yields_default_stats() {
        assert_eq!(ProjectStats::collect(&[]), ProjectStats::default());
    }

    #[test]
    fn payment_amounts_group_by_effective_status() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let payments = vec![
            payment(PaymentStatus::Paid, 100_000.0, today - Duration::days(5)),
            payment(PaymentStatus::Pending, 150_000.0, today + Duration::days(30)),
            // Stored pending but past due: counts as overdue.
            payment(PaymentStatus::Pending, 80_000.0, today - Duration::days(15)),
        ];
        let stats = PaymentStats::collect(&payments, today);
        assert_eq!(stats.total_amount, 330_000.0);
        assert_eq!(stats.paid_amount, 100_000.0);
        assert_eq!(stats.pending_amount, 150_000.0);
        assert_eq!(stats.overdue_amount, 80_000.0);
        assert_eq!(stats.paid_count, 1);
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.overdue_count, 1);
    }

    #[test]
    fn progress_percent_rounds_and_handles_empty() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let payments = vec![
            payment(PaymentStatus::Paid, 1.0, today),
            payment(PaymentStatus::Pending, 2.0, today),
        ];
        let stats = PaymentStats::collect(&payments, today);
        assert_eq!(stats.progress_percent(), 33);
        assert_eq!(PaymentStats::default().progress_percent(), 0);
    }
}
