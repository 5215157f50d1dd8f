use chrono::NaiveDate;

/// Payment states as stored in the database. `Overdue` is accepted when
/// reading but never written: a pending payment past its due date is
/// reported as overdue at display time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Overdue => "Overdue",
        }
    }
}

/// One scheduled partial payment within a project's payment plan.
/// `project_name` is joined in from the owning project on every read.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Payment {
    pub id: i32,
    pub project_id: i32,
    pub project_name: String,
    pub amount: f64,
    pub installment_number: i32,
    pub total_installments: i32,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub description: Option<String>,
}

impl Payment {
    /// Status as the user should see it: a stored `Pending` past its due
    /// date reads as `Overdue`. A stored `Paid` never changes.
    pub fn effective_status(&self, today: NaiveDate) -> PaymentStatus {
        match self.status {
            PaymentStatus::Paid => PaymentStatus::Paid,
            PaymentStatus::Overdue => PaymentStatus::Overdue,
            PaymentStatus::Pending if self.due_date < today => PaymentStatus::Overdue,
            PaymentStatus::Pending => PaymentStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn payment(status: PaymentStatus, due_date: NaiveDate) -> Payment {
        Payment {
            id: 1,
            project_id: 1,
            project_name: "Site A".to_string(),
            amount: 1000.0,
            installment_number: 1,
            total_installments: 2,
            due_date,
            paid_date: None,
            status,
            description: None,
        }
    }

    #[test]
    fn pending_past_due_reads_as_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let p = payment(PaymentStatus::Pending, due);
        assert_eq!(p.effective_status(today), PaymentStatus::Overdue);
    }

    #[test]
    fn pending_due_today_stays_pending() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let p = payment(PaymentStatus::Pending, today);
        assert_eq!(p.effective_status(today), PaymentStatus::Pending);
    }

    #[test]
    fn paid_never_turns_overdue() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let p = payment(PaymentStatus::Paid, due);
        assert_eq!(p.effective_status(today), PaymentStatus::Paid);
    }
}
