use chrono::{DateTime, NaiveDate, Utc};

/// The five allowed project states, mirrored by the `project_status`
/// enum type in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
pub enum ProjectStatus {
    Todo,
    InProgress,
    Done,
    Delay,
    Maintenance,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Todo,
        ProjectStatus::InProgress,
        ProjectStatus::Done,
        ProjectStatus::Delay,
        ProjectStatus::Maintenance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Todo => "To Do",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Done => "Done",
            ProjectStatus::Delay => "Delayed",
            ProjectStatus::Maintenance => "Maintenance",
        }
    }

    /// Coarse completion percentage shown next to each project.
    pub fn progress_percent(&self) -> u16 {
        match self {
            ProjectStatus::Todo => 0,
            ProjectStatus::InProgress => 50,
            ProjectStatus::Done => 100,
            ProjectStatus::Delay => 30,
            ProjectStatus::Maintenance => 80,
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_status_has_a_distinct_label() {
        let mut labels: Vec<&str> = ProjectStatus::ALL.iter().map(|s| s.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), ProjectStatus::ALL.len());
    }

    #[test]
    fn progress_follows_the_status_mapping() {
        assert_eq!(ProjectStatus::Done.progress_percent(), 100);
        assert_eq!(ProjectStatus::Todo.progress_percent(), 0);
        assert_eq!(ProjectStatus::InProgress.progress_percent(), 50);
        assert_eq!(ProjectStatus::Delay.progress_percent(), 30);
        assert_eq!(ProjectStatus::Maintenance.progress_percent(), 80);
    }
}
