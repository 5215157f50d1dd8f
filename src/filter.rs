use chrono::NaiveDate;

use crate::models::{Project, ProjectStatus};

/// Criteria applied to the in-memory project list. An empty filter
/// matches everything and `apply` preserves the input order.
#[derive(Debug, Default, Clone)]
pub struct ProjectFilter {
    pub search: String,
    pub status: Option<ProjectStatus>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl ProjectFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.status.is_none() && self.date_range.is_none()
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.status = None;
        self.date_range = None;
    }

    pub fn matches(&self, project: &Project) -> bool {
        self.matches_search(project) && self.matches_status(project) && self.matches_range(project)
    }

    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }

    fn matches_search(&self, project: &Project) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        if project.name.to_lowercase().contains(&needle) {
            return true;
        }
        project
            .description
            .as_ref()
            .map_or(false, |d| d.to_lowercase().contains(&needle))
    }

    fn matches_status(&self, project: &Project) -> bool {
        self.status.map_or(true, |status| project.status == status)
    }

    fn matches_range(&self, project: &Project) -> bool {
        let Some((from, to)) = self.date_range else {
            return true;
        };
        // Inclusive containment; projects without both dates never fall
        // inside a requested range.
        match (project.start_date, project.end_date) {
            (Some(start), Some(end)) => start >= from && end <= to,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn project(name: &str, description: Option<&str>, status: ProjectStatus) -> Project {
        Project {
            id: 0,
            name: name.to_string(),
            description: description.map(str::to_string),
            status,
            start_date: Some(date(2025, 1, 1)),
            end_date: Some(date(2025, 6, 30)),
            budget: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn sample() -> Vec<Project> {
        vec![
            project("Site A", Some("storefront rebuild"), ProjectStatus::Done),
            project("Site B", None, ProjectStatus::Todo),
            project("Mobile app", Some("Android first"), ProjectStatus::InProgress),
        ]
    }

    #[test]
    fn empty_filter_is_the_identity() {
        let projects = sample();
        let filter = ProjectFilter::default();
        assert!(filter.is_empty());
        let filtered = filter.apply(&projects);
        assert_eq!(filtered.len(), projects.len());
        let names: Vec<&str> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Site A", "Site B", "Mobile app"]);
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_description() {
        let projects = sample();
        let filter = ProjectFilter {
            search: "SITE".to_string(),
            ..Default::default()
        };
        assert_eq!(filter.apply(&projects).len(), 2);

        let filter = ProjectFilter {
            search: "android".to_string(),
            ..Default::default()
        };
        let filtered = filter.apply(&projects);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Mobile app");
    }

    #[test]
    fn status_match_is_exact() {
        let projects = sample();
        let filter = ProjectFilter {
            status: Some(ProjectStatus::Todo),
            ..Default::default()
        };
        let filtered = filter.apply(&projects);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Site B");
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let projects = sample();
        let filter = ProjectFilter {
            date_range: Some((date(2025, 1, 1), date(2025, 6, 30))),
            ..Default::default()
        };
        assert_eq!(filter.apply(&projects).len(), 3);

        let filter = ProjectFilter {
            date_range: Some((date(2025, 1, 2), date(2025, 6, 30))),
            ..Default::default()
        };
        assert_eq!(filter.apply(&projects).len(), 0);
    }

    #[test]
    fn projects_without_dates_never_match_a_range() {
        let mut p = project("Undated", None, ProjectStatus::Todo);
        p.start_date = None;
        let filter = ProjectFilter {
            date_range: Some((date(2025, 1, 1), date(2025, 12, 31))),
            ..Default::default()
        };
        assert!(!filter.matches(&p));
    }

    #[test]
    fn criteria_combine_conjunctively() {
        let projects = sample();
        let filter = ProjectFilter {
            search: "site".to_string(),
            status: Some(ProjectStatus::Done),
            ..Default::default()
        };
        let filtered = filter.apply(&projects);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Site A");
    }
}
