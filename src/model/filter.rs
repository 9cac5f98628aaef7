use regex::Regex;

use super::task::{Task, TaskPriority, TaskStatus};

/// Compiled search text
#[derive(Debug, Clone)]
pub enum SearchMatcher {
    Regex(Regex),
    /// Lowercased term, for input the regex engine refuses
    Substring(String),
}

impl SearchMatcher {
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            SearchMatcher::Regex(re) => re.is_match(text),
            SearchMatcher::Substring(term) => text.to_lowercase().contains(term.as_str()),
        }
    }
}

/// Listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
}

impl TaskFilter {
    /// Whether any field narrows the listing
    pub fn is_active(&self) -> bool {
        self.status.is_some() || self.priority.is_some() || self.search_term().is_some()
    }

    /// The search text, if it is non-blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Case-insensitive literal matcher for the search text
    pub fn search_matcher(&self) -> Option<SearchMatcher> {
        let term = self.search_term()?;
        match Regex::new(&format!("(?i){}", regex::escape(term))) {
            Ok(re) => Some(SearchMatcher::Regex(re)),
            Err(e) => {
                tracing::debug!(error = %e, "search regex rejected, using substring match");
                Some(SearchMatcher::Substring(term.to_lowercase()))
            }
        }
    }

    pub fn matches(&self, task: &Task, search: Option<&SearchMatcher>) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        match search {
            Some(re) => {
                re.is_match(&task.title)
                    || task.description.as_deref().is_some_and(|d| re.is_match(d))
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(title: &str, description: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.map(Into::into),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            completed_at: None,
            order: 0,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn blank_search_is_inactive() {
        let filter = TaskFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert!(!filter.is_active());
        assert!(filter.search_matcher().is_none());
    }

    #[test]
    fn search_is_literal_and_case_insensitive() {
        let filter = TaskFilter {
            search: Some("C++".into()),
            ..Default::default()
        };
        let re = filter.search_matcher().unwrap();
        assert!(filter.matches(&task("learn c++ templates", None), Some(&re)));
        assert!(!filter.matches(&task("learn cpp", None), Some(&re)));
    }

    #[test]
    fn search_covers_description() {
        let filter = TaskFilter {
            search: Some("invoice".into()),
            ..Default::default()
        };
        let re = filter.search_matcher().unwrap();
        assert!(filter.matches(&task("Email", Some("Send INVOICE to client")), Some(&re)));
        assert!(!filter.matches(&task("Email", None), Some(&re)));
    }

    #[test]
    fn oversized_search_still_narrows() {
        // Far past the regex size limit
        let term = "x".repeat(3_000_000);
        let filter = TaskFilter {
            search: Some(term.clone()),
            ..Default::default()
        };
        let matcher = filter.search_matcher().unwrap();
        assert!(!filter.matches(&task("Email", None), Some(&matcher)));
        assert!(filter.matches(&task(&format!("A{}", term.to_uppercase()), None), Some(&matcher)));
    }

    #[test]
    fn status_and_priority_narrow() {
        let mut t = task("a", None);
        t.status = TaskStatus::Done;
        t.priority = TaskPriority::High;

        let done_high = TaskFilter {
            status: Some(TaskStatus::Done),
            priority: Some(TaskPriority::High),
            search: None,
        };
        assert!(done_high.matches(&t, None));

        let todo = TaskFilter {
            status: Some(TaskStatus::Todo),
            ..Default::default()
        };
        assert!(!todo.matches(&t, None));
    }
}
