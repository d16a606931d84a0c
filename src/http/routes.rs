//! Path-based service routing.
//!
//! # Design Decisions
//! - Path prefix matching only, case-sensitive, longest prefix wins
//! - No regex to guarantee O(n) matching over a handful of services

use crate::config::schema::ServiceConfig;

/// Maps request paths to the downstream service that owns them.
#[derive(Debug)]
pub struct ServiceTable {
    /// Sorted longest-prefix-first so the most specific route wins.
    services: Vec<ServiceConfig>,
}

impl ServiceTable {
    pub fn from_config(services: &[ServiceConfig]) -> Self {
        let mut services = services.to_vec();
        services.sort_by(|a, b| b.path_prefix.len().cmp(&a.path_prefix.len()));
        Self { services }
    }

    /// Find the service owning `path`, if any.
    pub fn match_path(&self, path: &str) -> Option<&ServiceConfig> {
        self.services
            .iter()
            .find(|s| path.starts_with(&s.path_prefix))
    }

    /// Whether `name` is a configured service.
    pub fn contains(&self, name: &str) -> bool {
        self.services.iter().any(|s| s.name == name)
    }

    /// Configured service names, in config order significance.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, prefix: &str) -> ServiceConfig {
        ServiceConfig {
            name: name.to_string(),
            address: "127.0.0.1:4001".to_string(),
            path_prefix: prefix.to_string(),
            breaker: None,
        }
    }

    #[test]
    fn test_prefix_match() {
        let table = ServiceTable::from_config(&[
            service("org-svc", "/orgs"),
            service("quiz-svc", "/quizzes"),
        ]);

        assert_eq!(table.match_path("/orgs/42/members").unwrap().name, "org-svc");
        assert_eq!(table.match_path("/quizzes").unwrap().name, "quiz-svc");
        assert!(table.match_path("/leagues").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = ServiceTable::from_config(&[
            service("quiz-svc", "/quizzes"),
            service("results-svc", "/quizzes/results"),
        ]);

        assert_eq!(
            table.match_path("/quizzes/results/2026").unwrap().name,
            "results-svc"
        );
        assert_eq!(table.match_path("/quizzes/7").unwrap().name, "quiz-svc");
    }

    #[test]
    fn test_case_sensitive() {
        let table = ServiceTable::from_config(&[service("org-svc", "/orgs")]);
        assert!(table.match_path("/Orgs/1").is_none());
    }

    #[test]
    fn test_contains_and_names() {
        let table = ServiceTable::from_config(&[
            service("org-svc", "/orgs"),
            service("quiz-svc", "/quizzes"),
        ]);
        assert!(table.contains("org-svc"));
        assert!(!table.contains("league-svc"));
        let names: Vec<_> = table.names().collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"quiz-svc"));
    }
}
