use serde::Deserialize;

/// A named JQL search shown on the query page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedQuery {
    pub name: String,
    #[serde(rename = "jql")]
    pub expression: String,
}

impl SavedQuery {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// Fixed, ordered set of saved queries. The index of a query is its identity.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    queries: Vec<SavedQuery>,
}

impl QueryCatalog {
    pub fn new(queries: Vec<SavedQuery>) -> Self {
        Self { queries }
    }

    /// Built-in searches, optionally scoped to a single project.
    pub fn defaults(project: Option<&str>) -> Self {
        let scope = project
            .map(|key| format!("project = {} AND ", key))
            .unwrap_or_default();

        let queries = [
            ("My Tickets", "assignee = currentUser() AND resolution = Unresolved"),
            (
                "My Watched Tickets",
                "watcher = currentUser() AND resolution = Unresolved",
            ),
            ("Unlabelled", "labels IS EMPTY AND resolution = Unresolved"),
            ("Open Queue", "resolution = Unresolved"),
        ]
        .into_iter()
        .map(|(name, jql)| SavedQuery::new(name, format!("{}{}", scope, jql)))
        .collect();

        Self { queries }
    }

    pub fn count(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&SavedQuery> {
        self.queries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedQuery> {
        self.queries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unscoped_without_project() {
        let catalog = QueryCatalog::defaults(None);
        assert_eq!(catalog.count(), 4);
        assert_eq!(
            catalog.at(0).unwrap().expression,
            "assignee = currentUser() AND resolution = Unresolved"
        );
    }

    #[test]
    fn defaults_are_prefixed_with_project() {
        let catalog = QueryCatalog::defaults(Some("OPS"));
        for i in 0..catalog.count() {
            assert!(catalog.at(i).unwrap().expression.starts_with("project = OPS AND "));
        }
        assert_eq!(
            catalog.at(3).unwrap().expression,
            "project = OPS AND resolution = Unresolved"
        );
    }

    #[test]
    fn at_out_of_range_is_none() {
        let catalog = QueryCatalog::new(vec![SavedQuery::new("Only", "Q1")]);
        assert!(catalog.at(1).is_none());
        let names: Vec<&str> = catalog.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, vec!["Only"]);
    }
}
