use crate::todo::{Todo, TodoStatus};
use serde::{Deserialize, Serialize};

/// GET /filter の絞り込み条件。指定された条件はすべて AND で評価する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TodoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TodoFilter {
    pub fn by_status(status: TodoStatus) -> Self {
        Self {
            status: Some(status),
            category: None,
        }
    }

    pub fn by_category(category: impl Into<String>) -> Self {
        Self {
            status: None,
            category: Some(category.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.category.is_none()
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        let status_ok = self.status.map_or(true, |s| todo.status == s);
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| todo.category == c);
        status_ok && category_ok
    }

    pub fn apply<I>(&self, todos: I) -> Vec<Todo>
    where
        I: IntoIterator<Item = Todo>,
    {
        todos.into_iter().filter(|t| self.matches(t)).collect()
    }
}
