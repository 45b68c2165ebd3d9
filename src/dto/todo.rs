use crate::domain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Form body for creating or editing a todo
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct TodoForm {
    #[serde(default)]
    #[schema(example = "Buy milk")]
    pub title: String,
    #[serde(default)]
    #[schema(example = "The 2% kind")]
    pub memo: String,
    #[serde(default, deserialize_with = "super::deserialize_checkbox")]
    pub important: bool,
}

impl From<TodoForm> for domain::todo::TodoFields {
    fn from(value: TodoForm) -> Self {
        domain::todo::TodoFields {
            title: value.title,
            memo: value.memo,
            important: value.important,
        }
    }
}

impl From<&domain::todo::Todo> for TodoForm {
    fn from(value: &domain::todo::Todo) -> Self {
        TodoForm {
            title: value.title.clone(),
            memo: value.memo.clone(),
            important: value.important,
        }
    }
}

/// DTO for a todo shown to its owner
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub struct TodoItem {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Buy milk")]
    pub title: String,
    #[schema(example = "")]
    pub memo: String,
    pub important: bool,
    pub created_at: DateTime<Utc>,
    /// Null while the todo is still active
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<domain::todo::Todo> for TodoItem {
    fn from(value: domain::todo::Todo) -> Self {
        TodoItem {
            id: value.id,
            title: value.title,
            memo: value.memo,
            important: value.important,
            created_at: value.created_at,
            completed_at: value.completed_at,
        }
    }
}

/// View model for the active and completed todo lists
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct TodoListPage {
    pub todos: Vec<TodoItem>,
}

/// View model for the todo creation form
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct TodoFormPage {
    pub form: TodoForm,
    #[schema(example = "Bad data entered.")]
    pub error: Option<String>,
}

/// View model for viewing and editing a single todo
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct TodoDetailPage {
    pub todo: TodoItem,
    pub form: TodoForm,
    #[schema(example = "Bad input.")]
    pub error: Option<String>,
}
