use crate::domain::todo::driven_ports::{TodoReader, TodoWriter};
use crate::domain::todo::driving_ports::TodoError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use derive_more::Display;
use tracing::info;
use validator::Validate;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Todo {
    pub id: i32,
    pub owner_user_id: i32,
    pub title: String,
    pub memo: String,
    pub important: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// The user-editable portion of a todo
#[derive(Debug, Clone, PartialEq, Eq, Default, Validate)]
pub struct TodoFields {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub memo: String,
    pub important: bool,
}

impl TodoFields {
    /// Strips surrounding whitespace from the text fields, which is how they're stored
    pub fn trimmed(&self) -> TodoFields {
        TodoFields {
            title: self.title.trim().to_owned(),
            memo: self.memo.trim().to_owned(),
            important: self.important,
        }
    }
}

/// Everything needed to insert a todo for a user
pub struct NewTodo<'fields> {
    pub fields: &'fields TodoFields,
    pub created_at: DateTime<Utc>,
}

/// Which side of the completion boundary a listing should come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TodoStatus {
    #[display("active")]
    Active,
    #[display("completed")]
    Completed,
}

pub mod driven_ports {
    use super::*;

    pub trait TodoReader {
        /// Fetches a user's todos with the given status. Active todos come back in insertion
        /// order, completed todos in ascending order of completion time.
        async fn todos_for_user(
            &self,
            user_id: i32,
            status: TodoStatus,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<Todo>, anyhow::Error>;

        async fn user_todo_by_id(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;
    }

    /// Every mutation is scoped to the owning user. Operations that address an existing todo
    /// report a todo that doesn't exist or belongs to someone else the same way.
    pub trait TodoWriter {
        async fn create_todo_for_user(
            &self,
            user_id: i32,
            new_todo: &NewTodo<'_>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<i32, anyhow::Error>;

        async fn update_user_todo(
            &self,
            user_id: i32,
            todo_id: i32,
            fields: &TodoFields,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        async fn complete_user_todo(
            &self,
            user_id: i32,
            todo_id: i32,
            completed_at: DateTime<Utc>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<Todo>, anyhow::Error>;

        /// Returns false if there was nothing to delete
        async fn delete_user_todo(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;
    use validator::ValidationErrors;

    #[derive(Debug, Error)]
    pub enum TodoError {
        #[error("todo input was invalid: {0}")]
        Invalid(ValidationErrors),
        #[error("the requested todo does not exist")]
        NotFound,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<ValidationErrors> for TodoError {
        fn from(value: ValidationErrors) -> Self {
            Self::Invalid(value)
        }
    }


    pub trait TodoPort {
        async fn create(
            &self,
            user_id: i32,
            fields: &TodoFields,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn get(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Todo, TodoError>;
        async fn list(
            &self,
            user_id: i32,
            status: TodoStatus,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_read: &impl driven_ports::TodoReader,
        ) -> Result<Vec<Todo>, TodoError>;
        async fn update(
            &self,
            user_id: i32,
            todo_id: i32,
            fields: &TodoFields,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn complete(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<Todo, TodoError>;
        async fn delete(
            &self,
            user_id: i32,
            todo_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            todo_write: &impl driven_ports::TodoWriter,
        ) -> Result<(), TodoError>;
    }
}

pub struct TodoService {}

impl driving_ports::TodoPort for TodoService {
    async fn create(
        &self,
        user_id: i32,
        fields: &TodoFields,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let fields = fields.trimmed();
        fields.validate()?;

        let created_at = Utc::now();
        let new_todo = NewTodo {
            fields: &fields,
            created_at,
        };
        let todo_id = todo_write
            .create_todo_for_user(user_id, &new_todo, &mut *ext_cxn)
            .await
            .context("creating a todo")?;
        info!(user_id, todo_id, "Created todo");

        Ok(Todo {
            id: todo_id,
            owner_user_id: user_id,
            title: fields.title,
            memo: fields.memo,
            important: fields.important,
            created_at,
            completed_at: None,
        })
    }

    async fn get(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Todo, TodoError> {
        todo_read
            .user_todo_by_id(user_id, todo_id, &mut *ext_cxn)
            .await
            .context("fetching a todo")?
            .ok_or(TodoError::NotFound)
    }

    async fn list(
        &self,
        user_id: i32,
        status: TodoStatus,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_read: &impl TodoReader,
    ) -> Result<Vec<Todo>, TodoError> {
        let todos = todo_read
            .todos_for_user(user_id, status, &mut *ext_cxn)
            .await
            .with_context(|| format!("listing {status} todos"))?;

        Ok(todos)
    }

    async fn update(
        &self,
        user_id: i32,
        todo_id: i32,
        fields: &TodoFields,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        let fields = fields.trimmed();
        fields.validate()?;

        todo_write
            .update_user_todo(user_id, todo_id, &fields, &mut *ext_cxn)
            .await
            .context("updating a todo")?
            .ok_or(TodoError::NotFound)
    }

    async fn complete(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<Todo, TodoError> {
        // Completing twice just moves the completion time forward
        todo_write
            .complete_user_todo(user_id, todo_id, Utc::now(), &mut *ext_cxn)
            .await
            .context("completing a todo")?
            .ok_or(TodoError::NotFound)
    }

    async fn delete(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        todo_write: &impl TodoWriter,
    ) -> Result<(), TodoError> {
        let deleted = todo_write
            .delete_user_todo(user_id, todo_id, &mut *ext_cxn)
            .await
            .context("deleting a todo")?;

        if deleted {
            Ok(())
        } else {
            Err(TodoError::NotFound)
        }
    }
}
