use crate::domain;
use crate::domain::todo::{NewTodo, Todo, TodoFields, TodoStatus};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as};

pub struct DbTodoReader;

#[derive(FromRow)]
struct TodoItemRow {
    id: i32,
    user_id: i32,
    title: String,
    memo: String,
    important: bool,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<TodoItemRow> for domain::todo::Todo {
    fn from(value: TodoItemRow) -> Self {
        Todo {
            id: value.id,
            owner_user_id: value.user_id,
            title: value.title,
            memo: value.memo,
            important: value.important,
            created_at: value.created_at,
            completed_at: value.completed_at,
        }
    }
}

const ACTIVE_TODOS_QUERY: &str = "SELECT ti.* FROM todo_item ti \
    WHERE ti.user_id = $1 AND ti.completed_at IS NULL \
    ORDER BY ti.id";
const COMPLETED_TODOS_QUERY: &str = "SELECT ti.* FROM todo_item ti \
    WHERE ti.user_id = $1 AND ti.completed_at IS NOT NULL \
    ORDER BY ti.completed_at, ti.id";

impl domain::todo::driven_ports::TodoReader for DbTodoReader {
    async fn todos_for_user(
        &self,
        user_id: i32,
        status: TodoStatus,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let listing_query = match status {
            TodoStatus::Active => ACTIVE_TODOS_QUERY,
            TodoStatus::Completed => COMPLETED_TODOS_QUERY,
        };
        let todo_items: Vec<Todo> = query_as::<_, TodoItemRow>(listing_query)
            .bind(user_id)
            .fetch_all(cxn.borrow_connection())
            .await
            .context("trying to fetch todo items for a user")?
            .into_iter()
            .map(domain::todo::Todo::from)
            .collect();

        Ok(todo_items)
    }

    async fn user_todo_by_id(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let todo_item: Option<Todo> = query_as::<_, TodoItemRow>(
            "SELECT ti.* FROM todo_item ti WHERE ti.user_id = $1 AND ti.id = $2",
        )
        .bind(user_id)
        .bind(todo_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to fetch a todo item by ID")?
        .map(domain::todo::Todo::from);

        Ok(todo_item)
    }
}

pub struct DbTodoWriter;

impl domain::todo::driven_ports::TodoWriter for DbTodoWriter {
    async fn create_todo_for_user(
        &self,
        user_id: i32,
        new_todo: &NewTodo<'_>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<i32, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let new_id = query_as::<_, super::NewId>(
            "INSERT INTO todo_item(user_id, title, memo, important, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING todo_item.id",
        )
        .bind(user_id)
        .bind(&new_todo.fields.title)
        .bind(&new_todo.fields.memo)
        .bind(new_todo.fields.important)
        .bind(new_todo.created_at)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo into the database")?;

        Ok(new_id.id)
    }

    async fn update_user_todo(
        &self,
        user_id: i32,
        todo_id: i32,
        fields: &TodoFields,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let updated = query_as::<_, TodoItemRow>(
            "UPDATE todo_item SET title = $1, memo = $2, important = $3 \
             WHERE user_id = $4 AND id = $5 RETURNING *",
        )
        .bind(&fields.title)
        .bind(&fields.memo)
        .bind(fields.important)
        .bind(user_id)
        .bind(todo_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to update a todo in the database")?;

        Ok(updated.map(Todo::from))
    }

    async fn complete_user_todo(
        &self,
        user_id: i32,
        todo_id: i32,
        completed_at: DateTime<Utc>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<Todo>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let completed = query_as::<_, TodoItemRow>(
            "UPDATE todo_item SET completed_at = $1 WHERE user_id = $2 AND id = $3 RETURNING *",
        )
        .bind(completed_at)
        .bind(user_id)
        .bind(todo_id)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("trying to mark a todo complete in the database")?;

        Ok(completed.map(Todo::from))
    }

    async fn delete_user_todo(
        &self,
        user_id: i32,
        todo_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let delete_result = query("DELETE FROM todo_item WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(todo_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo from the database")?;

        Ok(delete_result.rows_affected() > 0)
    }
}
