use crate::domain;
use crate::domain::user::TodoUser;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query, query_as};
use uuid::Uuid;

pub struct DbSessionReader;

#[derive(FromRow)]
struct SessionUserRow {
    id: i32,
    username: String,
}

impl From<SessionUserRow> for TodoUser {
    fn from(value: SessionUserRow) -> Self {
        TodoUser {
            id: value.id,
            username: value.username,
        }
    }
}

impl domain::session::driven_ports::SessionReader for DbSessionReader {
    async fn user_for_session(
        &self,
        token: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoUser>, Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let user = query_as::<_, SessionUserRow>(
            "SELECT tu.id, tu.username FROM user_session us \
             INNER JOIN todo_user tu ON tu.id = us.user_id \
             WHERE us.token = $1",
        )
        .bind(token)
        .fetch_optional(cxn.borrow_connection())
        .await
        .context("Looking up the user for a session")?;

        Ok(user.map(TodoUser::from))
    }
}

pub struct DbSessionWriter;

impl domain::session::driven_ports::SessionWriter for DbSessionWriter {
    async fn create_session(
        &self,
        token: Uuid,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        query("INSERT INTO user_session(token, user_id) VALUES ($1, $2)")
            .bind(token)
            .bind(user_id)
            .execute(cxn.borrow_connection())
            .await
            .context("Saving a new session")?;

        Ok(())
    }

    async fn delete_session(
        &self,
        token: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<(), Error> {
        let mut cxn = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        query("DELETE FROM user_session WHERE token = $1")
            .bind(token)
            .execute(cxn.borrow_connection())
            .await
            .context("Removing a session")?;

        Ok(())
    }
}
