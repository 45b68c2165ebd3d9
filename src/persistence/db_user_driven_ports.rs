use crate::domain;
use crate::domain::user::StoredCredentials;
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use sqlx::{FromRow, query_as};

pub struct DbReadUsers;

#[derive(FromRow)]
struct CredentialsRow {
    id: i32,
    password_hash: String,
}

impl From<CredentialsRow> for StoredCredentials {
    fn from(value: CredentialsRow) -> Self {
        StoredCredentials {
            user_id: value.id,
            password_hash: value.password_hash,
        }
    }
}

impl domain::user::driven_ports::UserReader for DbReadUsers {
    async fn credentials_for_username(
        &self,
        username: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<StoredCredentials>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        let credentials = query_as::<_, CredentialsRow>(
            "SELECT tu.id, tu.password_hash FROM todo_user tu WHERE tu.username = $1",
        )
        .bind(username)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Fetching credentials by username")?;

        Ok(credentials.map(StoredCredentials::from))
    }
}

pub struct DbWriteUsers;

impl domain::user::driven_ports::UserWriter for DbWriteUsers {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<i32>, Error> {
        let mut cxn_handle = ext_cxn.database_cxn().await.map_err(super::anyhowify)?;

        // A conflicting username inserts nothing, so no ID comes back
        let user = query_as::<_, super::NewId>(
            "INSERT INTO todo_user(username, password_hash) VALUES ($1, $2) \
             ON CONFLICT (username) DO NOTHING RETURNING todo_user.id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(cxn_handle.borrow_connection())
        .await
        .context("Inserting new user")?;

        Ok(user.map(|new_id| new_id.id))
    }
}
