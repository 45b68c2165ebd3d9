use crate::domain::user::TodoUser;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use tracing::info;
use uuid::Uuid;

pub mod driven_ports {
    use super::*;

    pub trait SessionReader {
        /// Looks up who a session token was issued to
        async fn user_for_session(
            &self,
            token: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoUser>, anyhow::Error>;
    }

    pub trait SessionWriter {
        async fn create_session(
            &self,
            token: Uuid,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;

        /// Removes the session. Deleting a session that doesn't exist is not an error.
        async fn delete_session(
            &self,
            token: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<(), anyhow::Error>;
    }
}

pub mod driving_ports {
    use super::*;

    pub trait SessionPort {
        /// Starts a session for the user and returns the token identifying it
        async fn log_in(
            &self,
            user_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            s_write: &impl driven_ports::SessionWriter,
        ) -> Result<Uuid, anyhow::Error>;
        async fn current_user(
            &self,
            token: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            s_read: &impl driven_ports::SessionReader,
        ) -> Result<Option<TodoUser>, anyhow::Error>;
        async fn log_out(
            &self,
            token: Uuid,
            ext_cxn: &mut impl ExternalConnectivity,
            s_write: &impl driven_ports::SessionWriter,
        ) -> Result<(), anyhow::Error>;
    }
}

pub struct SessionService {}

impl driving_ports::SessionPort for SessionService {
    async fn log_in(
        &self,
        user_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        s_write: &impl driven_ports::SessionWriter,
    ) -> Result<Uuid, anyhow::Error> {
        let token = Uuid::new_v4();
        s_write
            .create_session(token, user_id, ext_cxn)
            .await
            .context("starting a session")?;
        info!(user_id, "User logged in");

        Ok(token)
    }

    async fn current_user(
        &self,
        token: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        s_read: &impl driven_ports::SessionReader,
    ) -> Result<Option<TodoUser>, anyhow::Error> {
        s_read
            .user_for_session(token, ext_cxn)
            .await
            .context("resolving the session's user")
    }

    async fn log_out(
        &self,
        token: Uuid,
        ext_cxn: &mut impl ExternalConnectivity,
        s_write: &impl driven_ports::SessionWriter,
    ) -> Result<(), anyhow::Error> {
        s_write
            .delete_session(token, ext_cxn)
            .await
            .context("ending a session")
    }
}
