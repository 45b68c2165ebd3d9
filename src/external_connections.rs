use sqlx::PgConnection;

/// Provides access to the external systems the domain talks to (currently just the database).
/// Driven adapters receive one of these so business logic never depends on a concrete pool.
pub trait ExternalConnectivity: Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    /// Acquires a handle which can be used to run queries against the database
    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// A live database connection lent out by [ExternalConnectivity]
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}
