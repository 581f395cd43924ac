//! Container storage.

use chrono::{DateTime, Utc};
use quayside_id::{CompanyId, ContainerId};
use quayside_yard::ContainerType;
use sqlx::{
    postgres::{PgPool, PgRow},
    PgConnection, Row,
};

use super::{decode_id, decode_optional_id, DbError};

const CONTAINER_COLUMNS: &str =
    "container_id, name, container_type, company_id, created_at, updated_at";

/// A registered container.
#[derive(Debug, Clone)]
pub struct ContainerRecord {
    pub container_id: ContainerId,
    pub name: String,
    pub container_type: ContainerType,
    pub company_id: Option<CompanyId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ContainerRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let container_type: String = row.try_get("container_type")?;
        let container_type =
            container_type
                .parse::<ContainerType>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "container_type".to_string(),
                    source: Box::new(e),
                })?;

        Ok(Self {
            container_id: decode_id(row, "container_id")?,
            name: row.try_get("name")?,
            container_type,
            company_id: decode_optional_id(row, "company_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Input for registering a container.
#[derive(Debug, Clone)]
pub struct NewContainer {
    /// Already normalized to upper case.
    pub name: String,
    pub container_type: ContainerType,
    pub company_id: Option<CompanyId>,
}

/// Store for container rows.
#[derive(Clone)]
pub struct ContainerStore {
    pool: PgPool,
}

impl ContainerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a container. Fails with a unique violation if the name is taken.
    pub async fn create(&self, container: &NewContainer) -> Result<ContainerRecord, DbError> {
        let query = format!(
            r#"
            INSERT INTO containers (container_id, name, container_type, company_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {CONTAINER_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, ContainerRecord>(&query)
            .bind(ContainerId::new().to_string())
            .bind(&container.name)
            .bind(container.container_type.as_str())
            .bind(container.company_id.as_ref().map(|id| id.to_string()))
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn get(&self, container_id: &ContainerId) -> Result<Option<ContainerRecord>, DbError> {
        let query = format!("SELECT {CONTAINER_COLUMNS} FROM containers WHERE container_id = $1");

        let record = sqlx::query_as::<_, ContainerRecord>(&query)
            .bind(container_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Hard delete. The container's location goes with it.
    ///
    /// Returns `false` if the container did not exist.
    pub async fn delete(&self, container_id: &ContainerId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM containers WHERE container_id = $1")
            .bind(container_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Lock a container row for the rest of the transaction.
pub(crate) async fn lock_container(
    conn: &mut PgConnection,
    container_id: &ContainerId,
) -> Result<Option<ContainerRecord>, DbError> {
    let query = format!(
        "SELECT {CONTAINER_COLUMNS} FROM containers WHERE container_id = $1 FOR UPDATE"
    );

    let record = sqlx::query_as::<_, ContainerRecord>(&query)
        .bind(container_id.to_string())
        .fetch_optional(conn)
        .await?;

    Ok(record)
}
