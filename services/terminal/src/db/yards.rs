//! Yard storage.

use chrono::{DateTime, Utc};
use quayside_id::YardId;
use quayside_yard::{YardDimensions, YardError};
use sqlx::{
    postgres::{PgPool, PgRow},
    PgConnection, Row,
};

use super::{decode_id, to_i32, to_u32, DbError};

const YARD_COLUMNS: &str = "yard_id, name, max_rows, max_columns, max_tiers, \
     x_coordinate, z_coordinate, rotation_degree, created_at, updated_at";

/// A stored yard.
#[derive(Debug, Clone)]
pub struct YardRecord {
    pub yard_id: YardId,
    pub name: String,
    pub max_rows: u32,
    pub max_columns: u32,
    pub max_tiers: u32,
    pub x_coordinate: Option<f64>,
    pub z_coordinate: Option<f64>,
    pub rotation_degree: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl YardRecord {
    /// Dimensions as the placement engine sees them.
    pub fn dimensions(&self) -> Result<YardDimensions, YardError> {
        YardDimensions::new(self.max_rows, self.max_columns, self.max_tiers)
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for YardRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            yard_id: decode_id(row, "yard_id")?,
            name: row.try_get("name")?,
            max_rows: to_u32(row.try_get("max_rows")?),
            max_columns: to_u32(row.try_get("max_columns")?),
            max_tiers: to_u32(row.try_get("max_tiers")?),
            x_coordinate: row.try_get("x_coordinate")?,
            z_coordinate: row.try_get("z_coordinate")?,
            rotation_degree: row.try_get("rotation_degree")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Input for creating a yard.
#[derive(Debug, Clone)]
pub struct NewYard {
    pub name: String,
    pub dimensions: YardDimensions,
    pub x_coordinate: Option<f64>,
    pub z_coordinate: Option<f64>,
    pub rotation_degree: f64,
}

/// Full replacement of a yard's editable fields.
pub type YardUpdate = NewYard;

/// Store for yard rows.
#[derive(Clone)]
pub struct YardStore {
    pool: PgPool,
}

impl YardStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a yard. Fails with a unique violation if the name is taken.
    pub async fn create(&self, yard: &NewYard) -> Result<YardRecord, DbError> {
        let query = format!(
            r#"
            INSERT INTO yards (
                yard_id, name, max_rows, max_columns, max_tiers,
                x_coordinate, z_coordinate, rotation_degree
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {YARD_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, YardRecord>(&query)
            .bind(YardId::new().to_string())
            .bind(&yard.name)
            .bind(to_i32(yard.dimensions.max_rows()))
            .bind(to_i32(yard.dimensions.max_columns()))
            .bind(to_i32(yard.dimensions.max_tiers()))
            .bind(yard.x_coordinate)
            .bind(yard.z_coordinate)
            .bind(yard.rotation_degree)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    pub async fn get(&self, yard_id: &YardId) -> Result<Option<YardRecord>, DbError> {
        let query = format!("SELECT {YARD_COLUMNS} FROM yards WHERE yard_id = $1");

        let record = sqlx::query_as::<_, YardRecord>(&query)
            .bind(yard_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// One page of yards ordered by id, starting after `cursor`.
    pub async fn list(
        &self,
        limit: i64,
        cursor: Option<&YardId>,
    ) -> Result<Vec<YardRecord>, DbError> {
        let query = format!(
            r#"
            SELECT {YARD_COLUMNS}
            FROM yards
            WHERE ($1::TEXT IS NULL OR yard_id > $1)
            ORDER BY yard_id ASC
            LIMIT $2
            "#
        );

        let records = sqlx::query_as::<_, YardRecord>(&query)
            .bind(cursor.map(|id| id.to_string()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Every yard, ordered by name.
    pub async fn list_by_name(&self) -> Result<Vec<YardRecord>, DbError> {
        let query = format!("SELECT {YARD_COLUMNS} FROM yards ORDER BY name ASC, yard_id ASC");

        let records = sqlx::query_as::<_, YardRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Delete a yard. Locations in it lose their yard and coordinates.
    ///
    /// Returns `false` if the yard did not exist.
    pub async fn delete(&self, yard_id: &YardId) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        // Placements hold this lock while inserting, so none can slip in
        // between clearing the locations and deleting the yard.
        if lock_yard(&mut tx, yard_id).await?.is_none() {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE container_locations
            SET yard_id = NULL,
                row_no = NULL,
                column_start = NULL,
                column_end = NULL,
                tier = NULL,
                updated_at = now()
            WHERE yard_id = $1
            "#,
        )
        .bind(yard_id.to_string())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM yards WHERE yard_id = $1")
            .bind(yard_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Lock a yard row for the rest of the transaction.
///
/// Placements into the same yard serialize on this lock.
pub(crate) async fn lock_yard(
    conn: &mut PgConnection,
    yard_id: &YardId,
) -> Result<Option<YardRecord>, DbError> {
    let query = format!("SELECT {YARD_COLUMNS} FROM yards WHERE yard_id = $1 FOR UPDATE");

    let record = sqlx::query_as::<_, YardRecord>(&query)
        .bind(yard_id.to_string())
        .fetch_optional(conn)
        .await?;

    Ok(record)
}

pub(crate) async fn update_yard(
    conn: &mut PgConnection,
    yard_id: &YardId,
    update: &YardUpdate,
) -> Result<YardRecord, DbError> {
    let query = format!(
        r#"
        UPDATE yards
        SET name = $2,
            max_rows = $3,
            max_columns = $4,
            max_tiers = $5,
            x_coordinate = $6,
            z_coordinate = $7,
            rotation_degree = $8,
            updated_at = now()
        WHERE yard_id = $1
        RETURNING {YARD_COLUMNS}
        "#
    );

    let record = sqlx::query_as::<_, YardRecord>(&query)
        .bind(yard_id.to_string())
        .bind(&update.name)
        .bind(to_i32(update.dimensions.max_rows()))
        .bind(to_i32(update.dimensions.max_columns()))
        .bind(to_i32(update.dimensions.max_tiers()))
        .bind(update.x_coordinate)
        .bind(update.z_coordinate)
        .bind(update.rotation_degree)
        .fetch_one(conn)
        .await?;

    Ok(record)
}
