//! Container location storage and yard occupancy reads.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quayside_id::{CompanyId, ContainerId, LocationId, YardId};
use quayside_yard::{ColumnSpan, ContainerFootprint, ContainerType, OccupiedSlot, Slot};
use sqlx::{
    postgres::{PgPool, PgRow},
    PgConnection, PgExecutor, Row,
};
use tracing::warn;

use super::{decode_id, decode_optional_id, to_i32, to_u32, DbError};

const LOCATION_COLUMNS: &str = "location_id, container_id, yard_id, row_no, column_start, \
     column_end, tier, created_at, updated_at";

/// The current location of one container.
///
/// `yard_id` is `None` when the container is not in any yard; the coordinates
/// are then `None` as well.
#[derive(Debug, Clone)]
pub struct LocationRecord {
    pub location_id: LocationId,
    pub container_id: ContainerId,
    pub yard_id: Option<YardId>,
    pub row: Option<u32>,
    pub column_start: Option<u32>,
    pub column_end: Option<u32>,
    pub tier: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationRecord {
    /// The stored slot, if the container is in a yard.
    pub fn slot(&self) -> Option<Slot> {
        let columns = ColumnSpan::new(self.column_start?, self.column_end?)?;
        Some(Slot::new(self.row?, columns, self.tier?))
    }
}

fn optional_coordinate(row: &PgRow, column: &str) -> Result<Option<u32>, sqlx::Error> {
    let value: Option<i32> = row.try_get(column)?;
    Ok(value.map(to_u32))
}

impl<'r> sqlx::FromRow<'r, PgRow> for LocationRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            location_id: decode_id(row, "location_id")?,
            container_id: decode_id(row, "container_id")?,
            yard_id: decode_optional_id(row, "yard_id")?,
            row: optional_coordinate(row, "row_no")?,
            column_start: optional_coordinate(row, "column_start")?,
            column_end: optional_coordinate(row, "column_end")?,
            tier: optional_coordinate(row, "tier")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A location in a yard joined with the container occupying it.
#[derive(Debug, Clone)]
pub struct YardLocationRow {
    pub location_id: LocationId,
    pub container_id: ContainerId,
    pub container_name: String,
    pub container_type: ContainerType,
    pub company_id: Option<CompanyId>,
    pub row: u32,
    pub column_start: u32,
    pub column_end: u32,
    pub tier: u32,
}

impl<'r> sqlx::FromRow<'r, PgRow> for YardLocationRow {
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
            location_id: decode_id(row, "location_id")?,
            container_id: decode_id(row, "container_id")?,
            container_name: row.try_get("container_name")?,
            container_type,
            company_id: decode_optional_id(row, "company_id")?,
            row: to_u32(row.try_get("row_no")?),
            column_start: to_u32(row.try_get("column_start")?),
            column_end: to_u32(row.try_get("column_end")?),
            tier: to_u32(row.try_get("tier")?),
        })
    }
}

/// Furthest coordinates used by any location in a yard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationExtents {
    pub max_row: Option<u32>,
    pub max_column: Option<u32>,
    pub max_tier: Option<u32>,
}

impl LocationExtents {
    /// True if every location fits inside a yard of the given size.
    pub fn fits(&self, max_rows: u32, max_columns: u32, max_tiers: u32) -> bool {
        self.max_row.map_or(true, |r| r <= max_rows)
            && self.max_column.map_or(true, |c| c <= max_columns)
            && self.max_tier.map_or(true, |t| t <= max_tiers)
    }
}

/// Input for recording where a container is.
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub container_id: ContainerId,
    pub yard_id: Option<YardId>,
    /// `None` exactly when `yard_id` is `None`.
    pub slot: Option<Slot>,
}

/// Store for location reads outside a placement transaction.
#[derive(Clone)]
pub struct LocationStore {
    pool: PgPool,
}

impl LocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn for_container(
        &self,
        container_id: &ContainerId,
    ) -> Result<Option<LocationRecord>, DbError> {
        let query =
            format!("SELECT {LOCATION_COLUMNS} FROM container_locations WHERE container_id = $1");

        let record = sqlx::query_as::<_, LocationRecord>(&query)
            .bind(container_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Locations in a yard with their containers, in slot order.
    pub async fn in_yard(&self, yard_id: &YardId) -> Result<Vec<YardLocationRow>, DbError> {
        let rows = sqlx::query_as::<_, YardLocationRow>(
            r#"
            SELECT
                l.location_id,
                l.container_id,
                c.name AS container_name,
                c.container_type,
                c.company_id,
                l.row_no,
                l.column_start,
                l.column_end,
                l.tier
            FROM container_locations l
            JOIN containers c ON c.container_id = l.container_id
            WHERE l.yard_id = $1
            ORDER BY l.row_no, l.column_start, l.tier
            "#,
        )
        .bind(yard_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn occupancy(&self, yard_id: &YardId) -> Result<Vec<OccupiedSlot>, DbError> {
        occupancy(&self.pool, yard_id).await
    }

    /// Number of the company's containers in each yard.
    pub async fn company_yard_counts(
        &self,
        company_id: &CompanyId,
    ) -> Result<HashMap<YardId, i64>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT l.yard_id, COUNT(*)::BIGINT AS container_count
            FROM container_locations l
            JOIN containers c ON c.container_id = l.container_id
            WHERE c.company_id = $1 AND l.yard_id IS NOT NULL
            GROUP BY l.yard_id
            "#,
        )
        .bind(company_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let yard_id: YardId = decode_id(row, "yard_id")?;
                let count: i64 = row.try_get("container_count")?;
                Ok((yard_id, count))
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(DbError::Query)
    }
}

/// Occupancy records for a yard, with footprints from the container types.
pub(crate) async fn occupancy<'e, E>(
    executor: E,
    yard_id: &YardId,
) -> Result<Vec<OccupiedSlot>, DbError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query(
        r#"
        SELECT l.location_id, l.row_no, l.column_start, l.column_end, l.tier, c.container_type
        FROM container_locations l
        JOIN containers c ON c.container_id = l.container_id
        WHERE l.yard_id = $1
        ORDER BY l.row_no, l.tier, l.column_start
        "#,
    )
    .bind(yard_id.to_string())
    .fetch_all(executor)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let location_id: String = row.try_get("location_id")?;
        let container_type: String = row.try_get("container_type")?;
        let footprint = match container_type.parse::<ContainerType>() {
            Ok(ty) => ContainerFootprint::from(ty),
            Err(e) => {
                warn!(location_id = %location_id, error = %e, "Skipping location with unknown container type");
                continue;
            }
        };

        let row_no: i32 = row.try_get("row_no")?;
        let column_start: i32 = row.try_get("column_start")?;
        let column_end: i32 = row.try_get("column_end")?;
        let tier: i32 = row.try_get("tier")?;

        let Some(columns) = ColumnSpan::new(to_u32(column_start), to_u32(column_end)) else {
            warn!(location_id = %location_id, column_start, column_end, "Skipping location with invalid column span");
            continue;
        };

        records.push(OccupiedSlot::new(
            Slot::new(to_u32(row_no), columns, to_u32(tier)),
            footprint,
        ));
    }

    Ok(records)
}

/// Furthest coordinates used in a yard; all `None` for an empty yard.
pub(crate) async fn location_extents(
    conn: &mut PgConnection,
    yard_id: &YardId,
) -> Result<LocationExtents, DbError> {
    let row = sqlx::query(
        r#"
        SELECT MAX(row_no) AS max_row, MAX(column_end) AS max_column, MAX(tier) AS max_tier
        FROM container_locations
        WHERE yard_id = $1
        "#,
    )
    .bind(yard_id.to_string())
    .fetch_one(conn)
    .await?;

    Ok(LocationExtents {
        max_row: optional_coordinate(&row, "max_row")?,
        max_column: optional_coordinate(&row, "max_column")?,
        max_tier: optional_coordinate(&row, "max_tier")?,
    })
}

/// Remove a container's location, returning what was there.
pub(crate) async fn delete_for_container(
    conn: &mut PgConnection,
    container_id: &ContainerId,
) -> Result<Option<LocationRecord>, DbError> {
    let query = format!(
        "DELETE FROM container_locations WHERE container_id = $1 RETURNING {LOCATION_COLUMNS}"
    );

    let record = sqlx::query_as::<_, LocationRecord>(&query)
        .bind(container_id.to_string())
        .fetch_optional(conn)
        .await?;

    Ok(record)
}

pub(crate) async fn insert_location(
    conn: &mut PgConnection,
    location: &NewLocation,
) -> Result<LocationRecord, DbError> {
    let query = format!(
        r#"
        INSERT INTO container_locations (
            location_id, container_id, yard_id, row_no, column_start, column_end, tier
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {LOCATION_COLUMNS}
        "#
    );

    let slot = location.slot;
    let record = sqlx::query_as::<_, LocationRecord>(&query)
        .bind(LocationId::new().to_string())
        .bind(location.container_id.to_string())
        .bind(location.yard_id.as_ref().map(|id| id.to_string()))
        .bind(slot.map(|s| to_i32(s.row)))
        .bind(slot.map(|s| to_i32(s.columns.start())))
        .bind(slot.map(|s| to_i32(s.columns.end())))
        .bind(slot.map(|s| to_i32(s.tier)))
        .fetch_one(conn)
        .await?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_extents_fit_any_yard() {
        assert!(LocationExtents::default().fits(1, 1, 1));
    }

    #[test]
    fn test_extents_reject_shrink_below_used_tier() {
        let extents = LocationExtents {
            max_row: Some(3),
            max_column: Some(4),
            max_tier: Some(2),
        };
        assert!(extents.fits(3, 4, 2));
        assert!(!extents.fits(3, 4, 1));
        assert!(!extents.fits(2, 10, 10));
    }
}
