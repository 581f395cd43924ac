//! Yard queries and location writes on top of the placement engine.
//!
//! Every call re-reads occupancy from Postgres and builds a fresh
//! [`YardGrid`]; nothing is cached between requests. Location writes run in
//! a single transaction that locks the container row and then the target
//! yard row, so two placements into the same yard cannot both pass
//! validation against the same snapshot.

mod error;

pub use error::PlacementServiceError;

use std::cmp::Reverse;

use quayside_id::{CompanyId, ContainerId, YardId};
use quayside_yard::{
    derive_column_end, AvailablePlace, ContainerType, LocationValidator, ProposedLocation,
    YardGrid,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::db::{
    self, Database, DbError, LocationRecord, NewLocation, YardRecord, YardUpdate,
};

/// Filter for [`PlacementService::list_available_slots`].
#[derive(Debug, Clone)]
pub struct SlotQuery {
    pub container_type: ContainerType,
    /// Restrict the search to one yard.
    pub yard_id: Option<YardId>,
    /// Prefer yards already holding this customer's containers.
    pub customer_id: Option<CompanyId>,
}

/// Free places for one yard.
#[derive(Debug, Clone, Serialize)]
pub struct YardAvailability {
    pub yard_id: YardId,
    pub yard_name: String,
    pub max_rows: u32,
    pub max_columns: u32,
    pub max_tiers: u32,
    pub available_places: Vec<AvailablePlace>,
}

/// Where a container should go.
///
/// No yard means "not in yard"; the coordinates are then discarded, not
/// validated.
#[derive(Debug, Clone, Default)]
pub struct PlacementRequest {
    pub yard_id: Option<YardId>,
    pub row: Option<u32>,
    pub column_start: Option<u32>,
    /// Derived from the container type when omitted.
    pub column_end: Option<u32>,
    pub tier: Option<u32>,
}

#[derive(Clone)]
pub struct PlacementService {
    db: Database,
    validator: LocationValidator,
}

impl PlacementService {
    pub fn new(db: Database, validator: LocationValidator) -> Self {
        Self { db, validator }
    }

    pub fn validator(&self) -> LocationValidator {
        self.validator
    }

    /// Free places per yard for a container type.
    ///
    /// Yards without a single free place are left out. With a customer, yards
    /// holding more of that customer's containers come first; ties and the
    /// no-customer case are ordered by yard name.
    #[instrument(skip(self, query), fields(container_type = %query.container_type))]
    pub async fn list_available_slots(
        &self,
        query: &SlotQuery,
    ) -> Result<Vec<YardAvailability>, PlacementServiceError> {
        let yards = match &query.yard_id {
            Some(yard_id) => {
                let yard = self
                    .db
                    .yard_store()
                    .get(yard_id)
                    .await?
                    .ok_or(PlacementServiceError::UnknownYard(*yard_id))?;
                vec![yard]
            }
            None => self.db.yard_store().list_by_name().await?,
        };

        let customer_counts = match &query.customer_id {
            Some(customer_id) => {
                self.db
                    .location_store()
                    .company_yard_counts(customer_id)
                    .await?
            }
            None => Default::default(),
        };

        let footprint = query.container_type.footprint();
        let locations = self.db.location_store();
        let mut result = Vec::new();

        for yard in yards {
            let occupied = locations.occupancy(&yard.yard_id).await?;
            let grid = YardGrid::new(yard.dimensions()?, occupied);
            let (grid, available_places) = tokio::task::spawn_blocking(move || {
                let places = grid.available_places(footprint);
                (grid, places)
            })
            .await?;

            debug!(
                yard_id = %yard.yard_id,
                occupied = grid.occupied_count(),
                available = available_places.len(),
                "Searched yard"
            );

            if available_places.is_empty() {
                continue;
            }

            result.push(YardAvailability {
                yard_id: yard.yard_id,
                yard_name: yard.name,
                max_rows: yard.max_rows,
                max_columns: yard.max_columns,
                max_tiers: yard.max_tiers,
                available_places,
            });
        }

        // Stable: yards arrive ordered by name.
        result.sort_by_key(|y| Reverse(customer_counts.get(&y.yard_id).copied().unwrap_or(0)));

        Ok(result)
    }

    /// Record where a container is, replacing its previous location.
    #[instrument(skip(self, request), fields(container_id = %container_id, yard_id = ?request.yard_id))]
    pub async fn place_container(
        &self,
        container_id: &ContainerId,
        request: &PlacementRequest,
    ) -> Result<LocationRecord, PlacementServiceError> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::Query)?;

        let container = db::lock_container(&mut tx, container_id)
            .await?
            .ok_or(PlacementServiceError::UnknownContainer(*container_id))?;

        // Dropped inside the transaction so the occupancy read below no
        // longer sees the container's own slot.
        let previous = db::delete_for_container(&mut tx, container_id).await?;

        let slot = match &request.yard_id {
            None => None,
            Some(yard_id) => {
                let yard = db::lock_yard(&mut tx, yard_id)
                    .await?
                    .ok_or(PlacementServiceError::UnknownYard(*yard_id))?;

                let occupied = db::occupancy(&mut *tx, yard_id).await?;
                let grid = YardGrid::new(yard.dimensions()?, occupied);

                let footprint = container.container_type.footprint();
                let proposed = ProposedLocation {
                    row: request.row,
                    column_start: request.column_start,
                    column_end: request
                        .column_end
                        .or_else(|| request.column_start.map(|c| derive_column_end(footprint, c))),
                    tier: request.tier,
                    footprint: Some(footprint),
                };

                self.validator.validate(&proposed, Some(&grid))?
            }
        };

        let location = db::insert_location(
            &mut tx,
            &NewLocation {
                container_id: *container_id,
                yard_id: request.yard_id,
                slot,
            },
        )
        .await?;

        tx.commit().await.map_err(DbError::Query)?;

        info!(
            location_id = %location.location_id,
            row = ?location.row,
            column_start = ?location.column_start,
            column_end = ?location.column_end,
            tier = ?location.tier,
            relocated = previous.is_some(),
            "Container placed"
        );

        Ok(location)
    }

    /// Take a container out of the yard. Returns the location it had.
    #[instrument(skip(self), fields(container_id = %container_id))]
    pub async fn remove_container(
        &self,
        container_id: &ContainerId,
    ) -> Result<Option<LocationRecord>, PlacementServiceError> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::Query)?;

        db::lock_container(&mut tx, container_id)
            .await?
            .ok_or(PlacementServiceError::UnknownContainer(*container_id))?;

        let removed = db::delete_for_container(&mut tx, container_id).await?;

        tx.commit().await.map_err(DbError::Query)?;

        if let Some(location) = &removed {
            info!(location_id = %location.location_id, yard_id = ?location.yard_id, "Container removed from yard");
        }

        Ok(removed)
    }

    /// Rename, move or resize a yard.
    ///
    /// Shrinking below a stored location is refused rather than leaving that
    /// location outside the yard.
    #[instrument(skip(self, update), fields(yard_id = %yard_id))]
    pub async fn update_yard(
        &self,
        yard_id: &YardId,
        update: &YardUpdate,
    ) -> Result<YardRecord, PlacementServiceError> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::Query)?;

        db::lock_yard(&mut tx, yard_id)
            .await?
            .ok_or(PlacementServiceError::UnknownYard(*yard_id))?;

        let dims = update.dimensions;
        let extents = db::location_extents(&mut tx, yard_id).await?;
        if !extents.fits(dims.max_rows(), dims.max_columns(), dims.max_tiers()) {
            return Err(PlacementServiceError::ResizeWouldStrand {
                yard_id: *yard_id,
                max_rows: dims.max_rows(),
                max_columns: dims.max_columns(),
                max_tiers: dims.max_tiers(),
            });
        }

        let yard = db::update_yard(&mut tx, yard_id, update)
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    PlacementServiceError::NameTaken(update.name.clone())
                } else {
                    e.into()
                }
            })?;

        tx.commit().await.map_err(DbError::Query)?;

        info!(
            max_rows = yard.max_rows,
            max_columns = yard.max_columns,
            max_tiers = yard.max_tiers,
            "Yard updated"
        );

        Ok(yard)
    }
}
