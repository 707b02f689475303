//! Route catalog: stops, agencies, cabs, and paired route creation.

use common::{AgencyCode, CabCode, Fare, StopCode, TripId};
use reservation_store::{Agency, Cab, CatalogStore, Stop, StoreError, Trip};

use crate::error::{BookingError, Result};

/// Lookup and creation of route definitions.
///
/// Every route is created together with its reverse counterpart: the two
/// directions share cab, agency, fare, and duration, and are persisted
/// as one unit so a half-created pair can never be observed.
pub struct RouteCatalog<C: CatalogStore> {
    store: C,
}

impl<C: CatalogStore> RouteCatalog<C> {
    /// Creates a new catalog backed by the given store.
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// Registers a stop.
    #[tracing::instrument(skip(self, stop), fields(code = %stop.code))]
    pub async fn register_stop(&self, stop: Stop) -> Result<Stop> {
        match self.store.insert_stop(stop.clone()).await {
            Ok(()) => Ok(stop),
            Err(StoreError::DuplicateEntity { .. }) => {
                Err(BookingError::DuplicateStop(stop.code.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up a stop by code.
    pub async fn stop(&self, code: &StopCode) -> Result<Stop> {
        self.store
            .find_stop(code)
            .await?
            .ok_or_else(|| BookingError::StopNotFound(code.clone()))
    }

    /// Returns every registered stop, ordered by code.
    pub async fn stops(&self) -> Result<Vec<Stop>> {
        Ok(self.store.list_stops().await?)
    }

    /// Registers an agency.
    #[tracing::instrument(skip(self, agency), fields(code = %agency.code))]
    pub async fn register_agency(&self, agency: Agency) -> Result<Agency> {
        match self.store.insert_agency(agency.clone()).await {
            Ok(()) => Ok(agency),
            Err(StoreError::DuplicateEntity { .. }) => {
                Err(BookingError::DuplicateAgency(agency.code.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up an agency by code.
    pub async fn agency(&self, code: &AgencyCode) -> Result<Agency> {
        self.store
            .find_agency(code)
            .await?
            .ok_or_else(|| BookingError::AgencyNotFound(code.clone()))
    }

    /// Registers a cab. The owning agency must already exist.
    #[tracing::instrument(skip(self, cab), fields(code = %cab.code))]
    pub async fn register_cab(&self, cab: Cab) -> Result<Cab> {
        self.agency(&cab.agency).await?;
        match self.store.insert_cab(cab.clone()).await {
            Ok(()) => Ok(cab),
            Err(StoreError::DuplicateEntity { .. }) => {
                Err(BookingError::DuplicateCab(cab.code.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up a cab by code.
    pub async fn cab(&self, code: &CabCode) -> Result<Cab> {
        self.store
            .find_cab(code)
            .await?
            .ok_or_else(|| BookingError::CabNotFound(code.clone()))
    }

    /// Creates a route and its reverse counterpart as one unit.
    ///
    /// Fails with `InvalidRoute` when both endpoints are the same stop
    /// and with the matching not-found error when any referenced stop,
    /// agency, or cab does not exist. Nothing is persisted on failure.
    #[tracing::instrument(skip(self))]
    pub async fn create_route_pair(
        &self,
        source: StopCode,
        dest: StopCode,
        agency: AgencyCode,
        cab: CabCode,
        fare: Fare,
        journey_minutes: u32,
    ) -> Result<(Trip, Trip)> {
        if source == dest {
            return Err(BookingError::InvalidRoute(source));
        }
        self.stop(&source).await?;
        self.stop(&dest).await?;
        self.agency(&agency).await?;
        self.cab(&cab).await?;

        let outbound = Trip::new(source, dest, agency, cab, fare, journey_minutes);
        let inbound = outbound.reversed();
        self.store
            .insert_trip_pair(outbound.clone(), inbound.clone())
            .await?;

        tracing::info!(outbound = %outbound.id, inbound = %inbound.id, "route pair created");
        Ok((outbound, inbound))
    }

    /// Looks up a route by id.
    pub async fn route(&self, id: TripId) -> Result<Trip> {
        self.store
            .find_trip(id)
            .await?
            .ok_or(BookingError::RouteNotFound(id))
    }

    /// Returns every directed route from `source` to `dest`.
    ///
    /// Both stops must exist; an empty result means no agency serves the
    /// pair, not that the stops are unknown.
    pub async fn routes_between(&self, source: &StopCode, dest: &StopCode) -> Result<Vec<Trip>> {
        self.stop(source).await?;
        self.stop(dest).await?;
        Ok(self.store.find_trips_between(source, dest).await?)
    }

    /// Returns every route operated by an agency.
    pub async fn agency_routes(&self, agency: &AgencyCode) -> Result<Vec<Trip>> {
        self.agency(agency).await?;
        Ok(self.store.find_trips_by_agency(agency).await?)
    }
}
