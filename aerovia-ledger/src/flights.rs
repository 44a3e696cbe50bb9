use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use aerovia_cache::{get_json, keys, set_json, Cache, CacheTtls};
use aerovia_core::error::DomainResult;
use aerovia_core::flight::{Flight, FlightSpec};
use aerovia_core::repository::FlightStore;
use aerovia_core::search::SearchQuery;

/// Flight reads go through the cache; every mutation invalidates the
/// flight's own entries plus the whole search namespace, since any cached
/// search result may reference the mutated availability.
pub struct FlightService {
    store: Arc<dyn FlightStore>,
    cache: Arc<dyn Cache>,
    ttls: CacheTtls,
}

impl FlightService {
    pub fn new(store: Arc<dyn FlightStore>, cache: Arc<dyn Cache>, ttls: CacheTtls) -> Self {
        Self { store, cache, ttls }
    }

    pub async fn get_flight(&self, id: Uuid) -> DomainResult<Flight> {
        let key = keys::flight_by_id(id);
        if let Some(flight) = get_json::<Flight>(self.cache.as_ref(), &key).await {
            return Ok(flight);
        }
        debug!(%id, "flight cache miss, reading store");
        let flight = self.store.get_flight(id).await?;
        set_json(self.cache.as_ref(), &key, &flight, self.ttls.flight()).await;
        Ok(flight)
    }

    pub async fn get_flight_by_number(&self, flight_number: &str) -> DomainResult<Flight> {
        let key = keys::flight_by_number(flight_number);
        if let Some(flight) = get_json::<Flight>(self.cache.as_ref(), &key).await {
            return Ok(flight);
        }
        debug!(flight_number, "flight cache miss, reading store");
        let flight = self.store.get_flight_by_number(flight_number).await?;
        set_json(self.cache.as_ref(), &key, &flight, self.ttls.flight()).await;
        Ok(flight)
    }

    pub async fn search(&self, query: &SearchQuery) -> DomainResult<Vec<Flight>> {
        query.validate()?;
        let query = query.normalized();
        let key = keys::search(
            &query.origin,
            &query.destination,
            query.departing_after,
            query.seats_needed,
        );
        if let Some(flights) = get_json::<Vec<Flight>>(self.cache.as_ref(), &key).await {
            return Ok(flights);
        }
        let flights = self.store.search_available(&query).await?;
        if !flights.is_empty() {
            set_json(self.cache.as_ref(), &key, &flights, self.ttls.search()).await;
        }
        Ok(flights)
    }

    pub async fn create_flight(&self, spec: &FlightSpec) -> DomainResult<Flight> {
        spec.validate()?;
        let flight = Flight::from_spec(spec);
        self.store.create_flight(&flight).await?;
        info!(flight_number = %flight.flight_number, "flight created");
        self.invalidate_flight(flight.id, &flight.flight_number).await;
        Ok(flight)
    }

    pub async fn update_flight(&self, id: Uuid, spec: &FlightSpec) -> DomainResult<Flight> {
        spec.validate()?;
        let flight = self.store.update_flight(id, spec).await?;
        info!(%id, "flight updated");
        self.invalidate_flight(flight.id, &flight.flight_number).await;
        Ok(flight)
    }

    pub async fn delete_flight(&self, id: Uuid) -> DomainResult<()> {
        let flight = self.store.get_flight(id).await?;
        self.store.delete_flight(id).await?;
        info!(%id, "flight deleted");
        self.invalidate_flight(id, &flight.flight_number).await;
        Ok(())
    }

    /// Authoritative seat reservation. The conditional decrement in the
    /// store is the only oversell check that counts; on success the
    /// flight's cache entries are dropped so no reader sees the old
    /// count.
    pub async fn reserve_seats(&self, flight: &Flight, seats: i32) -> DomainResult<bool> {
        let reserved = self.store.try_decrease_seats(flight.id, seats).await?;
        if reserved {
            info!(flight_id = %flight.id, seats, "seats reserved");
            self.invalidate_flight(flight.id, &flight.flight_number).await;
        }
        Ok(reserved)
    }

    /// Returns seats to the pool (cancellation or compensation).
    pub async fn release_seats(&self, flight: &Flight, seats: i32) -> DomainResult<()> {
        self.store.increase_seats(flight.id, seats).await?;
        info!(flight_id = %flight.id, seats, "seats released");
        self.invalidate_flight(flight.id, &flight.flight_number).await;
        Ok(())
    }

    async fn invalidate_flight(&self, id: Uuid, flight_number: &str) {
        self.cache.delete(&keys::flight_by_id(id)).await;
        self.cache.delete(&keys::flight_by_number(flight_number)).await;
        self.cache.delete_prefix(keys::SEARCH_PREFIX).await;
    }
}
