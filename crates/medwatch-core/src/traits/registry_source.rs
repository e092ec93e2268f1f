// # Registry Source Trait
//
// Defines the interface for observing the upstream medical registry.
//
// ## Purpose
//
// The registry source produces the raw material of every run:
// - The full current doctor listing (one request per run)
// - The location list from a single doctor's detail page (on demand,
//   driven by the location cache)
//
// ## Implementations
//
// - APSS public registry scraper: `medwatch-source-apss` crate
// - Scripted mocks: contract tests within medwatch-core

use async_trait::async_trait;

use crate::model::Doctor;

/// Trait for registry source implementations
///
/// The two methods have deliberately different failure contracts:
///
/// - [`fetch_listing`](RegistrySource::fetch_listing) errors are **fatal**
///   to the run. A valid current listing is the precondition for every
///   diff; without one, nothing is classified and nothing is persisted.
/// - [`fetch_locations`](RegistrySource::fetch_locations) errors are
///   **degraded locally**. The location cache maps them to an empty list
///   for that one doctor and the run proceeds.
///
/// Implementations must be thread-safe and usable across async tasks. They
/// must not sleep, retry, or pace themselves: request pacing is owned by
/// the location cache.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Fetch the complete current doctor listing
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Doctor>)`: Every doctor currently in the listing, without
    ///   locations
    /// - `Err(Error)`: HTTP or structural failure; the run aborts
    async fn fetch_listing(&self) -> Result<Vec<Doctor>, crate::Error>;

    /// Fetch the location list from one doctor's detail page
    ///
    /// # Parameters
    ///
    /// - `doctor_id`: The registry code identifying the doctor
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<String>)`: Distinct location names in page order (may be
    ///   empty)
    /// - `Err(Error)`: Fetch or parse failure; the caller degrades to an
    ///   empty list
    async fn fetch_locations(&self, doctor_id: &str) -> Result<Vec<String>, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
