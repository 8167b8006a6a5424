//! Cached, coalescing loader for unit phrase lists.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared, try_join_all};
use phrase_core::model::{PhraseRecord, UnitCatalog, UnitFile, UnitId, UnitSelector};
use thiserror::Error;
use tracing::{debug, warn};

use crate::fetcher::{FetchError, UnitFetcher};
use crate::unit_csv::{ParseError, parse_unit_csv};

/// Read-only phrase list for one unit (or the concatenation for `All`).
pub type UnitPhrases = Arc<[Arc<PhraseRecord>]>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadCause {
    #[error("unit is not in the catalog")]
    UnknownUnit,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A unit could not be loaded. Failures are never cached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to load unit {unit}: {cause}")]
pub struct LoadFailure {
    pub unit: UnitId,
    pub cause: LoadCause,
}

type LoadFuture = Shared<BoxFuture<'static, Result<UnitPhrases, LoadFailure>>>;

enum Slot {
    Loaded(UnitPhrases),
    Loading { ticket: u64, future: LoadFuture },
}

#[derive(Default)]
struct Slots {
    units: HashMap<UnitId, Slot>,
    next_ticket: u64,
}

/// Loads unit phrase lists on demand.
///
/// Successful loads are cached for the lifetime of the source and returned
/// by the same `Arc`. Concurrent requests for a unit that is already in
/// flight await that one fetch instead of issuing another.
#[derive(Clone)]
pub struct PhraseSource {
    catalog: Arc<UnitCatalog>,
    fetcher: Arc<dyn UnitFetcher>,
    slots: Arc<Mutex<Slots>>,
}

impl PhraseSource {
    #[must_use]
    pub fn new(catalog: UnitCatalog, fetcher: Arc<dyn UnitFetcher>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            fetcher,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// The static catalog in ascending order. Never touches the fetcher.
    #[must_use]
    pub fn list_unit_ids(&self) -> Vec<UnitId> {
        self.catalog.unit_ids()
    }

    /// Whether a fetch for `unit` is currently in flight.
    #[must_use]
    pub fn is_loading(&self, unit: UnitId) -> bool {
        matches!(self.lock().units.get(&unit), Some(Slot::Loading { .. }))
    }

    /// The cached phrases for `unit`, if it has been loaded.
    #[must_use]
    pub fn cached(&self, unit: UnitId) -> Option<UnitPhrases> {
        match self.lock().units.get(&unit) {
            Some(Slot::Loaded(phrases)) => Some(Arc::clone(phrases)),
            _ => None,
        }
    }

    /// Load the phrases of a single unit.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailure` if the unit is unknown, or its file cannot be
    /// fetched or parsed. Every caller coalesced onto the same fetch receives
    /// the same failure, and the next call retries.
    pub async fn load_unit(&self, unit: UnitId) -> Result<UnitPhrases, LoadFailure> {
        let (ticket, future) = {
            let mut slots = self.lock();
            match slots.units.get(&unit) {
                Some(Slot::Loaded(phrases)) => {
                    debug!(%unit, "unit cache hit");
                    return Ok(Arc::clone(phrases));
                }
                Some(Slot::Loading { ticket, future }) => {
                    debug!(%unit, "joining in-flight unit load");
                    (*ticket, future.clone())
                }
                None => {
                    let file = self.catalog.file(unit).cloned().ok_or(LoadFailure {
                        unit,
                        cause: LoadCause::UnknownUnit,
                    })?;
                    debug!(%unit, path = %file.path, "fetching unit");
                    let future = fetch_unit(Arc::clone(&self.fetcher), file)
                        .boxed()
                        .shared();
                    let ticket = slots.next_ticket;
                    slots.next_ticket += 1;
                    slots.units.insert(
                        unit,
                        Slot::Loading {
                            ticket,
                            future: future.clone(),
                        },
                    );
                    (ticket, future)
                }
            }
        };

        let result = future.await;
        self.settle(unit, ticket, &result);
        result
    }

    /// Load every phrase a selector covers.
    ///
    /// `All` loads the catalog units concurrently and concatenates them in
    /// catalog order, regardless of which load finishes first.
    ///
    /// # Errors
    ///
    /// Returns the first `LoadFailure` among the requested units.
    pub async fn load_selector(&self, selector: UnitSelector) -> Result<UnitPhrases, LoadFailure> {
        match selector {
            UnitSelector::Unit(unit) => self.load_unit(unit).await,
            UnitSelector::All => {
                let units = self.catalog.unit_ids();
                let lists = try_join_all(units.into_iter().map(|unit| self.load_unit(unit))).await?;
                Ok(lists
                    .iter()
                    .flat_map(|phrases| phrases.iter().cloned())
                    .collect())
            }
        }
    }

    /// Record the outcome of the fetch identified by `ticket`. A slot that was
    /// replaced by a newer fetch in the meantime is left alone.
    fn settle(&self, unit: UnitId, ticket: u64, result: &Result<UnitPhrases, LoadFailure>) {
        let mut slots = self.lock();
        let current = matches!(
            slots.units.get(&unit),
            Some(Slot::Loading { ticket: live, .. }) if *live == ticket
        );
        if !current {
            return;
        }
        match result {
            Ok(phrases) => {
                debug!(%unit, phrases = phrases.len(), "unit loaded");
                slots.units.insert(unit, Slot::Loaded(Arc::clone(phrases)));
            }
            Err(failure) => {
                warn!(%unit, error = %failure.cause, "unit load failed");
                slots.units.remove(&unit);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn fetch_unit(
    fetcher: Arc<dyn UnitFetcher>,
    file: UnitFile,
) -> Result<UnitPhrases, LoadFailure> {
    let unit = file.unit;
    let text = fetcher
        .fetch(&file)
        .await
        .map_err(|err| LoadFailure {
            unit,
            cause: err.into(),
        })?;
    let phrases = parse_unit_csv(unit, &text).map_err(|err| LoadFailure {
        unit,
        cause: err.into(),
    })?;
    Ok(phrases.into_iter().map(Arc::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::InMemoryFetcher;
    use std::time::Duration;

    fn unit(n: u32) -> UnitId {
        UnitId::new(n).unwrap()
    }

    fn source_with(fetcher: &InMemoryFetcher, count: u32) -> PhraseSource {
        PhraseSource::new(UnitCatalog::numbered(count), Arc::new(fetcher.clone()))
    }

    #[tokio::test]
    async fn caches_successful_loads() {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert("unit1.csv", "No,EN,JA\n1,Hello,こんにちは\n");
        let source = source_with(&fetcher, 1);

        let first = source.load_unit(unit(1)).await.unwrap();
        let second = source.load_unit(unit(1)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.fetch_count(), 1);
        assert!(source.cached(unit(1)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_concurrent_requests() {
        let fetcher = InMemoryFetcher::new().with_latency(Duration::from_millis(50));
        fetcher.insert("unit2.csv", "No,EN,JA\n1,Yes,はい\n");
        let source = source_with(&fetcher, 2);

        let (a, b) = tokio::join!(source.load_unit(unit(2)), source.load_unit(unit(2)));

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(fetcher.fetch_count(), 1);
        assert!(!source.is_loading(unit(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_reach_every_waiter_and_are_retried() {
        let fetcher = InMemoryFetcher::new().with_latency(Duration::from_millis(10));
        let source = source_with(&fetcher, 1);

        let (a, b) = tokio::join!(source.load_unit(unit(1)), source.load_unit(unit(1)));
        let a = a.unwrap_err();
        assert_eq!(a, b.unwrap_err());
        assert!(matches!(a.cause, LoadCause::Fetch(FetchError::NotFound(_))));
        assert_eq!(fetcher.fetch_count(), 1);
        assert!(source.cached(unit(1)).is_none());

        fetcher.insert("unit1.csv", "No,EN,JA\n1,Hello,こんにちは\n");
        let phrases = source.load_unit(unit(1)).await.unwrap();
        assert_eq!(phrases.len(), 1);
        assert_eq!(fetcher.fetch_count(), 2);
    }

    #[tokio::test]
    async fn unknown_unit_fails_without_fetching() {
        let fetcher = InMemoryFetcher::new();
        let source = source_with(&fetcher, 3);
        let err = source.load_unit(unit(9)).await.unwrap_err();
        assert_eq!(err.cause, LoadCause::UnknownUnit);
        assert_eq!(fetcher.fetch_count(), 0);
    }

    #[tokio::test]
    async fn parse_failures_are_reported() {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert("unit1.csv", "No,Text\n1,Hello\n");
        let source = source_with(&fetcher, 1);
        let err = source.load_unit(unit(1)).await.unwrap_err();
        assert!(matches!(err.cause, LoadCause::Parse(ParseError::MissingColumn("EN"))));
    }

    #[tokio::test]
    async fn all_concatenates_in_catalog_order() {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert("unit1.csv", "No,EN,JA\n1,One,いち\n");
        fetcher.insert("unit2.csv", "No,EN,JA\n1,Two,に\n2,Three,さん\n");
        let source = source_with(&fetcher, 2);

        // Warm unit 2 first so completion order differs from catalog order.
        source.load_unit(unit(2)).await.unwrap();
        let all = source.load_selector(UnitSelector::All).await.unwrap();

        let answers: Vec<&str> = all.iter().map(|p| p.answer_text()).collect();
        assert_eq!(answers, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn lists_catalog_without_loading() {
        let fetcher = InMemoryFetcher::new();
        let source = source_with(&fetcher, 4);
        assert_eq!(source.list_unit_ids(), vec![unit(1), unit(2), unit(3), unit(4)]);
        assert_eq!(fetcher.fetch_count(), 0);
    }
}
