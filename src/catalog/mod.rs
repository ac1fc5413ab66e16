//! Remote creature catalog: the trait seam plus the HTTP implementation.

mod error;
mod http;
mod models;
#[cfg(test)]
pub mod testing;

use std::collections::HashSet;

use futures::future::BoxFuture;
use rand::Rng;

use crate::state::creature::Creature;

pub use error::{CatalogError, CatalogResult};
pub use http::HttpCatalog;

/// Read-only access to a fixed-size catalog of creatures addressed by `[1, size]`.
pub trait CreatureCatalog: Send + Sync {
    /// Number of creatures in the catalog (`N`).
    fn size(&self) -> u32;
    /// Fetch and normalise a single creature.
    fn fetch(&self, id: u32) -> BoxFuture<'static, CatalogResult<Creature>>;
}

/// Identifiers already requested within one batch.
///
/// Threaded through [`fetch_one`] so a deal never requests the same creature twice.
#[derive(Debug, Default)]
pub struct Drawn {
    ids: HashSet<u32>,
}

impl Drawn {
    /// Number of identifiers drawn so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing has been drawn yet.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A request issued by [`fetch_one`] together with the identifier it targets.
pub struct PendingFetch {
    /// Identifier chosen for this request.
    pub id: u32,
    /// Settles with the normalised creature or the reason it could not be read.
    pub response: BoxFuture<'static, CatalogResult<Creature>>,
}

/// Pick a uniformly random identifier in `[1, size]` not yet in `drawn`, and request it.
///
/// Returns `None` once every identifier of the catalog has been drawn.
pub fn fetch_one<R>(
    catalog: &dyn CreatureCatalog,
    drawn: &mut Drawn,
    rng: &mut R,
) -> Option<PendingFetch>
where
    R: Rng + ?Sized,
{
    let size = catalog.size();
    if drawn.ids.len() >= size as usize {
        return None;
    }

    let id = loop {
        let candidate = rng.random_range(1..=size);
        if drawn.ids.insert(candidate) {
            break candidate;
        }
    };

    Some(PendingFetch {
        id,
        response: catalog.fetch(id),
    })
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::{testing::ScriptedCatalog, *};

    #[tokio::test]
    async fn fetch_one_stays_within_catalog_range() {
        let catalog = ScriptedCatalog::new(200);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut drawn = Drawn::default();
            let pending = fetch_one(&catalog, &mut drawn, &mut rng).unwrap();
            let creature = pending.response.await.unwrap();
            assert_eq!(creature.id, pending.id);
            assert!((1..=200).contains(&creature.id));
        }
    }

    #[test]
    fn fetch_one_never_repeats_within_a_batch() {
        let catalog = ScriptedCatalog::new(5);
        let mut rng = StdRng::seed_from_u64(7);
        let mut drawn = Drawn::default();

        let mut ids: Vec<u32> = std::iter::from_fn(|| fetch_one(&catalog, &mut drawn, &mut rng))
            .map(|pending| pending.id)
            .collect();
        ids.sort_unstable();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(drawn.len(), 5);
        assert_eq!(catalog.calls(), 5);
    }

    #[test]
    fn fetch_one_covers_the_catalog_uniformly() {
        const SIZE: u32 = 10;
        const TRIALS: usize = 50_000;
        let catalog = ScriptedCatalog::new(SIZE);
        let mut rng = StdRng::seed_from_u64(99);
        let mut hits = [0usize; SIZE as usize];

        for _ in 0..TRIALS {
            let pending = fetch_one(&catalog, &mut Drawn::default(), &mut rng).unwrap();
            hits[pending.id as usize - 1] += 1;
        }

        let expected = TRIALS as f64 / SIZE as f64;
        for count in hits {
            assert!((count as f64 - expected).abs() / expected < 0.05);
        }
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let catalog = ScriptedCatalog::new(0);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(fetch_one(&catalog, &mut Drawn::default(), &mut rng).is_none());
        assert_eq!(catalog.calls(), 0);
    }

    #[tokio::test]
    async fn fetch_one_reports_failure_as_error() {
        let catalog = ScriptedCatalog::new(1).failing([1]);
        let mut rng = StdRng::seed_from_u64(7);
        let pending = fetch_one(&catalog, &mut Drawn::default(), &mut rng).unwrap();
        let err = pending.response.await.unwrap_err();
        assert!(matches!(err, CatalogError::RequestStatus { .. }));
    }
}
