use std::iter;

use futures::future::join_all;
use rand::Rng;
use tracing::{debug, warn};

use crate::{
    catalog::{CreatureCatalog, Drawn, PendingFetch, fetch_one},
    state::creature::Creature,
};

/// Fetch `count` distinct random creatures concurrently.
///
/// Failed requests are logged and dropped; the result may therefore be shorter than
/// `count`, possibly empty. This never fails.
pub async fn fetch_many(catalog: &dyn CreatureCatalog, count: usize) -> Vec<Creature> {
    let requests = issue(catalog, count, &mut rand::rng());
    settle(requests).await
}

/// Issue up to `count` [`fetch_one`] requests with distinct identifiers.
pub fn issue<R>(catalog: &dyn CreatureCatalog, count: usize, rng: &mut R) -> Vec<PendingFetch>
where
    R: Rng + ?Sized,
{
    let mut drawn = Drawn::default();
    iter::from_fn(|| fetch_one(catalog, &mut drawn, rng))
        .take(count)
        .collect()
}

/// Wait for every request, keeping successes in request order.
pub async fn settle(requests: Vec<PendingFetch>) -> Vec<Creature> {
    let (ids, responses): (Vec<u32>, Vec<_>) = requests
        .into_iter()
        .map(|pending| (pending.id, pending.response))
        .unzip();
    let outcomes = join_all(responses).await;

    let creatures: Vec<Creature> = ids
        .iter()
        .zip(outcomes)
        .filter_map(|(id, outcome)| match outcome {
            Ok(creature) => Some(creature),
            Err(err) => {
                warn!(id, error = %err, "creature fetch failed; dropping from batch");
                None
            }
        })
        .collect();

    debug!(
        requested = ids.len(),
        received = creatures.len(),
        "creature batch settled"
    );
    creatures
}
