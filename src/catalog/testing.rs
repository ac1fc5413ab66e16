//! In-memory catalog used by unit tests.

use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;
use reqwest::StatusCode;

use crate::state::creature::{BaseStats, Creature};

use super::{CatalogError, CatalogResult, CreatureCatalog};

/// Build a deterministic creature fixture for `id`.
pub fn creature(id: u32) -> Creature {
    Creature {
        id,
        name: format!("Creature {id}"),
        image_url: format!("https://img.test/{id}.png"),
        types: vec!["normal".into()],
        height: 1.0,
        weight: 10.0,
        abilities: vec!["Run away".into()],
        stats: BaseStats {
            hp: id,
            ..BaseStats::default()
        },
        species_url: format!("https://catalog.test/species/{id}/"),
    }
}

/// Catalog that serves fixtures synchronously and fails for selected ids.
pub struct ScriptedCatalog {
    size: u32,
    failing: Mutex<HashSet<u32>>,
    fail_all: Mutex<bool>,
    calls: AtomicUsize,
}

impl ScriptedCatalog {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            failing: Mutex::new(HashSet::new()),
            fail_all: Mutex::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.failing.lock().unwrap().extend(ids);
        self
    }

    pub fn set_fail_all(&self, value: bool) {
        *self.fail_all.lock().unwrap() = value;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CreatureCatalog for ScriptedCatalog {
    fn size(&self) -> u32 {
        self.size
    }

    fn fetch(&self, id: u32) -> BoxFuture<'static, CatalogResult<Creature>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fails = *self.fail_all.lock().unwrap() || self.failing.lock().unwrap().contains(&id);
        Box::pin(async move {
            if fails {
                Err(CatalogError::RequestStatus {
                    url: format!("https://catalog.test/{id}"),
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                })
            } else {
                Ok(creature(id))
            }
        })
    }
}
