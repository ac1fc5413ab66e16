use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;

use crate::{config::CatalogConfig, state::creature::Creature};

use super::{
    CreatureCatalog,
    error::{CatalogError, CatalogResult},
    models::RawCreature,
};

/// Catalog client backed by a REST endpoint serving `{base_url}/{id}`.
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: Arc<str>,
    size: u32,
}

impl HttpCatalog {
    /// Build a client from the catalog section of the application configuration.
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|source| CatalogError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            size: config.size,
        })
    }

    async fn get_creature(&self, id: u32) -> CatalogResult<Creature> {
        if id == 0 || id > self.size {
            return Err(CatalogError::InvalidId {
                id,
                size: self.size,
            });
        }

        let url = format!("{}/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| CatalogError::RequestSend {
                url: url.clone(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => {
                let raw = response
                    .json::<RawCreature>()
                    .await
                    .map_err(|source| CatalogError::DecodeResponse {
                        url: url.clone(),
                        source,
                    })?;
                Creature::try_from(raw)
            }
            other => Err(CatalogError::RequestStatus { url, status: other }),
        }
    }
}

impl CreatureCatalog for HttpCatalog {
    fn size(&self) -> u32 {
        self.size
    }

    fn fetch(&self, id: u32) -> BoxFuture<'static, CatalogResult<Creature>> {
        let catalog = self.clone();
        Box::pin(async move { catalog.get_creature(id).await })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{StatusCode, header},
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    const SIZE: u32 = 10;

    fn payload(id: u32, with_artwork: bool) -> serde_json::Value {
        let sprites = if with_artwork {
            json!({
                "front_default": format!("https://img.test/sprite/{id}.png"),
                "other": { "official-artwork": { "front_default": format!("https://img.test/art/{id}.png") } }
            })
        } else {
            json!({ "front_default": null, "other": { "official-artwork": { "front_default": null } } })
        };
        json!({
            "id": id,
            "name": "mr-mime",
            "sprites": sprites,
            "types": [{ "slot": 1, "type": { "name": "psychic", "url": "" } }],
            "height": 13,
            "weight": 545,
            "abilities": [{ "ability": { "name": "soundproof", "url": "" } }],
            "stats": [{ "base_stat": 40, "stat": { "name": "hp" } }],
            "species": { "name": "mr-mime", "url": format!("https://catalog.test/species/{id}/") }
        })
    }

    async fn creature_route(Path(id): Path<u32>, State(hits): State<Arc<AtomicUsize>>) -> Response {
        hits.fetch_add(1, Ordering::SeqCst);
        match id {
            1 => Json(payload(1, true)).into_response(),
            2 => StatusCode::NOT_FOUND.into_response(),
            3 => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                "{ not json",
            )
                .into_response(),
            4 => Json(payload(4, false)).into_response(),
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    /// Serve a fake catalog on an ephemeral port and return a client pointed at it.
    async fn catalog() -> (HttpCatalog, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/pokemon/{id}", get(creature_route))
            .with_state(hits.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (client_for(addr), hits)
    }

    fn client_for(addr: SocketAddr) -> HttpCatalog {
        HttpCatalog::new(&CatalogConfig {
            base_url: format!("http://{addr}/pokemon/"),
            size: SIZE,
            request_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn success_is_normalised() {
        let (catalog, hits) = catalog().await;
        let creature = catalog.fetch(1).await.unwrap();

        assert_eq!(creature.id, 1);
        assert_eq!(creature.name, "Mr mime");
        assert_eq!(creature.image_url, "https://img.test/art/1.png");
        assert_eq!(creature.height, 1.3);
        assert_eq!(creature.weight, 54.5);
        assert_eq!(creature.stats.hp, 40);
        assert_eq!(creature.stats.attack, 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_success_status_fails_the_call() {
        let (catalog, _) = catalog().await;
        let err = catalog.fetch(2).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::RequestStatus { status, ref url } if status == StatusCode::NOT_FOUND && url.ends_with("/pokemon/2")
        ));
    }

    #[tokio::test]
    async fn malformed_body_fails_the_call() {
        let (catalog, _) = catalog().await;
        let err = catalog.fetch(3).await.unwrap_err();
        assert!(matches!(err, CatalogError::DecodeResponse { .. }));
    }

    #[tokio::test]
    async fn payload_without_any_image_is_rejected() {
        let (catalog, _) = catalog().await;
        let err = catalog.fetch(4).await.unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { id: 4, .. }));
    }

    #[tokio::test]
    async fn out_of_range_ids_never_reach_the_network() {
        let (catalog, hits) = catalog().await;
        for id in [0, SIZE + 1] {
            let err = catalog.fetch(id).await.unwrap_err();
            assert!(matches!(err, CatalogError::InvalidId { size: SIZE, .. }));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_the_next_call() {
        let (catalog, hits) = catalog().await;
        assert!(catalog.fetch(2).await.is_err());
        assert!(catalog.fetch(1).await.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unreachable_catalog_reports_send_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(addr).fetch(1).await.unwrap_err();
        assert!(matches!(err, CatalogError::RequestSend { .. }));
    }
}
