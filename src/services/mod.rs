/// Concurrent retrieval of a batch of distinct creatures.
pub mod batch;
/// Board controller tying the state machine to fetching, timers and presentation.
pub mod controller;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Pair duplication and unbiased shuffling.
pub mod pairs;
/// Presentation callbacks and their SSE rendition.
pub mod presentation;
/// Session registry operations backing the HTTP routes.
pub mod session_service;
/// Server-Sent Events streaming.
pub mod sse_service;
