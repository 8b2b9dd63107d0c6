use std::sync::Arc;

use colca_flux::api::FluxApi;
use colca_flux::cache::ReadyCache;
use colca_flux::relay::PollRelay;
use colca_gemini::api::GeminiApi;
use colca_gemini::generator::DirectGenerator;
use colca_storage::relay::UploadRelay;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Flux job creation.
    pub flux: FluxApi,
    /// Single-step Flux status relay.
    pub polls: Arc<PollRelay>,
    /// Gemini variant and composite generation.
    pub generator: DirectGenerator,
    /// Sequential uploads to the storage endpoint.
    pub uploads: UploadRelay,
}

impl AppState {
    /// Build every upstream client from `config`.
    pub fn new(config: ServerConfig) -> Self {
        let flux = FluxApi::new(config.flux());
        let polls = if config.ready_cache_capacity > 0 {
            PollRelay::with_cache(
                flux.clone(),
                Arc::new(ReadyCache::new(config.ready_cache_capacity)),
            )
        } else {
            PollRelay::new(flux.clone())
        };

        let gemini = Arc::new(GeminiApi::new(config.gemini()));
        let generator = DirectGenerator::new(gemini.clone(), gemini);

        let uploads = UploadRelay::from_endpoint(config.upload_endpoint.as_deref());

        Self {
            config: Arc::new(config),
            flux,
            polls: Arc::new(polls),
            generator,
            uploads,
        }
    }
}
