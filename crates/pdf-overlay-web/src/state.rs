use anyhow::Result;
use pdf_overlay_core::{AppConfig, OverlayService};

/// Global application state
pub struct AppState {
    pub service: OverlayService,
}

impl AppState {
    /// Build state backed by the HTTP fetcher described in `config`.
    pub fn new(config: AppConfig) -> Result<Self> {
        let service = OverlayService::new(config)
            .map_err(|e| anyhow::anyhow!("Failed to create overlay service: {e}"))?;
        Ok(Self::from_service(service))
    }

    pub const fn from_service(service: OverlayService) -> Self {
        Self { service }
    }

    /// Request body limit in bytes.
    pub const fn body_limit(&self) -> usize {
        self.service.config().server.body_limit_mb.saturating_mul(1024 * 1024)
    }
}
