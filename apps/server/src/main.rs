mod error;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use vidigest_core::{Pipeline, PipelineConfig, Provider};

/// Server configuration loaded from environment variables.
///
/// | Env Var            | Default   |
/// |--------------------|-----------|
/// | `HOST`             | `0.0.0.0` |
/// | `PORT`             | `3000`    |
/// | `CORS_ORIGINS`     | `*`       |
/// | `VIDIGEST_PROVIDER`| `groq`    |
struct ServerConfig {
    host: String,
    port: u16,
    cors_origins: Vec<String>,
    provider: Provider,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);
        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let provider = match std::env::var("VIDIGEST_PROVIDER").as_deref() {
            Ok("openai") => Provider::Openai,
            Ok("gemini") => Provider::Gemini,
            _ => Provider::Groq,
        };
        Self {
            host,
            port,
            cors_origins,
            provider,
        }
    }

    fn cors_layer(&self) -> CorsLayer {
        if self.cors_origins.iter().any(|o| o == "*") {
            return CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
        }
        let origins: Vec<HeaderValue> = self
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env();
    let pipeline = Pipeline::for_provider(config.provider.clone(), PipelineConfig::from_env())?;

    let app = routes::router(Arc::new(pipeline))
        .layer(config.cors_layer())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "vidigest server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
