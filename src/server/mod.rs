pub mod twilio;

use crate::config::SessionConfig;
use crate::error::{AgriWeatherError, Result};
use crate::logic::ConversationEngine;
use axum::extract::{Form, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use twilio::{twiml_message, TwilioMessage};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn webhook(
    State(state): State<AppState>,
    Form(message): Form<TwilioMessage>,
) -> impl IntoResponse {
    let event = message.into_event();
    tracing::debug!(
        sender = %event.sender_id,
        text = %event.text,
        location = ?event.location,
        "Inbound message"
    );

    let reply = state.engine.handle(&event).await;

    (
        [(header::CONTENT_TYPE, "application/xml")],
        twiml_message(&reply),
    )
}

async fn health() -> &'static str {
    "ok"
}

/// Run the webhook server until Ctrl-C, sweeping idle sessions in the background.
pub async fn serve(
    bind: &str,
    max_body_bytes: usize,
    sessions: &SessionConfig,
    engine: Arc<ConversationEngine>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AgriWeatherError::Server(format!("Failed to bind {}: {}", bind, e)))?;

    let sweeper = spawn_session_sweeper(sessions, &engine);

    tracing::info!("Listening for webhook messages on {}", bind);
    let app = router(AppState { engine }, max_body_bytes);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.abort();
    result.map_err(|e| AgriWeatherError::Server(e.to_string()))
}

fn spawn_session_sweeper(
    config: &SessionConfig,
    engine: &ConversationEngine,
) -> tokio::task::JoinHandle<()> {
    let sessions = Arc::clone(engine.sessions());
    let max_idle = chrono::Duration::minutes(config.idle_timeout_minutes as i64);
    let period = Duration::from_secs(config.sweep_interval_secs.max(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = sessions.prune(max_idle).await;
            if removed > 0 {
                tracing::info!("Expired {} idle sessions", removed);
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::{ForecastError, ForecastProvider, GeocodeError, ReverseGeocoder};
    use crate::logic::RuleTable;
    use crate::models::{Coordinates, Forecast, Place};
    use crate::store::InMemorySessionStore;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct StaticGeocoder;

    #[async_trait]
    impl ReverseGeocoder for StaticGeocoder {
        async fn reverse_geocode(
            &self,
            _coords: Coordinates,
        ) -> std::result::Result<Place, GeocodeError> {
            Ok(Place {
                city: "Ludhiana".into(),
                state: "Punjab".into(),
                country: "India".into(),
            })
        }
    }

    struct StaticForecast;

    #[async_trait]
    impl ForecastProvider for StaticForecast {
        async fn fetch_forecast(
            &self,
            _city: &str,
        ) -> std::result::Result<Forecast, ForecastError> {
            Ok(Forecast::new(18.0, 10.0, "clear sky"))
        }
    }

    fn app() -> Router {
        let rules = RuleTable::from_json(
            r#"{"wheat": {"sowing": {"temp_min": 10, "temp_max": 25, "rain_min": 0, "rain_max": 50}}}"#,
        )
        .unwrap();
        let engine = ConversationEngine::new(
            Arc::new(rules),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(StaticGeocoder),
            Arc::new(StaticForecast),
        );
        router(
            AppState {
                engine: Arc::new(engine),
            },
            64 * 1024,
        )
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn webhook_replies_with_twiml() {
        let response = app()
            .oneshot(form_request("From=whatsapp%3A%2B15550001&Body=Hi"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/xml"
        );
        let body = body_text(response).await;
        assert!(body.starts_with("<?xml"));
        assert!(body.contains("<Response><Message>👋 Welcome!"));
    }

    #[tokio::test]
    async fn webhook_runs_full_conversation() {
        let app = app();
        let sender = "From=whatsapp%3A%2B15550002";

        for body in ["Body=hi", "Body=wheat%2C+s"] {
            let response = app
                .clone()
                .oneshot(form_request(&format!("{}&{}", sender, body)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(form_request(&format!(
                "{}&Body=&Latitude=30.90&Longitude=75.85",
                sender
            )))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.contains("Ludhiana, Punjab"));
        assert!(body.contains("Wheat (Sowing Stage)"));
    }
}
