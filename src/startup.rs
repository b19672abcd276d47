use crate::auth::{self, AuthUser, TokenVerifier};
use crate::config::Config;
use crate::db::{SupabaseDb, WardrobeDb};
use crate::error::Error;
use crate::handlers::{
    add_closet_item_handler, classify_handler, delete_closet_item_handler, events_context_handler,
    get_preferences_handler, health_handler, list_closet_handler, list_inspo_handler,
    list_outfits_handler, list_packing_lists_handler, packing_list_handler, save_inspo_handler,
    set_preferences_handler, suggest_outfit_handler,
};
use crate::services::{CalendarClient, Stylist, VisionClassifier, WeatherClient};
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Shared state for the API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub db: Arc<dyn WardrobeDb>,
    pub weather: WeatherClient,
    pub stylist: Stylist,
    pub vision: VisionClassifier,
    /// Present only when the calendar service is enabled
    pub calendar: Option<CalendarClient>,
}

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the application state from config
pub async fn build_state(config: Arc<RwLock<Config>>) -> AppState {
    let config_read = config.read().await;

    let db: Arc<dyn WardrobeDb> = Arc::new(SupabaseDb::new(
        &config_read.supabase_url,
        &config_read.supabase_api_key,
    ));

    let weather = WeatherClient::new(&config_read.weather_api_key);
    let stylist = Stylist::new(&config_read.gemini_api_key, &config_read.gemini_model);
    let vision = VisionClassifier::new(&config_read.gemini_api_key, &config_read.gemini_model);

    let calendar = if config_read.is_service_enabled("calendar") {
        Some(CalendarClient::new(Arc::clone(&config)))
    } else {
        info!("Calendar service is disabled");
        None
    };

    drop(config_read);

    AppState {
        config,
        db,
        weather,
        stylist,
        vision,
        calendar,
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState, verifier: Arc<TokenVerifier>) -> Router {
    // Authentication middleware: everything except the health check
    // requires a valid provider JWT
    async fn auth_middleware(
        req: Request<Body>,
        next: Next,
        verifier: Arc<TokenVerifier>,
    ) -> Result<Response, Response> {
        if req.uri().path() == "/health" {
            return Ok(next.run(req).await);
        }

        let (parts, body) = req.into_parts();

        match auth::extract_token(&parts) {
            Ok(token) => match verifier.validate_token(&token) {
                Ok(claims) => {
                    let mut req = Request::from_parts(parts, body);
                    req.extensions_mut().insert(AuthUser {
                        user_id: claims.sub,
                    });
                    Ok(next.run(req).await)
                }
                Err(e) => Err(e.into_response()),
            },
            Err(e) => Err(e.into_response()),
        }
    }

    let auth_middleware = move |req: Request<Body>, next: Next| {
        auth_middleware(req, next, Arc::clone(&verifier))
    };

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/closet",
            get(list_closet_handler).post(add_closet_item_handler),
        )
        .route("/closet/{id}", delete(delete_closet_item_handler))
        .route("/closet/classify", post(classify_handler))
        .route("/events/context", get(events_context_handler))
        .route("/outfits", get(list_outfits_handler))
        .route("/outfits/suggest", post(suggest_outfit_handler))
        .route(
            "/packing-lists",
            get(list_packing_lists_handler).post(packing_list_handler),
        )
        .route("/inspo", get(list_inspo_handler).post(save_inspo_handler))
        .route(
            "/preferences",
            get(get_preferences_handler).put(set_preferences_handler),
        )
        .layer(axum::middleware::from_fn(auth_middleware))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB upload limit
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn run_server(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    let (port, jwt_secret) = {
        let config_read = config.read().await;
        (config_read.port, config_read.auth_jwt_secret.clone())
    };

    let state = build_state(config).await;
    let verifier = Arc::new(TokenVerifier::new(&jwt_secret));
    let app = build_router(state, verifier);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(Error::from)?;
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Other(format!("Server error: {}", e)))?;

    Ok(())
}
