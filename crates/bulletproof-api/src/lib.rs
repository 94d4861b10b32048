//! HTTP API for teams, discussions and comments
//!
//! Public routes (health, teams, register/login/logout) are merged with the
//! session-protected routes; the OpenAPI document is served at
//! `/api/openapi.json` with Swagger UI at `/swagger-ui`.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use bulletproof_auth::SessionKeys;
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub sessions: SessionKeys,
    /// Mark the session cookie `Secure` (HTTPS deployments)
    pub secure_cookies: bool,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bulletproof API",
        version = "0.1.0",
        description = "REST API for team discussions with role and policy based access control"
    ),
    paths(
        handlers::system::health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::profile::get_profile,
        handlers::profile::update_profile,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::delete_user,
        handlers::teams::list_teams,
        handlers::discussions::list_discussions,
        handlers::discussions::create_discussion,
        handlers::discussions::get_discussion,
        handlers::discussions::update_discussion,
        handlers::discussions::delete_discussion,
        handlers::comments::list_comments,
        handlers::comments::create_comment,
        handlers::comments::delete_comment,
    ),
    components(
        schemas(
            bulletproof_auth::Role,
            bulletproof_auth::SessionUser,
            models::ErrorResponse,
            models::HealthResponse,
            models::SuccessResponse,
            models::RegisterRequest,
            models::LoginRequest,
            models::AuthResponse,
            models::User,
            models::UserList,
            models::UpdateProfileRequest,
            models::Team,
            models::TeamList,
            models::PageMeta,
            models::Discussion,
            models::DiscussionList,
            models::CreateDiscussionRequest,
            models::UpdateDiscussionRequest,
            models::Comment,
            models::CommentList,
            models::CreateCommentRequest,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and session endpoints"),
        (name = "profile", description = "The current user's own profile"),
        (name = "users", description = "Team member management"),
        (name = "teams", description = "Team listing"),
        (name = "discussions", description = "Team discussions"),
        (name = "comments", description = "Comments on discussions"),
        (name = "system", description = "System health and info endpoints")
    )
)]
pub struct ApiDoc;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for a front end served from another origin)
    pub enable_cors: bool,
    /// Allowed CORS origins (if None, local development origins)
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            enable_cors: false,
            cors_origins: None,
        }
    }
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(
        config: ApiServerConfig,
        db: DatabaseConnection,
        sessions: SessionKeys,
        secure_cookies: bool,
    ) -> Self {
        let state = Arc::new(AppState {
            db,
            sessions,
            secure_cookies,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        // No session required
        let public_router = Router::new()
            .route("/api/health", get(handlers::system::health_check))
            .route("/api/teams", get(handlers::teams::list_teams))
            .route("/api/auth/register", post(handlers::auth::register))
            .route("/api/auth/login", post(handlers::auth::login))
            .route("/api/auth/logout", post(handlers::auth::logout))
            .with_state(self.state.clone());

        // Session required; role and policy checks happen in the handlers
        let protected_router = Router::new()
            .route("/api/auth/me", get(handlers::auth::me))
            .route(
                "/api/profile",
                get(handlers::profile::get_profile).patch(handlers::profile::update_profile),
            )
            .route("/api/users", get(handlers::users::list_users))
            .route(
                "/api/users/{id}",
                get(handlers::users::get_user).delete(handlers::users::delete_user),
            )
            .route(
                "/api/discussions",
                get(handlers::discussions::list_discussions)
                    .post(handlers::discussions::create_discussion),
            )
            .route(
                "/api/discussions/{id}",
                get(handlers::discussions::get_discussion)
                    .patch(handlers::discussions::update_discussion)
                    .delete(handlers::discussions::delete_discussion),
            )
            .route(
                "/api/comments",
                get(handlers::comments::list_comments).post(handlers::comments::create_comment),
            )
            .route(
                "/api/comments/{id}",
                axum::routing::delete(handlers::comments::delete_comment),
            )
            .with_state(self.state.clone())
            .route_layer(axum_middleware::from_fn_with_state(
                self.state.clone(),
                middleware::require_session,
            ));

        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(public_router)
            .merge(protected_router);

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            router = router.layer(self.cors_layer());
        }

        router
    }

    /// Session cookies need credentials, which rules out a wildcard origin.
    fn cors_layer(&self) -> CorsLayer {
        let origins = match &self.config.cors_origins {
            Some(origins) => AllowOrigin::list(
                origins
                    .iter()
                    .filter_map(|origin| HeaderValue::from_str(origin).ok()),
            ),
            None => AllowOrigin::predicate(|origin: &HeaderValue, _| {
                let origin = origin.to_str().unwrap_or("");
                origin.starts_with("http://localhost:") || origin.starts_with("http://127.0.0.1:")
            }),
        };

        CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true)
            .allow_origin(origins)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        info!("API server stopped");
        Ok(())
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        self.start_with_shutdown(std::future::pending()).await
    }
}
