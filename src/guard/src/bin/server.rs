//! # Guard Demo Server
//!
//! Small HTTP service showing per-request authorization with the guard.
//!
//! ## Endpoints
//!
//! - `GET /posts` - Posts visible to the caller (filter handler)
//! - `GET /posts/:id` - A single post (authorization handler)
//! - `GET /health` - Health check
//!
//! The caller is taken from the `X-User` header; without it the request is
//! anonymous.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT` - HTTP server port (default: 8080)
//! - `RUST_LOG` - Log level (default: info)
//! - `GUARD_POLICY_SUFFIX` / `GUARD_ACTION_MARKER` - naming conventions

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    serve, Router,
};
use cretoai_guard::{
    http::ErrorResponse, Action, Authorizable, Authorization, Authorizer, AuthzError, Filter,
    GuardConfig, Model, Policy, PolicyRegistry, RequestContext, Target,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{debug, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Role = Option<String>;

#[derive(Debug, Clone, Serialize)]
struct Post {
    id: u64,
    author: String,
    title: String,
    published: bool,
}

impl Model for Post {
    const TYPE_NAME: &'static str = "Post";
}

impl Authorizable for Post {
    fn target(&self) -> Target<'_> {
        Target::instance(Self::TYPE_NAME)
    }
}

fn visible_to(post: &Post, user: &Role) -> bool {
    post.published || user.as_deref() == Some(post.author.as_str())
}

struct PostFilter {
    user: Role,
    posts: Vec<Post>,
}

impl PostFilter {
    fn index(&self) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|post| visible_to(post, &self.user))
            .cloned()
            .collect()
    }
}

impl Filter for PostFilter {
    type Role = Role;
    type Scope = Vec<Post>;

    fn new(user: Role, posts: &Vec<Post>) -> Self {
        Self {
            user,
            posts: posts.clone(),
        }
    }

    fn actions() -> Vec<Action<Self, Vec<Post>>> {
        vec![Action::new("index", Self::index)]
    }
}

struct PostAuthorization {
    visible: bool,
    owner: bool,
}

impl PostAuthorization {
    fn show(&self) -> bool {
        self.visible
    }

    fn update(&self) -> bool {
        self.owner
    }
}

impl Authorization for PostAuthorization {
    type Role = Role;
    type Resource = Post;

    fn new(user: Role, post: &Post) -> Self {
        Self {
            visible: visible_to(post, &user),
            owner: user.as_deref() == Some(post.author.as_str()),
        }
    }

    fn actions() -> Vec<Action<Self, bool>> {
        vec![
            Action::new("show?", Self::show),
            Action::new("update?", Self::update),
        ]
    }
}

/// Caller and action of one HTTP request
#[derive(Debug)]
struct HttpContext {
    user: Role,
    action: &'static str,
}

impl HttpContext {
    fn from_headers(headers: &HeaderMap, action: &'static str) -> Self {
        let user = headers.get("x-user").and_then(|value| match value.to_str() {
            Ok(user) => Some(user.to_string()),
            Err(e) => {
                debug!("Unreadable X-User header, treating caller as anonymous: {}", e);
                None
            }
        });
        Self { user, action }
    }
}

impl RequestContext for HttpContext {
    type Role = Role;

    fn current_role(&self) -> Role {
        self.user.clone()
    }

    fn action_name(&self) -> &str {
        self.action
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    registry: Arc<PolicyRegistry<Role>>,
    posts: Arc<Vec<Post>>,
    start_time: std::time::Instant,
}

impl AppState {
    fn authorizer(&self, headers: &HeaderMap, action: &'static str) -> Authorizer<HttpContext> {
        Authorizer::new(
            self.registry.clone(),
            HttpContext::from_headers(headers, action),
        )
    }
}

/// Application error type
#[derive(Debug)]
enum AppError {
    Authz(AuthzError),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Authz(err) => err.into_response(),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "not_found",
                    message,
                }),
            )
                .into_response(),
        }
    }
}

impl From<AuthzError> for AppError {
    fn from(err: AuthzError) -> Self {
        AppError::Authz(err)
    }
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    version: String,
}

/// GET /posts
async fn list_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Post>>, AppError> {
    let mut authorizer = state.authorizer(&headers, "index");

    let posts = authorizer.policy_filter(state.posts.as_ref())?;

    authorizer.verify_applied()?;
    Ok(Json(posts))
}

/// GET /posts/:id
async fn show_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Post>, AppError> {
    let mut authorizer = state.authorizer(&headers, "show");

    let Some(post) = state.posts.iter().find(|post| post.id == id) else {
        // nothing to authorize against
        authorizer.skip_verify();
        return Err(AppError::NotFound(format!("post {} not found", id)));
    };
    let post = authorizer.authorize(post)?.clone();

    authorizer.verify_applied()?;
    Ok(Json(post))
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: cretoai_guard::VERSION.to_string(),
    })
}

fn build_registry(config: GuardConfig) -> Result<PolicyRegistry<Role>, AuthzError> {
    let mut registry = PolicyRegistry::with_config(config);
    let policy_name = registry.config().policy_name_for(Post::TYPE_NAME);
    registry.register_type(Post::TYPE_NAME)?;
    registry.register_policy(
        Policy::new(policy_name)
            .filter::<PostFilter>()
            .authorization::<PostAuthorization>(),
    )?;
    Ok(registry)
}

fn seed_posts() -> Vec<Post> {
    vec![
        Post {
            id: 1,
            author: "alice".to_string(),
            title: "Release notes".to_string(),
            published: true,
        },
        Post {
            id: 2,
            author: "alice".to_string(),
            title: "Draft roadmap".to_string(),
            published: false,
        },
        Post {
            id: 3,
            author: "bob".to_string(),
            title: "Incident review".to_string(),
            published: false,
        },
    ]
}

/// Create the HTTP router with all endpoints
fn create_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(show_post))
        .route("/health", get(health_check))
        .layer(trace)
        .with_state(state)
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CretoAI Guard demo server v{}", cretoai_guard::VERSION);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let config = GuardConfig::from_env()?;
    info!("Configuration:");
    info!("  Port: {}", port);
    info!("  Policy suffix: {}", config.policy_suffix);
    info!("  Action marker: {}", config.action_marker);

    let state = AppState {
        registry: Arc::new(build_registry(config)?),
        posts: Arc::new(seed_posts()),
        start_time: std::time::Instant::now(),
    };

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Starting HTTP server on {}", addr);
    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}
