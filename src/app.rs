use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::JwtConfig;
use crate::authz::seed_roles;
use crate::errors::AppError;
use crate::routes::{auth, health, members, projects, tasks, workspaces};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: JwtConfig,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        Self { pool, jwt }
    }
}

/// Builds the router with the JWT settings taken from the environment.
pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    create_app_with(pool, jwt_config).await
}

/// Seeds the role catalog, then builds the router.
pub async fn create_app_with(pool: SqlitePool, jwt: JwtConfig) -> Result<Router, AppError> {
    let roles = seed_roles(&pool).await?;
    tracing::info!(count = roles.len(), "role catalog ready");

    let state = AppState::new(pool, jwt);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    // Path parameters keep one name per segment position across every
    // workspace-scoped route, otherwise the router rejects the overlap.
    let workspace_routes = Router::new()
        .route("/", post(workspaces::create_workspace).get(workspaces::list_workspaces))
        .route(
            "/:workspace_id",
            get(workspaces::get_workspace)
                .put(workspaces::update_workspace)
                .delete(workspaces::delete_workspace),
        )
        .route("/:workspace_id/members", get(workspaces::list_members))
        .route("/:workspace_id/members/role", put(workspaces::change_member_role))
        .route("/:workspace_id/analytics", get(workspaces::workspace_analytics))
        .route(
            "/:workspace_id/projects",
            post(projects::create_project).get(projects::list_projects),
        )
        .route(
            "/:workspace_id/projects/:project_id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/:workspace_id/projects/:project_id/analytics", get(projects::project_analytics))
        .route("/:workspace_id/projects/:project_id/tasks", post(tasks::create_task))
        .route(
            "/:workspace_id/projects/:project_id/tasks/:task_id",
            get(tasks::get_task).put(tasks::update_task),
        )
        .route("/:workspace_id/tasks", get(tasks::list_tasks))
        .route("/:workspace_id/tasks/:task_id", delete(tasks::delete_task));

    let router = Router::new()
        .route("/api/health", get(health::health))
        .route("/user/current", get(auth::current_user))
        .route("/members/join/:invite_code", post(members::join_workspace))
        .nest("/auth", auth_routes)
        .nest("/workspaces", workspace_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
