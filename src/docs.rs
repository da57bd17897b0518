use std::sync::Arc;

use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::server::Server;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{authz, models, routes};

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::auth::register,
		routes::auth::login,
		routes::auth::logout,
		routes::auth::current_user,
		routes::health::health,
		routes::members::join_workspace,
		routes::workspaces::create_workspace,
		routes::workspaces::list_workspaces,
		routes::workspaces::get_workspace,
		routes::workspaces::update_workspace,
		routes::workspaces::delete_workspace,
		routes::workspaces::list_members,
		routes::workspaces::workspace_analytics,
		routes::workspaces::change_member_role,
		routes::projects::create_project,
		routes::projects::list_projects,
		routes::projects::get_project,
		routes::projects::update_project,
		routes::projects::delete_project,
		routes::projects::project_analytics,
		routes::tasks::create_task,
		routes::tasks::list_tasks,
		routes::tasks::get_task,
		routes::tasks::update_task,
		routes::tasks::delete_task
	),
	components(
		schemas(
			authz::RoleName,
			authz::Permission,
			models::user::User,
			models::user::UserSummary,
			models::user::AuthResponse,
			models::user::LoginRequest,
			models::user::RegisterRequest,
			models::account::Provider,
			models::role::Role,
			models::role::RoleSummary,
			models::workspace::Workspace,
			models::workspace::WorkspaceDetail,
			models::workspace::WorkspaceMembers,
			models::workspace::WorkspaceCreateRequest,
			models::workspace::WorkspaceUpdateRequest,
			models::workspace::WorkspaceDeleted,
			models::workspace::ChangeRoleRequest,
			models::workspace::TaskAnalytics,
			models::membership::Membership,
			models::membership::MemberDetail,
			models::membership::MemberUser,
			models::membership::JoinWorkspaceResponse,
			models::pagination::Pagination,
			models::project::Project,
			models::project::ProjectListItem,
			models::project::ProjectPage,
			models::project::ProjectSummary,
			models::project::ProjectCreateRequest,
			models::project::ProjectUpdateRequest,
			models::task::Task,
			models::task::TaskPriority,
			models::task::TaskStatus,
			models::task::TaskListItem,
			models::task::TaskPage,
			models::task::TaskCreateRequest,
			models::task::TaskUpdateRequest,
			routes::auth::MessageResponse,
			routes::health::HealthResponse,
			routes::projects::ProjectDeleted
		)
	),
	modifiers(&BearerAuth),
	tags(
		(name = "Auth", description = "Registration, login and the current user"),
		(name = "Workspaces", description = "Workspace lifecycle, members and roles"),
		(name = "Members", description = "Joining workspaces by invite code"),
		(name = "Projects", description = "Projects inside a workspace"),
		(name = "Tasks", description = "Tasks inside a project"),
		(name = "Health", description = "Liveness")
	)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
	fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
		let components = openapi.components.get_or_insert_with(Default::default);
		components.add_security_scheme(
			"bearerAuth",
			SecurityScheme::Http(
				HttpBuilder::new()
					.scheme(HttpAuthScheme::Bearer)
					.bearer_format("JWT")
					.build(),
			),
		);
	}
}

/// The OpenAPI document with a local server entry for `port`.
pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = ApiDoc::openapi();
	doc.servers = Some(vec![Server::new(format!("http://localhost:{port}"))]);
	Ok(doc)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> Router {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc = Arc::new(doc);
	let json_route = get(move || {
		let doc = Arc::clone(&doc);
		async move { Json((*doc).clone()) }
	});

	Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_workspace_route_is_documented() {
		let doc = build_openapi(8000).unwrap();
		let paths = &doc.paths.paths;

		for path in [
			"/workspaces/{workspace_id}",
			"/workspaces/{workspace_id}/members/role",
			"/workspaces/{workspace_id}/projects/{project_id}/tasks/{task_id}",
			"/members/join/{invite_code}",
		] {
			assert!(paths.contains_key(path), "missing {path}");
		}

		let schemes = &doc.components.as_ref().unwrap().security_schemes;
		assert!(schemes.contains_key("bearerAuth"));
	}
}
