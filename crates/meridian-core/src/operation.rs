//! The create-project operation.

use crate::directory::UserDirectory;
use crate::identity::UserId;
use crate::project::{CreateProjectRequest, CreateProjectResponse, Project, ProjectId};

/// Creates a project owned by `caller`.
///
/// Returns [`CreateProjectResponse::UserNotFound`] when the directory does
/// not know the caller. Otherwise a fresh [`ProjectId`] is generated. Nothing
/// is persisted.
///
/// # Example
///
/// ```
/// use meridian_core::{
///     create_project, CreateProjectRequest, CreateProjectResponse, Shape, StaticUserDirectory,
/// };
/// use serde_json::json;
///
/// let caller = "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().unwrap();
/// let request = CreateProjectRequest::from_json(&json!({"name": "Demo"})).unwrap();
///
/// match create_project(&StaticUserDirectory::all(), caller, request) {
///     CreateProjectResponse::Created(project) => assert_eq!(project.name().as_str(), "Demo"),
///     CreateProjectResponse::UserNotFound(_) => unreachable!(),
/// }
/// ```
pub fn create_project(
    directory: &dyn UserDirectory,
    caller: UserId,
    request: CreateProjectRequest,
) -> CreateProjectResponse {
    if !directory.exists(&caller) {
        tracing::debug!(user_id = %caller, "caller not found in user directory");
        return CreateProjectResponse::UserNotFound(caller);
    }

    let project = Project::new(ProjectId::generate(), caller, request.into_name());
    tracing::debug!(project_id = %project.id(), user_id = %project.user_id(), "project created");
    CreateProjectResponse::Created(project)
}
