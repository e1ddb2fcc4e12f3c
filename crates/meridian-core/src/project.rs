//! Project domain values.

use crate::identity::UserId;
use crate::shape::{Schema, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when constructing a [`ProjectName`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectNameError {
    /// Nothing was left after trimming.
    #[error("project name must not be empty")]
    Empty,
}

/// A project name: trimmed, never empty.
///
/// # Example
///
/// ```
/// use meridian_core::ProjectName;
///
/// let name = ProjectName::parse("  Roadmap  ").unwrap();
/// assert_eq!(name.as_str(), "Roadmap");
/// assert!(ProjectName::parse(" \t").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectName(String);

impl ProjectName {
    /// Trims the input and rejects empty results.
    pub fn parse(raw: &str) -> Result<Self, ProjectNameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProjectNameError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectName {
    type Error = ProjectNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProjectName> for String {
    fn from(name: ProjectName) -> Self {
        name.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a project, in UUID form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Generates a fresh random identifier (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A created project.
///
/// Only the create-project operation builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    id: ProjectId,
    user_id: UserId,
    name: ProjectName,
}

impl Project {
    pub(crate) fn new(id: ProjectId, user_id: UserId, name: ProjectName) -> Self {
        Self { id, user_id, name }
    }

    /// The project's identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// The owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The project's name.
    #[must_use]
    pub fn name(&self) -> &ProjectName {
        &self.name
    }
}

/// Input of the create-project operation.
///
/// There is no public constructor. Values come from [`Shape::from_json`],
/// i.e. from a request body that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateProjectRequest {
    name: ProjectName,
}

impl CreateProjectRequest {
    /// The requested project name.
    #[must_use]
    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Consumes the request, returning the name.
    #[must_use]
    pub fn into_name(self) -> ProjectName {
        self.name
    }
}

impl Shape for CreateProjectRequest {
    fn schema() -> Schema {
        Schema::object(vec![(
            "name",
            Schema::string().trim().min_length(1).required(),
        )])
    }
}

/// Outcome of the create-project operation.
///
/// Exactly one variant per call. Neither is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateProjectResponse {
    /// The project was created.
    Created(Project),
    /// The caller is not a known user.
    UserNotFound(UserId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_project_name_trims() {
        assert_eq!(ProjectName::parse("\tDemo \n").unwrap().as_str(), "Demo");
    }

    #[test]
    fn test_project_name_rejects_empty() {
        assert_eq!(ProjectName::parse(""), Err(ProjectNameError::Empty));
        assert_eq!(ProjectName::parse("   "), Err(ProjectNameError::Empty));
    }

    #[test]
    fn test_project_name_deserialize_enforces_invariant() {
        assert!(serde_json::from_value::<ProjectName>(json!(" ")).is_err());
        let name: ProjectName = serde_json::from_value(json!(" x ")).unwrap();
        assert_eq!(name.as_str(), "x");
    }

    #[test]
    fn test_project_serializes_camel_case() {
        let user: UserId = "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().unwrap();
        let id = ProjectId::generate();
        let project = Project::new(id, user, ProjectName::parse("Demo").unwrap());

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(
            json,
            json!({
                "id": id.to_string(),
                "userId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "name": "Demo"
            })
        );
    }

    #[test]
    fn test_request_from_valid_body() {
        let request = CreateProjectRequest::from_json(&json!({"name": "  Demo "})).unwrap();
        assert_eq!(request.name().as_str(), "Demo");
    }

    #[test]
    fn test_request_ignores_unknown_fields() {
        let request =
            CreateProjectRequest::from_json(&json!({"name": "Demo", "color": "red"})).unwrap();
        assert_eq!(request.into_name().as_str(), "Demo");
    }

    #[test]
    fn test_request_rejects_bad_bodies() {
        for body in [
            json!({}),
            json!({"name": ""}),
            json!({"name": null}),
            json!({"name": 42}),
            json!({"name": ["Demo"]}),
        ] {
            let failure = CreateProjectRequest::from_json(&body).unwrap_err();
            assert!(failure.mentions("name"), "{body} should mention name");
        }
    }

    #[test]
    fn test_request_rejects_non_object() {
        let failure = CreateProjectRequest::from_json(&json!("Demo")).unwrap_err();
        assert_eq!(failure.issues[0].path, "$");
    }

    #[test]
    fn test_project_id_parse() {
        let id = ProjectId::generate();
        let parsed: ProjectId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("nope".parse::<ProjectId>().is_err());
    }

    proptest! {
        #[test]
        fn whitespace_only_names_are_rejected(ws in "[ \t\r\n]{0,16}") {
            prop_assert!(ProjectName::parse(&ws).is_err());
            let failure = CreateProjectRequest::from_json(&json!({ "name": ws })).unwrap_err();
            prop_assert!(failure.mentions("name"));
        }

        #[test]
        fn names_survive_trimmed(core in "[A-Za-z0-9][A-Za-z0-9 _-]{0,30}[A-Za-z0-9]", pad in "[ \t]{0,4}") {
            let raw = format!("{pad}{core}{pad}");
            let request = CreateProjectRequest::from_json(&json!({ "name": raw })).unwrap();
            prop_assert_eq!(request.name().as_str(), core.as_str());
        }
    }
}
