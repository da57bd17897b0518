use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::pagination::{PageRequest, Pagination};
use crate::models::project::ProjectSummary;
use crate::models::user::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl FromStr for TaskPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            other => Err(AppError::validation(format!("unknown task priority: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    InReview,
    Done,
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "IN_REVIEW" => Ok(TaskStatus::InReview),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(AppError::validation(format!("unknown task status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    #[schema(format = DateTime, example = "2025-10-10T10:00:00Z")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const TASK_COLUMNS: &str =
    "id, project_id, workspace_id, title, description, priority, status, assigned_to, created_by, due_date, created_at, updated_at";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TaskListItem {
    #[serde(flatten)]
    pub task: Task,
    pub project: ProjectSummary,
    pub assignee: Option<UserSummary>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTaskListItem {
    #[sqlx(flatten)]
    pub task: Task,
    pub project_name: String,
    pub project_emoji: String,
    pub assignee_name: Option<String>,
    pub assignee_profile_picture: Option<String>,
}

impl From<DbTaskListItem> for TaskListItem {
    fn from(value: DbTaskListItem) -> Self {
        let project = ProjectSummary {
            id: value.task.project_id,
            name: value.project_name,
            emoji: value.project_emoji,
        };
        let assignee = match (value.task.assigned_to, value.assignee_name) {
            (Some(id), Some(name)) => Some(UserSummary {
                id,
                name,
                profile_picture: value.assignee_profile_picture,
            }),
            _ => None,
        };

        TaskListItem {
            task: value.task,
            project,
            assignee,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskPage {
    pub tasks: Vec<TaskListItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskCreateRequest {
    #[schema(example = "Draft the launch checklist")]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
    #[schema(format = DateTime, example = "2025-10-10T10:00:00Z")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial task update. Omitted fields keep their stored values; this means
/// `assigned_to` and `due_date` can be changed but not cleared.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TaskUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
    #[schema(format = DateTime, example = "2025-11-01T10:00:00Z")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Narrowing applied to a workspace's task listing. Every populated field is
/// ANDed; multi-valued fields match any of their values.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project_id: Option<Uuid>,
    pub status: Vec<TaskStatus>,
    pub priority: Vec<TaskPriority>,
    pub assigned_to: Vec<Uuid>,
    pub keyword: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Query string of the task listing. Multi-valued filters are comma separated,
/// e.g. `?status=TODO,IN_PROGRESS`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub keyword: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub page_size: Option<i64>,
    pub page_number: Option<i64>,
}

impl TaskListQuery {
    pub fn into_parts(self) -> Result<(TaskFilter, PageRequest), AppError> {
        let filter = TaskFilter {
            project_id: self.project_id,
            status: split_list(self.status.as_deref())?,
            priority: split_list(self.priority.as_deref())?,
            assigned_to: split_list::<Uuid, _>(self.assigned_to.as_deref())?,
            keyword: self.keyword.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()),
            due_date: self.due_date,
        };
        Ok((filter, PageRequest::new(self.page_size, self.page_number)))
    }
}

fn split_list<T, E>(raw: Option<&str>) -> Result<Vec<T>, AppError>
where
    T: FromStr<Err = E>,
    E: std::fmt::Display,
{
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| item.parse::<T>().map_err(|err| AppError::validation(err.to_string())))
            .collect()
    })
    .unwrap_or_else(|| Ok(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_separated_filters_are_parsed() {
        let query = TaskListQuery {
            status: Some("TODO, IN_PROGRESS".to_string()),
            priority: Some("HIGH".to_string()),
            keyword: Some("  ".to_string()),
            page_size: Some(500),
            ..Default::default()
        };
        let (filter, page) = query.into_parts().unwrap();
        assert_eq!(filter.status, vec![TaskStatus::Todo, TaskStatus::InProgress]);
        assert_eq!(filter.priority, vec![TaskPriority::High]);
        assert!(filter.keyword.is_none());
        assert!(filter.assigned_to.is_empty());
        assert_eq!(page.page_size, crate::models::pagination::MAX_PAGE_SIZE);
    }

    #[test]
    fn unknown_enum_values_are_validation_errors() {
        let query = TaskListQuery {
            status: Some("BLOCKED".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_parts(), Err(AppError::Validation(_))));

        let query = TaskListQuery {
            assigned_to: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.into_parts(), Err(AppError::Validation(_))));
    }
}
