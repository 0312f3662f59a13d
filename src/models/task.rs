use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A file attached to a task. Created through the upload endpoint and linked
/// to a task by id on create/update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Server-assigned identifier of the attachment.
    pub id: i64,
    /// Original filename as submitted by the client.
    #[serde(default)]
    pub filename: String,
    /// Public path where the file can be fetched.
    #[serde(default)]
    pub file_path: String,
    /// Timestamp of when the attachment was uploaded.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A task record as returned by the remote service.
///
/// `id` is assigned by the server and immutable once assigned. Every other
/// field is defaulted during deserialization so sparse payloads still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier, unique within the task cache.
    pub id: i64,
    /// The title of the task.
    #[serde(default)]
    pub title: String,
    /// An optional description for the task.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the task has been completed.
    #[serde(default)]
    pub is_completed: bool,
    /// Identifier of the user who owns the task.
    #[serde(default)]
    pub owner_id: i64,
    /// Timestamp of when the task was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Files attached to the task.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Input structure for creating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TaskCreate {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Whether the task is already completed on creation.
    #[serde(default)]
    pub is_completed: bool,

    /// Ids of previously uploaded attachments to link to the new task.
    #[serde(default)]
    pub attachment_ids: Vec<i64>,
}

/// Partial input structure for updating a task. Omitted fields are left
/// unchanged by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    /// Ids of freshly uploaded attachments to link to the task.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub new_attachment_ids: Vec<i64>,
}

/// Outcome of a one-shot file upload. Not linked to any task automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Server-assigned identifier of the stored attachment.
    pub id: i64,
    /// Filename as stored by the server.
    pub filename: String,
    /// Public path of the stored file, when the server reports one.
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_deserializes_sparse_payload() {
        let task: Task = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(task.id, 1);
        assert_eq!(task.title, "");
        assert!(!task.is_completed);
        assert!(task.attachments.is_empty());
    }

    #[test]
    fn test_task_deserializes_full_payload() {
        let task: Task = serde_json::from_value(json!({
            "id": 5,
            "title": "Write report",
            "description": "quarterly numbers",
            "is_completed": false,
            "owner_id": 3,
            "created_at": "2024-03-01T10:00:00Z",
            "attachments": [{"id": 9, "filename": "report.pdf", "file_path": "/uploads/report.pdf"}]
        }))
        .unwrap();
        assert_eq!(task.title, "Write report");
        assert_eq!(task.attachments.len(), 1);
        assert_eq!(task.attachments[0].filename, "report.pdf");
    }

    #[test]
    fn test_task_create_validation() {
        let valid = TaskCreate {
            title: "Valid Task".to_string(),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let invalid = TaskCreate {
            title: "".to_string(), // Empty title
            ..Default::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_task_update_serializes_only_set_fields() {
        let update = TaskUpdate {
            is_completed: Some(true),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({"is_completed": true}));
    }
}
