//! Post entity, its moderation lifecycle and field validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, FieldViolation};

/// Editorial category a post is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Scientific,
    #[serde(rename = "IT")]
    It,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Scientific => "Scientific",
            Category::It => "IT",
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scientific" => Ok(Category::Scientific),
            "IT" => Ok(Category::It),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation lifecycle flag controlling public visibility.
///
/// `Pending` is the only initial state. `Approved` and `Rejected` are
/// terminal from the machine's perspective: no automated transition leaves
/// them, but the moderation operations may re-enter either (an admin can
/// re-approve or flip a decision), which is what makes approve/reject
/// idempotent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

/// Post entity - a user-submitted article subject to moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    /// Public-servable path of the uploaded image, e.g. `/uploads/<name>`.
    pub image: String,
    pub status: ModerationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Mark the post approved. Returns whether the status actually changed,
    /// so callers can skip the write on a repeat call.
    pub fn approve(&mut self) -> bool {
        self.transition(ModerationStatus::Approved)
    }

    /// Mark the post rejected. Same idempotence contract as [`Post::approve`].
    pub fn reject(&mut self) -> bool {
        self.transition(ModerationStatus::Rejected)
    }

    fn transition(&mut self, status: ModerationStatus) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.updated_at = Utc::now();
        true
    }

    /// Apply a partial edit. Only fields present in the patch are touched;
    /// each is re-validated with the submission rules. The moderation status
    /// is never reset by an edit.
    pub fn apply(&mut self, patch: PostPatch) -> Result<(), DomainError> {
        let mut violations = Vec::new();

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                violations.push(FieldViolation::new("title", "title must not be empty"));
            }
        }
        if let Some(content) = &patch.content {
            if content.trim().is_empty() {
                violations.push(FieldViolation::new("content", "content must not be empty"));
            }
        }
        let category = match &patch.category {
            Some(raw) => match raw.parse::<Category>() {
                Ok(category) => Some(category),
                Err(()) => {
                    violations.push(FieldViolation::new(
                        "category",
                        "category must be \"Scientific\" or \"IT\"",
                    ));
                    None
                }
            },
            None => None,
        };

        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        self.updated_at = Utc::now();

        Ok(())
    }
}

/// Submission input for a new post. Field values arrive as raw form text;
/// [`PostDraft::submit`] checks all of them and reports every violation at
/// once rather than stopping at the first.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    /// Stored image path; present once the upload has been accepted.
    pub image: Option<String>,
}

impl PostDraft {
    /// Validate the draft and create the post. Fresh posts always enter the
    /// moderation queue as `pending`.
    pub fn submit(self, owner_id: Uuid) -> Result<Post, DomainError> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push(FieldViolation::new("title", "title is required"));
        }
        if self.content.trim().is_empty() {
            violations.push(FieldViolation::new("content", "content is required"));
        }
        let category = match self.category.parse::<Category>() {
            Ok(category) => Some(category),
            Err(()) => {
                violations.push(FieldViolation::new(
                    "category",
                    "category must be \"Scientific\" or \"IT\"",
                ));
                None
            }
        };
        let image = match self.image {
            Some(image) if !image.is_empty() => Some(image),
            _ => {
                violations.push(FieldViolation::new("image", "an image file is required"));
                None
            }
        };

        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        let now = Utc::now();
        Ok(Post {
            id: Uuid::new_v4(),
            owner_id,
            title: self.title,
            content: self.content,
            // Unreachable: a violation was pushed whenever either Option
            // stayed None, and violations bail out above.
            category: category.ok_or_else(|| DomainError::Internal("category".into()))?,
            tags: self.tags,
            image: image.ok_or_else(|| DomainError::Internal("image".into()))?,
            status: ModerationStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial edit of an existing post. `None` means "leave the field alone".
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> PostDraft {
        PostDraft {
            title: "Intro to Rust".to_string(),
            content: "<p>Ownership and borrowing.</p>".to_string(),
            category: "IT".to_string(),
            tags: vec!["rust".to_string()],
            image: Some("/uploads/valid.png".to_string()),
        }
    }

    #[test]
    fn fresh_submission_is_pending() {
        let post = draft().submit(Uuid::new_v4()).unwrap();
        assert_eq!(post.status, ModerationStatus::Pending);
        assert_eq!(post.category, Category::It);
        assert_eq!(post.tags, vec!["rust".to_string()]);
    }

    #[test]
    fn missing_title_names_title() {
        let post = PostDraft {
            title: String::new(),
            ..draft()
        }
        .submit(Uuid::new_v4());

        match post {
            Err(DomainError::Validation(violations)) => {
                assert!(violations.iter().any(|v| v.field == "title"));
                assert_eq!(violations.len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_category_names_category() {
        let post = PostDraft {
            category: "Other".to_string(),
            ..draft()
        }
        .submit(Uuid::new_v4());

        match post {
            Err(DomainError::Validation(violations)) => {
                assert!(violations.iter().any(|v| v.field == "category"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn every_violation_is_reported() {
        let post = PostDraft::default().submit(Uuid::new_v4());

        match post {
            Err(DomainError::Validation(violations)) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["title", "content", "category", "image"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn approve_and_reject_are_idempotent() {
        let mut post = draft().submit(Uuid::new_v4()).unwrap();

        assert!(post.approve());
        assert!(!post.approve());
        assert_eq!(post.status, ModerationStatus::Approved);

        assert!(post.reject());
        assert!(!post.reject());
        assert_eq!(post.status, ModerationStatus::Rejected);
    }

    #[test]
    fn edit_does_not_reset_status() {
        let mut post = draft().submit(Uuid::new_v4()).unwrap();
        post.approve();

        post.apply(PostPatch {
            title: Some("Intro to Rust, revised".to_string()),
            ..PostPatch::default()
        })
        .unwrap();

        assert_eq!(post.status, ModerationStatus::Approved);
        assert_eq!(post.title, "Intro to Rust, revised");
    }

    #[test]
    fn patch_revalidates_changed_fields() {
        let mut post = draft().submit(Uuid::new_v4()).unwrap();

        let err = post
            .apply(PostPatch {
                title: Some("   ".to_string()),
                category: Some("Other".to_string()),
                ..PostPatch::default()
            })
            .unwrap_err();

        match err {
            DomainError::Validation(violations) => {
                let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
                assert_eq!(fields, vec!["title", "category"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        // A failed patch leaves the post untouched.
        assert_eq!(post.title, "Intro to Rust");
        assert_eq!(post.category, Category::It);
    }
}
