//! Authorization policy.
//!
//! Every moderation operation funnels through [`authorize`], a single
//! (actor, action, resource) decision point, so the ownership and role rules
//! cannot drift between endpoints.

use uuid::Uuid;

use crate::domain::{Post, Role};
use crate::error::DomainError;

/// The requesting principal, as resolved by the authentication gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    Identified { id: Uuid, role: Role },
}

impl Actor {
    pub fn user(id: Uuid) -> Self {
        Actor::Identified {
            id,
            role: Role::User,
        }
    }

    pub fn admin(id: Uuid) -> Self {
        Actor::Identified {
            id,
            role: Role::Admin,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::Identified { id, .. } => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Actor::Identified {
                role: Role::Admin,
                ..
            }
        )
    }
}

/// Everything an actor can ask the post store to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Submit,
    Edit,
    Approve,
    Reject,
    Delete,
    ListAll,
    Purge,
}

/// Decide whether `actor` may perform `action`, optionally against a loaded
/// `post`. Returns `Unauthenticated` for anonymous callers on any gated
/// action and `Forbidden` for identified callers lacking role or ownership.
pub fn authorize(actor: &Actor, action: PostAction, post: Option<&Post>) -> Result<(), DomainError> {
    let Actor::Identified { id, role } = actor else {
        return Err(DomainError::Unauthenticated);
    };

    match action {
        // Any authenticated user may submit; moderation happens afterwards.
        PostAction::Submit => Ok(()),

        PostAction::Edit => {
            let owned = post.is_some_and(|p| p.owner_id == *id);
            if owned || role.is_admin() {
                Ok(())
            } else {
                Err(DomainError::Forbidden)
            }
        }

        PostAction::Approve
        | PostAction::Reject
        | PostAction::Delete
        | PostAction::ListAll
        | PostAction::Purge => {
            if role.is_admin() {
                Ok(())
            } else {
                Err(DomainError::Forbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostDraft;

    fn post_owned_by(owner_id: Uuid) -> Post {
        PostDraft {
            title: "t".to_string(),
            content: "c".to_string(),
            category: "IT".to_string(),
            tags: Vec::new(),
            image: Some("/uploads/i.png".to_string()),
        }
        .submit(owner_id)
        .unwrap()
    }

    #[test]
    fn anonymous_actors_are_unauthenticated() {
        let err = authorize(&Actor::Anonymous, PostAction::Submit, None).unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
    }

    #[test]
    fn any_identified_actor_may_submit() {
        let actor = Actor::user(Uuid::new_v4());
        assert!(authorize(&actor, PostAction::Submit, None).is_ok());
    }

    #[test]
    fn owner_may_edit_but_not_moderate() {
        let owner = Uuid::new_v4();
        let post = post_owned_by(owner);
        let actor = Actor::user(owner);

        assert!(authorize(&actor, PostAction::Edit, Some(&post)).is_ok());
        for action in [PostAction::Approve, PostAction::Reject, PostAction::Delete] {
            let err = authorize(&actor, action, Some(&post)).unwrap_err();
            assert!(matches!(err, DomainError::Forbidden));
        }
    }

    #[test]
    fn non_owner_may_not_edit() {
        let post = post_owned_by(Uuid::new_v4());
        let actor = Actor::user(Uuid::new_v4());

        let err = authorize(&actor, PostAction::Edit, Some(&post)).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[test]
    fn admin_may_do_everything() {
        let post = post_owned_by(Uuid::new_v4());
        let actor = Actor::admin(Uuid::new_v4());

        for action in [
            PostAction::Submit,
            PostAction::Edit,
            PostAction::Approve,
            PostAction::Reject,
            PostAction::Delete,
            PostAction::ListAll,
            PostAction::Purge,
        ] {
            assert!(authorize(&actor, action, Some(&post)).is_ok());
        }
    }
}
