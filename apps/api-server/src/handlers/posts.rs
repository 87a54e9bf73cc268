//! Post handlers: submission, public browsing and the moderation queue.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

use gazette_core::domain::{Post, PostDraft, PostPatch, User};
use gazette_core::policy::{PostAction, authorize};
use gazette_shared::ApiResponse;
use gazette_shared::dto::{OwnerResponse, PageQuery, PostListResponse, PostResponse};

use crate::config::AppConfig;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::upload;

/// POST /api/posts
///
/// Multipart submission. The fresh post always enters the queue as
/// `pending`; nothing becomes publicly visible without moderation.
pub async fn create(
    state: web::Data<AppState>,
    config: web::Data<AppConfig>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    authorize(&identity.actor(), PostAction::Submit, None)?;

    let form = upload::read_post_form(payload, config.max_image_bytes).await?;

    let image = match form.image {
        Some(image) => Some(state.images.store(image.format, image.bytes).await?),
        None => None,
    };

    let draft = PostDraft {
        title: form.title.unwrap_or_default(),
        content: form.content.unwrap_or_default(),
        category: form.category.unwrap_or_default(),
        tags: form.tags.unwrap_or_default(),
        image,
    };

    let post = draft.submit(identity.user_id)?;
    let post = state.posts.insert(post).await?;

    tracing::info!(post_id = %post.id, owner_id = %identity.user_id, "Post submitted for moderation");

    let owner = OwnerResponse {
        name: identity.name.clone(),
        email: identity.email.clone(),
        role: None,
    };

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        post_response(post, owner),
        "post created and awaiting approval",
    )))
}

/// GET /api/posts?page&limit
///
/// Public feed: approved posts only, whatever the page/limit combination.
pub async fn list_public(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page();
    let limit = query.limit();

    let total = state.posts.count_approved().await?;
    let total_pages = total.div_ceil(limit);

    let items = state
        .posts
        .list_approved(page, limit)
        .await?
        .into_iter()
        .map(|(post, owner)| post_response(post, owner_response(&owner, false)))
        .collect();

    Ok(HttpResponse::Ok().json(PostListResponse {
        items,
        page,
        total_pages,
    }))
}

/// GET /api/posts/{id}
///
/// Detail view. Deliberately status-blind: a direct link to a pending or
/// rejected post still resolves.
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let (post, owner) = state
        .posts
        .find_with_owner(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    Ok(HttpResponse::Ok().json(post_response(post, owner_response(&owner, true))))
}

/// PUT /api/posts/{id}
///
/// Partial multipart update by the owner or an admin. Absent fields are
/// left alone; the moderation status is never touched by an edit.
pub async fn update(
    state: web::Data<AppState>,
    config: web::Data<AppConfig>,
    identity: Identity,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let (mut post, owner) = state
        .posts
        .find_with_owner(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    authorize(&identity.actor(), PostAction::Edit, Some(&post))?;

    let form = upload::read_post_form(payload, config.max_image_bytes).await?;
    let image = match form.image {
        Some(image) => Some(state.images.store(image.format, image.bytes).await?),
        None => None,
    };

    post.apply(PostPatch {
        title: form.title,
        content: form.content,
        category: form.category,
        tags: form.tags,
        image,
    })?;

    let post = state.posts.update(post).await?;

    Ok(HttpResponse::Ok().json(post_response(post, owner_response(&owner, false))))
}

/// DELETE /api/posts/{id} - admin only, permanent.
pub async fn remove(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    authorize(&identity.actor(), PostAction::Delete, Some(&post))?;

    state.posts.delete(id).await?;

    tracing::info!(post_id = %id, admin_id = %identity.user_id, "Post deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message("post deleted")))
}

/// GET /api/posts/admin/all
///
/// Moderation queue: every post regardless of status, newest first, with
/// owner details for the decision.
pub async fn list_admin(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    authorize(&identity.actor(), PostAction::ListAll, None)?;

    let items: Vec<PostResponse> = state
        .posts
        .list_all()
        .await?
        .into_iter()
        .map(|(post, owner)| post_response(post, owner_response(&owner, true)))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

/// PUT /api/posts/{id}/approve - admin only, idempotent.
pub async fn approve(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    moderate(&state, &identity, path.into_inner(), Moderation::Approve).await
}

/// PUT /api/posts/{id}/reject - admin only, idempotent.
pub async fn reject(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    moderate(&state, &identity, path.into_inner(), Moderation::Reject).await
}

/// DELETE /api/posts/purge - admin only, removes every post.
pub async fn purge(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    authorize(&identity.actor(), PostAction::Purge, None)?;

    let removed = state.posts.delete_all().await?;

    tracing::warn!(admin_id = %identity.user_id, removed, "All posts purged");

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(format!(
        "{removed} posts deleted"
    ))))
}

enum Moderation {
    Approve,
    Reject,
}

async fn moderate(
    state: &AppState,
    identity: &Identity,
    id: Uuid,
    decision: Moderation,
) -> AppResult<HttpResponse> {
    let mut post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| post_not_found(id))?;

    let (action, ack) = match decision {
        Moderation::Approve => (PostAction::Approve, "post approved"),
        Moderation::Reject => (PostAction::Reject, "post rejected"),
    };
    authorize(&identity.actor(), action, Some(&post))?;

    let changed = match decision {
        Moderation::Approve => post.approve(),
        Moderation::Reject => post.reject(),
    };

    // Repeat decisions are no-op successes; only real transitions hit the
    // store.
    if changed {
        let status = post.status;
        state.posts.update(post).await?;
        tracing::info!(post_id = %id, status = %status.as_str(), admin_id = %identity.user_id, "Moderation decision applied");
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::message(ack)))
}

fn post_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("post with id {id} not found"))
}

fn owner_response(owner: &User, include_role: bool) -> OwnerResponse {
    OwnerResponse {
        name: owner.name.clone(),
        email: owner.email.clone(),
        role: include_role.then(|| owner.role.as_str().to_string()),
    }
}

fn post_response(post: Post, owner: OwnerResponse) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        category: post.category.as_str().to_string(),
        tags: post.tags,
        image: post.image,
        status: post.status.as_str().to_string(),
        owner,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
