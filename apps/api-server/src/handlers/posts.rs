//! Post handlers - thin plumbing over the post coordinator.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use divulge_core::domain::Post;
use divulge_shared::ApiResponse;
use divulge_shared::dto::{IdResponse, ListPostsQuery, PostResponse, SavePostRequest};

use super::parse_id;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<SavePostRequest>,
) -> AppResult<HttpResponse> {
    let post = into_post(None, body.into_inner());
    let id = state.posts.save(post).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(IdResponse { id })))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SavePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    let post = into_post(Some(id), body.into_inner());
    let id = state.posts.save(post).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(IdResponse { id })))
}

/// GET /api/posts/{id}
pub async fn fetch(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    let post = state.posts.fetch(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_response(post, true)?)))
}

/// GET /api/posts?accountId=
pub async fn list_by_account(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let account_id = parse_id(&query.account_id, "accountId")?;
    let posts = state.posts.list_by_account(account_id).await?;

    let posts = posts
        .into_iter()
        .map(|post| to_response(post, false))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// POST /api/posts/{id}/publish
pub async fn publish(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    state.posts.publish(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        IdResponse { id },
        "Post published",
    )))
}

/// POST /api/posts/{id}/redact
pub async fn redact(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    state.posts.redact(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        IdResponse { id },
        "Post reverted to draft",
    )))
}

/// DELETE /api/posts/{id}
pub async fn remove(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    state.posts.remove(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Missing references become nil ids, which post validation rejects.
fn into_post(id: Option<Uuid>, req: SavePostRequest) -> Post {
    let mut post = Post::new(
        req.account_id.unwrap_or_else(Uuid::nil),
        req.author_id.unwrap_or_else(Uuid::nil),
        req.title,
        req.summary,
        req.content,
    );
    post.id = id;
    post
}

fn to_response(post: Post, with_content: bool) -> AppResult<PostResponse> {
    let id = post
        .id
        .ok_or_else(|| AppError::Internal("stored post has no id".to_string()))?;

    Ok(PostResponse {
        id,
        account_id: post.account_id,
        author_id: post.author_id,
        title: post.title,
        summary: post.summary,
        content_path: post.content_path.unwrap_or_default(),
        content: with_content.then_some(post.content),
        created_at: post.created_at,
        updated_at: post.updated_at,
        published_at: post.published_at,
    })
}
