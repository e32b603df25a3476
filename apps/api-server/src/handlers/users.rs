//! User handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use divulge_core::domain::User;
use divulge_shared::ApiResponse;
use divulge_shared::dto::{IdResponse, SaveUserRequest, UserResponse};

use super::parse_id;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/users
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<SaveUserRequest>,
) -> AppResult<HttpResponse> {
    let user = into_user(None, body.into_inner())?;

    if state.users.find_by_email(&user.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let id = state.users.save(user).await?;
    tracing::info!(user_id = %id, "User created");

    Ok(HttpResponse::Created().json(ApiResponse::ok(IdResponse { id })))
}

/// GET /api/users
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state
        .users
        .list()
        .await?
        .into_iter()
        .map(to_response)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(users)))
}

/// GET /api/users/{id}
pub async fn fetch(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    let user = state.users.fetch(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_response(user)?)))
}

/// PUT /api/users/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SaveUserRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    let user = into_user(Some(id), body.into_inner())?;
    let id = state.users.save(user).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(IdResponse { id })))
}

/// DELETE /api/users/{id}
pub async fn remove(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    state.users.remove(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

fn into_user(id: Option<Uuid>, req: SaveUserRequest) -> AppResult<User> {
    let email = req.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if email.is_empty() || !email.contains('@') {
        errors.push("Invalid email address".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut user = User::new(req.name.trim(), email).with_accounts(req.accounts);
    user.id = id;
    Ok(user)
}

fn to_response(user: User) -> AppResult<UserResponse> {
    let id = user
        .id
        .ok_or_else(|| AppError::Internal("stored user has no id".to_string()))?;

    Ok(UserResponse {
        id,
        name: user.name,
        email: user.email,
        accounts: user.accounts,
        created_at: user.created_at,
    })
}
