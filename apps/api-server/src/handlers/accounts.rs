//! Account handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use divulge_core::domain::Account;
use divulge_shared::ApiResponse;
use divulge_shared::dto::{AccountResponse, IdResponse, SaveAccountRequest};

use super::parse_id;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/accounts
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<SaveAccountRequest>,
) -> AppResult<HttpResponse> {
    let account = into_account(None, body.into_inner())?;
    let id = state.accounts.save(account).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(IdResponse { id })))
}

/// GET /api/accounts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let accounts = state
        .accounts
        .list()
        .await?
        .into_iter()
        .map(to_response)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(accounts)))
}

/// GET /api/accounts/{id}
pub async fn fetch(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    let account = state.accounts.fetch(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(to_response(account)?)))
}

/// PUT /api/accounts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SaveAccountRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    let account = into_account(Some(id), body.into_inner())?;
    let id = state.accounts.save(account).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(IdResponse { id })))
}

/// DELETE /api/accounts/{id}
pub async fn remove(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_id(&path, "id")?;
    state.accounts.remove(id).await?;

    Ok(HttpResponse::NoContent().finish())
}

fn into_account(id: Option<Uuid>, req: SaveAccountRequest) -> AppResult<Account> {
    let mut errors = Vec::new();
    if req.name.trim().is_empty() {
        errors.push("name is required".to_string());
    }
    if req.owner_id.is_nil() {
        errors.push("ownerId is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut account = Account::new(req.owner_id, req.name.trim());
    account.id = id;
    Ok(account)
}

fn to_response(account: Account) -> AppResult<AccountResponse> {
    let id = account
        .id
        .ok_or_else(|| AppError::Internal("stored account has no id".to_string()))?;

    Ok(AccountResponse {
        id,
        owner_id: account.owner_id,
        name: account.name,
        created_at: account.created_at,
        updated_at: account.updated_at,
    })
}
