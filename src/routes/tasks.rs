use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskFilter, TaskInput, TaskQuery},
    repository::TaskRepository,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's tasks.
///
/// Every query parameter is optional and the present ones are ANDed. The
/// owner constraint is always the caller; there is no way to widen it.
///
/// ## Query Parameters:
/// - `id`: exact task id.
/// - `title`, `description`: case-insensitive substring.
/// - `duration_min`, `duration_max`: inclusive bounds in minutes.
/// - `tag`, `author`: exact match.
/// - `date_from`, `date_to`: inclusive RFC 3339 bounds.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task`, newest `date` first.
/// - `400 Bad Request`: unparseable or invalid parameters.
/// - `401 Unauthorized`: missing or invalid access token.
#[get("")]
pub async fn get_tasks(
    repo: web::Data<TaskRepository>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    query_params.validate()?;
    let filter = TaskFilter::from_query(query_params.into_inner(), user.0.id);
    let tasks = repo.list(&filter).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the stored `Task`, including its new id.
/// - `400 Bad Request`: invalid `TaskInput`.
/// - `401 Unauthorized`: missing or invalid access token.
#[post("")]
pub async fn create_task(
    repo: web::Data<TaskRepository>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = repo.create(&task_data, &user.0).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one of the caller's tasks by id. Someone else's task is a 404.
#[get("/{id}")]
pub async fn get_task(
    repo: web::Data<TaskRepository>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = repo.get(task_id.into_inner(), &user.0).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces the mutable fields of one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: invalid `TaskInput` or id.
/// - `404 Not Found`: no such task owned by the caller.
#[put("/{id}")]
pub async fn update_task(
    repo: web::Data<TaskRepository>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = repo
        .update(task_id.into_inner(), &task_data, &user.0)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: `"ok"`.
/// - `404 Not Found`: nothing deleted, whether missing or owned by someone else.
#[delete("/{id}")]
pub async fn delete_task(
    repo: web::Data<TaskRepository>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    repo.delete(task_id.into_inner(), &user.0).await?;
    Ok(HttpResponse::Ok().json("ok"))
}
