use crate::{
    auth::{
        hash_password, verify_decoy, verify_password, LoginRequest, RegisterRequest,
        RegisterResponse, TokenService, REFRESH_TOKEN_HEADER,
    },
    error::AppError,
    models::NewUser,
    repository::{RepositoryError, TaskRepository},
};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};
use validator::Validate;

/// Login user
///
/// Checks the password against the stored hash and returns a fresh
/// `TokenPair`. An unknown email and a wrong password produce the same 401.
#[post("/login")]
pub async fn login(
    repo: web::Data<TaskRepository>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = match repo.find_user_by_email(&login_data.email).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound) => {
            verify_decoy(&login_data.password);
            warn!("login failed: unknown email");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
        Err(e) => return Err(e.into()),
    };

    if !verify_password(&login_data.password, &user.password_hash) {
        warn!("login failed for user {}", user.id);
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let pair = tokens.issue_token_pair(&user.identity())?;
    info!("user {} logged in", user.id);
    Ok(HttpResponse::Ok().json(pair))
}

/// Refresh tokens
///
/// Reads the refresh token from the `Refresh-Token` header and returns a new
/// `TokenPair` for its subject. Access tokens are rejected here.
#[post("/refresh")]
pub async fn refresh(
    tokens: web::Data<TokenService>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let refresh_token = req
        .headers()
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".into()))?;

    let pair = tokens.refresh(refresh_token)?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Register a new user
///
/// Creates the account and returns it together with a first token pair.
#[post("/register")]
pub async fn register(
    repo: web::Data<TaskRepository>,
    tokens: web::Data<TokenService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();

    // Hashed before the uniqueness check, so a taken email costs the same bcrypt work.
    let password_hash = hash_password(&register_data.password)?;
    let user = repo
        .register_user(NewUser {
            name: register_data.name,
            email: register_data.email,
            password_hash,
        })
        .await?;

    let tokens = tokens.issue_token_pair(&user.identity())?;
    Ok(HttpResponse::Created().json(RegisterResponse { user, tokens }))
}
