pub mod clock;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::User;

pub use clock::{Clock, FixedClock, SystemClock};
pub use extractors::{Authenticated, AuthenticatedUser};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, prepare_decoy, verify_decoy, verify_password};
pub use token::{Claims, SigningKeys, TokenError, TokenKind, TokenPair, TokenService};

/// Header carrying the refresh token on `POST /api/refresh`.
pub const REFRESH_TOKEN_HEADER: &str = "Refresh-Token";

/// Represents the payload for a user login request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, copied onto every task the user creates.
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response to a successful registration: the new user and a first token pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub tokens: TokenPair,
}
