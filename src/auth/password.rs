use crate::error::AppError;
use bcrypt::{hash, verify};
use lazy_static::lazy_static;
use log::{debug, error};

/// bcrypt work factor for newly stored hashes.
const HASH_COST: u32 = 12;

lazy_static! {
    // Checked when a login email is unknown, so a miss costs as much as a wrong password.
    static ref DECOY_HASH: Option<String> = match hash("decoy-password", HASH_COST) {
        Ok(hashed) => Some(hashed),
        Err(e) => {
            error!("failed to build decoy password hash: {}", e);
            None
        }
    };
}

/// Computes the decoy hash up front so the first unknown-email login does not
/// pay for building it. Returns `false` if the decoy could not be built.
pub fn prepare_decoy() -> bool {
    lazy_static::initialize(&DECOY_HASH);
    DECOY_HASH.is_some()
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASH_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed hash is reported the same way as a wrong password.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            debug!("stored password hash could not be checked: {}", e);
            false
        }
    }
}

/// Spends the same bcrypt work as [`verify_password`] without a stored hash.
/// Always `false`.
pub fn verify_decoy(password: &str) -> bool {
    match DECOY_HASH.as_deref() {
        Some(decoy) => {
            verify_password(password, decoy);
        }
        // Hashing costs the same work factor as verifying.
        None => {
            let _ = hash(password, HASH_COST);
        }
    }
    false
}
