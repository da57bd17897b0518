use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};

use crate::errors::AppError;

const INVITE_CODE_LENGTH: usize = 8;
const INVITE_CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MAX_NAME_LENGTH: usize = 255;

pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Short lowercase alphanumeric code shared with people who should join a workspace.
pub fn generate_invite_code() -> String {
    // Largest multiple of the alphabet size that fits in a byte; higher bytes are redrawn.
    let limit = (u8::MAX as usize / INVITE_CODE_ALPHABET.len() * INVITE_CODE_ALPHABET.len()) as u8;

    let mut code = String::with_capacity(INVITE_CODE_LENGTH);
    let mut buf = [0u8; 16];
    while code.len() < INVITE_CODE_LENGTH {
        OsRng.fill_bytes(&mut buf);
        for byte in buf.iter().copied().filter(|b| *b < limit) {
            if code.len() == INVITE_CODE_LENGTH {
                break;
            }
            code.push(INVITE_CODE_ALPHABET[byte as usize % INVITE_CODE_ALPHABET.len()] as char);
        }
    }
    code
}

/// Trims `value` and checks it is a usable display name (1..=255 chars).
pub fn validate_name(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional free-text field.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
