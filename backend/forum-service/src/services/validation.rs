/// Input normalization shared by the services
///
/// Lengths are counted in characters, after trimming.
use validator::ValidateEmail;

use crate::error::{AppError, Result};
use crate::models::ProfileUpdate;

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 100;
pub const BIO_MAX_LENGTH: usize = 500;
pub const DEFAULT_RESET_PATH: &str = "/reset-password";

/// Trimmed display name, 2 to 100 characters
pub fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    let len = name.chars().count();
    if len < NAME_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "Name must contain at least {} characters",
            NAME_MIN_LENGTH
        )));
    }
    if len > NAME_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "Name must contain at most {} characters",
            NAME_MAX_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// Trimmed, lower-cased email used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalized email that must also be a well-formed address
pub fn validate_email(email: &str) -> Result<String> {
    let email = normalize_email(email);
    if !email.validate_email() {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}

/// Path on the web client that receives `?token=`. Only same-origin
/// absolute paths are accepted; anything else falls back to the default.
pub fn reset_redirect_path(redirect_to: Option<&str>) -> &str {
    match redirect_to.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains(['?', '#', '\\'])
                && !path.chars().any(char::is_whitespace) =>
        {
            path
        }
        _ => DEFAULT_RESET_PATH,
    }
}

/// Optional conversation title. Blank means "no title".
pub fn normalize_title(title: Option<&str>, max_len: usize) -> Result<Option<String>> {
    let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if title.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "Title must contain at most {} characters",
            max_len
        )));
    }
    Ok(Some(title.to_string()))
}

/// Required message content
pub fn normalize_content(content: &str, max_len: usize) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Message content is required".to_string()));
    }
    if content.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "Message must contain at most {} characters",
            max_len
        )));
    }
    Ok(content.to_string())
}

/// Build a profile update from raw request fields.
/// Empty bio or image clears the stored value.
pub fn normalize_profile(
    name: Option<&str>,
    bio: Option<&str>,
    image: Option<&str>,
) -> Result<ProfileUpdate> {
    let name = name.map(normalize_name).transpose()?;

    let bio = match bio.map(str::trim) {
        None => None,
        Some("") => Some(None),
        Some(bio) if bio.chars().count() > BIO_MAX_LENGTH => {
            return Err(AppError::Validation(format!(
                "Bio must contain at most {} characters",
                BIO_MAX_LENGTH
            )))
        }
        Some(bio) => Some(Some(bio.to_string())),
    };

    let image = image
        .map(str::trim)
        .map(|i| (!i.is_empty()).then(|| i.to_string()));

    Ok(ProfileUpdate { name, bio, image })
}
