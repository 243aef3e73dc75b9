use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};

pub fn validate_and_normalize_email(email: &str) -> ApiResult<String> {
    let trimmed = email.trim();

    if !email_address::EmailAddress::is_valid(trimmed) {
        return Err(ApiError::BadRequest(
            "Invalid email format. Must be in format user@domain.tld".to_string(),
        ));
    }

    // Require a TLD (dot after @)
    if let Some(at_pos) = trimmed.find('@') {
        let domain_part = &trimmed[at_pos + 1..];
        if !domain_part.contains('.') {
            return Err(ApiError::BadRequest(
                "Invalid email format. Domain must include a TLD (e.g., .ac.id, .edu)".to_string(),
            ));
        }
    }

    Ok(trimmed.to_lowercase())
}
