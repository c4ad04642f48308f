//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use validator::Validate;

use crate::error::HavenError;

/// Validate a request body, returning a HavenError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), HavenError> {
    body.validate().map_err(|e| HavenError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Whitelist check for listing ordering parameters.
///
/// Accepts the field names the public API documents (optionally prefixed
/// with `-` for descending order) and maps them to SQL `ORDER BY` clauses.
/// Anything else falls back to newest-first.
pub fn ordering_clause(ordering: Option<&str>) -> &'static str {
    match ordering.unwrap_or("-created_at") {
        "price" => "price ASC",
        "-price" => "price DESC",
        "size" => "size_sqm ASC",
        "-size" => "size_sqm DESC",
        "created_at" => "created_at ASC",
        _ => "created_at DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
    }

    #[test]
    fn validation_errors_surface_messages() {
        let err = validate_request(&Probe { name: "ab".into() }).unwrap_err();
        match err {
            HavenError::Validation { message } => assert!(message.contains("too short")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ordering_whitelist_rejects_unknown_fields() {
        assert_eq!(ordering_clause(Some("-price")), "price DESC");
        assert_eq!(ordering_clause(Some("size")), "size_sqm ASC");
        // Unknown or hostile input falls back to the default
        assert_eq!(ordering_clause(Some("price; DROP TABLE")), "created_at DESC");
        assert_eq!(ordering_clause(None), "created_at DESC");
    }
}
