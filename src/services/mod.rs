pub mod auth;
pub mod compat;
pub mod pets;
pub mod tutores;

pub use auth::*;
pub use pets::*;
pub use tutores::*;

use crate::error::ApiError;
use crate::models::PhotoUpload;

/// Appends a list filter only when it carries a value, keeping the wire
/// free of empty parameters.
pub(crate) fn push_filter(query: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            query.push((key.to_string(), value.to_string()));
        }
    }
}

/// Builds the multipart form with the `foto` field the API expects.
pub(crate) fn photo_form(upload: PhotoUpload) -> Result<reqwest::multipart::Form, ApiError> {
    let part = reqwest::multipart::Part::bytes(upload.bytes)
        .file_name(upload.file_name)
        .mime_str(&upload.content_type)
        .map_err(|e| {
            log::error!("invalid content type for photo upload: {}", e);
            ApiError::new("Arquivo de foto inválido", None)
        })?;
    Ok(reqwest::multipart::Form::new().part("foto", part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_filter_skips_empty_values() {
        let mut query = vec![("page".to_string(), "1".to_string())];
        push_filter(&mut query, "nome", Some("Luna"));
        push_filter(&mut query, "raca", None);
        push_filter(&mut query, "raca", Some(""));

        assert_eq!(
            query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("nome".to_string(), "Luna".to_string()),
            ]
        );
    }
}
