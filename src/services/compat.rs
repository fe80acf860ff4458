//! Workarounds for older deployments of the remote API.
//!
//! Two server generations coexist: the current contract and a legacy one
//! that rejects newer request fields and sometimes reports errors for
//! deletes it actually performed. The shims here keep both shapes in one
//! place instead of scattering per-resource special cases.

use std::future::Future;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{PetRequest, TutorRequest};

/// Confirmation statuses proving a pet record is already gone.
pub(crate) const PET_GONE_STATUSES: &[u16] = &[404];

/// Confirmation statuses proving a tutor record is already gone. Legacy
/// deployments answer 400 instead of 404 for removed tutors.
pub(crate) const TUTOR_GONE_STATUSES: &[u16] = &[404, 400];

/// Write payloads with a reduced form for legacy deployments.
///
/// Each implementation names the single newer field that gets stripped on
/// the retry; together they are the table of which operation downgrades
/// to which payload shape.
pub(crate) trait LegacyRequest: Serialize {
    /// Field unknown to legacy deployments.
    const DROPPED_FIELD: &'static str;

    /// The serialized payload minus exactly [`Self::DROPPED_FIELD`], or
    /// `None` when the field was absent and a retry would resend the same
    /// bytes.
    fn legacy_payload(&self) -> Option<serde_json::Value> {
        let mut value = serde_json::to_value(self).ok()?;
        value.as_object_mut()?.remove(Self::DROPPED_FIELD)?;
        Some(value)
    }
}

impl LegacyRequest for PetRequest {
    const DROPPED_FIELD: &'static str = "especie";
}

impl LegacyRequest for TutorRequest {
    const DROPPED_FIELD: &'static str = "cpf";
}

/// Sends a create/update, retrying exactly once with the legacy payload
/// when the server answers 400. A failure of the retry propagates
/// unchanged.
pub(crate) async fn send_write<T, P>(
    api: &ApiClient,
    method: Method,
    endpoint: &str,
    payload: &P,
) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    P: LegacyRequest,
{
    match api.send_json(method.clone(), endpoint, payload).await {
        Err(err) if err.is_status(400) => {
            let Some(legacy) = payload.legacy_payload() else {
                return Err(err);
            };
            log::warn!(
                "{} {} rejected with 400, retrying without `{}`",
                method,
                endpoint,
                P::DROPPED_FIELD
            );
            api.send_json(method, endpoint, &legacy).await
        }
        result => result,
    }
}

/// Shared idempotent-delete confirmation.
///
/// After a failed DELETE, awaits the confirmatory read: a failure whose
/// status is listed in `gone_statuses` proves the record no longer exists
/// and the delete is reported as successful. Any other outcome, including
/// a read that still finds the record, re-raises the original error.
pub(crate) async fn confirm_deleted<T>(
    original: ApiError,
    confirm: impl Future<Output = Result<T, ApiError>>,
    gone_statuses: &[u16],
) -> Result<(), ApiError> {
    match confirm.await {
        Err(err) if err.status.is_some_and(|s| gone_statuses.contains(&s)) => {
            log::warn!("delete reported an error but the record is gone, treating as success");
            Ok(())
        }
        _ => Err(original),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_legacy_payload_drops_exactly_especie() {
        let request = PetRequest {
            nome: "Luna".to_string(),
            especie: "Cachorro".to_string(),
            raca: Some("SRD".to_string()),
            idade: Some(3),
        };

        let legacy = request.legacy_payload().unwrap();
        let mut expected = serde_json::to_value(&request).unwrap();
        expected.as_object_mut().unwrap().remove("especie");
        assert_eq!(legacy, expected);
        assert!(legacy.get("especie").is_none());
        assert_eq!(legacy["nome"], "Luna");
        assert_eq!(legacy["raca"], "SRD");
        assert_eq!(legacy["idade"], 3);
    }

    #[test]
    fn test_tutor_legacy_payload_drops_cpf() {
        let mut request = TutorRequest::new("Ana Souza", "11999999999");
        request.cpf = Some(52998224725);

        let legacy = request.legacy_payload().unwrap();
        assert!(legacy.get("cpf").is_none());
        assert_eq!(legacy["nome"], "Ana Souza");
    }

    #[test]
    fn test_no_legacy_payload_when_field_was_absent() {
        let request = TutorRequest::new("Ana Souza", "11999999999");
        assert!(request.legacy_payload().is_none());
    }

    #[tokio::test]
    async fn test_confirm_deleted_accepts_gone_statuses() {
        let original = ApiError::from_status(500);
        let result = confirm_deleted(
            original,
            async { Err::<(), _>(ApiError::from_status(404)) },
            PET_GONE_STATUSES,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_confirm_deleted_reraises_when_record_still_exists() {
        let original = ApiError::from_status(500);
        let result = confirm_deleted(original.clone(), async { Ok(()) }, PET_GONE_STATUSES).await;
        assert_eq!(result.unwrap_err(), original);
    }

    #[tokio::test]
    async fn test_confirm_deleted_reraises_on_other_confirm_failures() {
        let original = ApiError::from_status(500);
        let result = confirm_deleted(
            original.clone(),
            async { Err::<(), _>(ApiError::from_status(503)) },
            TUTOR_GONE_STATUSES,
        )
        .await;
        assert_eq!(result.unwrap_err(), original);

        let via_400 = confirm_deleted(
            ApiError::from_status(500),
            async { Err::<(), _>(ApiError::from_status(400)) },
            TUTOR_GONE_STATUSES,
        )
        .await;
        assert!(via_400.is_ok());
    }
}
