use reqwest::Method;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Paged, Photo, PhotoUpload, Tutor, TutorDetails, TutorRequest};
use crate::services::{compat, photo_form, push_filter};

/// Cadastra um novo tutor.
pub async fn create_tutor(api: &ApiClient, data: &TutorRequest) -> Result<Tutor, ApiError> {
    compat::send_write(api, Method::POST, "/v1/tutores", data).await
}

/// Lista tutores com paginação e filtro opcional de nome.
pub async fn list_tutores(
    api: &ApiClient,
    page: u32,
    size: u32,
    nome: Option<&str>,
) -> Result<Paged<Tutor>, ApiError> {
    let mut query = vec![
        ("page".to_string(), page.to_string()),
        ("size".to_string(), size.to_string()),
    ];
    push_filter(&mut query, "nome", nome);
    api.get_with_query("/v1/tutores", query).await
}

/// Busca um tutor pelo id, incluindo os pets vinculados.
pub async fn get_tutor_by_id(api: &ApiClient, id: i64) -> Result<TutorDetails, ApiError> {
    api.get(&format!("/v1/tutores/{}", id)).await
}

/// Atualiza um tutor existente.
pub async fn update_tutor(api: &ApiClient, id: i64, data: &TutorRequest) -> Result<Tutor, ApiError> {
    compat::send_write(api, Method::PUT, &format!("/v1/tutores/{}", id), data).await
}

/// Remove um tutor.
///
/// Como em pets, um erro é confirmado com uma releitura; instalações
/// antigas respondem 400 em vez de 404 para registros removidos.
pub async fn delete_tutor(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    match api.delete(&format!("/v1/tutores/{}", id)).await {
        Ok(()) => Ok(()),
        Err(err) => {
            compat::confirm_deleted(err, get_tutor_by_id(api, id), compat::TUTOR_GONE_STATUSES)
                .await
        }
    }
}

/// Envia uma foto para o tutor.
pub async fn add_tutor_photo(
    api: &ApiClient,
    tutor_id: i64,
    photo: PhotoUpload,
) -> Result<Photo, ApiError> {
    let form = photo_form(photo)?;
    api.post_multipart(&format!("/v1/tutores/{}/fotos", tutor_id), form)
        .await
}

/// Remove uma foto do tutor.
pub async fn delete_tutor_photo(
    api: &ApiClient,
    tutor_id: i64,
    foto_id: i64,
) -> Result<(), ApiError> {
    api.delete(&format!("/v1/tutores/{}/fotos/{}", tutor_id, foto_id))
        .await
}

/// Vincula um pet ao tutor.
pub async fn link_pet(api: &ApiClient, tutor_id: i64, pet_id: i64) -> Result<(), ApiError> {
    api.post_empty(&format!("/v1/tutores/{}/pets/{}", tutor_id, pet_id))
        .await
}

/// Desvincula um pet do tutor.
pub async fn unlink_pet(api: &ApiClient, tutor_id: i64, pet_id: i64) -> Result<(), ApiError> {
    api.delete(&format!("/v1/tutores/{}/pets/{}", tutor_id, pet_id))
        .await
}
