use reqwest::Method;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{Paged, Pet, PetDetails, PetRequest, Photo, PhotoUpload};
use crate::services::{compat, photo_form, push_filter};

/// Cadastra um novo pet.
pub async fn create_pet(api: &ApiClient, data: &PetRequest) -> Result<Pet, ApiError> {
    compat::send_write(api, Method::POST, "/v1/pets", data).await
}

/// Lista pets com paginação e filtros opcionais de nome e raça.
pub async fn list_pets(
    api: &ApiClient,
    page: u32,
    size: u32,
    nome: Option<&str>,
    raca: Option<&str>,
) -> Result<Paged<Pet>, ApiError> {
    let mut query = vec![
        ("page".to_string(), page.to_string()),
        ("size".to_string(), size.to_string()),
    ];
    push_filter(&mut query, "nome", nome);
    push_filter(&mut query, "raca", raca);
    api.get_with_query("/v1/pets", query).await
}

/// Busca um pet pelo id, incluindo os tutores vinculados.
pub async fn get_pet_by_id(api: &ApiClient, id: i64) -> Result<PetDetails, ApiError> {
    api.get(&format!("/v1/pets/{}", id)).await
}

/// Atualiza um pet existente.
pub async fn update_pet(api: &ApiClient, id: i64, data: &PetRequest) -> Result<Pet, ApiError> {
    compat::send_write(api, Method::PUT, &format!("/v1/pets/{}", id), data).await
}

/// Remove um pet.
///
/// Uma resposta de erro é confirmada com uma releitura do registro: se
/// ele já não existe, a remoção é tratada como bem-sucedida.
pub async fn delete_pet(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    match api.delete(&format!("/v1/pets/{}", id)).await {
        Ok(()) => Ok(()),
        Err(err) => {
            compat::confirm_deleted(err, get_pet_by_id(api, id), compat::PET_GONE_STATUSES).await
        }
    }
}

/// Envia uma foto para o pet.
pub async fn add_pet_photo(
    api: &ApiClient,
    pet_id: i64,
    photo: PhotoUpload,
) -> Result<Photo, ApiError> {
    let form = photo_form(photo)?;
    api.post_multipart(&format!("/v1/pets/{}/fotos", pet_id), form)
        .await
}

/// Remove uma foto do pet.
pub async fn delete_pet_photo(api: &ApiClient, pet_id: i64, foto_id: i64) -> Result<(), ApiError> {
    api.delete(&format!("/v1/pets/{}/fotos/{}", pet_id, foto_id))
        .await
}
