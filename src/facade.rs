//! Fachada de estado consumida pelas telas.
//!
//! Cada família de recursos tem quatro contêineres de difusão: a coleção
//! corrente, o estado da listagem, o item selecionado e o estado do
//! detalhe. A fachada é a única escritora; as telas assinam os canais e
//! apenas leem. Chamadas concorrentes não são canceladas nem ordenadas:
//! a última a resolver fica com o estado (last-resolved-wins).

use tokio::sync::watch;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{
    Paged, Pet, PetDetails, PetRequest, Photo, PhotoUpload, Tutor, TutorDetails, TutorRequest,
};
use crate::services::{pets, tutores};

/// Mensagem publicada quando a lista de pets não pôde ser carregada.
pub const PETS_LOAD_ERROR: &str = "Não foi possível carregar os pets. Tente novamente.";
/// Mensagem publicada quando a lista de tutores não pôde ser carregada.
pub const TUTORES_LOAD_ERROR: &str = "Não foi possível carregar os tutores. Tente novamente.";
/// Mensagem publicada quando o pet selecionado não pôde ser carregado.
pub const PET_NOT_FOUND: &str = "Pet não encontrado";
/// Mensagem publicada quando o tutor selecionado não pôde ser carregado.
pub const TUTOR_NOT_FOUND: &str = "Tutor não encontrado";
/// Mensagem publicada quando uma listagem falha com 401.
pub const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";

/// Estado de uma listagem paginada.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub total_pages: u32,
}

/// Estado de uma tela de detalhe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailState {
    pub loading: bool,
    pub error: Option<String>,
}

/// Parâmetros da listagem de pets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetListParams {
    pub page: u32,
    pub size: u32,
    pub nome: Option<String>,
    pub raca: Option<String>,
}

impl Default for PetListParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            nome: None,
            raca: None,
        }
    }
}

/// Parâmetros da listagem de tutores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorListParams {
    pub page: u32,
    pub size: u32,
    pub nome: Option<String>,
}

impl Default for TutorListParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            nome: None,
        }
    }
}

/// Fachada que sincroniza os serviços de recurso com o estado das telas.
pub struct AppFacade {
    api: ApiClient,

    pets: watch::Sender<Vec<Pet>>,
    pets_state: watch::Sender<ListState>,
    selected_pet: watch::Sender<Option<PetDetails>>,
    pet_detail_state: watch::Sender<DetailState>,

    tutores: watch::Sender<Vec<Tutor>>,
    tutores_state: watch::Sender<ListState>,
    selected_tutor: watch::Sender<Option<TutorDetails>>,
    tutor_detail_state: watch::Sender<DetailState>,
}

impl AppFacade {
    pub fn new(api: ApiClient) -> Self {
        let (pets, _) = watch::channel(Vec::new());
        let (pets_state, _) = watch::channel(ListState::default());
        let (selected_pet, _) = watch::channel(None);
        let (pet_detail_state, _) = watch::channel(DetailState::default());

        let (tutores, _) = watch::channel(Vec::new());
        let (tutores_state, _) = watch::channel(ListState::default());
        let (selected_tutor, _) = watch::channel(None);
        let (tutor_detail_state, _) = watch::channel(DetailState::default());

        Self {
            api,
            pets,
            pets_state,
            selected_pet,
            pet_detail_state,
            tutores,
            tutores_state,
            selected_tutor,
            tutor_detail_state,
        }
    }

    /// Cliente HTTP compartilhado, usado também pelo fluxo de login.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Assina a coleção corrente de pets.
    pub fn subscribe_pets(&self) -> watch::Receiver<Vec<Pet>> {
        self.pets.subscribe()
    }

    /// Assina o estado da listagem de pets.
    pub fn subscribe_pets_state(&self) -> watch::Receiver<ListState> {
        self.pets_state.subscribe()
    }

    /// Assina o pet selecionado.
    pub fn subscribe_selected_pet(&self) -> watch::Receiver<Option<PetDetails>> {
        self.selected_pet.subscribe()
    }

    /// Assina o estado do detalhe de pet.
    pub fn subscribe_pet_detail_state(&self) -> watch::Receiver<DetailState> {
        self.pet_detail_state.subscribe()
    }

    /// Assina a coleção corrente de tutores.
    pub fn subscribe_tutores(&self) -> watch::Receiver<Vec<Tutor>> {
        self.tutores.subscribe()
    }

    /// Assina o estado da listagem de tutores.
    pub fn subscribe_tutores_state(&self) -> watch::Receiver<ListState> {
        self.tutores_state.subscribe()
    }

    /// Assina o tutor selecionado.
    pub fn subscribe_selected_tutor(&self) -> watch::Receiver<Option<TutorDetails>> {
        self.selected_tutor.subscribe()
    }

    /// Assina o estado do detalhe de tutor.
    pub fn subscribe_tutor_detail_state(&self) -> watch::Receiver<DetailState> {
        self.tutor_detail_state.subscribe()
    }

    /// Carrega uma página de pets e republica coleção e estado.
    pub async fn load_pets(&self, params: PetListParams) -> Result<Paged<Pet>, ApiError> {
        self.pets_state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.page = params.page;
        });

        match pets::list_pets(
            &self.api,
            params.page,
            params.size,
            params.nome.as_deref(),
            params.raca.as_deref(),
        )
        .await
        {
            Ok(data) => {
                self.pets.send_replace(data.content.clone());
                self.pets_state.send_replace(ListState {
                    loading: false,
                    error: None,
                    page: params.page,
                    total_pages: total_pages_or_one(data.page_count),
                });
                Ok(data)
            }
            Err(err) => {
                self.pets.send_replace(Vec::new());
                self.pets_state.send_replace(ListState {
                    loading: false,
                    error: Some(list_error_message(&err, PETS_LOAD_ERROR)),
                    page: params.page,
                    total_pages: 0,
                });
                Err(err)
            }
        }
    }

    /// Carrega um pet pelo id e o publica como selecionado.
    pub async fn load_pet_by_id(&self, pet_id: i64) -> Result<PetDetails, ApiError> {
        self.pet_detail_state.send_replace(DetailState {
            loading: true,
            error: None,
        });

        match pets::get_pet_by_id(&self.api, pet_id).await {
            Ok(data) => {
                self.selected_pet.send_replace(Some(data.clone()));
                self.pet_detail_state.send_replace(DetailState::default());
                Ok(data)
            }
            Err(err) => {
                self.pet_detail_state.send_replace(DetailState {
                    loading: false,
                    error: Some(PET_NOT_FOUND.to_string()),
                });
                Err(err)
            }
        }
    }

    /// Limpa o pet selecionado, usado ao navegar para o cadastro.
    pub fn clear_selected_pet(&self) {
        self.selected_pet.send_replace(None);
        self.pet_detail_state.send_replace(DetailState::default());
    }

    /// Cadastra um pet e o publica como selecionado.
    pub async fn create_pet(&self, data: &PetRequest) -> Result<Pet, ApiError> {
        let result = pets::create_pet(&self.api, data).await?;
        self.selected_pet
            .send_replace(Some(result.clone().into()));
        Ok(result)
    }

    /// Atualiza um pet e mescla a resposta no selecionado.
    pub async fn update_pet(&self, id: i64, data: &PetRequest) -> Result<Pet, ApiError> {
        let result = pets::update_pet(&self.api, id, data).await?;
        self.selected_pet.send_modify(|selected| match selected {
            Some(current) => current.merge_update(result.clone()),
            None => *selected = Some(result.clone().into()),
        });
        Ok(result)
    }

    /// Envia uma foto e corrige só o campo `foto` do pet selecionado,
    /// quando o id ainda é o mesmo.
    pub async fn add_pet_photo(&self, pet_id: i64, photo: PhotoUpload) -> Result<Photo, ApiError> {
        let foto = pets::add_pet_photo(&self.api, pet_id, photo).await?;
        self.selected_pet.send_modify(|selected| {
            if let Some(current) = selected {
                if current.id == pet_id {
                    current.foto = Some(foto.clone());
                }
            }
        });
        Ok(foto)
    }

    /// Remove um pet e limpa o selecionado quando o id coincide.
    pub async fn delete_pet(&self, pet_id: i64) -> Result<(), ApiError> {
        pets::delete_pet(&self.api, pet_id).await?;
        self.selected_pet.send_modify(|selected| {
            if selected.as_ref().is_some_and(|pet| pet.id == pet_id) {
                *selected = None;
            }
        });
        Ok(())
    }

    /// Carrega uma página de tutores e republica coleção e estado.
    pub async fn load_tutores(&self, params: TutorListParams) -> Result<Paged<Tutor>, ApiError> {
        self.tutores_state.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.page = params.page;
        });

        match tutores::list_tutores(&self.api, params.page, params.size, params.nome.as_deref())
            .await
        {
            Ok(data) => {
                self.tutores.send_replace(data.content.clone());
                self.tutores_state.send_replace(ListState {
                    loading: false,
                    error: None,
                    page: params.page,
                    total_pages: total_pages_or_one(data.page_count),
                });
                Ok(data)
            }
            Err(err) => {
                self.tutores.send_replace(Vec::new());
                self.tutores_state.send_replace(ListState {
                    loading: false,
                    error: Some(list_error_message(&err, TUTORES_LOAD_ERROR)),
                    page: params.page,
                    total_pages: 0,
                });
                Err(err)
            }
        }
    }

    /// Carrega um tutor pelo id e o publica como selecionado.
    pub async fn load_tutor_by_id(&self, tutor_id: i64) -> Result<TutorDetails, ApiError> {
        self.tutor_detail_state.send_replace(DetailState {
            loading: true,
            error: None,
        });

        match tutores::get_tutor_by_id(&self.api, tutor_id).await {
            Ok(data) => {
                self.selected_tutor.send_replace(Some(data.clone()));
                self.tutor_detail_state.send_replace(DetailState::default());
                Ok(data)
            }
            Err(err) => {
                self.tutor_detail_state.send_replace(DetailState {
                    loading: false,
                    error: Some(TUTOR_NOT_FOUND.to_string()),
                });
                Err(err)
            }
        }
    }

    /// Limpa o tutor selecionado.
    pub fn clear_selected_tutor(&self) {
        self.selected_tutor.send_replace(None);
        self.tutor_detail_state.send_replace(DetailState::default());
    }

    /// Cadastra um tutor e o publica como selecionado.
    pub async fn create_tutor(&self, data: &TutorRequest) -> Result<Tutor, ApiError> {
        let result = tutores::create_tutor(&self.api, data).await?;
        self.selected_tutor
            .send_replace(Some(result.clone().into()));
        Ok(result)
    }

    /// Atualiza um tutor e mescla a resposta no selecionado.
    pub async fn update_tutor(&self, id: i64, data: &TutorRequest) -> Result<Tutor, ApiError> {
        let result = tutores::update_tutor(&self.api, id, data).await?;
        self.selected_tutor.send_modify(|selected| match selected {
            Some(current) => current.merge_update(result.clone()),
            None => *selected = Some(result.clone().into()),
        });
        Ok(result)
    }

    /// Envia uma foto e corrige só o campo `foto` do tutor selecionado.
    pub async fn add_tutor_photo(
        &self,
        tutor_id: i64,
        photo: PhotoUpload,
    ) -> Result<Photo, ApiError> {
        let foto = tutores::add_tutor_photo(&self.api, tutor_id, photo).await?;
        self.selected_tutor.send_modify(|selected| {
            if let Some(current) = selected {
                if current.id == tutor_id {
                    current.foto = Some(foto.clone());
                }
            }
        });
        Ok(foto)
    }

    /// Remove um tutor e limpa o selecionado quando o id coincide.
    pub async fn delete_tutor(&self, tutor_id: i64) -> Result<(), ApiError> {
        tutores::delete_tutor(&self.api, tutor_id).await?;
        self.selected_tutor.send_modify(|selected| {
            if selected.as_ref().is_some_and(|tutor| tutor.id == tutor_id) {
                *selected = None;
            }
        });
        Ok(())
    }

    /// Vincula um pet ao tutor. O detalhe não é recarregado aqui; quem
    /// chama decide quando recarregar.
    pub async fn link_pet(&self, tutor_id: i64, pet_id: i64) -> Result<(), ApiError> {
        tutores::link_pet(&self.api, tutor_id, pet_id).await
    }

    /// Desvincula um pet do tutor. Como no vínculo, sem recarga.
    pub async fn unlink_pet(&self, tutor_id: i64, pet_id: i64) -> Result<(), ApiError> {
        tutores::unlink_pet(&self.api, tutor_id, pet_id).await
    }
}

fn total_pages_or_one(page_count: u32) -> u32 {
    if page_count == 0 {
        1
    } else {
        page_count
    }
}

fn list_error_message(err: &ApiError, fallback: &str) -> String {
    if err.is_status(401) {
        SESSION_EXPIRED.to_string()
    } else {
        fallback.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_state_starts_idle() {
        let state = ListState::default();
        assert!(!state.loading);
        assert_eq!(state.error, None);
        assert_eq!(state.page, 0);
        assert_eq!(state.total_pages, 0);
    }

    #[test]
    fn test_total_pages_defaults_to_one() {
        assert_eq!(total_pages_or_one(0), 1);
        assert_eq!(total_pages_or_one(3), 3);
    }

    #[test]
    fn test_list_error_message_mentions_login_on_401() {
        let unauthorized = ApiError::from_status(401);
        let message = list_error_message(&unauthorized, PETS_LOAD_ERROR);
        assert!(message.contains("login"));

        let other = ApiError::from_status(500);
        assert_eq!(list_error_message(&other, PETS_LOAD_ERROR), PETS_LOAD_ERROR);
    }
}
