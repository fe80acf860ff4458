//! In-memory stand-in for the pet manager API.
//!
//! Implements the slice of the remote contract the client talks to:
//! bearer-gated CRUD for pets and tutores, photo uploads, the tutor/pet
//! link table, token issuing with refresh rotation, paged listings and
//! the public health route. [`MockConfig`] switches on the awkward server
//! generations the client has to survive: the legacy write contract and
//! deletes that report failure with the record already gone.
//!
//! Routes under `/_test/` expose recorded wire traffic and canned status
//! answers for assertions; they carry no auth.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, RawQuery, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// Selects which server generation the mock impersonates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockConfig {
    /// Reject pet writes carrying `especie` and tutor writes carrying
    /// `cpf` with 400, and answer 400 for unknown tutor ids, like the
    /// older backend did.
    pub legacy_writes: bool,
    pub delete_behavior: DeleteBehavior,
}

/// How DELETE answers on `/v1/pets/{id}` and `/v1/tutores/{id}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteBehavior {
    /// Remove and answer 204 (404 for unknown ids).
    #[default]
    Normal,
    /// Remove the record but answer 500 anyway.
    FailAfterRemove,
    /// Keep the record and answer 500.
    FailAndKeep,
}

#[derive(Debug, Clone, Serialize)]
struct FotoRecord {
    id: i64,
    nome: String,
    #[serde(rename = "contentType")]
    content_type: String,
    url: String,
}

#[derive(Debug, Clone, Serialize)]
struct PetRecord {
    id: i64,
    nome: String,
    especie: Option<String>,
    raca: Option<String>,
    idade: Option<u32>,
    foto: Option<FotoRecord>,
}

#[derive(Debug, Clone, Serialize)]
struct TutorRecord {
    id: i64,
    nome: String,
    telefone: String,
    email: Option<String>,
    endereco: Option<String>,
    cpf: Option<u64>,
    foto: Option<FotoRecord>,
}

#[derive(Debug, Serialize)]
struct PetDetail {
    #[serde(flatten)]
    pet: PetRecord,
    tutores: Vec<TutorRecord>,
}

#[derive(Debug, Serialize)]
struct TutorDetail {
    #[serde(flatten)]
    tutor: TutorRecord,
    pets: Vec<PetRecord>,
}

#[derive(Debug, Deserialize)]
struct PetWrite {
    nome: String,
    especie: Option<String>,
    raca: Option<String>,
    idade: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TutorWrite {
    nome: String,
    telefone: String,
    email: Option<String>,
    endereco: Option<String>,
    cpf: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    refresh_expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    size: Option<u32>,
    nome: Option<String>,
    raca: Option<String>,
}

#[derive(Debug, Serialize)]
struct PageResponse<T> {
    page: u32,
    size: u32,
    total: u64,
    #[serde(rename = "pageCount")]
    page_count: u32,
    content: Vec<T>,
}

#[derive(Debug, Default)]
struct Store {
    pets: HashMap<i64, PetRecord>,
    tutores: HashMap<i64, TutorRecord>,
    /// (tutor id, pet id) pairs.
    links: HashSet<(i64, i64)>,
    access_tokens: HashSet<String>,
    refresh_tokens: HashSet<String>,
    id_seq: i64,
    token_seq: u64,
    last_query: Option<String>,
    writes: Vec<serde_json::Value>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.id_seq += 1;
        self.id_seq
    }

    fn issue_tokens(&mut self) -> TokenResponse {
        self.token_seq += 1;
        let access = format!("access-{}", self.token_seq);
        let refresh = format!("refresh-{}", self.token_seq);
        self.access_tokens.insert(access.clone());
        self.refresh_tokens.insert(refresh.clone());
        TokenResponse {
            access_token: access,
            refresh_token: refresh,
            expires_in: 300,
            refresh_expires_in: 1800,
        }
    }
}

#[derive(Clone)]
struct AppState {
    config: MockConfig,
    store: Arc<RwLock<Store>>,
}

pub fn app(config: MockConfig) -> Router {
    let state = AppState {
        config,
        store: Arc::new(RwLock::new(Store::default())),
    };

    let protected = Router::new()
        .route("/v1/pets", get(list_pets).post(create_pet))
        .route(
            "/v1/pets/{pet_id}",
            get(get_pet).put(update_pet).delete(delete_pet),
        )
        .route("/v1/pets/{pet_id}/fotos", post(add_pet_photo))
        .route("/v1/pets/{pet_id}/fotos/{foto_id}", delete(delete_pet_photo))
        .route("/v1/tutores", get(list_tutores).post(create_tutor))
        .route(
            "/v1/tutores/{tutor_id}",
            get(get_tutor).put(update_tutor).delete(delete_tutor),
        )
        .route("/v1/tutores/{tutor_id}/fotos", post(add_tutor_photo))
        .route(
            "/v1/tutores/{tutor_id}/fotos/{foto_id}",
            delete(delete_tutor_photo),
        )
        .route(
            "/v1/tutores/{tutor_id}/pets/{pet_id}",
            post(link_pet).delete(unlink_pet),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/autenticacao/login", post(login))
        .route("/autenticacao/refresh", put(refresh))
        .route("/api/health", get(health))
        .route("/_test/last-query", get(last_query))
        .route("/_test/writes", get(writes))
        .route("/_test/status/{code}", get(fixed_status))
        .route("/_test/malformed", get(malformed))
        .merge(protected)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

/// Serves with explicit knobs. Integration tests bind port 0 and pick the
/// server generation they want to talk to.
pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let valid = match bearer_token(request.headers()) {
        Some(token) => state.store.read().await.access_tokens.contains(token),
        None => false,
    };
    if !valid {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    next.run(request).await
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "message": message })),
    )
        .into_response()
}

/// 400 in legacy mode when the payload carries a field the old contract
/// never had.
fn reject_unknown_field(body: &serde_json::Value, field: &str) -> Option<Response> {
    body.get(field)
        .map(|_| bad_request(&format!("Propriedade desconhecida: {field}")))
}

/// The older backend answered 400 for unknown tutor ids.
fn missing_tutor_status(config: &MockConfig) -> StatusCode {
    if config.legacy_writes {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::NOT_FOUND
    }
}

fn matches_filter(value: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| {
        value.to_lowercase().contains(&f.to_lowercase())
    })
}

fn paginate<T>(items: Vec<T>, page: u32, size: u32) -> PageResponse<T> {
    let total = items.len() as u64;
    let page_count = if size == 0 {
        0
    } else {
        total.div_ceil(size as u64) as u32
    };
    let content = items
        .into_iter()
        .skip(page as usize * size as usize)
        .take(size as usize)
        .collect();
    PageResponse {
        page,
        size,
        total,
        page_count,
        content,
    }
}

async fn login(State(state): State<AppState>, Json(credentials): Json<LoginRequest>) -> Response {
    if credentials.username.trim().is_empty() || credentials.password.trim().is_empty() {
        return bad_request("Credenciais obrigatórias");
    }
    let mut store = state.store.write().await;
    Json(store.issue_tokens()).into_response()
}

async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let mut store = state.store.write().await;
    if !store.refresh_tokens.remove(token) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(store.issue_tokens()).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_pets(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(params): Query<ListParams>,
) -> Json<PageResponse<PetRecord>> {
    let mut store = state.store.write().await;
    store.last_query = raw;
    let mut matches: Vec<PetRecord> = store
        .pets
        .values()
        .filter(|pet| {
            matches_filter(&pet.nome, params.nome.as_deref())
                && matches_filter(pet.raca.as_deref().unwrap_or(""), params.raca.as_deref())
        })
        .cloned()
        .collect();
    matches.sort_by_key(|pet| pet.id);
    Json(paginate(
        matches,
        params.page.unwrap_or(0),
        params.size.unwrap_or(10),
    ))
}

async fn create_pet(State(state): State<AppState>, Json(body): Json<serde_json::Value>) -> Response {
    let mut store = state.store.write().await;
    store.writes.push(body.clone());
    if state.config.legacy_writes {
        if let Some(rejection) = reject_unknown_field(&body, "especie") {
            return rejection;
        }
    }
    let write: PetWrite = match serde_json::from_value(body) {
        Ok(write) => write,
        Err(_) => return bad_request("Payload inválido"),
    };
    let id = store.next_id();
    let record = PetRecord {
        id,
        nome: write.nome,
        especie: write.especie,
        raca: write.raca,
        idade: write.idade,
        foto: None,
    };
    store.pets.insert(id, record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_pet(State(state): State<AppState>, Path(pet_id): Path<i64>) -> Response {
    let store = state.store.read().await;
    let Some(record) = store.pets.get(&pet_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let tutores = store
        .links
        .iter()
        .filter(|(_, linked_pet)| *linked_pet == pet_id)
        .filter_map(|(tutor_id, _)| store.tutores.get(tutor_id).cloned())
        .collect();
    Json(PetDetail {
        pet: record.clone(),
        tutores,
    })
    .into_response()
}

async fn update_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut store = state.store.write().await;
    store.writes.push(body.clone());
    if state.config.legacy_writes {
        if let Some(rejection) = reject_unknown_field(&body, "especie") {
            return rejection;
        }
    }
    let write: PetWrite = match serde_json::from_value(body) {
        Ok(write) => write,
        Err(_) => return bad_request("Payload inválido"),
    };
    let Some(record) = store.pets.get_mut(&pet_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    record.nome = write.nome;
    record.especie = write.especie;
    record.raca = write.raca;
    record.idade = write.idade;
    Json(record.clone()).into_response()
}

async fn delete_pet(State(state): State<AppState>, Path(pet_id): Path<i64>) -> Response {
    let mut store = state.store.write().await;
    match state.config.delete_behavior {
        DeleteBehavior::Normal => {
            if store.pets.remove(&pet_id).is_some() {
                store.links.retain(|(_, linked_pet)| *linked_pet != pet_id);
                StatusCode::NO_CONTENT.into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }
        DeleteBehavior::FailAfterRemove => {
            store.pets.remove(&pet_id);
            store.links.retain(|(_, linked_pet)| *linked_pet != pet_id);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        DeleteBehavior::FailAndKeep => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn add_pet_photo(
    State(state): State<AppState>,
    Path(pet_id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let Some((nome, content_type)) = read_photo_field(multipart).await else {
        return bad_request("Campo foto ausente");
    };
    let mut store = state.store.write().await;
    if !store.pets.contains_key(&pet_id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let id = store.next_id();
    let foto = FotoRecord {
        url: format!("/static/fotos/{id}/{nome}"),
        id,
        nome,
        content_type,
    };
    if let Some(record) = store.pets.get_mut(&pet_id) {
        record.foto = Some(foto.clone());
    }
    Json(foto).into_response()
}

async fn delete_pet_photo(
    State(state): State<AppState>,
    Path((pet_id, foto_id)): Path<(i64, i64)>,
) -> StatusCode {
    let mut store = state.store.write().await;
    let Some(record) = store.pets.get_mut(&pet_id) else {
        return StatusCode::NOT_FOUND;
    };
    match &record.foto {
        Some(foto) if foto.id == foto_id => {
            record.foto = None;
            StatusCode::NO_CONTENT
        }
        _ => StatusCode::NOT_FOUND,
    }
}

async fn list_tutores(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
    Query(params): Query<ListParams>,
) -> Json<PageResponse<TutorRecord>> {
    let mut store = state.store.write().await;
    store.last_query = raw;
    let mut matches: Vec<TutorRecord> = store
        .tutores
        .values()
        .filter(|tutor| matches_filter(&tutor.nome, params.nome.as_deref()))
        .cloned()
        .collect();
    matches.sort_by_key(|tutor| tutor.id);
    Json(paginate(
        matches,
        params.page.unwrap_or(0),
        params.size.unwrap_or(10),
    ))
}

async fn create_tutor(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut store = state.store.write().await;
    store.writes.push(body.clone());
    if state.config.legacy_writes {
        if let Some(rejection) = reject_unknown_field(&body, "cpf") {
            return rejection;
        }
    }
    let write: TutorWrite = match serde_json::from_value(body) {
        Ok(write) => write,
        Err(_) => return bad_request("Payload inválido"),
    };
    let id = store.next_id();
    let record = TutorRecord {
        id,
        nome: write.nome,
        telefone: write.telefone,
        email: write.email,
        endereco: write.endereco,
        cpf: write.cpf,
        foto: None,
    };
    store.tutores.insert(id, record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn get_tutor(State(state): State<AppState>, Path(tutor_id): Path<i64>) -> Response {
    let store = state.store.read().await;
    let Some(record) = store.tutores.get(&tutor_id) else {
        return missing_tutor_status(&state.config).into_response();
    };
    let pets = store
        .links
        .iter()
        .filter(|(linked_tutor, _)| *linked_tutor == tutor_id)
        .filter_map(|(_, pet_id)| store.pets.get(pet_id).cloned())
        .collect();
    Json(TutorDetail {
        tutor: record.clone(),
        pets,
    })
    .into_response()
}

async fn update_tutor(
    State(state): State<AppState>,
    Path(tutor_id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut store = state.store.write().await;
    store.writes.push(body.clone());
    if state.config.legacy_writes {
        if let Some(rejection) = reject_unknown_field(&body, "cpf") {
            return rejection;
        }
    }
    let write: TutorWrite = match serde_json::from_value(body) {
        Ok(write) => write,
        Err(_) => return bad_request("Payload inválido"),
    };
    let Some(record) = store.tutores.get_mut(&tutor_id) else {
        return missing_tutor_status(&state.config).into_response();
    };
    record.nome = write.nome;
    record.telefone = write.telefone;
    record.email = write.email;
    record.endereco = write.endereco;
    record.cpf = write.cpf;
    Json(record.clone()).into_response()
}

async fn delete_tutor(State(state): State<AppState>, Path(tutor_id): Path<i64>) -> Response {
    let mut store = state.store.write().await;
    match state.config.delete_behavior {
        DeleteBehavior::Normal => {
            if store.tutores.remove(&tutor_id).is_some() {
                store.links.retain(|(linked_tutor, _)| *linked_tutor != tutor_id);
                StatusCode::NO_CONTENT.into_response()
            } else {
                missing_tutor_status(&state.config).into_response()
            }
        }
        DeleteBehavior::FailAfterRemove => {
            store.tutores.remove(&tutor_id);
            store.links.retain(|(linked_tutor, _)| *linked_tutor != tutor_id);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        DeleteBehavior::FailAndKeep => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn add_tutor_photo(
    State(state): State<AppState>,
    Path(tutor_id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let Some((nome, content_type)) = read_photo_field(multipart).await else {
        return bad_request("Campo foto ausente");
    };
    let mut store = state.store.write().await;
    if !store.tutores.contains_key(&tutor_id) {
        return missing_tutor_status(&state.config).into_response();
    }
    let id = store.next_id();
    let foto = FotoRecord {
        url: format!("/static/fotos/{id}/{nome}"),
        id,
        nome,
        content_type,
    };
    if let Some(record) = store.tutores.get_mut(&tutor_id) {
        record.foto = Some(foto.clone());
    }
    Json(foto).into_response()
}

async fn delete_tutor_photo(
    State(state): State<AppState>,
    Path((tutor_id, foto_id)): Path<(i64, i64)>,
) -> StatusCode {
    let mut store = state.store.write().await;
    let Some(record) = store.tutores.get_mut(&tutor_id) else {
        return StatusCode::NOT_FOUND;
    };
    match &record.foto {
        Some(foto) if foto.id == foto_id => {
            record.foto = None;
            StatusCode::NO_CONTENT
        }
        _ => StatusCode::NOT_FOUND,
    }
}

async fn link_pet(
    State(state): State<AppState>,
    Path((tutor_id, pet_id)): Path<(i64, i64)>,
) -> StatusCode {
    let mut store = state.store.write().await;
    if !store.tutores.contains_key(&tutor_id) || !store.pets.contains_key(&pet_id) {
        return StatusCode::NOT_FOUND;
    }
    store.links.insert((tutor_id, pet_id));
    StatusCode::NO_CONTENT
}

async fn unlink_pet(
    State(state): State<AppState>,
    Path((tutor_id, pet_id)): Path<(i64, i64)>,
) -> StatusCode {
    let mut store = state.store.write().await;
    if store.links.remove(&(tutor_id, pet_id)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// First multipart field named `foto`, as (file name, content type).
async fn read_photo_field(mut multipart: Multipart) -> Option<(String, String)> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("foto") {
            continue;
        }
        let nome = field.file_name().unwrap_or("foto").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        // Drain the part so the request body is fully consumed.
        field.bytes().await.ok()?;
        return Some((nome, content_type));
    }
    None
}

async fn last_query(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.store.read().await;
    Json(serde_json::json!({ "query": store.last_query }))
}

async fn writes(State(state): State<AppState>) -> Json<Vec<serde_json::Value>> {
    let store = state.store.read().await;
    Json(store.writes.clone())
}

async fn fixed_status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn malformed() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        "{\"nome\": \"Luna\"",
    )
}
