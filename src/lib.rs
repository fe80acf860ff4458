//! # Pet Manager Client
//!
//! Camada de sincronização de dados do gerenciador de pets e tutores.
//!
//! This crate provides:
//! - A thin HTTP wrapper around the management API with session handling
//! - Resource services for pets, tutores and authentication
//! - An observable facade that publishes list and detail state over
//!   watch channels
//!
//! ## Separation of Concerns
//!
//! This crate focuses solely on data synchronization. It does **not**:
//! - Render any UI (screens subscribe to the facade channels)
//! - Persist tokens to disk (the application exports and restores the
//!   session snapshot)
//! - Decide navigation (callers react to published state)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use pet_manager_client::{ApiClient, ApiConfig, AppFacade, PetListParams, Session};
//!
//! let api = ApiClient::new(ApiConfig::from_env(), Session::new())?;
//! pet_manager_client::services::login(&api, "admin", "secret").await?;
//!
//! let facade = AppFacade::new(api);
//! let mut pets = facade.subscribe_pets();
//! facade.load_pets(PetListParams::default()).await?;
//! println!("loaded {} pets", pets.borrow_and_update().len());
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod facade;
pub mod models;
pub mod services;
pub mod session;
pub mod validation;

pub use api::{ApiClient, AuthMode, RequestBody, RequestOptions};
pub use config::ApiConfig;
pub use error::ApiError;
pub use facade::{
    AppFacade, DetailState, ListState, PetListParams, TutorListParams, PETS_LOAD_ERROR,
    PET_NOT_FOUND, SESSION_EXPIRED, TUTORES_LOAD_ERROR, TUTOR_NOT_FOUND,
};
pub use models::{
    AuthRequest, AuthResponse, Paged, Pet, PetDetails, PetRequest, Photo, PhotoUpload, Tutor,
    TutorDetails, TutorRequest,
};
pub use session::{Session, StoredTokens};
