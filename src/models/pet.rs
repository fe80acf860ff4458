use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{Photo, Tutor};
use crate::validation;

/// Payload de cadastro e edição de pet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetRequest {
    pub nome: String,
    pub especie: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idade: Option<u32>,
}

/// Registro de pet como aparece nas listagens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: i64,
    pub nome: String,
    pub especie: Option<String>,
    pub raca: Option<String>,
    pub idade: Option<u32>,
    pub foto: Option<Photo>,
}

/// Registro completo de pet, incluindo os tutores vinculados.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetDetails {
    pub id: i64,
    pub nome: String,
    pub especie: Option<String>,
    pub raca: Option<String>,
    pub idade: Option<u32>,
    pub foto: Option<Photo>,
    #[serde(default)]
    pub tutores: Vec<Tutor>,
}

impl PetRequest {
    pub fn new(nome: impl Into<String>, especie: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            especie: especie.into(),
            raca: None,
            idade: None,
        }
    }

    /// Valida os campos antes do envio do formulário.
    pub fn validate(&self) -> Result<(), ApiError> {
        if !validation::is_valid_name(&self.nome) {
            return Err(ApiError::new(
                "Nome deve ter pelo menos 3 caracteres",
                None,
            ));
        }
        if let Some(idade) = self.idade {
            if !validation::is_valid_age(idade) {
                return Err(ApiError::new("Idade deve ser entre 1 e 50", None));
            }
        }
        Ok(())
    }
}

impl PetDetails {
    /// Aplica a resposta de um update sobre o registro selecionado.
    ///
    /// Campos ausentes na resposta mantêm o valor atual; a lista de
    /// tutores nunca é tocada por um update de pet.
    pub fn merge_update(&mut self, update: Pet) {
        self.id = update.id;
        self.nome = update.nome;
        if update.especie.is_some() {
            self.especie = update.especie;
        }
        if update.raca.is_some() {
            self.raca = update.raca;
        }
        if update.idade.is_some() {
            self.idade = update.idade;
        }
        if update.foto.is_some() {
            self.foto = update.foto;
        }
    }
}

impl From<Pet> for PetDetails {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            nome: pet.nome,
            especie: pet.especie,
            raca: pet.raca,
            idade: pet.idade,
            foto: pet.foto,
            tutores: Vec::new(),
        }
    }
}
