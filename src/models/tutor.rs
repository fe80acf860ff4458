use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{Pet, Photo};
use crate::validation;

/// Payload de cadastro e edição de tutor.
///
/// O CPF trafega como número no contrato da API, já sem máscara.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TutorRequest {
    pub nome: String,
    pub telefone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endereco: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<u64>,
}

/// Registro de tutor como aparece nas listagens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tutor {
    pub id: i64,
    pub nome: String,
    pub telefone: String,
    pub email: Option<String>,
    pub endereco: Option<String>,
    pub cpf: Option<u64>,
    pub foto: Option<Photo>,
}

/// Registro completo de tutor, incluindo os pets vinculados.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TutorDetails {
    pub id: i64,
    pub nome: String,
    pub telefone: String,
    pub email: Option<String>,
    pub endereco: Option<String>,
    pub cpf: Option<u64>,
    pub foto: Option<Photo>,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

impl TutorRequest {
    pub fn new(nome: impl Into<String>, telefone: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            telefone: telefone.into(),
            email: None,
            endereco: None,
            cpf: None,
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
        if !validation::is_valid_phone(&self.telefone) {
            return Err(ApiError::new("Telefone inválido", None));
        }
        if let Some(email) = &self.email {
            if !validation::is_valid_email(email) {
                return Err(ApiError::new("E-mail inválido", None));
            }
        }
        if let Some(cpf) = self.cpf {
            if cpf > 99_999_999_999 {
                return Err(ApiError::new("CPF inválido", None));
            }
        }
        Ok(())
    }
}

impl TutorDetails {
    /// Aplica a resposta de um update sobre o registro selecionado.
    ///
    /// Campos ausentes na resposta mantêm o valor atual; a lista de pets
    /// nunca é tocada por um update de tutor.
    pub fn merge_update(&mut self, update: Tutor) {
        self.id = update.id;
        self.nome = update.nome;
        self.telefone = update.telefone;
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.endereco.is_some() {
            self.endereco = update.endereco;
        }
        if update.cpf.is_some() {
            self.cpf = update.cpf;
        }
        if update.foto.is_some() {
            self.foto = update.foto;
        }
    }
}

impl From<Tutor> for TutorDetails {
    fn from(tutor: Tutor) -> Self {
        Self {
            id: tutor.id,
            nome: tutor.nome,
            telefone: tutor.telefone,
            email: tutor.email,
            endereco: tutor.endereco,
            cpf: tutor.cpf,
            foto: tutor.foto,
            pets: Vec::new(),
        }
    }
}
