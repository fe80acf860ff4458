use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{AuthRequest, AuthResponse};

/// Autentica o usuário e guarda os tokens retornados na sessão.
pub async fn login(
    api: &ApiClient,
    username: &str,
    password: &str,
) -> Result<AuthResponse, ApiError> {
    let credentials = AuthRequest {
        username: username.to_string(),
        password: password.to_string(),
    };
    let response: AuthResponse = api
        .post_unauthenticated("/autenticacao/login", &credentials)
        .await?;

    let session = api.session();
    session.set_access_token(&response.access_token);
    session.set_refresh_token(&response.refresh_token);
    session.mark_authenticated();
    log::info!("login completed, tokens stored");

    Ok(response)
}

/// Renova o par de tokens usando o refresh token armazenado.
///
/// Sem refresh token na sessão a chamada falha imediatamente com status
/// 401, sem tocar a rede.
pub async fn refresh_token(api: &ApiClient) -> Result<AuthResponse, ApiError> {
    let Some(refresh) = api.session().refresh_token() else {
        log::warn!("token refresh requested without a stored refresh token");
        return Err(ApiError::new("Refresh token não encontrado", Some(401)));
    };

    let response: AuthResponse = api.put_with_bearer("/autenticacao/refresh", &refresh).await?;

    let session = api.session();
    session.set_access_token(&response.access_token);
    session.set_refresh_token(&response.refresh_token);
    log::debug!("token pair rotated");

    Ok(response)
}

/// Encerra a sessão localmente; nenhuma chamada de rede é feita.
pub fn logout(api: &ApiClient) {
    api.session().clear();
    log::info!("session cleared");
}
