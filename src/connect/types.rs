//! Tipos de dados para requisições e respostas do servidor de registro.
//!
//! Todas as structs derivam `Serialize` e `Deserialize` para conversão JSON
//! conforme o formato esperado pelos endpoints `/systems/*` do servidor.

use serde::{Deserialize, Serialize};

/// Credenciais informadas pelo usuário para ativar o produto base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// E-mail da conta no servidor de registro.
    pub email: String,
    /// Código de registro (subscrição) do produto base.
    pub reg_code: String,
}

/// Um produto conhecido pelo servidor de registro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Identificador estável do produto (ex.: "openunity").
    pub identifier: String,
    /// Nome de exibição.
    pub name: String,
    pub version: String,
    pub arch: String,
}

/// Um módulo opcional (add-on) disponível para o sistema registrado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub identifier: String,
    pub name: String,
    pub version: String,
    pub arch: String,
    /// Add-ons gratuitos não exigem código de registro.
    pub free: bool,
    /// Versões beta podem ser ocultadas pelo filtro do diálogo de seleção.
    #[serde(default)]
    pub beta: bool,
    /// Add-ons recomendados são pré-selecionados na primeira exibição.
    #[serde(default)]
    pub recommended: bool,
    #[serde(default)]
    pub description: String,
    /// URL do texto da licença, quando o add-on exige aceitação.
    #[serde(default)]
    pub eula_url: Option<String>,
}

impl Addon {
    /// Rótulo curto para listagens no terminal.
    pub fn label(&self) -> String {
        format!("{} {} ({})", self.name, self.version, self.arch)
    }
}

/// Corpo da requisição `POST /systems/activate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationRequest {
    pub email: String,
    pub reg_code: String,
}

/// Resposta da ativação do produto base: identidade do sistema criada pelo
/// servidor mais o produto ativado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivatedProduct {
    /// Identificador numérico do sistema no servidor.
    pub id: u64,
    /// Login de sistema emitido pelo servidor.
    pub login: String,
    /// Senha de sistema emitida pelo servidor.
    pub password: String,
    /// Produto base ativado.
    pub product: Product,
}

/// Credenciais de sistema usadas nas chamadas autenticadas (HTTP basic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductHandle {
    pub login: String,
    pub password: String,
}

impl From<&ActivatedProduct> for ProductHandle {
    fn from(activated: &ActivatedProduct) -> Self {
        Self {
            login: activated.login.clone(),
            password: activated.password.clone(),
        }
    }
}

/// Corpo da requisição `POST /systems/addons`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonRegistrationRequest {
    pub identifier: String,
    pub version: String,
    pub arch: String,
    /// Ausente para add-ons gratuitos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_code: Option<String>,
}

/// Corpo de erro retornado pelo servidor (`{"error": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: String,
}
