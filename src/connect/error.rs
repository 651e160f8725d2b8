//! Tipos de erro para o cliente do servidor de registro.
//!
//! Define [`ConnectError`] com variantes para código de registro rejeitado,
//! erros da API e erros de rede. Usa `thiserror` para derivar `Display` e
//! `Error` automaticamente a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao falar com o servidor de registro.
///
/// As variantes cobrem os três cenários de falha que o assistente trata:
/// - [`InvalidRegCode`](ConnectError::InvalidRegCode) — o servidor rejeitou
///   o código de registro (HTTP 401/422)
/// - [`ApiError`](ConnectError::ApiError) — qualquer outro erro HTTP (4xx/5xx)
/// - [`NetworkError`](ConnectError::NetworkError) — falha na camada de rede
#[derive(Debug, Error)]
pub enum ConnectError {
    /// O servidor rejeitou o código de registro. Contém a mensagem do corpo
    /// da resposta, exibida ao usuário para nova tentativa manual.
    #[error("registration code rejected: {0}")]
    InvalidRegCode(String),

    /// Erro retornado pela API (ex.: 404 produto desconhecido, 500 erro
    /// interno). Contém o código de status HTTP e a mensagem da resposta.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
