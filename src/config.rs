//! Configuração do regwizard carregada a partir de `regwizard.toml`.
//!
//! A struct [`WizardConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! A variável de ambiente `REGWIZARD_URL` tem precedência sobre o arquivo.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Em qual situação o assistente foi invocado. Controla quais passos do
/// fluxo realmente executam trabalho.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Sistema instalado e em execução.
    Normal,
    /// Dentro do instalador; a instalação de pacotes fica com o produto base.
    Installation,
    /// Atualização de uma instalação existente.
    Update,
}

/// Configuração de nível superior carregada de `regwizard.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WizardConfig {
    /// URL base do servidor de registro.
    #[serde(default = "default_url")]
    pub url: String,

    /// E-mail pré-preenchido no formulário de registro.
    #[serde(default)]
    pub email: String,

    /// Código de registro pré-preenchido no formulário.
    #[serde(default)]
    pub reg_code: String,

    /// Aceita certificados autoassinados do servidor de registro.
    #[serde(default)]
    pub insecure: bool,

    /// Onde as credenciais de sistema são gravadas após a ativação.
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,

    /// Descritor do produto base instalado.
    #[serde(default = "default_base_product_path")]
    pub base_product_path: String,

    /// Raiz do sistema de destino montado no modo de atualização.
    #[serde(default = "default_target_root")]
    pub target_root: String,

    /// Comando do gerenciador de pacotes invocado para os add-ons escolhidos.
    #[serde(default = "default_pkg_command")]
    pub pkg_command: String,

    /// Timeout das requisições HTTP, em segundos.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Servidor de registro público do produto.
fn default_url() -> String {
    "https://connect.example.com".to_string()
}

fn default_credentials_path() -> String {
    "/etc/regwizard/credentials".to_string()
}

fn default_base_product_path() -> String {
    "/etc/products.d/baseproduct.json".to_string()
}

fn default_target_root() -> String {
    "/mnt".to_string()
}

fn default_pkg_command() -> String {
    "zypper".to_string()
}

// Timeout generoso: a ativação pode esperar pela criação do sistema no servidor.
fn default_timeout_secs() -> u64 {
    120
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            email: String::new(),
            reg_code: String::new(),
            insecure: false,
            credentials_path: default_credentials_path(),
            base_product_path: default_base_product_path(),
            target_root: default_target_root(),
            pkg_command: default_pkg_command(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WizardConfig {
    /// Carrega a configuração de `regwizard.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        let path = Path::new("regwizard.toml");
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<WizardConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para a URL.
        if let Ok(url) = std::env::var("REGWIZARD_URL")
            && !url.is_empty()
        {
            config.url = url;
        }

        Ok(config)
    }
}
