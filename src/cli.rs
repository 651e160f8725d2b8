//! Interface de linha de comando do regwizard baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (register,
//! extensions, status, demo) e flags globais (--url, --mode, --verbose).

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Mode;

/// regwizard — assistente de registro do sistema no servidor de entitlements.
#[derive(Debug, Parser)]
#[command(name = "regwizard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// URL do servidor de registro (tem precedência sobre configuração e
    /// variável de ambiente).
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Em qual situação o assistente roda.
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    /// Habilita saída detalhada (registro da execução em JSON).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Modo aceito pela CLI, mapeado para [`Mode`](crate::config::Mode)
/// internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Sistema instalado e em execução.
    Normal,
    /// Dentro do instalador.
    Installation,
    /// Atualização de uma instalação existente.
    Update,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Normal => Mode::Normal,
            ModeArg::Installation => Mode::Installation,
            ModeArg::Update => Mode::Update,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Executa o assistente completo de registro.
    Register,

    /// Vai direto à seleção de extensões de um sistema registrado.
    Extensions,

    /// Mostra o estado de registro do sistema.
    Status,

    /// Executa a demonstração embutida do fluxo contra um servidor simulado.
    Demo,
}
