//! Interface de terminal do regwizard — spinners e diálogos coloridos.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O trait [`WizardUi`] é a capacidade de UI
//! injetada nos passos do assistente: `render` desenha um diálogo e
//! `await_input` devolve o próximo evento do usuário, o que permite trocar
//! o terminal real por uma implementação roteirizada nos testes.

use std::collections::HashMap;

use console::{Style, Term};
use indicatif::{ProgressBar, ProgressStyle};

use crate::connect::{Addon, Credentials};

/// Um diálogo do assistente, descrito de forma declarativa.
#[derive(Debug)]
pub enum Dialog<'a> {
    /// Mensagem de progresso exibida com spinner.
    Progress { message: &'a str },
    /// Aviso informativo.
    Info { message: &'a str },
    /// Relato de erro; o fluxo decide se o diálogo anterior é reexibido.
    Error { message: &'a str },
    /// Formulário de registro do sistema base.
    RegistrationForm {
        url: &'a str,
        credentials: &'a Credentials,
    },
    /// Sistema já registrado: manter, registrar de novo ou ir às extensões.
    RegisteredSystem,
    /// Seleção de add-ons com filtro de versões beta.
    AddonSelection {
        addons: &'a [Addon],
        selected: &'a [bool],
        filter_beta: bool,
    },
    /// Texto de licença de um add-on selecionado.
    Eula { addon: &'a Addon, text: &'a str },
    /// Entrada de códigos de registro para os add-ons não gratuitos.
    RegCodes {
        addons: &'a [&'a Addon],
        known: &'a HashMap<String, String>,
    },
}

/// Evento produzido pelo usuário em resposta ao último diálogo exibido.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    Next,
    Back,
    Abort,
    Cancel,
    Skip,
    /// Alterna a seleção do add-on no índice dado.
    Toggle(usize),
    /// Define o estado do filtro de versões beta.
    FilterBeta(bool),
    /// Credenciais submetidas no formulário de registro.
    Credentials(Credentials),
    /// Códigos de registro submetidos, por identificador de add-on.
    RegCodes(HashMap<String, String>),
    /// Licença aceita.
    Accept,
    /// Licença recusada.
    Decline,
    /// Registrar o sistema novamente (diálogo de sistema registrado).
    Reregister,
    /// Ir direto para a seleção de extensões.
    Extensions,
}

/// Capacidade de UI dos passos do assistente.
pub trait WizardUi {
    fn render(&mut self, dialog: &Dialog<'_>);
    fn await_input(&mut self) -> UserEvent;
}

// Decide como a próxima linha digitada vira um [`UserEvent`].
enum Awaiting {
    Commands,
    Form,
    Registered,
    Selection { count: usize, filter_beta: bool },
    Eula,
    RegCodes(Vec<String>),
}

/// Implementação de [`WizardUi`] para o terminal interativo.
///
/// Diálogos são impressos com `console`; o progresso de rede usa um spinner
/// do `indicatif`, finalizado no próximo diálogo ou entrada.
pub struct TermUi {
    term: Term,
    spinner: Option<ProgressBar>,
    awaiting: Awaiting,
    bold: Style,
    green: Style,
    red: Style,
    yellow: Style,
}

impl TermUi {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            spinner: None,
            awaiting: Awaiting::Commands,
            bold: Style::new().bold(),
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn start_spinner(&mut self, message: &str) {
        self.finish_spinner();
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn read_line(&self, prompt: &str) -> String {
        print!("{prompt}");
        use std::io::Write;
        let _ = std::io::stdout().flush();
        self.term.read_line().unwrap_or_default().trim().to_string()
    }

    // Comandos de navegação válidos em qualquer diálogo.
    fn navigation(input: &str) -> Option<UserEvent> {
        match input {
            "next" | "n" | "" => Some(UserEvent::Next),
            "back" | "b" => Some(UserEvent::Back),
            "abort" | "a" => Some(UserEvent::Abort),
            "cancel" | "c" => Some(UserEvent::Cancel),
            "skip" | "s" => Some(UserEvent::Skip),
            _ => None,
        }
    }
}

impl Default for TermUi {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardUi for TermUi {
    fn render(&mut self, dialog: &Dialog<'_>) {
        match dialog {
            Dialog::Progress { message } => {
                self.start_spinner(message);
                return;
            }
            Dialog::Info { message } => {
                self.finish_spinner();
                println!("  {} {message}", self.green.apply_to("•"));
                return;
            }
            Dialog::Error { message } => {
                self.finish_spinner();
                println!("  {} {message}", self.red.apply_to("✗"));
                return;
            }
            Dialog::RegistrationForm { url, credentials } => {
                self.finish_spinner();
                println!();
                println!("{}", self.bold.apply_to("─── System Registration ───"));
                println!("Registration server: {url}");
                if !credentials.email.is_empty() {
                    println!("E-mail [{}]", credentials.email);
                }
                println!("Enter your credentials, or \"skip\" to register later.");
                self.awaiting = Awaiting::Form;
            }
            Dialog::RegisteredSystem => {
                self.finish_spinner();
                println!();
                println!("{}", self.bold.apply_to("─── System Already Registered ───"));
                println!("  [n]ext        keep the current registration");
                println!("  [r]egister    register the system again");
                println!("  [e]xtensions  select additional modules");
                println!("  [a]bort");
                self.awaiting = Awaiting::Registered;
            }
            Dialog::AddonSelection {
                addons,
                selected,
                filter_beta,
            } => {
                self.finish_spinner();
                println!();
                println!("{}", self.bold.apply_to("─── Available Extensions and Modules ───"));
                for (index, addon) in addons.iter().enumerate() {
                    let mark = if selected.get(index).copied().unwrap_or(false) {
                        "[x]"
                    } else {
                        "[ ]"
                    };
                    let mut label = addon.label();
                    if addon.beta {
                        label = format!("{label} {}", self.yellow.apply_to("(beta)"));
                    }
                    if !addon.free {
                        label = format!("{label} — registration code required");
                    }
                    println!("  {mark} {:2}. {label}", index + 1);
                }
                let filter = if *filter_beta { "on" } else { "off" };
                println!("Toggle by number, [f]ilter beta ({filter}), [n]ext, [c]ancel, [a]bort.");
                self.awaiting = Awaiting::Selection {
                    count: addons.len(),
                    filter_beta: *filter_beta,
                };
            }
            Dialog::Eula { addon, text } => {
                self.finish_spinner();
                println!();
                println!("{}", self.bold.apply_to(format!("─── License Agreement: {} ───", addon.label())));
                println!("{text}");
                println!("Accept the license? [y]es / [no] returns to the selection / [a]bort.");
                self.awaiting = Awaiting::Eula;
            }
            Dialog::RegCodes { addons, known } => {
                self.finish_spinner();
                println!();
                println!("{}", self.bold.apply_to("─── Extension Registration Codes ───"));
                for addon in addons.iter() {
                    let prefilled = known
                        .get(&addon.identifier)
                        .map(|code| format!(" [{code}]"))
                        .unwrap_or_default();
                    println!("  {}{prefilled}", addon.label());
                }
                self.awaiting = Awaiting::RegCodes(
                    addons.iter().map(|addon| addon.identifier.clone()).collect(),
                );
            }
        }
    }

    fn await_input(&mut self) -> UserEvent {
        self.finish_spinner();
        match std::mem::replace(&mut self.awaiting, Awaiting::Commands) {
            Awaiting::Commands => {
                let input = self.read_line("> ").to_lowercase();
                Self::navigation(&input).unwrap_or(UserEvent::Next)
            }
            Awaiting::Form => {
                let email = self.read_line("E-mail: ");
                // "skip", "back" e "abort" valem já no primeiro campo.
                match Self::navigation(&email.to_lowercase()) {
                    Some(
                        event @ (UserEvent::Skip
                        | UserEvent::Back
                        | UserEvent::Abort
                        | UserEvent::Cancel),
                    ) => return event,
                    _ => {}
                }
                let reg_code = self.read_line("Registration code: ");
                UserEvent::Credentials(Credentials { email, reg_code })
            }
            Awaiting::Registered => {
                let input = self.read_line("> ").to_lowercase();
                match input.as_str() {
                    "register" | "r" => UserEvent::Reregister,
                    "extensions" | "e" => UserEvent::Extensions,
                    other => Self::navigation(other).unwrap_or(UserEvent::Next),
                }
            }
            Awaiting::Selection { count, filter_beta } => {
                let input = self.read_line("> ").to_lowercase();
                if let Ok(number) = input.parse::<usize>()
                    && number >= 1
                    && number <= count
                {
                    // Reexibido pelo fluxo com a seleção atualizada.
                    self.awaiting = Awaiting::Selection { count, filter_beta };
                    return UserEvent::Toggle(number - 1);
                }
                if input == "f" || input == "filter" {
                    self.awaiting = Awaiting::Selection { count, filter_beta };
                    return UserEvent::FilterBeta(!filter_beta);
                }
                Self::navigation(&input).unwrap_or(UserEvent::Next)
            }
            Awaiting::Eula => {
                let input = self.read_line("> ").to_lowercase();
                match input.as_str() {
                    "yes" | "y" | "" => UserEvent::Accept,
                    "no" | "n" => UserEvent::Decline,
                    "abort" | "a" => UserEvent::Abort,
                    _ => UserEvent::Decline,
                }
            }
            Awaiting::RegCodes(identifiers) => {
                let mut codes = HashMap::new();
                for identifier in identifiers {
                    let input = self.read_line(&format!("Code for {identifier}: "));
                    let lowered = input.to_lowercase();
                    if lowered == "back" || lowered == "b" {
                        return UserEvent::Back;
                    }
                    if lowered == "abort" || lowered == "a" {
                        return UserEvent::Abort;
                    }
                    if !input.is_empty() {
                        codes.insert(identifier, input);
                    }
                }
                UserEvent::RegCodes(codes)
            }
        }
    }
}
