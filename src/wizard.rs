use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::{Mode, WizardConfig};
use crate::connect::{Addon, ConnectError, Credentials, EntitlementService, ProductHandle};
use crate::context::WizardContext;
use crate::credentials;
use crate::dialogs::{self, EulaDecision, RegCodesDecision, RegistrationDecision};
use crate::pkg::PackageManager;
use crate::sequencer::{
    Outcome, Sequencer, SequencerError, StepRunner, Target, TerminalResult, TransitionTable,
};
use crate::ui::{Dialog, WizardUi};

const CONTACTING_MESSAGE: &str = "Contacting the registration server...";

/// Structured record of one wizard run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub mode: Mode,
    pub result: TerminalResult,
    pub steps: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Drives the registration workflow against its collaborators: the
/// entitlement service, the UI capability and the package manager.
pub struct RegistrationWizard<S, U, P> {
    pub service: S,
    pub ui: U,
    pub pkg: P,
    pub config: WizardConfig,
    pub mode: Mode,
    pub ctx: WizardContext,
    visited: Vec<String>,
}

impl<S, U, P> RegistrationWizard<S, U, P>
where
    S: EntitlementService,
    U: WizardUi,
    P: PackageManager,
{
    pub fn new(service: S, ui: U, pkg: P, config: WizardConfig, mode: Mode) -> Self {
        let prefill = Credentials {
            email: config.email.clone(),
            reg_code: config.reg_code.clone(),
        };
        Self {
            service,
            ui,
            pkg,
            config,
            mode,
            ctx: WizardContext::new(prefill),
            visited: Vec::new(),
        }
    }

    /// The workflow wiring: which outcome of which step leads where.
    pub fn transition_table() -> TransitionTable {
        let steps = [
            "check",
            "update",
            "register",
            "select_addons",
            "addon_eula",
            "register_addons",
            "update_autoyast_config",
            "pkg_manager",
        ];

        let mut table = TransitionTable::new();
        for step in steps {
            table.insert(step, Outcome::Abort, Target::Terminal(TerminalResult::Abort));
            // Cancelling aborts everywhere except the add-on selection,
            // which returns to the workflow entry instead.
            if step != "select_addons" {
                table.insert(step, Outcome::Cancel, Target::Terminal(TerminalResult::Abort));
            }
        }

        table.insert("check", Outcome::Auto, Target::Terminal(TerminalResult::Auto));
        table.insert("check", Outcome::Register, Target::Step("register".into()));
        table.insert("check", Outcome::Extensions, Target::Step("select_addons".into()));
        table.insert("check", Outcome::Update, Target::Step("update".into()));
        table.insert("check", Outcome::Next, Target::Terminal(TerminalResult::Next));

        table.insert("update", Outcome::Next, Target::Step("select_addons".into()));
        table.insert("update", Outcome::Register, Target::Step("register".into()));

        table.insert("register", Outcome::Skip, Target::Terminal(TerminalResult::Next));
        table.insert("register", Outcome::Next, Target::Step("select_addons".into()));

        table.insert("select_addons", Outcome::Skip, Target::Step("update_autoyast_config".into()));
        table.insert("select_addons", Outcome::Cancel, Target::Step("check".into()));
        table.insert("select_addons", Outcome::Next, Target::Step("addon_eula".into()));

        table.insert("addon_eula", Outcome::Next, Target::Step("register_addons".into()));
        table.insert("register_addons", Outcome::Next, Target::Step("update_autoyast_config".into()));
        table.insert("update_autoyast_config", Outcome::Next, Target::Step("pkg_manager".into()));
        table.insert("pkg_manager", Outcome::Next, Target::Terminal(TerminalResult::Next));

        table
    }

    /// Which step the wizard opens with: straight to the extension
    /// selection on an already-registered system, otherwise the check.
    fn start_step(&self, extensions: bool) -> &'static str {
        if extensions && credentials::is_registered(&self.credentials_path()) {
            "select_addons"
        } else {
            "check"
        }
    }

    fn credentials_path(&self) -> PathBuf {
        PathBuf::from(&self.config.credentials_path)
    }

    /// Run the whole workflow and produce its record.
    pub async fn run(&mut self, extensions: bool) -> Result<RunRecord, SequencerError> {
        let started_at = Utc::now();
        let sequencer = Sequencer::new(Self::transition_table())?;
        let start = self.start_step(extensions);

        let result = sequencer.run(self, start).await?;

        let completed_at = Utc::now();
        Ok(RunRecord {
            run_id: Uuid::new_v4().to_string(),
            mode: self.mode,
            result,
            steps: std::mem::take(&mut self.visited),
            started_at,
            completed_at,
            duration_ms: (completed_at - started_at).num_milliseconds(),
        })
    }

    // -- step actions -------------------------------------------------

    /// Decide how the workflow starts: refresh an old registration, show
    /// the registered-system dialog, or register from scratch.
    async fn registration_check(&mut self) -> Outcome {
        if self.pkg.find_base_product().is_none() {
            self.report_no_base_product();
            return if self.mode == Mode::Normal {
                Outcome::Abort
            } else {
                Outcome::Auto
            };
        }

        if self.mode == Mode::Update {
            self.ui.render(&Dialog::Progress {
                message: "Looking for a previous registration...",
            });
            let path = self.credentials_path();
            if let Err(err) =
                credentials::copy_from_target(Path::new(&self.config.target_root), &path)
            {
                self.ui.render(&Dialog::Error {
                    message: &format!("{err:#}"),
                });
            }
            if credentials::is_registered(&path) {
                return Outcome::Update;
            }
        }

        if self.mode == Mode::Normal && credentials::is_registered(&self.credentials_path()) {
            return dialogs::registered_system_dialog(&mut self.ui);
        }

        Outcome::Register
    }

    fn report_no_base_product(&mut self) {
        let mut message = String::from("The base product was not found, check your system.\n");
        if self.mode == Mode::Installation {
            message.push_str("The installation medium or the installer itself is seriously broken.");
        } else {
            message.push_str(&format!(
                "Make sure a product is installed and {} describes the base product.",
                self.config.base_product_path
            ));
        }
        self.ui.render(&Dialog::Error { message: &message });
    }

    /// Refresh an existing registration during a system upgrade.
    async fn update_registration(&mut self) -> Outcome {
        self.ui.render(&Dialog::Progress {
            message: "The previous registration is being updated...",
        });
        let Some(handle) = self.ensure_handle() else {
            return Outcome::Cancel;
        };

        if let Err(err) = self.service.update_system(&handle).await {
            return self.failed_update(err);
        }
        match self.service.list_addons(&handle).await {
            Ok(addons) => {
                self.ctx.available_addons = Some(addons);
                Outcome::Next
            }
            Err(err) => self.failed_update(err),
        }
    }

    fn failed_update(&mut self, err: ConnectError) -> Outcome {
        // Drop the cached handle so registering from scratch can pick a
        // different server.
        self.ctx.handle = None;
        self.ctx.available_addons = None;
        self.ui.render(&Dialog::Error {
            message: &format!(
                "Automatic registration upgrade failed ({err}).\n\
                 You can manually register the system from scratch."
            ),
        });
        Outcome::Register
    }

    /// Base-system registration form; retries until activation succeeds or
    /// the user navigates away.
    async fn register_base_system(&mut self) -> Outcome {
        loop {
            let decision = dialogs::base_registration_dialog(
                &mut self.ui,
                &self.config.url,
                &self.ctx.credentials,
            );
            let submitted = match decision {
                RegistrationDecision::Submit(credentials) => credentials,
                RegistrationDecision::Skip => return Outcome::Skip,
                RegistrationDecision::Back => return Outcome::Back,
                RegistrationDecision::Abort => return Outcome::Abort,
            };
            self.ctx.credentials = submitted.clone();

            self.ui.render(&Dialog::Progress {
                message: CONTACTING_MESSAGE,
            });
            match self.service.activate_base(&submitted).await {
                Ok(activated) => {
                    let handle = ProductHandle::from(&activated);
                    if let Err(err) = credentials::write(&self.credentials_path(), &handle) {
                        self.ui.render(&Dialog::Error {
                            message: &format!("{err:#}"),
                        });
                    }
                    self.ctx.handle = Some(handle);
                    self.ctx.base_registered = true;
                    self.ui.render(&Dialog::Info {
                        message: &format!("{} has been registered", activated.product.name),
                    });
                    return Outcome::Next;
                }
                // Server rejections and network failures are reported and
                // the form is shown again for a manual retry.
                Err(err) => self.ui.render(&Dialog::Error {
                    message: &err.to_string(),
                }),
            }
        }
    }

    /// Let the user pick optional modules. The catalog is cached in the
    /// context so back-and-forth navigation does not reload it.
    async fn select_addons(&mut self) -> Outcome {
        let Some(handle) = self.ensure_handle() else {
            return Outcome::Cancel;
        };

        let fresh_catalog = self.ctx.available_addons.is_none();
        if fresh_catalog {
            self.ui.render(&Dialog::Progress {
                message: CONTACTING_MESSAGE,
            });
            match self.service.list_addons(&handle).await {
                Ok(addons) => self.ctx.available_addons = Some(addons),
                Err(err) => {
                    self.ui.render(&Dialog::Error {
                        message: &err.to_string(),
                    });
                    return Outcome::Cancel;
                }
            }
        }

        let addons = self.ctx.available_addons.clone().unwrap_or_default();
        let mut selected: Vec<bool> = addons
            .iter()
            .map(|addon| {
                self.ctx
                    .selected
                    .iter()
                    .any(|picked| picked.identifier == addon.identifier)
                    || (fresh_catalog && addon.recommended)
            })
            .collect();

        let outcome = dialogs::addon_selection_dialog(
            &mut self.ui,
            &addons,
            &mut selected,
            &mut self.ctx.filter_beta,
        );

        self.ctx.selected = addons
            .iter()
            .zip(&selected)
            .filter(|&(_, &picked)| picked)
            .map(|(addon, _)| addon.clone())
            .collect();

        outcome
    }

    /// Require acceptance of every selected add-on license. Declining
    /// returns to the selection dialog.
    async fn addon_eula(&mut self) -> Outcome {
        let selected = self.ctx.selected.clone();
        for addon in &selected {
            let Some(url) = addon.eula_url.as_deref() else {
                continue;
            };
            self.ui.render(&Dialog::Progress {
                message: "Downloading the license agreement...",
            });
            let text = match self.service.fetch_eula(url).await {
                Ok(text) => text,
                Err(err) => {
                    self.ui.render(&Dialog::Error {
                        message: &err.to_string(),
                    });
                    return Outcome::Back;
                }
            };
            match dialogs::addon_eula_dialog(&mut self.ui, addon, &text) {
                EulaDecision::Accepted => {}
                EulaDecision::Declined => return Outcome::Back,
                EulaDecision::Aborted => return Outcome::Abort,
            }
        }
        Outcome::Next
    }

    /// Collect registration codes and register every selected add-on.
    async fn register_addons(&mut self) -> Outcome {
        let Some(handle) = self.ensure_handle() else {
            return Outcome::Cancel;
        };
        let selected = self.ctx.selected.clone();

        loop {
            let needing_codes: Vec<&Addon> =
                selected.iter().filter(|addon| !addon.free).collect();
            if !needing_codes.is_empty() {
                match dialogs::addon_regcodes_dialog(
                    &mut self.ui,
                    &needing_codes,
                    &self.ctx.known_reg_codes,
                ) {
                    RegCodesDecision::Submitted(codes) => {
                        self.ctx.known_reg_codes.extend(codes);
                    }
                    RegCodesDecision::Back => return Outcome::Back,
                    RegCodesDecision::Abort => return Outcome::Abort,
                }
            }

            let mut failed = false;
            for addon in &selected {
                self.ui.render(&Dialog::Progress {
                    message: &format!("Registering {}...", addon.label()),
                });
                let code = self
                    .ctx
                    .known_reg_codes
                    .get(&addon.identifier)
                    .map(String::as_str);
                match self.service.register_addon(&handle, addon, code).await {
                    Ok(()) => self.ui.render(&Dialog::Info {
                        message: &format!("{} has been registered", addon.label()),
                    }),
                    Err(err) => {
                        self.ui.render(&Dialog::Error {
                            message: &err.to_string(),
                        });
                        failed = true;
                        break;
                    }
                }
            }

            if !failed {
                return Outcome::Next;
            }
            if needing_codes.is_empty() {
                // Nothing the user could correct here; let them revisit
                // the selection.
                return Outcome::Back;
            }
        }
    }

    /// Export the run's choices for unattended reinstallation.
    fn update_autoyast_config(&mut self) -> Outcome {
        if self.mode == Mode::Installation && self.ctx.base_registered {
            self.ctx.update_profile(&self.config.url);
        }
        Outcome::Next
    }

    /// Hand the selected add-ons to the package manager. Runs only on an
    /// installed system; during installation the products are installed
    /// together with the base product.
    fn pkg_manager(&mut self) -> Outcome {
        if self.mode != Mode::Normal || self.ctx.selected.is_empty() {
            return Outcome::Next;
        }

        self.ui.render(&Dialog::Info {
            message: "Starting the package manager...",
        });
        match self.pkg.invoke(&self.ctx.selected) {
            Ok(()) => Outcome::Next,
            Err(err) => {
                self.ui.render(&Dialog::Error {
                    message: &err.to_string(),
                });
                Outcome::Abort
            }
        }
    }

    /// Make system credentials available for authenticated calls, loading
    /// a stored registration when this run has not activated one.
    fn ensure_handle(&mut self) -> Option<ProductHandle> {
        if let Some(handle) = &self.ctx.handle {
            return Some(handle.clone());
        }
        match credentials::read(&self.credentials_path()) {
            Ok(handle) => {
                self.ctx.handle = Some(handle.clone());
                Some(handle)
            }
            Err(err) => {
                self.ui.render(&Dialog::Error {
                    message: &format!("{err:#}"),
                });
                None
            }
        }
    }
}

impl<S, U, P> StepRunner for RegistrationWizard<S, U, P>
where
    S: EntitlementService,
    U: WizardUi,
    P: PackageManager,
{
    async fn run_step(&mut self, step: &str) -> Result<Outcome, SequencerError> {
        self.visited.push(step.to_string());
        match step {
            "check" => Ok(self.registration_check().await),
            "update" => Ok(self.update_registration().await),
            "register" => Ok(self.register_base_system().await),
            "select_addons" => Ok(self.select_addons().await),
            "addon_eula" => Ok(self.addon_eula().await),
            "register_addons" => Ok(self.register_addons().await),
            "update_autoyast_config" => Ok(self.update_autoyast_config()),
            "pkg_manager" => Ok(self.pkg_manager()),
            other => Err(SequencerError::UnknownStep(other.to_string())),
        }
    }

    // The check and update steps route the workflow on their own; going
    // back through them must not repeat that decision.
    fn skip_on_back(&self, step: &str) -> bool {
        matches!(step, "check" | "update")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{InMemoryConnect, ScriptedUi, StubPkg, demo_catalog};
    use crate::ui::UserEvent;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct Fixture {
        config: WizardConfig,
        // Keeps the temporary state directory alive for the test.
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let config = WizardConfig {
            credentials_path: dir
                .path()
                .join("credentials")
                .to_string_lossy()
                .into_owned(),
            ..WizardConfig::default()
        };
        Fixture { config, _dir: dir }
    }

    fn wizard(
        fixture: &Fixture,
        mode: Mode,
        events: Vec<UserEvent>,
    ) -> RegistrationWizard<InMemoryConnect, ScriptedUi, StubPkg> {
        RegistrationWizard::new(
            InMemoryConnect::new(demo_catalog()),
            ScriptedUi::new(events),
            StubPkg::with_base_product(),
            fixture.config.clone(),
            mode,
        )
    }

    fn submit_credentials() -> UserEvent {
        UserEvent::Credentials(Credentials {
            email: "admin@example.com".into(),
            reg_code: "REGCODE-42".into(),
        })
    }

    fn ha_code() -> UserEvent {
        let mut codes = HashMap::new();
        codes.insert("ha".to_string(), "HA-CODE".to_string());
        UserEvent::RegCodes(codes)
    }

    #[test]
    fn transition_table_is_valid() {
        Sequencer::new(
            RegistrationWizard::<InMemoryConnect, ScriptedUi, StubPkg>::transition_table(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn full_registration_walks_every_step() {
        let fixture = fixture();
        // containers and ha are toggled in; ha needs a code and the
        // containers license is accepted on the way.
        let mut wizard = wizard(
            &fixture,
            Mode::Normal,
            vec![
                submit_credentials(),
                UserEvent::Toggle(0),
                UserEvent::Toggle(1),
                UserEvent::Next,
                UserEvent::Accept,
                ha_code(),
            ],
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        assert_eq!(
            record.steps,
            vec![
                "check",
                "register",
                "select_addons",
                "addon_eula",
                "register_addons",
                "update_autoyast_config",
                "pkg_manager",
            ]
        );
        // The activation left system credentials behind.
        assert!(credentials::is_registered(&wizard.credentials_path()));
        // The stub package manager installed the selection.
        assert_eq!(wizard.pkg.invoked, vec![vec![
            "containers".to_string(),
            "ha".to_string(),
        ]]);
    }

    #[tokio::test]
    async fn skipping_registration_ends_the_workflow() {
        let fixture = fixture();
        let mut wizard = wizard(&fixture, Mode::Normal, vec![UserEvent::Skip]);

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        assert_eq!(record.steps, vec!["check", "register"]);
        assert!(!credentials::is_registered(&wizard.credentials_path()));
    }

    #[tokio::test]
    async fn missing_base_product_aborts_on_installed_system() {
        let fixture = fixture();
        let mut wizard = RegistrationWizard::new(
            InMemoryConnect::new(demo_catalog()),
            ScriptedUi::new(vec![]),
            StubPkg::without_base_product(),
            fixture.config.clone(),
            Mode::Normal,
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Abort);
        assert!(wizard.ui.rendered.iter().any(|d| d.contains("base product")));
    }

    #[tokio::test]
    async fn missing_base_product_continues_automatically_in_installer() {
        let fixture = fixture();
        let mut wizard = RegistrationWizard::new(
            InMemoryConnect::new(demo_catalog()),
            ScriptedUi::new(vec![]),
            StubPkg::without_base_product(),
            fixture.config.clone(),
            Mode::Installation,
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Auto);
    }

    #[tokio::test]
    async fn rejected_code_is_reported_and_retried() {
        let fixture = fixture();
        let mut wizard = wizard(
            &fixture,
            Mode::Normal,
            vec![
                UserEvent::Credentials(Credentials {
                    email: "admin@example.com".into(),
                    reg_code: "WRONG".into(),
                }),
                submit_credentials(),
                // Nothing selected afterwards; the rest of the flow is empty.
                UserEvent::Next,
            ],
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        assert!(wizard
            .ui
            .rendered
            .iter()
            .any(|d| d.contains("registration code rejected")));
        // The register step ran once; the retry happened inside it.
        assert_eq!(record.steps.iter().filter(|s| *s == "register").count(), 1);
    }

    #[tokio::test]
    async fn registered_system_goes_straight_to_extensions() {
        let fixture = fixture();
        credentials::write(
            Path::new(&fixture.config.credentials_path),
            &ProductHandle {
                login: "SYS_815".into(),
                password: "s3cret".into(),
            },
        )
        .unwrap();

        let mut wizard = wizard(
            &fixture,
            Mode::Normal,
            vec![UserEvent::Extensions, UserEvent::Next],
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        // Empty selection skips license and registration steps entirely.
        assert_eq!(
            record.steps,
            vec![
                "check",
                "select_addons",
                "update_autoyast_config",
                "pkg_manager",
            ]
        );
    }

    #[tokio::test]
    async fn extensions_entry_starts_at_the_selection() {
        let fixture = fixture();
        credentials::write(
            Path::new(&fixture.config.credentials_path),
            &ProductHandle {
                login: "SYS_815".into(),
                password: "s3cret".into(),
            },
        )
        .unwrap();

        let mut wizard = wizard(&fixture, Mode::Normal, vec![UserEvent::Next]);

        let record = wizard.run(true).await.unwrap();

        assert_eq!(record.steps[0], "select_addons");
        assert_eq!(record.result, TerminalResult::Next);
    }

    #[tokio::test]
    async fn cancelling_the_selection_returns_to_check() {
        let fixture = fixture();
        credentials::write(
            Path::new(&fixture.config.credentials_path),
            &ProductHandle {
                login: "SYS_815".into(),
                password: "s3cret".into(),
            },
        )
        .unwrap();

        let mut wizard = wizard(
            &fixture,
            Mode::Normal,
            vec![
                UserEvent::Extensions,
                UserEvent::Cancel,
                UserEvent::Extensions,
                UserEvent::Next,
            ],
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        assert_eq!(
            record.steps,
            vec![
                "check",
                "select_addons",
                "check",
                "select_addons",
                "update_autoyast_config",
                "pkg_manager",
            ]
        );
    }

    #[tokio::test]
    async fn declined_license_returns_to_the_selection() {
        let fixture = fixture();
        let mut wizard = wizard(
            &fixture,
            Mode::Normal,
            vec![
                submit_credentials(),
                // First pass: pick the containers module, decline its license.
                UserEvent::Toggle(0),
                UserEvent::Next,
                UserEvent::Decline,
                // Back at the selection: drop it again and finish empty.
                UserEvent::Toggle(0),
                UserEvent::Next,
            ],
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        assert_eq!(
            record.steps,
            vec![
                "check",
                "register",
                "select_addons",
                "addon_eula",
                "select_addons",
                "update_autoyast_config",
                "pkg_manager",
            ]
        );
    }

    #[tokio::test]
    async fn update_mode_refreshes_an_old_registration() {
        let fixture = fixture();
        credentials::write(
            Path::new(&fixture.config.credentials_path),
            &ProductHandle {
                login: "SYS_815".into(),
                password: "s3cret".into(),
            },
        )
        .unwrap();

        let mut wizard = wizard(&fixture, Mode::Update, vec![UserEvent::Next]);

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        assert_eq!(
            record.steps,
            vec![
                "check",
                "update",
                "select_addons",
                "update_autoyast_config",
                "pkg_manager",
            ]
        );
    }

    #[tokio::test]
    async fn failed_update_falls_back_to_registration() {
        let fixture = fixture();
        credentials::write(
            Path::new(&fixture.config.credentials_path),
            &ProductHandle {
                login: "SYS_815".into(),
                password: "s3cret".into(),
            },
        )
        .unwrap();

        let mut service = InMemoryConnect::new(demo_catalog());
        service.fail_update = true;
        let mut wizard = RegistrationWizard::new(
            service,
            ScriptedUi::new(vec![UserEvent::Abort]),
            StubPkg::with_base_product(),
            fixture.config.clone(),
            Mode::Update,
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Abort);
        assert_eq!(record.steps, vec!["check", "update", "register"]);
        assert!(wizard
            .ui
            .rendered
            .iter()
            .any(|d| d.contains("Automatic registration upgrade failed")));
    }

    #[tokio::test]
    async fn installer_mode_exports_the_unattended_profile() {
        let fixture = fixture();
        let mut wizard = RegistrationWizard::new(
            InMemoryConnect::new(demo_catalog()),
            ScriptedUi::new(vec![
                submit_credentials(),
                UserEvent::Toggle(0),
                UserEvent::Toggle(1),
                UserEvent::Next,
                UserEvent::Accept,
                ha_code(),
            ]),
            StubPkg::with_base_product(),
            fixture.config.clone(),
            Mode::Installation,
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        assert!(wizard.ctx.profile.modified);
        assert_eq!(wizard.ctx.profile.reg_code, "REGCODE-42");
        assert_eq!(wizard.ctx.profile.addons.len(), 2);
        // No package manager run inside the installer.
        assert!(wizard.pkg.invoked.is_empty());
    }

    #[tokio::test]
    async fn recommended_addons_are_preselected_on_first_display() {
        let fixture = fixture();
        let mut catalog = demo_catalog();
        catalog[0].recommended = true;
        let mut wizard = RegistrationWizard::new(
            InMemoryConnect::new(catalog),
            ScriptedUi::new(vec![submit_credentials(), UserEvent::Next, UserEvent::Accept]),
            StubPkg::with_base_product(),
            fixture.config.clone(),
            Mode::Normal,
        );

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Next);
        // Confirming without toggling keeps the preselected module.
        assert_eq!(wizard.ctx.selected.len(), 1);
        assert_eq!(wizard.ctx.selected[0].identifier, "containers");
    }

    #[tokio::test]
    async fn aborting_the_form_aborts_the_workflow() {
        let fixture = fixture();
        let mut wizard = wizard(&fixture, Mode::Normal, vec![UserEvent::Abort]);

        let record = wizard.run(false).await.unwrap();

        assert_eq!(record.result, TerminalResult::Abort);
        assert_eq!(record.steps, vec!["check", "register"]);
    }
}
