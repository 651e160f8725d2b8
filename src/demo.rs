//! Built-in demonstration of the registration workflow.
//!
//! `regwizard demo` walks the full wizard against an in-memory entitlement
//! service, a scripted UI and a stub package manager, echoing every dialog
//! it renders. The same doubles back the wizard and dialog tests.

use std::collections::VecDeque;
use std::path::Path;

use crate::config::{Mode, WizardConfig};
use crate::connect::{
    ActivatedProduct, Addon, ConnectError, Credentials, EntitlementService, Product, ProductHandle,
};
use crate::pkg::{PackageManager, PkgError};
use crate::sequencer::SequencerError;
use crate::ui::{Dialog, UserEvent, WizardUi};
use crate::wizard::{RegistrationWizard, RunRecord};

/// UI double: replays canned events and records every rendered dialog.
pub struct ScriptedUi {
    pub events: VecDeque<UserEvent>,
    pub rendered: Vec<String>,
    /// Echo dialogs to stdout, used by the demo run.
    pub echo: bool,
}

impl ScriptedUi {
    pub fn new(events: Vec<UserEvent>) -> Self {
        Self {
            events: events.into(),
            rendered: Vec::new(),
            echo: false,
        }
    }

    pub fn echoing(events: Vec<UserEvent>) -> Self {
        Self {
            echo: true,
            ..Self::new(events)
        }
    }
}

impl WizardUi for ScriptedUi {
    fn render(&mut self, dialog: &Dialog<'_>) {
        let line = format!("{dialog:?}");
        if self.echo {
            println!("  → {line}");
        }
        self.rendered.push(line);
    }

    /// An exhausted script aborts, so a miswired flow always terminates.
    fn await_input(&mut self) -> UserEvent {
        self.events.pop_front().unwrap_or(UserEvent::Abort)
    }
}

fn base_product() -> Product {
    Product {
        identifier: "openunity".into(),
        name: "OpenUnity".into(),
        version: "16.0".into(),
        arch: "x86_64".into(),
    }
}

/// The add-on catalog served by the in-memory entitlement service.
pub fn demo_catalog() -> Vec<Addon> {
    vec![
        Addon {
            identifier: "containers".into(),
            name: "Containers Module".into(),
            version: "16.0".into(),
            arch: "x86_64".into(),
            free: true,
            beta: false,
            recommended: false,
            description: "Container runtime and tooling".into(),
            eula_url: Some("https://connect.example.com/eula/containers".into()),
        },
        Addon {
            identifier: "ha".into(),
            name: "High Availability".into(),
            version: "16.0".into(),
            arch: "x86_64".into(),
            free: false,
            beta: false,
            recommended: false,
            description: "Cluster stack".into(),
            eula_url: None,
        },
        Addon {
            identifier: "experimental-kernel".into(),
            name: "Experimental Kernel".into(),
            version: "16.0".into(),
            arch: "x86_64".into(),
            free: true,
            beta: true,
            recommended: false,
            description: "Preview kernel builds".into(),
            eula_url: None,
        },
    ]
}

/// Entitlement service double with a fixed catalog.
///
/// Rejects an empty or `WRONG` registration code on activation and any
/// non-free add-on registered without a code, so error paths can be
/// exercised offline.
pub struct InMemoryConnect {
    pub catalog: Vec<Addon>,
    /// Make `update_system` fail, driving the fallback-to-register path.
    pub fail_update: bool,
}

impl InMemoryConnect {
    pub fn new(catalog: Vec<Addon>) -> Self {
        Self {
            catalog,
            fail_update: false,
        }
    }
}

impl EntitlementService for InMemoryConnect {
    async fn activate_base(
        &self,
        credentials: &Credentials,
    ) -> Result<ActivatedProduct, ConnectError> {
        if credentials.reg_code.is_empty() || credentials.reg_code == "WRONG" {
            return Err(ConnectError::InvalidRegCode(
                "Unknown Registration Code.".into(),
            ));
        }
        Ok(ActivatedProduct {
            id: 1,
            login: "SYS_DEMO".into(),
            password: "demo".into(),
            product: base_product(),
        })
    }

    async fn list_addons(&self, _handle: &ProductHandle) -> Result<Vec<Addon>, ConnectError> {
        Ok(self.catalog.clone())
    }

    async fn register_addon(
        &self,
        _handle: &ProductHandle,
        addon: &Addon,
        reg_code: Option<&str>,
    ) -> Result<(), ConnectError> {
        if !addon.free && reg_code.unwrap_or_default().is_empty() {
            return Err(ConnectError::InvalidRegCode(format!(
                "A registration code is required for {}.",
                addon.name
            )));
        }
        Ok(())
    }

    async fn update_system(&self, _handle: &ProductHandle) -> Result<(), ConnectError> {
        if self.fail_update {
            return Err(ConnectError::ApiError {
                status: 500,
                message: "system record update failed".into(),
            });
        }
        Ok(())
    }

    async fn fetch_eula(&self, _url: &str) -> Result<String, ConnectError> {
        Ok("License terms.".into())
    }
}

/// Package-manager double recording every invocation.
pub struct StubPkg {
    pub base_product: Option<Product>,
    pub invoked: Vec<Vec<String>>,
    pub fail: bool,
}

impl StubPkg {
    pub fn with_base_product() -> Self {
        Self {
            base_product: Some(base_product()),
            invoked: Vec::new(),
            fail: false,
        }
    }

    pub fn without_base_product() -> Self {
        Self {
            base_product: None,
            invoked: Vec::new(),
            fail: false,
        }
    }
}

impl PackageManager for StubPkg {
    fn find_base_product(&self) -> Option<Product> {
        self.base_product.clone()
    }

    fn invoke(&mut self, selection: &[Addon]) -> Result<(), PkgError> {
        self.invoked
            .push(selection.iter().map(|addon| addon.identifier.clone()).collect());
        if self.fail {
            return Err(PkgError::Failed {
                command: "stub".into(),
                status: 1,
            });
        }
        Ok(())
    }
}

/// Run the scripted demonstration and return its record.
pub async fn run() -> Result<RunRecord, SequencerError> {
    let credentials_path = std::env::temp_dir().join("regwizard-demo-credentials");
    let _ = std::fs::remove_file(&credentials_path);

    let config = WizardConfig {
        credentials_path: credentials_path.to_string_lossy().into_owned(),
        ..WizardConfig::default()
    };

    let mut codes = std::collections::HashMap::new();
    codes.insert("ha".to_string(), "DEMO-HA-CODE".to_string());

    let script = vec![
        UserEvent::Credentials(Credentials {
            email: "demo@example.com".into(),
            reg_code: "DEMO-CODE".into(),
        }),
        UserEvent::Toggle(0),
        UserEvent::Toggle(1),
        UserEvent::Next,
        UserEvent::Accept,
        UserEvent::RegCodes(codes),
    ];

    let mut wizard = RegistrationWizard::new(
        InMemoryConnect::new(demo_catalog()),
        ScriptedUi::echoing(script),
        StubPkg::with_base_product(),
        config,
        Mode::Normal,
    );

    let record = wizard.run(false).await;
    println!(
        "  {} dialogs rendered, {} package-manager call(s)",
        wizard.ui.rendered.len(),
        wizard.pkg.invoked.len()
    );
    let _ = std::fs::remove_file(Path::new(&wizard.config.credentials_path));
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::TerminalResult;

    #[tokio::test]
    async fn demo_run_completes() {
        let record = run().await.unwrap();
        assert_eq!(record.result, TerminalResult::Next);
        assert_eq!(record.steps.first().map(String::as_str), Some("check"));
        assert_eq!(
            record.steps.last().map(String::as_str),
            Some("pkg_manager")
        );
    }
}
