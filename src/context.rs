use std::collections::HashMap;

use serde::Serialize;

use crate::connect::{Addon, Credentials, ProductHandle};

/// State shared across wizard steps, scoped to one run.
///
/// The sequencer never looks inside; steps read and update it through the
/// wizard that owns it.
#[derive(Debug, Default)]
pub struct WizardContext {
    /// System credentials for authenticated server calls, present once the
    /// base product was activated or an earlier registration was found.
    pub handle: Option<ProductHandle>,
    /// Whether the base system was registered during this run.
    pub base_registered: bool,
    /// Last credentials entered in the registration form, prefilled on retry.
    pub credentials: Credentials,
    /// Add-on catalog, cached across back/forth navigation.
    pub available_addons: Option<Vec<Addon>>,
    /// Add-ons picked in the selection dialog.
    pub selected: Vec<Addon>,
    /// Registration codes entered during this run, by add-on identifier.
    pub known_reg_codes: HashMap<String, String>,
    /// Beta filter state of the selection dialog, kept for re-entry.
    pub filter_beta: bool,
    /// Unattended-installation profile filled by the workflow.
    pub profile: InstallProfile,
}

impl WizardContext {
    pub fn new(prefill: Credentials) -> Self {
        Self {
            credentials: prefill,
            filter_beta: true,
            ..Default::default()
        }
    }

    /// Fold the run's choices into the unattended profile.
    pub fn update_profile(&mut self, url: &str) {
        let addons = self
            .selected
            .iter()
            .map(|addon| ProfileAddon {
                identifier: addon.identifier.clone(),
                version: addon.version.clone(),
                arch: addon.arch.clone(),
                reg_code: self.known_reg_codes.get(&addon.identifier).cloned(),
            })
            .collect();

        self.profile = InstallProfile {
            url: url.to_string(),
            email: self.credentials.email.clone(),
            reg_code: self.credentials.reg_code.clone(),
            addons,
            modified: true,
        };
    }
}

/// Snapshot of the run's choices handed to the host installer for
/// unattended reinstallation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstallProfile {
    pub url: String,
    pub email: String,
    pub reg_code: String,
    pub addons: Vec<ProfileAddon>,
    /// Set when the profile diverges from what the host last saw.
    pub modified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAddon {
    pub identifier: String,
    pub version: String,
    pub arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_code: Option<String>,
}
