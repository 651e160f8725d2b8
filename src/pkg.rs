use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

use crate::connect::{Addon, Product};

#[derive(Debug, Error)]
pub enum PkgError {
    #[error("package manager `{command}` exited with status {status}")]
    Failed { command: String, status: i32 },

    #[error("failed to launch package manager `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Software-management seam of the wizard: base-product lookup and the
/// hand-off of the selected add-ons for installation.
pub trait PackageManager {
    fn find_base_product(&self) -> Option<Product>;

    fn invoke(&mut self, selection: &[Addon]) -> Result<(), PkgError>;
}

/// Spawns the package manager configured in `regwizard.toml` and reads the
/// base-product descriptor the distribution installs.
pub struct CommandPkgManager {
    command: String,
    base_product_path: PathBuf,
}

impl CommandPkgManager {
    pub fn new(command: String, base_product_path: PathBuf) -> Self {
        Self {
            command,
            base_product_path,
        }
    }
}

impl PackageManager for CommandPkgManager {
    /// A missing or unreadable descriptor means no base product — the
    /// check step reports that, so no error detail is needed here.
    fn find_base_product(&self) -> Option<Product> {
        let contents = std::fs::read_to_string(&self.base_product_path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn invoke(&mut self, selection: &[Addon]) -> Result<(), PkgError> {
        let mut command = Command::new(&self.command);
        command.arg("install");
        for addon in selection {
            command.arg(&addon.identifier);
        }

        let status = command.status().map_err(|source| PkgError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        if !status.success() {
            return Err(PkgError::Failed {
                command: self.command.clone(),
                status: status.code().unwrap_or(-1),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn addon(identifier: &str) -> Addon {
        Addon {
            identifier: identifier.into(),
            name: identifier.into(),
            version: "1.0".into(),
            arch: "x86_64".into(),
            free: true,
            beta: false,
            recommended: false,
            description: String::new(),
            eula_url: None,
        }
    }

    #[test]
    fn find_base_product_reads_descriptor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseproduct.json");
        std::fs::write(
            &path,
            r#"{
                "identifier": "openunity",
                "name": "OpenUnity",
                "version": "16.0",
                "arch": "x86_64"
            }"#,
        )
        .unwrap();

        let pkg = CommandPkgManager::new("true".into(), path);
        let product = pkg.find_base_product().unwrap();

        assert_eq!(product.identifier, "openunity");
        assert_eq!(product.version, "16.0");
    }

    #[test]
    fn find_base_product_missing_descriptor_is_none() {
        let dir = tempdir().unwrap();
        let pkg = CommandPkgManager::new("true".into(), dir.path().join("absent.json"));
        assert!(pkg.find_base_product().is_none());
    }

    #[test]
    fn find_base_product_malformed_descriptor_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseproduct.json");
        std::fs::write(&path, "not json").unwrap();

        let pkg = CommandPkgManager::new("true".into(), path);
        assert!(pkg.find_base_product().is_none());
    }

    #[test]
    fn invoke_succeeds_for_zero_exit() {
        let dir = tempdir().unwrap();
        let mut pkg = CommandPkgManager::new("true".into(), dir.path().join("p.json"));
        pkg.invoke(&[addon("containers")]).unwrap();
    }

    #[test]
    fn invoke_maps_nonzero_exit() {
        let dir = tempdir().unwrap();
        let mut pkg = CommandPkgManager::new("false".into(), dir.path().join("p.json"));
        let err = pkg.invoke(&[addon("containers")]).unwrap_err();
        assert!(matches!(err, PkgError::Failed { status: 1, .. }));
    }

    #[test]
    fn invoke_reports_missing_command() {
        let dir = tempdir().unwrap();
        let mut pkg =
            CommandPkgManager::new("regwizard-no-such-command".into(), dir.path().join("p.json"));
        let err = pkg.invoke(&[]).unwrap_err();
        assert!(matches!(err, PkgError::Spawn { .. }));
    }
}
