//! Armazenamento das credenciais de sistema emitidas pelo servidor de registro.
//!
//! Depois da ativação do produto base o assistente grava o par
//! `username`/`password` em um arquivo `chave=valor`; a existência desse
//! arquivo é o que caracteriza um sistema já registrado. No modo de
//! atualização as credenciais antigas são copiadas do sistema de destino
//! montado antes da verificação.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::connect::ProductHandle;

/// Um sistema com arquivo de credenciais é um sistema registrado.
pub fn is_registered(path: &Path) -> bool {
    path.exists()
}

/// Lê as credenciais de sistema de um arquivo `chave=valor`.
pub fn read(path: &Path) -> Result<ProductHandle> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials from {}", path.display()))?;
    parse(&contents).with_context(|| format!("malformed credentials file {}", path.display()))
}

fn parse(contents: &str) -> Result<ProductHandle> {
    let mut login = None;
    let mut password = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                "username" => login = Some(value.trim().to_string()),
                "password" => password = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    match (login, password) {
        (Some(login), Some(password)) => Ok(ProductHandle { login, password }),
        _ => bail!("missing username or password entry"),
    }
}

/// Grava as credenciais, criando o diretório pai se necessário.
pub fn write(path: &Path, handle: &ProductHandle) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = format!("username={}\npassword={}\n", handle.login, handle.password);
    fs::write(path, contents)
        .with_context(|| format!("failed to write credentials to {}", path.display()))
}

/// Copia as credenciais do sistema de destino montado (modo de atualização).
///
/// Retorna `false` quando o destino não possui credenciais — o sistema nunca
/// foi registrado e o assistente segue para o registro do zero.
pub fn copy_from_target(target_root: &Path, path: &Path) -> Result<bool> {
    let source = target_root.join(path.strip_prefix("/").unwrap_or(path));
    if !source.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::copy(&source, path)
        .with_context(|| format!("failed to copy credentials from {}", source.display()))?;
    Ok(true)
}
