use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::error::ConnectError;
use super::types::{
    ActivatedProduct, ActivationRequest, Addon, AddonRegistrationRequest, ApiErrorBody,
    Credentials, ProductHandle,
};

/// Network seam of the wizard: product activation, add-on listing and
/// registration. Implemented over HTTP by [`ConnectClient`] and by offline
/// doubles in the demo and in tests.
pub trait EntitlementService {
    async fn activate_base(
        &self,
        credentials: &Credentials,
    ) -> Result<ActivatedProduct, ConnectError>;

    async fn list_addons(&self, handle: &ProductHandle) -> Result<Vec<Addon>, ConnectError>;

    async fn register_addon(
        &self,
        handle: &ProductHandle,
        addon: &Addon,
        reg_code: Option<&str>,
    ) -> Result<(), ConnectError>;

    /// Refresh the server-side system record of an existing registration.
    async fn update_system(&self, handle: &ProductHandle) -> Result<(), ConnectError>;

    async fn fetch_eula(&self, url: &str) -> Result<String, ConnectError>;
}

pub struct ConnectClient {
    client: Client,
    base_url: String,
}

impl ConnectClient {
    /// Create a client for the given server; tests point this at a local
    /// mock server.
    pub fn with_base_url(base_url: String, timeout: Duration, insecure: bool) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure)
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Map non-success responses onto the wizard's error vocabulary.
    async fn triage(response: reqwest::Response) -> Result<reqwest::Response, ConnectError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::UNPROCESSABLE_ENTITY {
            return Err(ConnectError::InvalidRegCode(error_message(response).await));
        }

        if !status.is_success() {
            return Err(ConnectError::ApiError {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        Ok(response)
    }
}

/// Prefer the server's `{"error": ...}` body, fall back to the raw text.
async fn error_message(response: reqwest::Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .map(|body| body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or(text)
}

impl EntitlementService for ConnectClient {
    async fn activate_base(
        &self,
        credentials: &Credentials,
    ) -> Result<ActivatedProduct, ConnectError> {
        let request = ActivationRequest {
            email: credentials.email.clone(),
            reg_code: credentials.reg_code.clone(),
        };
        let response = self
            .client
            .post(self.endpoint("/systems/activate"))
            .json(&request)
            .send()
            .await?;
        let response = Self::triage(response).await?;
        Ok(response.json::<ActivatedProduct>().await?)
    }

    async fn list_addons(&self, handle: &ProductHandle) -> Result<Vec<Addon>, ConnectError> {
        let response = self
            .client
            .get(self.endpoint("/systems/addons"))
            .basic_auth(&handle.login, Some(&handle.password))
            .send()
            .await?;
        let response = Self::triage(response).await?;
        Ok(response.json::<Vec<Addon>>().await?)
    }

    async fn register_addon(
        &self,
        handle: &ProductHandle,
        addon: &Addon,
        reg_code: Option<&str>,
    ) -> Result<(), ConnectError> {
        let request = AddonRegistrationRequest {
            identifier: addon.identifier.clone(),
            version: addon.version.clone(),
            arch: addon.arch.clone(),
            reg_code: reg_code.map(str::to_string),
        };
        let response = self
            .client
            .post(self.endpoint("/systems/addons"))
            .basic_auth(&handle.login, Some(&handle.password))
            .json(&request)
            .send()
            .await?;
        Self::triage(response).await?;
        Ok(())
    }

    async fn update_system(&self, handle: &ProductHandle) -> Result<(), ConnectError> {
        let response = self
            .client
            .put(self.endpoint("/systems"))
            .basic_auth(&handle.login, Some(&handle.password))
            .send()
            .await?;
        Self::triage(response).await?;
        Ok(())
    }

    async fn fetch_eula(&self, url: &str) -> Result<String, ConnectError> {
        let response = self.client.get(url).send().await?;
        let response = Self::triage(response).await?;
        Ok(response.text().await?)
    }
}
