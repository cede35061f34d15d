//! Application context - dependency injection container

use std::sync::Arc;

use parking_lot::RwLock as SyncRwLock;
use quillsign_common::auth::{
    BrowserLauncher, Credential, IdentityClient, ImplicitGrantConfig, ImplicitLoginService,
    NotificationSink,
};
use quillsign_core::signing::ports::{AssetResolver, EnvelopeGateway};
use quillsign_core::SigningService;
use quillsign_domain::{Config, OAuthSettings, QuillSignError, Result};
use quillsign_infra::{
    config, EnvelopeApiClient, FsAssetResolver, GeoIpClient, SystemBrowserLauncher,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::utils::notifier::TracingNotifier;

/// Type alias for the login service used by the application
pub type LoginService = ImplicitLoginService<IdentityClient>;

/// Replaceable collaborators, for embedding and tests
pub struct Collaborators {
    pub identity: Arc<IdentityClient>,
    pub browser: Arc<dyn BrowserLauncher>,
    pub notifier: Arc<dyn NotificationSink>,
    pub assets: Arc<dyn AssetResolver>,
    pub gateway: Arc<dyn EnvelopeGateway>,
}

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub login: Arc<LoginService>,
    pub signing: Arc<SigningService>,
    pub notifier: Arc<dyn NotificationSink>,
    geoip: Option<GeoIpClient>,
    credential: RwLock<Option<Credential>>,
    default_country: SyncRwLock<Option<String>>,
}

impl AppContext {
    /// Load configuration and build the production context.
    ///
    /// # Errors
    /// Returns an error if configuration cannot be loaded or a client cannot
    /// be constructed.
    pub fn new() -> Result<Self> {
        Self::new_with_config(config::load()?)
    }

    /// Build the production context from an explicit configuration.
    ///
    /// # Errors
    /// Returns `QuillSignError::Config` for an invalid configuration, or the
    /// error raised while constructing the HTTP clients or locating the
    /// executable.
    pub fn new_with_config(config: Config) -> Result<Self> {
        let grant = grant_config(&config.oauth);
        let identity = IdentityClient::new(&grant, config.signing.sdk_header.clone()).map_err(|e| {
            QuillSignError::Platform(format!("failed to build identity client: {e}"))
        })?;
        let collaborators = Collaborators {
            identity: Arc::new(identity),
            browser: Arc::new(SystemBrowserLauncher::new()),
            notifier: Arc::new(TracingNotifier::new()),
            assets: Arc::new(FsAssetResolver::from_current_exe()?),
            gateway: Arc::new(EnvelopeApiClient::new(&config.signing)?),
        };
        Self::with_collaborators(config, collaborators)
    }

    /// Build a context around caller-supplied collaborators.
    ///
    /// # Errors
    /// Returns `QuillSignError::Config` for an invalid configuration.
    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Result<Self> {
        config.validate()?;

        let login = Arc::new(ImplicitLoginService::new(
            grant_config(&config.oauth),
            collaborators.identity,
            collaborators.browser,
            Arc::clone(&collaborators.notifier),
        ));
        let signing = Arc::new(SigningService::new(collaborators.assets, collaborators.gateway));
        let geoip =
            if config.geoip.enabled { Some(GeoIpClient::new(&config.geoip)?) } else { None };

        info!(
            idp_url = %config.oauth.idp_url,
            redirect_uri = %login.config().redirect_uri(),
            geoip = config.geoip.enabled,
            "application context initialised"
        );

        Ok(Self {
            config,
            login,
            signing,
            notifier: collaborators.notifier,
            geoip,
            credential: RwLock::new(None),
            default_country: SyncRwLock::new(None),
        })
    }

    /// Current credential, if logged in (expired credentials included).
    pub async fn credential(&self) -> Option<Credential> {
        self.credential.read().await.clone()
    }

    pub async fn store_credential(&self, credential: Credential) {
        *self.credential.write().await = Some(credential);
    }

    /// Forget the credential; returns whether one was held.
    pub async fn clear_credential(&self) -> bool {
        self.credential.write().await.take().is_some()
    }

    /// Country detected at startup, if the lookup succeeded.
    pub fn default_country(&self) -> Option<String> {
        self.default_country.read().clone()
    }

    /// Best-effort geo-IP lookup; failures are logged and otherwise ignored.
    pub async fn refresh_default_country(&self) {
        let Some(client) = &self.geoip else {
            return;
        };
        match client.lookup_country_code().await {
            Ok(Some(code)) => {
                info!(country_code = %code, "default country detected");
                *self.default_country.write() = Some(code);
            }
            Ok(None) => debug!("geo-IP lookup returned no country"),
            Err(err) => debug!(error = %err, "geo-IP lookup failed"),
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// Translate the loaded settings into the login configuration.
pub fn grant_config(settings: &OAuthSettings) -> ImplicitGrantConfig {
    ImplicitGrantConfig {
        idp_url: settings.idp_url.clone(),
        client_id: settings.client_id.clone(),
        scopes: settings.scopes.clone(),
        scheme_name: settings.scheme_name.clone(),
        scheme_slash_count: settings.scheme_slash_count,
        return_path: settings.return_path.clone(),
        redirect_url: settings.redirect_url.clone(),
        dev_access_token: settings.dev_access_token.clone(),
        expiration_buffer_seconds: settings.expiration_buffer_seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_config_copies_every_setting() {
        let settings = OAuthSettings {
            client_id: "client-123".into(),
            scheme_slash_count: 2,
            redirect_url: Some("https://example.com/r.html".into()),
            ..OAuthSettings::default()
        };

        let grant = grant_config(&settings);

        assert_eq!(grant.client_id, "client-123");
        assert_eq!(grant.direct_redirect_uri(), "quillsign://implicit-result");
        assert_eq!(grant.redirect_uri(), "https://example.com/r.html");
        assert_eq!(grant.expiration_buffer_seconds, 600);
    }
}
