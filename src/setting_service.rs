use std::collections::HashMap;
use std::sync::RwLock;

use secrecy::SecretString;

use crate::configuration::PluginDefaultSettings;
use crate::mollie_client::ApiKeyPair;
use crate::utils::error_chain_fmt;

/// Scope 0 holds the base record shared by all stores.
pub const ALL_STORES_SCOPE: u32 = 0;

#[derive(Debug, Clone)]
pub struct MolliePaymentSettings {
    pub use_sandbox: bool,
    pub api_live_key: SecretString,
    pub api_test_key: SecretString,
}

impl MolliePaymentSettings {
    pub fn api_keys(&self) -> ApiKeyPair {
        ApiKeyPair {
            live: self.api_live_key.clone(),
            test: self.api_test_key.clone(),
        }
    }
}

impl From<PluginDefaultSettings> for MolliePaymentSettings {
    fn from(defaults: PluginDefaultSettings) -> Self {
        Self {
            use_sandbox: defaults.use_sandbox,
            api_live_key: defaults.api_live_key,
            api_test_key: defaults.api_test_key,
        }
    }
}

/// Form submitted from the admin configuration page. Each field carries its
/// own per-store override flag.
#[derive(Debug)]
pub struct SettingsForm {
    pub use_sandbox: bool,
    pub use_sandbox_override_for_store: bool,
    pub api_live_key: SecretString,
    pub api_live_key_override_for_store: bool,
    pub api_test_key: SecretString,
    pub api_test_key_override_for_store: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    UseSandbox,
    ApiLiveKey,
    ApiTestKey,
}

#[derive(thiserror::Error)]
pub enum SettingServiceError {
    #[error("The Mollie payment plugin is not installed")]
    NotInstalled,
}

impl std::fmt::Debug for SettingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug, Default)]
struct StoreOverrides {
    use_sandbox: Option<bool>,
    api_live_key: Option<SecretString>,
    api_test_key: Option<SecretString>,
}

impl StoreOverrides {
    fn is_empty(&self) -> bool {
        self.use_sandbox.is_none() && self.api_live_key.is_none() && self.api_test_key.is_none()
    }
}

#[derive(Debug, Default)]
struct SettingState {
    base: Option<MolliePaymentSettings>,
    overrides: HashMap<u32, StoreOverrides>,
}

/// Store-scope-aware settings record for the plugin. Mirrors the host
/// framework's setting service contract: a base record plus optional
/// per-store overrides for each field.
#[derive(Debug, Default)]
pub struct SettingService {
    state: RwLock<SettingState>,
}

impl SettingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the settings record. Invoked once at plugin install time.
    pub fn install(&self, defaults: MolliePaymentSettings) {
        let mut state = self.state.write().unwrap();
        if state.base.is_none() {
            state.base = Some(defaults);
        }
    }

    /// Deletes the settings record and every store override.
    pub fn uninstall(&self) {
        let mut state = self.state.write().unwrap();
        state.base = None;
        state.overrides.clear();
    }

    pub fn is_installed(&self) -> bool {
        self.state.read().unwrap().base.is_some()
    }

    /// Effective settings for a store scope: the base record with the
    /// store's field overrides applied on top.
    pub fn load_setting(
        &self,
        store_scope: u32,
    ) -> Result<MolliePaymentSettings, SettingServiceError> {
        let state = self.state.read().unwrap();
        let base = state
            .base
            .as_ref()
            .ok_or(SettingServiceError::NotInstalled)?;
        let mut settings = base.clone();
        if store_scope != ALL_STORES_SCOPE {
            if let Some(overrides) = state.overrides.get(&store_scope) {
                if let Some(use_sandbox) = overrides.use_sandbox {
                    settings.use_sandbox = use_sandbox;
                }
                if let Some(key) = &overrides.api_live_key {
                    settings.api_live_key = key.clone();
                }
                if let Some(key) = &overrides.api_test_key {
                    settings.api_test_key = key.clone();
                }
            }
        }
        Ok(settings)
    }

    pub fn setting_exists(&self, field: SettingField, store_scope: u32) -> bool {
        let state = self.state.read().unwrap();
        state
            .overrides
            .get(&store_scope)
            .map(|overrides| match field {
                SettingField::UseSandbox => overrides.use_sandbox.is_some(),
                SettingField::ApiLiveKey => overrides.api_live_key.is_some(),
                SettingField::ApiTestKey => overrides.api_test_key.is_some(),
            })
            .unwrap_or(false)
    }

    /// Saves a configuration form. Scope 0 writes the base record; a store
    /// scope stores an override per field whose flag is set and drops the
    /// override where the flag is cleared.
    pub fn save_setting_overridable_per_store(
        &self,
        form: SettingsForm,
        store_scope: u32,
    ) -> Result<(), SettingServiceError> {
        let mut state = self.state.write().unwrap();
        if state.base.is_none() {
            return Err(SettingServiceError::NotInstalled);
        }
        if store_scope == ALL_STORES_SCOPE {
            state.base = Some(MolliePaymentSettings {
                use_sandbox: form.use_sandbox,
                api_live_key: form.api_live_key,
                api_test_key: form.api_test_key,
            });
            return Ok(());
        }

        let overrides = state.overrides.entry(store_scope).or_default();
        overrides.use_sandbox = form.use_sandbox_override_for_store.then_some(form.use_sandbox);
        overrides.api_live_key = form
            .api_live_key_override_for_store
            .then_some(form.api_live_key);
        overrides.api_test_key = form
            .api_test_key_override_for_store
            .then_some(form.api_test_key);
        if overrides.is_empty() {
            state.overrides.remove(&store_scope);
        }
        Ok(())
    }
}
