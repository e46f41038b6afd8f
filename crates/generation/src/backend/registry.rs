//! Backend registry for runtime backend selection
//!
//! The registry maps backend names from the configuration onto factory
//! functions. Unlike model lifecycles there is nothing to start or stop:
//! a backend is constructed once from its settings and used for the life
//! of the service.

use std::collections::HashMap;

use super::gemini::{GeminiBackend, DEFAULT_MODEL};
use super::scripted::ScriptedBackend;
use super::{BackendInfo, BackendSettings, GenerationBackend, GenerationError};

/// Factory trait for creating backend instances
pub trait BackendFactory: Send + Sync {
    /// Create a new backend instance from the given settings
    fn create(&self, settings: &BackendSettings) -> Result<Box<dyn GenerationBackend>, GenerationError>;

    /// Get information about this backend
    fn info(&self) -> BackendInfo;
}

/// Factory for the Gemini backend
pub struct GeminiFactory;

impl BackendFactory for GeminiFactory {
    fn create(&self, settings: &BackendSettings) -> Result<Box<dyn GenerationBackend>, GenerationError> {
        let model = settings
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let backend = match &settings.base_url {
            Some(url) => GeminiBackend::with_base_url(settings.api_key.clone(), model, url.clone()),
            None => GeminiBackend::new(settings.api_key.clone(), model),
        };
        Ok(Box::new(backend))
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "gemini".to_string(),
            description: "Google Gemini generateContent API".to_string(),
            requires_api_key: true,
        }
    }
}

/// Factory for the scripted backend
pub struct ScriptedFactory;

impl BackendFactory for ScriptedFactory {
    fn create(&self, _settings: &BackendSettings) -> Result<Box<dyn GenerationBackend>, GenerationError> {
        Ok(Box::new(ScriptedBackend::new()))
    }

    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: "scripted".to_string(),
            description: "Canned responses for tests and offline use".to_string(),
            requires_api_key: false,
        }
    }
}

/// Registry of available generation backends
pub struct BackendRegistry {
    factories: HashMap<String, Box<dyn BackendFactory>>,
}

impl BackendRegistry {
    /// Create a new registry with the built-in backends registered
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("gemini", Box::new(GeminiFactory));
        registry.register("scripted", Box::new(ScriptedFactory));
        registry
    }

    /// Register a backend factory
    pub fn register(&mut self, name: &str, factory: Box<dyn BackendFactory>) {
        self.factories.insert(name.to_string(), factory);
    }

    /// Get information about all registered backends
    pub fn list(&self) -> Vec<BackendInfo> {
        self.factories.values().map(|f| f.info()).collect()
    }

    /// Create a backend instance by name
    pub fn create(
        &self,
        name: &str,
        settings: &BackendSettings,
    ) -> Result<Box<dyn GenerationBackend>, GenerationError> {
        self.factories
            .get(name)
            .ok_or_else(|| {
                GenerationError::Config(format!("unknown generation backend: {}", name))
            })?
            .create(settings)
    }

    /// Check if a backend is available
    pub fn is_available(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
