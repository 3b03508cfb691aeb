use thiserror::Error;

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if settings.server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }
        if settings.server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if settings.swarm.max_agents_per_type == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "swarm.max_agents_per_type".to_string(),
                reason: "Each role pool must allow at least one agent".to_string(),
            });
        }

        if settings.sparc.enabled && settings.sparc.max_iterations == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "sparc.max_iterations".to_string(),
                reason: "Iteration budget must be at least 1".to_string(),
            });
        }
        if settings.boomerang.enabled && settings.boomerang.max_iterations == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "boomerang.max_iterations".to_string(),
                reason: "Iteration budget must be at least 1".to_string(),
            });
        }

        // Workflow and boomerang execution both run tasks through the
        // generation provider, so one must be configured while they are on.
        if (settings.sparc.enabled || settings.boomerang.enabled) && settings.generation.is_none() {
            errors.push(ValidationError::MissingField(
                "generation (required while sparc or boomerang is enabled)".to_string(),
            ));
        }

        if let Some(generation) = &settings.generation {
            if generation.model.is_empty() {
                errors.push(ValidationError::MissingField("generation.model".to_string()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerSettings;
    use crate::swarm::config::{GenerationConfig, GenerationProviderType};

    fn valid_settings() -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            swarm: Default::default(),
            sparc: Default::default(),
            boomerang: Default::default(),
            generation: Some(GenerationConfig {
                provider: GenerationProviderType::Ollama,
                model: "llama3".to_string(),
                base_url: None,
                api_key_env: None,
                temperature: Some(0.2),
                max_tokens: Some(2048),
            }),
        }
    }

    #[test]
    fn valid_settings_pass() {
        assert!(ConfigValidator::validate(&valid_settings()).is_ok());
    }

    #[test]
    fn zero_agent_cap_is_rejected() {
        let mut settings = valid_settings();
        settings.swarm.max_agents_per_type = 0;
        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("max_agents_per_type")));
    }

    #[test]
    fn missing_generation_is_rejected_while_sparc_enabled() {
        let mut settings = valid_settings();
        settings.generation = None;
        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("generation")));
    }

    #[test]
    fn generation_is_optional_when_engines_are_off() {
        let mut settings = valid_settings();
        settings.generation = None;
        settings.sparc.enabled = false;
        settings.boomerang.enabled = false;
        assert!(ConfigValidator::validate(&settings).is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        assert!(ConfigValidator::validate(&settings).is_err());
    }
}
