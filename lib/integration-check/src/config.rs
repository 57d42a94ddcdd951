//! Integration configuration loading.

use std::{borrow::Cow, path::Path};

use figment::{
    error::Kind,
    providers::{Env, Format as _, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Deserialize};
use snafu::Snafu;
use tracing::debug;

use super::{GenericError, Mapping};

/// A configuration error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum ConfigurationError {
    /// Requested field was missing from the configuration.
    #[snafu(display("Missing field '{}' in configuration. {}", field, help_text))]
    MissingField {
        /// Help text describing how to set the missing field.
        help_text: String,

        /// Name of the missing field.
        field: Cow<'static, str>,
    },

    /// Requested field's data type was not the expected data type.
    #[snafu(display(
        "Expected value for field '{}' to be '{}', got '{}' instead.",
        field,
        expected_ty,
        actual_ty
    ))]
    InvalidFieldType {
        /// Period-separated path to the field.
        field: String,

        /// Expected data type.
        expected_ty: String,

        /// Actual data type.
        actual_ty: String,
    },

    /// Field was present and well-typed, but its value is not acceptable.
    #[snafu(display("Invalid value for field '{}': {}", field, reason))]
    InvalidValue {
        /// Name of the invalid field.
        field: Cow<'static, str>,

        /// Why the value was rejected.
        reason: String,
    },

    /// Generic configuration error.
    #[snafu(display("Failed to load configuration: {}", source))]
    Generic {
        /// Error source.
        source: GenericError,
    },
}

impl ConfigurationError {
    /// Creates a `MissingField` error with the given help text.
    pub fn missing_field(field: impl Into<Cow<'static, str>>, help_text: impl Into<String>) -> Self {
        Self::MissingField {
            help_text: help_text.into(),
            field: field.into(),
        }
    }

    /// Creates an `InvalidValue` error.
    pub fn invalid_value(field: impl Into<Cow<'static, str>>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigurationError {
    fn from(e: figment::Error) -> Self {
        match e.kind {
            Kind::InvalidType(actual_ty, expected_ty) => Self::InvalidFieldType {
                field: e.path.join("."),
                expected_ty,
                actual_ty: actual_ty.to_string(),
            },
            Kind::MissingField(field) => Self::MissingField {
                help_text: "Add it to the configuration file.".to_string(),
                field,
            },
            _ => Self::Generic { source: e.into() },
        }
    }
}

/// An integration's configuration file: shared `init_config` plus one mapping per instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntegrationConfig {
    pub init_config: Mapping,
    pub instances: Vec<Mapping>,
}

#[derive(Deserialize)]
struct RawIntegrationConfig {
    #[serde(default)]
    init_config: Option<Mapping>,

    #[serde(default)]
    instances: Option<Vec<Mapping>>,
}

/// Loads integration configuration from YAML files, YAML strings and the environment.
///
/// Sources added later take precedence over sources added earlier.
#[derive(Default)]
pub struct ConfigurationLoader {
    figment: Figment,
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the given YAML configuration file.
    ///
    /// # Errors
    ///
    /// If the file does not exist, an error will be returned. Parse errors surface when the configuration is extracted.
    pub fn from_yaml<P>(mut self, path: P) -> Result<Self, ConfigurationError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigurationError::Generic {
                source: GenericError::msg(format!("configuration file '{}' not found", path.display())),
            });
        }

        debug!(file_path = %path.display(), "Loading YAML configuration file.");
        self.figment = self.figment.admerge(Yaml::file(path));
        Ok(self)
    }

    /// Loads configuration from a YAML document.
    pub fn from_yaml_str(mut self, yaml: &str) -> Self {
        self.figment = self.figment.admerge(Yaml::string(yaml));
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// The prefix given will have an underscore appended to it if it does not already end with one. Nested keys are
    /// separated by a double underscore, so `DD_IBM_MQ_INIT_CONFIG__TIMEOUT` sets `init_config.timeout` for a prefix of
    /// `DD_IBM_MQ`.
    ///
    /// # Errors
    ///
    /// If the prefix is empty, an error will be returned.
    pub fn from_environment(mut self, prefix: &str) -> Result<Self, ConfigurationError> {
        if prefix.is_empty() {
            return Err(ConfigurationError::invalid_value(
                "environment prefix",
                "must not be empty",
            ));
        }

        let prefix = if prefix.ends_with('_') {
            prefix.to_string()
        } else {
            format!("{}_", prefix)
        };
        self.figment = self.figment.admerge(Env::prefixed(&prefix).split("__"));
        Ok(self)
    }

    /// Consumes the loader, deserializing the merged configuration as `T`.
    ///
    /// # Errors
    ///
    /// If the configuration could not be deserialized into `T`, an error will be returned.
    pub fn into_typed<T>(self) -> Result<T, ConfigurationError>
    where
        T: DeserializeOwned,
    {
        self.figment.extract().map_err(Into::into)
    }

    /// Consumes the loader, producing the integration's `init_config` and instances.
    ///
    /// A missing or empty `init_config` yields an empty mapping.
    ///
    /// # Errors
    ///
    /// If the configuration has no instances, or does not have the expected shape, an error will be returned.
    pub fn into_integration_config(self) -> Result<IntegrationConfig, ConfigurationError> {
        let raw: RawIntegrationConfig = self.into_typed()?;
        let instances = raw.instances.filter(|instances| !instances.is_empty()).ok_or_else(|| {
            ConfigurationError::missing_field("instances", "At least one instance must be configured.")
        })?;

        Ok(IntegrationConfig {
            init_config: raw.init_config.unwrap_or_default(),
            instances,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_yaml::Value;

    use super::*;

    const CONFIG: &str = r#"
init_config:

instances:
  - channel: DEV.ADMIN.SVRCONN
    queue_manager: QM1
    port: 11414
  - channel: DEV.APP.SVRCONN
    queue_manager: QM2
"#;

    fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
        mapping.get(Value::String(key.to_string()))
    }

    #[test]
    fn loads_instances() {
        let config = ConfigurationLoader::new()
            .from_yaml_str(CONFIG)
            .into_integration_config()
            .expect("should load configuration");

        assert!(config.init_config.is_empty());
        assert_eq!(config.instances.len(), 2);
        assert_eq!(
            get(&config.instances[0], "queue_manager").and_then(Value::as_str),
            Some("QM1")
        );
        assert_eq!(get(&config.instances[0], "port").and_then(Value::as_i64), Some(11414));
    }

    #[test]
    fn later_sources_take_precedence() {
        let config = ConfigurationLoader::new()
            .from_yaml_str("init_config:\n  timeout: 5\ninstances:\n  - channel: A\n")
            .from_yaml_str("init_config:\n  timeout: 10\n")
            .into_integration_config()
            .expect("should load configuration");

        assert_eq!(get(&config.init_config, "timeout").and_then(Value::as_i64), Some(10));
    }

    #[test]
    fn environment_overrides_init_config() {
        std::env::set_var("DD_INTEGRATION_CHECK_TEST_INIT_CONFIG__SERVICE", "mq");
        let config = ConfigurationLoader::new()
            .from_yaml_str("instances:\n  - channel: A\n")
            .from_environment("DD_INTEGRATION_CHECK_TEST")
            .expect("should accept prefix")
            .into_integration_config()
            .expect("should load configuration");

        assert_eq!(get(&config.init_config, "service").and_then(Value::as_str), Some("mq"));
    }

    #[test]
    fn missing_instances() {
        let error = ConfigurationLoader::new()
            .from_yaml_str("init_config: {}\n")
            .into_integration_config()
            .expect_err("should fail");
        assert!(matches!(error, ConfigurationError::MissingField { ref field, .. } if field == "instances"));
    }

    #[test]
    fn empty_prefix_and_missing_file() {
        assert!(ConfigurationLoader::new().from_environment("").is_err());
        assert!(ConfigurationLoader::new()
            .from_yaml("/nonexistent/ibm_mq.yaml")
            .is_err());
    }

    #[test]
    fn invalid_type_is_reported_with_its_path() {
        let error = ConfigurationLoader::new()
            .from_yaml_str("instances: 5\n")
            .into_integration_config()
            .expect_err("should fail");
        assert!(matches!(error, ConfigurationError::InvalidFieldType { .. }));
    }
}
