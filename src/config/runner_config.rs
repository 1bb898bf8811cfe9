use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    ext::BestEffortPathExt,
    harness::{HarnessCommand, HarnessCommandError},
};

pub const DEFAULT_CONFIG_FILE: &str = "runner.yaml";
pub const DEFAULT_TEST_ROOT: &str = "./test262/test";
pub const DEFAULT_JS_CMP_PATH: &str = "./js_cmp";

/// Selected when no target is named anywhere.
pub const DEFAULT_SELECTION: &str = "built-ins";

/// Settings of a run.
///
/// ```yaml
/// testRoot: ./test262/test
/// jsCmpPath: ./js_cmp
/// harness: test262-harness --hostType=node --hostPath=node
/// select: [built-ins, language]
/// deselect: [intl402]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Directory whose layout is turned into the tree.
    pub test_root: PathBuf,
    /// Path of the js_cmp compiler. Carried along but not used by the
    /// traversal.
    pub js_cmp_path: PathBuf,
    pub harness: HarnessCommand,
    /// Names whose subtrees get selected, in order.
    pub select: Vec<String>,
    /// Names whose subtrees get deselected after all selections.
    pub deselect: Vec<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            test_root: PathBuf::from(DEFAULT_TEST_ROOT),
            js_cmp_path: PathBuf::from(DEFAULT_JS_CMP_PATH),
            harness: HarnessCommand::default(),
            select: Vec::new(),
            deselect: Vec::new(),
        }
    }
}

impl RunnerConfig {
    /// Reads the config file at `path`.
    ///
    /// A missing file yields the defaults unless `required` is set.
    pub async fn read(path: &Path, required: bool) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.best_effort_path_display());
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound && !required => {
                info!(
                    "No config file at {}, using defaults",
                    path.best_effort_path_display()
                );
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                });
            }
        };
        debug!("Successfully read config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        contents.as_str().try_into()
    }

    /// The names to select, falling back to [`DEFAULT_SELECTION`].
    pub fn selection(&self) -> Vec<&str> {
        if self.select.is_empty() {
            vec![DEFAULT_SELECTION]
        } else {
            self.select.iter().map(String::as_str).collect()
        }
    }
}

impl TryFrom<&str> for RunnerConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let contents = contents_vec.first().ok_or(ConfigError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(ConfigError::TopLevelNotMap)?;

        let mut config = Self::default();
        if let Some(test_root) = string_field(top_level, "testRoot")? {
            config.test_root = PathBuf::from(test_root);
        }
        if let Some(js_cmp_path) = string_field(top_level, "jsCmpPath")? {
            config.js_cmp_path = PathBuf::from(js_cmp_path);
        }
        if let Some(harness) = string_field(top_level, "harness")? {
            config.harness = harness.parse().context(HarnessSnafu)?;
        }
        config.select = names_field(top_level, "select")?;
        config.deselect = names_field(top_level, "deselect")?;

        Ok(config)
    }
}

fn field<'a, 'input>(
    mapping: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
    key: &'static str,
) -> Option<&'a Yaml<'input>> {
    match mapping.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
        None | Some(Yaml::Value(Scalar::Null)) => None,
        Some(value) => Some(value),
    }
}

fn string_field(
    mapping: &LinkedHashMap<Yaml, Yaml>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    field(mapping, key)
        .map(|value| {
            value.as_str().map(str::to_string).context(InvalidFieldSnafu {
                field: key,
                expected: "a string",
            })
        })
        .transpose()
}

/// Accepts either a single name or a list of names. Non-string list items
/// are skipped.
fn names_field(
    mapping: &LinkedHashMap<Yaml, Yaml>,
    key: &'static str,
) -> Result<Vec<String>, ConfigError> {
    let Some(value) = field(mapping, key) else {
        return Ok(Vec::new());
    };
    if let Some(name) = value.as_str() {
        return Ok(vec![name.to_string()]);
    }

    let names = value
        .as_sequence()
        .context(InvalidFieldSnafu {
            field: key,
            expected: "a name or a list of names",
        })?
        .iter()
        .filter_map(|item| {
            let name = item.as_str().map(str::to_string);
            if name.is_none() {
                warn!("Skipping non-string entry in '{}': {:?}", key, item);
            }
            name
        })
        .collect();

    Ok(names)
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Config field '{}' should be {}", field, expected))]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[snafu(display("Invalid harness command in config"))]
    HarnessError { source: HarnessCommandError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn defaults_match_the_test262_layout() {
        let config = RunnerConfig::default();
        assert_eq!(config.test_root, PathBuf::from("./test262/test"));
        assert_eq!(config.js_cmp_path, PathBuf::from("./js_cmp"));
        assert_eq!(
            config.harness.to_string(),
            "test262-harness --hostType=node --hostPath=node"
        );
        assert!(config.select.is_empty());
        assert!(config.deselect.is_empty());
    }

    #[test]
    fn selection_falls_back_to_built_ins() {
        let mut config = RunnerConfig::default();
        assert_eq!(config.selection(), vec!["built-ins"]);

        config.select = vec!["language".into(), "annexB".into()];
        assert_eq!(config.selection(), vec!["language", "annexB"]);
    }

    #[test]
    fn config_parses_all_fields() {
        let yaml = r#"
testRoot: /suites/test262/test
jsCmpPath: ./build/js_cmp
harness: "harness --hostArgs='--use-strict' -t 11"
select:
  - built-ins
  - language
deselect: [intl402]
"#;
        let config: RunnerConfig = yaml.try_into().unwrap();
        assert_eq!(config.test_root, PathBuf::from("/suites/test262/test"));
        assert_eq!(config.js_cmp_path, PathBuf::from("./build/js_cmp"));
        assert_eq!(config.harness.program(), "harness");
        assert_eq!(config.harness.args(), ["--hostArgs=--use-strict", "-t", "11"]);
        assert_eq!(config.select, vec!["built-ins", "language"]);
        assert_eq!(config.deselect, vec!["intl402"]);
    }

    #[test]
    fn config_keeps_defaults_for_missing_fields() {
        let config: RunnerConfig = "select: language".try_into().unwrap();
        assert_eq!(config.select, vec!["language"]);
        assert_eq!(config.test_root, PathBuf::from(DEFAULT_TEST_ROOT));
        assert_eq!(config.harness, HarnessCommand::default());
    }

    #[test]
    fn config_treats_null_as_missing() {
        let config: RunnerConfig = "testRoot:\nselect: ~".try_into().unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[test]
    fn config_skips_non_string_names() {
        let config: RunnerConfig = "select: [built-ins, 42, {a: b}, language]"
            .try_into()
            .unwrap();
        assert_eq!(config.select, vec!["built-ins", "language"]);
    }

    #[test]
    fn config_returns_error_on_invalid_yaml() {
        let result: Result<RunnerConfig, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn config_returns_error_on_empty_file() {
        let result: Result<RunnerConfig, _> = "".try_into();
        assert!(matches!(result, Err(ConfigError::MalformedConfig)));
    }

    #[test]
    fn config_returns_error_when_top_level_is_not_map() {
        let result: Result<RunnerConfig, _> = "- item1\n- item2".try_into();
        assert!(matches!(result, Err(ConfigError::TopLevelNotMap)));
    }

    #[test]
    fn config_returns_error_on_wrongly_typed_field() {
        let result: Result<RunnerConfig, _> = "testRoot: [a, b]".try_into();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField {
                field: "testRoot",
                ..
            })
        ));

        let result: Result<RunnerConfig, _> = "select: {a: b}".try_into();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField { field: "select", .. })
        ));
    }

    #[test]
    fn config_returns_error_on_empty_harness() {
        let result: Result<RunnerConfig, _> = "harness: \"  \"".try_into();
        assert!(matches!(result, Err(ConfigError::HarnessError { .. })));
    }

    #[compio::test]
    async fn read_missing_optional_file_yields_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

        let config = RunnerConfig::read(&path, false).await.unwrap();
        assert_eq!(config, RunnerConfig::default());
    }

    #[compio::test]
    async fn read_missing_required_file_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nonexistent.yaml");

        let result = RunnerConfig::read(&path, true).await;
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[compio::test]
    async fn read_parses_file_contents() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "testRoot: ./suite\nselect: [Array]").unwrap();

        let config = RunnerConfig::read(temp_file.path(), true).await.unwrap();
        assert_eq!(config.test_root, PathBuf::from("./suite"));
        assert_eq!(config.select, vec!["Array"]);
    }
}
