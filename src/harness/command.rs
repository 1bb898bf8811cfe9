use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use snafu::{ResultExt, Snafu};

/// Harness used when nothing else is configured.
pub const DEFAULT_HARNESS: &str = "test262-harness --hostType=node --hostPath=node";

/// Appended to a directory to select every test file below it.
pub const TEST_GLOB_SUFFIX: &str = "/**/*.js";

/// The harness program and the arguments that precede the test glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessCommand {
    program: String,
    args: Vec<String>,
}

impl HarnessCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The invocation running every test file below `dir`.
    pub fn invocation_for(&self, dir: &Path) -> HarnessInvocation {
        let mut glob = dir.as_os_str().to_owned();
        glob.push(TEST_GLOB_SUFFIX);

        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.push(glob);

        HarnessInvocation {
            program: OsString::from(&self.program),
            args,
        }
    }
}

impl Default for HarnessCommand {
    fn default() -> Self {
        Self::from_str(DEFAULT_HARNESS)
            .unwrap_or_else(|_| Self::new("test262-harness", Vec::new()))
    }
}

/// Splits a command line the way a POSIX shell would tokenize it, without
/// performing any expansion.
impl FromStr for HarnessCommand {
    type Err = HarnessCommandError;

    fn from_str(command_line: &str) -> Result<Self, Self::Err> {
        let mut words = shell_words::split(command_line)
            .context(SplitSnafu {
                command_line: command_line.to_string(),
            })?
            .into_iter();
        let program = words.next().ok_or(HarnessCommandError::EmptyCommand)?;
        Ok(Self::new(program, words.collect()))
    }
}

/// Quotes only words that would otherwise split, so flags such as
/// `--hostType=node` print as written.
impl fmt::Display for HarnessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program()).chain(self.args().iter().map(String::as_str));
        for (index, word) in words.enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            if word.is_empty() || word.contains(char::is_whitespace) {
                f.write_str(&shell_words::quote(word))?;
            } else {
                f.write_str(word)?;
            }
        }
        Ok(())
    }
}

/// A single, fully resolved harness launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessInvocation {
    program: OsString,
    args: Vec<OsString>,
}

impl HarnessInvocation {
    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for HarnessInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum HarnessCommandError {
    #[snafu(display("Failed to split harness command '{}'", command_line))]
    SplitError {
        command_line: String,
        source: shell_words::ParseError,
    },
    #[snafu(display("Harness command is empty"))]
    EmptyCommand,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn default_harness_targets_node() {
        let command = HarnessCommand::default();
        assert_eq!(command.program(), "test262-harness");
        assert_eq!(command.args(), ["--hostType=node", "--hostPath=node"]);
    }

    #[test]
    fn parse_keeps_quoted_words_together() {
        let command: HarnessCommand = r#"harness --hostArgs="--use-strict -x" -t 11"#
            .parse()
            .unwrap();
        assert_eq!(command.program(), "harness");
        assert_eq!(command.args(), ["--hostArgs=--use-strict -x", "-t", "11"]);
    }

    #[test]
    fn parse_strict_mode_node_harness() {
        let command: HarnessCommand =
            r#"test262-harness --hostType=node --hostPath=node --hostArgs="--use-strict" -t 11"#
                .parse()
                .unwrap();
        assert_eq!(command.program(), "test262-harness");
        assert_eq!(
            command.args(),
            [
                "--hostType=node",
                "--hostPath=node",
                "--hostArgs=--use-strict",
                "-t",
                "11"
            ]
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn parse_rejects_empty_command(#[case] command_line: &str) {
        let result = command_line.parse::<HarnessCommand>();
        assert!(matches!(result, Err(HarnessCommandError::EmptyCommand)));
    }

    #[test]
    fn parse_rejects_unbalanced_quotes() {
        let result = "harness 'unterminated".parse::<HarnessCommand>();
        assert!(matches!(result, Err(HarnessCommandError::SplitError { .. })));
    }

    #[test]
    fn invocation_appends_glob_as_single_argument() {
        let command = HarnessCommand::default();
        let invocation = command.invocation_for(Path::new("./test262/test/built-ins"));

        assert_eq!(invocation.program(), "test262-harness");
        assert_eq!(
            invocation.args(),
            [
                OsString::from("--hostType=node"),
                OsString::from("--hostPath=node"),
                OsString::from("./test262/test/built-ins/**/*.js"),
            ]
        );
    }

    #[test]
    fn invocation_does_not_interpret_shell_metacharacters() {
        let command = HarnessCommand::new("harness", Vec::new());
        let invocation = command.invocation_for(Path::new("dir; rm -rf $HOME"));
        assert_eq!(invocation.args(), [OsString::from("dir; rm -rf $HOME/**/*.js")]);
    }

    #[test]
    fn invocation_display_matches_command_line_form() {
        let invocation = HarnessCommand::default().invocation_for(Path::new("suite/B"));
        assert_eq!(
            invocation.to_string(),
            "test262-harness --hostType=node --hostPath=node suite/B/**/*.js"
        );
    }

    #[test]
    fn command_display_round_trips_through_parse() {
        let command = HarnessCommand::new("harness", vec!["two words".into(), "-t".into()]);
        let reparsed: HarnessCommand = command.to_string().parse().unwrap();
        assert_eq!(reparsed, command);
    }
}
