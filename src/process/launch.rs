//! Immutable launch specifications.
//!
//! A [`LaunchSpec`] is the complete argument vector for one child process:
//! `[program, runtime flags..., entry point, program args...]`. It is built
//! once per launch through [`LaunchSpecBuilder`] and never mutated afterwards.

use std::path::PathBuf;

use super::LaunchError;

/// Ordered argument vector for a single child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl LaunchSpec {
    /// Start building a spec for the given executable or interpreter.
    #[must_use]
    pub fn builder(program: impl Into<String>) -> LaunchSpecBuilder {
        LaunchSpecBuilder::new(program)
    }

    /// Build a spec from a raw argument vector whose first element is the program.
    ///
    /// # Errors
    ///
    /// Returns `LaunchError::EmptyArgv` if the vector is empty.
    pub fn from_argv<I, S>(argv: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = argv.into_iter().map(Into::into);
        let program = iter.next().ok_or(LaunchError::EmptyArgv)?;
        Ok(Self {
            program,
            args: iter.collect(),
            working_dir: None,
        })
    }

    /// The executable or interpreter.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Everything after the program, in launch order.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Working directory for the child, if one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }

    /// The full argument vector, program first.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Shell-quoted command line, for logs and diagnostics only.
    ///
    /// The child is never started through a shell.
    #[must_use]
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|a| shell_escape::escape(a.into()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Builder for [`LaunchSpec`].
///
/// Runtime flags always precede the entry point, and program arguments always
/// follow it, regardless of the order builder methods are called in.
#[derive(Debug, Clone, Default)]
pub struct LaunchSpecBuilder {
    program: String,
    flags: Vec<String>,
    entry_point: Option<String>,
    program_args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl LaunchSpecBuilder {
    /// Create a builder for the given program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Append one runtime flag.
    #[must_use]
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    /// Append several runtime flags, in order.
    #[must_use]
    pub fn flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flags.extend(flags.into_iter().map(Into::into));
        self
    }

    /// Append whitespace-separated runtime flags read from an environment variable.
    ///
    /// An unset or empty variable adds nothing.
    #[must_use]
    pub fn flags_from_env(self, var: &str) -> Self {
        match std::env::var(var) {
            Ok(value) => {
                let extra: Vec<String> = value.split_whitespace().map(String::from).collect();
                if !extra.is_empty() {
                    tracing::debug!(var, flags = ?extra, "Adding runtime flags from environment");
                }
                self.flags(extra)
            }
            Err(_) => self,
        }
    }

    /// Set the entry point (main class, script, ...).
    #[must_use]
    pub fn entry_point(mut self, entry: impl Into<String>) -> Self {
        self.entry_point = Some(entry.into());
        self
    }

    /// Append one program argument after the entry point.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.program_args.push(arg.into());
        self
    }

    /// Append several program arguments after the entry point.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.program_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the child.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Freeze the builder into a [`LaunchSpec`].
    #[must_use]
    pub fn build(self) -> LaunchSpec {
        let mut args = self.flags;
        args.extend(self.entry_point);
        args.extend(self.program_args);
        LaunchSpec {
            program: self.program,
            args,
            working_dir: self.working_dir,
        }
    }
}
