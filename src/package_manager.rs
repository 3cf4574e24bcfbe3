// src/package_manager.rs

//! External package manager operations
//!
//! The resolver only needs five operations from the underlying package
//! manager. [`PackageManager`] names them; [`NpmClient`] implements them as
//! npm command lines executed by a [`CommandRunner`].

use crate::command::{shell_quote, CommandOutput, CommandRunner};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Operations delegated to the package manager
pub trait PackageManager {
    /// All versions of `name` published in the registry
    fn published_versions(&self, name: &str) -> Result<Vec<String>>;

    /// Install `name@range` from the registry without touching the manifest
    fn install_from_registry(&self, name: &str, range: &str) -> Result<()>;

    /// Build an archive in `package_dir`
    ///
    /// Returns the archive file name reported by the tool, if any.
    fn pack(&self, label: &str, package_dir: &Path) -> Result<Option<String>>;

    /// Install a local archive without touching the manifest
    fn install_archive(&self, label: &str, archive: &Path) -> Result<()>;

    /// Reinstall everything from the lockfile
    fn clean_install(&self) -> Result<()>;

    /// Whether mutating operations are only logged
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// `npm view --json` prints a bare string when only one version exists
#[derive(Deserialize)]
#[serde(untagged)]
enum PublishedVersions {
    Many(Vec<String>),
    One(String),
}

/// npm-compatible command-line client
pub struct NpmClient<R: CommandRunner> {
    runner: R,
    program: String,
    project_dir: PathBuf,
    dry_run: bool,
}

impl<R: CommandRunner> NpmClient<R> {
    /// Create a client operating on the project at `project_dir`
    pub fn new(runner: R, program: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: program.into(),
            project_dir: project_dir.into(),
            dry_run: false,
        }
    }

    /// Log mutating operations instead of running them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn query(&self, description: &str, command: &str) -> Result<CommandOutput> {
        self.runner
            .run(description, command, Some(&self.project_dir))?
            .check(command)
    }

    fn mutate(&self, description: &str, command: &str, cwd: &Path) -> Result<CommandOutput> {
        if self.dry_run {
            info!("[DRY-RUN] {} ({})", description, command);
            return Ok(CommandOutput::success(""));
        }
        self.runner.run(description, command, Some(cwd))?.check(command)
    }
}

impl<R: CommandRunner> PackageManager for NpmClient<R> {
    fn published_versions(&self, name: &str) -> Result<Vec<String>> {
        let command = format!("{} view {} versions --json", self.program, shell_quote(name));
        let output = self.query(&format!("searching for {}...", name), &command)?;

        let versions: PublishedVersions =
            serde_json::from_str(output.stdout.trim()).map_err(|e| Error::RegistryResponse {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(match versions {
            PublishedVersions::Many(versions) => versions,
            PublishedVersions::One(version) => vec![version],
        })
    }

    fn install_from_registry(&self, name: &str, range: &str) -> Result<()> {
        let spec = format!("{}@{}", name, range);
        let command = format!(
            "{} install {} --no-save --package-lock-only",
            self.program,
            shell_quote(&spec)
        );
        self.mutate(
            &format!("installing {} from registry...", spec),
            &command,
            &self.project_dir,
        )?;
        Ok(())
    }

    fn pack(&self, label: &str, package_dir: &Path) -> Result<Option<String>> {
        let command = format!("{} pack", self.program);
        let output = self.mutate(
            &format!("packing {} from {} ...", label, package_dir.display()),
            &command,
            package_dir,
        )?;

        let archive = output
            .stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(str::to_string);
        Ok(archive)
    }

    fn install_archive(&self, label: &str, archive: &Path) -> Result<()> {
        let command = format!(
            "{} install {} --no-save --package-lock-only",
            self.program,
            shell_quote(&archive.to_string_lossy())
        );
        self.mutate(
            &format!("binding {} to {} ...", label, archive.display()),
            &command,
            &self.project_dir,
        )?;
        Ok(())
    }

    fn clean_install(&self) -> Result<()> {
        let command = format!("{} ci", self.program);
        self.mutate("installing all packages...", &command, &self.project_dir)?;
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned outputs and records every command line
    #[derive(Default)]
    struct ScriptedRunner {
        outputs: RefCell<VecDeque<CommandOutput>>,
        calls: RefCell<Vec<(String, Option<PathBuf>)>>,
    }

    impl ScriptedRunner {
        fn with(outputs: Vec<CommandOutput>) -> Self {
            Self {
                outputs: RefCell::new(outputs.into()),
                calls: RefCell::default(),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(c, _)| c.clone()).collect()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, _description: &str, command: &str, cwd: Option<&Path>) -> Result<CommandOutput> {
            self.calls
                .borrow_mut()
                .push((command.to_string(), cwd.map(Path::to_path_buf)));
            Ok(self
                .outputs
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| CommandOutput::success("")))
        }
    }

    fn client(outputs: Vec<CommandOutput>) -> NpmClient<ScriptedRunner> {
        NpmClient::new(ScriptedRunner::with(outputs), "npm", "/work/app")
    }

    #[test]
    fn test_published_versions_array() {
        let npm = client(vec![CommandOutput::success(r#"["1.0.0", "1.1.0"]"#)]);
        let versions = npm.published_versions("lib-a").unwrap();
        assert_eq!(versions, vec!["1.0.0", "1.1.0"]);
        assert_eq!(npm.runner().commands(), vec!["npm view lib-a versions --json"]);
    }

    #[test]
    fn test_published_versions_single_string() {
        let npm = client(vec![CommandOutput::success("\"0.1.0\"\n")]);
        assert_eq!(npm.published_versions("solo").unwrap(), vec!["0.1.0"]);
    }

    #[test]
    fn test_published_versions_command_failure() {
        let npm = client(vec![CommandOutput::failure(1, "npm ERR! 404")]);
        let err = npm.published_versions("missing").unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: Some(1), .. }));
    }

    #[test]
    fn test_published_versions_garbage() {
        let npm = client(vec![CommandOutput::success("{\"error\": {}}")]);
        let err = npm.published_versions("weird").unwrap_err();
        assert!(matches!(err, Error::RegistryResponse { .. }));
    }

    #[test]
    fn test_install_commands_are_quoted() {
        let npm = client(vec![]);
        npm.install_from_registry("@scope/pkg", ">=1.0.0 <2.0.0").unwrap();
        npm.install_archive("lib-a@^1.0.0", Path::new("/work/my libs/lib-a-1.2.0.tgz"))
            .unwrap();
        assert_eq!(
            npm.runner().commands(),
            vec![
                "npm install '@scope/pkg@>=1.0.0 <2.0.0' --no-save --package-lock-only",
                "npm install '/work/my libs/lib-a-1.2.0.tgz' --no-save --package-lock-only",
            ]
        );
    }

    #[test]
    fn test_pack_runs_in_package_dir() {
        let npm = client(vec![CommandOutput::success("npm notice\nlib-a-1.2.0.tgz\n\n")]);
        let archive = npm.pack("lib-a@^1.0.0", Path::new("/work/lib-a")).unwrap();
        assert_eq!(archive.as_deref(), Some("lib-a-1.2.0.tgz"));
        let calls = npm.runner().calls.borrow();
        assert_eq!(calls[0].0, "npm pack");
        assert_eq!(calls[0].1.as_deref(), Some(Path::new("/work/lib-a")));
    }

    #[test]
    fn test_failed_install_is_error() {
        let npm = client(vec![CommandOutput::failure(1, "ERESOLVE")]);
        assert!(npm.install_from_registry("lib-a", "^1.0.0").is_err());
    }

    #[test]
    fn test_dry_run_skips_mutations() {
        let npm = client(vec![CommandOutput::success("[\"1.0.0\"]")]).dry_run(true);
        npm.published_versions("lib-a").unwrap();
        npm.install_from_registry("lib-a", "^1.0.0").unwrap();
        npm.clean_install().unwrap();
        assert_eq!(npm.runner().commands(), vec!["npm view lib-a versions --json"]);
    }
}
