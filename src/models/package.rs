use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::debug;

use crate::{
    core::events::ProvisionEvent,
    error::{ProcessFailure, ProvisionError},
};

use super::{layout::ensure_dir, manager::PackageModel};

/// A fully built package manager command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInvocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub prefix: PathBuf,
}

impl PackageInvocation {
    /// `<program> <manager args…> <package> --prefix=<install_dir>`
    pub fn for_package(descriptor: &PackageModel, install_dir: &Path) -> Self {
        let mut args: Vec<OsString> = descriptor
            .manager
            .args
            .iter()
            .map(OsString::from)
            .collect();
        args.push(OsString::from(&descriptor.package_name));
        let mut prefix_flag = OsString::from("--prefix=");
        prefix_flag.push(install_dir.as_os_str());
        args.push(prefix_flag);
        Self {
            program: descriptor.manager.program.clone(),
            args,
            prefix: install_dir.to_path_buf(),
        }
    }
}

/// Exit information of a finished process. `code` is `None` when a signal ended it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

pub trait ProcessRunner {
    /// Runs the invocation to completion.
    fn run(&self, invocation: &PackageInvocation) -> io::Result<ProcessExit>;
}

/// Spawns the package manager directly, sharing this process's stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &PackageInvocation) -> io::Result<ProcessExit> {
        debug!("Running {} {:?}", invocation.program, invocation.args);
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        Ok(ProcessExit {
            code: status.code(),
        })
    }
}

/// Installs the package-managed model family. The package manager runs on every
/// call and decides on its own whether anything needs doing.
pub struct PackageAcquirer<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> PackageAcquirer<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    pub fn ensure_installed(
        &self,
        descriptor: &PackageModel,
        install_dir: &Path,
        on_event: &mut dyn FnMut(ProvisionEvent),
    ) -> Result<(), ProvisionError> {
        ensure_dir(install_dir)?;

        let invocation = PackageInvocation::for_package(descriptor, install_dir);
        on_event(ProvisionEvent::PackageInstalling {
            package: descriptor.package_name.clone(),
            prefix: invocation.prefix.clone(),
        });

        let failure = |reason| ProvisionError::ExternalProcess {
            package: descriptor.package_name.clone(),
            program: descriptor.manager.program.clone(),
            reason,
        };
        let exit = self
            .runner
            .run(&invocation)
            .map_err(|error| failure(ProcessFailure::Spawn(error)))?;
        match exit.code {
            Some(0) => {}
            Some(code) => return Err(failure(ProcessFailure::ExitCode(code))),
            None => return Err(failure(ProcessFailure::Terminated)),
        }

        on_event(ProvisionEvent::PackageInstalled {
            package: descriptor.package_name.clone(),
            prefix: invocation.prefix,
        });
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use tempfile::TempDir;

    use super::*;
    use crate::models::manager::PackageManager;

    /// Records every invocation and answers with a fixed exit code.
    pub(crate) struct SpyRunner {
        pub invocations: RefCell<Vec<PackageInvocation>>,
        pub exit_code: Option<i32>,
    }

    impl SpyRunner {
        pub(crate) fn succeeding() -> Self {
            Self::exiting(Some(0))
        }

        pub(crate) fn exiting(exit_code: Option<i32>) -> Self {
            Self {
                invocations: RefCell::new(Vec::new()),
                exit_code,
            }
        }
    }

    impl ProcessRunner for SpyRunner {
        fn run(&self, invocation: &PackageInvocation) -> io::Result<ProcessExit> {
            self.invocations.borrow_mut().push(invocation.clone());
            Ok(ProcessExit {
                code: self.exit_code,
            })
        }
    }

    fn spacy() -> PackageModel {
        PackageModel {
            package_name: "de_core_news_sm".into(),
            family_dir: "spacy".into(),
            manager: PackageManager::spacy("python3"),
        }
    }

    #[test]
    fn invocation_uses_argument_list_with_prefix() {
        let invocation = PackageInvocation::for_package(&spacy(), Path::new("/data/models/spacy dir"));
        assert_eq!(invocation.program, "python3");
        assert_eq!(
            invocation.args,
            ["-m", "spacy", "download", "de_core_news_sm", "--prefix=/data/models/spacy dir"]
                .map(OsString::from)
                .to_vec()
        );
    }

    #[test]
    fn creates_install_dir_and_runs_once() {
        let tmp = TempDir::new().expect("create temp dir");
        let install_dir = tmp.path().join("models/spacy");
        let runner = SpyRunner::succeeding();
        let mut events = Vec::new();

        PackageAcquirer::new(&runner)
            .ensure_installed(&spacy(), &install_dir, &mut |event| events.push(event))
            .expect("install package");

        assert!(install_dir.is_dir());
        assert_eq!(runner.invocations.borrow().len(), 1);
        assert_eq!(runner.invocations.borrow()[0].prefix, install_dir);
        assert!(matches!(
            events.as_slice(),
            [
                ProvisionEvent::PackageInstalling { .. },
                ProvisionEvent::PackageInstalled { .. }
            ]
        ));
    }

    #[test]
    fn non_zero_exit_is_reported() {
        let tmp = TempDir::new().expect("create temp dir");
        let runner = SpyRunner::exiting(Some(1));

        let error = PackageAcquirer::new(&runner)
            .ensure_installed(&spacy(), tmp.path(), &mut |_| {})
            .expect_err("exit code 1 must fail");

        match error {
            ProvisionError::ExternalProcess {
                package, reason, ..
            } => {
                assert_eq!(package, "de_core_news_sm");
                assert!(matches!(reason, ProcessFailure::ExitCode(1)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn signal_termination_is_reported() {
        let tmp = TempDir::new().expect("create temp dir");
        let runner = SpyRunner::exiting(None);

        let error = PackageAcquirer::new(&runner)
            .ensure_installed(&spacy(), tmp.path(), &mut |_| {})
            .expect_err("signal must fail");

        assert!(matches!(
            error,
            ProvisionError::ExternalProcess {
                reason: ProcessFailure::Terminated,
                ..
            }
        ));
    }

    #[test]
    fn missing_program_is_spawn_failure() {
        let tmp = TempDir::new().expect("create temp dir");
        let descriptor = PackageModel {
            manager: PackageManager {
                program: "/definitely/missing/package-manager".into(),
                args: vec!["install".into()],
            },
            ..spacy()
        };

        let error = PackageAcquirer::new(&SystemRunner)
            .ensure_installed(&descriptor, tmp.path(), &mut |_| {})
            .expect_err("missing binary must fail");

        assert!(matches!(
            error,
            ProvisionError::ExternalProcess {
                reason: ProcessFailure::Spawn(_),
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_code() {
        let invocation = PackageInvocation {
            program: "/bin/sh".into(),
            args: vec!["-c".into(), "exit 3".into()],
            prefix: PathBuf::from("/tmp"),
        };
        let exit = SystemRunner.run(&invocation).expect("run sh");
        assert_eq!(exit.code, Some(3));
    }
}
