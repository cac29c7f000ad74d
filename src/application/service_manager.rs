//! Install and uninstall orchestration.
//!
//! Steps run in order and the first failure aborts the rest. Completed
//! steps are not rolled back.

use std::path::{Path, PathBuf};

use crate::domain::{
    AppError, Result, ServiceId, ServiceLayout, Settings, VariableMap, DIR_KEY,
};
use crate::infrastructure::{ProcessOutcome, ProcessRunner};

use super::config_deployer::deploy_config;
use super::env_persister::{persist_env, PersistSummary};
use super::wrapper::{deploy_wrapper, invoke_wrapper, WrapperVerb};

/// Everything one install needs, fixed before any step runs.
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub id: ServiceId,
    pub layout: ServiceLayout,
    pub wrapper_source: PathBuf,
    pub source_config: PathBuf,
    pub variables: VariableMap,
    pub overwrite: bool,
}

impl InstallContext {
    /// Build the context for installing `source_config`.
    ///
    /// The source config's absolute directory is exposed as `dir`,
    /// replacing any user-supplied value.
    ///
    /// # Errors
    /// Returns `InvalidServiceId` for an unusable file name and
    /// `SourceNotFound` if the config does not exist.
    pub fn new(
        settings: &Settings,
        source_config: &Path,
        mut variables: VariableMap,
        overwrite: bool,
    ) -> Result<Self> {
        let id = ServiceId::from_config_path(source_config)?;

        if !source_config.is_file() {
            return Err(AppError::SourceNotFound {
                path: source_config.to_path_buf(),
            });
        }

        let absolute = std::path::absolute(source_config).map_err(|e| {
            AppError::io(format!("Failed to resolve {}", source_config.display()), e)
        })?;
        let dir = absolute.parent().unwrap_or(&absolute);
        variables.insert(DIR_KEY.to_string(), dir.display().to_string());

        Ok(Self {
            layout: ServiceLayout::resolve(settings, &id),
            id,
            wrapper_source: settings.wrapper.clone(),
            source_config: source_config.to_path_buf(),
            variables,
            overwrite,
        })
    }
}

/// Result of a completed install.
#[derive(Debug)]
pub struct InstallReport {
    pub layout: ServiceLayout,
    pub env: PersistSummary,
    pub install: ProcessOutcome,
    pub start: ProcessOutcome,
}

/// Deploys and controls services through the wrapper executable.
pub struct ServiceManager<'a> {
    settings: Settings,
    runner: &'a dyn ProcessRunner,
}

impl<'a> ServiceManager<'a> {
    /// Create a new service manager.
    #[must_use]
    pub const fn new(settings: Settings, runner: &'a dyn ProcessRunner) -> Self {
        Self { settings, runner }
    }

    /// Resolve the layout of an installed or prospective service.
    ///
    /// # Errors
    /// Returns `InvalidServiceId` if `id` is unusable.
    pub fn layout(&self, id: &str) -> Result<ServiceLayout> {
        let id = ServiceId::new(id)?;
        Ok(ServiceLayout::resolve(&self.settings, &id))
    }

    /// Deploy, register and start the service described by `source_config`.
    ///
    /// # Errors
    /// Propagates the first failing step.
    pub fn install(
        &self,
        source_config: &Path,
        variables: VariableMap,
        overwrite: bool,
    ) -> Result<InstallReport> {
        let ctx = InstallContext::new(&self.settings, source_config, variables, overwrite)?;
        tracing::info!(id = %ctx.id, overwrite, "Installing service");

        deploy_wrapper(&ctx.layout, &ctx.wrapper_source, ctx.overwrite)?;

        let deployed = deploy_config(&ctx.source_config, &ctx.layout.target_config, &ctx.variables)?;
        tracing::debug!(
            bytes = deployed.rendered.len(),
            vars = deployed.persistent_vars.len(),
            "Service config rendered"
        );
        let env = persist_env(self.runner, &deployed.persistent_vars);

        let install = invoke_wrapper(self.runner, &ctx.layout.target_wrapper, WrapperVerb::Install)?;
        let start = invoke_wrapper(self.runner, &ctx.layout.target_wrapper, WrapperVerb::Start)?;

        Ok(InstallReport {
            layout: ctx.layout,
            env,
            install,
            start,
        })
    }

    /// Unregister the service. Its directories are left in place.
    ///
    /// # Errors
    /// Returns `NotInstalled` if no wrapper is deployed for `id`.
    pub fn uninstall(&self, id: &str) -> Result<ServiceLayout> {
        let layout = self.control(id, WrapperVerb::Uninstall)?.0;

        println!(
            "Done. You should manually remove directory {} and {}",
            layout.bin_dir.display(),
            layout.data_dir.display()
        );

        Ok(layout)
    }

    /// Forward `verb` to the deployed wrapper of `id`.
    ///
    /// # Errors
    /// Returns `NotInstalled` if no wrapper is deployed for `id`.
    pub fn control(&self, id: &str, verb: WrapperVerb) -> Result<(ServiceLayout, ProcessOutcome)> {
        let layout = self.layout(id)?;

        if !layout.target_wrapper.is_file() {
            return Err(AppError::NotInstalled {
                id: id.to_string(),
                path: layout.target_wrapper,
            });
        }

        tracing::info!(id, %verb, "Controlling service");
        let outcome = invoke_wrapper(self.runner, &layout.target_wrapper, verb)?;

        Ok((layout, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::process::testing::FakeRunner;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const TEMPLATE: &str = r#"<service>
  <id>{{name}}</id>
  <executable>{{dir}}/app.exe</executable>
  <persistent_env name="APP_HOME" value="{{dir}}"/>
  <persistent_env name="APP_PORT" value="{{port}}"/>
</service>
"#;

    struct Fixture {
        root: TempDir,
        settings: Settings,
        config: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempdir().unwrap();
        let settings = Settings {
            service_bin: root.path().join("bin"),
            service_data: root.path().join("data"),
            wrapper: root.path().join("winsw.exe"),
        };
        fs::write(&settings.wrapper, b"wrapper-v1").unwrap();

        let src = root.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let config = src.join("web.xml");
        fs::write(&config, TEMPLATE).unwrap();

        Fixture {
            root,
            settings,
            config,
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> VariableMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_context_adds_source_dir() {
        let fx = fixture();
        let ctx = InstallContext::new(
            &fx.settings,
            &fx.config,
            vars(&[("dir", "user"), ("a", "1")]),
            false,
        )
        .unwrap();

        assert_eq!(ctx.id.as_str(), "web");
        assert_eq!(ctx.variables["a"], "1");
        assert_eq!(
            PathBuf::from(&ctx.variables[DIR_KEY]),
            std::path::absolute(fx.root.path().join("src")).unwrap()
        );
    }

    #[test]
    fn test_context_missing_source() {
        let fx = fixture();
        let err = InstallContext::new(
            &fx.settings,
            &fx.root.path().join("absent.xml"),
            VariableMap::new(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::SourceNotFound { .. }));
        assert!(err.is_expected());
    }

    #[test]
    fn test_install_runs_full_sequence() {
        let fx = fixture();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings.clone(), &runner);

        let report = manager
            .install(&fx.config, vars(&[("name", "web"), ("port", "80")]), false)
            .unwrap();

        let layout = report.layout;
        assert!(layout.data_dir.is_dir());
        assert_eq!(fs::read(&layout.target_wrapper).unwrap(), b"wrapper-v1");

        let rendered = fs::read_to_string(&layout.target_config).unwrap();
        assert!(rendered.contains("<id>web</id>"));
        assert!(rendered.ends_with("</service>\n"));
        assert_eq!(report.env.exported, 2);

        let calls = runner.calls.borrow();
        let sequence: Vec<&str> = calls.iter().map(|(_, args)| args[0].as_str()).collect();
        assert_eq!(sequence, vec!["APP_HOME", "APP_PORT", "install", "start"]);
        assert_eq!(calls[1].1, vec!["APP_PORT", "80", "/M"]);
        assert_eq!(calls[2].0, layout.target_wrapper.to_string_lossy());
    }

    #[test]
    fn test_install_refuses_existing_bin_dir() {
        let fx = fixture();
        let bin_dir = fx.settings.service_bin.join("web");
        fs::create_dir_all(&bin_dir).unwrap();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings.clone(), &runner);

        let err = manager
            .install(&fx.config, VariableMap::new(), false)
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyExists { ref path } if path == &bin_dir));
        assert!(err.is_expected());
        assert_eq!(fs::read_dir(&bin_dir).unwrap().count(), 0);
        assert!(!fx.settings.service_data.join("web").exists());
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_install_overwrite_replaces_contents() {
        let fx = fixture();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings.clone(), &runner);
        manager
            .install(&fx.config, vars(&[("name", "old")]), false)
            .unwrap();

        fs::write(&fx.settings.wrapper, b"wrapper-v2").unwrap();
        let report = manager
            .install(&fx.config, vars(&[("name", "new")]), true)
            .unwrap();

        let layout = report.layout;
        assert_eq!(fs::read(&layout.target_wrapper).unwrap(), b"wrapper-v2");
        let rendered = fs::read_to_string(&layout.target_config).unwrap();
        assert!(rendered.contains("<id>new</id>"));
        assert!(!rendered.contains("<id>old</id>"));
    }

    #[test]
    fn test_install_aborts_on_malformed_render() {
        let fx = fixture();
        fs::write(&fx.config, "<service><id>{{name}}</service>").unwrap();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings.clone(), &runner);

        let err = manager
            .install(&fx.config, VariableMap::new(), false)
            .unwrap_err();

        assert!(matches!(err, AppError::XmlParse { .. }));
        assert_eq!(runner.calls_with_arg("install"), 0);
        assert_eq!(runner.calls_with_arg("start"), 0);
    }

    #[test]
    fn test_install_continues_after_wrapper_failure_code() {
        let fx = fixture();
        let mut runner = FakeRunner::default();
        runner.exit_codes.insert("install".into(), 1);
        let manager = ServiceManager::new(fx.settings.clone(), &runner);

        let report = manager
            .install(&fx.config, VariableMap::new(), false)
            .unwrap();

        assert_eq!(report.install.code, Some(1));
        assert_eq!(runner.calls_with_arg("start"), 1);
    }

    #[test]
    fn test_install_escapes_special_values() {
        let fx = fixture();
        fs::write(
            &fx.config,
            r#"<service><arguments>{{args}}</arguments><persistent_env name="X" value="{{v}}"/></service>"#,
        )
        .unwrap();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings.clone(), &runner);

        let report = manager
            .install(
                &fx.config,
                vars(&[("args", "--a=1&b=2"), ("v", r#"say "hi""#)]),
                false,
            )
            .unwrap();

        let rendered = fs::read_to_string(&report.layout.target_config).unwrap();
        assert!(rendered.contains("<arguments>--a=1&amp;b=2</arguments>"));
        assert_eq!(report.env.exported, 1);

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].1, vec!["X", r#"say "hi""#, "/M"]);
    }

    #[test]
    fn test_uninstall_keeps_directories() {
        let fx = fixture();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings.clone(), &runner);
        manager
            .install(&fx.config, VariableMap::new(), false)
            .unwrap();

        let layout = manager.uninstall("web").unwrap();

        assert_eq!(runner.calls_with_arg("uninstall"), 1);
        assert!(layout.bin_dir.is_dir());
        assert!(layout.data_dir.is_dir());
        assert!(layout.target_wrapper.is_file());
    }

    #[test]
    fn test_uninstall_unknown_service() {
        let fx = fixture();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings, &runner);

        let err = manager.uninstall("ghost").unwrap_err();

        assert!(matches!(err, AppError::NotInstalled { .. }));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_control_forwards_verb() {
        let fx = fixture();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings.clone(), &runner);
        manager
            .install(&fx.config, VariableMap::new(), false)
            .unwrap();

        manager.control("web", WrapperVerb::Restart).unwrap();

        assert_eq!(runner.calls_with_arg("restart"), 1);
    }

    #[test]
    fn test_control_rejects_bad_id() {
        let fx = fixture();
        let runner = FakeRunner::default();
        let manager = ServiceManager::new(fx.settings, &runner);

        for id in ["../etc", "C:foo"] {
            let err = manager.control(id, WrapperVerb::Stop).unwrap_err();
            assert!(matches!(err, AppError::InvalidServiceId { .. }));
            assert!(manager.layout(id).is_err());
        }
    }
}
