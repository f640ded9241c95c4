//! Application specification entity
//!
//! Immutable description of one managed application: where its build output
//! lives, which environment to boot it in, which hosts to prepare and which
//! subtrees to leave out of staging.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::{ApplicationName, IgnorePatterns};
use crate::error::StagehandResult;

/// Per-host arguments handed to the bootstrapper's `start`.
pub type HostArguments = BTreeMap<String, Vec<String>>;

/// Environment used when none is given.
pub const DEFAULT_ENVIRONMENT: &str = "local";

/// A host to prepare, with the arguments passed to it at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub name: String,
    pub arguments: Vec<String>,
}

impl HostSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Everything needed to run one application.
#[derive(Debug, Clone)]
pub struct ApplicationSpec {
    name: ApplicationName,
    source: PathBuf,
    environment: String,
    hosts: Vec<HostSpec>,
    ignored_paths: Vec<String>,
    ignore: IgnorePatterns,
    bootstrapper: Option<String>,
}

impl ApplicationSpec {
    /// Start building a spec for the given source path.
    pub fn builder(source: impl Into<PathBuf>) -> ApplicationSpecBuilder {
        ApplicationSpecBuilder::new(source.into())
    }

    pub fn name(&self) -> &ApplicationName {
        &self.name
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn hosts(&self) -> &[HostSpec] {
        &self.hosts
    }

    pub fn ignored_paths(&self) -> &[String] {
        &self.ignored_paths
    }

    pub fn ignore(&self) -> &IgnorePatterns {
        &self.ignore
    }

    /// Bootstrapper program overriding the configured default.
    pub fn bootstrapper(&self) -> Option<&str> {
        self.bootstrapper.as_deref()
    }

    /// Host arguments keyed by host name, as passed to `start`.
    pub fn host_arguments(&self) -> HostArguments {
        self.hosts
            .iter()
            .map(|h| (h.name.clone(), h.arguments.clone()))
            .collect()
    }
}

/// Builder for [`ApplicationSpec`].
#[derive(Debug, Clone)]
pub struct ApplicationSpecBuilder {
    source: PathBuf,
    name: Option<String>,
    environment: Option<String>,
    hosts: Vec<HostSpec>,
    ignored_paths: Vec<String>,
    bootstrapper: Option<String>,
}

impl ApplicationSpecBuilder {
    fn new(source: PathBuf) -> Self {
        Self {
            source,
            name: None,
            environment: None,
            hosts: Vec::new(),
            ignored_paths: Vec::new(),
            bootstrapper: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn host(mut self, host: HostSpec) -> Self {
        self.hosts.push(host);
        self
    }

    pub fn hosts(mut self, hosts: impl IntoIterator<Item = HostSpec>) -> Self {
        self.hosts.extend(hosts);
        self
    }

    pub fn ignored_path(mut self, pattern: impl Into<String>) -> Self {
        self.ignored_paths.push(pattern.into());
        self
    }

    pub fn ignored_paths(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.ignored_paths.extend(patterns);
        self
    }

    pub fn bootstrapper(mut self, program: impl Into<String>) -> Self {
        self.bootstrapper = Some(program.into());
        self
    }

    /// Validate patterns, make the source absolute and derive the name.
    pub fn build(self) -> StagehandResult<ApplicationSpec> {
        let ignore = IgnorePatterns::compile(&self.ignored_paths)?;
        let source = std::path::absolute(&self.source)?;

        let name = match self.name.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => ApplicationName::explicit(explicit),
            _ => ApplicationName::from_path(&source),
        };

        let environment = self
            .environment
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        Ok(ApplicationSpec {
            name,
            source,
            environment,
            hosts: self.hosts,
            ignored_paths: self.ignored_paths,
            ignore,
            bootstrapper: self.bootstrapper.filter(|b| !b.trim().is_empty()),
        })
    }
}
