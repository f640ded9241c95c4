//! Reusable application trees and configuration documents.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Base configuration with one app setting.
pub const WEB_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <appSettings>
    <add key="mode" value="local" />
  </appSettings>
</configuration>
"#;

/// Staging overlay for [`WEB_CONFIG`].
pub const WEB_STAGING_CONFIG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration xmlns:xdt="http://schemas.microsoft.com/XML-Document-Transform">
  <appSettings>
    <add key="mode" value="staging" xdt:Transform="SetAttributes" xdt:Locator="Match(key)" />
    <add key="feature" value="on" xdt:Transform="Insert" />
  </appSettings>
</configuration>
"#;

/// A temporary build-output tree.
pub struct SourceTree {
    dir: TempDir,
}

impl SourceTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Tree for a web application: binaries, content, configs and a scratch dir.
    pub fn web_application() -> Self {
        Self::new()
            .file("bin/Shop.dll", "binary")
            .file("content/site.css", "body {}")
            .file("temp/scratch.txt", "scratch")
            .file("web.config", WEB_CONFIG)
    }

    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}
