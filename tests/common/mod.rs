//! Shared test utilities for the CLI end-to-end tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::sample();
//!     fixture.command().arg("layout").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::TestFixture;
}

/// Configuration documents and manifests used across tests.
#[allow(dead_code)]
pub mod configs {
    /// A bundle of four libraries and two tools:
    ///
    /// ```text
    /// curl -> openssl -> zlib
    /// curl -> zlib
    /// openssl ~> cmake (build tool)
    /// protoc -> zlib (tool)
    /// ```
    pub const SAMPLE: &str = r#"
- version: "2.1"
  workbench: oss
  profile: ["gcc{5|8}", vs2019]
- zlib
- openssl
- name: curl
  -profile: vs2019
- name: cmake
  tool: true
- name: protoc
  tool: true
  profile: gcc8
- name: legacy
  repack: true
"#;

    pub const ZLIB: &str = r#"
name: zlib
version: 1.2.11
scheme:
  shared: {}
  static: {}
"#;

    pub const OPENSSL: &str = r#"
name: openssl
version: 1.1.1g
scheme: [shared, static]
dependencies:
  - zlib/1.2.11@epm/stable
build-tools:
  - cmake/3.17.0
"#;

    pub const CURL: &str = r#"
name: curl
version: 7.71.0
dependencies:
  - openssl/1.1.1g
  - zlib/1.2.11
program:
  - curl
"#;

    pub const CMAKE: &str = r#"
name: cmake
version: 3.17.0
"#;

    pub const PROTOC: &str = r#"
name: protoc
version: 3.11.4
dependencies:
  - zlib/1.2.11
"#;

    /// Two packages requiring each other.
    pub const CYCLE: &str = r#"
- profile: [gcc5]
- alpha
- beta
"#;

    pub const ALPHA: &str = "name: alpha\nversion: '1.0'\ndependencies: [beta/1.0]\n";
    pub const BETA: &str = "name: beta\nversion: '1.0'\ndependencies: [alpha/1.0]\n";

    /// Invalid YAML for error testing.
    pub const INVALID_YAML: &str = "- profile: [unclosed\n";
}

/// A temporary bundle directory: `config.yml` plus one directory per
/// package holding its `package.yml`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The bundle described by [`configs::SAMPLE`].
    pub fn sample() -> Self {
        Self::new()
            .with_config(configs::SAMPLE)
            .with_package("zlib", configs::ZLIB)
            .with_package("openssl", configs::OPENSSL)
            .with_package("curl", configs::CURL)
            .with_package("cmake", configs::CMAKE)
            .with_package("protoc", configs::PROTOC)
    }

    /// Write `config.yml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("config.yml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Write `<name>/package.yml` with the given content.
    pub fn with_package(self, name: &str, manifest: &str) -> Self {
        self.temp_dir
            .child(name)
            .child("package.yml")
            .write_str(manifest)
            .expect("Failed to write manifest");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the config file.
    #[allow(dead_code)]
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory, without colors.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("bundle-synthesis");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env_remove("BUNDLE_CONFIG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
