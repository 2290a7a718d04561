//! Test utilities for specforge integration tests

// Internal imports (std, crate)
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// External imports (alphabetized)
use anyhow::Context;
use tempfile::TempDir;

/// Creates a temporary directory for test inputs
pub fn create_temp_dir() -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let temp_path = temp_dir.path().to_path_buf();
    Ok((temp_dir, temp_path))
}

/// Creates a base OpenAPI spec with a single `Pet` schema
pub fn create_base_spec(dir: &Path) -> anyhow::Result<PathBuf> {
    write_file(
        dir,
        "openapi.yaml",
        r#"
openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
      responses:
        '200':
          description: A list of pets
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
"#,
    )
}

/// Writes `content` to `dir/name`
pub fn write_file(dir: &Path, name: &str, content: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Runs the specforge binary with the given arguments
pub fn run_specforge<I, S>(args: I) -> anyhow::Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_specforge"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .context("Failed to run specforge binary")
}
