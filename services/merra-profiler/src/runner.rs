//! Running the radiative-transfer model on a document.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::ModelConfig;

#[derive(Error, Debug)]
pub enum RunnerError {
    /// Could not create an output capture file
    #[error("failed to create {path}: {source}")]
    Capture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The executable could not be started
    #[error("failed to run {executable}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Runs the model executable with stdout and stderr captured beside the
/// document as `.out` and `.err`.
#[derive(Debug, Clone)]
pub struct ModelRunner {
    executable: PathBuf,
    args: Vec<String>,
}

impl ModelRunner {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            args: config.args.clone(),
        }
    }

    /// Run on `document` and wait for the model to exit.
    pub async fn run(&self, document: &Path) -> Result<ExitStatus, RunnerError> {
        let stdout = capture(&document.with_extension("out"))?;
        let stderr = capture(&document.with_extension("err"))?;

        let status = Command::new(&self.executable)
            .args(&self.args)
            .arg(document)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .await
            .map_err(|source| RunnerError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        if status.success() {
            debug!(document = %document.display(), "Model run complete");
        } else {
            warn!(document = %document.display(), status = %status, "Model exited with failure");
        }
        Ok(status)
    }
}

fn capture(path: &Path) -> Result<Stdio, RunnerError> {
    std::fs::File::create(path)
        .map(Stdio::from)
        .map_err(|source| RunnerError::Capture {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use test_utils::temp_test_dir;

    #[tokio::test]
    async fn test_captures_output() {
        let dir = temp_test_dir();
        let document = dir.path().join("site_2010y07m04d00h.amc");
        std::fs::write(&document, "f 0 GHz  400 GHz  1000 MHz\n").unwrap();

        let runner = ModelRunner::new(&ModelConfig {
            executable: PathBuf::from("cat"),
            args: vec![],
        });
        let status = runner.run(&document).await.unwrap();

        assert!(status.success());
        let out = std::fs::read_to_string(dir.path().join("site_2010y07m04d00h.out")).unwrap();
        assert_eq!(out, "f 0 GHz  400 GHz  1000 MHz\n");
        assert!(dir.path().join("site_2010y07m04d00h.err").exists());
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let dir = temp_test_dir();
        let document = dir.path().join("x.amc");
        std::fs::write(&document, "").unwrap();

        let runner = ModelRunner::new(&ModelConfig {
            executable: PathBuf::from("/nonexistent/am"),
            args: vec![],
        });
        let err = runner.run(&document).await.unwrap_err();
        assert!(matches!(err, RunnerError::Spawn { .. }));
    }
}
