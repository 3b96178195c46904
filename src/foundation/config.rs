use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::error::{FfError, FfResult};

/// Environment variable overriding [`EngineConfig::binary_folder`].
pub const BINARY_FOLDER_ENV: &str = "FFWEAVE_BINARY_FOLDER";

/// Engine-level settings shared by every run of a processor.
///
/// Loadable from JSON; missing fields fall back to [`EngineConfig::default`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Folder holding the `ffmpeg`/`ffprobe` binaries. `None` resolves them through `PATH`.
    pub binary_folder: Option<PathBuf>,
    /// Working directory for spawned processes. `None` inherits the caller's.
    pub working_directory: Option<PathBuf>,
    /// How long a cancelled engine gets to exit after the graceful stop request.
    pub termination_grace_ms: u64,
    /// Exit-watcher polling interval.
    pub poll_interval_ms: u64,
    /// Number of diagnostic lines kept for error reporting.
    pub diagnostic_tail_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary_folder: None,
            working_directory: None,
            termination_grace_ms: 2_000,
            poll_interval_ms: 20,
            diagnostic_tail_lines: 64,
        }
    }
}

impl EngineConfig {
    /// Defaults, with the binary folder taken from `FFWEAVE_BINARY_FOLDER` when set.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(folder) = std::env::var_os(BINARY_FOLDER_ENV)
            && !folder.is_empty()
        {
            cfg.binary_folder = Some(PathBuf::from(folder));
        }
        cfg
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> FfResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path)
            .with_context(|| format!("read engine config '{}'", path.display()))?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(raw: &[u8]) -> FfResult<Self> {
        let cfg: Self = serde_json::from_slice(raw)
            .map_err(|e| FfError::configuration(format!("invalid engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges.
    pub fn validate(&self) -> FfResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(FfError::configuration(
                "poll_interval_ms must be non-zero",
            ));
        }
        if self.diagnostic_tail_lines == 0 {
            return Err(FfError::configuration(
                "diagnostic_tail_lines must be non-zero",
            ));
        }
        Ok(())
    }

    /// Builder-style binary folder override.
    pub fn with_binary_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.binary_folder = Some(folder.into());
        self
    }

    /// Builder-style working directory override.
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Builder-style termination grace override.
    pub fn with_termination_grace(mut self, grace: Duration) -> Self {
        self.termination_grace_ms = grace.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    /// Grace interval between the graceful stop request and a forceful kill.
    pub fn termination_grace(&self) -> Duration {
        Duration::from_millis(self.termination_grace_ms)
    }

    /// Exit-watcher polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Resolved `ffmpeg` program.
    pub fn ffmpeg_path(&self) -> PathBuf {
        self.binary_path("ffmpeg")
    }

    /// Resolved `ffprobe` program.
    pub fn ffprobe_path(&self) -> PathBuf {
        self.binary_path("ffprobe")
    }

    fn binary_path(&self, name: &str) -> PathBuf {
        let file = format!("{name}{}", std::env::consts::EXE_SUFFIX);
        match &self.binary_folder {
            Some(folder) => folder.join(file),
            None => PathBuf::from(file),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
