//! Session settings - persisted `settings.yaml` plus command-line overrides

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{HOME_DIR_NAME, HOME_ENV, NAMESPACES_DIR, RESPONSES_DIR, SETTINGS_FILE};
use crate::error::{RequesterError, Result};

/// Command-line flags. Anything given here wins over `settings.yaml`.
#[derive(Debug, Default, Parser)]
#[command(name = "requester", version, about = "Fire named HTTP requests per environment and archive the responses")]
pub struct Cli {
    /// Configuration home (defaults to ~/.requester)
    #[arg(long, env = HOME_ENV)]
    pub home: Option<PathBuf>,

    /// Namespace to load instead of prompting
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Mode (key of urlByMode) to run against
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Reload the namespace before every request
    #[arg(long)]
    pub live_reload: bool,

    /// Archive only the decoded body instead of the full envelope
    #[arg(long)]
    pub content_only: bool,

    /// Write sample settings and namespace files, then exit
    #[arg(long)]
    pub init: bool,
}

/// On-disk shape of `settings.yaml`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    mode: Option<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    live_reload: bool,
    #[serde(default)]
    content_only: bool,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    responses_dir: Option<PathBuf>,
    #[serde(default)]
    log_level: Option<String>,
}

/// Effective settings for one session
#[derive(Clone, Debug)]
pub struct Settings {
    pub home: PathBuf,
    pub mode: String,
    pub namespace: Option<String>,
    pub live_reload: bool,
    pub content_only: bool,
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
    pub responses_dir: PathBuf,
    pub log_level: tracing::Level,
}

impl Settings {
    /// Load `settings.yaml` from the resolved home and apply CLI overrides
    pub fn load(cli: &Cli) -> Result<Self> {
        let home = resolve_home(cli.home.as_deref());
        let path = home.join(SETTINGS_FILE);
        let content = fs::read_to_string(&path).map_err(|e| {
            RequesterError::malformed(&path, format!("cannot read settings ({}); run with --init", e))
        })?;
        let file: SettingsFile =
            serde_yaml::from_str(&content).map_err(|e| RequesterError::malformed(&path, e))?;
        Self::from_parts(home, &path, file, cli)
    }

    fn from_parts(home: PathBuf, path: &Path, file: SettingsFile, cli: &Cli) -> Result<Self> {
        let mode = cli
            .mode
            .clone()
            .or(file.mode)
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| RequesterError::malformed(path, "'mode' is required"))?;

        let log_level = match file.log_level.as_deref() {
            None => tracing::Level::INFO,
            Some(level) => level
                .parse()
                .map_err(|_| RequesterError::malformed(path, format!("unknown logLevel '{}'", level)))?,
        };

        let responses_dir = match file.responses_dir {
            Some(dir) if dir.is_relative() => home.join(dir),
            Some(dir) => dir,
            None => home.join(RESPONSES_DIR),
        };

        Ok(Settings {
            mode,
            namespace: cli.namespace.clone().or(file.namespace),
            live_reload: cli.live_reload || file.live_reload,
            content_only: cli.content_only || file.content_only,
            timeout_secs: file.timeout_secs,
            responses_dir,
            log_level,
            home,
        })
    }

    pub fn namespaces_dir(&self) -> PathBuf {
        self.home.join(NAMESPACES_DIR)
    }
}

/// `--home`/`REQUESTER_HOME`, else `~/.requester`, else `./.requester`
pub fn resolve_home(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(HOME_DIR_NAME),
    }
}

const SAMPLE_SETTINGS: &str = r#"# Mode to run against; must be a key of urlByMode in the chosen namespace
mode: DEV
# Fixed namespace; omit to pick one at startup
# namespace: billing
# Reload the namespace file before every request
liveReload: false
# Archive only the response body instead of {status, reason, headers, content}
contentOnly: false
# Request timeout in seconds; omit to wait for the peer
# timeoutSecs: 30
"#;

const SAMPLE_NAMESPACE: &str = r#"# Copy this file to <name>.yaml to create a namespace
urlByMode:
  PROD: https://api.example.com
  DEV: https://dev.api.example.com
  LOCAL: http://localhost:8080
common:
  headers:
    Accept: application/json
  body:
    data:
      ApiKey: replace-me
requests:
  list_users:
    method: GET
    endpoint: users
  activate_user:
    method: POST
    endpoint: users
    action: activate
    id: 42
    body:
      data:
        reason: manual
  local_only_reset:
    method: DELETE
    endpoint: cache
    mode: LOCAL
"#;

/// Write sample files that do not exist yet; returns the paths written
pub fn write_samples(home: &Path) -> Result<Vec<PathBuf>> {
    let namespaces = home.join(NAMESPACES_DIR);
    fs::create_dir_all(&namespaces).map_err(|e| RequesterError::io(&namespaces, e))?;

    let mut written = Vec::new();
    for (path, content) in [
        (home.join(SETTINGS_FILE), SAMPLE_SETTINGS),
        (namespaces.join("example.yaml"), SAMPLE_NAMESPACE),
    ] {
        if path.exists() {
            continue;
        }
        fs::write(&path, content).map_err(|e| RequesterError::io(&path, e))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cli_for(home: &Path) -> Cli {
        Cli {
            home: Some(home.to_path_buf()),
            ..Cli::default()
        }
    }

    #[test]
    fn test_load_with_overrides() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "mode: DEV\nnamespace: billing\ncontentOnly: true\nresponsesDir: out\n",
        )
        .unwrap();

        let mut cli = cli_for(dir.path());
        cli.mode = Some("PROD".into());
        cli.live_reload = true;

        let settings = Settings::load(&cli).unwrap();
        assert_eq!(settings.mode, "PROD");
        assert_eq!(settings.namespace.as_deref(), Some("billing"));
        assert!(settings.live_reload);
        assert!(settings.content_only);
        assert_eq!(settings.timeout_secs, None);
        assert_eq!(settings.responses_dir, dir.path().join("out"));
    }

    #[test]
    fn test_timeout_and_log_level() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "mode: DEV\ntimeoutSecs: 1\nlogLevel: debug\nresponsesDir: /var/tmp/answers\n",
        )
        .unwrap();
        let settings = Settings::load(&cli_for(dir.path())).unwrap();
        assert_eq!(settings.timeout_secs, Some(1));
        assert_eq!(settings.log_level, tracing::Level::DEBUG);
        assert_eq!(settings.responses_dir, PathBuf::from("/var/tmp/answers"));

        fs::write(dir.path().join(SETTINGS_FILE), "mode: DEV\nlogLevel: loud\n").unwrap();
        assert!(Settings::load(&cli_for(dir.path())).is_err());
    }

    #[test]
    fn test_missing_mode_is_malformed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "liveReload: true\n").unwrap();
        let err = Settings::load(&cli_for(dir.path())).unwrap_err();
        assert!(matches!(err, RequesterError::ConfigMalformed { .. }));
    }

    #[test]
    fn test_missing_file_is_malformed() {
        let dir = tempdir().unwrap();
        let err = Settings::load(&cli_for(dir.path())).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_samples_parse_and_are_not_overwritten() {
        let dir = tempdir().unwrap();
        let written = write_samples(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(write_samples(dir.path()).unwrap().is_empty());

        let settings = Settings::load(&cli_for(dir.path())).unwrap();
        assert_eq!(settings.mode, "DEV");

        let doc = fs::read_to_string(dir.path().join(NAMESPACES_DIR).join("example.yaml")).unwrap();
        let ns: crate::models::Namespace = serde_yaml::from_str(&doc).unwrap();
        assert_eq!(ns.requests.len(), 3);
    }
}
