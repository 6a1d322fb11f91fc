use crate::error::{GitCountError, Result};
use crate::parse::LOG_FORMAT;
use crate::util::{parse_date_bound, BoundKind};
use chrono::{DateTime, FixedOffset, Utc};
use gix::{discover, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRequest {
    pub with_numstat: bool,
    pub include_merges: bool,
    pub show_progress: bool,
}

impl Default for LogRequest {
    fn default() -> Self {
        Self {
            with_numstat: true,
            include_merges: true,
            show_progress: false,
        }
    }
}

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };

        let repo = discover(&repo_path).map_err(|e| {
            GitCountError::InputUnavailable(format!(
                "not a git repository: {} ({e})",
                repo_path.display()
            ))
        })?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_bound(&self, input: &str, kind: BoundKind) -> Result<DateTime<FixedOffset>> {
        if let Some(dt) = parse_date_bound(input, kind, Utc::now()) {
            return Ok(dt);
        }

        let invalid = |reason: String| GitCountError::InvalidDate(format!("'{input}': {reason}"));

        let id = self
            .repo
            .rev_parse_single(input)
            .map_err(|e| invalid(format!("not a date or revision ({e})")))?;
        let commit = id
            .object()
            .map_err(|e| invalid(e.to_string()))?
            .try_into_commit()
            .map_err(|_| invalid("not a commit".to_string()))?;
        let secs = commit.time().map_err(|e| invalid(e.to_string()))?.seconds;

        DateTime::<Utc>::from_timestamp(secs, 0)
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| invalid(format!("invalid timestamp {secs}")))
    }

    /// Runs `git log` once and returns its raw output. A repository without
    /// commits yields empty text.
    pub fn raw_log(&self, request: &LogRequest) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.path)
            .args(["-c", "core.quotepath=false", "log", "--no-color"])
            .arg(format!("--format={LOG_FORMAT}"));
        if request.with_numstat {
            cmd.arg("--numstat");
        }
        if !request.include_merges {
            cmd.arg("--no-merges");
        }

        let pb = if request.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };
        pb.set_message("Reading commit log...");

        let output = cmd.output().map_err(|e| {
            pb.finish_and_clear();
            GitCountError::InputUnavailable(format!("cannot run git: {e}"))
        })?;
        pb.finish_and_clear();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_unborn_head(&stderr) {
                debug!("repository has no commits yet");
                return Ok(String::new());
            }
            return Err(GitCountError::InputUnavailable(format!(
                "git log failed: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = text.len(), numstat = request.with_numstat, "read commit log");
        Ok(text)
    }
}

fn is_unborn_head(stderr: &str) -> bool {
    stderr.contains("does not have any commits") || stderr.contains("bad default revision 'HEAD'")
}
