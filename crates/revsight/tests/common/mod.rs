#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Throwaway git repository with deterministic identity settings.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let fixture = Self { dir };
        fixture.git(&["init", "--quiet"]);
        fixture.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        fixture
    }

    /// Repository with `lib/util.ts` committed twice on `main`.
    pub fn with_history() -> Self {
        let fixture = Self::empty();
        fixture.write("lib/util.ts", "export const answer = 41;\n");
        fixture.commit("first");
        fixture.write("lib/util.ts", "export const answer = 42;\n");
        fixture.commit("second");
        fixture
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().canonicalize().expect("canonical root")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn commit(&self, message: &str) {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "-m", message]);
    }

    pub fn git(&self, args: &[&str]) -> String {
        run_git(self.dir.path(), args)
    }
}

pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Revsight Tests",
            "-c",
            "user.email=tests@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "init.defaultBranch=main",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("git is installed");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}
