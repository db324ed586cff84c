//! Stand-in listing utilities for integration tests.
//!
//! Each fixture is a small `/bin/sh` script written into a temp directory
//! and made executable. Tests point `TaskListConfig::with_program` (or
//! `PL_TASKLIST_BIN` for the binary) at it.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Output of `tasklist /fo csv /nh` on a quiet machine.
pub const DEFAULT_ROWS: &[&str] = &[
    r#""System Idle Process","0","Services","0","8 K""#,
    r#""notepad.exe","1234","Console","1","6,000 K""#,
    r#""notepad.exe","5678","Console","1","1,234 K""#,
];

/// Message the utility prints when a filter matches nothing.
pub const NO_MATCH: &str = "INFO: No tasks are running which match the specified criteria.";

pub struct FakeTaskList {
    dir: TempDir,
    program: PathBuf,
}

impl FakeTaskList {
    /// Script with the given body (no shebang).
    pub fn with_body(body: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let program = dir.path().join("tasklist");
        fs::write(&program, format!("#!/bin/sh\n{}\n", body)).expect("write script");
        let mut perms = fs::metadata(&program).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&program, perms).expect("chmod");
        Self { dir, program }
    }

    /// Script that prints `lines` with CRLF endings and exits with `code`.
    pub fn printing(lines: &[&str], code: i32) -> Self {
        let mut body = String::new();
        for line in lines {
            body.push_str(&format!("printf '%s\\r\\n' '{}'\n", line));
        }
        body.push_str(&format!("exit {}\n", code));
        Self::with_body(&body)
    }

    /// Script that records its arguments, one per line, then prints `lines`.
    pub fn recording(lines: &[&str]) -> Self {
        let fake = Self::printing(lines, 0);
        let args_file = fake.args_file();
        let script = fs::read_to_string(&fake.program).expect("read script");
        let script = script.replacen(
            "#!/bin/sh\n",
            &format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n", args_file.display()),
            1,
        );
        fs::write(&fake.program, script).expect("rewrite script");
        fake
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn program_str(&self) -> String {
        self.program.display().to_string()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    fn args_file(&self) -> PathBuf {
        self.dir.path().join("args.txt")
    }

    /// Arguments seen by the last run of a `recording` fixture.
    pub fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(self.args_file())
            .expect("fixture was not run")
            .lines()
            .map(str::to_string)
            .collect()
    }
}
