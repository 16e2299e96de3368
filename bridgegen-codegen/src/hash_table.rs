//! External perfect-hash table generation.

use std::{
    io::Write,
    process::{Command, Stdio},
    thread,
};

use crate::error::{CodegenError, Result};

/// Turns a keyword table description into C++ lookup code.
///
/// The pipeline only depends on this trait, so tests can substitute a
/// deterministic in-process implementation.
pub trait HashTableGenerator {
    fn generate(&self, input: &str) -> Result<String>;
}

/// Runs an external program (gperf by default), feeding `input` on stdin
/// and returning its stdout.
#[derive(Debug, Clone)]
pub struct ProcessHashTable {
    program: String,
    args: Vec<String>,
}

impl ProcessHashTable {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn failure(&self, status: impl Into<String>, stderr: impl Into<String>) -> CodegenError {
        CodegenError::ExternalTool {
            program: self.program.clone(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }
}

impl Default for ProcessHashTable {
    fn default() -> Self {
        Self::new("gperf", vec!["--language=C++".to_string()])
    }
}

impl HashTableGenerator for ProcessHashTable {
    fn generate(&self, input: &str) -> Result<String> {
        tracing::debug!(program = %self.program, bytes = input.len(), "running hash table generator");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.failure("not started", e.to_string()))?;

        // Feed stdin from another thread so a large output cannot deadlock
        // against a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| self.failure("not awaited", e.to_string()))?;

        let written = writer.map(|writer| writer.join());

        // The tool may exit before reading all of its input, so its status
        // is checked before the writer's broken pipe.
        if !output.status.success() {
            return Err(self.failure(
                output.status.to_string(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        match written {
            Some(Ok(Err(e))) => return Err(self.failure("stdin closed", e.to_string())),
            Some(Err(_)) => return Err(self.failure("stdin closed", "writer thread panicked")),
            Some(Ok(Ok(()))) | None => {}
        }
        String::from_utf8(output.stdout).map_err(|e| self.failure("invalid output", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_reported() {
        let tool = ProcessHashTable::new("bridgegen-no-such-hash-tool", vec![]);
        let err = tool.generate("%%\nfoo\n").unwrap_err();
        assert!(matches!(
            err,
            CodegenError::ExternalTool { ref program, .. } if program == "bridgegen-no-such-hash-tool"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdout_is_returned() {
        let tool = ProcessHashTable::new("cat", vec![]);
        assert_eq!(tool.generate("table body").unwrap(), "table body");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_fatal() {
        let tool = ProcessHashTable::new("false", vec![]);
        assert!(matches!(
            tool.generate("x").unwrap_err(),
            CodegenError::ExternalTool { .. }
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_early_exit_keeps_tool_stderr() {
        let tool = ProcessHashTable::new(
            "sh",
            vec!["-c".to_string(), "echo duplicate keyword >&2; exit 3".to_string()],
        );
        let err = tool.generate(&"x".repeat(4 << 20)).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::ExternalTool { ref status, ref stderr, .. }
                if stderr == "duplicate keyword" && status.contains('3')
        ));
    }

    #[test]
    fn test_default_is_gperf() {
        assert_eq!(ProcessHashTable::default().program(), "gperf");
    }
}
