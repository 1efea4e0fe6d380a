//! Process-backed secondary compiler.

use std::path::PathBuf;
use std::process::Command;

use super::{SecondaryCompiler, SecondaryOutcome};

/// Runs the secondary-language compiler as an external process.
///
/// The harness has no cancellation or timeout contract; a hung compiler
/// is bounded by the surrounding test infrastructure.
#[derive(Clone, Debug)]
pub struct ProcessSecondaryCompiler {
    program: PathBuf,
}

impl ProcessSecondaryCompiler {
    /// Drive the given compiler executable, e.g. `javac`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessSecondaryCompiler {
            program: program.into(),
        }
    }
}

impl SecondaryCompiler for ProcessSecondaryCompiler {
    fn compile(&self, sources: &[PathBuf], options: &[String]) -> SecondaryOutcome {
        let mut command = Command::new(&self.program);
        command.args(options);
        command.args(sources);

        tracing::debug!(program = %self.program.display(), "invoking secondary compiler");

        match command.output() {
            Ok(output) if output.status.success() => SecondaryOutcome::ok(),
            Ok(output) => {
                let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
                let stdout = String::from_utf8_lossy(&output.stdout);
                if !stdout.trim().is_empty() {
                    if !diagnostics.is_empty() {
                        diagnostics.push('\n');
                    }
                    diagnostics.push_str(&stdout);
                }
                if let Some(code) = output.status.code() {
                    diagnostics.push_str(&format!("\n(exit code {code})"));
                }
                SecondaryOutcome::failure(diagnostics)
            }
            Err(error) => SecondaryOutcome::failure(format!(
                "failed to run '{}': {error}",
                self.program.display()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn reports_success_for_clean_exit() {
        let compiler = ProcessSecondaryCompiler::new("true");
        let outcome = compiler.compile(&[], &[]);
        assert!(outcome.success);
    }

    #[cfg(unix)]
    #[test]
    fn captures_exit_code_on_failure() {
        let compiler = ProcessSecondaryCompiler::new("false");
        let outcome = compiler.compile(&[], &[]);
        assert!(!outcome.success);
        assert!(outcome.diagnostics.contains("exit code 1"));
    }

    #[test]
    fn reports_missing_executable() {
        let compiler = ProcessSecondaryCompiler::new("definitely-not-a-real-compiler");
        let outcome = compiler.compile(&[], &[]);
        assert!(!outcome.success);
        assert!(outcome.diagnostics.contains("failed to run"));
    }
}
