//! Failure-path diagnostics.
//!
//! Triggered only when compilation, verification or execution already
//! failed. Everything here is best-effort: rendering problems are logged
//! and swallowed so they can never mask the original failure.

use crate::artifact::ArtifactSet;
use crate::services::Disassembler;

/// Render a textual disassembly of whatever artifacts exist to the error
/// stream. Never returns an error and never panics on renderer failure.
pub fn dump_artifacts(artifacts: Option<&ArtifactSet>, disassembler: &dyn Disassembler) {
    eprintln!("Rendering generated artifacts as text...");
    match artifacts {
        None => {
            eprintln!("Cannot render artifacts: generation never completed");
        }
        Some(set) => match disassembler.disassemble(set) {
            Ok(text) => eprintln!("{text}"),
            Err(message) => {
                tracing::warn!(%message, "disassembly failed while reporting diagnostics");
                eprintln!("Failed to render artifacts; the original failure follows");
                eprintln!("------------------------------------------------------------");
            }
        },
    }
}
