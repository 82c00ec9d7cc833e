//! Script and audio export.
//!
//! Writes the downloadable artifacts: a Markdown script document and the
//! WAV recording, both named after the script topic.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DaemonError, Result};
use crate::types::GeneratedScript;

/// Renders a script as a Markdown document.
///
/// Each line becomes the bold speaker name with an optional italic stage
/// direction, the German text, and the italic English translation.
pub fn render_script_markdown(script: &GeneratedScript) -> String {
    let mut doc = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(doc, "# German Audio Drama: {}", script.topic);

    for line in &script.lines {
        let _ = writeln!(doc);
        if line.stage_direction.trim().is_empty() {
            let _ = writeln!(doc, "**{}**", line.speaker);
        } else {
            let _ = writeln!(doc, "**{}** *[{}]*", line.speaker, line.stage_direction.trim());
        }
        let _ = writeln!(doc);
        let _ = writeln!(doc, "{}", line.german);
        let _ = writeln!(doc);
        let _ = writeln!(doc, "*({})*", line.english);
    }

    doc
}

/// Writes the script document into `dir` and returns its path.
pub fn export_script(script: &GeneratedScript, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.md", script.file_stem()));
    write_artifact(&path, render_script_markdown(script).as_bytes())?;
    info!(path = %path.display(), "Exported script");
    Ok(path)
}

/// Writes encoded WAV bytes for a script into `dir` and returns the path.
pub fn export_audio(wav: &[u8], script: &GeneratedScript, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(format!("{}.wav", script.file_stem()));
    write_artifact(&path, wav)?;
    info!(path = %path.display(), bytes = wav.len(), "Exported audio");
    Ok(path)
}

fn write_artifact(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| DaemonError::export_failed(parent.display().to_string(), e))?;
    }
    fs::write(path, contents).map_err(|e| DaemonError::export_failed(path.display().to_string(), e))
}
