use anyhow::{Context, Result, anyhow};
use std::process::{Command, Stdio};
use tracing::debug;

/// Hands a summary to an external text-to-speech program without waiting.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    /// Parse a whitespace-separated command line such as `"espeak -s 150"`.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("speech_command is empty"))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Spawn the program with `text` as its last argument.
    pub fn speak(&self, text: &str) -> Result<()> {
        debug!(program = %self.program, "speaking summary");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start speech command `{}`", self.program))?;

        // Reap in the background so the caller never blocks on playback.
        std::thread::spawn(move || {
            let _ = child.wait();
        });

        Ok(())
    }
}
