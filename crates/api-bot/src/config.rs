use std::path::PathBuf;

/// How an invited session gets started.
#[derive(Debug, Clone)]
pub enum Launcher {
    /// Spawn the session process, appending `<meeting_url> <session_id>`
    /// to the configured argv. This is the isolated-process path (the
    /// program can as well be a `docker run` wrapper).
    Spawn { program: String, args: Vec<String> },
    /// Start nothing; sessions are launched out-of-band by a supervisor.
    Manual,
}

#[derive(Debug, Clone)]
pub struct BotApiConfig {
    /// Directory holding `<session_id>.jsonl` transcript files.
    pub transcripts_dir: PathBuf,
    pub launcher: Launcher,
}

impl BotApiConfig {
    pub fn new(transcripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            transcripts_dir: transcripts_dir.into(),
            launcher: Launcher::Manual,
        }
    }

    pub fn with_launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn transcript_path(&self, session_id: &uuid::Uuid) -> PathBuf {
        self.transcripts_dir.join(format!("{session_id}.jsonl"))
    }
}
