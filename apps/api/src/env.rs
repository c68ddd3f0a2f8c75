use std::path::PathBuf;
use std::sync::OnceLock;

use serde::Deserialize;

fn default_port() -> u16 {
    3000
}

fn default_transcripts_dir() -> PathBuf {
    PathBuf::from("transcripts")
}

#[derive(Deserialize)]
pub struct Env {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_transcripts_dir")]
    pub transcripts_dir: PathBuf,
    /// Session process to spawn per invite, e.g. `huddle-bot` or a
    /// `docker run` wrapper script. Unset means sessions are started
    /// out-of-band.
    #[serde(default)]
    pub bot_program: Option<String>,
    /// Extra argv passed to `bot_program` ahead of the meeting URL and
    /// session id, comma-separated. The replay bot needs its script here
    /// (`BOT_ARGS=--script,demo/session.json`) unless `BOT_SCRIPT` is set
    /// in its own environment.
    #[serde(default)]
    pub bot_args: Vec<String>,
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

static ENV: OnceLock<Env> = OnceLock::new();

pub fn env() -> &'static Env {
    ENV.get_or_init(|| {
        let _ = dotenvy::dotenv();
        envy::from_env().expect("Failed to load environment")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_args_split_on_commas() {
        let env: Env = envy::from_iter([(
            "BOT_ARGS".to_string(),
            "--script,demo/session.json".to_string(),
        )])
        .unwrap();

        assert_eq!(env.bot_args, vec!["--script", "demo/session.json"]);
        assert!(env.bot_program.is_none());
        assert_eq!(env.port, 3000);
    }
}
