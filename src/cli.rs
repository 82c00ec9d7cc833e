//! CLI argument parser for standalone mode.
//!
//! Turns a notes file into a script document and WAV file without the
//! daemon, and converts saved base64 PCM payloads offline.

use std::path::PathBuf;

use clap::Parser;

use crate::config::DaemonConfig;

/// linguadrama-daemon: German audio dramas from study notes
#[derive(Parser, Debug)]
#[command(name = "linguadrama-daemon")]
#[command(about = "Turns study notes into a two-voice German audio drama")]
#[command(version)]
pub struct Cli {
    /// Notes document (.txt or .md) to write a drama from
    #[arg(short, long, value_name = "FILE")]
    pub notes: Option<PathBuf>,

    /// Directory for the exported script and WAV file
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Sample rate of raw PCM speech in Hz [default: 24000]
    #[arg(short = 'r', long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(8000..=192_000))]
    pub sample_rate: Option<u32>,

    /// Stop after exporting the script
    #[arg(long)]
    pub script_only: bool,

    /// Convert a file holding a base64 PCM payload into a WAV file
    #[arg(long, value_name = "FILE")]
    pub decode: Option<PathBuf>,

    /// Run in daemon mode (JSON-RPC over stdio)
    #[arg(long)]
    pub daemon: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running in daemon mode.
    pub fn is_daemon_mode(&self) -> bool {
        self.daemon
    }

    /// Returns true if generating a drama from a notes file.
    pub fn is_cli_mode(&self) -> bool {
        !self.daemon && self.notes.is_some()
    }

    /// Returns true if converting a saved payload.
    pub fn is_decode_mode(&self) -> bool {
        !self.daemon && self.notes.is_none() && self.decode.is_some()
    }

    /// Returns the export directory, falling back to the configured one.
    pub fn output_directory(&self, config: &DaemonConfig) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| config.effective_output_path())
    }

    /// Returns the PCM sample rate, falling back to the configured one.
    pub fn effective_sample_rate(&self, config: &DaemonConfig) -> u32 {
        self.sample_rate.unwrap_or(config.sample_rate)
    }

    /// Returns where `--decode` writes its WAV file.
    ///
    /// The payload's file name with a `.wav` extension, placed in
    /// `--output-dir` if given and next to the payload otherwise.
    pub fn decode_output_path(&self) -> Option<PathBuf> {
        let input = self.decode.as_ref()?;
        let file_name = input.with_extension("wav").file_name()?.to_owned();
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input.parent().map(PathBuf::from).unwrap_or_default(),
        };
        Some(dir.join(file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("linguadrama-daemon").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn cli_mode_detection() {
        let cli = parse(&["--notes", "notes.md"]);
        assert!(cli.is_cli_mode());
        assert!(!cli.is_daemon_mode());
        assert!(!cli.is_decode_mode());

        let daemon = parse(&["--daemon"]);
        assert!(daemon.is_daemon_mode());
        assert!(!daemon.is_cli_mode());

        let decode = parse(&["--decode", "speech.b64"]);
        assert!(decode.is_decode_mode());
        assert!(!decode.is_cli_mode());
    }

    #[test]
    fn sample_rate_defaults_to_config() {
        let config = DaemonConfig::new();
        assert_eq!(parse(&[]).effective_sample_rate(&config), 24000);
        assert_eq!(parse(&["-r", "16000"]).effective_sample_rate(&config), 16000);
    }

    #[test]
    fn sample_rate_out_of_range_is_rejected() {
        let result = Cli::try_parse_from(["linguadrama-daemon", "--sample-rate", "100"]);
        assert!(result.is_err());
    }

    #[test]
    fn output_directory_override() {
        let config = DaemonConfig::new();
        let cli = parse(&["--notes", "n.txt", "--output-dir", "/tmp/out"]);
        assert_eq!(cli.output_directory(&config), PathBuf::from("/tmp/out"));
        assert_eq!(
            parse(&[]).output_directory(&config),
            config.effective_output_path()
        );
    }

    #[test]
    fn decode_output_path_next_to_input() {
        let cli = parse(&["--decode", "/data/speech.b64"]);
        assert_eq!(
            cli.decode_output_path(),
            Some(PathBuf::from("/data/speech.wav"))
        );

        let cli = parse(&["--decode", "/data/speech.b64", "-o", "/out"]);
        assert_eq!(cli.decode_output_path(), Some(PathBuf::from("/out/speech.wav")));

        assert_eq!(parse(&[]).decode_output_path(), None);
    }
}
