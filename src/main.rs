//! linguadrama-daemon: German audio dramas from study notes.
//!
//! This binary can run in three modes:
//! - CLI mode: notes file in, script document and WAV file out
//! - Decode mode: saved base64 PCM payload in, WAV file out
//! - Daemon mode: JSON-RPC server for editor integration

use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use linguadrama_daemon::audio::{decode_base64_pcm, write_wav};
use linguadrama_daemon::cache::AudioCache;
use linguadrama_daemon::cli::Cli;
use linguadrama_daemon::config::DaemonConfig;
use linguadrama_daemon::document::{export_audio, export_script, read_notes};
use linguadrama_daemon::generation::{DramaPipeline, GeminiClient};
use linguadrama_daemon::rpc::{run_server, ServerState};
use linguadrama_daemon::session::Session;

fn main() {
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries JSON-RPC traffic in daemon mode.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linguadrama_daemon=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let config = DaemonConfig::from_env();

    if let Some(problem) = config.validate() {
        tracing::warn!(%problem, "Configuration problem");
    }

    if cli.is_daemon_mode() {
        run_daemon_mode(config)
    } else if cli.is_cli_mode() {
        run_cli_mode(&cli, config)
    } else if cli.is_decode_mode() {
        run_decode_mode(&cli, &config)
    } else {
        print_usage();
        Ok(())
    }
}

fn build_pipeline(config: &DaemonConfig, sample_rate: u32) -> Result<DramaPipeline> {
    let client = GeminiClient::new(config).context("Cannot reach the generative API")?;
    Ok(DramaPipeline::new(Box::new(client), sample_rate))
}

/// Runs the CLI mode: notes file to script document and WAV file.
fn run_cli_mode(cli: &Cli, config: DaemonConfig) -> Result<()> {
    let Some(notes_path) = cli.notes.as_deref() else {
        anyhow::bail!("--notes is required in CLI mode");
    };
    let output_dir = cli.output_directory(&config);
    let sample_rate = cli.effective_sample_rate(&config);

    eprintln!("=== linguadrama-daemon CLI ===");
    eprintln!("Notes: {}", notes_path.display());
    eprintln!("Output: {}", output_dir.display());
    eprintln!("Script model: {}", config.text_model);
    if !cli.script_only {
        eprintln!("Speech model: {}", config.tts_model);
        eprintln!(
            "Voices: Lukas={}, Felix={}",
            config.voices.lukas, config.voices.felix
        );
    }
    eprintln!();

    let notes = read_notes(notes_path)?;
    let pipeline = build_pipeline(&config, sample_rate)?;
    let mut session = Session::new();

    eprintln!("Writing script...");
    let start_time = Instant::now();
    let script = session.submit_notes(&pipeline, &notes)?;
    eprintln!(
        "Script complete: \"{}\", {} lines in {:.2}s",
        script.topic,
        script.lines.len(),
        start_time.elapsed().as_secs_f32()
    );

    let script_path = export_script(script, &output_dir)?;
    eprintln!("Saved script to: {}", script_path.display());

    if cli.script_only {
        return Ok(());
    }

    eprintln!();
    eprintln!("Recording audio...");
    let start_time = Instant::now();
    let mut cache = AudioCache::with_capacity(1);
    session.render_audio(&pipeline, &mut cache)?;

    let (Some(script), Some(audio)) = (session.script(), session.audio()) else {
        anyhow::bail!("Session finished without audio");
    };
    eprintln!("Audio complete!");
    eprintln!("  Time: {:.2}s", start_time.elapsed().as_secs_f32());
    eprintln!("  Samples: {}", audio.buffer.len());
    eprintln!("  Sample rate: {}Hz", audio.buffer.sample_rate());
    eprintln!("  Audio duration: {:.2}s", audio.duration_sec());

    let audio_path = export_audio(&audio.wav, script, &output_dir)?;
    eprintln!("Saved audio to: {}", audio_path.display());

    Ok(())
}

/// Runs the decode mode: base64 PCM payload file to WAV file.
fn run_decode_mode(cli: &Cli, config: &DaemonConfig) -> Result<()> {
    let (Some(input), Some(output)) = (cli.decode.as_deref(), cli.decode_output_path()) else {
        anyhow::bail!("--decode needs a payload file name");
    };
    let sample_rate = cli.effective_sample_rate(config);

    let payload = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read payload {}", input.display()))?;
    let buffer = decode_base64_pcm(&payload, Some(sample_rate))?;
    write_wav(&buffer, &output)?;

    eprintln!(
        "Decoded {} samples ({:.2}s at {}Hz) to {}",
        buffer.len(),
        buffer.duration_sec(),
        sample_rate,
        output.display()
    );
    Ok(())
}

/// Runs the daemon mode (JSON-RPC server).
fn run_daemon_mode(config: DaemonConfig) -> Result<()> {
    eprintln!("=== linguadrama-daemon JSON-RPC Server ===");
    eprintln!("Reading from stdin, writing to stdout.");
    eprintln!("Send JSON-RPC requests to control the daemon.");
    eprintln!();

    let pipeline = build_pipeline(&config, config.sample_rate)?;
    eprintln!("Script model: {}", config.text_model);
    eprintln!("Speech model: {}", config.tts_model);
    eprintln!("Output directory: {}", config.effective_output_path().display());
    eprintln!();

    run_server(ServerState::new(config, pipeline))?;
    Ok(())
}

/// Prints usage information.
fn print_usage() {
    eprintln!("linguadrama-daemon: German audio dramas from study notes");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  Script and audio (needs GEMINI_API_KEY):");
    eprintln!("    linguadrama-daemon --notes notes.md --output-dir dramas/");
    eprintln!();
    eprintln!("  Script only:");
    eprintln!("    linguadrama-daemon --notes notes.md --script-only");
    eprintln!();
    eprintln!("  Convert a saved base64 PCM payload:");
    eprintln!("    linguadrama-daemon --decode speech.b64 --sample-rate 24000");
    eprintln!();
    eprintln!("  Daemon mode (JSON-RPC server):");
    eprintln!("    linguadrama-daemon --daemon");
    eprintln!();
    eprintln!("Run 'linguadrama-daemon --help' for full options.");
}
