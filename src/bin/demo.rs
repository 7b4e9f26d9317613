// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! `honu-rpc-demo` - stdio JSON-RPC server built on the `honu_rpc` library.
//!
//! Registers a handful of illustrative methods on a [`HandlerRegistry`] and
//! drives stdin/stdout through the request pipeline, framed either with a
//! delimiter or a `Content-Length` header block.

use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use honu_rpc::config::{self, AmbientConfig, FramingMode};
use honu_rpc::error::{set_error_reporter, HonuError, HonuResult, TracingErrorReporter};
use honu_rpc::framer::{ContentLengthFramer, DelimitedFramer, FrameBuffer, FrameError, Framer, MissingLengthPolicy};
use honu_rpc::jsonrpc::arena::Arena;
use honu_rpc::jsonrpc::registry::Json;
use honu_rpc::jsonrpc::{run_request, HandlerRegistry, RunStatus};

/// Command line arguments for the Honu RPC demo server.
#[derive(Parser, Debug)]
#[clap(name = "honu-rpc-demo", version, author, about)]
struct Args {
    /// Path to configuration file.
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute.
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Serve JSON-RPC requests on stdin/stdout.
    Serve,

    /// Validate the configuration file.
    Validate,

    /// Generate a default configuration file.
    GenConfig {
        /// Path to output configuration file.
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initializes the logging system.
fn init_logging(json: bool) -> HonuResult<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let result = if json {
        tracing_subscriber::fmt().with_env_filter(env_filter).json().try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init()
    };
    result.map_err(|e| HonuError::Custom(format!("failed to set global tracing subscriber: {e}")))
}

fn main() -> HonuResult<()> {
    let args = <Args as clap::Parser>::parse();

    let env_prefix = "HONU";
    let config_loader = config::ConfigLoader::new(args.config.as_deref(), env_prefix);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let cfg = config_loader.load().map_err(HonuError::Config)?;
            init_logging(cfg.log.json)?;
            set_error_reporter(Arc::new(TracingErrorReporter));

            info!(framing = ?cfg.framing.mode, "starting honu-rpc-demo");
            config::init_global_config(cfg);

            let registry = build_registry();
            let framing = config::get_global_config().get().framing.clone();

            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut reader = BufReader::new(stdin.lock());
            let mut writer = stdout.lock();

            match framing.mode {
                FramingMode::Delimited => {
                    let framer = DelimitedFramer::new(framing.delimiter, true);
                    serve(framer, &registry, &mut reader, &mut writer, false)
                }
                FramingMode::ContentLength => {
                    let policy = if framing.recover_missing_length {
                        MissingLengthPolicy::Recoverable
                    } else {
                        MissingLengthPolicy::Fatal
                    };
                    let framer = ContentLengthFramer::new(framing.accept_request_line, policy);
                    let recoverable = framer.missing_length_policy() == MissingLengthPolicy::Recoverable;
                    serve(framer, &registry, &mut reader, &mut writer, recoverable)
                }
            }
        }
        Command::Validate => {
            info!("validating configuration");
            config_loader.load().map_err(HonuError::Config)?;
            info!("configuration validated successfully");
            Ok(())
        }
        Command::GenConfig { output } => {
            info!("generating default configuration");
            let default_config = AmbientConfig::default();

            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent).map_err(HonuError::Io)?;
            }

            let toml = toml::to_string_pretty(&default_config)
                .map_err(|e| HonuError::Custom(format!("failed to serialize config: {e}")))?;
            std::fs::write(&output, toml).map_err(HonuError::Io)?;

            info!(path = ?output, "default configuration written");
            Ok(())
        }
    }
}

/// Registers the demo methods: `add`, `echo`, and `log`.
fn build_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register_handler("add", |_arena: &Arena, a: i64, b: i64| Json(a + b))
        .expect("add registers cleanly");
    registry
        .register_handler("echo", |_arena: &Arena, message: String| Json(message))
        .expect("echo registers cleanly");
    registry
        .register_handler("log", |_arena: &Arena, message: String| {
            info!(%message, "log");
        })
        .expect("log registers cleanly");
    registry
}

/// Drives `framer` over `reader`/`writer` until EOF or a handler signals
/// [`RunStatus::EndStream`]. When `recover_missing_length` is set, a
/// [`FrameError::MissingContentLength`] does not end the loop: the bad frame
/// is skipped and reading resumes with the next one.
fn serve<F, R, W>(
    mut framer: F,
    registry: &HandlerRegistry,
    reader: &mut R,
    writer: &mut W,
    recover_missing_length: bool,
) -> HonuResult<()>
where
    F: Framer,
    R: BufRead,
    W: Write,
{
    let arena = Arena::new();
    let mut buffer = FrameBuffer::new();

    loop {
        let got_frame = match framer.read_frame(reader, &mut buffer) {
            Ok(got_frame) => got_frame,
            Err(FrameError::MissingContentLength) if recover_missing_length => {
                tracing::warn!("skipping frame with missing Content-Length header");
                continue;
            }
            Err(e) => return Err(HonuError::Custom(format!("framing error: {e}"))),
        };
        if !got_frame {
            break;
        }

        let mut out = String::new();
        let status = run_request(registry, &arena, buffer.content_str(), &mut out)
            .map_err(|e| HonuError::Custom(format!("pipeline write error: {e}")))?;

        if !out.is_empty() {
            framer
                .write_frame(writer, &out)
                .map_err(|e| HonuError::Custom(format!("framing error: {e}")))?;
        }

        if status == RunStatus::EndStream {
            break;
        }
    }

    Ok(())
}
