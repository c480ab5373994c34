// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use the_modulator::config::{load_and_validate_config, RuntimeBuilder};
use the_modulator::message::{stream_name, Message};
use the_modulator::observability::init_tracing;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec};

/// Open the input file, or stdin when no file was given.
async fn open_input(path: Option<&str>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input file {}", path))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdin())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <config.yaml|config.toml> [input-file]", args[0]);
        eprintln!("Example: {} configs/access-log.yaml access.log", args[0]);
        eprintln!("Example: cat access.log | {} configs/access-log.yaml", args[0]);
        std::process::exit(1);
    }

    let config_file = &args[1];
    let config = load_and_validate_config(config_file)
        .with_context(|| format!("failed to load {}", config_file))?;
    let runtime = RuntimeBuilder::from_config(&config)?;

    let mut lines = FramedRead::new(open_input(args.get(2).map(String::as_str)).await?, LinesCodec::new());
    let mut messages = Vec::new();
    while let Some(line) = lines.next().await {
        let line = line.context("failed to read input line")?;
        messages.push(Message::new(line, runtime.stream, messages.len() as u64));
    }
    if messages.is_empty() {
        bail!("no input lines to process");
    }

    let start = Instant::now();
    let outcome = runtime.run(messages).await?;
    let elapsed = start.elapsed();

    let mut stdout = tokio::io::stdout();
    for msg in &outcome.delivered {
        stdout.write_all(&msg.payload).await?;
        stdout.write_all(b"\n").await?;
    }
    for msg in &outcome.fallback {
        let line = format!("[{}] {}\n", stream_name(msg.stream_id), msg.payload_str());
        stdout.write_all(line.as_bytes()).await?;
    }
    stdout.flush().await?;

    eprintln!(
        "{}: {} messages in {:?} ({} delivered, {} fallback, {} discarded) using {}",
        config_file,
        outcome.total(),
        elapsed,
        outcome.delivered.len(),
        outcome.fallback.len(),
        outcome.discarded,
        runtime.executor.name()
    );

    Ok(())
}
