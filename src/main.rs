use std::fs;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use aws_iam_generator::{Cli, GenerationRequest, PolicyGenerator, request_from_yaml};

fn run(cli: &Cli) -> anyhow::Result<String> {
    let generator = match &cli.catalog {
        Some(path) => PolicyGenerator::from_catalog_file(path)
            .with_context(|| format!("failed to load action catalog {}", path.display()))?,
        None => PolicyGenerator::builtin()?,
    }
    .with_options(cli.assembly_options());

    let mut requests: Vec<GenerationRequest> = Vec::with_capacity(cli.files.len() + 1);
    for path in &cli.files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let request =
            request_from_yaml(&text).with_context(|| format!("in manifest {}", path.display()))?;
        requests.push(request);
    }
    requests.push(cli.to_request()?);

    Ok(generator.generate_and_render(&requests, &cli.output_options())?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(cli.log_level().into()))
        .init();

    match run(&cli) {
        Ok(policy) => {
            println!("{policy}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::debug!(event = "Generate", phase = "Failed", error = ?err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
