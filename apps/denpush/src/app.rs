//! Command dispatch.

use anyhow::Context;
use denpush_deploy::{Pipeline, UploadOutcome, UploadRequest};
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::render;

/// Runs one command to completion.
///
/// Progress is drawn while the pipeline runs; result lines are printed
/// once the bars are done.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let working_dir = std::env::current_dir().context("cannot determine working directory")?;
    let mut pipeline = Pipeline::new(working_dir)
        .with_http_settings(config.http_settings())
        .with_artifact_name(config.artifact_name.clone());
    let events = pipeline
        .take_events()
        .context("pipeline event channel already taken")?;
    let renderer = render::spawn(events);

    let result = execute(&pipeline, cli.command, &config).await;

    // Closing the channel lets the renderer finish its last bar.
    drop(pipeline);
    renderer.await?;

    for line in result? {
        println!("{line}");
    }
    Ok(())
}

async fn execute(
    pipeline: &Pipeline,
    command: Command,
    config: &Config,
) -> anyhow::Result<Vec<String>> {
    match command {
        Command::Tar(args) => {
            let path = pipeline
                .archive(&args.destination, args.source.as_deref())
                .await?;
            Ok(vec![format!("{} created", path.display())])
        }
        Command::Pack(args) => {
            let level = args.compression.unwrap_or(config.compression_level);
            let artifact = pipeline
                .pack(&args.destination, args.source.as_deref(), level)
                .await?;
            Ok(vec![
                format!("{} created", artifact.path.display()),
                "done!".to_string(),
            ])
        }
        Command::Upload(args) => {
            let credentials = args.credentials()?;
            let request = UploadRequest {
                url: args.url,
                source: args.source,
                credentials,
                level: args.compression.unwrap_or(config.compression_level),
                version: args.app_version,
            };

            let report = pipeline.upload(request).await?;
            info!(
                artifact = %report.artifact.path.display(),
                sha256 = %report.artifact.sha256,
                "artifact kept"
            );

            let status = match report.outcome {
                UploadOutcome::Uploaded { .. } => "File uploaded successfully.".to_string(),
                UploadOutcome::Failed { reason } => format!("Upload failed: {reason}"),
            };
            Ok(vec![
                format!("{} created", report.artifact.path.display()),
                status,
            ])
        }
    }
}
