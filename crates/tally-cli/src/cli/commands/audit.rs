//! The `tally audit` command: wire ingest, store, client, runner, export.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use tally_core::report::{console, csv, summary};
use tally_core::{ingest, prompt, AuditConfig, AuditRunner, FakeClient, LlmClient, OpenAiClient};

use crate::cli::args::{AuditArgs, Provider};
use crate::exit_codes::EXIT_SUCCESS;

fn build_config(args: &AuditArgs) -> AuditConfig {
    let mut config = AuditConfig::default()
        .with_endpoint(args.endpoint.clone())
        .with_model(args.model.clone())
        .with_out_dir(args.out_dir.clone());
    config.api_key = args.api_key.clone();
    config.timeout_secs = args.timeout_secs;
    config.scheme = args.scheme.clone();
    config.system_prompt = args.system_prompt.clone();
    config.test_mode = args.test_mode;
    config.test_limit = args.limit;
    config.max_attempts = args.max_attempts;
    config.backoff_secs = args.backoff_secs;
    config.checkpoint_interval = args.checkpoint_every;
    config.on_permanent_failure = args.on_permanent_failure.into();
    config.provider = args.provider.name().to_string();
    config.delimiter = args.delimiter;
    config
}

pub async fn run(args: AuditArgs) -> anyhow::Result<i32> {
    let config = build_config(&args);

    let system_prompt =
        prompt::load_system_prompt(config.system_prompt.as_deref(), config.scheme.as_deref())?;
    let limit = config.test_mode.then_some(config.test_limit);
    let tasks = ingest::load_entries(&args.entries, config.delimiter, limit)?;
    let store = ingest::load_reference(&args.notes, config.delimiter)?;
    info!(
        tasks = tasks.len(),
        reference_entries = store.len(),
        model = %config.model,
        provider = %config.provider,
        test_mode = config.test_mode,
        "starting audit run"
    );

    std::fs::create_dir_all(&config.out_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.out_dir.display()
        )
    })?;

    let client: Arc<dyn LlmClient> = match args.provider {
        Provider::Openai => Arc::new(OpenAiClient::new(&config)?),
        Provider::Fake => Arc::new(FakeClient::new()),
    };

    let runner = AuditRunner::new(client, &config, store, system_prompt)
        .with_progress(console::stderr_progress_sink());
    let outcome = runner.run(&tasks).await;

    // The export is the run's terminal outcome; a failure here is fatal.
    let export = config.export_path();
    csv::write_csv(&export, &outcome.records)
        .with_context(|| format!("final export to {} failed", export.display()))?;
    console::print_summary(&outcome.stats, &export);

    let run_summary = summary::RunSummary::new(&config, &outcome);
    if let Err(e) = summary::write_summary(&config.summary_path(), &run_summary) {
        warn!(error = %e, "failed to write run summary");
    }

    Ok(EXIT_SUCCESS)
}
