mod cli;
mod json;

use crate::cli::{Args, BackendArg, ClassifyOptions, Command, LogFormat};
use crate::json::{JsonChanges, JsonDefinition, JsonResults};
use anyhow::Context;
use clap::Parser;
use oxclassify::{
    BackendKind, ClassificationPipeline, ClassificationResults, ClassifierConfig, PipelineError,
};
use oxlogic::{ConceptId, LogicalDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write, stdout};
use std::path::Path;
use tokio::runtime::Builder;
use tokio::signal::ctrl_c;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_format);
    Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args.command))
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Classify { file, options } => {
            let definitions = read_definitions(&file)?;
            let mut pipeline = pipeline(&options)?;
            let results = pipeline.run(&definitions).await.map_err(run_error)?;
            write_results(&results, &options)
        }
        Command::Incremental {
            file,
            changes,
            options,
        } => {
            let definitions = read_definitions(&file)?;
            let changes = read_json::<JsonChanges>(&changes)?;
            let deleted = changes
                .deleted
                .into_iter()
                .map(ConceptId::from)
                .collect::<Vec<_>>();
            let updated = json::definitions(changes.updated)?;
            let mut pipeline = pipeline(&options)?;
            pipeline.run(&definitions).await.map_err(run_error)?;
            let final_definitions = with_changes(definitions, &deleted, &updated);
            let results = pipeline
                .run_incremental(deleted, updated, &final_definitions)
                .await
                .map_err(run_error)?;
            write_results(&results, &options)
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

/// Builds the pipeline and cancels it on Ctrl-C.
fn pipeline(options: &ClassifyOptions) -> anyhow::Result<ClassificationPipeline> {
    let mut config = ClassifierConfig::new().with_backend(match options.backend {
        BackendArg::Native => BackendKind::Native,
        BackendArg::Formal => BackendKind::Formal,
    });
    if let Some(threads) = options.threads {
        config = config.with_worker_threads(threads);
    }
    info!(backend = %config.backend, "configuration");
    let pipeline = ClassificationPipeline::new(config)?
        .with_progress_listener(|update| debug!(%update, "progress"));
    let cancellation_token = pipeline.cancellation_token().clone();
    tokio::spawn(async move {
        if ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling the classification");
            cancellation_token.cancel();
        }
    });
    Ok(pipeline)
}

fn run_error(error: PipelineError) -> anyhow::Error {
    if let Some(concept) = error.concept() {
        anyhow::Error::new(error).context(format!("The classification failed on concept {concept}"))
    } else {
        error.into()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file =
        File::open(path).with_context(|| format!("Not able to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_definitions(path: &Path) -> anyhow::Result<Vec<LogicalDefinition>> {
    let definitions = json::definitions(read_json::<Vec<JsonDefinition>>(path)?)?;
    info!(
        definitions = definitions.len(),
        file = %path.display(),
        "definitions read"
    );
    Ok(definitions)
}

/// The stated definitions once the changes are applied, used if the changes can not be applied incrementally.
fn with_changes(
    mut definitions: Vec<LogicalDefinition>,
    deleted: &[ConceptId],
    updated: &[LogicalDefinition],
) -> Vec<LogicalDefinition> {
    definitions.retain(|definition| {
        !deleted.contains(&definition.concept())
            && !updated
                .iter()
                .any(|update| update.concept() == definition.concept())
    });
    definitions.extend(updated.iter().cloned());
    definitions
}

fn write_results(
    results: &ClassificationResults,
    options: &ClassifyOptions,
) -> anyhow::Result<()> {
    let results = JsonResults::new(results, options.inferred);
    if let Some(output) = &options.output {
        let file = File::create(output)
            .with_context(|| format!("Not able to create {}", output.display()))?;
        write_json(file, &results)
    } else {
        write_json(stdout().lock(), &results)
    }
}

fn write_json(writer: impl Write, value: &impl Serialize) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxlogic::LogicNode;

    #[test]
    fn changes_replace_definitions() {
        let definition = |concept, sup| {
            LogicalDefinition::necessary(
                ConceptId::new(concept),
                LogicNode::concept(ConceptId::new(sup)),
            )
        };
        let result = with_changes(
            vec![definition(1, 2), definition(2, 3), definition(3, 4)],
            &[ConceptId::new(3)],
            &[definition(1, 4)],
        );
        assert_eq!(result, [definition(2, 3), definition(1, 4)]);
    }
}
