use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;

use stagehand::{AssetEngine, Category, FailurePolicy, FsAssetSource, Manifest};

use crate::settings::CliArgs;

mod settings;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let engine = AssetEngine::new(Arc::new(FsAssetSource::new(&args.asset_root)));
    let policy = if args.rollback_on_failure {
        FailurePolicy::RollbackOnFailure
    } else {
        FailurePolicy::KeepPartial
    };

    let mut first_scene = true;
    for manifest_path in &args.manifests {
        let bytes = std::fs::read(manifest_path)
            .with_context(|| format!("reading manifest {}", manifest_path))?;
        let manifest = Manifest::from_json(&bytes)
            .with_context(|| format!("parsing manifest {}", manifest_path))?;

        if !first_scene {
            let eviction = engine.evict_for_upcoming(&manifest);
            info!(
                "Transition to {}: {} disposed, {} retained",
                manifest_path, eviction.disposed, eviction.retained
            );
        }
        first_scene = false;

        let report = engine
            .load_manifest_with(&manifest, policy)
            .await
            .map_err(|error| anyhow::anyhow!(error))?;
        info!(
            "Scene {} ready: {} loaded, {} reused, {}ms",
            manifest_path,
            report.loaded,
            report.already_cached,
            report.elapsed.as_millis()
        );
    }

    for category in Category::ALL {
        let count = engine.cache().count_in(category);
        if count > 0 {
            info!("{}: {} cached", category, count);
        }
    }
    Ok(())
}
