use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "stagehand")]
#[command(version)]
#[command(about = "Walks scene manifests through the asset cache and eviction engine")]
pub struct CliArgs {
    #[arg(long, env = "STAGEHAND_ASSET_ROOT", default_value_t = default_asset_root())]
    pub asset_root: String,

    /// Dispose everything a failed scene load already inserted instead of
    /// keeping the partial results cached.
    #[arg(long, default_value_t = false)]
    pub rollback_on_failure: bool,

    /// Scene manifests, visited in order. Between two scenes the engine runs
    /// an eviction pass against the upcoming manifest before loading it.
    #[arg(required = true)]
    pub manifests: Vec<String>,
}

pub fn default_asset_root() -> String {
    std::env::current_dir()
        .expect("Can't read current working directory!")
        .join("assets")
        .to_string_lossy()
        .to_string()
}
