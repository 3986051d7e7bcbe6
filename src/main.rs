use anyhow::Context;
use strike_scene::{config::SceneConfig, StrikeSceneApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load_from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => SceneConfig::default(),
    };
    log::info!("Starting {:?} scene", config.variant);

    StrikeSceneApp::new(config)?.run()?;
    Ok(())
}
