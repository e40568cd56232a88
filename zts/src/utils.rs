use std::path::Path;

use crate::error::Result;
use ziptree::TreeOptions;

/// Sets up `env_logger`. `RUST_LOG` wins over the `--debug` flag.
pub fn initialize_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

pub fn load_options(config: Option<&str>) -> Result<TreeOptions> {
    match config {
        Some(path) => Ok(TreeOptions::from_file(Path::new(path))?),
        None => Ok(TreeOptions::default()),
    }
}
