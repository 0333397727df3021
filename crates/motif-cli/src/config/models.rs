use motifval::engine::config::ValidationConfig;
use std::path::PathBuf;

pub struct AppConfig {
    pub job_path: PathBuf,
    pub output_dir: PathBuf,
    pub core_config: ValidationConfig,
}
