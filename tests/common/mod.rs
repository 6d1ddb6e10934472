/*!
 * Common test utilities for the notemend test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use notemend::app_config::Config;
use notemend::providers::mock::MockProvider;
use notemend::Controller;

/// Route `log` output through env_logger; safe to call from every test
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A configuration that passes validation without touching the environment
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.service.active_provider_config_mut().api_key = "test-key".to_string();
    config
}

/// Controller wired to a mock provider
pub fn mock_controller(config: Config, provider: &MockProvider) -> Controller {
    Controller::with_provider(config, Arc::new(provider.clone()))
}

/// `sentences` short Chinese sentences
pub fn sample_note(sentences: usize) -> String {
    (1..=sentences)
        .map(|i| format!("这是第{}句测试文本。", i))
        .collect()
}
