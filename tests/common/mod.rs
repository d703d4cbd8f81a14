/*!
 * Common test utilities for the storychunk test suite
 */

use std::path::PathBuf;
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

use storychunk::app_config::{Config, TokenizerKind};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a UTF-16LE file with a byte order mark, the encoding scripts ship in
pub fn create_utf16_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in content.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let file_path = dir.join(filename);
    fs::write(&file_path, bytes)?;
    Ok(file_path)
}

/// Creates a sample hard-wrapped book
pub fn create_test_book(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = "\u{feff}CHAPTER ONE
1
It was a bright cold day in April, and the
clocks were striking thirteen.
He met Mr.
Smith at the corner.
\u{2018}Are you coming?\u{2019} she asked.
2
The rain fell all night and nobody in the
village slept until the bells rang at dawn.
";
    create_test_file(dir, filename, content)
}

/// Creates a sample script in the bracketed markup format
pub fn create_test_script(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = ";◇◇◇：背景指定  ：～昼夕夜etc\r
*p1|\r
;◇◇◇：空／昼\r
@nm t=\"Romeo\" s=rom0001\r
\"But soft, what light[r]through yonder window breaks?\"[np]\r
@nm t=\"Juliet\" s=jul0001\r
\"*sighs* Ay me.\"[np]\r
The night was still.\r
Nobody stirred.[np]\r
@hide\r
";
    create_utf16_file(dir, filename, content)
}

/// Configuration with script maps kept inside `dir`, counting with the word tokenizer
pub fn test_config(dir: &PathBuf, max_tokens: usize) -> Config {
    let mut config = Config::default();
    config.chunking.max_tokens = max_tokens;
    config.tokenizer.kind = TokenizerKind::Word;
    config.scripts.locations_path = dir.join("ksj_locations.json").to_string_lossy().to_string();
    config.scripts.names_path = dir.join("ksj_names.json").to_string_lossy().to_string();
    config
}

/// Route log output through env_logger when RUST_LOG is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
