//! Model listing for `codeaide models` and `-m` without a value.

use crate::core::config::Config;
use crate::core::constants::AVAILABLE_MODELS;

pub fn model_list(current: &str) -> Vec<String> {
    AVAILABLE_MODELS
        .iter()
        .map(|model| {
            if *model == current {
                format!("  {model} (default)")
            } else {
                format!("  {model}")
            }
        })
        .collect()
}

pub fn list_models(config: &Config) {
    println!("🤖 Available models");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for line in model_list(config.model()) {
        println!("{line}");
    }
    println!();
    println!("💡 Use 'codeaide -m <model>' or 'codeaide set default-model <model>'");
}
