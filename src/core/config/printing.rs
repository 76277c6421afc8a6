use crate::core::config::data::Config;

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        println!("  default-model: {}", describe(&self.default_model, self.model()));
        println!(
            "  evaluation-model: {}",
            describe(&self.evaluation_model, self.evaluation_model())
        );
        println!(
            "  base-url: {}",
            describe(&self.base_url, &self.base_url(None))
        );
        match self.request_timeout_secs {
            Some(secs) => println!("  request-timeout: {secs}s"),
            None => println!("  request-timeout: {}s (default)", self.request_timeout().as_secs()),
        }
    }
}

fn describe(value: &Option<String>, effective: &str) -> String {
    match value {
        Some(value) => value.clone(),
        None => format!("{effective} (default)"),
    }
}
