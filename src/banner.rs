// src/banner.rs
use crate::config::AppConfig;

/// Prints the application startup banner to the console.
pub fn print_banner() {
    // Using a raw string literal for the multi-line banner
    let banner = r#"
  __                 _                     _
 / _| ___   ___   __| |   ___ _ __   __ _| |_   _ _______ _ __
| |_ / _ \ / _ \ / _` |  / _ \ '_ \ / _` | | | | |_  / _ \ '__|
|  _| (_) | (_) | (_| | |  __/ | | | (_| | | |_| |/ /  __/ |
|_|  \___/ \___/ \__,_|  \___|_| |_|\__,_|_|\__, /___\___|_|
                                            |___/

    Food Photo Safety Analyzer
"#;
    println!("{}", banner);
}

/// Tells the operator how to finish setup when the provider credential is missing.
pub fn print_setup_hints(config: &AppConfig) {
    if config.upstream.api_key.is_some() {
        return;
    }

    let key_env = config.upstream.provider.key_env();
    println!("⚠️  {} is not set; /api/analyze will answer with a configuration error.", key_env);
    println!();
    println!("To finish setup:");
    println!("   1. Create a .env file next to the binary containing:");
    println!("        {}=your_key_here", key_env);
    println!("   2. Or export it in the service environment before starting.");
    println!("   3. Optionally pick a backend with ANALYZER_PROVIDER=openai|gemini");
    println!("      and point ANALYZER_CONFIG at a TOML file to change the model or prompt.");
    println!();
}
