//! `scopehound config` — print the default configuration.

use scopehound_config::AppConfig;

pub fn run() {
    println!("{}", AppConfig::default_toml());
}
