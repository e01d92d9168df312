//! CLI entry point for sax-fragments.

use sax_fragments::config::Settings;
use sax_fragments::{cli, logging};

fn main() {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&settings.log_level);

    if let Err(e) = cli::run(&settings) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
