use clap::Parser;
use recordbook::{
    cli::{self, output, Cli},
    init_with_filter,
};

fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(&cli) {
        Ok(config) => config,
        Err(err) => std::process::exit(output::report(&err)),
    };
    output::set_color_enabled(config.ui_color_enabled);
    init_with_filter(&config.log_filter);

    match cli::run(&cli, &config) {
        Ok(json) => println!("{json}"),
        Err(err) => std::process::exit(output::report(&err)),
    }
}
