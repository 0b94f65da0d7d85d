use colored::Colorize;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use netdiagram::config::Settings;
use netdiagram::script::Interpreter;
use netdiagram::{render, DefaultStyle, GraphViz};
use std::error::Error;
use std::io::{self, Write};
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let settings = Settings::from_env();
    init_logging(&settings)?;
    log::info!("#Start main()");

    let mut interp = Interpreter::new(io::stderr());
    let files: Vec<String> = std::env::args().skip(1).collect();
    if files.is_empty() {
        interp.run(io::stdin().lock())?;
    } else {
        for file in &files {
            interp.load(file)?;
        }
    }
    let (topology, mut options) = interp.finish();
    options.all_hosts |= settings.all_hosts;

    let stdout = io::stdout().lock();
    let mut dot = GraphViz::new(stdout);
    let stats = render(&topology, &mut dot, &DefaultStyle, &options)?;
    dot.into_inner().flush()?;

    if stats.hosts_with_no_subnet > 0 {
        log::warn!(
            "{} {} host(s) without any NIC were left out",
            "NOTE".on_red(),
            stats.hosts_with_no_subnet
        );
    }
    log::info!("#End main() {} empty subnet(s)", stats.empty_subnets);
    Ok(())
}

/// Logs go to stderr; stdout carries the diagram.
fn init_logging(settings: &Settings) -> Result<(), Box<dyn Error>> {
    if Path::new(&settings.log_config).exists() {
        log4rs::init_file(&settings.log_config, Default::default())
            .map_err(|e| format!("Error initializing log4rs from {}: {e}", settings.log_config))?;
        return Ok(());
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{h({l})} {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Warn))?;
    log4rs::init_config(config)?;
    Ok(())
}
