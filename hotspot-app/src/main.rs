use clap::Parser;
use cli::{Cli, Command};
use hotspot_common::observability::{LogConfig, LogFormat, init_logging};
use hotspot_runtime::HotspotRuntime;
use std::time::Duration;

mod cli;
mod scrape;
mod watch;

fn main() {
    let cli = Cli::parse();

    // stdout carries JSON only; `watch` also mirrors logs to stderr
    let emit_stderr = matches!(cli.command, Command::Watch(_));
    if let Err(err) = init_logging(LogConfig {
        emit_stderr,
        format: if cli.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Text
        },
        ..LogConfig::default()
    }) {
        eprintln!("logging disabled: {err:#}");
    }

    let runtime = match HotspotRuntime::build("hotspot", None) {
        Ok(runtime) => runtime,
        Err(err) => {
            println!("{}", scrape::error_json(&format!("{err:#}")));
            return;
        }
    };

    match cli.command {
        Command::Scrape(args) => println!("{}", scrape::run(&runtime, &args)),
        Command::Watch(args) => {
            let result = watch::load_settings(&args).and_then(|settings| {
                runtime.block_on(watch::run(runtime.handle(), settings, args.readings))
            });
            if let Err(err) = result {
                tracing::error!(error = %format!("{err:#}"), "watch.failed");
                println!("{}", scrape::error_json(&format!("{err:#}")));
            }
        }
    }

    runtime.shutdown(Duration::from_secs(2));
}
