use std::io::BufRead;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use sales_dashboard::{City, Config, DashboardView, Session};

/// A cli interface to the sales dashboard
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the sales CSV file
    #[clap(short, long, env = "SALES_DASHBOARD_DATA")]
    data: std::path::PathBuf,
    /// The city to show the dashboard for
    #[clap(short, long, default_value = "Dallas (TX)")]
    city: City,
    /// The number of products in the top and bottom rankings (0-20)
    #[clap(short = 'n', long, default_value_t = 5)]
    top: u32,
    /// The number of rows of the table preview
    #[clap(long, default_value_t = 1000)]
    rows: usize,
    /// Print the dashboard as JSON instead of text
    #[clap(long)]
    json: bool,
    /// Read `city <name>`, `top <n>`, `show`, `cities` and `quit` commands from stdin
    #[clap(short, long)]
    interactive: bool,
    /// Enable verbose logging
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = Config::new(&args.data)
        .with_selection(args.city, args.top)?
        .with_preview_rows(args.rows);
    let mut session = Session::new(config);
    session.subscribe(|state| info!("showing {} with top {}", state.city, state.top_n));

    print(session.view()?, args.json)?;
    if !args.interactive {
        return Ok(());
    }

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let (command, argument) = line
            .trim()
            .split_once(' ')
            .map_or((line.trim(), ""), |(command, argument)| (command, argument.trim()));

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "cities" => {
                for city in City::ALL {
                    println!("{}", city);
                }
                continue;
            }
            "show" => {}
            "city" => match argument.parse::<City>() {
                Ok(city) => session.select_city(city),
                Err(err) => {
                    eprintln!("{}", err);
                    continue;
                }
            },
            "top" => {
                let result = argument
                    .parse::<u32>()
                    .context("expected a number of items")
                    .and_then(|top| Ok(session.set_top_n(top)?));
                if let Err(err) = result {
                    eprintln!("{:#}", err);
                    continue;
                }
            }
            command => {
                eprintln!("Unknown command `{}`", command);
                continue;
            }
        }

        print(session.view()?, args.json)?;
    }

    Ok(())
}

fn print(view: &DashboardView, json: bool) -> anyhow::Result<()> {
    match json {
        true => println!("{}", serde_json::to_string_pretty(view)?),
        false => println!("{}", view),
    }

    Ok(())
}
