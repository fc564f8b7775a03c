use std::io::{self, Write};

use env_logger::Env;
use log::error;

use chemreport_rust::cli::{self, Command, USAGE};
use chemreport_rust::{bootstrap, AppConfig, AppError};

async fn dispatch(cmd: Command) -> Result<(), AppError> {
    let cfg = AppConfig::from_env()?;
    if cmd == Command::Migrate {
        bootstrap::migrate(&cfg).await?;
        println!("migraciones aplicadas");
        return Ok(());
    }
    let app = bootstrap::build_orchestrator(&cfg).await?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(cmd, &app, &mut out).await?;
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match cli::parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(e.exit_code());
        }
    };
    if let Err(e) = dispatch(cmd).await {
        error!("main:failed error={e}");
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }
}
