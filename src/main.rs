use clap::Parser;
use photobooth::cli::{self, Args, CliError, Command};
use tracing_subscriber::EnvFilter;

/// Route `log` records to stderr. `PHOTOBOOTH_LOG` wins over `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("PHOTOBOOTH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<(), CliError> {
    let config_path = args.config.as_deref();
    match args.command {
        Command::ListCameras => cli::list_cameras(),
        Command::Config { action } => cli::handle_config_action(action, config_path),
        Command::Gallery { action } => {
            let cfg = cli::load_config(config_path)?;
            cli::handle_gallery_action(&cfg, action)
        }
        Command::Snap {
            camera,
            virtual_camera,
            look,
            no_sound,
        } => {
            let cfg = cli::load_config(config_path)?;
            cli::snap(&cfg, camera, virtual_camera.as_deref(), &look, no_sound).await
        }
        Command::Upload { path, look } => {
            let cfg = cli::load_config(config_path)?;
            cli::upload(&cfg, &path, &look).await
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
