use clap::Parser;
use labelsort::{config::ConfigOverrides, run};
use std::path::PathBuf;

/// Sort a folder of images into label subfolders from the browser.
/// Press Ctrl-C to stop; the labeled folders are zipped on the way out.
#[derive(Parser)]
#[command(name = "labelsort", version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding the images to sort
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Text file with one label per line
    #[arg(short, long)]
    labels: Option<PathBuf>,

    /// Archive written on shutdown
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Images shown per page
    #[arg(long)]
    items_per_page: Option<usize>,

    /// error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        config_file: cli.config,
        images_dir: cli.images_dir,
        labels_file: cli.labels,
        archive_path: cli.output,
        host: cli.host,
        port: cli.port,
        items_per_page: cli.items_per_page,
        log_level: cli.log_level,
    };

    if let Err(e) = run(overrides).await {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
