use clap::Parser;
use jurisdiction_map::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // Ctrl+C cancels loads in progress and ends `watch`
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, shutting down gracefully...");
                signal_token.cancel();
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Jurisdiction Map - join jurisdiction feeds to county boundaries");
    println!("===============================================================");
    println!();
    println!("Normalizes county (5-digit) and place (7-digit) identifiers, joins them");
    println!("to county polygons or supplied coordinates and writes a GeoJSON layer.");
    println!();
    println!("USAGE:");
    println!("    jurisdiction-map <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    render        Load the feed and boundaries once and write GeoJSON");
    println!("    diagnostics   Report record counts and duplicate names in the feed");
    println!("    watch         Render, then refresh periodically or on Enter");
    println!("    help          Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Render every jurisdiction:");
    println!("    jurisdiction-map render --feed portals.csv --boundaries counties.geojson");
    println!();
    println!("    # Only large cities, with approximate placements drawn as polygons:");
    println!("    jurisdiction-map render -f portals.csv -b counties.geojson \\");
    println!("                           --class city --population 1M+ --degraded polygon");
    println!();
    println!("    # Check the feed for duplicate names:");
    println!("    jurisdiction-map diagnostics --feed portals.csv --top 20");
    println!();
    println!("    # Refresh every 5 minutes:");
    println!("    jurisdiction-map watch -f portals.csv -b counties.geojson --interval 300");
    println!();
    println!("For detailed help on any command, use:");
    println!("    jurisdiction-map <COMMAND> --help");
}
