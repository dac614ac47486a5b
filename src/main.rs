use clap::Parser;
use tseda_gnn::cli::{self, Commands};
use tseda_gnn::commands::gnn::GnnCommand;
use tseda_gnn::commands::haplotype_gnn::HaplotypeGnnCommand;
use tseda_gnn::config::Config;

fn main() {
    let args = cli::Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_timestamp_secs()
        .init();

    let config = Config::load();
    let show_progress = config.show_progress && !args.quiet;

    let result = match args.command {
        Commands::Gnn {
            trees_file,
            focal,
            sample_sets,
            windows,
            window_size,
            time_windows,
            no_span_normalise,
            no_time_normalise,
            output_file,
            format,
        } => tseda_gnn::commands::gnn::run(
            GnnCommand {
                trees_file,
                focal,
                sample_sets,
                windows,
                window_size,
                time_windows,
                span_normalise: config.span_normalise && !no_span_normalise,
                time_normalise: config.time_normalise && !no_time_normalise,
                output_file,
                format,
            },
            &config,
            show_progress,
        ),
        Commands::HaplotypeGnn {
            trees_file,
            individual,
            sample_sets,
            windows,
            window_size,
            output_file,
            format,
        } => tseda_gnn::commands::haplotype_gnn::run(
            HaplotypeGnnCommand {
                trees_file,
                individual,
                sample_sets,
                windows,
                window_size,
                output_file,
                format,
            },
            &config,
            show_progress,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
