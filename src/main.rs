mod cli;

use clap::Parser;
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = cli::Args::parse();

    // Log levels map onto stderrlog's 0 (error) through 4 (trace)
    let verbosity = args.verbose.log_level().map(|level| level as usize - 1);
    if let Err(error) = stderrlog::new()
        .module(module_path!())
        .quiet(verbosity.is_none())
        .verbosity(verbosity.unwrap_or(0))
        .init()
    {
        eprintln!("Failed to initialize logging: {error}");
    }

    let config = cli::build_config(&args);
    let prefixes = match urlipranges::get_ranges(&config) {
        Ok(prefixes) => prefixes,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match args.output {
        cli::OutputFormat::Cidr => cli::output::prefixes_in_cidr_format(&prefixes),
        cli::OutputFormat::Netmask => cli::output::prefixes_in_netmask_format(&prefixes),
        cli::OutputFormat::Table => cli::output::prefix_table(&prefixes),
        cli::OutputFormat::None => {}
    }

    if let Some(csv_file) = &args.csv_file {
        if let Err(err) = cli::csv::save(&prefixes, csv_file) {
            error!("Failed to save prefixes to {:?}: {}", csv_file, err);
            return ExitCode::FAILURE;
        }
    }

    let results = cli::find_containing_prefixes(&args.contains, &prefixes);
    cli::log::containment_results(&results);
    cli::output::containment_results(&results);

    if results.iter().any(|(_, prefix)| prefix.is_none()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
