#[cfg(not(feature = "cli"))]
compile_error!("The `innoisp` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use innoisp::cli;
use innoisp::cli::app::{Cli, ColorMode, Commands};
use innoisp::IbdError;

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, IbdError> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| IbdError::Io(format!("cannot create {}: {}", path, e))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Overview {
            file,
            page,
            verbose,
            json,
        } => cli::overview::execute(
            &cli::overview::OverviewOptions {
                file,
                page,
                verbose,
                json,
            },
            &mut writer,
        ),

        Commands::Dslots {
            file,
            page,
            recorders,
            pksize,
            json,
        } => cli::dslots::execute(
            &cli::dslots::DslotsOptions {
                file,
                page,
                recorders,
                pksize,
                json,
            },
            &mut writer,
        ),

        Commands::Space {
            file,
            extend,
            pstate,
            unused,
            list,
            json,
        } => cli::space::execute(
            &cli::space::SpaceOptions {
                file,
                extend,
                pstate,
                unused,
                list,
                json,
            },
            &mut writer,
        ),

        Commands::Inode {
            file,
            unused,
            fragment,
            json,
        } => cli::inode::execute(
            &cli::inode::InodeOptions {
                file,
                unused,
                fragment,
                json,
            },
            &mut writer,
        ),

        Commands::Search {
            file,
            key,
            pksize,
            json,
        } => cli::search::execute(
            &cli::search::SearchOptions {
                file,
                key,
                pksize,
                json,
            },
            &mut writer,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
