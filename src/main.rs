// src/main.rs

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use gradekey::clipboard::ClipboardChain;
use gradekey::config::{init_config_from, DEFAULT_CONFIG_FILE};
use gradekey::errors::GradekeyResult;
use gradekey::generator::{Generator, Status, StatusKind, Verification};
use gradekey::grades::GradeCatalogue;
use gradekey::logging::{init_logging, log_code_event, CodeEvent};

/// Generate and check grade-bound activation codes
#[derive(Parser, Debug)]
#[command(name = "gradekey", version, about)]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive the activation code for a device and grade
    Generate {
        /// Customer device id (surrounding whitespace is ignored)
        device_id: String,

        /// Purchased grade
        grade: String,

        /// Copy the code to the clipboard
        #[arg(long)]
        copy: bool,

        /// Print a JSON object instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Check a code against a fresh derivation
    Verify {
        device_id: String,
        grade: String,
        code: String,
    },

    /// List the configured grades
    Grades,
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
    device_id: &'a str,
    grade: &'a str,
    code: &'a str,
}

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

async fn run(args: Args) -> GradekeyResult<ExitCode> {
    let config = init_config_from(&args.config)?;
    init_logging(&config.logging);

    match args.command {
        Command::Generate {
            device_id,
            grade,
            copy,
            json,
        } => {
            let generator = Generator::from_config(config)?;
            let result = generator.generate(&device_id, &grade).await;
            let status = Status::for_generation(&result);

            let code = match result {
                Ok(code) => code,
                Err(_) => {
                    print_status(&status);
                    return Ok(ExitCode::from(EXIT_FAILURE));
                }
            };

            if json {
                let out = GenerateOutput {
                    device_id: device_id.trim(),
                    grade: &grade,
                    code: code.as_str(),
                };
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out)
                        .map_err(|e| std::io::Error::other(e.to_string()))?
                );
            } else {
                println!("{code}");
            }
            print_status(&status);

            if copy {
                let outcome = ClipboardChain::from_config(&config.clipboard).copy(code.as_str());
                if outcome.is_copied() {
                    log_code_event(CodeEvent::Copied, device_id.trim(), None);
                } else {
                    log_code_event(CodeEvent::CopyFailed, device_id.trim(), None);
                }
                print_status(&Status::for_copy(&outcome));
            }

            Ok(ExitCode::SUCCESS)
        }

        Command::Verify {
            device_id,
            grade,
            code,
        } => {
            let generator = Generator::from_config(config)?;
            match generator.verify(&device_id, &grade, &code).await {
                Ok(Verification::Match) => {
                    print_status(&Status::success("Code is valid for this device and grade."));
                    Ok(ExitCode::SUCCESS)
                }
                Ok(Verification::Mismatch { .. }) => {
                    print_status(&Status::error("Code does not match this device and grade."));
                    Ok(ExitCode::from(EXIT_FAILURE))
                }
                Err(e) => {
                    print_status(&Status::for_generation(&Err(e)));
                    Ok(ExitCode::from(EXIT_FAILURE))
                }
            }
        }

        Command::Grades => {
            let catalogue = GradeCatalogue::from_config();
            if catalogue.is_empty() {
                print_status(&Status::info("No grades configured; any grade is accepted."));
            }
            for grade in catalogue.all() {
                match grade.config.description.as_deref() {
                    Some(desc) => println!("{}\t{}\t{}", grade.name, grade.label(), desc),
                    None => println!("{}\t{}", grade.name, grade.label()),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Status lines go to stderr so stdout stays pipeable.
fn print_status(status: &Status) {
    match status.kind {
        StatusKind::Error => eprintln!("error: {status}"),
        StatusKind::Success | StatusKind::Info => eprintln!("{status}"),
    }
}
