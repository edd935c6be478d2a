use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use log::{Level, info};

fn path(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .required(true)
        .value_parser(value_parser!(PathBuf))
}

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("zenqoi")
        .about("Encode, decode and inspect QOI images")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("encode")
            .about("Encode a PNG or binary netpbm (P5, P6, P7) image to QOI")
            .arg(path("in", "Input .png, .ppm, .pgm or .pam file"))
            .arg(path("out", "Output .qoi file"))
            .arg(Arg::new("linear")
                .long("linear")
                .action(ArgAction::SetTrue)
                .help("Mark the file as linear instead of sRGB")))
        .subcommand(Command::new("decode")
            .about("Decode a QOI file to PNG, or PAM (RGB_ALPHA) for any other extension")
            .arg(path("in", "Input .qoi file"))
            .arg(path("out", "Output .png or .pam file")))
        .subcommand(Command::new("analyze")
            .about("Write a PNG chunk heat map and statistics report per QOI file")
            .arg(Arg::new("in")
                .help("QOI files, or directories holding them")
                .required(true)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)))
            .arg(Arg::new("out")
                .long("out")
                .short('o')
                .help("Directory for reports (default: analysis/ next to each input)")
                .value_parser(value_parser!(PathBuf))))
        .subcommand(Command::new("verify")
            .about("Check that a QOI file decodes to the pixels of a reference image")
            .arg(path("in", "QOI file to check"))
            .arg(path("reference", "Reference .png, .ppm or .pam file")))
        .arg(Arg::new("debug")
            .long("debug")
            .global(true)
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and higher"))
        .arg(Arg::new("trace")
            .long("trace")
            .global(true)
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
        .arg(Arg::new("info")
            .long("info")
            .global(true)
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display per-file summaries"))
}

/// Set up logging from the global flags.
pub fn setup_logger(options: &ArgMatches) {
    let log_level = if options.get_flag("trace") {
        Level::Trace
    } else if options.get_flag("debug") {
        Level::Debug
    } else if options.get_flag("info") {
        Level::Info
    } else {
        Level::Warn
    };

    if let Err(e) = simple_logger::init_with_level(log_level) {
        eprintln!("could not initialize logger: {e}");
    }
    info!("Log level: {log_level}");
}
