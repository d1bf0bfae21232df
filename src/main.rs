// main.rs
use std::path::PathBuf;
use std::process;

use clap::AppSettings;
use structopt::StructOpt;

use log2csv::config::parse_delimiter;
use log2csv::interrupt::INTERRUPTED_EXIT_CODE;
use log2csv::{Config, Interrupt, Options};

const AFTER_HELP: &str = "\
Note: output_path is only read if access_log_file is specified. If it is a directory, the output
is written to a file in that directory named after access_log_file with a '.csv' extension.

If access_log_file is not specified or is '-', standard input is read.
If output_path is not specified, output is sent to standard output.

See <http://httpd.apache.org/docs/2.0/logs.html#accesslog> for the log format.";

/// Converts Apache-style access logs to CSV files.
#[derive(StructOpt)]
#[structopt(
    name = "log2csv",
    after_help = AFTER_HELP,
    global_settings = &[AppSettings::ColoredHelp, AppSettings::UnifiedHelpMessage],
)]
struct Args {
    /// If set, do not print the header row to the CSV file.
    #[structopt(short, long)]
    suppress_header_row: bool,

    /// DELIMITER used to delimit the columns of the CSV file (default is TAB).
    #[structopt(
        short,
        long,
        value_name = "DELIMITER",
        default_value = "\\t",
        hide_default_value = true,
        parse(try_from_str = parse_delimiter)
    )]
    delimiter: u8,

    /// The access log to convert.
    #[structopt(parse(from_os_str))]
    access_log_file: Option<PathBuf>,

    /// Where to write the CSV file.
    #[structopt(parse(from_os_str))]
    output_path: Option<PathBuf>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            input: args.access_log_file,
            output: args.output_path,
            options: Options {
                write_header_row: !args.suppress_header_row,
                delimiter: args.delimiter,
            },
        }
    }
}

fn main() {
    env_logger::init();

    let config = Config::from(Args::from_args());

    let interrupt = match Interrupt::install() {
        Ok(interrupt) => interrupt,
        Err(error) => {
            eprintln!("Failed to install interrupt handler: {}, exiting.", error);
            process::exit(1);
        }
    };

    match log2csv::run(&config, &interrupt) {
        Ok(summary) if summary.interrupted => process::exit(INTERRUPTED_EXIT_CODE),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("{}, exiting.", error);
            process::exit(error.exit_code());
        }
    }
}
