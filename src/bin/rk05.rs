/// RK05 emulator image converter

use clap::{ArgAction, ArgGroup, Parser};
use env_logger::Env;
use rk05manager::format::DEFAULT_DESCRIPTION;
use rk05manager::{draw_defect_map, FillPattern, Geometry, Mode, Report};
use rustyline::DefaultEditor;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Exit code when the user declines to overwrite the output
const EXIT_DECLINED: u8 = 4;
/// Exit code for usage errors and fatal conversion errors
const EXIT_FAILURE: u8 = 8;

#[derive(Parser, Debug)]
#[command(
    name = "rk05",
    version,
    about = "Convert RK05 emulator images to and from flat SimH images",
    long_about = None,
    after_help = "Set RUST_LOG to override the logging level (error, warn, info, debug, trace)."
)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["format", "tosimh", "fromsimh", "analyze", "compare"])
))]
struct Cli {
    /// Write a freshly formatted emulator image to OUTPUT
    #[arg(short, long)]
    format: bool,

    /// Convert emulator image INPUT to flat SimH image OUTPUT
    #[arg(short = 's', long)]
    tosimh: bool,

    /// Convert flat SimH image INPUT to emulator image OUTPUT
    #[arg(short = 'e', long)]
    fromsimh: bool,

    /// Validate emulator image INPUT without writing anything
    #[arg(short, long)]
    analyze: bool,

    /// Compare two flat SimH images block by block
    #[arg(short, long, num_args = 2, value_names = ["FIRST", "SECOND"])]
    compare: Option<Vec<PathBuf>>,

    /// Input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fill pattern for formatted or spare sectors: "ct" or a hex byte
    #[arg(short, long)]
    pattern: Option<FillPattern>,

    /// Header description for new emulator images
    #[arg(long)]
    description: Option<String>,

    /// Never overwrite an existing output file
    #[arg(short, long, conflicts_with = "yes")]
    noclobber: bool,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    yes: bool,

    /// Print a sector defect map after analyzing or converting
    #[arg(short, long)]
    map: bool,

    /// More output (-v header and sectors, -vv hex dumps)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Debug output (file offsets)
    #[arg(short, long, action = ArgAction::Count)]
    debug: u8,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        if self.debug > 0 {
            "trace"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                _ => "debug",
            }
        }
    }

    /// Check option combinations and build the mode to run
    fn mode(&self) -> Result<Mode, String> {
        let creates_image = self.format || self.fromsimh;
        if self.pattern.is_some() && !creates_image {
            return Err("--pattern is only valid with --format or --fromsimh".into());
        }
        if self.description.is_some() && !creates_image {
            return Err("--description is only valid with --format or --fromsimh".into());
        }
        if self.map && !(self.analyze || self.tosimh) {
            return Err("--map is only valid with --analyze or --tosimh".into());
        }

        let pattern = self.pattern.unwrap_or_default();
        let description = self
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        let input = self.input.clone();
        let output = self.output.clone();

        if let Some(files) = &self.compare {
            if input.is_some() || output.is_some() {
                return Err(
                    "--compare takes its two files directly, not --input or --output".into(),
                );
            }
            return match files.as_slice() {
                [first, second] => Ok(Mode::Compare {
                    first: first.clone(),
                    second: second.clone(),
                }),
                _ => Err("--compare needs exactly two files".into()),
            };
        }

        match (input, output) {
            (None, Some(output)) if self.format => Ok(Mode::Format {
                output,
                pattern,
                description,
            }),
            (_, _) if self.format => Err("--format needs --output and no --input".into()),
            (Some(input), Some(output)) if self.tosimh => Ok(Mode::DecodeToFlat { input, output }),
            (_, _) if self.tosimh => Err("--tosimh needs --input and --output".into()),
            (Some(input), Some(output)) if self.fromsimh => Ok(Mode::EncodeFromFlat {
                input,
                output,
                pattern,
                description,
            }),
            (_, _) if self.fromsimh => Err("--fromsimh needs --input and --output".into()),
            (Some(input), None) => Ok(Mode::Analyze { input }),
            _ => Err("--analyze needs --input and no --output".into()),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let filter = format!("warn,rk05manager={}", cli.log_level());
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    for input in mode.inputs() {
        if !input.is_file() {
            eprintln!("Error: {} does not exist", input.display());
            return ExitCode::from(EXIT_FAILURE);
        }
    }

    if let Some(output) = mode.output() {
        if output.exists() && !may_overwrite(output, &cli) {
            eprintln!("Not overwriting {}", output.display());
            return ExitCode::from(EXIT_DECLINED);
        }
    }

    match mode.run(&Geometry::rk05()) {
        Ok(report) => {
            print_summary(&mode, &report);
            if cli.map {
                if let Report::Decoded(decoded) | Report::Analyzed(decoded) = &report {
                    let color = std::io::stdout().is_terminal();
                    print!("{}", draw_defect_map(decoded, &Geometry::rk05(), color));
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Header issues were already logged as they were found
            eprintln!("Error: {}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Decide whether an existing output file may be replaced
fn may_overwrite(path: &Path, cli: &Cli) -> bool {
    if cli.noclobber {
        return false;
    }
    if cli.yes {
        return true;
    }

    let Ok(mut rl) = DefaultEditor::new() else {
        return false;
    };
    match rl.readline(&format!("{} exists. Overwrite? [y/N] ", path.display())) {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn print_summary(mode: &Mode, report: &Report) {
    match report {
        Report::Formatted(encoded) => {
            println!(
                "Formatted {}: {} sectors",
                display_output(mode),
                encoded.sectors_written
            );
        }
        Report::Encoded(encoded) => {
            println!(
                "Wrote {}: {} sectors from image, {} filled",
                display_output(mode),
                encoded.sectors_from_image,
                encoded.sectors_filled
            );
        }
        Report::Decoded(decoded) | Report::Analyzed(decoded) => {
            println!("Image Name: {}", decoded.header.image_name);
            println!("Description: {}", decoded.header.description);
            println!("Date: {}", decoded.header.date);
            println!("Controller: {}", decoded.header.controller);
            println!("Sectors read: {}", decoded.sectors_read);
            if let Report::Decoded(_) = report {
                println!(
                    "Sectors written to {}: {}",
                    display_output(mode),
                    decoded.sectors_written
                );
            }
            println!("Header issues: {}", decoded.header_issues.len());
            println!("Checksum errors: {}", decoded.checksum_errors());
            println!("Short sectors: {}", decoded.short_sectors());
            println!("Cylinder mismatches: {}", decoded.cylinder_mismatches());
        }
        Report::Compared(compared) => {
            if compared.is_identical() {
                println!("Compared {} blocks: identical", compared.blocks_compared);
            } else {
                println!(
                    "Compared {} blocks: {} differ",
                    compared.blocks_compared,
                    compared.mismatched_blocks.len()
                );
            }
        }
    }
}

fn display_output(mode: &Mode) -> String {
    mode.output()
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}
