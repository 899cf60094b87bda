use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use voxedit::config::{self, EditorConfig};
use voxedit::dispatch;
use voxedit::imaging::RustCodec;
use voxedit::output;
use voxedit::parser;
use voxedit::session::SessionController;

#[derive(Parser)]
#[command(name = "voxedit")]
#[command(about = "Edit images with short spoken commands")]
#[command(long_about = "\
Edit images with short spoken commands

Each line of input is one utterance, as a speech-to-text service would
deliver it. Commands are matched leniently: \"grey scale\", \"brihgtness by 50\"
and \"Rotate left.\" all work. Numbers out of range are clamped.

Examples:

  voxedit edit photo.jpg -o edited.png
  voxedit apply photo.jpg -o out.webp \"sepia\" \"brightness by 20\" \"rotate right\"
  voxedit parse \"contrast by 150\" --json

Run 'voxedit commands' for the full command list and
'voxedit gen-config' to generate a documented voxedit.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing voxedit.toml, or the path of a config file
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Log every parse and history decision
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open an image and read commands from stdin, one per line
    Edit {
        /// Image to edit
        input: PathBuf,
        /// Where to save the result when the session ends
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Display area as WIDTHxHEIGHT, used by "fit"
        #[arg(long, value_parser = parse_viewport)]
        viewport: Option<(u32, u32)>,
    },
    /// Apply a list of commands to an image and save it
    Apply {
        /// Image to edit
        input: PathBuf,
        /// Output image; the format follows the extension
        #[arg(long, short)]
        output: PathBuf,
        /// Continue past commands that fail
        #[arg(long)]
        keep_going: bool,
        /// Commands, one utterance each
        #[arg(required = true)]
        commands: Vec<String>,
    },
    /// Show how a piece of text is understood
    Parse {
        text: String,
        /// Print the operation as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every command with its synonyms
    Commands,
    /// Print a stock voxedit.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Edit {
            input,
            output: save_to,
            viewport,
        } => {
            let editor_config = load_editor_config(&cli.config)?;
            init_thread_pool(&editor_config.processing);
            let codec = RustCodec::new();
            let mut controller = SessionController::new(editor_config);
            if let Some((w, h)) = viewport {
                controller.set_viewport(w, h);
            }
            let image = controller.load(&codec, &input)?;
            println!(
                "Image loaded: {} ({}×{})",
                input.display(),
                image.width(),
                image.height()
            );

            // Typed or piped lines are all meant to run, so the reader waits
            // for the slot rather than dropping lines while an edit is running.
            let (tx, rx) = dispatch::utterance_channel();
            std::thread::spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            });

            dispatch::run_loop(&mut controller, &rx, |_, result| match result {
                Ok(outcome) => {
                    println!("{}", outcome.feedback);
                    if outcome.operation == voxedit::catalog::Operation::Help {
                        output::print_help();
                    }
                }
                Err(err) => println!("{}", output::format_failure(err)),
            });

            if let Some(session) = controller.session() {
                output::print_history(session.pipeline().history());
            }
            if let Some(path) = save_to {
                controller.save(&codec, &path)?;
                println!("Image saved: {}", path.display());
            }
        }
        Command::Apply {
            input,
            output: save_to,
            keep_going,
            commands,
        } => {
            let editor_config = load_editor_config(&cli.config)?;
            init_thread_pool(&editor_config.processing);
            let codec = RustCodec::new();
            let mut controller = SessionController::new(editor_config);
            controller.load(&codec, &input)?;

            for text in &commands {
                match controller.handle_text(text) {
                    Ok(outcome) => println!("{}", outcome.feedback),
                    Err(err) if keep_going => println!("{}", output::format_failure(&err)),
                    Err(err) => {
                        println!("{}", output::format_failure(&err));
                        return Err(err.into());
                    }
                }
            }

            controller.save(&codec, &save_to)?;
            println!("Image saved: {}", save_to.display());
        }
        Command::Parse { text, json } => {
            let editor_config = load_editor_config(&cli.config)?;
            let op = parser::CommandParser::new(editor_config.parser.policy()).parse(&text)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&op)?);
            } else {
                output::print_operation(&op);
            }
        }
        Command::Commands => {
            output::print_help();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `--verbose` wins over `RUST_LOG`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("voxedit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voxedit=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config from a directory holding voxedit.toml, or from a file.
fn load_editor_config(path: &Path) -> Result<EditorConfig, config::ConfigError> {
    if path.is_file() {
        config::load_config_file(path)
    } else {
        config::load_config(path)
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. The user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn parse_viewport(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid viewport size '{v}': {e}"))
    };
    Ok((parse(w)?, parse(h)?))
}
