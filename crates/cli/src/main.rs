use anyhow::Result;
use clap::Parser;
use seedmind_cli::commands::{self, AnalyzeRequest};

/// Whole-program call-graph and slicing analyzer for directed fuzzing.
///
/// The binary is intentionally thin: it parses args, validates the
/// surface, and lets `seedmind-core` + `commands` own the real work for
/// testability and reuse.
#[derive(Parser, Debug)]
#[command(
    name = "seedmind-cli",
    version,
    about = "Whole-program call-graph and slicing analyzer",
    long_about = None
)]
struct Cli {
    /// Input IR files (bitcode or textual IR), one per translation unit.
    inputs: Vec<String>,

    /// Source-tree root, used to emit absolute output paths.
    #[arg(long, default_value = "")]
    srcroot: String,

    /// Target file for single-target mode.
    #[arg(long)]
    file: Option<String>,

    /// Target line number inside --file.
    #[arg(long)]
    line: Option<u32>,

    /// Target function name inside --file.
    #[arg(long)]
    func: Option<String>,

    /// Batch config file, one "<file> <function>" pair per line.
    #[arg(long)]
    multi: Option<String>,

    /// Destination directory for slice output files.
    #[arg(long, default_value = ".")]
    output: String,

    /// Run the call-graph phase.
    #[arg(long, default_value_t = false)]
    callgraph: bool,

    /// Run the slicing phase (requires --callgraph).
    #[arg(long, default_value_t = false)]
    slicing: bool,

    /// Locate the allocation site of a structure (legacy diagnostic).
    #[arg(long = "struct")]
    struct_name: Option<String>,

    /// Diagnostic verbosity: 0 info, 1-2 debug, 3+ trace. RUST_LOG overrides.
    #[arg(long = "debug-verbose", default_value_t = 0)]
    debug_verbose: u32,

    /// Print a JSON run summary to stdout after the phases.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug_verbose);

    let request = AnalyzeRequest {
        inputs: cli.inputs,
        srcroot: cli.srcroot,
        file: cli.file,
        line: cli.line,
        func: cli.func,
        multi: cli.multi,
        output: cli.output,
        callgraph: cli.callgraph,
        slicing: cli.slicing,
        struct_name: cli.struct_name,
        json: cli.json,
    };

    if let Err(message) = commands::validate(&request) {
        eprintln!("{}", message);
        std::process::exit(-1);
    }

    commands::analyze_command(&request)
}

/// Map --debug-verbose onto the log filter; RUST_LOG takes precedence.
fn init_logging(verbose: u32) {
    let level = match verbose {
        0 => "info",
        1 | 2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
