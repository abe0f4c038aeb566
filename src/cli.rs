// Command-line front end for wavhuff.
//
// Subcommands map one-to-one onto the library entry points:
//   compress   -> io::compress_file
//   decompress -> io::decompress_file
//   info       -> wav::parse / codec::inspect
//   config     -> build features

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::codec;
use crate::huffman::HuffmanTree;
use crate::io::{self, FileStats};
use crate::wav::{self, RIFF_TAG};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Lossless WAV compressor (delta + Huffman).
#[derive(Parser, Debug)]
#[command(
    name = "wavhuff",
    version,
    about = "Lossless PCM WAV compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress a PCM WAV file.
    Compress(TransformArgs),
    /// Restore a WAV file from a compressed file.
    Decompress(TransformArgs),
    /// Print header fields of a WAV or compressed file.
    Info(InfoArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Args, Debug)]
struct TransformArgs {
    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// WAV or compressed file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Also print the Huffman code of every symbol.
    #[arg(long)]
    codes: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Info,
    Config,
}

struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    show_codes: bool,
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    json_output: bool,
}

fn resolve_options(cli: Cli) -> Options {
    let mut opts = Options {
        command: Command::Config,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        show_codes: false,
        input_file: None,
        output_file: None,
        json_output: cli.json_output,
    };

    match cli.command {
        Cmd::Compress(args) => {
            opts.command = Command::Compress;
            opts.input_file = Some(args.input);
            opts.output_file = Some(args.output);
        }
        Cmd::Decompress(args) => {
            opts.command = Command::Decompress;
            opts.input_file = Some(args.input);
            opts.output_file = Some(args.output);
        }
        Cmd::Info(args) => {
            opts.command = Command::Info;
            opts.input_file = Some(args.input);
            opts.show_codes = args.codes;
        }
        Cmd::Config => {}
    }
    opts
}

/// Log filter implied by `-v` count; `RUST_LOG` still wins.
fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("wavhuff".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("wavhuff version {version} (Rust), Copyright (C) wavhuff contributors");
    eprintln!("Licensed under the MIT License");

    let cli = cfg!(feature = "cli") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let ptr_size = std::mem::size_of::<*const ()>();

    eprintln!("CLI={cli}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("CONTAINER_HEADER_LEN={}", crate::container::HEADER_LEN);
    eprintln!("MAX_CODE_LEN={}", crate::huffman::code_table::MAX_CODE_LEN);
    eprintln!("SAMPLE_BITS=8,16,32");
    eprintln!("CHANNELS=1,2");
    eprintln!("sizeof(usize)={ptr_size}");

    0
}

// ---------------------------------------------------------------------------
// Compress / decompress commands
// ---------------------------------------------------------------------------

fn hex(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn report_stats(opts: &Options, name: &str, stats: &FileStats) {
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "wavhuff: {name}: {} Hz, {} ch, {} bit, frames: {}, symbols: {}, bits: {}",
            stats.format.sample_rate,
            stats.format.channel_count,
            stats.format.bits_per_sample,
            stats.frames,
            stats.symbols,
            stats.bit_len
        );
        eprintln!(
            "wavhuff: {name}: input size: {}, output size: {}, elapsed: {:.3}s",
            stats.input_size,
            stats.output_size,
            stats.elapsed.as_secs_f64()
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": name,
            "sample_rate": stats.format.sample_rate,
            "channel_count": stats.format.channel_count,
            "bits_per_sample": stats.format.bits_per_sample,
            "input_size": stats.input_size,
            "output_size": stats.output_size,
            "frames": stats.frames,
            "symbols": stats.symbols,
            "bit_len": stats.bit_len,
            "elapsed_ms": stats.elapsed.as_secs_f64() * 1000.0,
            "pcm_sha256": stats.pcm_sha256.as_ref().map(hex),
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_default()
        );
    }
}

fn transform_paths(opts: &Options) -> Option<(&Path, &Path)> {
    let (Some(input), Some(output)) = (&opts.input_file, &opts.output_file) else {
        eprintln!("wavhuff: input and output files are required");
        return None;
    };
    if output.exists() && !opts.force {
        eprintln!(
            "wavhuff: output file exists, use -f to overwrite: {}",
            output.display()
        );
        return None;
    }
    Some((input.as_path(), output.as_path()))
}

fn cmd_compress(opts: &Options) -> i32 {
    let Some((input, output)) = transform_paths(opts) else {
        return 1;
    };
    match io::compress_file(input, output) {
        Ok(stats) => {
            report_stats(opts, "compress", &stats);
            0
        }
        Err(e) => {
            eprintln!("wavhuff: compress: {}: {e}", input.display());
            1
        }
    }
}

fn cmd_decompress(opts: &Options) -> i32 {
    let Some((input, output)) = transform_paths(opts) else {
        return 1;
    };
    match io::decompress_file(input, output) {
        Ok(stats) => {
            report_stats(opts, "decompress", &stats);
            0
        }
        Err(e) => {
            eprintln!("wavhuff: decompress: {}: {e}", input.display());
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

fn cmd_info(opts: &Options) -> i32 {
    let Some(input) = &opts.input_file else {
        eprintln!("wavhuff: info requires an input file");
        return 1;
    };
    let data = match std::fs::read(input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("wavhuff: {}: {e}", input.display());
            return 1;
        }
    };

    if data.starts_with(&RIFF_TAG) {
        info_wav(opts, input, &data)
    } else {
        info_container(opts, input, &data)
    }
}

fn info_wav(opts: &Options, input: &Path, data: &[u8]) -> i32 {
    let audio = match wav::parse(data) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("wavhuff: {}: {e}", input.display());
            return 1;
        }
    };
    let f = audio.format;
    let frame_len = f.block_align().unwrap_or(0);

    if opts.json_output {
        let json = serde_json::json!({
            "kind": "wav",
            "sample_rate": f.sample_rate,
            "channel_count": f.channel_count,
            "bits_per_sample": f.bits_per_sample,
            "pcm_bytes": audio.pcm.len(),
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return 0;
    }

    println!("wavhuff: file: {}", input.display());
    println!("  kind:            WAV (PCM)");
    println!("  sample rate:     {}", f.sample_rate);
    println!("  channels:        {}", f.channel_count);
    println!("  bits per sample: {}", f.bits_per_sample);
    println!("  PCM bytes:       {}", audio.pcm.len());
    if frame_len > 0 {
        println!("  frames:          {}", audio.pcm.len() / usize::from(frame_len));
    }
    if opts.show_codes {
        eprintln!("wavhuff: --codes applies to compressed files only");
    }
    0
}

fn info_container(opts: &Options, input: &Path, data: &[u8]) -> i32 {
    let info = match codec::inspect(data) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("wavhuff: {}: {e}", input.display());
            return 1;
        }
    };
    let f = info.header.format;
    let codes = match HuffmanTree::build(&info.table).map(|tree| tree.codes()) {
        Some(Ok(codes)) => Some(codes),
        Some(Err(e)) => {
            eprintln!("wavhuff: {}: {e}", input.display());
            return 1;
        }
        None => None,
    };

    if opts.json_output {
        let mut json = serde_json::json!({
            "kind": "compressed",
            "sample_rate": f.sample_rate,
            "channel_count": f.channel_count,
            "bits_per_sample": f.bits_per_sample,
            "payload_bytes": info.header.payload_len,
            "table_bytes": info.table_bytes,
            "symbols": info.table.len(),
            "values": info.table.total(),
            "bit_len": info.bit_len,
        });
        if opts.show_codes {
            let list: Vec<serde_json::Value> = codes
                .iter()
                .flat_map(|c| c.iter())
                .map(|(value, code)| {
                    serde_json::json!({
                        "value": value,
                        "count": info.table.get(value),
                        "code": code.to_string(),
                    })
                })
                .collect();
            json["codes"] = serde_json::Value::Array(list);
        }
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return 0;
    }

    println!("wavhuff: file: {}", input.display());
    println!("  kind:            compressed");
    println!("  sample rate:     {}", f.sample_rate);
    println!("  channels:        {}", f.channel_count);
    println!("  bits per sample: {}", f.bits_per_sample);
    println!("  payload bytes:   {}", info.header.payload_len);
    println!("  table bytes:     {}", info.table_bytes);
    println!("  symbols:         {}", info.table.len());
    println!("  values:          {}", info.table.total());
    println!("  bitstream bits:  {}", info.bit_len);

    if opts.show_codes {
        if let Some(codes) = &codes {
            println!("  {:>12}  {:>10}  code", "value", "count");
            for (value, code) in codes.iter() {
                println!("  {value:>12}  {:>10}  {code}", info.table.get(value));
            }
        }
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(opts.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    let exit_code = match opts.command {
        Command::Compress => cmd_compress(&opts),
        Command::Decompress => cmd_decompress(&opts),
        Command::Info => cmd_info(&opts),
        Command::Config => cmd_config(),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
