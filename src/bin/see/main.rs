use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use see_rs::{
    find_nearest, read_directory, read_trace, relative_delay, ChannelClassifier, ChannelKind,
    KeysightReader, LoaderConfig, PrefixChannelClassifier,
};

#[derive(Parser)]
#[command(
    name = "see",
    version,
    about = "Seismo-electric effect (SEE) waveform tool",
    long_about = "Inspect and load Keysight H5 waveform recordings and estimate\n\
                  relative delays between recorded waveforms."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Show channel metadata of a recording
    Info(InfoArgs),
    /// Load every recording in a directory and summarize the traces
    Load(LoadArgs),
    /// Estimate the relative delay between two recordings
    Delay(DelayArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Recording file (.h5)
    file: PathBuf,

    /// Channel number (default: inferred from the file name)
    #[arg(long)]
    channel: Option<String>,

    /// Report the recorded sample nearest this time, in seconds
    #[arg(long)]
    at: Option<f64>,

    /// JSON output
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args)]
struct LoadArgs {
    /// Directory holding .h5 recordings
    dir: PathBuf,
}

#[derive(Args)]
struct DelayArgs {
    /// Recording whose delay is estimated
    file: PathBuf,

    /// Reference recording
    reference: PathBuf,
}

#[derive(Serialize)]
struct InfoReport {
    file: String,
    channels: Vec<String>,
    channel: String,
    kind: ChannelKind,
    info: see_rs::ChannelInfo,
    sample_rate: f64,
    duration: f64,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let exit_code = match cli.command {
        Command::Info(args) => info(args),
        Command::Load(args) => load(args),
        Command::Delay(args) => delay(args),
    };

    process::exit(exit_code);
}

fn classify(path: &PathBuf) -> ChannelKind {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    PrefixChannelClassifier::default().classify(&name)
}

fn info(args: InfoArgs) -> i32 {
    let kind = classify(&args.file);
    let channel = args
        .channel
        .unwrap_or_else(|| kind.channel_number().to_string());

    let report = KeysightReader::open(&args.file).and_then(|reader| {
        let info = reader.channel_info(&channel)?;
        Ok(InfoReport {
            file: args.file.display().to_string(),
            channels: reader.channel_names()?,
            channel: channel.clone(),
            kind,
            sample_rate: info.sample_rate(),
            duration: info.duration(),
            info,
        })
    });

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: JSON serialization failed: {}", e);
                return 1;
            }
        }
    } else {
        println!("file:        {}", report.file);
        println!("channels:    {}", report.channels.join(", "));
        println!("channel:     {} ({:?})", report.channel, report.kind);
        println!("samples:     {}", report.info.num_points);
        println!("sample rate: {:.6e} Hz", report.sample_rate);
        println!("duration:    {:.6e} s", report.duration);
        println!("x origin:    {:.6e} s", report.info.x_org);
        println!("y origin:    {:.6e} V", report.info.y_org);
    }

    if let Some(target) = args.at {
        let trace = match read_trace(&args.file, kind, &LoaderConfig::default()) {
            Ok(trace) => trace,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        let time: Vec<f64> = trace.time.iter().map(|&t| t as f64).collect();
        match find_nearest(&time, target) {
            Some((value, index)) => {
                println!("nearest:     sample {} at {:.6e} s", index, value)
            }
            None => eprintln!("Error: trace is empty"),
        }
    }

    0
}

fn load(args: LoadArgs) -> i32 {
    let traces = match read_directory(&args.dir, &LoaderConfig::default()) {
        Ok(traces) => traces,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    for (name, trace) in &traces {
        println!(
            "{}: {} samples, dt {:.6e} s, span {:.6e} s",
            name,
            trace.len(),
            trace.dt,
            trace.dt as f64 * trace.len() as f64
        );
    }
    println!("{} trace(s) loaded", traces.len());

    0
}

fn delay(args: DelayArgs) -> i32 {
    let config = LoaderConfig::default();

    let result = (|| {
        let trace = read_trace(&args.file, classify(&args.file), &config)?;
        let reference = read_trace(&args.reference, classify(&args.reference), &config)?;

        if (trace.dt - reference.dt).abs() > trace.dt.abs() * 1e-6 {
            log::warn!(
                "Sample steps differ: {:.6e} vs {:.6e}; lag uses the first",
                trace.dt,
                reference.dt
            );
        }

        let w1: Vec<f64> = trace.amplitude.iter().map(|&v| v as f64).collect();
        let w2: Vec<f64> = reference.amplitude.iter().map(|&v| v as f64).collect();
        relative_delay(&w1, &w2, trace.dt as f64)
    })();

    match result {
        Ok(lag) => {
            println!("{:.9e}", lag);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}
