//! Kost Advisor: monthly rent estimates for kost rooms in Kota Tangerang Selatan.
//!
//! Usage:
//!   kost_advisor                                   # interactive form
//!   kost_advisor estimate --district Ciputat --size 12 --ac --wifi
//!   kost_advisor estimate --district Serpong --size 9 --json
//!   kost_advisor about                             # model facts
//!   kost_advisor districts                         # supported districts

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use kost_core::core::format::format_rupiah;
use kost_core::{Amenities, District, Estimate, EstimateRequest, EstimatorConfig, PriceEstimator};
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use std::thread;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kost_advisor")]
#[command(author, version, about = "Kost rent estimation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Model artifact (overrides the config file)
    #[arg(long, global = true, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Feature column list (overrides the config file)
    #[arg(long, global = true, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Pause before showing an interactive result, in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate one room and exit
    Estimate(EstimateArgs),
    /// Fill in the form step by step (default)
    Interactive,
    /// Show what the model is and how well it did in evaluation
    About,
    /// List the districts offered in the form
    Districts,
}

#[derive(Args)]
struct EstimateArgs {
    /// Kecamatan, e.g. "Pondok Aren"
    #[arg(long)]
    district: District,

    /// Room size in m²
    #[arg(long)]
    size: u32,

    #[arg(long)]
    ac: bool,

    /// Kamar mandi dalam
    #[arg(long)]
    private_bath: bool,

    #[arg(long)]
    wifi: bool,

    /// Kloset duduk
    #[arg(long)]
    seated_toilet: bool,

    /// Print the estimate as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays machine-readable.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("kost_core=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let estimator = PriceEstimator::from_config(&config)
        .context("cannot start without a usable model and feature schema")?;

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Estimate(args) => run_estimate(&estimator, &config, args),
        Commands::Interactive => run_interactive(&estimator, &config),
        Commands::About => {
            print_about(&estimator);
            Ok(())
        }
        Commands::Districts => {
            print_districts(&estimator);
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<EstimatorConfig> {
    let mut config = match &cli.config {
        Some(path) => EstimatorConfig::from_file(path)?,
        None => EstimatorConfig::default(),
    };
    if let Some(model) = &cli.model {
        config.model_path = model.clone();
    }
    if let Some(schema) = &cli.schema {
        config.schema_path = schema.clone();
    }
    if let Some(ms) = cli.delay_ms {
        config.analysis_delay_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

fn run_estimate(estimator: &PriceEstimator, config: &EstimatorConfig, args: EstimateArgs) -> Result<()> {
    if !config.room_size_in_range(f64::from(args.size)) {
        bail!(
            "room size must be between {} and {} m²",
            config.min_room_size,
            config.max_room_size
        );
    }
    let request = EstimateRequest::new(
        args.district.label(),
        f64::from(args.size),
        Amenities {
            ac: args.ac,
            private_bath: args.private_bath,
            wifi: args.wifi,
            seated_toilet: args.seated_toilet,
        },
    );
    let estimate = estimator.estimate(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        print_estimate(&estimate);
    }
    Ok(())
}

fn run_interactive(estimator: &PriceEstimator, config: &EstimatorConfig) -> Result<()> {
    loop {
        clear_screen()?;
        println!("{}", "Kost Advisor: Estimasi Harga Sewa Kost".bold());
        println!("Model: {}. Type 'exit' at any prompt to quit.", estimator.metadata().name);
        println!("---------------------------------------------------------------\n");

        let Some(request) = read_request(config)? else {
            break;
        };

        println!("\n{}", "Model sedang menganalisis data kost...".dark_grey());
        thread::sleep(config.analysis_delay());

        match estimator.estimate(&request) {
            Ok(estimate) => print_estimate(&estimate),
            Err(e) => println!("{} {}", "Estimasi gagal:".red().bold(), e),
        }

        if prompt("\n[Enter] untuk estimasi lagi, 'exit' untuk keluar > ")?.is_none() {
            break;
        }
    }
    info!("interactive session finished");
    Ok(())
}

/// Walks the form. `None` means the user quit.
fn read_request(config: &EstimatorConfig) -> Result<Option<EstimateRequest>> {
    println!("{}", "Lokasi & Ukuran".cyan().bold());
    for (i, district) in District::ALL.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, district);
    }

    let district = loop {
        let Some(answer) = prompt("Kecamatan (nomor atau nama) > ")? else {
            return Ok(None);
        };
        if let Some(d) = parse_district_choice(&answer) {
            break d;
        }
        println!("  Pilih nomor 1-{} atau nama kecamatan.", District::ALL.len());
    };

    let size_prompt = format!(
        "Luas kamar m² ({}-{}, default {}) > ",
        config.min_room_size, config.max_room_size, config.default_room_size
    );
    let room_size = loop {
        let Some(answer) = prompt(&size_prompt)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            break config.default_room_size;
        }
        match answer.parse::<u32>() {
            Ok(n) if config.room_size_in_range(f64::from(n)) => break n,
            _ => println!(
                "  Ukuran kamar umumnya berada pada rentang {}-{} m².",
                config.min_room_size, config.max_room_size
            ),
        }
    };

    println!("\n{}", "Fasilitas Utama".cyan().bold());
    let mut toggles = [false; 4];
    for (slot, label) in toggles
        .iter_mut()
        .zip(["AC", "Kamar Mandi Dalam", "WiFi", "Kloset Duduk"])
    {
        let Some(answer) = prompt(&format!("{} (y/N) > ", label))? else {
            return Ok(None);
        };
        *slot = matches!(answer.to_ascii_lowercase().as_str(), "y" | "ya" | "yes");
    }

    Ok(Some(EstimateRequest::new(
        district.label(),
        f64::from(room_size),
        Amenities {
            ac: toggles[0],
            private_bath: toggles[1],
            wifi: toggles[2],
            seated_toilet: toggles[3],
        },
    )))
}

fn parse_district_choice(answer: &str) -> Option<District> {
    match answer.parse::<usize>() {
        Ok(n) if (1..=District::ALL.len()).contains(&n) => Some(District::ALL[n - 1]),
        Ok(_) => None,
        Err(_) => answer.parse().ok(),
    }
}

/// Reads one trimmed line. EOF and `exit` both end the session.
fn prompt(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    stdout().flush()?;
    let mut input = String::new();
    if stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    let answer = input.trim();
    if answer.eq_ignore_ascii_case("exit") {
        return Ok(None);
    }
    Ok(Some(answer.to_string()))
}

fn clear_screen() -> Result<()> {
    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

fn print_estimate(estimate: &Estimate) {
    let result = &estimate.result;
    println!("\n{}", "Estimasi Harga Bulanan".bold());
    println!("  {}", format_rupiah(result.point_estimate).green().bold());
    println!("  Estimasi berbasis Machine Learning");

    println!("\n{}", "Rentang Estimasi Harga".bold());
    println!(
        "  {} - {}",
        format_rupiah(result.lower_bound),
        format_rupiah(result.upper_bound)
    );
    println!(
        "  Rentang dihitung dari rata-rata kesalahan model (RMSE {}).",
        format_rupiah(estimate.margin)
    );

    if !estimate.district_matched {
        println!(
            "\n  {}",
            "Kecamatan ini tidak dikenal model; estimasi dibuat tanpa sinyal lokasi.".yellow()
        );
    }

    println!(
        "\n{}",
        "Estimasi bersifat prediktif dan digunakan sebagai referensi awal, bukan penentu harga final."
            .dark_grey()
    );
}

fn print_about(estimator: &PriceEstimator) {
    let meta = estimator.metadata();
    println!("{}", "Tentang Model".bold());
    println!("  Model     : {}", meta.name);
    println!("  Wilayah   : {}", meta.region);
    println!("  Train R²  : {:.0}%", meta.train_r2 * 100.0);
    println!("  Test R²   : {:.0}%", meta.test_r2 * 100.0);
    if meta.is_good_fit() {
        println!("  Selisih train-test < 10% (good fit)");
    } else {
        println!("  Selisih train-test >= 10%");
    }
    println!("  Fitur     : {}", estimator.schema().len());
    println!("  RMSE      : {}", format_rupiah(estimator.margin()));
    println!("\n{}", meta.description);
}

fn print_districts(estimator: &PriceEstimator) {
    let unmatched = estimator.schema().unmatched_districts();
    for district in District::ALL {
        if unmatched.contains(&district) {
            println!("  {} {}", district, "(tanpa kolom lokasi di model)".yellow());
        } else {
            println!("  {}", district);
        }
    }
}
