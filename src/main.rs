//! Stewart Analyzer - Entry point
//!
//! Physicochemical (Stewart/Fencl) acid-base analysis of a blood-gas panel.
//!
//! CLI Usage:
//!   cargo run -- --ph 7.28 --pco2 30 --na 138 --cl 115 --lactate 1.5 --albumin 40
//!   cargo run -- --ph 7.40 --pco2 40 --na 140 --cl 100 --advanced --json
//!   cargo run -- --batch panels.csv --out results.csv

use anyhow::{bail, Context, Result};
use stewart_analyzer::{
    analysis::{AnalysisMode, AnalysisResult, Analyte, MeasurementInput, StewartAnalyzer},
    batch::BatchRunner,
    config::{BaseExcessPreset, Parameters},
    export::parse_number,
};

/// Parsed command line
#[derive(Debug, Default)]
struct CliOptions {
    input: MeasurementInput,
    mode: AnalysisMode,
    json: bool,
    batch: Option<String>,
    out: Option<String>,
    params: Option<String>,
    preset: Option<BaseExcessPreset>,
}

fn analyte_for_flag(flag: &str) -> Option<Analyte> {
    match flag {
        "--ph" => Some(Analyte::Ph),
        "--pco2" => Some(Analyte::Pco2),
        "--na" => Some(Analyte::Na),
        "--cl" => Some(Analyte::Cl),
        "--hco3" => Some(Analyte::Hco3),
        "--be" | "--base-deficit" => Some(Analyte::Be),
        "--k" => Some(Analyte::K),
        "--ca" => Some(Analyte::Ca),
        "--mg" => Some(Analyte::Mg),
        "--lactate" => Some(Analyte::Lactate),
        "--albumin" => Some(Analyte::AlbuminGl),
        "--po4" => Some(Analyte::Po4),
        _ => None,
    }
}

fn print_help() {
    println!("Stewart Analyzer");
    println!();
    println!("Usage: stewart-analyzer --ph PH --pco2 MMHG --na MMOL --cl MMOL [OPTIONS]");
    println!("       stewart-analyzer --batch IN.csv [--out OUT.csv] [OPTIONS]");
    println!();
    println!("Measurements:");
    println!("  --hco3 X            Measured bicarbonate (mEq/L)");
    println!("  --be X              Measured base excess (mEq/L)");
    println!("  --base-deficit X    Base deficit entered as a positive number");
    println!("  --k --ca --mg X     Strong cations (mmol/L)");
    println!("  --lactate X         Lactate (mmol/L)");
    println!("  --albumin X         Albumin (g/L)");
    println!("  --po4 X             Phosphate (mmol/L)");
    println!();
    println!("Options:");
    println!("  --advanced, -a      Add SIDeffective, SIG and Atot");
    println!("  --json              Print the full result as JSON");
    println!("  --batch FILE        Analyse every row of a CSV file");
    println!("  --out FILE          Batch output CSV (default: exports/analysis_<time>.csv)");
    println!("  --params FILE       Parameter JSON (default: data/parameters/analysis.json)");
    println!("  --preset NAME       BE coefficients: siggaard-andersen | van-slyke");
    println!("  --help, -h          Show this help");
}

/// Parse CLI arguments
fn parse_args() -> Result<CliOptions> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from(&args)
}

/// Parse an argument list; `args[0]` is the program name
fn parse_args_from(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || -> Result<&str> {
            i += 1;
            args.get(i)
                .map(String::as_str)
                .with_context(|| format!("{flag} needs a value"))
        };

        if let Some(analyte) = analyte_for_flag(flag) {
            let raw = value()?;
            let parsed = parse_number(analyte.key(), raw)?;
            options.input.set(analyte, parsed);
            // The last BE flag decides the sign convention
            match flag {
                "--base-deficit" => options.input.is_base_deficit = true,
                "--be" => options.input.is_base_deficit = false,
                _ => {}
            }
        } else {
            match flag {
                "--advanced" | "-a" => options.mode = AnalysisMode::Advanced,
                "--json" => options.json = true,
                "--batch" => options.batch = Some(value()?.to_string()),
                "--out" | "-o" => options.out = Some(value()?.to_string()),
                "--params" => options.params = Some(value()?.to_string()),
                "--preset" => {
                    options.preset = Some(match value()? {
                        "siggaard-andersen" | "sa" => BaseExcessPreset::SiggaardAndersen,
                        "van-slyke" | "vs" => BaseExcessPreset::VanSlyke,
                        other => bail!("unknown BE preset '{other}'"),
                    })
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => log::warn!("Ignoring unknown argument {other}"),
            }
        }
        i += 1;
    }

    Ok(options)
}

fn print_report(result: &AnalysisResult) {
    println!("=== Stewart Acid-Base Analysis ({}) ===\n", result.mode.as_str());

    if !result.is_valid() {
        println!("Input rejected:");
        for error in &result.errors {
            println!("  - {}", error);
        }
        for finding in &result.findings {
            println!("Note: {}", finding);
        }
        return;
    }
    let Some(report) = &result.report else {
        return;
    };

    let headline = &report.narrative.headline;
    println!("Dominant mechanism: {}", headline.dominant_mechanism);
    for m in &headline.significant_mechanisms {
        println!("  significant:  {}", m);
    }
    for m in &headline.contributing_mechanisms {
        println!("  contributing: {}", m);
    }
    println!("Respiratory: {}", headline.respiratory_status);
    if let Some(note) = headline.pattern_note {
        println!("Pattern: {}", note);
    }
    println!();

    let d = &report.derived;
    println!(
        "HCO3 {:.1} ({})  BE {:+.1} ({})",
        d.hco3.used,
        d.hco3.source.as_str(),
        d.be.used,
        d.be.source.as_str()
    );
    println!(
        "SID simple {:.1}  basic {}  full {:.1} ({})",
        report.sid.simple,
        report
            .sid
            .basic
            .value
            .map_or_else(|| "-".to_string(), |v| format!("{v:.1}")),
        report.sid.full.value,
        report.sid.full.status.as_str()
    );
    if let Some(e) = &report.effective {
        println!(
            "SIDe {:.1}  SIG {:.1} ({})",
            e.sid_effective,
            e.sig,
            e.sig_reliability.as_str()
        );
    }
    println!(
        "Anion gap {:.1}  Cl/Na {:.3}",
        report.anion_gap.value, report.cl_na_ratio
    );
    println!("Disorder: {}", report.classification.dominant_disorder);
    println!();

    for line in &report.interpretations {
        println!("* {}", line);
    }
    for difference in &report.narrative.classic.differences {
        println!("Classic vs Stewart: {}", difference);
    }
    println!("{}", report.narrative.classic.summary);
    for note in &report.narrative.cds_notes {
        println!("[{:?}] {}: {}", note.category, note.condition, note.explanation);
    }
    if !result.findings.is_empty() {
        println!();
        for finding in &result.findings {
            println!("Note: {}", finding);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let options = parse_args()?;

    let mut params = match &options.params {
        Some(path) => Parameters::load_from_path(path),
        None => Parameters::load_or_default(),
    };
    if let Some(preset) = options.preset {
        params = params.with_base_excess_preset(preset);
    }
    let analyzer = StewartAnalyzer::new(params);

    if let Some(batch) = &options.batch {
        let runner = BatchRunner::new(analyzer, options.mode);
        let report = runner.run_path(batch)?;
        let summary = report.summary();
        let path = match &options.out {
            Some(out) => report.write_csv(out)?,
            None => report.write_csv(default_batch_output())?,
        };
        println!(
            "{} rows: {} analysed, {} rejected, {} unparsable -> {}",
            summary.total,
            summary.analyzed,
            summary.rejected,
            summary.parse_errors,
            path.display()
        );
        if summary.swap_suspected + summary.extreme_values > 0 {
            println!(
                "Check entries: {} suspected Na/Cl swaps, {} rows with extreme values (see detail column)",
                summary.swap_suspected, summary.extreme_values
            );
        }
        return Ok(());
    }

    let result = analyzer.analyze(&options.input, options.mode);
    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }
    Ok(())
}

fn default_batch_output() -> String {
    format!(
        "exports/analysis_{}.csv",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    )
}
