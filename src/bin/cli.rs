//! CLI for eye distance measurement and verification.
//!
//! Usage:
//!   eye-distance measure animal_masks.json                       # Human-readable output
//!   eye-distance measure animal_masks.json --json -o report.json # JSON report to file
//!   eye-distance verify animal_masks.json ground_truth.csv       # Compare with ground truth

use std::path::PathBuf;

use animal_eye_distance::exchange::load_scenes;
use animal_eye_distance::verify::{load_ground_truth, Outcome, VerifyOptions, DEFAULT_TOLERANCE_PX};
use animal_eye_distance::{EyeLayout, Participants, Report};
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "eye-distance")]
#[command(author, version, about = "Animal pupillary and right-eye distance measurement", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure PD and RR distances from a mask exchange document
    Measure {
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Measure, then compare against a ground-truth CSV table
    Verify {
        #[command(flatten)]
        output: OutputArgs,

        /// Ground truth CSV (Image_Name,Type,Obj_ID_1,Obj_ID_2,Expected_Dist)
        #[arg(required = true)]
        ground_truth: PathBuf,

        /// Absolute tolerance in pixels
        #[arg(long, default_value_t = DEFAULT_TOLERANCE_PX)]
        tolerance: f64,
    },
}

#[derive(ClapArgs, Debug)]
struct OutputArgs {
    /// Mask exchange document (JSON)
    #[arg(required = true)]
    masks: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when verification found mismatches or missing rows.
fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    let (output, verification) = match &args.command {
        Command::Measure { output } => (output, None),
        Command::Verify {
            output,
            ground_truth,
            tolerance,
        } => (output, Some((ground_truth, *tolerance))),
    };

    log::info!("Loading masks from {:?}", output.masks);
    let scenes = load_scenes(&output.masks)?;
    let mut report = Report::measure(&scenes);

    if let Some((path, tolerance)) = verification {
        log::info!("Loading ground truth from {:?}", path);
        let truth = load_ground_truth(path)?;
        report = report.verified(&truth, &VerifyOptions { tolerance });
    }

    let output_str = if output.json {
        serde_json::to_string_pretty(&report)?
    } else {
        format_human_readable(&report)
    };

    if let Some(ref path) = output.output {
        std::fs::write(path, &output_str)?;
        log::info!("Output written to {:?}", path);
    } else {
        println!("{}", output_str);
    }

    Ok(report
        .verification
        .as_ref()
        .map_or(true, |v| v.summary.all_passed()))
}

fn format_point(p: Option<animal_eye_distance::Point>) -> String {
    match p {
        Some(p) => format!("({:.1}, {:.1})", p.x, p.y),
        None => "-".to_string(),
    }
}

fn format_human_readable(report: &Report) -> String {
    let mut s = String::new();

    s.push_str(&format!("Images: {}\n", report.images.len()));

    for image in &report.images {
        s.push_str(&format!("\n--- {} ---\n", image.image));
        if image.individuals.is_empty() {
            s.push_str("No animals found.\n");
            continue;
        }

        s.push_str("Eyes (camera-frame left/right):\n");
        for ind in &image.individuals {
            let note = match ind.eyes {
                EyeLayout::None => " (no valid eye)",
                EyeLayout::Single { .. } => " (single eye)",
                EyeLayout::Pair { .. } => "",
            };
            s.push_str(&format!(
                "  #{} {:<8} L: {:<16} R: {:<16}{}\n",
                ind.id,
                ind.category,
                format_point(ind.eyes.left()),
                format_point(ind.eyes.right()),
                note
            ));
        }

        for record in &image.records {
            match record.participants {
                Participants::Individual { id } => {
                    s.push_str(&format!("  PD #{}: {:.2} px\n", id, record.distance))
                }
                Participants::Pair { id1, id2 } => {
                    s.push_str(&format!("  RR #{}-#{}: {:.2} px\n", id1, id2, record.distance))
                }
            }
        }
    }

    if let Some(v) = &report.verification {
        s.push_str("\nVerification:\n");
        s.push_str(&format!(
            "  {:<18} | {:<10} | {:<8} | {:>10} | {:>10} | {}\n",
            "Image", "Type", "IDs", "Expected", "Computed", "Result"
        ));
        s.push_str(&format!("  {:-<85}\n", ""));
        for verdict in &v.verdicts {
            let (expected, computed) = match verdict.outcome {
                Outcome::Pass {
                    expected, computed, ..
                }
                | Outcome::Mismatch {
                    expected, computed, ..
                } => (format!("{:.2}", expected), format!("{:.2}", computed)),
                Outcome::Missing { expected, .. } => (format!("{:.2}", expected), "-".to_string()),
                Outcome::Unverified { computed } => ("-".to_string(), format!("{:.2}", computed)),
            };
            s.push_str(&format!(
                "  {:<18} | {:<10} | {:<8} | {:>10} | {:>10} | {}\n",
                verdict.image,
                verdict.participants.kind().to_string(),
                verdict.participants.to_string(),
                expected,
                computed,
                verdict.outcome
            ));
        }

        let summary = &v.summary;
        s.push_str(&format!("  {:-<85}\n", ""));
        s.push_str(&format!("  Passed:     {}\n", summary.passed));
        s.push_str(&format!("  Mismatched: {}\n", summary.mismatched));
        s.push_str(&format!("  Missing:    {}\n", summary.missing));
        s.push_str(&format!("  Unverified: {}\n", summary.unverified));
        if let Some(mae) = summary.mean_abs_error {
            s.push_str(&format!("  MAE:        {:.3} px\n", mae));
        }
        s.push_str(&format!("  Grade:      {}\n", summary.grade));
    }

    s
}
