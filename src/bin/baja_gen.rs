//! Generate a synthetic medical-leave record table for demos and manual runs.

use anyhow::Result;
use clap::Parser;
use rand::Rng;
use std::io::Write;

#[derive(Clone, Debug, Parser)]
#[command(name = "baja-gen")]
#[command(about = "Generate a synthetic record table (TSV)")]
struct Args {
    #[clap(help = "output file (\"-\" writes stdout)", default_value = "-")]
    output: String,

    #[clap(short = 'g', long, help = "number of diagnosis groups", default_value = "6")]
    groups: usize,

    #[clap(short = 'r', long, help = "maximum rows per group", default_value = "5")]
    rows_per_group: usize,

    #[clap(long, help = "fraction of rows with a constant distribution", default_value = "0.1")]
    constant_ratio: f64,

    #[clap(long, help = "fraction of percentile cells left empty", default_value = "0.05")]
    missing_ratio: f64,
}

const DIAGNOSES: [&str; 10] = [
    "Lumbalgia",
    "Cervicalgia",
    "Tendinitis",
    "Esguince tobillo",
    "Fractura radio",
    "Gonalgia",
    "Dorsalgia",
    "Epicondilitis",
    "Sindrome tunel carpiano",
    "Contractura muscular",
];

fn cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{v:.1}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = rand::rng();

    let mut out: Box<dyn Write> = if args.output == "-" {
        Box::new(std::io::stdout())
    } else {
        Box::new(std::fs::File::create(&args.output)?)
    };
    writeln!(
        out,
        "diagnostico\tcaso\tepisodios\tminmin\tp20min\tp40min\tp60min\tp80min\tp99min\tdurestd_min\tduropt_min"
    )?;

    let mut case = 0;
    for group in 0..args.groups {
        let diagnosis = if group < DIAGNOSES.len() {
            DIAGNOSES[group].to_string()
        } else {
            format!("{} {}", DIAGNOSES[group % DIAGNOSES.len()], group / DIAGNOSES.len() + 1)
        };
        let rows = rng.random_range(1..=args.rows_per_group.max(1));
        for _ in 0..rows {
            case += 1;
            let episodes = rng.random_range(1..=40u32);
            let base = rng.random_range(5.0..30.0f64);

            let mut percentiles = [None; 6];
            if rng.random::<f64>() < args.constant_ratio {
                percentiles = [Some(base.round()); 6];
            } else {
                let mut v = base;
                for p in percentiles.iter_mut() {
                    *p = Some(v);
                    v += rng.random_range(1.0..8.0f64);
                }
                for p in percentiles.iter_mut() {
                    if rng.random::<f64>() < args.missing_ratio {
                        *p = None;
                    }
                }
            }

            let p60 = percentiles[3].unwrap_or(base);
            let standard = (rng.random::<f64>() < 0.9).then(|| (p60 * rng.random_range(0.9..1.3f64)).round());
            let optimal = (rng.random::<f64>() < 0.9).then(|| (p60 * rng.random_range(0.7..1.0f64)).round());

            let row = [
                cell(percentiles[0]),
                cell(percentiles[1]),
                cell(percentiles[2]),
                cell(percentiles[3]),
                cell(percentiles[4]),
                cell(percentiles[5]),
                cell(standard),
                cell(optimal),
            ];
            writeln!(out, "{}\tC{:03}\t{}\t{}", diagnosis, case, episodes, row.join("\t"))?;
        }
    }
    Ok(())
}
