use anyhow::Result;
use bajaplot::chart::{Chart, ChartAppearance, load_records_file, render_file};
use clap::Parser;
use std::path::Path;

#[derive(Clone, Debug, Parser)]
#[command(version)]
pub struct Args {
    #[clap(help = "record table (TSV; \"-\" reads stdin)")]
    pub input: String,

    #[clap(short = 'o', long, help = "output filename (png or svg)", default_value = "out.png")]
    pub output: String,

    #[clap(short = 'a', long, help = "appearance overrides (YAML)")]
    pub appearance: Option<String>,

    #[clap(short = 'c', long, help = "color scale name")]
    pub colormap: Option<String>,

    #[clap(short = 'f', long, help = "create directory if missing")]
    pub create_missing_dir: bool,

    #[clap(
        short = 'T',
        long,
        help = "print to terminal (encoded to iTerm2 image format)",
        default_value = "false"
    )]
    pub output_iterm2: bool,
}

fn print_args(args: &[String]) {
    let args = args
        .iter()
        .map(|x| if x.contains(' ') { format!("\"{x}\"") } else { x.to_string() })
        .collect::<Vec<_>>();
    let args = args.join(" ");
    log::info!("args: {args}");
}

fn load_appearance(args: &Args) -> Result<ChartAppearance> {
    let mut appearance = if let Some(path) = &args.appearance {
        serde_yaml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        ChartAppearance::default()
    };
    if let Some(name) = &args.colormap {
        appearance.colormap = name.clone();
    }
    Ok(appearance)
}

fn ensure_dir(name: &str) -> Result<()> {
    if let Some(dir) = Path::new(name).parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let appearance = load_appearance(args)?;
    let records = load_records_file(&args.input)?;
    log::info!("loaded {} records from {}", records.len(), &args.input);

    let chart = Chart::build(&records, &appearance)?;
    if chart.is_empty() {
        log::warn!("no records to render");
        return Ok(());
    }

    if args.create_missing_dir {
        ensure_dir(&args.output)?;
    }
    render_file(&args.output, &chart, &appearance)?;
    log::info!("wrote {} ({} rows, {} instructions)", &args.output, chart.rows, chart.instructions.len());

    if args.output_iterm2 {
        let bytes = std::fs::read(&args.output)?;
        println!("{}", iterm2img::from_bytes(bytes).inline(true).build());
    }
    Ok(())
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    print_args(&std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(&args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
