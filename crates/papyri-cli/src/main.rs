use clap::{Parser, Subcommand};
use papyri_cli::{cmd_enhance, cmd_init, cmd_labels, EnhanceArgs, EnhanceOverrides};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "papyri")]
#[command(version, about = "Legibility enhancement for papyrus images", long_about = None)]
struct Cli {
    /// Log pipeline details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce enhanced variants of image(s)
    Enhance {
        /// Input files or directories
        #[arg(value_name = "INPUTS", required = true)]
        inputs: Vec<PathBuf>,

        /// Config file (default: search ./config, ., ~/papyri)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output directory (default: <dir_name> next to each input)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Scan directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Built-in methods: vividness, lsv, adapthisteq (comma-separated)
        #[arg(short, long, value_name = "LIST")]
        methods: Option<String>,

        /// Retinex variants: SSR, MSR, MSRCR, AutoMSRCR, MSRCP (comma-separated)
        #[arg(long, value_name = "LIST")]
        retinex: Option<String>,

        /// Also produce negative variants
        #[arg(long)]
        negative: bool,

        /// Also produce blue-shifted variants (color images only)
        #[arg(long)]
        blue: bool,

        /// Reinsert the original background behind each variant
        #[arg(long)]
        mask: bool,

        /// Background brightness for masking: light or dark
        #[arg(long, value_name = "POLARITY")]
        background: Option<String>,

        /// With --mask, keep the unmasked variants as well
        #[arg(long)]
        keep_unmasked: bool,

        /// Segment on a shadow-free chromaticity image
        #[arg(long)]
        deshadow: bool,

        /// Enhance the red channel of color images only
        #[arg(long)]
        red: bool,

        /// Output formats: tiff, jpeg (comma-separated)
        #[arg(short, long, value_name = "LIST")]
        format: Option<String>,

        /// JPEG quality (0-100)
        #[arg(short, long, value_name = "N")]
        quality: Option<i32>,

        /// Name of the output directory created next to each input
        #[arg(long, value_name = "NAME")]
        dir_name: Option<String>,
    },

    /// Print every label an image class can produce
    Labels {
        /// Image class: color or gray
        #[arg(long, value_name = "CLASS", default_value = "color")]
        class: String,

        /// Ordering: sequential or interleaved
        #[arg(long, value_name = "ORDER", default_value = "interleaved")]
        order: String,
    },

    /// Write the default configuration to ~/papyri/papyri.yml
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "papyri=debug,papyri_core=debug,papyri_cli=debug"
    } else {
        "papyri=info,papyri_core=info,papyri_cli=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let result = match cli.command {
        Commands::Enhance {
            inputs,
            config,
            out,
            recursive,
            methods,
            retinex,
            negative,
            blue,
            mask,
            background,
            keep_unmasked,
            deshadow,
            red,
            format,
            quality,
            dir_name,
        } => cmd_enhance(EnhanceArgs {
            inputs,
            config,
            out,
            recursive,
            overrides: EnhanceOverrides {
                methods,
                retinex,
                negative,
                blue_shift: blue,
                mask,
                background,
                keep_unmasked,
                deshadow,
                red_channel_only: red,
                formats: format,
                jpeg_quality: quality,
                dir_name,
            },
        }),

        Commands::Labels { class, order } => cmd_labels(&class, &order),

        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
