use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jobfill", about = "Autofill job applications on ATS pages from a candidate profile")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill an application form
    Fill {
        #[command(flatten)]
        target: Target,

        /// Only fill mappings marked required
        #[arg(long)]
        required_only: bool,

        /// Search inside the platform's form container
        #[arg(long)]
        use_form_container: bool,

        /// Pause between fields in milliseconds (overrides config)
        #[arg(long)]
        pacing_ms: Option<u64>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what would be filled without touching the page
    Preview {
        #[command(flatten)]
        target: Target,

        /// Search inside the platform's form container
        #[arg(long)]
        use_form_container: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// List platforms and the profile fields they map
    Fields {
        /// Only this platform
        #[arg(short, long)]
        platform: Option<String>,
    },
}

/// Page and profile a fill or preview works on
#[derive(Args)]
pub struct Target {
    /// Platform id (greenhouse, workday, ...)
    #[arg(short, long)]
    pub platform: String,

    /// Candidate profile JSON file
    #[arg(long)]
    pub profile: PathBuf,

    #[command(flatten)]
    pub source: Source,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct Source {
    /// Live page opened in headless Chrome
    #[arg(long)]
    pub url: Option<String>,

    /// Local HTML file
    #[arg(long)]
    pub html: Option<PathBuf>,
}
