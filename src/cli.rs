use std::path::PathBuf;

use clap::Parser;

use crate::models::RiskLevel;

#[derive(Parser, Debug)]
#[command(
    name = "tender-checkr",
    about = "Load public-procurement datasets and check contractor risk exposure",
    version
)]
pub struct Cli {
    /// Data directory containing the entity and contractor tables
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Policy config file [default: ./.tender-checkr/config.toml, fallback ~/.config/tender-checkr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// PDF output path; use without value to default to procurement-report.pdf
    #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "procurement-report.pdf")]
    pub pdf: Option<PathBuf>,

    /// Only include entities in this municipality/department
    #[arg(long, value_name = "NAME")]
    pub municipality: Option<String>,

    /// Only include contractors at these risk levels (repeatable)
    #[arg(long = "risk", value_name = "LEVEL")]
    pub risk: Vec<RiskArg>,

    /// Only include records whose entity name contains this text
    #[arg(long, value_name = "NAME")]
    pub entity: Option<String>,

    /// Number of entities shown in the top-budget table
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub top: usize,

    /// Show all contractors (not just flagged/review ones)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
    Pdf,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum RiskArg {
    Critical,
    High,
    Medium,
    Low,
    Ok,
}

impl From<&RiskArg> for RiskLevel {
    fn from(arg: &RiskArg) -> Self {
        match arg {
            RiskArg::Critical => RiskLevel::Critical,
            RiskArg::High => RiskLevel::High,
            RiskArg::Medium => RiskLevel::Medium,
            RiskArg::Low => RiskLevel::Low,
            RiskArg::Ok => RiskLevel::Ok,
        }
    }
}
