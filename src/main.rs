use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use insurance_compare::catalog::max_premium;
use insurance_compare::catalog::source::load_dataset;
use insurance_compare::catalog::{Category, InsuranceData};
use insurance_compare::config::{Config, ConfigOverrides};
use insurance_compare::filters::query::FilterQuery;
use insurance_compare::filters::Filters;
use insurance_compare::output::csv::{catalog_to_csv, print_table_to_csv, ranked_to_csv};
use insurance_compare::output::json::render_json;
use insurance_compare::output::table::{
    render_catalog_table, render_comparison_table, render_print_table,
};
use insurance_compare::pipeline::Comparison;
use insurance_compare::report::export::{export_report, today, ExportFormat};
use insurance_compare::report::{build_print_table, PrintMode, PrintTable};
use insurance_compare::server::run_server;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Csv,
    Table,
}

impl From<ReportFormat> for ExportFormat {
    fn from(value: ReportFormat) -> Self {
        match value {
            ReportFormat::Csv => ExportFormat::Csv,
            ReportFormat::Table => ExportFormat::Table,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "insurance-compare",
    about = "Score, filter and rank insurance offers against a coverage catalog"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Dataset JSON file, overrides the configured source.
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// Dataset endpoint, e.g. http://127.0.0.1:3002/api/insurances
    #[arg(short, long)]
    url: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct FilterArgs {
    #[arg(long = "max-price")]
    max_price: Option<f64>,
    /// Minimum average score on the 0-100 scale.
    #[arg(long = "min-score")]
    min_score: Option<f64>,
    /// Comma separated company names.
    #[arg(long)]
    companies: Option<String>,
    /// Comma separated micro-coverage ids that must all be covered.
    #[arg(long)]
    coverages: Option<String>,
    /// URL query string (maxPrice, minScore, companies, coverages); flags win over it.
    #[arg(long)]
    query: Option<String>,
}

impl FilterArgs {
    fn to_filters(&self, data: &InsuranceData) -> Result<Filters> {
        let mut query = match &self.query {
            Some(raw) => FilterQuery::parse(raw)?,
            None => FilterQuery::default(),
        };
        if let Some(min_score) = self.min_score {
            query.min_score = Some(min_score.to_string());
        }
        if let Some(companies) = &self.companies {
            query.companies = Some(companies.clone());
        }
        if let Some(coverages) = &self.coverages {
            query.coverages = Some(coverages.clone());
        }
        warn_unknown_selections(&query, data);
        let mut filters = query.to_filters(max_premium(&data.offers));
        // An explicit cap is taken as given; only the query codec reads 0 as "no cap".
        if let Some(max_price) = self.max_price {
            filters.price_range.max = max_price;
        }
        Ok(filters)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    Compare {
        #[command(flatten)]
        filters: FilterArgs,
    },
    Export {
        #[arg(long)]
        mode: Option<PrintMode>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,
        /// Directory for the report file, defaults to report.output_dir.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the rows instead of writing a file.
        #[arg(long)]
        stdout: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    Catalog,
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        data_path: cli.data.clone(),
        data_url: cli.url.clone(),
    });

    if matches!(cli.command, Commands::Config { .. }) {
        return handle_config_command(&cli.command, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        let host = host.clone().unwrap_or_else(|| config.server.host.clone());
        let port = port.unwrap_or(config.server.port);
        let bind = format!("{host}:{port}");
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        return run_server(config, addr).await;
    }

    let data = load_dataset(&config).await?;
    match &cli.command {
        Commands::Compare { filters } => {
            let comparison = Comparison::run(&data, filters.to_filters(&data)?);
            print_comparison(&comparison, cli.output)?;
        }
        Commands::Export {
            mode,
            format,
            out,
            stdout,
            filters,
        } => {
            let mode = mode.unwrap_or(config.report.default_mode);
            let comparison = Comparison::run(&data, filters.to_filters(&data)?);
            let categories = mode.categories(&data.categories, &comparison.filters);
            let table = build_print_table(mode, &comparison.offers, &categories);
            if *stdout {
                print_report(&table, cli.output)?;
            } else {
                let dir = out.clone().unwrap_or_else(|| config.resolved_output_dir());
                let path = export_report(&dir, &table, (*format).into(), today())?;
                println!("{}", path.display());
            }
        }
        Commands::Catalog => print_catalog(&data.categories, cli.output)?,
        Commands::Serve { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn handle_config_command(command: &Commands, config: &Config, config_path: &PathBuf) -> Result<()> {
    let Commands::Config { init, show } = command else {
        return Ok(());
    };
    if *init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if *show || !*init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn warn_unknown_selections(query: &FilterQuery, data: &InsuranceData) {
    let filters = query.to_filters(max_premium(&data.offers));
    for company in &filters.selected_companies {
        if !data.offers.iter().any(|o| &o.company == company) {
            warn!(company = %company, "no offer from this company");
        }
    }
    for micro_id in &filters.selected_coverages {
        let known = data
            .categories
            .iter()
            .any(|c| c.micro_ids().any(|id| id == micro_id));
        if !known {
            warn!(coverage = %micro_id, "coverage id is not in the catalog");
        }
    }
}

fn print_comparison(comparison: &Comparison, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!(
            "{}",
            render_comparison_table(&comparison.offers, Some(&comparison.summary))
        ),
        OutputFormat::Json => println!("{}", render_json(comparison)?),
        OutputFormat::Csv => print!("{}", ranked_to_csv(&comparison.offers)?),
    }
    if comparison.summary.filters_active {
        info!(
            shown = comparison.summary.shown_offers,
            total = comparison.summary.total_offers,
            "filters active"
        );
    }
    Ok(())
}

fn print_report(table: &PrintTable, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_print_table(table, true)),
        OutputFormat::Json => println!("{}", render_json(table)?),
        OutputFormat::Csv => print!("{}", print_table_to_csv(table)?),
    }
    Ok(())
}

fn print_catalog(categories: &[Category], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_catalog_table(categories)),
        OutputFormat::Json => println!("{}", render_json(categories)?),
        OutputFormat::Csv => print!("{}", catalog_to_csv(categories)?),
    }
    Ok(())
}
