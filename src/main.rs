use clap::{Parser, Subcommand};
use makecatalog::config::{self, CONFIG_FILE};
use makecatalog::export::Engine;
use makecatalog::{output, pipeline};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "makecatalog")]
#[command(about = "Compose a product catalog JSON into HTML and PDF")]
#[command(long_about = "\
Compose a product catalog JSON into HTML and PDF

The catalog file describes sections, series and models. Every run writes one
self-contained HTML document; `build` then prints it to an A4 PDF.

Page order:

  cover                        (unless --no-cover)
  contents
  per section:
    section divider
    per series:
      series page              hero, description, tables, media, model index
      product grid             model cards with prices (series with models)
      model pages              one per model (settings.generate_model_pages)
  back cover                   (unless --no-cover)

Images are looked up under images_dir, relative to the HTML output. Missing
images are reported and left as placeholders.

Run 'makecatalog gen-config' to generate a documented makecatalog.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file [default: makecatalog.toml if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// HTML output path
    #[arg(long, global = true)]
    html_output: Option<PathBuf>,

    /// PDF output path (empty string disables export)
    #[arg(long, global = true)]
    pdf_output: Option<String>,

    /// Tera template directory (replaces the built-in templates)
    #[arg(long, global = true)]
    templates: Option<PathBuf>,

    /// PDF engine
    #[arg(long, value_enum, global = true)]
    engine: Option<Engine>,

    /// Leave out the cover and back cover pages
    #[arg(long, global = true)]
    no_cover: bool,

    /// Images directory (relative to the HTML output unless absolute)
    #[arg(long, global = true)]
    images_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the HTML document and export the PDF
    Build {
        /// Catalog JSON file
        catalog: PathBuf,
    },
    /// Write the HTML document only
    Html {
        /// Catalog JSON file
        catalog: PathBuf,
    },
    /// Validate the catalog and templates without writing files
    Check {
        /// Catalog JSON file
        catalog: PathBuf,
    },
    /// Print a stock makecatalog.toml with all options documented
    GenConfig,
}

impl Cli {
    /// CLI flags as a config layer on top of the file.
    fn overrides(&self) -> toml::Value {
        let mut table = toml::Table::new();
        let mut set = |key: &str, value: toml::Value| {
            table.insert(key.to_string(), value);
        };
        if let Some(path) = &self.html_output {
            set("html_output", path.display().to_string().into());
        }
        if let Some(path) = &self.pdf_output {
            set("pdf_output", path.clone().into());
        }
        if let Some(dir) = &self.templates {
            set("template_dir", dir.display().to_string().into());
        }
        if let Some(engine) = self.engine {
            set("engine", engine.as_str().into());
        }
        if self.no_cover {
            set("include_cover", false.into());
        }
        if let Some(dir) = &self.images_dir {
            set("images_dir", dir.display().to_string().into());
        }
        toml::Value::Table(table)
    }

    fn load_config(&self) -> Result<config::CatalogConfig, config::ConfigError> {
        let (path, required) = match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(CONFIG_FILE), false),
        };
        config::load_config(&path, required, Some(self.overrides()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Build { catalog } => {
            let config = cli.load_config()?;
            println!("==> Building {}", catalog.display());
            let report = pipeline::run(catalog, &config)?;
            output::print_run_report(&report);
        }
        Command::Html { catalog } => {
            let mut config = cli.load_config()?;
            config.pdf_output.clear();
            println!("==> Writing HTML for {}", catalog.display());
            let report = pipeline::run(catalog, &config)?;
            output::print_run_report(&report);
        }
        Command::Check { catalog } => {
            let config = cli.load_config()?;
            println!("==> Checking {}", catalog.display());
            let summary = pipeline::check(catalog, &config)?;
            output::print_summary(&summary);
            println!("==> Catalog is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
