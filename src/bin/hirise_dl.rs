use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use hirise_dl::app::{App, FetchOptions, FetchResult};
use hirise_dl::archive::HttpArchiveClient;
use hirise_dl::config::ConfigLoader;
use hirise_dl::domain::{Artifact, ObservationId, ProductId, ProductKind, SourceProductId};
use hirise_dl::error::HiriseError;
use hirise_dl::output::JsonOutput;
use hirise_dl::store::Store;

#[derive(Parser)]
#[command(name = "hirise-dl")]
#[command(about = "Resolve HiRISE product identifiers and download them from the PDS archive")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    /// Local data root (defaults to ~/data/hirise or the config's data_root)
    #[arg(long, global = true)]
    root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fetch a raw source product, or everything in hirise-dl.json")]
    Fetch(FetchArgs),
    #[command(about = "Fetch the RDR label for an observation")]
    Label(LabelArgs),
    #[command(about = "Fetch a browse/thumbnail/quicklook artifact for a product")]
    Artifact(ArtifactArgs),
    #[command(about = "Resolve an identifier to its archive URL without downloading")]
    Url(UrlArgs),
    #[command(about = "List downloaded files recorded in the local store")]
    List,
}

#[derive(Args)]
struct FetchArgs {
    /// Source product id, e.g. PSP_003092_0985_RED4_0
    id: Option<String>,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    overwrite: bool,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct LabelArgs {
    /// Observation id, e.g. ESP_011491_0985
    observation: String,

    #[arg(long, value_enum, default_value_t = ProductKind::Red)]
    kind: ProductKind,

    #[arg(long)]
    overwrite: bool,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct ArtifactArgs {
    /// Product id, e.g. ESP_011491_0985_COLOR
    product: String,

    #[arg(long, value_enum)]
    artifact: Artifact,

    #[arg(long)]
    overwrite: bool,

    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct UrlArgs {
    /// Source product id, product id, or observation id
    id: String,

    #[arg(long, value_enum, default_value_t = Artifact::Image)]
    artifact: Artifact,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<HiriseError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &HiriseError) -> u8 {
    match error {
        HiriseError::MissingConfig | HiriseError::ProductNotFound(_) => 2,
        HiriseError::ArchiveHttp(_) | HiriseError::ArchiveStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch(args) => run_fetch(args, cli.root, cli.json),
        Commands::Label(args) => run_label(args, cli.root, cli.json),
        Commands::Artifact(args) => run_artifact(args, cli.root, cli.json),
        Commands::Url(args) => run_url(args),
        Commands::List => run_list(cli.root, cli.json),
    }
}

fn resolve_store(
    cli_root: Option<String>,
    config_root: Option<Utf8PathBuf>,
) -> miette::Result<Store> {
    if let Some(root) = cli_root {
        return Ok(Store::with_root(Utf8PathBuf::from(root)));
    }
    if let Some(root) = config_root {
        return Ok(Store::with_root(root));
    }
    Store::new().into_diagnostic()
}

fn run_fetch(args: FetchArgs, root: Option<String>, json: bool) -> miette::Result<()> {
    let options = FetchOptions {
        overwrite: args.overwrite,
        dry_run: args.dry_run,
    };

    let result = if let Some(id) = args.id {
        let source: SourceProductId = id.parse().into_diagnostic()?;
        let store = resolve_store(root, None)?;
        let app = App::new(store, HttpArchiveClient::new().into_diagnostic()?);
        let item = app
            .download_source(&source, options, &JsonOutput)
            .into_diagnostic()?;
        FetchResult { items: vec![item] }
    } else {
        let config = ConfigLoader::resolve(args.config.as_deref()).into_diagnostic()?;
        let store = resolve_store(root, config.data_root.clone())?;
        let app = App::new(store, HttpArchiveClient::new().into_diagnostic()?);
        app.fetch(&config, options, &JsonOutput).into_diagnostic()?
    };

    if json {
        JsonOutput::print_fetch(&result).into_diagnostic()?;
    } else {
        print_fetch_summary(&result);
    }
    Ok(())
}

fn run_label(args: LabelArgs, root: Option<String>, json: bool) -> miette::Result<()> {
    let observation: ObservationId = args.observation.parse().into_diagnostic()?;
    let product = observation.with_kind(args.kind);
    let store = resolve_store(root, None)?;
    let app = App::new(store, HttpArchiveClient::new().into_diagnostic()?);
    let options = FetchOptions {
        overwrite: args.overwrite,
        dry_run: args.dry_run,
    };
    let item = app
        .download_label(&product, options, &JsonOutput)
        .into_diagnostic()?;
    let result = FetchResult { items: vec![item] };
    if json {
        JsonOutput::print_fetch(&result).into_diagnostic()?;
    } else {
        print_fetch_summary(&result);
    }
    Ok(())
}

fn run_artifact(args: ArtifactArgs, root: Option<String>, json: bool) -> miette::Result<()> {
    let product: ProductId = args.product.parse().into_diagnostic()?;
    let store = resolve_store(root, None)?;
    let app = App::new(store, HttpArchiveClient::new().into_diagnostic()?);
    let options = FetchOptions {
        overwrite: args.overwrite,
        dry_run: args.dry_run,
    };
    let item = app
        .download_artifact(&product, args.artifact, options, &JsonOutput)
        .into_diagnostic()?;
    let result = FetchResult { items: vec![item] };
    if json {
        JsonOutput::print_fetch(&result).into_diagnostic()?;
    } else {
        print_fetch_summary(&result);
    }
    Ok(())
}

fn run_url(args: UrlArgs) -> miette::Result<()> {
    if let Ok(source) = args.id.parse::<SourceProductId>() {
        println!("{}", source.url().into_diagnostic()?);
        return Ok(());
    }
    if let Ok(product) = args.id.parse::<ProductId>() {
        println!("{}", product.artifact_url(args.artifact).into_diagnostic()?);
        return Ok(());
    }
    let observation: ObservationId = args.id.parse().into_diagnostic()?;
    let product = observation.with_kind(ProductKind::Red);
    println!("{}", product.artifact_url(args.artifact).into_diagnostic()?);
    Ok(())
}

fn run_list(root: Option<String>, json: bool) -> miette::Result<()> {
    let store = resolve_store(root, None)?;
    let app = App::new(store, NopArchive);
    let result = app.list(&JsonOutput).into_diagnostic()?;
    if json {
        JsonOutput::print_list(&result).into_diagnostic()?;
    } else {
        for entry in &result.downloads {
            let artifact = entry.artifact.as_deref().unwrap_or("-");
            println!("{}  {}  {}", entry.id, artifact, entry.resolved_path);
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
struct NopArchive;

impl hirise_dl::archive::ArchiveClient for NopArchive {
    fn fetch(&self, _url: &str, _destination: &std::path::Path) -> Result<(), HiriseError> {
        Err(HiriseError::ArchiveHttp(
            "archive client not configured".to_string(),
        ))
    }
}

fn print_fetch_summary(result: &FetchResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    for item in &result.items {
        let color = match item.action.as_str() {
            "download" => cyan,
            "exists" => green,
            "error" => red,
            _ => yellow,
        };
        println!(
            "{color}{} {} ({}){reset}",
            item.id, item.artifact, item.action
        );
        println!("{color}   -> {}{reset}", item.local_path);
        if let Some(error) = &item.error {
            println!("{red}   {error}{reset}");
        }
    }

    let errors = result
        .items
        .iter()
        .filter(|item| item.error.is_some())
        .count();
    println!("{green}done: {} item(s){reset}", result.items.len());
    if errors > 0 {
        println!("{yellow}errors: {errors}{reset}");
    }
}
