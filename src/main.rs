use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use facsearch::api::{AppState, create_router};
use facsearch::catalog::Catalog;
use facsearch::client::{SearchClient, SearchForm};
use facsearch::config::CONFIG;
use facsearch::render::text::{DEFAULT_WIDTH, detail_view_text, summary_list_text};
use facsearch::view::{SearchOutcome, ViewState};

#[derive(Parser)]
#[command(name = "facsearch", version, about = "Faculty research search front end")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the search page over HTTP
    Serve {
        /// Address to listen on (defaults to FACSEARCH_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run a single search and print the results
    Search(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Search API base URL (defaults to FACSEARCH_API_URL)
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    school: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    /// Extra form field, repeatable
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    fields: Vec<(String, String)>,
    /// Show the detail view of the result at this position
    #[arg(long)]
    detail: Option<usize>,
    /// Print the rendered view as JSON instead of text
    #[arg(long)]
    json: bool,
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty field name in {raw:?}"));
    }
    Ok((key.to_string(), value.to_string()))
}

impl SearchArgs {
    fn form(&self) -> SearchForm {
        let mut form = SearchForm::new();
        let named = [
            ("school", self.school.clone()),
            ("department", self.department.clone()),
            ("query", self.query.clone()),
            ("limit", self.limit.map(|l| l.to_string())),
        ];
        for (name, value) in named {
            if let Some(value) = value {
                form.set(name, &value);
            }
        }
        for (name, value) in &self.fields {
            form.set(name, value);
        }
        form
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber; logs go to stderr so search output stays clean.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(CONFIG.log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge log crate -> tracing (reqwest logs through `log`)
    tracing_log::LogTracer::init()?;

    let catalog = Catalog::load(CONFIG.catalog_path.as_deref())?;

    match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| CONFIG.bind_addr.clone());
            serve(&bind, catalog).await
        }
        Command::Search(args) => search(args).await,
    }
}

async fn serve(bind: &str, catalog: Catalog) -> Result<()> {
    let client = SearchClient::new(&CONFIG.api_url, Duration::from_secs(CONFIG.timeout_secs))?;
    let state = Arc::new(AppState::new(client, Arc::new(catalog)));
    let app = create_router(state);

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(
        "serving search page on http://{} (search API: {})",
        listener.local_addr()?,
        CONFIG.api_url
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn search(args: SearchArgs) -> Result<()> {
    let api_url = args.api_url.clone().unwrap_or_else(|| CONFIG.api_url.clone());
    let client = SearchClient::new(&api_url, Duration::from_secs(CONFIG.timeout_secs))?;
    let form = args.form();

    let mut view = ViewState::new();
    let ticket = view.begin_search();
    let result = client.search(&form).await;
    match view.finish_search(ticket, result) {
        SearchOutcome::Rendered(_) => {}
        SearchOutcome::Failed | SearchOutcome::Ignored => {
            bail!("search failed, see the log for details")
        }
    }

    let output = match args.detail {
        Some(index) => {
            let detail = view.open_detail(index)?;
            if args.json {
                serde_json::to_string_pretty(detail)?
            } else {
                detail_view_text(detail, args.width)?
            }
        }
        None => {
            let summary = view.summary().cloned().unwrap_or_default();
            if args.json {
                serde_json::to_string_pretty(&summary)?
            } else {
                summary_list_text(&summary, args.width)?
            }
        }
    };
    println!("{}", output.trim_end());
    Ok(())
}
