//! Command-line access to CRM listings and reference data.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use crm_console::ConsoleSettings;
use crm_console::config::loader_args;
use crm_console::domain::ports::{ReferenceDataSource, ReferenceList, RequestClient};
use crm_console::domain::{LeadSummary, RecordDirectory, StaffSummary};
use crm_console::outbound::http::HttpRequestClient;
use crm_console::outbound::rest::{RestLeadGateway, RestReferenceDataSource, RestStaffGateway};
use ortho_config::OrthoConfig;
use pagination::{Page, PageRequest, Search};
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

/// `crm-console` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "crm-console",
    about = "List CRM leads, staff and reference data from the backend",
    version
)]
struct Cli {
    /// Backend base URL. Falls back to `CRM_CONSOLE_BASE_URL` when omitted.
    #[arg(long = "base-url", value_name = "url", global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// One page of leads.
    Leads(ListArgs),
    /// One page of staff.
    Staff(ListArgs),
    /// Every province.
    Provinces,
    /// Districts of a province.
    Districts {
        /// Parent province identifier.
        #[arg(value_name = "province-id")]
        province_id: String,
    },
    /// Communes of a district.
    Communes {
        /// Parent district identifier.
        #[arg(value_name = "district-id")]
        district_id: String,
    },
    /// Villages of a commune.
    Villages {
        /// Parent commune identifier.
        #[arg(value_name = "commune-id")]
        commune_id: String,
    },
    /// Contact channel types.
    ChannelTypes,
}

/// Paging and search arguments shared by the listings.
#[derive(Debug, Clone, Args)]
struct ListArgs {
    /// Page to show, starting at one.
    #[arg(long, value_name = "n", default_value_t = 1)]
    page: u32,
    /// Column the query searches, e.g. `lead_id`.
    #[arg(long = "search-type", value_name = "column", default_value = "")]
    search_type: String,
    /// Search text.
    #[arg(long, value_name = "text", default_value = "")]
    query: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
        .map_err(|error| eyre!("install tracing subscriber: {error}"))?;

    let cli = Cli::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let settings = ConsoleSettings::load_from_iter(loader_args(
        "crm-console",
        cli.base_url.as_deref(),
    ))
    .map_err(|error| eyre!("load settings: {error}"))?;

    let client: Arc<dyn RequestClient> = Arc::new(
        HttpRequestClient::new(
            settings.base_url()?,
            settings.request_timeout(),
            settings.user_agent.clone(),
        )
        .wrap_err("build HTTP client")?,
    );

    match cli.command {
        Command::Leads(args) => {
            let directory = directory(&client);
            let page = directory
                .lead_page(&page_request(&settings, &args)?)
                .await?;
            print_leads(&page, settings.page_size());
        }
        Command::Staff(args) => {
            let directory = directory(&client);
            let page = directory
                .staff_page(&page_request(&settings, &args)?)
                .await?;
            print_staff(&page, settings.page_size());
        }
        Command::Provinces => print_reference(&client, ReferenceList::Provinces).await?,
        Command::Districts { province_id } => {
            print_reference(&client, ReferenceList::Districts { province_id }).await?;
        }
        Command::Communes { district_id } => {
            print_reference(&client, ReferenceList::Communes { district_id }).await?;
        }
        Command::Villages { commune_id } => {
            print_reference(&client, ReferenceList::Villages { commune_id }).await?;
        }
        Command::ChannelTypes => print_reference(&client, ReferenceList::ChannelTypes).await?,
    }
    Ok(())
}

fn directory(client: &Arc<dyn RequestClient>) -> RecordDirectory {
    RecordDirectory::new(
        Arc::new(RestLeadGateway::new(Arc::clone(client))),
        Arc::new(RestStaffGateway::new(Arc::clone(client))),
    )
}

fn page_request(settings: &ConsoleSettings, args: &ListArgs) -> Result<PageRequest> {
    let request = PageRequest::first(settings.page_size())?
        .with_search(Search::new(args.search_type.trim(), args.query.trim()))
        .at_page(args.page)?;
    Ok(request)
}

fn print_leads(page: &Page<LeadSummary>, page_size: u32) {
    for row in &page.rows {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            row.lead_id, row.full_name, row.phone, row.email, row.address, row.status
        );
    }
    println!(
        "total_rows={} pages={}",
        page.total_rows,
        page.page_count(page_size)
    );
}

fn print_staff(page: &Page<StaffSummary>, page_size: u32) {
    for row in &page.rows {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            row.staff_code, row.full_name, row.phone, row.position, row.address, row.status
        );
    }
    println!(
        "total_rows={} pages={}",
        page.total_rows,
        page.page_count(page_size)
    );
}

async fn print_reference(client: &Arc<dyn RequestClient>, list: ReferenceList) -> Result<()> {
    let source = RestReferenceDataSource::new(Arc::clone(client));
    for option in source.fetch(&list).await? {
        println!("{}\t{}", option.value(), option.label());
    }
    Ok(())
}
