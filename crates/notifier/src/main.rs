use anyhow::Context;
use clap::Parser;
use contract_models::config_keys;
use contract_notifications::{
    ContractReminderProcessingService, ContractStatusChangePublisher, Notifier, Services,
};
use data_api::{
    ContractsApi, ContractsDataProvider, FundingClaimsDataProvider, HttpDataApiClient,
    HttpDirectoryClient, SubcontractorDeclarationsDataProvider,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

mod transport;

/// Notifier processes contract, funding claim and subcontractor declaration
/// events into email notifications for provider organisations.
#[derive(derivative::Derivative, Parser)]
#[derivative(Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Base URL of the contracts data API.
    #[clap(long, env = "CONTRACTS_API_URL")]
    contracts_api_url: url::Url,
    /// Base URL of the funding claims data API.
    #[clap(long, env = "FUNDING_CLAIMS_API_URL")]
    funding_claims_api_url: url::Url,
    /// Base URL of the subcontractor declarations data API.
    #[clap(long, env = "SUBCONTRACTOR_DECLARATIONS_API_URL")]
    subcontractor_declarations_api_url: url::Url,
    /// Bearer token of the data and audit APIs.
    #[derivative(Debug = "ignore")]
    #[clap(long, env = "DATA_API_TOKEN", hide_env_values = true)]
    data_api_token: Option<String>,
    /// Base URL of the organisation user directory.
    #[clap(long, env = "DIRECTORY_API_URL")]
    directory_api_url: url::Url,
    #[derivative(Debug = "ignore")]
    #[clap(long, env = "DIRECTORY_API_TOKEN", hide_env_values = true)]
    directory_api_token: Option<String>,
    /// Base URL of the audit API.
    #[clap(long, env = "AUDIT_API_URL")]
    audit_api_url: url::Url,

    /// Endpoint of the shared email processor queue.
    #[clap(long, env = "NOTIFICATION_QUEUE_URL")]
    notification_queue_url: url::Url,
    /// Endpoint of the queue carrying contract status change messages.
    #[clap(long, env = "CONTRACT_EVENTS_QUEUE_URL")]
    contract_events_queue_url: url::Url,
    /// Endpoint of the queue carrying contract reminder messages.
    #[clap(long, env = "CONTRACT_REMINDERS_QUEUE_URL")]
    contract_reminders_queue_url: url::Url,
    #[derivative(Debug = "ignore")]
    #[clap(long, env = "QUEUE_TOKEN", hide_env_values = true)]
    queue_token: Option<String>,

    /// Days after which a contract awaiting signature is due another reminder.
    #[clap(long, env = "REMINDER_INTERVAL_DAYS", default_value = "14")]
    reminder_interval_days: u32,
    /// Number of overdue contracts to fetch per page.
    #[clap(long, env = "REMINDER_PAGE_SIZE", default_value = "50")]
    reminder_page_size: u32,

    /// Mailbox which receives contract queries.
    #[clap(long, env = "SERVICE_NOW_EMAIL_ADDRESS")]
    service_now_email_address: Option<String>,
    /// Mailbox which receives contract feed-read exceptions.
    #[clap(long, env = "CDS_USER_EXCEPTION_EMAIL")]
    cds_user_exception_email: Option<String>,

    /// Emit logs as JSON.
    #[clap(long, env = "LOG_JSON")]
    log_json: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Process tagged messages, read as one `{"messageType", "body"}` JSON
    /// envelope per line.
    Process {
        /// File of envelopes to process. Envelopes are read from stdin if absent.
        #[clap(long)]
        input: Option<std::path::PathBuf>,
        /// Continue with remaining envelopes after one fails.
        #[clap(long)]
        keep_going: bool,
    },
    /// Queue reminders for every contract which is overdue one.
    Remind,
    /// Forward a contract's current status to the contract events queue.
    RouteContract {
        #[clap(long)]
        contract_id: i32,
    },
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    message_type: String,
    body: Box<serde_json::value::RawValue>,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    // Use reasonable defaults for printing structured logs to stderr.
    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    let installed = if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.expect("setting tracing default failed");

    tracing::info!(?args, "started!");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let task = runtime.spawn(async move { async_main(args).await });
    let result = runtime.block_on(task);

    tracing::info!(?result, "main function completed, shutting down runtime");
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));
    result?
}

async fn async_main(args: Args) -> anyhow::Result<()> {
    let http_client = reqwest::Client::new();

    let data_client = |base_url: &url::Url| {
        Arc::new(HttpDataApiClient::new(
            base_url.clone(),
            http_client.clone(),
            args.data_api_token.clone(),
        ))
    };
    let contracts: Arc<dyn ContractsApi> = Arc::new(ContractsDataProvider::new(
        data_client(&args.contracts_api_url),
        args.reminder_interval_days,
        args.reminder_page_size,
    ));
    let audit = Arc::new(
        transport::HttpAuditSink::new(
            &args.audit_api_url,
            http_client.clone(),
            args.data_api_token.clone(),
        )
        .context("building audit API URL")?,
    );
    let queue = |url: &url::Url| {
        Arc::new(transport::HttpQueue::new(
            url.clone(),
            http_client.clone(),
            args.queue_token.clone(),
        ))
    };

    match &args.command {
        Command::Process { input, keep_going } => {
            let mut config = BTreeMap::new();
            for (key, value) in [
                (
                    config_keys::SERVICE_NOW_EMAIL_ADDRESS,
                    &args.service_now_email_address,
                ),
                (
                    config_keys::CDS_USER_EXCEPTION_EMAIL,
                    &args.cds_user_exception_email,
                ),
            ] {
                if let Some(value) = value {
                    config.insert(key.to_string(), value.clone());
                }
            }

            let services = Services {
                contracts,
                funding_claims: Arc::new(FundingClaimsDataProvider::new(data_client(
                    &args.funding_claims_api_url,
                ))),
                subcontractor_declarations: Arc::new(SubcontractorDeclarationsDataProvider::new(
                    data_client(&args.subcontractor_declarations_api_url),
                )),
                config: Arc::new(config),
                notifier: Notifier::new(
                    Arc::new(HttpDirectoryClient::new(
                        args.directory_api_url.clone(),
                        http_client.clone(),
                        args.directory_api_token.clone(),
                    )),
                    queue(&args.notification_queue_url),
                    audit,
                ),
            };
            process(&services, input.as_deref(), *keep_going).await
        }
        Command::Remind => {
            let service = ContractReminderProcessingService::new(
                contracts,
                queue(&args.contract_reminders_queue_url),
                audit,
            );
            let issued = service.issue_contract_reminders().await?;

            tracing::info!(issued, "issued contract reminders");
            Ok(())
        }
        Command::RouteContract { contract_id } => {
            let contract = contracts
                .get_contract(*contract_id)
                .await
                .with_context(|| format!("fetching contract {contract_id}"))?;

            let publisher =
                ContractStatusChangePublisher::new(queue(&args.contract_events_queue_url), audit);
            let change = publisher.forward_status_change(&contract).await?;

            tracing::info!(contract_id, ?change, "routed contract status");
            Ok(())
        }
    }
}

async fn process(
    services: &Services,
    input: Option<&std::path::Path>,
    keep_going: bool,
) -> anyhow::Result<()> {
    let dispatcher = contract_notifications::dispatcher(services);

    let reader: Box<dyn tokio::io::AsyncBufRead + Unpin + Send> = match input {
        Some(path) => Box::new(tokio::io::BufReader::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(tokio::io::BufReader::new(tokio::io::stdin())),
    };
    let mut lines = reader.lines();

    let (mut line_number, mut processed, mut failed) = (0, 0, 0);
    while let Some(line) = lines.next_line().await.context("reading envelopes")? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let result = async {
            let Envelope { message_type, body } = serde_json::from_str(&line)
                .with_context(|| format!("parsing envelope on line {line_number}"))?;

            dispatcher
                .dispatch(&message_type, body.get().as_bytes())
                .await
                .with_context(|| format!("processing {message_type} on line {line_number}"))
        }
        .await;

        match result {
            Ok(outcome) => {
                tracing::info!(line_number, ?outcome, "processed message");
                processed += 1;
            }
            Err(err) if keep_going => {
                tracing::error!(line_number, error = ?err, "failed to process message");
                failed += 1;
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(processed, failed, "finished processing messages");

    if failed != 0 {
        anyhow::bail!("{failed} of {} messages failed to process", processed + failed);
    }
    Ok(())
}
