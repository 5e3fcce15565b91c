use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Response};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "helpdesk-cli")]
#[command(about = "Helpdesk account directory CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    /// Acting account
    #[arg(long, env = "HELPDESK_ACCOUNT_ID", default_value = "0")]
    account_id: u64,

    /// Tenant of the acting account
    #[arg(long, env = "HELPDESK_COMPANY_ID", default_value = "0")]
    company_id: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List accounts
    List(ListArgs),

    /// Index accounts from a JSON array file
    Index {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove an account from the index
    Delete {
        #[arg(value_name = "ACCOUNT_ID")]
        id: u64,
    },

    /// Check server health
    Health,
}

#[derive(Args)]
struct ListArgs {
    #[arg(short, long, default_value = "*")]
    q: String,

    #[arg(short, long, default_value = "1")]
    page: u32,

    #[arg(short = 's', long)]
    per_page: Option<u32>,

    #[arg(long)]
    admin: Option<bool>,

    #[arg(long)]
    chat: Option<bool>,

    #[arg(long)]
    on_duty: Option<bool>,

    #[arg(long)]
    report: Option<bool>,

    #[arg(long)]
    general_team: Option<bool>,

    /// Comma separated account ids to include
    #[arg(long)]
    account_ids: Option<String>,

    /// Comma separated account ids to exclude
    #[arg(long)]
    non_account_ids: Option<String>,

    /// Comma separated team ids
    #[arg(long)]
    team_ids: Option<String>,

    /// Comma separated account ids ranked first
    #[arg(short, long)]
    boost: Option<String>,

    #[arg(long)]
    sort: Option<String>,

    #[arg(long)]
    order: Option<String>,
}

impl ListArgs {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("q", self.q.clone()), ("page", self.page.to_string())];

        let optional = [
            ("per_page", self.per_page.map(|v| v.to_string())),
            ("admin", self.admin.map(|v| v.to_string())),
            ("chat", self.chat.map(|v| v.to_string())),
            ("on_duty", self.on_duty.map(|v| v.to_string())),
            ("report", self.report.map(|v| v.to_string())),
            ("general_team", self.general_team.map(|v| v.to_string())),
            ("account_ids", self.account_ids.clone()),
            ("non_account_ids", self.non_account_ids.clone()),
            ("team_ids", self.team_ids.clone()),
            ("accounts_boosted", self.boost.clone()),
            ("sort", self.sort.clone()),
            ("order", self.order.clone()),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        );

        pairs
    }
}

impl Cli {
    fn with_actor(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Account-Id", self.account_id.to_string())
            .header("X-Company-Id", self.company_id.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match &cli.command {
        Commands::List(args) => {
            let request = client
                .get(format!("{}/api/human_resource/accounts", cli.endpoint))
                .query(&args.query_pairs());

            print_json(cli.with_actor(request).send().await?).await?;
        }

        Commands::Index { file } => {
            let contents = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let accounts: serde_json::Value =
                serde_json::from_str(&contents).context("Accounts file is not valid JSON")?;
            if !accounts.is_array() {
                bail!("Accounts file must contain a JSON array");
            }

            let request = client
                .post(format!("{}/api/human_resource/accounts/index", cli.endpoint))
                .json(&accounts);

            print_json(cli.with_actor(request).send().await?).await?;
        }

        Commands::Delete { id } => {
            let request =
                client.delete(format!("{}/api/human_resource/accounts/{}", cli.endpoint, id));
            let response = cli.with_actor(request).send().await?;

            if response.status().is_success() {
                println!("Account {} removed from index", id);
            } else {
                print_json(response).await?;
            }
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            print_json(response).await?;
        }
    }

    Ok(())
}

async fn print_json(response: Response) -> Result<()> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .with_context(|| format!("Unexpected response body (status {})", status))?;

    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("Request failed with status {}", status);
    }
    Ok(())
}
