mod errors;

use std::{path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};
use client::{ClientConfig, ClientConfigBuilder, WalletClient, WithdrawOutcome, logging::init_logging};
use types::{Address, U256, amount::format_eth_amount, ui::UiState};

use crate::errors::CliError;

#[derive(Parser)]
#[command(name = "fundme")]
#[command(about = "Fund a FundMe contract and withdraw from it through a wallet provider.")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file, or a directory holding config.yaml
    #[arg(short, long, global = true)]
    config: Option<String>,
    /// Directory for the rolling log file
    #[arg(short, long, global = true)]
    log_file: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file to the path set by --config
    Setup {
        #[arg(short, long)]
        rpc_url: Option<String>,
        #[arg(short = 'a', long)]
        contract_address: Option<String>,
        #[arg(short = 'n', long)]
        confirmations: Option<u64>,
        #[arg(short, long)]
        timeout_secs: Option<u64>,
    },
    /// Ask the wallet for account access
    Connect,
    /// Send ETH to the contract
    Fund { amount: String },
    /// Withdraw everything once the time lock has ended
    Withdraw,
    CheaperWithdraw,
    /// Show the contract balance
    Balance,
    /// Show how long until withdrawing is allowed
    TimeRemaining,
    /// Show how much an address (default: the connected account) has funded
    AmountFunded { address: Option<String> },
    Funder { index: u64 },
    Owner,
    Version,
    PriceFeed,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    if let Commands::Setup {
        rpc_url,
        contract_address,
        confirmations,
        timeout_secs,
    } = cli.command
    {
        let path = setup_config(
            cli.config,
            rpc_url,
            contract_address,
            confirmations,
            timeout_secs,
        )?;
        println!("Config has been saved to {}", path.display());
        return Ok(());
    }

    let mut config = ClientConfig::load(cli.config)?;
    if let Some(log_file) = cli.log_file {
        config.log_file_path = Some(PathBuf::from(log_file));
    }
    init_logging(config.log_file_path.as_deref())?;

    let mut client = WalletClient::from_config(&config)?;
    let result = run_until_interrupted(run_session(&mut client, cli.command), interrupted()).await;
    print_ui(client.ui());

    result
}

async fn run_session(client: &mut WalletClient, command: Commands) -> Result<(), CliError> {
    let result = run_command(client, command).await;
    if let Ok(output) = &result {
        println!("{output}");
    }
    if client.ui().reload_requested() {
        client.reload().await?;
    }
    result.map(|_| ())
}

// Dropping the session abandons whatever remote call or confirmation wait it
// was parked on.
async fn run_until_interrupted(
    session: impl Future<Output = Result<(), CliError>>,
    interrupt: impl Future<Output = ()>,
) -> Result<(), CliError> {
    tokio::select! {
        result = session => result,
        () = interrupt => Err(CliError::Interrupted),
    }
}

async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn run_command(client: &mut WalletClient, command: Commands) -> Result<String, CliError> {
    let output = match command {
        Commands::Setup { .. } => String::new(),
        Commands::Connect => {
            let accounts = client.connect().await?;
            accounts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        }
        Commands::Fund { amount } => {
            let confirmation = client.fund(&amount).await?;
            format!(
                "{} confirmed in block {} (gas cost {} ETH)",
                confirmation.tx_hash,
                confirmation.block_number,
                format_eth_amount(confirmation.gas_cost())
            )
        }
        Commands::Withdraw => describe_withdraw(client.withdraw().await?),
        Commands::CheaperWithdraw => describe_withdraw(client.cheaper_withdraw().await?),
        Commands::Balance => format!("{} ETH", format_eth_amount(client.get_balance().await?)),
        Commands::TimeRemaining => format!("{}s", client.get_estimated_time().await?),
        Commands::AmountFunded { address } => {
            let address = address.as_deref().map(parse_address).transpose()?;
            format!("{} ETH", format_eth_amount(client.amount_funded(address).await?))
        }
        Commands::Funder { index } => client.funder(U256::from(index)).await?.to_string(),
        Commands::Owner => client.owner().await?.to_string(),
        Commands::Version => client.version().await?.to_string(),
        Commands::PriceFeed => client.price_feed().await?.to_string(),
    };
    Ok(output)
}

fn describe_withdraw(outcome: WithdrawOutcome) -> String {
    match outcome {
        WithdrawOutcome::Completed(confirmation) => format!(
            "{} confirmed in block {}",
            confirmation.tx_hash, confirmation.block_number
        ),
        WithdrawOutcome::NothingFunded => "Nothing to withdraw".to_string(),
        WithdrawOutcome::Locked { remaining } => {
            format!("Withdrawal locked for another {remaining}s")
        }
    }
}

fn parse_address(raw: &str) -> Result<Address, CliError> {
    Address::from_str(raw.trim())
        .map_err(|e| CliError::InvalidArgument(format!("{raw} is not an address: {e}")))
}

fn print_ui(ui: &UiState) {
    for (control, label) in ui.changed_labels() {
        println!("[{control}] {label}");
    }
    if !ui.withdraw_enabled() {
        println!("[Withdraw] disabled until the time lock ends");
    }
    if let Some(status) = ui.status() {
        println!("{status}");
    }
}

fn setup_config(
    config_path: Option<String>,
    rpc_url: Option<String>,
    contract_address: Option<String>,
    confirmations: Option<u64>,
    timeout_secs: Option<u64>,
) -> Result<PathBuf, CliError> {
    let path = ClientConfig::get_config_file_path(config_path)?;

    let mut builder = ClientConfigBuilder::new().config_file_path(path.clone());
    if let Some(rpc_url) = rpc_url {
        builder = builder.rpc_url(rpc_url);
    }
    if let Some(address) = contract_address {
        builder = builder.contract_address(parse_address(&address)?.to_string());
    }
    if let Some(confirmations) = confirmations {
        if confirmations == 0 {
            return Err(CliError::InvalidArgument(
                "confirmations must be at least 1".to_string(),
            ));
        }
        builder = builder.required_confirmations(confirmations);
    }
    if let Some(secs) = timeout_secs {
        builder = builder.confirmation_timeout_secs(secs);
    }

    let config = builder.build();
    config.save_to_file()?;
    Ok(path)
}
