use clap::{Parser, Subcommand};
use serde::Serialize;

use cex_swap_pipeline::blockchain::units::from_smallest_unit;
use cex_swap_pipeline::blockchain::BlockchainClient;
use cex_swap_pipeline::config::{loader, secrets, ApiCredentials, PipelineConfig};
use cex_swap_pipeline::exchange::{ExchangeClient, HistoryQuery};
use cex_swap_pipeline::observability::logging;

#[derive(Parser)]
#[command(name = "pipeline-cli")]
#[command(about = "Read-only inspection of the exchange account and the wallet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show spot balances on the exchange
    Assets {
        #[arg(short, long)]
        coin: Option<String>,
    },
    /// Show the exchange deposit address for a coin
    DepositAddress {
        coin: String,
        /// Exchange chain alias (defaults to the configured network)
        #[arg(short, long)]
        chain: Option<String>,
    },
    /// List recent withdrawals
    Withdrawals {
        #[arg(short, long)]
        coin: Option<String>,
        /// Start of the window, Unix milliseconds
        #[arg(long)]
        start_time: Option<u64>,
        /// End of the window, Unix milliseconds
        #[arg(long)]
        end_time: Option<u64>,
        #[arg(long)]
        client_oid: Option<String>,
    },
    /// List recent deposits
    Deposits {
        #[arg(short, long)]
        coin: Option<String>,
        #[arg(long)]
        start_time: Option<u64>,
        #[arg(long)]
        end_time: Option<u64>,
    },
    /// Show native and token balances of an address on the configured network
    Wallet {
        /// Address to inspect (defaults to the PRIVATE_KEY wallet)
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = loader::load_from_env()?;
    logging::init_logging(&config.observability);
    let proxy = secrets::proxy_from_env();

    match cli.command {
        Commands::Assets { coin } => {
            let exchange = exchange_client(&config, proxy.as_deref())?;
            print_json(&exchange.account_assets(coin.as_deref()).await?)?;
        }
        Commands::DepositAddress { coin, chain } => {
            let exchange = exchange_client(&config, proxy.as_deref())?;
            let chain = chain.unwrap_or_else(|| config.network.exchange_chain.to_uppercase());
            print_json(&exchange.deposit_address(&coin, Some(&chain)).await?)?;
        }
        Commands::Withdrawals {
            coin,
            start_time,
            end_time,
            client_oid,
        } => {
            let exchange = exchange_client(&config, proxy.as_deref())?;
            let query = HistoryQuery {
                coin,
                start_time,
                end_time,
                client_oid,
            };
            print_json(&exchange.withdrawal_history(&query).await?)?;
        }
        Commands::Deposits {
            coin,
            start_time,
            end_time,
        } => {
            let exchange = exchange_client(&config, proxy.as_deref())?;
            let query = HistoryQuery {
                coin,
                start_time,
                end_time,
                client_oid: None,
            };
            print_json(&exchange.deposit_history(&query).await?)?;
        }
        Commands::Wallet { address } => {
            let address = match address {
                Some(address) => address.parse()?,
                None => {
                    let key = secrets::private_key_from_env()?;
                    cex_swap_pipeline::blockchain::Wallet::from_private_key(
                        &key,
                        config.network.chain_id,
                    )?
                    .address()
                }
            };
            let rpc = BlockchainClient::new(config.network.clone(), proxy.as_deref()).await?;

            let native = rpc.get_balance(address).await?;
            println!(
                "{} {} {}",
                address,
                from_smallest_unit(native, config.network.native_decimals)?,
                config.network.native_token
            );
            for (symbol, _) in config.tokens.0.iter() {
                if *symbol == config.network.native_token {
                    continue;
                }
                let Some(token) = config.tokens.address(symbol) else {
                    continue;
                };
                let balance = rpc.token_balance(token, address).await?;
                let decimals = rpc.token_decimals(token).await?;
                println!("{} {} {}", address, from_smallest_unit(balance, decimals)?, symbol);
            }
        }
    }

    Ok(())
}

fn exchange_client(
    config: &PipelineConfig,
    proxy: Option<&str>,
) -> Result<ExchangeClient, Box<dyn std::error::Error>> {
    let credentials = ApiCredentials::from_env()?;
    Ok(ExchangeClient::new(&config.exchange, credentials, proxy)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
