//! Full pipeline run against mocks of the exchange, the aggregator and a node.

use alloy::consensus::Transaction;
use alloy::primitives::{address, Address, U256};
use cex_swap_pipeline::blockchain::{BlockchainClient, ChainClient, Wallet};
use cex_swap_pipeline::config::ApiCredentials;
use cex_swap_pipeline::exchange::{ExchangeClient, ExchangeError};
use cex_swap_pipeline::swap::SwapClient;
use cex_swap_pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutcome};
use serde_json::json;
use std::net::SocketAddr;

mod common;

use common::{NodeState, RecordedRequest, RequestLog};

const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const WALLET: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const USDC: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
const ROUTER: Address = address!("a669e7A0d4b3e4Fa48af2dE86BD4CD7126Be4e13");
const DEPOSIT: Address = address!("1111111111111111111111111111111111111111");

/// 0.001 ETH, the default gas reserve.
const RESERVE_WEI: u64 = 1_000_000_000_000_000;

fn ok(data: serde_json::Value) -> (u16, String) {
    let body = json!({
        "code": "00000",
        "msg": "success",
        "requestTime": 1_700_000_000_000u64,
        "data": data,
    });
    (200, body.to_string())
}

/// Exchange mock with `available` USDC on the spot account.
async fn start_exchange(available: &'static str) -> (SocketAddr, RequestLog) {
    common::start_programmable_backend(move |request: RecordedRequest| async move {
        let path = request.path.split('?').next().unwrap_or_default().to_string();
        match path.as_str() {
            "/api/v2/spot/account/assets" => ok(json!([{"coin": "USDC", "available": available}])),
            "/api/v2/spot/wallet/withdrawal" => ok(json!({"orderId": "1001", "clientOid": "oid"})),
            "/api/v2/spot/wallet/deposit-address" => ok(json!({
                "address": DEPOSIT.to_string(),
                "coin": "ETH",
                "chain": "ARBITRUMONE"
            })),
            _ => (404, "{}".to_string()),
        }
    })
    .await
}

async fn start_aggregator() -> (SocketAddr, RequestLog) {
    common::start_programmable_backend(|request: RecordedRequest| async move {
        match request.path.as_str() {
            "/sor/quote/v2" => (200, r#"{"pathId":"route-1"}"#.to_string()),
            "/sor/assemble" => (
                200,
                json!({
                    "transaction": {"to": ROUTER.to_string(), "data": "0x83bd37f9", "value": "0"},
                    "outputTokens": [{
                        "tokenAddress": "0x0000000000000000000000000000000000000000",
                        "amount": "4123456789012345"
                    }]
                })
                .to_string(),
            ),
            _ => (404, "{}".to_string()),
        }
    })
    .await
}

fn config(node: SocketAddr, exchange: SocketAddr, aggregator: SocketAddr) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.network.rpcs = vec![format!("http://{}", node)];
    config.network.rpc_timeout_secs = 2;
    config.exchange.base_url = format!("http://{}", exchange);
    config.exchange.timeout_secs = 5;
    config.aggregator.base_url = format!("http://{}/sor", aggregator);
    config.aggregator.timeout_secs = 5;
    config.transactions = common::fast_transactions();
    config.pipeline.arrival_wait_secs = 0;
    config
}

async fn pipeline(config: &PipelineConfig) -> Pipeline {
    let rpc = BlockchainClient::new(config.network.clone(), None).await.unwrap();
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, config.network.chain_id).unwrap();
    let chain = ChainClient::new(rpc, wallet, &config.transactions);
    let credentials = ApiCredentials {
        api_key: "test-key".to_string(),
        api_secret: "test-secret".to_string(),
        passphrase: "test-phrase".to_string(),
    };
    let exchange = ExchangeClient::new(&config.exchange, credentials, None).unwrap();
    let native = config.tokens.address("ETH").unwrap();
    let swap = SwapClient::new(&config.aggregator, chain.clone(), native, None).unwrap();
    Pipeline::new(config, exchange, chain, swap).unwrap()
}

fn funded_node(native_balance: u64) -> NodeState {
    NodeState {
        token_balance: U256::from(11_000_000u64),
        native_balance: U256::from(native_balance),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_run_deposits_balance_above_reserve() {
    let (node, rpc_log) = common::start_wallet_node(funded_node(4_500_000_000_000_000)).await;
    let (exchange, exchange_log) = start_exchange("25").await;
    let (aggregator, _aggregator_log) = start_aggregator().await;
    let config = config(node, exchange, aggregator);

    let outcome = pipeline(&config).await.run().await.unwrap();

    let sent = common::broadcasts(&rpc_log);
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].to(), Some(USDC));
    assert_eq!(sent[1].to(), Some(ROUTER));

    let deposit = &sent[2];
    assert_eq!(deposit.to(), Some(DEPOSIT));
    assert_eq!(deposit.value(), U256::from(3_500_000_000_000_000u64));
    assert!(deposit.input().is_empty());

    match outcome {
        PipelineOutcome::Deposited {
            withdrawal,
            swap,
            deposit: confirmation,
            amount,
        } => {
            assert_eq!(withdrawal.order_id, "1001");
            assert_eq!(swap.confirmation.tx_hash, *sent[1].tx_hash());
            assert_eq!(confirmation.tx_hash, *deposit.tx_hash());
            assert_eq!(amount, "0.003500000000000000");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let requests = exchange_log.lock().unwrap();
    let withdrawal = requests.iter().find(|r| r.method == "POST").unwrap();
    let body: serde_json::Value = serde_json::from_str(&withdrawal.body).unwrap();
    assert_eq!(body["coin"], "USDC");
    assert_eq!(body["chain"], "ARBITRUMONE");
    assert_eq!(body["size"], "11");
    assert_eq!(
        body["address"].as_str().unwrap().to_lowercase(),
        WALLET.to_string().to_lowercase()
    );
    assert_eq!(
        requests.last().unwrap().path,
        "/api/v2/spot/wallet/deposit-address?chain=ARBITRUMONE&coin=ETH"
    );
}

#[tokio::test]
async fn test_run_keeps_reserve_without_sending() {
    let (node, rpc_log) = common::start_wallet_node(funded_node(RESERVE_WEI)).await;
    let (exchange, _exchange_log) = start_exchange("25").await;
    let (aggregator, _aggregator_log) = start_aggregator().await;
    let config = config(node, exchange, aggregator);

    let outcome = pipeline(&config).await.run().await.unwrap();

    match outcome {
        PipelineOutcome::NothingToDeposit { native_balance, .. } => {
            assert_eq!(native_balance, "0.001000000000000000");
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    // Approval and swap only.
    let sent = common::broadcasts(&rpc_log);
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|tx| tx.to() != Some(DEPOSIT)));
}

#[tokio::test]
async fn test_run_stops_when_exchange_balance_is_short() {
    let (node, rpc_log) = common::start_wallet_node(funded_node(RESERVE_WEI * 5)).await;
    let (exchange, exchange_log) = start_exchange("10.99").await;
    let (aggregator, aggregator_log) = start_aggregator().await;
    let config = config(node, exchange, aggregator);

    let err = pipeline(&config).await.run().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Exchange(ExchangeError::InsufficientBalance { .. })
    ));
    assert!(exchange_log.lock().unwrap().iter().all(|r| r.method == "GET"));
    assert!(aggregator_log.lock().unwrap().is_empty());
    assert!(common::broadcasts(&rpc_log).is_empty());
}
