//! Wallet-bound view of one network.
//!
//! [`ChainClient`] is what the swap client, the pipeline and the operator CLI
//! talk to: reads go to [`BlockchainClient`], every mutation goes through
//! [`TxBuilder::execute`] under the wallet's submission lock.

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::blockchain::approval::{ApprovalGate, ApprovalOutcome, Erc20Approvals};
use crate::blockchain::client::BlockchainClient;
use crate::blockchain::erc20;
use crate::blockchain::transaction::{TxBuilder, TxCall};
use crate::blockchain::types::{BlockchainResult, Confirmation, NetworkDescriptor, TransactionConfig};
use crate::blockchain::wallet::Wallet;

#[derive(Debug, Clone)]
pub struct ChainClient {
    client: BlockchainClient,
    wallet: Wallet,
    tx: TxBuilder,
    approvals: ApprovalGate,
}

impl ChainClient {
    pub fn new(client: BlockchainClient, wallet: Wallet, config: &TransactionConfig) -> Self {
        Self {
            tx: TxBuilder::new(client.clone(), wallet.clone(), config),
            approvals: ApprovalGate::from_config(config),
            client,
            wallet,
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn network(&self) -> &NetworkDescriptor {
        self.client.network()
    }

    /// Native balance of the wallet.
    pub async fn native_balance(&self) -> BlockchainResult<U256> {
        self.client.get_balance(self.address()).await
    }

    /// ERC-20 balance of the wallet.
    pub async fn token_balance(&self, token: Address) -> BlockchainResult<U256> {
        self.client.token_balance(token, self.address()).await
    }

    pub async fn token_decimals(&self, token: Address) -> BlockchainResult<u8> {
        self.client.token_decimals(token).await
    }

    /// Submit a call and wait for a successful receipt.
    pub async fn execute(&self, call: TxCall) -> BlockchainResult<Confirmation> {
        self.tx.execute(call).await
    }

    /// Send `amount` of the native asset to `to`.
    pub async fn send_native(&self, to: Address, amount: U256) -> BlockchainResult<Confirmation> {
        self.execute(TxCall::transfer(to, amount)).await
    }

    /// Submit arbitrary calldata to a contract.
    pub async fn call_contract(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> BlockchainResult<Confirmation> {
        self.execute(TxCall::contract(to, data, value)).await
    }

    /// Approve `spender` for `required` units of `token` when needed.
    pub async fn ensure_allowance(
        &self,
        token: Address,
        spender: Address,
        required: U256,
    ) -> BlockchainResult<ApprovalOutcome> {
        self.approvals.ensure(self, token, spender, required).await
    }
}

#[async_trait]
impl Erc20Approvals for ChainClient {
    async fn allowance(&self, token: Address, spender: Address) -> BlockchainResult<U256> {
        self.client
            .token_allowance(token, self.address(), spender)
            .await
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> BlockchainResult<Confirmation> {
        self.call_contract(token, erc20::approve_calldata(spender, amount), U256::ZERO)
            .await
    }
}
