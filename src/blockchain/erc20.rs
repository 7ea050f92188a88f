//! ERC-20 token reads and approval calldata.
//!
//! Reads go through [`BlockchainClient`]'s endpoint failover. Decimals are
//! queried on every call; nothing is cached.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

sol! {
    #[sol(rpc)]
    contract IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

impl BlockchainClient {
    /// Decimals of an ERC-20 token.
    pub async fn token_decimals(&self, token: Address) -> BlockchainResult<u8> {
        self.read("read token decimals", |p| {
            let contract = IERC20::new(token, p.clone());
            async move { contract.decimals().call().await }
        })
        .await
        .map_err(|e| contract_error(token, e))
    }

    /// ERC-20 balance of `owner`, in smallest units.
    pub async fn token_balance(&self, token: Address, owner: Address) -> BlockchainResult<U256> {
        self.read("read token balance", |p| {
            let contract = IERC20::new(token, p.clone());
            async move { contract.balanceOf(owner).call().await }
        })
        .await
        .map_err(|e| contract_error(token, e))
    }

    /// Amount `spender` may move on behalf of `owner`.
    pub async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> BlockchainResult<U256> {
        self.read("read token allowance", |p| {
            let contract = IERC20::new(token, p.clone());
            async move { contract.allowance(owner, spender).call().await }
        })
        .await
        .map_err(|e| contract_error(token, e))
    }
}

/// ABI-encoded `approve(spender, amount)`.
pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

fn contract_error(token: Address, e: BlockchainError) -> BlockchainError {
    BlockchainError::Contract(format!("{} ({})", e, token))
}
