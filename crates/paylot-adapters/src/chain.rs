//! EVM chain client.
//!
//! Wraps an `ethers` signer middleware around the fixed Arbitrum Sepolia
//! deployment and exposes synchronous methods; the async provider runs on an
//! owned current-thread runtime so the rest of the system stays blocking.
//! A fresh client is constructed per command or per HTTP request and dropped
//! afterwards; nothing is shared across invocations.

use ethers::abi::Detokenize;
use ethers::contract::{abigen, ContractCall};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Bytes, TransactionReceipt, H256, U256};
use paylot_core::config::{validate_admin_key, ChainConfig};
use paylot_core::egress::validate_outbound_url_with_allowlist;
use paylot_core::{DrawChain, PaylotError, Result};
use std::sync::Arc;
use tracing::debug;

// Published surfaces of the fixed deployment. The lottery and entropy
// contracts are opaque remote services; only these signatures are consumed.
abigen!(
    PaymentLottery,
    r#"[
        function buy(address sender, address receiver, uint256 amount)
        function addMerchant(address merchant)
        function deposit(uint256 amount)
        function requestRandomNumber() payable
        function drawWinners()
        function updatePriceAndDistribute(bytes[] priceUpdate) payable
        event Deposited(address indexed sender, uint256 amount)
        event Bought(address indexed sender, address indexed receiver, uint256 amount)
        event Distributed(address[] winners, uint256[] amounts)
    ]"#;

    EntropyProvider,
    r#"[
        function getFeeV2() view returns (uint256)
    ]"#;

    SettlementToken,
    r#"[
        function approve(address spender, uint256 amount) returns (bool)
        function balanceOf(address account) view returns (uint256)
        function transfer(address to, uint256 amount) returns (bool)
        function allowance(address owner, address spender) view returns (uint256)
    ]"#;
);

/// RPC hosts that skip DNS resolution during URL validation.
const ALLOWED_RPC_HOSTS: &[&str] = &["sepolia-rollup.arbitrum.io"];

type AdminClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signing chain client over the fixed deployment.
#[derive(Debug)]
pub struct EvmChainClient {
    rt: tokio::runtime::Runtime,
    signer_address: Address,
    lottery: PaymentLottery<AdminClient>,
    token: SettlementToken<AdminClient>,
    entropy: EntropyProvider<AdminClient>,
}

impl EvmChainClient {
    /// Build a signing client from the chain configuration.
    ///
    /// Preconditions:
    /// - `config.admin_key_hex` is present; its shape is checked here, before
    ///   any network call.
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let key = config.admin_key_hex.as_deref().ok_or_else(|| {
            PaylotError::ConfigError(
                "admin private key not configured (set ADMIN_PRIVATE_KEY)".into(),
            )
        })?;
        validate_admin_key(key)?;

        validate_outbound_url_with_allowlist(&config.rpc_url, ALLOWED_RPC_HOSTS)?;

        let wallet: LocalWallet = key
            .parse()
            .map_err(|e| PaylotError::ConfigError(format!("invalid admin private key: {e}")))?;
        let wallet = wallet.with_chain_id(config.chain_id);
        let signer_address = wallet.address();

        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| PaylotError::ConfigError(format!("invalid rpc_url: {e}")))?;
        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        let lottery = PaymentLottery::new(
            parse_address("lottery", &config.lottery_address)?,
            client.clone(),
        );
        let token = SettlementToken::new(
            parse_address("token", &config.token_address)?,
            client.clone(),
        );
        let entropy = EntropyProvider::new(
            parse_address("entropy", &config.entropy_address)?,
            client,
        );

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PaylotError::ChainError(format!("failed to start async runtime: {e}")))?;

        Ok(Self {
            rt,
            signer_address,
            lottery,
            token,
            entropy,
        })
    }

    /// Address derived from the admin signing credential.
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    /// Submit a transaction without waiting for its receipt.
    fn submit<D: Detokenize>(
        &self,
        call: ContractCall<AdminClient, D>,
        label: &str,
    ) -> Result<H256> {
        self.rt.block_on(async move {
            let pending = call.send().await.map_err(|e| {
                PaylotError::ChainError(format!("{label} submission failed: {e}"))
            })?;
            let tx_hash = *pending;
            debug!(step = label, tx = ?tx_hash, "transaction submitted");
            Ok(tx_hash)
        })
    }

    /// Submit a transaction and block until its receipt is observed.
    fn send_and_confirm<D: Detokenize>(
        &self,
        call: ContractCall<AdminClient, D>,
        label: &str,
    ) -> Result<H256> {
        self.rt.block_on(async move {
            let pending = call.send().await.map_err(|e| {
                PaylotError::ChainError(format!("{label} submission failed: {e}"))
            })?;
            let tx_hash = *pending;
            debug!(step = label, tx = ?tx_hash, "transaction submitted, awaiting receipt");
            let receipt = pending.await.map_err(|e| {
                PaylotError::ChainError(format!("{label} confirmation failed: {e}"))
            })?;
            confirm_receipt(label, tx_hash, receipt)
        })
    }

    // Payment surface.

    /// Approve the lottery contract to spend `amount` of the settlement
    /// token. Submit-only: the caller decides how long to wait before the
    /// spending call.
    pub fn approve(&self, amount: U256) -> Result<H256> {
        self.submit(self.token.approve(self.lottery.address(), amount), "approve")
    }

    pub fn buy(&self, sender: Address, receiver: Address, amount: U256) -> Result<H256> {
        self.send_and_confirm(self.lottery.buy(sender, receiver, amount), "buy")
    }

    pub fn add_merchant(&self, merchant: Address) -> Result<H256> {
        self.send_and_confirm(self.lottery.add_merchant(merchant), "addMerchant")
    }

    pub fn deposit(&self, amount: U256) -> Result<H256> {
        self.send_and_confirm(self.lottery.deposit(amount), "deposit")
    }

    pub fn transfer(&self, to: Address, amount: U256) -> Result<H256> {
        self.send_and_confirm(self.token.transfer(to, amount), "transfer")
    }

    pub fn balance_of(&self, account: Address) -> Result<U256> {
        self.rt
            .block_on(async { self.token.balance_of(account).call().await })
            .map_err(|e| PaylotError::ChainError(format!("balanceOf read failed: {e}")))
    }

    pub fn allowance(&self, owner: Address) -> Result<U256> {
        self.rt
            .block_on(async {
                self.token
                    .allowance(owner, self.lottery.address())
                    .call()
                    .await
            })
            .map_err(|e| PaylotError::ChainError(format!("allowance read failed: {e}")))
    }
}

impl DrawChain for EvmChainClient {
    fn entropy_fee(&self) -> Result<U256> {
        self.rt
            .block_on(async { self.entropy.get_fee_v2().call().await })
            .map_err(|e| PaylotError::ChainError(format!("entropy fee read failed: {e}")))
    }

    fn request_random_number(&self, fee: U256) -> Result<H256> {
        self.send_and_confirm(
            self.lottery.request_random_number().value(fee),
            "requestRandomNumber",
        )
    }

    fn draw_winners(&self) -> Result<H256> {
        self.send_and_confirm(self.lottery.draw_winners(), "drawWinners")
    }

    fn update_price_and_distribute(&self, payloads: Vec<Bytes>, value: U256) -> Result<H256> {
        self.send_and_confirm(
            self.lottery.update_price_and_distribute(payloads).value(value),
            "updatePriceAndDistribute",
        )
    }
}

fn parse_address(label: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|e| PaylotError::ConfigError(format!("invalid {label} address '{value}': {e}")))
}

fn confirm_receipt(
    label: &str,
    tx_hash: H256,
    receipt: Option<TransactionReceipt>,
) -> Result<H256> {
    let receipt = receipt.ok_or_else(|| {
        PaylotError::ChainError(format!(
            "{label} transaction {tx_hash:#x} was dropped before inclusion"
        ))
    })?;
    if receipt.status != Some(1.into()) {
        return Err(PaylotError::ChainError(format!(
            "{label} transaction {tx_hash:#x} reverted"
        )));
    }
    Ok(tx_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::id;

    const TEST_KEY: &str =
        "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn test_config() -> ChainConfig {
        ChainConfig {
            rpc_url: "http://localhost:8545".into(),
            admin_key_hex: Some(TEST_KEY.into()),
            ..ChainConfig::default()
        }
    }

    fn selector_of<D: Detokenize>(call: &ContractCall<AdminClient, D>, signature: &str) -> bool {
        let data = call.calldata().expect("calldata");
        data[..4] == id(signature)[..]
    }

    #[test]
    fn missing_admin_key_rejected_before_any_network_call() {
        let config = ChainConfig {
            admin_key_hex: None,
            ..test_config()
        };
        let err = EvmChainClient::new(&config).expect_err("should fail");
        assert!(matches!(err, PaylotError::ConfigError(msg) if msg.contains("not configured")));
    }

    #[test]
    fn unprefixed_admin_key_rejected() {
        let config = ChainConfig {
            admin_key_hex: Some(TEST_KEY[2..].into()),
            ..test_config()
        };
        let err = EvmChainClient::new(&config).expect_err("should fail");
        assert!(matches!(err, PaylotError::ConfigError(msg) if msg.contains("0x")));
    }

    #[test]
    fn bad_lottery_address_rejected() {
        let config = ChainConfig {
            lottery_address: "0xnope".into(),
            ..test_config()
        };
        assert!(EvmChainClient::new(&config).is_err());
    }

    #[test]
    fn signer_address_is_derived_from_the_credential() {
        let client = EvmChainClient::new(&test_config()).expect("client");
        assert_ne!(client.signer_address(), Address::zero());
    }

    #[test]
    fn lottery_calls_use_published_selectors() {
        let client = EvmChainClient::new(&test_config()).expect("client");

        assert!(selector_of(
            &client.lottery.buy(Address::zero(), Address::zero(), U256::one()),
            "buy(address,address,uint256)",
        ));
        assert!(selector_of(
            &client.lottery.add_merchant(Address::zero()),
            "addMerchant(address)",
        ));
        assert!(selector_of(
            &client.lottery.deposit(U256::one()),
            "deposit(uint256)",
        ));
        assert!(selector_of(
            &client.lottery.request_random_number(),
            "requestRandomNumber()",
        ));
        assert!(selector_of(
            &client.lottery.draw_winners(),
            "drawWinners()",
        ));
        assert!(selector_of(
            &client.lottery.update_price_and_distribute(vec![Bytes::from(vec![1u8])]),
            "updatePriceAndDistribute(bytes[])",
        ));
    }

    #[test]
    fn token_calls_use_erc20_selectors() {
        let client = EvmChainClient::new(&test_config()).expect("client");

        assert!(selector_of(
            &client.token.approve(Address::zero(), U256::one()),
            "approve(address,uint256)",
        ));
        assert!(selector_of(
            &client.token.transfer(Address::zero(), U256::one()),
            "transfer(address,uint256)",
        ));
        assert!(selector_of(
            &client.token.balance_of(Address::zero()),
            "balanceOf(address)",
        ));
        assert!(selector_of(
            &client.token.allowance(Address::zero(), Address::zero()),
            "allowance(address,address)",
        ));
    }

    #[test]
    fn entropy_fee_read_uses_published_selector() {
        let client = EvmChainClient::new(&test_config()).expect("client");
        assert!(selector_of(&client.entropy.get_fee_v2(), "getFeeV2()"));
    }

    #[test]
    fn dropped_transaction_is_a_chain_error() {
        let err = confirm_receipt("buy", H256::zero(), None).expect_err("should fail");
        assert!(matches!(err, PaylotError::ChainError(msg) if msg.contains("dropped")));
    }

    #[test]
    fn reverted_transaction_is_a_chain_error() {
        let receipt = TransactionReceipt {
            status: Some(0.into()),
            ..Default::default()
        };
        let err = confirm_receipt("buy", H256::zero(), Some(receipt)).expect_err("should fail");
        assert!(matches!(err, PaylotError::ChainError(msg) if msg.contains("reverted")));
    }

    #[test]
    fn successful_receipt_returns_the_hash() {
        let receipt = TransactionReceipt {
            status: Some(1.into()),
            ..Default::default()
        };
        let tx = H256([7u8; 32]);
        assert_eq!(confirm_receipt("buy", tx, Some(receipt)).expect("ok"), tx);
    }
}
