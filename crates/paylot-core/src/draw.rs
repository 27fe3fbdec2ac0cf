//! Draw orchestration.
//!
//! One draw is three admin transactions against the lottery contract,
//! interleaved with one blind wait and one oracle read:
//!
//! 1. Read the entropy fee, submit the payable randomness request, confirm.
//! 2. Sleep a fixed interval for the entropy callback (never verified).
//! 3. Submit the winner-selection transaction, confirm.
//! 4. Fetch the latest price-update payloads, submit them with a fixed ETH
//!    value to cover downstream fees, confirm.
//!
//! Step order is fixed and irreversible within one run. There is no rollback:
//! a transaction confirmed before a later failure stays confirmed, and the
//! returned step list is the only record of how far the run got.

use crate::config::TimingConfig;
use crate::Result;
use ethers::types::{Bytes, H256, U256};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ETH sent with the price-update transaction to cover the oracle update fee
/// charged downstream (0.01 ETH).
pub fn draw_value_wei() -> U256 {
    U256::exp10(16)
}

/// Steps of the draw sequence, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawStep {
    RequestRandomNumber,
    Waiting,
    DrawWinners,
    UpdatePriceAndDistribute,
}

/// Progress state of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// One entry of the step list returned to the caller. Mutated in place while
/// the run progresses, read-only afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStepUpdate {
    pub step: DrawStep,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DrawStepUpdate {
    fn processing(step: DrawStep, message: impl Into<String>) -> Self {
        Self {
            step,
            status: StepStatus::Processing,
            tx_hash: None,
            message: Some(message.into()),
        }
    }

    fn complete(&mut self) {
        self.status = StepStatus::Completed;
    }

    fn complete_with_tx(&mut self, tx_hash: H256) {
        self.status = StepStatus::Completed;
        self.tx_hash = Some(format!("{tx_hash:#x}"));
    }

    fn fail(&mut self, message: String) {
        self.status = StepStatus::Error;
        self.message = Some(message);
    }
}

/// Outcome of one draw invocation.
#[derive(Clone, Debug, Serialize)]
pub struct DrawRun {
    pub success: bool,
    pub updates: Vec<DrawStepUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DrawRun {
    fn completed(updates: Vec<DrawStepUpdate>) -> Self {
        Self {
            success: true,
            updates,
            message: Some("Draw process completed successfully!".into()),
        }
    }

    fn failed(updates: Vec<DrawStepUpdate>) -> Self {
        Self {
            success: false,
            updates,
            message: None,
        }
    }
}

/// Confirmed writes against the lottery and entropy contracts.
pub trait DrawChain {
    /// Read the per-request fee charged by the entropy provider.
    fn entropy_fee(&self) -> Result<U256>;

    /// Submit the payable randomness request.
    ///
    /// Postconditions:
    /// - Returns only after the transaction receipt is observed.
    fn request_random_number(&self, fee: U256) -> Result<H256>;

    /// Submit the winner-selection transaction; same confirmation contract.
    fn draw_winners(&self) -> Result<H256>;

    /// Submit the price-update payloads with `value` attached; same
    /// confirmation contract.
    fn update_price_and_distribute(&self, payloads: Vec<Bytes>, value: U256) -> Result<H256>;
}

/// Supplies the latest oracle price-update payloads, already normalized and
/// decoded (see `pricefeed`).
pub trait PriceUpdateSource {
    fn latest_update(&self) -> Result<Vec<Bytes>>;
}

/// Blind elapsed-time wait. Injected so tests observe the requested wait
/// instead of sleeping through it.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by `std::thread::sleep`.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Execute one draw sequence.
///
/// Preconditions:
/// - `chain` holds a valid admin signing credential.
///
/// Postconditions:
/// - On success the step list holds four `completed` entries; the synthetic
///   wait entry carries no transaction hash.
/// - On failure the list ends with the single failing entry marked `error`
///   and contains no entries for steps that were never started.
pub fn run_draw<C, P, S>(
    chain: &C,
    prices: &P,
    sleeper: &S,
    timing: &TimingConfig,
) -> DrawRun
where
    C: DrawChain,
    P: PriceUpdateSource,
    S: Sleeper,
{
    let mut updates = Vec::with_capacity(4);

    updates.push(DrawStepUpdate::processing(
        DrawStep::RequestRandomNumber,
        "Requesting random number from the entropy provider...",
    ));
    let requested = chain
        .entropy_fee()
        .and_then(|fee| chain.request_random_number(fee));
    match requested {
        Ok(tx_hash) => updates[0].complete_with_tx(tx_hash),
        Err(e) => {
            updates[0].fail(e.to_string());
            return DrawRun::failed(updates);
        }
    }

    updates.push(DrawStepUpdate::processing(
        DrawStep::Waiting,
        format!(
            "Waiting for entropy callback (~{} seconds)...",
            timing.callback_wait.as_secs()
        ),
    ));
    sleeper.sleep(timing.callback_wait);
    // The callback is assumed done once the interval elapsed; nothing checks it.
    updates[1].complete();

    updates.push(DrawStepUpdate::processing(
        DrawStep::DrawWinners,
        "Drawing winners based on the random number...",
    ));
    match chain.draw_winners() {
        Ok(tx_hash) => updates[2].complete_with_tx(tx_hash),
        Err(e) => {
            updates[2].fail(e.to_string());
            return DrawRun::failed(updates);
        }
    }

    updates.push(DrawStepUpdate::processing(
        DrawStep::UpdatePriceAndDistribute,
        "Fetching price data and distributing prizes...",
    ));
    let distributed = prices
        .latest_update()
        .and_then(|payloads| chain.update_price_and_distribute(payloads, draw_value_wei()));
    match distributed {
        Ok(tx_hash) => updates[3].complete_with_tx(tx_hash),
        Err(e) => {
            updates[3].fail(e.to_string());
            return DrawRun::failed(updates);
        }
    }

    DrawRun::completed(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaylotError;
    use std::cell::{Cell, RefCell};

    fn tx(byte: u8) -> H256 {
        H256([byte; 32])
    }

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            callback_wait: Duration::from_secs(10),
            approval_wait: Duration::from_secs(2),
            http_timeout: Duration::from_secs(1),
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        slept: RefCell<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.borrow_mut().push(duration);
        }
    }

    /// Chain fake failing at a configurable step.
    struct FakeChain {
        fail_fee: bool,
        fail_request: bool,
        fail_draw: bool,
        fail_distribute: bool,
        distribute_calls: Cell<usize>,
        last_payloads: RefCell<Vec<Bytes>>,
        last_value: Cell<U256>,
    }

    impl FakeChain {
        fn ok() -> Self {
            Self {
                fail_fee: false,
                fail_request: false,
                fail_draw: false,
                fail_distribute: false,
                distribute_calls: Cell::new(0),
                last_payloads: RefCell::new(Vec::new()),
                last_value: Cell::new(U256::zero()),
            }
        }
    }

    impl DrawChain for FakeChain {
        fn entropy_fee(&self) -> Result<U256> {
            if self.fail_fee {
                return Err(PaylotError::ChainError("entropy fee read failed".into()));
            }
            Ok(U256::from(1_000u64))
        }

        fn request_random_number(&self, fee: U256) -> Result<H256> {
            assert_eq!(fee, U256::from(1_000u64));
            if self.fail_request {
                return Err(PaylotError::ChainError("requestRandomNumber reverted".into()));
            }
            Ok(tx(1))
        }

        fn draw_winners(&self) -> Result<H256> {
            if self.fail_draw {
                return Err(PaylotError::ChainError("drawWinners reverted".into()));
            }
            Ok(tx(2))
        }

        fn update_price_and_distribute(&self, payloads: Vec<Bytes>, value: U256) -> Result<H256> {
            self.distribute_calls.set(self.distribute_calls.get() + 1);
            *self.last_payloads.borrow_mut() = payloads;
            self.last_value.set(value);
            if self.fail_distribute {
                return Err(PaylotError::ChainError(
                    "updatePriceAndDistribute reverted".into(),
                ));
            }
            Ok(tx(3))
        }
    }

    struct FakePrices {
        result: Result<Vec<Bytes>>,
    }

    impl FakePrices {
        fn ok() -> Self {
            Self {
                result: Ok(vec![Bytes::from(vec![0xAAu8, 0xBB])]),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(PaylotError::OracleError(
                    "price update data is empty".into(),
                )),
            }
        }
    }

    impl PriceUpdateSource for FakePrices {
        fn latest_update(&self) -> Result<Vec<Bytes>> {
            match &self.result {
                Ok(payloads) => Ok(payloads.clone()),
                Err(e) => Err(PaylotError::OracleError(e.to_string())),
            }
        }
    }

    #[test]
    fn happy_path_completes_four_steps() {
        let chain = FakeChain::ok();
        let prices = FakePrices::ok();
        let sleeper = RecordingSleeper::default();

        let run = run_draw(&chain, &prices, &sleeper, &fast_timing());

        assert!(run.success);
        assert_eq!(run.message.as_deref(), Some("Draw process completed successfully!"));
        assert_eq!(run.updates.len(), 4);
        assert!(run.updates.iter().all(|u| u.status == StepStatus::Completed));

        assert_eq!(run.updates[0].step, DrawStep::RequestRandomNumber);
        assert_eq!(run.updates[1].step, DrawStep::Waiting);
        assert_eq!(run.updates[2].step, DrawStep::DrawWinners);
        assert_eq!(run.updates[3].step, DrawStep::UpdatePriceAndDistribute);

        // The wait step is synthetic: no transaction behind it.
        assert!(run.updates[1].tx_hash.is_none());
        for idx in [0, 2, 3] {
            let hash = run.updates[idx].tx_hash.as_deref().expect("tx hash");
            assert!(hash.starts_with("0x"));
            assert_eq!(hash.len(), 66);
        }

        assert_eq!(*sleeper.slept.borrow(), vec![Duration::from_secs(10)]);
        assert_eq!(chain.last_value.get(), draw_value_wei());
        assert_eq!(chain.last_payloads.borrow().len(), 1);
    }

    #[test]
    fn fee_read_failure_yields_single_error_entry() {
        let chain = FakeChain {
            fail_fee: true,
            ..FakeChain::ok()
        };
        let prices = FakePrices::ok();
        let sleeper = RecordingSleeper::default();

        let run = run_draw(&chain, &prices, &sleeper, &fast_timing());

        assert!(!run.success);
        assert_eq!(run.updates.len(), 1);
        assert_eq!(run.updates[0].step, DrawStep::RequestRandomNumber);
        assert_eq!(run.updates[0].status, StepStatus::Error);
        assert!(run.updates[0].message.as_deref().unwrap().contains("entropy fee"));
        // Never reached the blind wait.
        assert!(sleeper.slept.borrow().is_empty());
        assert_eq!(chain.distribute_calls.get(), 0);
    }

    #[test]
    fn request_failure_yields_single_error_entry() {
        let chain = FakeChain {
            fail_request: true,
            ..FakeChain::ok()
        };
        let prices = FakePrices::ok();
        let sleeper = RecordingSleeper::default();

        let run = run_draw(&chain, &prices, &sleeper, &fast_timing());

        assert!(!run.success);
        assert_eq!(run.updates.len(), 1);
        assert_eq!(run.updates[0].status, StepStatus::Error);
    }

    #[test]
    fn draw_winners_failure_keeps_prior_steps_completed() {
        let chain = FakeChain {
            fail_draw: true,
            ..FakeChain::ok()
        };
        let prices = FakePrices::ok();
        let sleeper = RecordingSleeper::default();

        let run = run_draw(&chain, &prices, &sleeper, &fast_timing());

        assert!(!run.success);
        assert_eq!(run.updates.len(), 3);
        assert_eq!(run.updates[0].status, StepStatus::Completed);
        assert_eq!(run.updates[1].status, StepStatus::Completed);
        assert_eq!(run.updates[2].status, StepStatus::Error);
        assert_eq!(chain.distribute_calls.get(), 0);
    }

    #[test]
    fn oracle_failure_skips_final_transaction() {
        let chain = FakeChain::ok();
        let prices = FakePrices::failing();
        let sleeper = RecordingSleeper::default();

        let run = run_draw(&chain, &prices, &sleeper, &fast_timing());

        assert!(!run.success);
        assert_eq!(run.updates.len(), 4);
        assert_eq!(run.updates[3].status, StepStatus::Error);
        assert!(run.updates[3].message.as_deref().unwrap().contains("empty"));
        assert_eq!(chain.distribute_calls.get(), 0);
    }

    #[test]
    fn distribute_failure_marks_final_step() {
        let chain = FakeChain {
            fail_distribute: true,
            ..FakeChain::ok()
        };
        let prices = FakePrices::ok();
        let sleeper = RecordingSleeper::default();

        let run = run_draw(&chain, &prices, &sleeper, &fast_timing());

        assert!(!run.success);
        assert_eq!(run.updates.len(), 4);
        assert_eq!(run.updates[3].status, StepStatus::Error);
        assert_eq!(chain.distribute_calls.get(), 1);
        // Hash of the failed transaction is not recorded.
        assert!(run.updates[3].tx_hash.is_none());
    }

    #[test]
    fn step_names_serialize_in_wire_case() {
        let update = DrawStepUpdate::processing(DrawStep::UpdatePriceAndDistribute, "msg");
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(json["step"], "updatePriceAndDistribute");
        assert_eq!(json["status"], "processing");
        assert!(json.get("txHash").is_none());
    }
}
