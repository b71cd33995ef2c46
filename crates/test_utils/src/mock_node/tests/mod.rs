// Path: crates/test_utils/src/mock_node/tests/mod.rs

use super::*;
use crate::fixtures::{account, test_key_provider, TEST_CHAIN_ID, TEST_CONTRACT, TEST_USER};
use ecopoints_tx::{Signer, TransactionBuilder};
use ecopoints_types::app::{GasOverrides, RewardIntent, SignedTransaction};

struct Harness {
    node: MockLedgerNode,
    builder: TransactionBuilder,
    signer: Signer,
}

impl Harness {
    fn new() -> Self {
        let contract = account(TEST_CONTRACT).unwrap();
        Self {
            node: MockLedgerNode::new(TEST_CHAIN_ID, contract),
            builder: TransactionBuilder::new(
                ContractAbi::builtin(),
                contract,
                TEST_CHAIN_ID,
                2_000_000,
                20_000_000_000,
            ),
            signer: Signer::new(test_key_provider().unwrap()).unwrap(),
        }
    }

    fn award(&self, amount: u64, nonce: u64) -> SignedTransaction {
        let intent = RewardIntent::new(account(TEST_USER).unwrap(), amount);
        let tx = self
            .builder
            .build(&intent, self.signer.address(), nonce, &GasOverrides::default());
        self.signer.sign(&tx).unwrap()
    }

    async fn points(&self) -> U256 {
        let data = self
            .builder
            .abi()
            .encode_get_points(account(TEST_USER).unwrap());
        let request = CallRequest {
            from: None,
            to: self.builder.contract(),
            data,
        };
        U256::from_be_slice(&self.node.call(&request, BlockTag::Latest).await.unwrap())
    }
}

#[tokio::test]
async fn test_accepted_award_is_mined_and_applied() {
    let h = Harness::new();
    let signed = h.award(50, 0);
    let hash = h.node.send_raw_transaction(signed.raw()).await.unwrap();
    assert_eq!(hash, signed.hash());

    let receipt = h.node.transaction_receipt(&hash).await.unwrap().unwrap();
    assert_eq!(receipt.status, Some(1));
    assert_eq!(receipt.block_number, Some(1));
    assert_eq!(h.points().await, U256::from(50));
    assert_eq!(
        h.node
            .transaction_count(h.signer.address(), BlockTag::Pending)
            .await
            .unwrap(),
        1
    );
    assert_eq!(h.node.accepted_transactions().len(), 1);
}

#[tokio::test]
async fn test_nonce_and_duplicate_enforcement() {
    let h = Harness::new();
    let first = h.award(5, 0);
    h.node.send_raw_transaction(first.raw()).await.unwrap();

    let err = h.node.send_raw_transaction(first.raw()).await.unwrap_err();
    assert_eq!(err.rejection(), Some(ecopoints_types::error::NodeRejection::AlreadyKnown));

    let reused = h.award(6, 0);
    let err = h.node.send_raw_transaction(reused.raw()).await.unwrap_err();
    assert_eq!(err.rejection(), Some(ecopoints_types::error::NodeRejection::NonceTooLow));

    let gap = h.award(7, 5);
    let err = h.node.send_raw_transaction(gap.raw()).await.unwrap_err();
    assert!(matches!(err, NodeError::Rpc { .. }));
    assert_eq!(err.rejection(), Some(ecopoints_types::error::NodeRejection::NonceTooHigh));

    assert_eq!(h.points().await, U256::from(5));
}

#[tokio::test]
async fn test_inclusion_delay_never_include_and_revert() {
    let h = Harness::new();
    h.node.set_faults(Faults {
        inclusion_delay_polls: 3,
        ..Faults::default()
    });
    let hash = h.node.send_raw_transaction(h.award(1, 0).raw()).await.unwrap();
    assert!(h.node.transaction_receipt(&hash).await.unwrap().is_none());
    assert!(h.node.transaction_receipt(&hash).await.unwrap().is_none());
    assert!(h.node.transaction_receipt(&hash).await.unwrap().is_some());

    h.node.set_faults(Faults {
        never_include: true,
        ..Faults::default()
    });
    let hash = h.node.send_raw_transaction(h.award(2, 1).raw()).await.unwrap();
    for _ in 0..5 {
        assert!(h.node.transaction_receipt(&hash).await.unwrap().is_none());
    }
    assert_eq!(h.node.pool_len(), 1);

    h.node.set_faults(Faults {
        revert: true,
        ..Faults::default()
    });
    h.node.mine_all();
    let receipt = h.node.transaction_receipt(&hash).await.unwrap().unwrap();
    assert_eq!(receipt.status, Some(0));
    assert_eq!(h.points().await, U256::from(1));
}

#[tokio::test]
async fn test_transport_faults() {
    let h = Harness::new();
    h.node.set_faults(Faults {
        transient_send_failures: 1,
        drop_send_response: 1,
        ..Faults::default()
    });
    let signed = h.award(9, 0);
    let first = h.node.send_raw_transaction(signed.raw()).await.unwrap_err();
    assert!(first.is_transient());
    assert_eq!(h.node.pool_len() + h.node.accepted_transactions().len(), 0);

    // Accepted, but the response is lost.
    let second = h.node.send_raw_transaction(signed.raw()).await.unwrap_err();
    assert!(second.is_transient());
    assert_eq!(h.node.accepted_transactions().len(), 1);
    assert_eq!(h.node.sends(), 2);

    h.node.set_faults(Faults {
        unreachable: true,
        ..Faults::default()
    });
    assert!(h.node.chain_id().await.unwrap_err().is_transient());
    assert_eq!(h.node.chain_id_queries(), 1);
}

#[tokio::test]
async fn test_drop_pool_rewinds_pending_count() {
    let h = Harness::new();
    h.node.set_faults(Faults {
        never_include: true,
        ..Faults::default()
    });
    let hash = h.node.send_raw_transaction(h.award(3, 0).raw()).await.unwrap();
    assert_eq!(h.node.pool_len(), 1);

    h.node.drop_pool();
    assert_eq!(h.node.pool_len(), 0);
    assert!(h.node.transaction_receipt(&hash).await.unwrap().is_none());
    assert_eq!(
        h.node
            .transaction_count(h.signer.address(), BlockTag::Pending)
            .await
            .unwrap(),
        0
    );
    assert_eq!(h.node.accepted_transactions().len(), 1);
    assert_eq!(h.points().await, U256::ZERO);
}

#[tokio::test]
async fn test_mined_resend_can_answer_nonce_too_low() {
    let h = Harness::new();
    let signed = h.award(4, 0);
    h.node.send_raw_transaction(signed.raw()).await.unwrap();

    h.node.set_faults(Faults {
        mined_resend_nonce_too_low: true,
        ..Faults::default()
    });
    let err = h.node.send_raw_transaction(signed.raw()).await.unwrap_err();
    assert_eq!(err.rejection(), Some(ecopoints_types::error::NodeRejection::NonceTooLow));
    assert_eq!(h.node.accepted_transactions().len(), 1);
}
