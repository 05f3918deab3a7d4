mod common;

use common::*;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use x402::authenticator::AccountAuthenticator;
use x402::ledger::{CommittedTransaction, SimulationOutcome};
use x402::signer::FeePayerSigner;
use x402::SchemeFacilitator;

#[tokio::test]
async fn test_unsponsored_settlement_submits_sender_proof_only() {
    let ledger = FakeLedger::succeeding();
    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &requirements("5000"))
        .await;

    assert!(resp.success, "unexpected failure: {:?}", resp.error_reason);
    assert_eq!(resp.transaction, TX_HASH);
    assert_eq!(resp.network, "aptos:2");
    assert_eq!(resp.payer, sender_address().to_string());
    assert!(resp.error_reason.is_none());

    let submissions = ledger.submissions();
    assert_eq!(submissions.len(), 1);
    assert!(submissions[0].fee_payer.is_none());
    // Untouched: still whatever the payer built.
    assert_eq!(
        submissions[0].transaction.fee_payer_address,
        Some(x402::AccountAddress::ZERO)
    );
    assert_eq!(ledger.confirmations(), vec![TX_HASH.to_string()]);
}

#[tokio::test]
async fn test_sponsored_settlement_attaches_fee_payer_signature() {
    let ledger = FakeLedger::succeeding();
    let sponsor = fee_payer();
    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &sponsored_requirements("5000"))
        .await;

    assert!(resp.success, "unexpected failure: {:?}", resp.error_reason);
    assert_eq!(resp.transaction, TX_HASH);

    let submission = ledger.submissions().remove(0);
    assert_eq!(
        submission.transaction.fee_payer_address,
        Some(sponsor.address())
    );

    let Some(AccountAuthenticator::Ed25519 {
        public_key,
        signature,
    }) = submission.fee_payer
    else {
        panic!("expected an ed25519 fee payer co-signature");
    };
    assert!(!signature.is_empty());

    let key = VerifyingKey::from_bytes(&public_key.try_into().unwrap()).unwrap();
    let sig = Signature::from_slice(&signature).unwrap();
    key.verify(&submission.transaction.signing_message().unwrap(), &sig)
        .unwrap();
}

#[tokio::test]
async fn test_sponsored_via_extra_flag() {
    let ledger = FakeLedger::succeeding();
    let mut req = requirements("5000");
    req.extra = Some(x402::RequirementsExtra { sponsored: true });

    let resp = facilitator(&ledger).settle(&transfer_payload(5000), &req).await;
    assert!(resp.success);
    assert!(ledger.submissions()[0].fee_payer.is_some());
}

#[tokio::test]
async fn test_settle_reverifies_and_skips_submission_on_invalid() {
    let ledger = FakeLedger::succeeding();
    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &sponsored_requirements("5001"))
        .await;

    assert!(!resp.success);
    assert_eq!(
        resp.error_reason.as_deref(),
        Some("invalid_payment_amount_mismatch")
    );
    assert_eq!(resp.payer, sender_address().to_string());
    assert_eq!(resp.transaction, "");
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_settle_scheme_failure_has_empty_payer() {
    let ledger = FakeLedger::succeeding();
    let mut req = requirements("5000");
    req.scheme = "upto".to_string();

    let resp = facilitator(&ledger).settle(&transfer_payload(5000), &req).await;
    assert_eq!(resp.error_reason.as_deref(), Some("unsupported_scheme"));
    assert_eq!(resp.payer, "");
    assert_eq!(ledger.simulation_count(), 0);
}

#[tokio::test]
async fn test_settle_stops_when_simulation_fails() {
    let ledger = FakeLedger::succeeding().with_simulation(Ok(SimulationOutcome {
        success: false,
        vm_status: "SEQUENCE_NUMBER_TOO_OLD".into(),
    }));

    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &requirements("5000"))
        .await;
    assert_eq!(
        resp.error_reason.as_deref(),
        Some("simulation_failed: SEQUENCE_NUMBER_TOO_OLD")
    );
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_submission_rejection_is_transaction_failed() {
    let ledger = FakeLedger::succeeding().with_submission_error("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE");

    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &requirements("5000"))
        .await;
    assert!(!resp.success);
    let reason = resp.error_reason.unwrap();
    assert!(reason.starts_with("transaction_failed: "), "{reason}");
    assert!(reason.contains("INSUFFICIENT_BALANCE_FOR_TRANSACTION_FEE"));
    assert_eq!(resp.transaction, "");
    assert_eq!(resp.payer, sender_address().to_string());
    assert!(ledger.confirmations().is_empty());
}

#[tokio::test]
async fn test_confirmation_timeout_is_transaction_failed() {
    let ledger = FakeLedger::succeeding().with_confirmation(Err("not committed after 30s".into()));

    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &requirements("5000"))
        .await;
    assert!(!resp.success);
    let reason = resp.error_reason.unwrap();
    assert!(reason.starts_with("transaction_failed: "), "{reason}");
    assert!(reason.contains("not committed"));
    assert_eq!(resp.transaction, "");
}

#[tokio::test]
async fn test_committed_but_aborted_is_transaction_failed() {
    let ledger = FakeLedger::succeeding().with_confirmation(Ok(CommittedTransaction {
        hash: TX_HASH.to_string(),
        success: false,
        vm_status: "Move abort: EINSUFFICIENT_BALANCE".to_string(),
    }));

    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &requirements("5000"))
        .await;
    assert!(!resp.success);
    assert!(resp
        .error_reason
        .unwrap()
        .contains("Move abort: EINSUFFICIENT_BALANCE"));
    assert_eq!(resp.transaction, "");
}

#[tokio::test]
async fn test_concurrent_settlements_are_independent() {
    let ledger = FakeLedger::succeeding();
    let f = facilitator(&ledger);
    let payload = transfer_payload(5000);
    let req = sponsored_requirements("5000");

    let (a, b) = tokio::join!(f.settle(&payload, &req), f.settle(&payload, &req));
    assert!(a.success && b.success);
    // No deduplication: both runs verify and submit.
    assert_eq!(ledger.simulation_count(), 2);
    assert_eq!(ledger.submissions().len(), 2);
}

#[tokio::test]
async fn test_panic_during_reverification_is_reported() {
    let ledger = FakeLedger::succeeding().panicking_at(Stage::Simulate);
    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &requirements("5000"))
        .await;

    assert!(!resp.success);
    assert_eq!(resp.error_reason.as_deref(), Some("unexpected_verify_error"));
    assert_eq!(resp.payer, "");
    assert_eq!(resp.transaction, "");
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn test_panic_during_submission_is_transaction_failure() {
    let ledger = FakeLedger::succeeding().panicking_at(Stage::Submit);
    let resp = facilitator(&ledger)
        .settle(&transfer_payload(5000), &sponsored_requirements("5000"))
        .await;

    assert!(!resp.success);
    let reason = resp.error_reason.unwrap_or_default();
    assert!(reason.starts_with("transaction_failed: "), "{reason}");
    assert!(reason.contains("ledger bug in submit"), "{reason}");
    assert_eq!(resp.payer, sender_address().to_string());
    assert_eq!(resp.transaction, "");
    assert!(ledger.confirmations().is_empty());
}
