mod common;

use common::*;
use cro_gateway::{
    abi, Error, OperationClient, OperationKind, OperationOptions, OperationStage, OperationStatus,
    TransferParams,
};
use ethers::types::{Address, U256};
use std::time::Duration;

/// Plain native transfers
mod native_transfer_tests {
    use super::*;

    #[tokio::test]
    async fn test_transfer_returns_pending_hash_for_funded_wallet() {
        let rpc = MockRpc::default();
        let mut client = client(&rpc);

        let result = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "1.0"))
            .await
            .unwrap();

        assert_eq!(result.status, OperationStatus::Pending);
        assert_eq!(result.kind, OperationKind::Transfer);
        let hash = format!("{:?}", result.hash);
        assert_eq!(hash.len(), 66);
        assert!(hash.starts_with("0x"));
        assert!(hash[2..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(
            result.stages,
            vec![
                OperationStage::Building,
                OperationStage::Estimating,
                OperationStage::Signing,
                OperationStage::Broadcasting,
                OperationStage::Pending,
            ]
        );
        assert!(result.explorer_url.ends_with(&hash));

        let sent = rpc.state.lock().unwrap().sent.clone();
        assert_eq!(sent.len(), 1);
        let tx = decode_sent(&sent[0]);
        assert_eq!(tx.recover_from().unwrap(), client.address());
        assert_eq!(tx.chain_id, Some(U256::from(338u64)));
        assert_eq!(tx.to, Some(RECIPIENT.parse::<Address>().unwrap()));
        assert_eq!(tx.value, ether(1));
        assert_eq!(tx.nonce, U256::from(7u64));
        assert_eq!(result.nonce, U256::from(7u64));
        assert!(tx.input.is_empty());
    }

    #[tokio::test]
    async fn test_gas_limit_never_below_transfer_floor() {
        let rpc = MockRpc::with(|s| s.gas_estimate = U256::from(5_000u64));
        let mut client = client(&rpc);
        client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.5"))
            .await
            .unwrap();

        let tx = decode_sent(&rpc.state.lock().unwrap().sent[0]);
        assert_eq!(tx.gas, U256::from(21_000u64));
    }

    #[tokio::test]
    async fn test_estimate_is_doubled() {
        let rpc = MockRpc::with(|s| s.gas_estimate = U256::from(30_000u64));
        let mut client = client(&rpc);
        client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.5"))
            .await
            .unwrap();

        let tx = decode_sent(&rpc.state.lock().unwrap().sent[0]);
        assert_eq!(tx.gas, U256::from(60_000u64));
    }

    #[tokio::test]
    async fn test_simulation_failure_falls_back_to_floor_and_still_sends() {
        let rpc = MockRpc::with(|s| s.fail_estimate = true);
        let mut client = client(&rpc);
        let result = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.5"))
            .await
            .unwrap();

        assert_eq!(result.status, OperationStatus::Pending);
        let state = rpc.state.lock().unwrap();
        assert_eq!(state.estimate_calls, 1);
        assert_eq!(decode_sent(&state.sent[0]).gas, U256::from(21_000u64));
    }
}

/// Failures that must stop the pipeline before broadcast
mod transfer_failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_insufficient_funds_fails_before_broadcast() {
        // 1.0 value + 42_000 gas * 5_000 gwei = 1.21 > 1.2
        let rpc = MockRpc::with(|s| s.balance = ether(12) / 10);
        let mut client = client(&rpc);

        let err = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "1.0"))
            .await
            .unwrap_err();

        match &err {
            Error::InsufficientFunds(message) => {
                assert!(message.contains("1.2 TCRO"), "{message}");
                assert!(message.contains("1.21 TCRO"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(rpc.sent_count(), 0);
        assert!(rpc.state.lock().unwrap().nonce_reads.is_empty());
    }

    #[tokio::test]
    async fn test_validation_errors_precede_network_calls() {
        let rpc = MockRpc::default();
        let mut client = client(&rpc);

        let err = client
            .transfer(&testnet(), TransferParams::native("0x1234", "1.0"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));

        let err = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "1.2.3"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { .. }));

        let err = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.0000000000000000001"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { .. }));

        let state = rpc.state.lock().unwrap();
        assert_eq!(state.estimate_calls, 0);
        assert!(state.nonce_reads.is_empty());
        assert!(state.sent.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_token_amount_fails_before_decimals_lookup() {
        let rpc = MockRpc::with(|s| s.chain_id = 25);
        let mut client = client(&rpc);

        for amount in ["-1", "abc", "0"] {
            let err = client
                .transfer(&testnet(), TransferParams::token(RECIPIENT, amount, token(0xaa)))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidAmount { .. }), "{amount}: {err:?}");
        }
        assert!(rpc.state.lock().unwrap().calls.is_empty());
    }

    #[tokio::test]
    async fn test_rpc_on_wrong_chain_is_network_mismatch() {
        let rpc = MockRpc::with(|s| s.chain_id = 25);
        let mut client = client(&rpc);

        let err = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "1.0"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NetworkMismatch {
                expected: 338,
                actual: 25,
                ..
            }
        ));
        assert!(err.is_fatal());
        assert_eq!(rpc.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_wallet_on_wrong_chain_is_network_mismatch_unless_switching() {
        let rpc = MockRpc::default();
        let mut client =
            OperationClient::with_options(rpc.clone(), test_wallet(25), fast_options());
        let err = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "1.0"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NetworkMismatch {
                expected: 338,
                actual: 25,
                ..
            }
        ));
        assert_eq!(rpc.sent_count(), 0);

        let options = OperationOptions {
            auto_switch_chain: true,
            ..fast_options()
        };
        let mut client = OperationClient::with_options(rpc.clone(), test_wallet(25), options);
        client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "1.0"))
            .await
            .unwrap();
        let tx = decode_sent(&rpc.state.lock().unwrap().sent[0]);
        assert_eq!(tx.chain_id, Some(U256::from(338u64)));
    }
}

/// ERC-20 transfers
mod token_transfer_tests {
    use super::*;

    #[tokio::test]
    async fn test_token_transfer_encodes_transfer_call() {
        let usdc = token(0xaa);
        let rpc = MockRpc::with(|s| s.decimals = Some(6));
        let mut client = client(&rpc);

        client
            .transfer(&testnet(), TransferParams::token(RECIPIENT, "2.5", usdc))
            .await
            .unwrap();

        let tx = decode_sent(&rpc.state.lock().unwrap().sent[0]);
        assert_eq!(tx.to, Some(usdc));
        assert_eq!(tx.value, U256::zero());
        assert!(tx.gas >= U256::from(65_000u64));
        let expected =
            abi::encode_transfer(RECIPIENT.parse().unwrap(), U256::from(2_500_000u64)).unwrap();
        assert_eq!(tx.input, expected);
    }

    #[tokio::test]
    async fn test_token_balance_is_checked() {
        let rpc = MockRpc::with(|s| {
            s.decimals = Some(6);
            s.token_balance = U256::from(1_000_000u64);
        });
        let mut client = client(&rpc);

        let err = client
            .transfer(&testnet(), TransferParams::token(RECIPIENT, "2.5", token(0xaa)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientFunds(_)));
        assert_eq!(rpc.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_decimals_is_network_error() {
        let rpc = MockRpc::with(|s| s.decimals = None);
        let mut client = client(&rpc);

        let err = client
            .transfer(&testnet(), TransferParams::token(RECIPIENT, "1", token(0xaa)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NetworkError(_)));
    }
}

/// Nonce sequencing and confirmation tracking
mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_sequential_transfers_take_consecutive_nonces() {
        let rpc = MockRpc::default();
        let mut client = client(&rpc);
        let first = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        let second = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        assert_eq!(second.nonce, first.nonce + 1);
        assert_ne!(first.hash, second.hash);
    }

    #[tokio::test]
    async fn test_lagging_node_nonce_is_bumped_past_last_broadcast() {
        let rpc = MockRpc::with(|s| s.reported_nonce = Some(U256::from(7u64)));
        let mut client = client(&rpc);
        let first = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        let second = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        assert_eq!(first.nonce, U256::from(7u64));
        assert_eq!(second.nonce, U256::from(8u64));
        assert_eq!(rpc.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_dropped_transaction_frees_its_nonce() {
        let rpc = MockRpc::default();
        let mut client = client(&rpc);
        let first = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        {
            let mut state = rpc.state.lock().unwrap();
            state.sent_hashes.clear();
            state.nonce = first.nonce;
        }

        let second = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        assert_eq!(first.nonce, U256::from(7u64));
        assert_eq!(second.nonce, U256::from(7u64));
        assert_eq!(
            rpc.state.lock().unwrap().nonce_reads,
            vec![U256::from(7u64), U256::from(7u64)]
        );
    }

    #[tokio::test]
    async fn test_await_confirmation_reports_receipt_status() {
        let rpc = MockRpc::default();
        let mut client = client(&rpc);
        let mut result = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();

        let status = client
            .await_confirmation(&mut result, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(status, OperationStatus::Confirmed);
        assert_eq!(result.status, OperationStatus::Confirmed);
        assert_eq!(result.stages.last(), Some(&OperationStage::Confirmed));

        rpc.state.lock().unwrap().receipt_success = false;
        let mut result = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        let status = client
            .await_confirmation(&mut result, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(status, OperationStatus::Failed);
        assert_eq!(result.stages.last(), Some(&OperationStage::Failed));
    }

    #[tokio::test]
    async fn test_default_wait_uses_transfer_timeout() {
        let rpc = MockRpc::default();
        let mut client = client(&rpc);
        let mut result = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        assert_eq!(result.kind.confirmation_timeout(), Duration::from_secs(120));

        let status = client.wait_for_confirmation(&mut result).await.unwrap();
        assert_eq!(status, OperationStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_await_confirmation_times_out() {
        let rpc = MockRpc::default();
        let mut client = client(&rpc);
        let mut result = client
            .transfer(&testnet(), TransferParams::native(RECIPIENT, "0.1"))
            .await
            .unwrap();
        rpc.state.lock().unwrap().sent_hashes.clear();

        let err = client
            .await_confirmation(&mut result, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfirmationTimeout { hash, .. } if hash == result.hash));
        assert_eq!(result.status, OperationStatus::Pending);
    }
}
