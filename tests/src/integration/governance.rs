//! # Governance Scenarios
//!
//! Allow-list admission, the lock gate, emergency sweeps, and ownership
//! transfer, each exercised through the full host/relay choreography.

#[cfg(test)]
mod tests {
    use crate::harness::*;
    use rebound_relay::prelude::*;

    #[tokio::test]
    async fn test_unlisted_token_rejected_until_allowed() {
        let host = SimulatedHost::bootstrap().await;

        let err = host.create_flow(ALICE, WETHX, RATE_HIGH).await.unwrap_err();
        assert_eq!(
            err,
            HostRejection::Callback(CallbackError::DisallowedToken(WETHX))
        );
        assert_eq!(host.inbound_rate(WETHX, ALICE), FlowRate::ZERO);

        host.relay()
            .set_allow_list_batch(OWNER, vec![WETHX], vec![true])
            .await
            .unwrap();

        host.create_flow(ALICE, WETHX, RATE_HIGH).await.unwrap();
        assert_eq!(host.inbound_rate(WETHX, ALICE), RATE_HIGH);
        host.assert_mirrors(WETHX, ALICE).await;
        host.assert_not_jailed();
    }

    #[tokio::test]
    async fn test_disallowing_leaves_open_flows_running() {
        let host = SimulatedHost::bootstrap().await;
        host.create_flow(ALICE, DAIX, RATE_MED).await.unwrap();

        host.relay()
            .set_allow_list_batch(OWNER, vec![DAIX], vec![false])
            .await
            .unwrap();

        // The open pair keeps streaming...
        host.assert_mirrors(DAIX, ALICE).await;
        assert_eq!(host.outbound_rate(DAIX, ALICE), RATE_MED);

        // ...updates are now refused...
        let err = host.update_flow(ALICE, DAIX, RATE_HIGH).await.unwrap_err();
        assert_eq!(
            err,
            HostRejection::Callback(CallbackError::DisallowedToken(DAIX))
        );

        // ...but the counterparty can always close out.
        host.delete_flow(ALICE, RELAY, DAIX).await.unwrap();
        host.assert_pair_closed(DAIX, ALICE);
        host.assert_not_jailed();
    }

    #[tokio::test]
    async fn test_allow_list_batch_is_all_or_nothing() {
        let host = SimulatedHost::bootstrap().await;

        let err = host
            .relay()
            .set_allow_list_batch(OWNER, vec![WETHX, DAIX], vec![true])
            .await
            .unwrap_err();
        assert_eq!(err, AdminError::LengthMismatch { left: 2, right: 1 });

        // Nothing applied: WETHX still unlisted, DAIX still listed
        assert!(!host.relay().is_token_allowed(WETHX).await);
        assert!(host.relay().is_token_allowed(DAIX).await);
    }

    #[tokio::test]
    async fn test_lock_with_no_streams_going() {
        let host = SimulatedHost::bootstrap().await;

        host.relay().set_lock(OWNER, true).await.unwrap();
        let err = host.create_flow(ALICE, DAIX, RATE_MED).await.unwrap_err();
        assert_eq!(err, HostRejection::Callback(CallbackError::Locked));

        host.relay().set_lock(OWNER, false).await.unwrap();
        host.create_flow(ALICE, DAIX, RATE_MED).await.unwrap();
        host.assert_mirrors(DAIX, ALICE).await;
        host.assert_not_jailed();
    }

    #[tokio::test]
    async fn test_lock_with_streams_going() {
        let host = SimulatedHost::bootstrap().await;
        host.create_flow(ALICE, DAIX, RATE_MED).await.unwrap();

        host.relay().set_lock(OWNER, true).await.unwrap();

        // New entrants are kept out
        let err = host.create_flow(BOB, DAIX, RATE_MED).await.unwrap_err();
        assert_eq!(err, HostRejection::Callback(CallbackError::Locked));

        // Flows that predate the lock keep full lifecycle rights
        host.update_flow(ALICE, DAIX, RATE_HIGH).await.unwrap();
        host.assert_mirrors(DAIX, ALICE).await;
        host.delete_flow(ALICE, RELAY, DAIX).await.unwrap();
        host.assert_pair_closed(DAIX, ALICE);

        host.relay().set_lock(OWNER, false).await.unwrap();
        host.assert_not_jailed();
    }

    #[tokio::test]
    async fn test_emergency_sweep_closes_listed_pairs() {
        let host = SimulatedHost::bootstrap().await;
        host.create_flow(ALICE, DAIX, RATE_HIGH).await.unwrap();
        host.create_flow(BOB, USDCX, RATE_HIGH).await.unwrap();

        // Sweep includes Sunny, who has no flows at all
        host.relay()
            .emergency_close_stream(
                OWNER,
                vec![ALICE, BOB, SUNNY],
                vec![DAIX, USDCX, USDCX],
            )
            .await
            .unwrap();

        host.assert_not_jailed();
        host.assert_pair_closed(DAIX, ALICE);
        host.assert_pair_closed(USDCX, BOB);
        host.assert_pair_closed(USDCX, SUNNY);
    }

    #[tokio::test]
    async fn test_emergency_sweep_is_idempotent() {
        let host = SimulatedHost::bootstrap().await;
        host.create_flow(ALICE, DAIX, RATE_HIGH).await.unwrap();

        host.relay()
            .emergency_close_stream(OWNER, vec![ALICE], vec![DAIX])
            .await
            .unwrap();
        host.relay()
            .emergency_close_stream(OWNER, vec![ALICE], vec![DAIX])
            .await
            .unwrap();

        host.assert_pair_closed(DAIX, ALICE);
        assert_eq!(host.relay().stats().await.emergency_sweeps, 2);
        host.assert_not_jailed();
    }

    #[tokio::test]
    async fn test_sweep_emits_correlated_event() {
        let host = SimulatedHost::bootstrap().await;
        host.create_flow(ALICE, DAIX, RATE_HIGH).await.unwrap();

        host.relay()
            .emergency_close_stream(OWNER, vec![ALICE], vec![DAIX])
            .await
            .unwrap();

        let events = host.sink().events();
        let sweep = events
            .iter()
            .find_map(|e| match e {
                RelayEvent::EmergencySweepCompleted {
                    pairs,
                    closed,
                    contained,
                    ..
                } => Some((*pairs, *closed, *contained)),
                _ => None,
            })
            .expect("sweep event published");
        assert_eq!(sweep, (1, 2, 0));
    }

    #[tokio::test]
    async fn test_ownership_transfer_hands_over_admin() {
        let host = SimulatedHost::bootstrap().await;

        host.relay().transfer_ownership(OWNER, BOB).await.unwrap();
        assert_eq!(host.relay().owner().await, BOB);

        // Old owner is out
        let err = host.relay().set_lock(OWNER, true).await.unwrap_err();
        assert!(matches!(err, AdminError::Unauthorized { .. }));

        // New owner governs, including the rarity table
        host.relay()
            .set_rarity(BOB, [400, 400, 100, 70, 20, 10])
            .await
            .unwrap();
        assert_eq!(
            host.relay().rarity_weights().await,
            [400, 400, 100, 70, 20, 10]
        );
    }
}
