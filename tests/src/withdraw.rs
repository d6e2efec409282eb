#[cfg(test)]
mod withdraw_tests {
    use client::WithdrawOutcome;
    use provider::mock::{DEFAULT_LOCK_SECS, MockCall};
    use types::{U256, bindings::reverts, errors::ClientError};

    use crate::mocks::wallet::MockWallet;

    fn sent_withdrawal(calls: &[MockCall]) -> bool {
        calls.iter().any(|call| {
            matches!(
                call,
                MockCall::Withdraw { .. } | MockCall::CheaperWithdraw { .. }
            )
        })
    }

    #[tokio::test]
    async fn nothing_funded_sends_no_transaction() {
        let mut wallet = MockWallet::new();

        let outcome = wallet.client.withdraw().await.unwrap();

        assert_eq!(outcome, WithdrawOutcome::NothingFunded);
        let calls = wallet.chain.calls();
        assert_eq!(calls[0], MockCall::RequestAccounts);
        assert_eq!(
            calls[1],
            MockCall::AddressToAmountFunded(wallet.chain.deployer())
        );
        assert!(!sent_withdrawal(&calls));
    }

    #[tokio::test]
    async fn locked_withdrawal_reports_time_left() {
        let mut wallet = MockWallet::new();
        wallet.connect_and_fund("1").await;
        wallet.chain.increase_time(10);

        let outcome = wallet.client.withdraw().await.unwrap();

        assert_eq!(
            outcome,
            WithdrawOutcome::Locked {
                remaining: U256::from(DEFAULT_LOCK_SECS - 10)
            }
        );
        assert!(!sent_withdrawal(&wallet.chain.calls()));
        assert!(!wallet.client.ui().withdraw_enabled());
    }

    #[tokio::test]
    async fn unlocked_withdrawal_empties_the_contract() {
        let mut wallet = MockWallet::new();
        wallet.connect_and_fund("2").await;
        wallet.chain.increase_time(DEFAULT_LOCK_SECS);
        let owner = wallet.chain.deployer();
        let owner_before = wallet.chain.balance_of(owner);

        let outcome = wallet.client.withdraw().await.unwrap();

        let WithdrawOutcome::Completed(confirmation) = outcome else {
            panic!("expected a completed withdrawal, got {outcome:?}");
        };
        assert!(
            wallet
                .chain
                .calls()
                .contains(&MockCall::Withdraw { from: owner })
        );
        assert_eq!(
            wallet.chain.balance_of(wallet.chain.contract_address()),
            U256::ZERO
        );
        assert_eq!(
            wallet.chain.balance_of(owner) + confirmation.gas_cost(),
            owner_before + U256::from(2_000_000_000_000_000_000_u64)
        );
        assert!(wallet.client.ui().withdraw_enabled());
    }

    #[tokio::test]
    async fn cheaper_withdraw_uses_its_own_entry_point() {
        let mut wallet = MockWallet::new();
        wallet.connect_and_fund("1").await;
        wallet.chain.increase_time(DEFAULT_LOCK_SECS + 1);

        let outcome = wallet.client.cheaper_withdraw().await.unwrap();

        assert!(matches!(outcome, WithdrawOutcome::Completed(_)));
        let calls = wallet.chain.calls();
        assert!(calls.contains(&MockCall::CheaperWithdraw {
            from: wallet.chain.deployer()
        }));
        assert!(
            !calls
                .iter()
                .any(|call| matches!(call, MockCall::Withdraw { .. }))
        );
    }

    #[tokio::test]
    async fn non_owner_withdrawal_is_reverted() {
        let mut wallet = MockWallet::new();
        let funder = wallet.chain.account(1);
        wallet.chain.set_accounts(vec![funder]);
        wallet.connect_and_fund("1").await;
        wallet.chain.increase_time(DEFAULT_LOCK_SECS);

        let result = wallet.client.withdraw().await;

        assert_eq!(
            result,
            Err(ClientError::RemoteReverted(reverts::NOT_OWNER.to_string()))
        );
        assert_eq!(
            wallet.client.ui().status(),
            Some("Contract refused the call: FundMe__NotOwner")
        );
    }

    #[tokio::test]
    async fn withdraw_needs_account_access() {
        let mut wallet = MockWallet::new();
        wallet.chain.reject_account_requests(true);

        assert!(matches!(
            wallet.client.withdraw().await,
            Err(ClientError::UserRejected(_))
        ));
        assert_eq!(wallet.chain.calls(), vec![MockCall::RequestAccounts]);
    }

    #[tokio::test]
    async fn zero_time_remaining_unlocks_and_requests_reload() {
        let mut wallet = MockWallet::new();
        wallet.connect_and_fund("1").await;
        assert!(!wallet.client.ui().withdraw_enabled());

        let remaining = wallet.client.get_estimated_time().await.unwrap();
        assert_eq!(remaining, U256::from(DEFAULT_LOCK_SECS));
        assert!(!wallet.client.ui().reload_requested());

        wallet.chain.increase_time(DEFAULT_LOCK_SECS);
        let remaining = wallet.client.get_estimated_time().await.unwrap();
        assert_eq!(remaining, U256::ZERO);
        assert!(wallet.client.ui().withdraw_enabled());
        assert!(wallet.client.ui().reload_requested());
        assert_eq!(
            wallet.chain.calls().last(),
            Some(&MockCall::TimeRemaining(wallet.chain.deployer()))
        );
    }
}
