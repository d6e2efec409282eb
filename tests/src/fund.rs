#[cfg(test)]
mod fund_tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use provider::mock::{MOCK_GAS_USED, MockCall};
    use types::{
        U256,
        amount::parse_eth_amount,
        bindings::reverts,
        errors::ClientError,
        ui::{Control, PROVIDER_PROMPT},
    };

    use crate::mocks::wallet::MockWallet;

    fn eth(amount: &str) -> U256 {
        parse_eth_amount(amount).unwrap()
    }

    #[tokio::test]
    async fn fund_sends_value_from_first_account() {
        let mut wallet = MockWallet::new();
        wallet.client.connect().await.unwrap();
        wallet.chain.clear_calls();

        let confirmation = wallet.client.fund("1").await.unwrap();

        let deployer = wallet.chain.deployer();
        assert_eq!(
            wallet.chain.calls()[0],
            MockCall::Fund {
                from: deployer,
                value: eth("1"),
            }
        );
        assert_eq!(confirmation.block_number, wallet.chain.block());
        assert_eq!(confirmation.gas_used, MOCK_GAS_USED);
        assert_eq!(
            wallet.chain.balance_of(wallet.chain.contract_address()),
            eth("1")
        );
        assert!(!wallet.client.ui().withdraw_enabled());
    }

    #[tokio::test]
    async fn fund_without_connect_uses_known_accounts() {
        let mut wallet = MockWallet::new();

        wallet.client.fund("0.5").await.unwrap();

        let calls = wallet.chain.calls();
        assert_eq!(calls[0], MockCall::Accounts);
        assert_eq!(
            calls[1],
            MockCall::Fund {
                from: wallet.chain.deployer(),
                value: eth("0.5"),
            }
        );
    }

    #[tokio::test]
    async fn below_minimum_is_reverted_by_the_contract() {
        let mut wallet = MockWallet::new();
        wallet.client.connect().await.unwrap();

        let result = wallet.client.fund("0.001").await;

        assert_eq!(
            result,
            Err(ClientError::RemoteReverted(reverts::NOT_ENOUGH_ETH.to_string()))
        );
        assert!(wallet.client.ui().withdraw_enabled());
        assert!(
            wallet
                .client
                .ui()
                .status()
                .is_some_and(|status| status.contains(reverts::NOT_ENOUGH_ETH))
        );
    }

    #[tokio::test]
    async fn malformed_amount_never_reaches_the_chain() {
        let mut wallet = MockWallet::new();

        assert_matches!(
            wallet.client.fund("1.2.3").await,
            Err(ClientError::InvalidAmount(_))
        );
        assert!(wallet.chain.calls().is_empty());
    }

    #[tokio::test]
    async fn fund_waits_until_mined() {
        let mut wallet = MockWallet::new();
        wallet.chain.set_auto_mine(false);
        let chain = wallet.chain.clone();

        let funding = tokio::spawn(async move {
            let result = wallet.client.fund("1").await;
            (wallet, result)
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!funding.is_finished());

        chain.mine();
        let (wallet, result) = funding.await.unwrap();
        let confirmation = result.unwrap();
        assert_eq!(confirmation.block_number, chain.block());
        assert!(!wallet.client.ui().withdraw_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn unmined_fund_times_out() {
        let timeout = Duration::from_secs(30);
        let mut wallet = MockWallet::with_timeout(timeout);
        wallet.chain.set_auto_mine(false);

        let result = wallet.client.fund("1").await;

        assert_matches!(
            result,
            Err(ClientError::ConfirmationTimeout { waited, .. }) if waited == timeout
        );
        // The withdraw control only changes once a deposit is confirmed.
        assert!(wallet.client.ui().withdraw_enabled());
        assert!(
            wallet
                .client
                .ui()
                .status()
                .is_some_and(|status| status.contains("still unconfirmed after 30s"))
        );
    }

    #[tokio::test]
    async fn cancelled_wait_is_reported() {
        let mut wallet = MockWallet::new();
        wallet.chain.set_auto_mine(false);
        let cancel = wallet.client.cancel_token();

        let funding = tokio::spawn(async move { wallet.client.fund("1").await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        assert_matches!(
            funding.await.unwrap(),
            Err(ClientError::Cancelled { .. })
        );
    }

    #[tokio::test]
    async fn fund_after_a_cancelled_wait_confirms_normally() {
        let mut wallet = MockWallet::new();
        wallet.chain.set_auto_mine(false);
        let cancel = wallet.client.cancel_token();

        let funding = tokio::spawn(async move {
            let result = wallet.client.fund("1").await;
            (wallet, result)
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        let (mut wallet, first) = funding.await.unwrap();
        assert_matches!(first, Err(ClientError::Cancelled { .. }));
        assert!(wallet.client.ui().withdraw_enabled());

        wallet.chain.mine();
        wallet.chain.set_auto_mine(true);
        let confirmation = wallet.client.fund("1").await.unwrap();

        assert_eq!(confirmation.block_number, wallet.chain.block());
        assert!(!wallet.client.ui().withdraw_enabled());
        assert_eq!(
            wallet
                .chain
                .calls()
                .iter()
                .filter(|call| matches!(call, MockCall::Fund { .. }))
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn fund_without_provider_prompts_on_fund_label() {
        let mut client = client::WalletClient::without_provider();

        assert_eq!(
            client.fund("1").await,
            Err(ClientError::ProviderUnavailable)
        );
        let changed: Vec<_> = client.ui().changed_labels().collect();
        assert_eq!(changed, vec![(Control::Fund, PROVIDER_PROMPT)]);
    }
}
