#[cfg(test)]
mod views_tests {
    use assert_matches::assert_matches;
    use provider::mock::{DEFAULT_VERSION, MockCall};
    use types::{
        U256,
        amount::{format_eth_amount, parse_eth_amount},
        errors::ClientError,
        ui::{Control, PROVIDER_PROMPT},
    };

    use crate::mocks::wallet::MockWallet;

    #[tokio::test]
    async fn balance_reads_the_contract_account() {
        let mut wallet = MockWallet::new();
        wallet.connect_and_fund("1.5").await;

        let balance = wallet.client.get_balance().await.unwrap();

        assert_eq!(balance, parse_eth_amount("1.5").unwrap());
        assert_eq!(
            wallet.chain.calls(),
            vec![MockCall::GetBalance(wallet.chain.contract_address())]
        );
        assert_eq!(
            wallet.client.ui().status(),
            Some(format!("Contract balance: {} ETH", format_eth_amount(balance)).as_str())
        );
    }

    #[tokio::test]
    async fn failed_balance_read_leaves_status_alone() {
        let mut wallet = MockWallet::new();
        wallet.chain.set_unreachable(true);

        assert_matches!(
            wallet.client.get_balance().await,
            Err(ClientError::Network(_))
        );
        assert_eq!(wallet.client.ui().status(), None);
        assert_eq!(wallet.client.ui().changed_labels().count(), 0);
    }

    #[tokio::test]
    async fn balance_without_provider_prompts_on_balance_label() {
        let mut client = client::WalletClient::without_provider();

        assert_eq!(
            client.get_balance().await,
            Err(ClientError::ProviderUnavailable)
        );
        assert_eq!(client.ui().label(Control::Balance), PROVIDER_PROMPT);
        assert_eq!(client.ui().status(), None);
    }

    #[tokio::test]
    async fn amount_funded_defaults_to_the_signer() {
        let mut wallet = MockWallet::new();
        wallet.connect_and_fund("1").await;
        let other = wallet.chain.account(4);

        let own = wallet.client.amount_funded(None).await.unwrap();
        let theirs = wallet.client.amount_funded(Some(other)).await.unwrap();

        assert_eq!(own, parse_eth_amount("1").unwrap());
        assert_eq!(theirs, U256::ZERO);
        assert_eq!(
            wallet.chain.calls(),
            vec![
                MockCall::AddressToAmountFunded(wallet.chain.deployer()),
                MockCall::AddressToAmountFunded(other),
            ]
        );
    }

    #[tokio::test]
    async fn funders_are_listed_in_order() {
        let mut wallet = MockWallet::new();
        wallet.connect_and_fund("1").await;

        assert_eq!(
            wallet.client.funder(U256::ZERO).await.unwrap(),
            wallet.chain.deployer()
        );
        assert_matches!(
            wallet.client.funder(U256::from(1)).await,
            Err(ClientError::RemoteReverted(_))
        );
    }

    #[tokio::test]
    async fn contract_metadata() {
        let mut wallet = MockWallet::new();

        assert_eq!(wallet.client.owner().await.unwrap(), wallet.chain.deployer());
        assert_eq!(
            wallet.client.version().await.unwrap(),
            U256::from(DEFAULT_VERSION)
        );
        assert_eq!(
            wallet.client.price_feed().await.unwrap(),
            wallet.chain.price_feed_address()
        );
        assert_eq!(
            wallet.chain.calls(),
            vec![MockCall::Owner, MockCall::Version, MockCall::PriceFeed]
        );
    }

    #[tokio::test]
    async fn reload_forgets_accounts_and_labels() {
        let mut wallet = MockWallet::new();
        wallet.chain.set_unreachable(true);
        let _ = wallet.client.connect().await;
        wallet.chain.set_unreachable(false);

        wallet.client.reload().await.unwrap();

        assert_eq!(wallet.client.ui().label(Control::Connect), "Connected");
        assert_eq!(wallet.client.accounts().len(), 6);
    }
}
