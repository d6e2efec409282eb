#[cfg(test)]
mod connect_tests {
    use assert_matches::assert_matches;
    use provider::mock::MockCall;
    use types::{
        errors::ClientError,
        ui::{CONNECTED_LABEL, Control},
    };

    use crate::mocks::wallet::MockWallet;

    #[tokio::test]
    async fn connect_requests_access_then_lists_accounts() {
        let mut wallet = MockWallet::new();

        let accounts = wallet.client.connect().await.unwrap();

        assert_eq!(accounts.len(), 6);
        assert_eq!(accounts[0], wallet.chain.deployer());
        assert_eq!(wallet.client.accounts(), accounts.as_slice());
        assert_eq!(wallet.client.ui().label(Control::Connect), CONNECTED_LABEL);
        assert_eq!(
            wallet.chain.calls(),
            vec![MockCall::RequestAccounts, MockCall::Accounts]
        );
    }

    #[tokio::test]
    async fn rejected_access_leaves_state_untouched() {
        let mut wallet = MockWallet::new();
        wallet.chain.reject_account_requests(true);

        let result = wallet.client.connect().await;

        assert_matches!(result, Err(ClientError::UserRejected(_)));
        assert_eq!(wallet.client.ui().label(Control::Connect), "Connect");
        assert!(wallet.client.accounts().is_empty());
        assert_eq!(
            wallet.client.ui().status(),
            Some("Request was rejected in the wallet")
        );
        assert_eq!(wallet.chain.calls(), vec![MockCall::RequestAccounts]);
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_error() {
        let mut wallet = MockWallet::new();
        wallet.chain.set_unreachable(true);

        assert_matches!(
            wallet.client.connect().await,
            Err(ClientError::Network(_))
        );
        assert_eq!(
            wallet.client.ui().status(),
            Some("Could not reach the wallet provider")
        );
    }

    #[tokio::test]
    async fn connect_can_be_repeated() {
        let mut wallet = MockWallet::new();

        wallet.client.connect().await.unwrap();
        wallet.chain.set_accounts(vec![wallet.chain.account(3)]);
        let accounts = wallet.client.connect().await.unwrap();

        assert_eq!(accounts, vec![wallet.chain.account(3)]);
        assert_eq!(wallet.client.accounts(), accounts.as_slice());
    }
}
