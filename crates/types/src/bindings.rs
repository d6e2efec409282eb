use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface FundMe {
        function fund() external payable;
        function withdraw() external;
        function cheaperWithdraw() external;

        function getAddressToAmountFunded(address fundingAddress) external view returns (uint256);
        function getTimeRemainingForWithdrawal(address funder) external view returns (uint256);
        function getFunder(uint256 index) external view returns (address);
        function getOwner() external view returns (address);
        function getPriceFeed() external view returns (address);
        function getVersion() external view returns (uint256);
    }
}

/// Revert reasons emitted by the deployed contract.
pub mod reverts {
    pub const NOT_ENOUGH_ETH: &str = "You need to spend more ETH!";
    pub const WITHDRAWAL_LOCKED: &str = "Withdrawal locked. Please wait until lock time ends!";
    pub const NOT_OWNER: &str = "FundMe__NotOwner";
}
