use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum AmmError {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// Only admin can perform this action
    Unauthorized = 3,
    /// No market with this id
    MarketNotFound = 4,
    /// No option with this id in the market
    OptionNotFound = 5,
    /// Question must be non-empty
    InvalidQuestion = 6,
    /// Duration outside allowed bounds
    InvalidDuration = 7,
    /// Option count must be between 2 and 10
    InvalidOptionCount = 8,
    /// Option name must be non-empty / option inactive
    InvalidOption = 9,
    /// Quantity must be positive
    InvalidAmount = 10,
    /// Liquidity constant must be positive
    InvalidLiquidity = 11,
    /// Market has not been validated for trading
    NotValidated = 12,
    /// Market already validated
    AlreadyValidated = 13,
    /// Market end time has passed, trading closed
    MarketClosed = 14,
    /// Market end time has not passed yet
    TooEarly = 15,
    /// Market already resolved
    AlreadyResolved = 16,
    /// Market not resolved yet
    NotResolved = 17,
    /// Sell quantity exceeds the caller's share balance
    InsufficientShares = 18,
    /// Caller holds no winning shares / winning side is empty
    NoWinningShares = 19,
    /// Winnings already claimed for this market
    AlreadyClaimed = 20,
    /// Market already disputed
    AlreadyDisputed = 21,
    /// Claims are blocked while the market is disputed
    MarketDisputed = 22,
    /// Winning-share holders cannot dispute their own payout
    CannotDispute = 23,
    /// Market liquidity cannot cover the payout
    InsufficientPool = 24,
    /// Arithmetic overflow
    Overflow = 25,
    /// Pagination start past the end of the list
    OutOfRange = 26,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 27,
    /// Re-entrant call detected across a transfer boundary
    ReentrancyGuard = 28,
    /// Nothing left to withdraw
    NothingToWithdraw = 29,
}
