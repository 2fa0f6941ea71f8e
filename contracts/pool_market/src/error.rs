use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// Only admin can perform this action
    Unauthorized = 3,
    /// No market with this id
    MarketNotFound = 4,
    /// Question must be non-empty
    InvalidQuestion = 5,
    /// Duration outside allowed bounds
    InvalidDuration = 6,
    /// Side must be 0 (YES) or 1 (NO)
    InvalidOutcome = 7,
    /// Amount must be positive
    InvalidAmount = 8,
    /// Market end time has passed, staking closed
    MarketClosed = 9,
    /// Market end time has not passed yet
    TooEarly = 10,
    /// Market already resolved
    AlreadyResolved = 11,
    /// Market not resolved yet
    NotResolved = 12,
    /// Winning side holds no stake, nothing to split
    NoWinningShares = 13,
    /// Disbursement has not reached the end of the participant list
    NotDisbursed = 14,
    /// Nothing left to withdraw
    NothingToWithdraw = 15,
    /// Arithmetic overflow
    Overflow = 16,
    /// Market pool cannot cover the payout
    InsufficientPool = 17,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 18,
    /// Re-entrant call detected across a transfer boundary
    ReentrancyGuard = 19,
}
