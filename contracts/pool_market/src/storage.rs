use soroban_sdk::{contracttype, Address, String};

/// Storage keys for the contract.
/// Using enum with variants for type-safe storage access.
///
/// Contract-level keys live in instance storage; per-market and per-user
/// keys live in persistent storage.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Admin address (creates, resolves and disburses markets)
    Admin,
    /// Staking token contract address
    Token,
    /// Number of markets created; the next market id
    MarketCount,
    /// Re-entrancy guard flag around token transfers
    Locked,
    /// Market record: Market(market_id)
    Market(u32),
    /// Side balance: Stake(market_id, user, side)
    Stake(u32, Address, u32),
    /// Payout flag: Paid(market_id, user)
    Paid(u32, Address),
    /// Per-market participant list in enrollment order
    Participants(u32),
    /// Set membership flag for Participants: Enrolled(market_id, user)
    Enrolled(u32, Address),
    /// Append-only per-user stake log
    StakeHistory(Address),
    /// Market ids per category tag
    Category(String),
}

/// A pari-mutuel market over a fixed YES/NO pair.
#[derive(Clone)]
#[contracttype]
pub struct Market {
    pub creator: Address,
    pub question: String,
    pub category: String,
    pub created_at: u64,
    /// Fixed at creation, never mutated.
    pub end_time: u64,
    pub resolved: bool,
    /// Winning side, only meaningful once resolved.
    pub outcome: u32,
    pub yes_total: i128,
    pub no_total: i128,
    /// Collateral held for this market.
    pub pool: i128,
    /// Next participant index for resumable disbursement.
    pub payout_cursor: u32,
}

/// Immutable record of one stake action, appended to the user's log.
#[derive(Clone)]
#[contracttype]
pub struct StakeRecord {
    pub market_id: u32,
    pub side: u32,
    pub amount: i128,
    pub timestamp: u64,
}

/// Derived market lifecycle state.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum MarketStatus {
    Open,
    Locked,
    Resolved,
    Disbursing,
    Disbursed,
}

/// Side constants
pub const SIDE_YES: u32 = 0;
pub const SIDE_NO: u32 = 1;

/// Scale factor for fixed-point ratios (18 decimal places).
/// Token amounts are unscaled base units; only ratios carry the scale.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// Minimum market duration in seconds (1 hour).
pub const MIN_DURATION: u64 = 3_600;

/// Maximum market duration in seconds (1 year).
pub const MAX_DURATION: u64 = 31_536_000;
