use soroban_sdk::{contracttype, Address, String};

/// Storage keys for the contract.
/// Using enum with variants for type-safe storage access.
///
/// Contract-level keys live in instance storage; per-market and per-user
/// keys live in persistent storage.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Admin address (validates and resolves markets, collects fees)
    Admin,
    /// Collateral token contract address
    Token,
    /// Bonding-curve damping constant `k`, shared by all markets
    LiquidityK,
    /// Accumulated platform fees, admin-recoverable
    FeePool,
    /// Number of markets created; the next market id
    MarketCount,
    /// Re-entrancy guard flag around token transfers
    Locked,
    /// Global participant list (one entry per user, ever)
    AllParticipants,
    /// Set membership flag for AllParticipants: Known(user)
    Known(Address),
    /// Market record: Market(market_id)
    Market(u32),
    /// Option record: OptionData(market_id, option_id)
    OptionData(u32, u32),
    /// Share balance: Shares(market_id, user, option_id)
    Shares(u32, Address, u32),
    /// Claim flag: Claimed(market_id, user)
    Claimed(u32, Address),
    /// Per-market participant list in enrollment order
    Participants(u32),
    /// Set membership flag for Participants: Enrolled(market_id, user)
    Enrolled(u32, Address),
    /// Per-user portfolio statistics
    Portfolio(Address),
    /// Append-only per-market trade log
    Trades(u32),
    /// Append-only price series: PriceHistory(market_id, option_id)
    PriceHistory(u32, u32),
    /// One-shot dispute reason: DisputeReason(market_id)
    DisputeReason(u32),
    /// Market ids per category tag
    Category(String),
}

/// A multi-option market priced by a linear bonding curve.
#[derive(Clone)]
#[contracttype]
pub struct Market {
    pub creator: Address,
    pub question: String,
    pub description: String,
    pub category: String,
    pub created_at: u64,
    /// Fixed at creation, never mutated.
    pub end_time: u64,
    /// Immutable after creation.
    pub option_count: u32,
    /// One-shot authorization flag required before trading.
    pub validated: bool,
    pub resolved: bool,
    /// Winning option, only meaningful once resolved.
    pub winning_option: u32,
    /// One-shot flag; blocks all claims while set.
    pub disputed: bool,
    /// Net collateral held for this market (trade costs in minus proceeds
    /// out; frozen once trading locks).
    pub total_liquidity: i128,
    pub total_volume: i128,
    pub total_fees: i128,
}

/// Per-option trading state. Options are mutually independent.
#[derive(Clone)]
#[contracttype]
pub struct MarketOption {
    pub name: String,
    pub shares_outstanding: i128,
    pub volume: i128,
    /// Current unit price, SCALE fixed-point. Always strictly positive.
    pub price: i128,
    pub active: bool,
}

/// Immutable trade snapshot; one side is always the contract itself, the
/// synthetic market-maker.
#[derive(Clone)]
#[contracttype]
pub struct Trade {
    pub option_id: u32,
    pub user: Address,
    pub maker: Address,
    pub is_buy: bool,
    /// Pre-trade unit price the trade executed at.
    pub price: i128,
    pub quantity: i128,
    pub timestamp: u64,
}

/// Immutable (price, timestamp, volume) sample appended per trade.
#[derive(Clone)]
#[contracttype]
pub struct PricePoint {
    pub price: i128,
    pub timestamp: u64,
    pub volume: i128,
}

/// Per-user aggregate statistics.
#[derive(Clone)]
#[contracttype]
pub struct Portfolio {
    /// Fee-inclusive total paid in; monotonic.
    pub invested: i128,
    /// Total claimed winnings; monotonic.
    pub winnings: i128,
    /// Signed cash-flow P&L: payouts and sale proceeds minus buy-ins.
    pub realized_pnl: i128,
    pub trade_count: u32,
}

/// One leaderboard row.
#[derive(Clone)]
#[contracttype]
pub struct LeaderboardEntry {
    pub user: Address,
    pub winnings: i128,
    pub invested: i128,
    pub trade_count: u32,
    /// winnings * 100 / invested; zero if never invested.
    pub win_rate: i128,
}

/// Derived market lifecycle state.
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum MarketStatus {
    Open,
    Locked,
    Disputed,
    Claimable,
}

/// Scale factor for fixed-point unit prices (18 decimal places).
/// Token amounts and share quantities are unscaled base units; only prices
/// and ratios carry the scale.
pub const SCALE: i128 = 1_000_000_000_000_000_000;

/// Option count bounds.
pub const MIN_OPTIONS: u32 = 2;
pub const MAX_OPTIONS: u32 = 10;

/// Platform fee on trades in basis points (1 bp = 0.01%).
/// 200 bp = 2%. Fees accumulate in the fee pool and go to the admin via
/// withdraw_fees.
pub const FEE_BPS: i128 = 200;

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Minimum market duration in seconds (1 hour).
pub const MIN_DURATION: u64 = 3_600;

/// Maximum market duration in seconds (1 year).
pub const MAX_DURATION: u64 = 31_536_000;
