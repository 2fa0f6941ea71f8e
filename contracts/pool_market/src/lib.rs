#![no_std]

mod error;
mod storage;

use error::PoolError;
use soroban_sdk::{contract, contractimpl, token, Address, Env, String, Vec};
use storage::{
    DataKey, Market, MarketStatus, StakeRecord, MAX_DURATION, MIN_DURATION, SCALE, SIDE_NO,
    SIDE_YES,
};

/// Pari-Mutuel Pool Market Contract
///
/// Holds many binary (YES/NO) markets keyed by sequential id. Stakes are
/// priced flat 1:1; at resolution the losing pool is split among winning
/// stakers proportional to their stake. Payouts run as administrator-driven
/// batches over the participant list, resumable across calls via a persisted
/// cursor so that no single call has to walk an unbounded list.
#[contract]
pub struct PoolMarket;

#[contractimpl]
impl PoolMarket {
    /// Initialize the contract with the admin and the staking token.
    pub fn initialize(env: Env, admin: Address, token: Address) -> Result<(), PoolError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(PoolError::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::MarketCount, &0u32);

        Ok(())
    }

    /// Create a new binary market.
    ///
    /// # Arguments
    /// * `creator` - Address opening the market (must authorize)
    /// * `question` - Non-empty market question
    /// * `category` - Category tag, indexed for lookup
    /// * `duration` - Seconds until the market locks; bounded
    ///
    /// # Returns
    /// The sequential id of the new market
    pub fn create_market(
        env: Env,
        creator: Address,
        question: String,
        category: String,
        duration: u64,
    ) -> Result<u32, PoolError> {
        Self::require_initialized(&env)?;

        if question.len() == 0 {
            return Err(PoolError::InvalidQuestion);
        }
        if duration < MIN_DURATION || duration > MAX_DURATION {
            return Err(PoolError::InvalidDuration);
        }

        creator.require_auth();

        let market_id: u32 = env
            .storage()
            .instance()
            .get(&DataKey::MarketCount)
            .ok_or(PoolError::StorageCorrupted)?;

        let now = env.ledger().timestamp();
        let market = Market {
            creator,
            question,
            category: category.clone(),
            created_at: now,
            end_time: now + duration,
            resolved: false,
            outcome: 0,
            yes_total: 0,
            no_total: 0,
            pool: 0,
            payout_cursor: 0,
        };

        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);
        env.storage()
            .persistent()
            .set(&DataKey::Participants(market_id), &Vec::<Address>::new(&env));

        let mut by_category: Vec<u32> = env
            .storage()
            .persistent()
            .get(&DataKey::Category(category.clone()))
            .unwrap_or(Vec::new(&env));
        by_category.push_back(market_id);
        env.storage()
            .persistent()
            .set(&DataKey::Category(category), &by_category);

        env.storage()
            .instance()
            .set(&DataKey::MarketCount, &(market_id + 1));

        Ok(market_id)
    }

    /// Stake tokens on one side of an open market.
    ///
    /// Enrolls the user in the market's participant list on their first
    /// stake in this market. Appends an immutable record to the user's
    /// stake log.
    ///
    /// # Arguments
    /// * `user` - Staker (must authorize)
    /// * `market_id` - Target market
    /// * `side` - 0 for YES, 1 for NO
    /// * `amount` - Token amount to stake
    pub fn stake(
        env: Env,
        user: Address,
        market_id: u32,
        side: u32,
        amount: i128,
    ) -> Result<(), PoolError> {
        Self::require_initialized(&env)?;

        let mut market = Self::load_market(&env, market_id)?;

        if side != SIDE_YES && side != SIDE_NO {
            return Err(PoolError::InvalidOutcome);
        }
        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }
        if env.ledger().timestamp() >= market.end_time {
            return Err(PoolError::MarketClosed);
        }

        user.require_auth();

        // Side balance and aggregates first, transfer last.
        let stake_key = DataKey::Stake(market_id, user.clone(), side);
        let balance: i128 = env.storage().persistent().get(&stake_key).unwrap_or(0);
        env.storage()
            .persistent()
            .set(&stake_key, &(balance.checked_add(amount).ok_or(PoolError::Overflow)?));

        if side == SIDE_YES {
            market.yes_total = market.yes_total.checked_add(amount).ok_or(PoolError::Overflow)?;
        } else {
            market.no_total = market.no_total.checked_add(amount).ok_or(PoolError::Overflow)?;
        }
        market.pool = market.pool.checked_add(amount).ok_or(PoolError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);

        let mut history: Vec<StakeRecord> = env
            .storage()
            .persistent()
            .get(&DataKey::StakeHistory(user.clone()))
            .unwrap_or(Vec::new(&env));
        history.push_back(StakeRecord {
            market_id,
            side,
            amount,
            timestamp: env.ledger().timestamp(),
        });
        env.storage()
            .persistent()
            .set(&DataKey::StakeHistory(user.clone()), &history);

        Self::enroll(&env, market_id, &user);

        Self::acquire_lock(&env)?;
        let token_client = token::Client::new(&env, &Self::token(&env)?);
        token_client.transfer(&user, &env.current_contract_address(), &amount);
        Self::release_lock(&env);

        Ok(())
    }

    /// Resolve a market to its winning side (admin only).
    ///
    /// Allowed only after the end time, exactly once.
    pub fn resolve(
        env: Env,
        admin: Address,
        market_id: u32,
        outcome: u32,
    ) -> Result<(), PoolError> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env, &admin)?;
        admin.require_auth();

        let mut market = Self::load_market(&env, market_id)?;

        if market.resolved {
            return Err(PoolError::AlreadyResolved);
        }
        if env.ledger().timestamp() < market.end_time {
            return Err(PoolError::TooEarly);
        }
        if outcome != SIDE_YES && outcome != SIDE_NO {
            return Err(PoolError::InvalidOutcome);
        }

        market.resolved = true;
        market.outcome = outcome;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);

        Ok(())
    }

    /// Pay out the next batch of participants of a resolved market (admin only).
    ///
    /// Walks the participant list in enrollment order over
    /// `[cursor, cursor + batch_size)`. The loss-pool ratio is computed once
    /// per call: totals are frozen at resolution, so it is a batch-wide
    /// constant. Each winner receives `stake + stake * ratio / SCALE`; paid
    /// and losing participants are skipped silently. Calling past the end of
    /// the list mutates nothing. A failed call leaves the cursor unchanged,
    /// so retries are always safe.
    ///
    /// # Returns
    /// Number of participants paid in this call
    pub fn disburse_batch(
        env: Env,
        admin: Address,
        market_id: u32,
        batch_size: u32,
    ) -> Result<u32, PoolError> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env, &admin)?;
        admin.require_auth();

        if batch_size == 0 {
            return Err(PoolError::InvalidAmount);
        }

        let mut market = Self::load_market(&env, market_id)?;
        if !market.resolved {
            return Err(PoolError::NotResolved);
        }

        let (winning_total, losing_total) = if market.outcome == SIDE_YES {
            (market.yes_total, market.no_total)
        } else {
            (market.no_total, market.yes_total)
        };
        if winning_total == 0 {
            return Err(PoolError::NoWinningShares);
        }

        // Batch-wide constant; see doc comment.
        let loss_pool_ratio = losing_total
            .checked_mul(SCALE)
            .ok_or(PoolError::Overflow)?
            .checked_div(winning_total)
            .ok_or(PoolError::Overflow)?;

        let participants: Vec<Address> = env
            .storage()
            .persistent()
            .get(&DataKey::Participants(market_id))
            .ok_or(PoolError::StorageCorrupted)?;
        let count = participants.len();

        let cursor = market.payout_cursor;
        if cursor >= count {
            return Ok(0);
        }
        let end = u32::min(cursor.saturating_add(batch_size), count);

        Self::acquire_lock(&env)?;
        let token_client = token::Client::new(&env, &Self::token(&env)?);

        let mut paid_now: u32 = 0;
        for i in cursor..end {
            let user = participants.get(i).ok_or(PoolError::StorageCorrupted)?;

            let paid_key = DataKey::Paid(market_id, user.clone());
            if env.storage().persistent().get(&paid_key).unwrap_or(false) {
                continue;
            }

            let stake_key = DataKey::Stake(market_id, user.clone(), market.outcome);
            let balance: i128 = env.storage().persistent().get(&stake_key).unwrap_or(0);
            if balance <= 0 {
                continue;
            }

            let winnings = balance
                .checked_add(
                    balance
                        .checked_mul(loss_pool_ratio)
                        .ok_or(PoolError::Overflow)?
                        .checked_div(SCALE)
                        .ok_or(PoolError::Overflow)?,
                )
                .ok_or(PoolError::Overflow)?;

            if market.pool < winnings {
                return Err(PoolError::InsufficientPool);
            }

            // Ledger state before the transfer: flag, balance, pool.
            env.storage().persistent().set(&paid_key, &true);
            env.storage().persistent().set(&stake_key, &0i128);
            market.pool -= winnings;

            token_client.transfer(&env.current_contract_address(), &user, &winnings);
            paid_now += 1;
        }

        market.payout_cursor = end;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);

        Self::release_lock(&env);

        Ok(paid_now)
    }

    /// Withdraw rounding dust left in a fully disbursed market (admin only).
    ///
    /// # Returns
    /// Amount withdrawn
    pub fn withdraw_remaining(
        env: Env,
        admin: Address,
        market_id: u32,
    ) -> Result<i128, PoolError> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env, &admin)?;
        admin.require_auth();

        let mut market = Self::load_market(&env, market_id)?;
        if !market.resolved {
            return Err(PoolError::NotResolved);
        }

        let participants: Vec<Address> = env
            .storage()
            .persistent()
            .get(&DataKey::Participants(market_id))
            .ok_or(PoolError::StorageCorrupted)?;
        if market.payout_cursor < participants.len() {
            return Err(PoolError::NotDisbursed);
        }

        let remaining = market.pool;
        if remaining <= 0 {
            return Err(PoolError::NothingToWithdraw);
        }

        market.pool = 0;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);

        Self::acquire_lock(&env)?;
        let token_client = token::Client::new(&env, &Self::token(&env)?);
        token_client.transfer(&env.current_contract_address(), &admin, &remaining);
        Self::release_lock(&env);

        Ok(remaining)
    }

    // --- Queries ---

    /// Get a market record.
    pub fn get_market(env: Env, market_id: u32) -> Result<Market, PoolError> {
        Self::require_initialized(&env)?;
        Self::load_market(&env, market_id)
    }

    /// Get several market records by id.
    pub fn get_markets(env: Env, market_ids: Vec<u32>) -> Result<Vec<Market>, PoolError> {
        Self::require_initialized(&env)?;
        let mut out = Vec::new(&env);
        for id in market_ids.iter() {
            out.push_back(Self::load_market(&env, id)?);
        }
        Ok(out)
    }

    /// Get a user's stake balance on one side of a market.
    pub fn get_stake(env: Env, market_id: u32, user: Address, side: u32) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Stake(market_id, user, side))
            .unwrap_or(0)
    }

    /// Whether a user has already been paid for a market.
    pub fn has_been_paid(env: Env, market_id: u32, user: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::Paid(market_id, user))
            .unwrap_or(false)
    }

    /// Most recent `count` stake records for a user, oldest-first within the
    /// returned window.
    pub fn get_stake_history(env: Env, user: Address, count: u32) -> Vec<StakeRecord> {
        let history: Vec<StakeRecord> = env
            .storage()
            .persistent()
            .get(&DataKey::StakeHistory(user))
            .unwrap_or(Vec::new(&env));
        let len = history.len();
        let start = len.saturating_sub(count);
        history.slice(start..len)
    }

    /// Derived lifecycle state of a market.
    pub fn get_status(env: Env, market_id: u32) -> Result<MarketStatus, PoolError> {
        Self::require_initialized(&env)?;
        let market = Self::load_market(&env, market_id)?;

        if !market.resolved {
            if env.ledger().timestamp() < market.end_time {
                return Ok(MarketStatus::Open);
            }
            return Ok(MarketStatus::Locked);
        }

        let participants: Vec<Address> = env
            .storage()
            .persistent()
            .get(&DataKey::Participants(market_id))
            .ok_or(PoolError::StorageCorrupted)?;

        if market.payout_cursor >= participants.len() {
            Ok(MarketStatus::Disbursed)
        } else if market.payout_cursor > 0 {
            Ok(MarketStatus::Disbursing)
        } else {
            Ok(MarketStatus::Resolved)
        }
    }

    /// Number of markets created.
    pub fn market_count(env: Env) -> Result<u32, PoolError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::MarketCount)
            .ok_or(PoolError::StorageCorrupted)
    }

    /// Market ids carrying a category tag.
    pub fn markets_by_category(env: Env, category: String) -> Vec<u32> {
        env.storage()
            .persistent()
            .get(&DataKey::Category(category))
            .unwrap_or(Vec::new(&env))
    }

    /// Number of enrolled participants in a market.
    pub fn participant_count(env: Env, market_id: u32) -> Result<u32, PoolError> {
        Self::require_initialized(&env)?;
        Self::load_market(&env, market_id)?;
        let participants: Vec<Address> = env
            .storage()
            .persistent()
            .get(&DataKey::Participants(market_id))
            .ok_or(PoolError::StorageCorrupted)?;
        Ok(participants.len())
    }

    /// Get the admin address.
    pub fn get_admin(env: Env) -> Result<Address, PoolError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(PoolError::StorageCorrupted)
    }

    /// Get the staking token address.
    pub fn get_token(env: Env) -> Result<Address, PoolError> {
        Self::require_initialized(&env)?;
        Self::token(&env)
    }

    // --- Internal helpers ---

    fn require_initialized(env: &Env) -> Result<(), PoolError> {
        if !env.storage().instance().has(&DataKey::Admin) {
            return Err(PoolError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), PoolError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(PoolError::StorageCorrupted)?;
        if *caller != admin {
            return Err(PoolError::Unauthorized);
        }
        Ok(())
    }

    fn token(env: &Env) -> Result<Address, PoolError> {
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(PoolError::StorageCorrupted)
    }

    fn load_market(env: &Env, market_id: u32) -> Result<Market, PoolError> {
        env.storage()
            .persistent()
            .get(&DataKey::Market(market_id))
            .ok_or(PoolError::MarketNotFound)
    }

    /// Enroll in the market's participant list on the first stake there.
    fn enroll(env: &Env, market_id: u32, user: &Address) {
        let enrolled_key = DataKey::Enrolled(market_id, user.clone());
        if !env.storage().persistent().get(&enrolled_key).unwrap_or(false) {
            let mut participants: Vec<Address> = env
                .storage()
                .persistent()
                .get(&DataKey::Participants(market_id))
                .unwrap_or(Vec::new(env));
            participants.push_back(user.clone());
            env.storage()
                .persistent()
                .set(&DataKey::Participants(market_id), &participants);
            env.storage().persistent().set(&enrolled_key, &true);
        }
    }

    fn acquire_lock(env: &Env) -> Result<(), PoolError> {
        if env.storage().instance().get(&DataKey::Locked).unwrap_or(false) {
            return Err(PoolError::ReentrancyGuard);
        }
        env.storage().instance().set(&DataKey::Locked, &true);
        Ok(())
    }

    fn release_lock(env: &Env) {
        env.storage().instance().set(&DataKey::Locked, &false);
    }
}
