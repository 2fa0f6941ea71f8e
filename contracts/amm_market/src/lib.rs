#![no_std]

mod error;
mod pricing;
mod storage;

use error::AmmError;
use soroban_sdk::{contract, contractimpl, token, Address, Env, String, Vec};
use storage::{
    DataKey, LeaderboardEntry, Market, MarketOption, MarketStatus, Portfolio, PricePoint, Trade,
    MAX_DURATION, MAX_OPTIONS, MIN_DURATION, MIN_OPTIONS, SCALE,
};

/// AMM Prediction Market Contract
///
/// Holds many multi-option markets keyed by sequential id. Each option
/// carries an explicit unit price driven by a linear bonding curve; trades
/// execute against the contract itself as the synthetic market-maker. After
/// resolution each winner pulls their own payout: their share value at the
/// winning price plus a pro-rata cut of the losing side's collateral.
#[contract]
pub struct AmmMarket;

#[contractimpl]
impl AmmMarket {
    /// Initialize the contract.
    ///
    /// # Arguments
    /// * `admin` - Address that validates and resolves markets and collects fees
    /// * `token` - Collateral token contract
    /// * `liquidity_k` - Bonding-curve damping constant shared by all markets
    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        liquidity_k: i128,
    ) -> Result<(), AmmError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(AmmError::AlreadyInitialized);
        }
        if liquidity_k <= 0 {
            return Err(AmmError::InvalidLiquidity);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Token, &token);
        env.storage().instance().set(&DataKey::LiquidityK, &liquidity_k);
        env.storage().instance().set(&DataKey::FeePool, &0i128);
        env.storage().instance().set(&DataKey::MarketCount, &0u32);
        env.storage()
            .instance()
            .set(&DataKey::AllParticipants, &Vec::<Address>::new(&env));

        Ok(())
    }

    /// Create a new market with 2-10 options, each seeded at an equal
    /// initial price of `SCALE / option_count`.
    ///
    /// # Returns
    /// The sequential id of the new market
    pub fn create_market(
        env: Env,
        creator: Address,
        question: String,
        description: String,
        options: Vec<String>,
        duration: u64,
        category: String,
    ) -> Result<u32, AmmError> {
        Self::require_initialized(&env)?;

        if question.len() == 0 {
            return Err(AmmError::InvalidQuestion);
        }
        let option_count = options.len();
        if option_count < MIN_OPTIONS || option_count > MAX_OPTIONS {
            return Err(AmmError::InvalidOptionCount);
        }
        if duration < MIN_DURATION || duration > MAX_DURATION {
            return Err(AmmError::InvalidDuration);
        }

        creator.require_auth();

        let market_id: u32 = env
            .storage()
            .instance()
            .get(&DataKey::MarketCount)
            .ok_or(AmmError::StorageCorrupted)?;

        let seed_price = pricing::initial_price(option_count)?;
        for (option_id, name) in options.iter().enumerate() {
            if name.len() == 0 {
                return Err(AmmError::InvalidOption);
            }
            let option = MarketOption {
                name,
                shares_outstanding: 0,
                volume: 0,
                price: seed_price,
                active: true,
            };
            env.storage()
                .persistent()
                .set(&DataKey::OptionData(market_id, option_id as u32), &option);
        }

        let now = env.ledger().timestamp();
        let market = Market {
            creator,
            question,
            description,
            category: category.clone(),
            created_at: now,
            end_time: now + duration,
            option_count,
            validated: false,
            resolved: false,
            winning_option: 0,
            disputed: false,
            total_liquidity: 0,
            total_volume: 0,
            total_fees: 0,
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

    /// One-shot authorization flag required before any trading (admin only).
    pub fn validate_market(env: Env, admin: Address, market_id: u32) -> Result<(), AmmError> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env, &admin)?;
        admin.require_auth();

        let mut market = Self::load_market(&env, market_id)?;
        if market.validated {
            return Err(AmmError::AlreadyValidated);
        }
        market.validated = true;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);

        Ok(())
    }

    /// Buy shares of an option at the current stored quote.
    ///
    /// The cost is taken at the pre-trade price; the price moves only after
    /// the trade is recorded, so a single trade sees no intra-trade slippage.
    /// A 2% platform fee is charged on top of the cost.
    ///
    /// # Returns
    /// Total collateral charged (cost + fee)
    pub fn buy(
        env: Env,
        user: Address,
        market_id: u32,
        option_id: u32,
        quantity: i128,
    ) -> Result<i128, AmmError> {
        Self::require_initialized(&env)?;

        let mut market = Self::load_market(&env, market_id)?;
        if !market.validated {
            return Err(AmmError::NotValidated);
        }
        if env.ledger().timestamp() >= market.end_time {
            return Err(AmmError::MarketClosed);
        }
        let mut option = Self::load_option(&env, market_id, option_id)?;
        if !option.active {
            return Err(AmmError::InvalidOption);
        }
        if quantity <= 0 {
            return Err(AmmError::InvalidAmount);
        }

        user.require_auth();

        let k = Self::liquidity_k(&env)?;
        let exec_price = option.price;
        let cost = pricing::spot_cost(exec_price, quantity)?;
        let fee = pricing::fee_amount(cost)?;
        let total = cost.checked_add(fee).ok_or(AmmError::Overflow)?;

        // Price updates after the trade, against pre-trade depth.
        option.price = pricing::price_after_buy(exec_price, option.shares_outstanding, quantity, k)?;
        option.shares_outstanding = option
            .shares_outstanding
            .checked_add(quantity)
            .ok_or(AmmError::Overflow)?;
        option.volume = option.volume.checked_add(cost).ok_or(AmmError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::OptionData(market_id, option_id), &option);

        market.total_liquidity = market
            .total_liquidity
            .checked_add(cost)
            .ok_or(AmmError::Overflow)?;
        market.total_volume = market
            .total_volume
            .checked_add(cost)
            .ok_or(AmmError::Overflow)?;
        market.total_fees = market.total_fees.checked_add(fee).ok_or(AmmError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);
        Self::credit_fee_pool(&env, fee)?;

        let shares_key = DataKey::Shares(market_id, user.clone(), option_id);
        let balance: i128 = env.storage().persistent().get(&shares_key).unwrap_or(0);
        env.storage()
            .persistent()
            .set(&shares_key, &(balance.checked_add(quantity).ok_or(AmmError::Overflow)?));

        let trade = Trade {
            option_id,
            user: user.clone(),
            maker: env.current_contract_address(),
            is_buy: true,
            price: exec_price,
            quantity,
            timestamp: env.ledger().timestamp(),
        };
        Self::record_trade(&env, market_id, &trade, option.price, cost);

        let mut portfolio = Self::portfolio_of(&env, &user);
        portfolio.invested = portfolio.invested.checked_add(total).ok_or(AmmError::Overflow)?;
        portfolio.realized_pnl = portfolio
            .realized_pnl
            .checked_sub(total)
            .ok_or(AmmError::Overflow)?;
        portfolio.trade_count += 1;
        env.storage()
            .persistent()
            .set(&DataKey::Portfolio(user.clone()), &portfolio);

        Self::enroll(&env, market_id, &user);

        Self::acquire_lock(&env)?;
        let token_client = token::Client::new(&env, &Self::token(&env)?);
        token_client.transfer(&user, &env.current_contract_address(), &total);
        Self::release_lock(&env);

        Ok(total)
    }

    /// Sell shares back to the market at the current stored quote.
    ///
    /// Proceeds are taken at the pre-trade price minus the 2% platform fee;
    /// the price then falls by the trade delta, flooring at half its value.
    ///
    /// # Returns
    /// Net collateral paid out (proceeds - fee)
    pub fn sell(
        env: Env,
        user: Address,
        market_id: u32,
        option_id: u32,
        quantity: i128,
    ) -> Result<i128, AmmError> {
        Self::require_initialized(&env)?;

        let mut market = Self::load_market(&env, market_id)?;
        if !market.validated {
            return Err(AmmError::NotValidated);
        }
        if env.ledger().timestamp() >= market.end_time {
            return Err(AmmError::MarketClosed);
        }
        let mut option = Self::load_option(&env, market_id, option_id)?;
        if !option.active {
            return Err(AmmError::InvalidOption);
        }
        if quantity <= 0 {
            return Err(AmmError::InvalidAmount);
        }

        let shares_key = DataKey::Shares(market_id, user.clone(), option_id);
        let balance: i128 = env.storage().persistent().get(&shares_key).unwrap_or(0);
        if balance < quantity {
            return Err(AmmError::InsufficientShares);
        }

        user.require_auth();

        let k = Self::liquidity_k(&env)?;
        let exec_price = option.price;
        let proceeds = pricing::spot_cost(exec_price, quantity)?;
        let fee = pricing::fee_amount(proceeds)?;
        let net = proceeds.checked_sub(fee).ok_or(AmmError::Overflow)?;

        if market.total_liquidity < proceeds {
            return Err(AmmError::InsufficientPool);
        }

        option.price = pricing::price_after_sell(exec_price, option.shares_outstanding, quantity, k)?;
        option.shares_outstanding = option
            .shares_outstanding
            .checked_sub(quantity)
            .ok_or(AmmError::Overflow)?;
        option.volume = option.volume.checked_add(proceeds).ok_or(AmmError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::OptionData(market_id, option_id), &option);

        market.total_liquidity -= proceeds;
        market.total_volume = market
            .total_volume
            .checked_add(proceeds)
            .ok_or(AmmError::Overflow)?;
        market.total_fees = market.total_fees.checked_add(fee).ok_or(AmmError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);
        Self::credit_fee_pool(&env, fee)?;

        env.storage().persistent().set(&shares_key, &(balance - quantity));

        let trade = Trade {
            option_id,
            user: user.clone(),
            maker: env.current_contract_address(),
            is_buy: false,
            price: exec_price,
            quantity,
            timestamp: env.ledger().timestamp(),
        };
        Self::record_trade(&env, market_id, &trade, option.price, proceeds);

        let mut portfolio = Self::portfolio_of(&env, &user);
        portfolio.realized_pnl = portfolio
            .realized_pnl
            .checked_add(net)
            .ok_or(AmmError::Overflow)?;
        portfolio.trade_count += 1;
        env.storage()
            .persistent()
            .set(&DataKey::Portfolio(user.clone()), &portfolio);

        Self::acquire_lock(&env)?;
        let token_client = token::Client::new(&env, &Self::token(&env)?);
        token_client.transfer(&env.current_contract_address(), &user, &net);
        Self::release_lock(&env);

        Ok(net)
    }

    /// Resolve a market to its winning option (admin only).
    ///
    /// Allowed only after the end time, exactly once.
    pub fn resolve(
        env: Env,
        admin: Address,
        market_id: u32,
        winning_option: u32,
    ) -> Result<(), AmmError> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env, &admin)?;
        admin.require_auth();

        let mut market = Self::load_market(&env, market_id)?;
        if market.resolved {
            return Err(AmmError::AlreadyResolved);
        }
        if env.ledger().timestamp() < market.end_time {
            return Err(AmmError::TooEarly);
        }
        if winning_option >= market.option_count {
            return Err(AmmError::OptionNotFound);
        }

        market.resolved = true;
        market.winning_option = winning_option;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);

        Ok(())
    }

    /// Raise a one-shot dispute on a resolved market.
    ///
    /// Only a holder of zero winning-side shares may dispute, so winners
    /// cannot block their own payout. While the flag is set all claims fail;
    /// there is no unblock path.
    pub fn dispute(
        env: Env,
        user: Address,
        market_id: u32,
        reason: String,
    ) -> Result<(), AmmError> {
        Self::require_initialized(&env)?;

        let mut market = Self::load_market(&env, market_id)?;
        if !market.resolved {
            return Err(AmmError::NotResolved);
        }
        if market.disputed {
            return Err(AmmError::AlreadyDisputed);
        }

        user.require_auth();

        let winning_balance: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::Shares(market_id, user.clone(), market.winning_option))
            .unwrap_or(0);
        if winning_balance > 0 {
            return Err(AmmError::CannotDispute);
        }

        market.disputed = true;
        env.storage()
            .persistent()
            .set(&DataKey::Market(market_id), &market);
        env.storage()
            .persistent()
            .set(&DataKey::DisputeReason(market_id), &reason);

        Ok(())
    }

    /// Claim winnings from a resolved, undisputed market.
    ///
    /// The payout is the caller's share value at the winning price plus a
    /// pro-rata cut of the losing side's collateral:
    /// `shares * price / SCALE + shares * losing_value / winning_shares`.
    ///
    /// # Returns
    /// Collateral paid out
    pub fn claim(env: Env, user: Address, market_id: u32) -> Result<i128, AmmError> {
        Self::require_initialized(&env)?;

        let market = Self::load_market(&env, market_id)?;
        if !market.resolved {
            return Err(AmmError::NotResolved);
        }
        if market.disputed {
            return Err(AmmError::MarketDisputed);
        }

        let claimed_key = DataKey::Claimed(market_id, user.clone());
        if env.storage().persistent().get(&claimed_key).unwrap_or(false) {
            return Err(AmmError::AlreadyClaimed);
        }

        let shares_key = DataKey::Shares(market_id, user.clone(), market.winning_option);
        let my_shares: i128 = env.storage().persistent().get(&shares_key).unwrap_or(0);
        if my_shares <= 0 {
            return Err(AmmError::NoWinningShares);
        }

        user.require_auth();

        let winning = Self::load_option(&env, market_id, market.winning_option)?;
        let total_winning = winning.shares_outstanding;
        if total_winning <= 0 {
            return Err(AmmError::NoWinningShares);
        }

        // Totals are frozen once trading locks, so this split is stable
        // across claims. The curve can inflate the winning side's nominal
        // value past the collateral the market actually collected; payouts
        // then fall back to a pro-rata split of the recorded liquidity, so
        // aggregate claims never exceed it.
        let winning_value = total_winning
            .checked_mul(winning.price)
            .ok_or(AmmError::Overflow)?
            .checked_div(SCALE)
            .ok_or(AmmError::Overflow)?;

        let winnings = if winning_value > market.total_liquidity {
            my_shares
                .checked_mul(market.total_liquidity)
                .ok_or(AmmError::Overflow)?
                .checked_div(total_winning)
                .ok_or(AmmError::Overflow)?
        } else {
            let total_losing_value = market.total_liquidity - winning_value;
            let share_value = my_shares
                .checked_mul(winning.price)
                .ok_or(AmmError::Overflow)?
                .checked_div(SCALE)
                .ok_or(AmmError::Overflow)?;
            let loss_cut = my_shares
                .checked_mul(total_losing_value)
                .ok_or(AmmError::Overflow)?
                .checked_div(total_winning)
                .ok_or(AmmError::Overflow)?;
            share_value.checked_add(loss_cut).ok_or(AmmError::Overflow)?
        };

        // Ledger state before the transfer: flag, balance, portfolio.
        env.storage().persistent().set(&claimed_key, &true);
        env.storage().persistent().set(&shares_key, &0i128);

        let mut portfolio = Self::portfolio_of(&env, &user);
        portfolio.winnings = portfolio.winnings.checked_add(winnings).ok_or(AmmError::Overflow)?;
        portfolio.realized_pnl = portfolio
            .realized_pnl
            .checked_add(winnings)
            .ok_or(AmmError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::Portfolio(user.clone()), &portfolio);

        Self::acquire_lock(&env)?;
        let token_client = token::Client::new(&env, &Self::token(&env)?);
        token_client.transfer(&env.current_contract_address(), &user, &winnings);
        Self::release_lock(&env);

        Ok(winnings)
    }

    /// Withdraw accumulated platform fees (admin only).
    ///
    /// # Returns
    /// Amount withdrawn
    pub fn withdraw_fees(env: Env, admin: Address) -> Result<i128, AmmError> {
        Self::require_initialized(&env)?;
        Self::require_admin(&env, &admin)?;
        admin.require_auth();

        let fees: i128 = env
            .storage()
            .instance()
            .get(&DataKey::FeePool)
            .ok_or(AmmError::StorageCorrupted)?;
        if fees <= 0 {
            return Err(AmmError::NothingToWithdraw);
        }

        env.storage().instance().set(&DataKey::FeePool, &0i128);

        Self::acquire_lock(&env)?;
        let token_client = token::Client::new(&env, &Self::token(&env)?);
        token_client.transfer(&env.current_contract_address(), &admin, &fees);
        Self::release_lock(&env);

        Ok(fees)
    }

    // --- Queries ---

    /// Current stored unit price of an option, O(1).
    pub fn get_price(env: Env, market_id: u32, option_id: u32) -> Result<i128, AmmError> {
        Self::require_initialized(&env)?;
        Ok(Self::load_option(&env, market_id, option_id)?.price)
    }

    /// Collateral cost of `quantity` shares at the current quote.
    pub fn get_cost(
        env: Env,
        market_id: u32,
        option_id: u32,
        quantity: i128,
    ) -> Result<i128, AmmError> {
        Self::require_initialized(&env)?;
        let option = Self::load_option(&env, market_id, option_id)?;
        pricing::spot_cost(option.price, quantity)
    }

    /// Get a market record.
    pub fn get_market(env: Env, market_id: u32) -> Result<Market, AmmError> {
        Self::require_initialized(&env)?;
        Self::load_market(&env, market_id)
    }

    /// Get several market records by id.
    pub fn get_markets(env: Env, market_ids: Vec<u32>) -> Result<Vec<Market>, AmmError> {
        Self::require_initialized(&env)?;
        let mut out = Vec::new(&env);
        for id in market_ids.iter() {
            out.push_back(Self::load_market(&env, id)?);
        }
        Ok(out)
    }

    /// Get an option record.
    pub fn get_option(env: Env, market_id: u32, option_id: u32) -> Result<MarketOption, AmmError> {
        Self::require_initialized(&env)?;
        Self::load_option(&env, market_id, option_id)
    }

    /// A user's share balance for every option of a market, by option id.
    pub fn get_user_shares(env: Env, market_id: u32, user: Address) -> Result<Vec<i128>, AmmError> {
        Self::require_initialized(&env)?;
        let market = Self::load_market(&env, market_id)?;
        let mut out = Vec::new(&env);
        for option_id in 0..market.option_count {
            let balance: i128 = env
                .storage()
                .persistent()
                .get(&DataKey::Shares(market_id, user.clone(), option_id))
                .unwrap_or(0);
            out.push_back(balance);
        }
        Ok(out)
    }

    /// Whether a user has already claimed their winnings for a market.
    pub fn has_claimed(env: Env, market_id: u32, user: Address) -> bool {
        env.storage()
            .persistent()
            .get(&DataKey::Claimed(market_id, user))
            .unwrap_or(false)
    }

    /// Most recent `count` trades of a market, oldest-first within the
    /// returned window.
    pub fn get_trade_history(env: Env, market_id: u32, count: u32) -> Vec<Trade> {
        let trades: Vec<Trade> = env
            .storage()
            .persistent()
            .get(&DataKey::Trades(market_id))
            .unwrap_or(Vec::new(&env));
        let len = trades.len();
        let start = len.saturating_sub(count);
        trades.slice(start..len)
    }

    /// Most recent `count` price points of an option, oldest-first within the
    /// returned window.
    pub fn get_price_history(
        env: Env,
        market_id: u32,
        option_id: u32,
        count: u32,
    ) -> Vec<PricePoint> {
        let points: Vec<PricePoint> = env
            .storage()
            .persistent()
            .get(&DataKey::PriceHistory(market_id, option_id))
            .unwrap_or(Vec::new(&env));
        let len = points.len();
        let start = len.saturating_sub(count);
        points.slice(start..len)
    }

    /// A user's aggregate portfolio statistics.
    pub fn get_portfolio(env: Env, user: Address) -> Portfolio {
        Self::portfolio_of(&env, &user)
    }

    /// Paginated leaderboard over the global participant list, in enrollment
    /// order. A window overrunning the end returns a shorter slice.
    pub fn get_leaderboard(
        env: Env,
        start: u32,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, AmmError> {
        Self::require_initialized(&env)?;

        let all: Vec<Address> = env
            .storage()
            .instance()
            .get(&DataKey::AllParticipants)
            .ok_or(AmmError::StorageCorrupted)?;
        if start >= all.len() {
            return Err(AmmError::OutOfRange);
        }

        let end = u32::min(start.checked_add(limit).unwrap_or(u32::MAX), all.len());
        let mut out = Vec::new(&env);
        for i in start..end {
            let user = all.get(i).ok_or(AmmError::StorageCorrupted)?;
            let portfolio = Self::portfolio_of(&env, &user);
            let win_rate = if portfolio.invested > 0 {
                portfolio
                    .winnings
                    .checked_mul(100)
                    .ok_or(AmmError::Overflow)?
                    .checked_div(portfolio.invested)
                    .ok_or(AmmError::Overflow)?
            } else {
                0
            };
            out.push_back(LeaderboardEntry {
                user,
                winnings: portfolio.winnings,
                invested: portfolio.invested,
                trade_count: portfolio.trade_count,
                win_rate,
            });
        }

        Ok(out)
    }

    /// Derived lifecycle state of a market.
    pub fn get_status(env: Env, market_id: u32) -> Result<MarketStatus, AmmError> {
        Self::require_initialized(&env)?;
        let market = Self::load_market(&env, market_id)?;

        if !market.resolved {
            if env.ledger().timestamp() < market.end_time {
                return Ok(MarketStatus::Open);
            }
            return Ok(MarketStatus::Locked);
        }
        if market.disputed {
            return Ok(MarketStatus::Disputed);
        }
        Ok(MarketStatus::Claimable)
    }

    /// The dispute reason, if the market has been disputed.
    pub fn get_dispute_reason(env: Env, market_id: u32) -> Option<String> {
        env.storage()
            .persistent()
            .get(&DataKey::DisputeReason(market_id))
    }

    /// Number of markets created.
    pub fn market_count(env: Env) -> Result<u32, AmmError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::MarketCount)
            .ok_or(AmmError::StorageCorrupted)
    }

    /// Market ids carrying a category tag.
    pub fn markets_by_category(env: Env, category: String) -> Vec<u32> {
        env.storage()
            .persistent()
            .get(&DataKey::Category(category))
            .unwrap_or(Vec::new(&env))
    }

    /// Number of enrolled participants in a market.
    pub fn participant_count(env: Env, market_id: u32) -> Result<u32, AmmError> {
        Self::require_initialized(&env)?;
        Self::load_market(&env, market_id)?;
        let participants: Vec<Address> = env
            .storage()
            .persistent()
            .get(&DataKey::Participants(market_id))
            .ok_or(AmmError::StorageCorrupted)?;
        Ok(participants.len())
    }

    /// Get the admin address.
    pub fn get_admin(env: Env) -> Result<Address, AmmError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(AmmError::StorageCorrupted)
    }

    /// Get the collateral token address.
    pub fn get_token(env: Env) -> Result<Address, AmmError> {
        Self::require_initialized(&env)?;
        Self::token(&env)
    }

    /// Get the bonding-curve damping constant.
    pub fn get_liquidity_k(env: Env) -> Result<i128, AmmError> {
        Self::require_initialized(&env)?;
        Self::liquidity_k(&env)
    }

    // --- Internal helpers ---

    fn require_initialized(env: &Env) -> Result<(), AmmError> {
        if !env.storage().instance().has(&DataKey::Admin) {
            return Err(AmmError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), AmmError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(AmmError::StorageCorrupted)?;
        if *caller != admin {
            return Err(AmmError::Unauthorized);
        }
        Ok(())
    }

    fn token(env: &Env) -> Result<Address, AmmError> {
        env.storage()
            .instance()
            .get(&DataKey::Token)
            .ok_or(AmmError::StorageCorrupted)
    }

    fn liquidity_k(env: &Env) -> Result<i128, AmmError> {
        env.storage()
            .instance()
            .get(&DataKey::LiquidityK)
            .ok_or(AmmError::StorageCorrupted)
    }

    fn load_market(env: &Env, market_id: u32) -> Result<Market, AmmError> {
        env.storage()
            .persistent()
            .get(&DataKey::Market(market_id))
            .ok_or(AmmError::MarketNotFound)
    }

    fn load_option(env: &Env, market_id: u32, option_id: u32) -> Result<MarketOption, AmmError> {
        env.storage()
            .persistent()
            .get(&DataKey::OptionData(market_id, option_id))
            .ok_or(AmmError::OptionNotFound)
    }

    fn portfolio_of(env: &Env, user: &Address) -> Portfolio {
        env.storage()
            .persistent()
            .get(&DataKey::Portfolio(user.clone()))
            .unwrap_or(Portfolio {
                invested: 0,
                winnings: 0,
                realized_pnl: 0,
                trade_count: 0,
            })
    }

    fn credit_fee_pool(env: &Env, fee: i128) -> Result<(), AmmError> {
        let fees: i128 = env
            .storage()
            .instance()
            .get(&DataKey::FeePool)
            .ok_or(AmmError::StorageCorrupted)?;
        env.storage()
            .instance()
            .set(&DataKey::FeePool, &(fees.checked_add(fee).ok_or(AmmError::Overflow)?));
        Ok(())
    }

    /// Append the immutable trade snapshot and its price-series sample.
    fn record_trade(env: &Env, market_id: u32, trade: &Trade, new_price: i128, value: i128) {
        let mut trades: Vec<Trade> = env
            .storage()
            .persistent()
            .get(&DataKey::Trades(market_id))
            .unwrap_or(Vec::new(env));
        trades.push_back(trade.clone());
        env.storage()
            .persistent()
            .set(&DataKey::Trades(market_id), &trades);

        let mut points: Vec<PricePoint> = env
            .storage()
            .persistent()
            .get(&DataKey::PriceHistory(market_id, trade.option_id))
            .unwrap_or(Vec::new(env));
        points.push_back(PricePoint {
            price: new_price,
            timestamp: trade.timestamp,
            volume: value,
        });
        env.storage()
            .persistent()
            .set(&DataKey::PriceHistory(market_id, trade.option_id), &points);
    }

    /// Enroll once per market (first trade in the market) and once globally
    /// (first trade in any market).
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

        let known_key = DataKey::Known(user.clone());
        if !env.storage().persistent().get(&known_key).unwrap_or(false) {
            let mut all: Vec<Address> = env
                .storage()
                .instance()
                .get(&DataKey::AllParticipants)
                .unwrap_or(Vec::new(env));
            all.push_back(user.clone());
            env.storage().instance().set(&DataKey::AllParticipants, &all);
            env.storage().persistent().set(&known_key, &true);
        }
    }

    fn acquire_lock(env: &Env) -> Result<(), AmmError> {
        if env.storage().instance().get(&DataKey::Locked).unwrap_or(false) {
            return Err(AmmError::ReentrancyGuard);
        }
        env.storage().instance().set(&DataKey::Locked, &true);
        Ok(())
    }

    fn release_lock(env: &Env) {
        env.storage().instance().set(&DataKey::Locked, &false);
    }
}
