use anchor_lang::prelude::*;
use arrayref::array_refs;

use crate::error::RaffleError;

/// Most entries a single round can hold. Bounded so the raffle account stays
/// under the 10 KiB limit for accounts created through `init`.
pub const MAX_PLAYERS: usize = 250;

// Space calculation:
// 8 (discriminator) +
// 32 (owner) +
// 32 (treasury) +
// 33 (forwarder: Option<Pubkey>) +
// 32 (vrf_coordinator) +
// 32 (key_hash) +
// 8 (subscription_id) +
// 1 (raffle_state) +
// 8 (entrance_fee) +
// 8 (min_execution_balance) +
// 8 (interval) +
// 8 (last_upkeep_timestamp) +
// 8 (request_counter) +
// 9 (pending_request_id: Option<u64>) +
// 33 (recent_winner: Option<Pubkey>) +
// 1 (bump) +
// 1 (simulation_bump) +
// 4 + 32 * MAX_PLAYERS (players) =
// 8266 total bytes
pub const RAFFLE_ACCOUNT_SIZE: usize =
    8 + 32 + 32 + 33 + 32 + 32 + 8 + 1 + 8 + 8 + 8 + 8 + 8 + 9 + 33 + 1 + 1 + 4 + 32 * MAX_PLAYERS;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    Open = 0,
    Calculating = 1,
}

#[account]
pub struct Raffle {
    /// Deploying authority, allowed to configure the forwarder once.
    pub owner: Pubkey,
    pub treasury: Pubkey,
    /// Relay allowed to perform upkeep. `None` until configured.
    pub forwarder: Option<Pubkey>,
    /// Oracle key allowed to deliver randomness.
    pub vrf_coordinator: Pubkey,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub raffle_state: RaffleState,
    /// Lamports required per entry.
    pub entrance_fee: u64,
    /// Pool size in lamports required before upkeep is due.
    pub min_execution_balance: u64,
    /// Seconds between rounds.
    pub interval: u64,
    pub last_upkeep_timestamp: i64,
    pub request_counter: u64,
    pub pending_request_id: Option<u64>,
    pub recent_winner: Option<Pubkey>,
    pub bump: u8,
    /// Bump of the simulation authority PDA checked by `check_upkeep`.
    pub simulation_bump: u8,
    /// Entrants of the current round in entry order.
    pub players: Vec<Pubkey>,
}

impl Raffle {
    /// Appends `player` to the current round.
    pub fn record_entry(&mut self, player: Pubkey, amount: u64) -> Result<()> {
        require!(
            amount >= self.entrance_fee,
            RaffleError::NotEnoughLamportsEntered
        );
        require!(
            self.raffle_state == RaffleState::Open,
            RaffleError::RaffleNotOpen
        );
        require!(self.players.len() < MAX_PLAYERS, RaffleError::RaffleFull);

        self.players.push(player);
        Ok(())
    }

    /// Whether the round should advance at `now` with `pool` lamports collected.
    ///
    /// True only when the raffle is open, at least `interval` seconds have
    /// passed since the last upkeep, the pool has reached
    /// `min_execution_balance` and at least one player entered. Both bounds
    /// are inclusive.
    pub fn upkeep_needed(&self, now: i64, pool: u64) -> bool {
        let is_open = self.raffle_state == RaffleState::Open;
        let time_passed = self.seconds_since_upkeep(now) >= self.interval;
        let has_balance = pool >= self.min_execution_balance;
        let has_players = !self.players.is_empty();

        is_open && time_passed && has_balance && has_players
    }

    fn seconds_since_upkeep(&self, now: i64) -> u64 {
        u64::try_from(now.saturating_sub(self.last_upkeep_timestamp)).unwrap_or(0)
    }

    pub fn set_forwarder(&mut self, forwarder: Pubkey) -> Result<()> {
        require!(self.forwarder.is_none(), RaffleError::ForwarderAlreadySet);
        self.forwarder = Some(forwarder);
        Ok(())
    }

    pub fn is_forwarder(&self, caller: &Pubkey) -> bool {
        self.forwarder.as_ref() == Some(caller)
    }

    /// Locks the round and allocates the id of a new randomness request.
    ///
    /// Eligibility is evaluated again here; whatever the automation network
    /// saw during simulation is only advisory.
    pub fn open_request(&mut self, caller: &Pubkey, now: i64, pool: u64) -> Result<u64> {
        require!(self.is_forwarder(caller), RaffleError::OnlyForwarder);
        require!(self.upkeep_needed(now, pool), RaffleError::UpkeepNotNeeded);

        let request_id = self
            .request_counter
            .checked_add(1)
            .ok_or(RaffleError::Overflow)?;

        self.request_counter = request_id;
        self.pending_request_id = Some(request_id);
        self.raffle_state = RaffleState::Calculating;

        Ok(request_id)
    }

    /// Resolves the winner for a fulfillment without touching state.
    ///
    /// Returns the index into `players` and the winning key.
    pub fn draw_winner(
        &self,
        request_id: u64,
        random_words: &[[u8; 32]],
    ) -> Result<(u64, Pubkey)> {
        require!(
            self.raffle_state == RaffleState::Calculating
                && self.pending_request_id == Some(request_id),
            RaffleError::InvalidRequest
        );

        let word = random_words
            .first()
            .ok_or(RaffleError::MissingRandomWords)?;
        let winner_index = reduce_random_word(word, self.number_of_players())?;
        let winner = self
            .player(winner_index)
            .ok_or(RaffleError::NoPlayers)?;

        Ok((winner_index, winner))
    }

    /// Resets the raffle for the next round once `winner` has been paid.
    pub fn close_round(&mut self, winner: Pubkey, now: i64) {
        self.players.clear();
        self.raffle_state = RaffleState::Open;
        self.last_upkeep_timestamp = now;
        self.pending_request_id = None;
        self.recent_winner = Some(winner);
    }

    pub fn player(&self, index: u64) -> Option<Pubkey> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.players.get(index))
            .copied()
    }

    pub fn number_of_players(&self) -> u64 {
        self.players.len() as u64
    }
}

/// Reduces a 256-bit big-endian random word modulo `modulus`.
///
/// Folds the word in 64-bit limbs so the result is exact over the full width
/// rather than over a truncated prefix.
pub fn reduce_random_word(word: &[u8; 32], modulus: u64) -> Result<u64> {
    require!(modulus > 0, RaffleError::NoPlayers);

    let (a, b, c, d) = array_refs![word, 8, 8, 8, 8];
    let modulus = modulus as u128;
    let remainder = [a, b, c, d].into_iter().fold(0u128, |acc, limb| {
        ((acc << 64) | u64::from_be_bytes(*limb) as u128) % modulus
    });

    Ok(remainder as u64)
}
