use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{pooled_lamports, Raffle, Treasury},
};

// Fixed request configuration sent to the VRF coordinator
pub const REQUEST_CONFIRMATIONS: u16 = 3;
pub const NUM_WORDS: u32 = 1;
pub const CALLBACK_COMPUTE_LIMIT: u32 = 200_000;

/// Event emitted when a round is locked and randomness is requested.
/// The VRF coordinator picks the request up from this event and answers
/// through `fulfill_random_words`.
#[event]
pub struct RandomnessRequested {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// Identifier the fulfillment must echo back
    pub request_id: u64,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_compute_limit: u32,
    pub num_words: u32,
}

/// Advances the round: locks entries and requests randomness for the draw.
///
/// Execution requirements:
/// 1. The signer must be the configured forwarder
/// 2. Upkeep must be needed right now; the earlier simulated poll is not trusted
///
/// After execution:
/// - The raffle is in Calculating state
/// - `pending_request_id` holds the new request id
///
/// # Errors
/// - `OnlyForwarder` if the signer is not the forwarder or none is configured
/// - `UpkeepNotNeeded` if any eligibility condition fails
pub fn perform_upkeep(ctx: Context<PerformUpkeep>, _perform_data: Vec<u8>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let pool = pooled_lamports(&ctx.accounts.treasury.to_account_info())?;

    let raffle = &mut ctx.accounts.raffle;
    let request_id = raffle.open_request(&ctx.accounts.forwarder.key(), now, pool)?;

    msg!(
        "Requested randomness {} for {} players, pool {}",
        request_id,
        raffle.number_of_players(),
        pool
    );

    emit!(RandomnessRequested {
        raffle: raffle.key(),
        request_id,
        key_hash: raffle.key_hash,
        subscription_id: raffle.subscription_id,
        request_confirmations: REQUEST_CONFIRMATIONS,
        callback_compute_limit: CALLBACK_COMPUTE_LIMIT,
        num_words: NUM_WORDS,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
        has_one = treasury @ RaffleError::InvalidTreasury,
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        seeds = [
            b"treasury",
            raffle.key().as_ref(),
        ],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    /// Checked against the configured forwarder in the handler
    pub forwarder: Signer<'info>,
}
