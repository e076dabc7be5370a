use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{pay_out, pool_above_reserve, treasury_reserve, Raffle, Treasury},
};

/// Event emitted when a round is settled
#[event]
pub struct WinnerPicked {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The winner's address
    pub winner: Pubkey,
    /// The request this draw answered
    pub request_id: u64,
    /// Position of the winner in the round's entry order
    pub winner_index: u64,
    /// Lamports paid out
    pub prize: u64,
}

/// Callback through which the VRF coordinator delivers randomness.
///
/// Execution requirements:
/// 1. The signer must be the coordinator recorded at initialization
/// 2. `request_id` must equal the pending request
/// 3. `winner` must be the player at `random_words[0] mod players.len()`
///
/// After execution:
/// - The whole pool has been moved to the winner
/// - Players are cleared, the raffle is Open again and the interval restarts
/// - The pending request is consumed, so replaying the fulfillment fails
///
/// # Errors
/// - `OnlyCoordinator` if the signer is not the VRF coordinator
/// - `InvalidRequest` for unknown, stale or already consumed request ids
/// - `MissingRandomWords` if no random word was supplied
/// - `WinnerAccountMismatch` if `winner` is not the drawn player
/// - `TransferFailed` if the prize could not be moved; nothing is reset
pub fn fulfill_random_words(
    ctx: Context<FulfillRandomWords>,
    request_id: u64,
    random_words: Vec<[u8; 32]>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let reserve = treasury_reserve()?;

    let Settlement {
        winner,
        winner_index,
        prize,
    } = settle_round(
        &mut ctx.accounts.raffle,
        &ctx.accounts.treasury.to_account_info(),
        &ctx.accounts.winner.to_account_info(),
        request_id,
        &random_words,
        reserve,
        now,
    )?;

    msg!(
        "Winner picked: {} (index {}), prize {}",
        winner,
        winner_index,
        prize
    );

    emit!(WinnerPicked {
        raffle: ctx.accounts.raffle.key(),
        winner,
        request_id,
        winner_index,
        prize,
    });

    Ok(())
}

/// Outcome of a settled round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub winner: Pubkey,
    pub winner_index: u64,
    pub prize: u64,
}

/// Draws the winner, pays everything above `reserve` from `treasury` to
/// `winner_account` and reopens the raffle.
///
/// The winner account is checked before any lamports move, and the raffle is
/// only reset after the payout succeeded.
pub fn settle_round<'info>(
    raffle: &mut Raffle,
    treasury: &AccountInfo<'info>,
    winner_account: &AccountInfo<'info>,
    request_id: u64,
    random_words: &[[u8; 32]],
    reserve: u64,
    now: i64,
) -> Result<Settlement> {
    let (winner_index, winner) = raffle.draw_winner(request_id, random_words)?;
    require_keys_eq!(
        *winner_account.key,
        winner,
        RaffleError::WinnerAccountMismatch
    );

    let prize = pool_above_reserve(treasury.lamports(), reserve);
    pay_out(treasury, winner_account, prize)?;

    raffle.close_round(winner, now);

    Ok(Settlement {
        winner,
        winner_index,
        prize,
    })
}

#[derive(Accounts)]
pub struct FulfillRandomWords<'info> {
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
        has_one = treasury @ RaffleError::InvalidTreasury,
        has_one = vrf_coordinator @ RaffleError::OnlyCoordinator,
    )]
    pub raffle: Account<'info, Raffle>,

    /// Treasury PDA holding the pool
    #[account(
        mut,
        seeds = [
            b"treasury",
            raffle.key().as_ref(),
        ],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    pub vrf_coordinator: Signer<'info>,

    /// CHECK: Must equal the drawn player, verified in the handler before any lamports move.
    #[account(mut)]
    pub winner: UncheckedAccount<'info>,
}
