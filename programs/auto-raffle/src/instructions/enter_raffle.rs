use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{verify_deposit, Raffle, Treasury},
};

/// Event emitted when a player enters the current round
#[event]
pub struct EntryRecorded {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The player's address
    pub player: Pubkey,
    /// Amount paid in lamports
    pub amount: u64,
    /// Number of entries in the round after this one
    pub number_of_players: u64,
}

/// Instruction to enter the current round
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `amount` - Lamports to pay, at least the entrance fee
///
/// # Security Considerations
/// 1. Rejects amounts below the entrance fee
/// 2. Rejects entries while a randomness request is pending
/// 3. Verifies the treasury received exactly `amount` lamports
///
/// # Implementation Notes
/// - Updates state before performing the transfer
/// - Every lamport above the fee also goes to the pool
pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
    let player = ctx.accounts.player.key();
    ctx.accounts.raffle.record_entry(player, amount)?;

    // Store pre-transfer balance for verification
    let pre_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();

    anchor_lang::solana_program::program::invoke(
        &anchor_lang::solana_program::system_instruction::transfer(
            &player,
            &ctx.accounts.treasury.key(),
            amount,
        ),
        &[
            ctx.accounts.player.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
            ctx.accounts.treasury.to_account_info(),
        ],
    )?;

    let post_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();
    verify_deposit(pre_transfer_balance, post_transfer_balance, amount)?;

    emit!(EntryRecorded {
        raffle: ctx.accounts.raffle.key(),
        player,
        amount,
        number_of_players: ctx.accounts.raffle.number_of_players(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EnterRaffle<'info> {
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
        has_one = treasury @ RaffleError::InvalidTreasury,
    )]
    pub raffle: Account<'info, Raffle>,

    /// Treasury PDA that receives the entry
    #[account(
        mut,
        seeds = [
            b"treasury",
            raffle.key().as_ref(),
        ],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}
