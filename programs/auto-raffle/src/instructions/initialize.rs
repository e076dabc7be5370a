use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    instructions::check_upkeep::find_simulation_authority,
    state::{Raffle, RaffleState, Treasury, RAFFLE_ACCOUNT_SIZE, TREASURY_ACCOUNT_SIZE},
};

/// Construction parameters, fixed for the lifetime of the raffle
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitializeParams {
    /// Lamports required per entry (must be > 0)
    pub entrance_fee: u64,
    /// Pool size in lamports required before upkeep is due
    pub min_execution_balance: u64,
    /// Minimum seconds between rounds
    pub interval: u64,
    /// Oracle key hash forwarded with every randomness request
    pub key_hash: [u8; 32],
    /// Oracle subscription billed for randomness requests
    pub subscription_id: u64,
}

/// Event emitted when the raffle is created
#[event]
pub struct RaffleInitialized {
    pub raffle: Pubkey,
    pub owner: Pubkey,
    pub vrf_coordinator: Pubkey,
    pub entrance_fee: u64,
    pub min_execution_balance: u64,
    pub interval: u64,
    pub created_at: i64,
}

/// Instruction to create the raffle singleton and its treasury
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `params` - Entrance fee, execution threshold, interval and oracle settings
///
/// # Account Validations
/// * Raffle - New PDA with seed "raffle"; only one raffle exists per deployment
/// * Treasury - New PDA with seeds ["treasury", raffle_key] holding the pool
/// * Owner - Pays for both accounts and becomes the only key allowed to set the forwarder
/// * VRF Coordinator - Recorded as the only key allowed to fulfill randomness
///
/// # Implementation Notes
/// - Starts in Open state with no players, no forwarder and no pending request
/// - The upkeep interval is measured from the creation time
pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
    require!(params.entrance_fee > 0, RaffleError::EntranceFeeTooLow);

    let current_time = Clock::get()?.unix_timestamp;

    ctx.accounts.treasury.raffle = ctx.accounts.raffle.key();
    ctx.accounts.treasury.bump = ctx.bumps.treasury;

    let raffle = &mut ctx.accounts.raffle;
    raffle.owner = ctx.accounts.owner.key();
    raffle.treasury = ctx.accounts.treasury.key();
    raffle.forwarder = None;
    raffle.vrf_coordinator = ctx.accounts.vrf_coordinator.key();
    raffle.key_hash = params.key_hash;
    raffle.subscription_id = params.subscription_id;
    raffle.raffle_state = RaffleState::Open;
    raffle.entrance_fee = params.entrance_fee;
    raffle.min_execution_balance = params.min_execution_balance;
    raffle.interval = params.interval;
    raffle.last_upkeep_timestamp = current_time;
    raffle.request_counter = 0;
    raffle.pending_request_id = None;
    raffle.recent_winner = None;
    raffle.bump = ctx.bumps.raffle;
    raffle.simulation_bump = find_simulation_authority(ctx.program_id).1;
    raffle.players = Vec::new();

    msg!(
        "Raffle initialized: fee {} interval {}s",
        raffle.entrance_fee,
        raffle.interval
    );

    emit!(RaffleInitialized {
        raffle: raffle.key(),
        owner: raffle.owner,
        vrf_coordinator: raffle.vrf_coordinator,
        entrance_fee: raffle.entrance_fee,
        min_execution_balance: raffle.min_execution_balance,
        interval: raffle.interval,
        created_at: current_time,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = owner,
        space = RAFFLE_ACCOUNT_SIZE,
        seeds = [b"raffle"],
        bump
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        init,
        payer = owner,
        space = TREASURY_ACCOUNT_SIZE,
        seeds = [
            b"treasury",
            raffle.key().as_ref(),
        ],
        bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: Only the address is stored; fulfillments must later be signed by it.
    pub vrf_coordinator: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}
