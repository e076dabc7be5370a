use anchor_lang::prelude::*;

use crate::{error::RaffleError, state::Raffle};

/// Event emitted when the upkeep forwarder is configured
#[event]
pub struct ForwarderSet {
    pub raffle: Pubkey,
    pub forwarder: Pubkey,
}

/// Instruction to configure the relay allowed to perform upkeep
///
/// # Security Considerations
/// - Only the owner recorded at initialization may call this
/// - The forwarder is set once and locked; a second call fails with `ForwarderAlreadySet`
pub fn set_forwarder_address(ctx: Context<SetForwarderAddress>, forwarder: Pubkey) -> Result<()> {
    ctx.accounts.raffle.set_forwarder(forwarder)?;

    msg!("Forwarder set: {}", forwarder);

    emit!(ForwarderSet {
        raffle: ctx.accounts.raffle.key(),
        forwarder,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct SetForwarderAddress<'info> {
    #[account(
        mut,
        seeds = [b"raffle"],
        bump = raffle.bump,
        has_one = owner @ RaffleError::NotOwner,
    )]
    pub raffle: Account<'info, Raffle>,

    pub owner: Signer<'info>,
}
