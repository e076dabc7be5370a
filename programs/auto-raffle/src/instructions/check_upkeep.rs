use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::{pooled_lamports, Raffle, Treasury},
};

/// Seed of the off-curve address automation nodes sign with when simulating.
pub const SIMULATION_SEED: &[u8] = b"simulation";

/// Address and bump of the signer `check_upkeep` requires.
///
/// It is a PDA of this program, so no private key exists for it and the
/// program never signs for it. Only a simulated transaction with signature
/// verification disabled can present it as a signer. The bump is stored on
/// the raffle at initialization.
pub fn find_simulation_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SIMULATION_SEED], program_id)
}

/// Fails with `OnlySimulatedBackend` unless `simulator` is the simulation
/// authority derived from `bump` and is marked as a signer.
pub fn require_simulated(simulator: &AccountInfo, program_id: &Pubkey, bump: u8) -> Result<()> {
    let authority = Pubkey::create_program_address(&[SIMULATION_SEED, &[bump]], program_id)
        .map_err(|_| RaffleError::OnlySimulatedBackend)?;

    require!(
        simulator.is_signer && *simulator.key == authority,
        RaffleError::OnlySimulatedBackend
    );

    Ok(())
}

/// Read-only poll used by the automation network to decide whether to call
/// `perform_upkeep`. The answer is returned as instruction return data.
///
/// # Errors
/// - `OnlySimulatedBackend` unless `simulator` is the simulation authority and marked signer
pub fn check_upkeep(ctx: Context<CheckUpkeep>, _check_data: Vec<u8>) -> Result<bool> {
    require_simulated(
        &ctx.accounts.simulator.to_account_info(),
        ctx.program_id,
        ctx.accounts.raffle.simulation_bump,
    )?;

    let now = Clock::get()?.unix_timestamp;
    let pool = pooled_lamports(&ctx.accounts.treasury.to_account_info())?;
    let upkeep_needed = ctx.accounts.raffle.upkeep_needed(now, pool);

    msg!("Upkeep needed: {}", upkeep_needed);

    Ok(upkeep_needed)
}

#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(
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

    /// CHECK: Compared against the simulation authority in the handler.
    pub simulator: UncheckedAccount<'info>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn check(key: &Pubkey, is_signer: bool, bump: u8) -> Result<()> {
        let owner = Pubkey::default();
        let mut lamports = 0;
        let mut data: [u8; 0] = [];
        let simulator = AccountInfo::new(
            key,
            is_signer,
            false,
            &mut lamports,
            &mut data,
            &owner,
            false,
            0,
        );

        require_simulated(&simulator, &crate::ID, bump)
    }

    #[test]
    fn simulation_authority_is_off_curve() {
        let (authority, bump) = find_simulation_authority(&crate::ID);

        assert!(!authority.is_on_curve());
        assert_eq!(
            Pubkey::create_program_address(&[SIMULATION_SEED, &[bump]], &crate::ID).unwrap(),
            authority
        );
        assert_ne!(authority, find_simulation_authority(&Pubkey::new_unique()).0);
    }

    #[test]
    fn simulation_authority_signer_passes() {
        let (authority, bump) = find_simulation_authority(&crate::ID);

        check(&authority, true, bump).unwrap();
    }

    #[test]
    fn simulation_authority_must_sign() {
        let (authority, bump) = find_simulation_authority(&crate::ID);

        let err = check(&authority, false, bump).unwrap_err();

        assert_eq!(err, Error::from(RaffleError::OnlySimulatedBackend));
    }

    #[test]
    fn other_signers_are_rejected() {
        let (_, bump) = find_simulation_authority(&crate::ID);

        let err = check(&Pubkey::new_unique(), true, bump).unwrap_err();

        assert_eq!(err, Error::from(RaffleError::OnlySimulatedBackend));
    }

    #[test]
    fn wrong_bump_is_rejected() {
        let (authority, bump) = find_simulation_authority(&crate::ID);

        let err = check(&authority, true, bump.wrapping_sub(1)).unwrap_err();

        assert_eq!(err, Error::from(RaffleError::OnlySimulatedBackend));
    }
}
