use anchor_lang::prelude::*;

use crate::error::RaffleError;

// 8 discriminator, 32 pubkey, 1 bump
pub const TREASURY_ACCOUNT_SIZE: usize = 8 + 32 + 1;

/// Program-owned vault holding every lamport entered in the current round.
/// Only the rent-exempt reserve stays behind when a winner is paid.
#[account]
pub struct Treasury {
    pub raffle: Pubkey,
    pub bump: u8,
}

/// Rent-exempt minimum the treasury keeps across rounds.
pub fn treasury_reserve() -> Result<u64> {
    Ok(Rent::get()?.minimum_balance(TREASURY_ACCOUNT_SIZE))
}

/// Lamports in the treasury above its rent-exempt reserve, i.e. the prize pool.
pub fn pooled_lamports(treasury: &AccountInfo) -> Result<u64> {
    Ok(pool_above_reserve(treasury.lamports(), treasury_reserve()?))
}

pub fn pool_above_reserve(balance: u64, reserve: u64) -> u64 {
    balance.saturating_sub(reserve)
}

/// Checks that a deposit of `amount` landed in the treasury in full.
pub fn verify_deposit(balance_before: u64, balance_after: u64, amount: u64) -> Result<()> {
    require!(
        balance_after
            == balance_before
                .checked_add(amount)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::TransferFailed
    );
    Ok(())
}

/// Moves `amount` lamports from the treasury to the winner.
///
/// Debiting works because the treasury is owned by this program; crediting is
/// allowed on any writable account. Any failure surfaces as `TransferFailed`
/// and aborts the instruction, leaving the round untouched.
///
/// The runtime also rejects a credit that leaves the winner account funded
/// but below its rent-exempt minimum, e.g. a small prize sent to a winner
/// that closed its account after entering. The draw is fixed by the random
/// word, so every retry selects the same winner and fails the same way: the
/// raffle stays `Calculating` until the winner account is funded again.
pub fn pay_out<'info>(
    treasury: &AccountInfo<'info>,
    winner: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let expected_balance = winner
        .lamports()
        .checked_add(amount)
        .ok_or(RaffleError::Overflow)?;

    treasury
        .sub_lamports(amount)
        .map_err(|_| RaffleError::TransferFailed)?;
    winner
        .add_lamports(amount)
        .map_err(|_| RaffleError::TransferFailed)?;

    require!(
        winner.lamports() == expected_balance,
        RaffleError::TransferFailed
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    #[test]
    fn pay_out_moves_the_whole_amount() {
        let treasury_key = Pubkey::new_unique();
        let winner_key = Pubkey::new_unique();
        let system = Pubkey::default();
        let mut treasury_lamports = 1_000_000 + 5_000;
        let mut winner_lamports = 42;
        let mut treasury_data: [u8; 0] = [];
        let mut winner_data: [u8; 0] = [];

        let treasury = AccountInfo::new(
            &treasury_key,
            false,
            true,
            &mut treasury_lamports,
            &mut treasury_data,
            &crate::ID,
            false,
            0,
        );
        let winner = AccountInfo::new(
            &winner_key,
            false,
            true,
            &mut winner_lamports,
            &mut winner_data,
            &system,
            false,
            0,
        );

        pay_out(&treasury, &winner, 1_000_000).unwrap();

        assert_eq!(treasury.lamports(), 5_000);
        assert_eq!(winner.lamports(), 1_000_042);
    }

    #[test]
    fn pay_out_fails_when_the_treasury_is_short() {
        let treasury_key = Pubkey::new_unique();
        let winner_key = Pubkey::new_unique();
        let system = Pubkey::default();
        let mut treasury_lamports = 10;
        let mut winner_lamports = 0;
        let mut treasury_data: [u8; 0] = [];
        let mut winner_data: [u8; 0] = [];

        let treasury = AccountInfo::new(
            &treasury_key,
            false,
            true,
            &mut treasury_lamports,
            &mut treasury_data,
            &crate::ID,
            false,
            0,
        );
        let winner = AccountInfo::new(
            &winner_key,
            false,
            true,
            &mut winner_lamports,
            &mut winner_data,
            &system,
            false,
            0,
        );

        let err = pay_out(&treasury, &winner, 11).unwrap_err();

        assert_eq!(err, Error::from(RaffleError::TransferFailed));
        assert_eq!(treasury.lamports(), 10);
        assert_eq!(winner.lamports(), 0);
    }

    #[test]
    fn pool_excludes_the_rent_reserve() {
        let reserve = 946_560;

        assert_eq!(pool_above_reserve(reserve - 1, reserve), 0);
        assert_eq!(pool_above_reserve(reserve, reserve), 0);
        assert_eq!(pool_above_reserve(reserve + 1, reserve), 1);
        assert_eq!(pool_above_reserve(reserve + 1_650_000_000, reserve), 1_650_000_000);
        assert_eq!(pool_above_reserve(0, 0), 0);
    }

    #[test]
    fn deposit_must_arrive_in_full() {
        verify_deposit(1_000, 1_500, 500).unwrap();

        let short = verify_deposit(1_000, 1_499, 500).unwrap_err();
        let missing = verify_deposit(1_000, 1_000, 500).unwrap_err();
        let overflow = verify_deposit(u64::MAX, u64::MAX, 1).unwrap_err();

        assert_eq!(short, Error::from(RaffleError::TransferFailed));
        assert_eq!(missing, Error::from(RaffleError::TransferFailed));
        assert_eq!(overflow, Error::from(RaffleError::Overflow));
    }
}
