use anchor_lang::prelude::*;
use instructions::*;

pub mod error;
pub mod instructions;
pub mod state;

declare_id!("9nJE8Pp1f57hZQ3qz9ki3AVnYHZ4ps4vRemFzoXHia3g");

#[program]
pub mod auto_raffle {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
        instructions::initialize::initialize(ctx, params)
    }

    pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
        instructions::enter_raffle::enter_raffle(ctx, amount)
    }

    pub fn set_forwarder_address(
        ctx: Context<SetForwarderAddress>,
        forwarder: Pubkey,
    ) -> Result<()> {
        instructions::set_forwarder_address::set_forwarder_address(ctx, forwarder)
    }

    pub fn check_upkeep(ctx: Context<CheckUpkeep>, check_data: Vec<u8>) -> Result<bool> {
        instructions::check_upkeep::check_upkeep(ctx, check_data)
    }

    pub fn perform_upkeep(ctx: Context<PerformUpkeep>, perform_data: Vec<u8>) -> Result<()> {
        instructions::perform_upkeep::perform_upkeep(ctx, perform_data)
    }

    pub fn fulfill_random_words(
        ctx: Context<FulfillRandomWords>,
        request_id: u64,
        random_words: Vec<[u8; 32]>,
    ) -> Result<()> {
        instructions::fulfill_random_words::fulfill_random_words(ctx, request_id, random_words)
    }
}
