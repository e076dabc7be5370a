use anchor_lang::error_code;

#[error_code]
pub enum RaffleError {
    Overflow,
    InvalidTreasury,
    #[msg("Entrance fee must be greater than zero")]
    EntranceFeeTooLow,
    #[msg("Amount entered is below the entrance fee")]
    NotEnoughLamportsEntered,
    #[msg("Raffle is not accepting entries")]
    RaffleNotOpen,
    #[msg("Maximum number of players reached for this round")]
    RaffleFull,
    #[msg("Upkeep can only be checked from a simulated transaction")]
    OnlySimulatedBackend,
    #[msg("Only the owner can configure the forwarder")]
    NotOwner,
    #[msg("Forwarder address has already been configured")]
    ForwarderAlreadySet,
    #[msg("Only the configured forwarder can perform upkeep")]
    OnlyForwarder,
    #[msg("Upkeep conditions are not met")]
    UpkeepNotNeeded,
    #[msg("Only the VRF coordinator can fulfill randomness")]
    OnlyCoordinator,
    #[msg("Request id does not match the pending randomness request")]
    InvalidRequest,
    #[msg("Fulfillment carried no random words")]
    MissingRandomWords,
    #[msg("No players to draw a winner from")]
    NoPlayers,
    #[msg("Winner account does not match the drawn player")]
    WinnerAccountMismatch,
    #[msg("Prize transfer failed")]
    TransferFailed,
}
