//! Command-line host for the wallet

pub mod commands;

pub use commands::{
    cmd_confirm, cmd_deposit, cmd_events, cmd_execute, cmd_init, cmd_owners, cmd_revoke,
    cmd_show, cmd_submit, parse_data, AppState, CliResult, InitOptions,
};
