pub mod cli;
pub mod memory;
pub mod production;

use serde::Serialize;
use vidplan_core::api::CliError;

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    println!("{out}");
    Ok(())
}
