//! # Validate Subcommand
//!
//! Checks a VIN locally; no network access.

use clap::Args;

/// Arguments for `vhr validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Candidate VIN. Case and separators are normalized.
    pub vin: String,
}

/// Print the normalized VIN on stdout, or the rejection on stderr.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<u8> {
    match vhr_core::validate_vin(&args.vin) {
        Ok(vin) => {
            println!("{vin}");
            Ok(0)
        }
        Err(e) => {
            tracing::debug!(input = %args.vin, error = ?e, "VIN rejected");
            eprintln!("{e}");
            Ok(1)
        }
    }
}
