//! oofcanvas
//!
//! Renders, exports and inspects scene files from the command line.

// Modules
pub(crate) mod cli;
pub(crate) mod export;
pub(crate) mod inspect;
pub(crate) mod validators;

// Renames
extern crate nalgebra as na;

fn main() -> anyhow::Result<()> {
    cli::setup_tracing();
    smol::block_on(async { cli::run().await })
}
