use crate::commands::draw::{draw, Draw};
use crate::commands::peel::{peel, Peel};
use crate::commands::solve::{solve, Solve};
use crate::commands::swap::{swap, Swap};
use anyhow::Error;
use std::env;
use std::env::VarError;
use structopt::StructOpt;

mod commands;
mod dictionary;
mod models;
mod peel;
mod solver;
mod swap_analysis;
mod utils;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "peeler",
    about = "Solver for the tile game where every letter in hand must join one crossword grid."
)]
enum Opt {
    Solve(Solve),
    Peel(Peel),
    Swap(Swap),
    Draw(Draw),
}

fn main() -> Result<(), Error> {
    if let Err(VarError::NotPresent) = env::var("RUST_LOG") {
        env::set_var("RUST_LOG", "INFO");
    }
    env_logger::init();

    match Opt::from_args() {
        Opt::Solve(cmd) => solve(cmd)?,
        Opt::Peel(cmd) => peel(cmd)?,
        Opt::Swap(cmd) => swap(cmd)?,
        Opt::Draw(cmd) => draw(cmd)?,
    };

    Ok(())
}
