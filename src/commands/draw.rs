use crate::models::pool::Pool;
use anyhow::Error;
use itertools::Itertools;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use structopt::StructOpt;

/// Draw tiles from a fresh 144-tile pool
#[derive(Debug, StructOpt)]
pub struct Draw {
    /// How many tiles to draw
    n: usize,
    /// Seed for the random draw, for reproducible hands
    #[structopt(long)]
    seed: Option<u64>,
}

pub fn draw(cmd: Draw) -> Result<(), Error> {
    let mut rng = match cmd.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut pool = Pool::full();
    let letters = pool.draw(cmd.n, &mut rng);

    println!("{}", letters.iter().format(""));
    log::info!("{} tiles remain in the pool", pool.len());
    Ok(())
}
