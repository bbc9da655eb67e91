//! Entertainment command handlers.
//!
//! A ten-pull gacha luck draw, dice rolls and a wake-up call. The random
//! parts take the generator as an argument so tests can seed it.

use std::sync::LazyLock;

use log::debug;
use rand::Rng;
use regex::Regex;

use crate::commands::{CommandContext, Event, reply::Reply};

/// Number of pulls in one draw.
const PULLS: usize = 10;
/// Probability of a three-star pull.
const THREE_STAR_RATE: f64 = 0.025;
/// Cumulative probability of a two-star or better pull.
const TWO_STAR_RATE: f64 = 0.205;

const MAX_DICE: u64 = 100;
const MAX_SIDES: u64 = 1000;

static DICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[dD](\d+)$").expect("dice pattern is valid"));

/// Pulls ten times and returns the number of three-star and two-star results.
pub fn draw_pulls(rng: &mut impl Rng) -> (usize, usize) {
    let mut three_stars = 0;
    let mut two_stars = 0;

    for _ in 0..PULLS {
        let draw: f64 = rng.gen_range(0.0..1.0);
        if draw < THREE_STAR_RATE {
            three_stars += 1;
        } else if draw < TWO_STAR_RATE {
            two_stars += 1;
        }
    }

    (three_stars, two_stars)
}

/// Parses `NdM` into the number of dice and their sides.
pub fn parse_dice(dice: &str) -> Option<(u64, u64)> {
    let caps = DICE.captures(dice)?;
    let count = caps[1].parse::<u64>().ok()?;
    let sides = caps[2].parse::<u64>().ok()?;

    if !(1..=MAX_DICE).contains(&count) || !(1..=MAX_SIDES).contains(&sides) {
        return None;
    }

    Some((count, sides))
}

/// Sums `count` rolls of a `sides`-sided die.
pub fn roll_dice(count: u64, sides: u64, rng: &mut impl Rng) -> u64 {
    (0..count).map(|_| rng.gen_range(1..=sides)).sum()
}

/// Tells the sender's fortune from a ten-pull draw.
pub async fn handle_blood_type<E: Event>(context: &CommandContext<'_, E>) -> anyhow::Result<Reply> {
    let profile = context.event.profile().await?;
    let (three_stars, two_stars) = draw_pulls(&mut rand::thread_rng());
    debug!(
        "{} drew {} three-star and {} two-star",
        profile.user_id, three_stars, two_stars
    );

    let blood = if three_stars > 0 {
        "European blood"
    } else {
        "African blood"
    };

    Ok(Reply::BloodType {
        name: profile.display_name,
        blood: blood.to_owned(),
        three_stars,
        two_stars,
    })
}

/// Rolls the dice given as `NdM`.
pub fn handle_roll<E: Event>(context: &CommandContext<'_, E>) -> Reply {
    let dice = context.params.first().map(String::as_str).unwrap_or("");

    let Some((count, sides)) = parse_dice(dice) else {
        return Reply::ErrInvalidDice {
            value: dice.to_owned(),
        };
    };

    let result = roll_dice(count, sides, &mut rand::thread_rng());
    debug!("rolled {} -> {}", dice, result);

    Reply::RollDiceResult {
        dice: dice.to_owned(),
        result,
    }
}

pub fn handle_wake_up() -> Reply {
    Reply::WakeUp
}
