//! Arithmetic problem generation
//!
//! Problems are drawn from a caller-supplied RNG so a seeded session
//! reproduces the exact same sequence.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Arithmetic operator of a problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    /// Apply the operator. `None` on overflow, a zero divisor, or a
    /// remainder; generated problems never hit any of these.
    pub fn apply(&self, a: i32, b: i32) -> Option<i32> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                _ => None,
            },
        }
    }
}

/// A single arithmetic problem with its precomputed answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub lhs: i32,
    pub op: Operator,
    pub rhs: i32,
    pub answer: i32,
}

impl Problem {
    /// Recompute the answer from operands
    pub fn evaluate(&self) -> Option<i32> {
        self.op.apply(self.lhs, self.rhs)
    }

    /// Text shown on the tile, e.g. `"12 ÷ 4"`
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.symbol(), self.rhs)
    }
}

/// Generate a random problem with a uniformly chosen operator
pub fn generate_problem<R: Rng + ?Sized>(rng: &mut R) -> Problem {
    let op = Operator::ALL[rng.random_range(0..Operator::ALL.len())];

    match op {
        Operator::Divide => {
            // dividend = divisor * quotient keeps the answer exact
            let divisor = rng.random_range(OPERAND_MIN..=OPERAND_MAX);
            let quotient = rng.random_range(1..=QUOTIENT_MAX);
            Problem {
                lhs: divisor * quotient,
                op,
                rhs: divisor,
                answer: quotient,
            }
        }
        _ => {
            let lhs = rng.random_range(OPERAND_MIN..=OPERAND_MAX);
            let rhs = rng.random_range(OPERAND_MIN..=OPERAND_MAX);
            let answer = match op {
                Operator::Add => lhs + rhs,
                Operator::Subtract => lhs - rhs,
                _ => lhs * rhs,
            };
            Problem {
                lhs,
                op,
                rhs,
                answer,
            }
        }
    }
}

/// Build the three answer candidates for `correct`, shuffled.
///
/// Wrong answers are drawn within ±`CHOICE_SPREAD` and inside
/// ±`CHOICE_BOUND`. After `MAX_CHOICE_ATTEMPTS` draws the remaining slots
/// are filled from fixed offsets (+1, -1, +2, -2, ...), so this always
/// terminates even when `correct` lies outside the band.
pub fn make_choices<R: Rng + ?Sized>(rng: &mut R, correct: i32) -> [i32; CHOICE_COUNT] {
    let mut choices = Vec::with_capacity(CHOICE_COUNT);
    choices.push(correct);

    let in_band = |v: i32| (-CHOICE_BOUND..=CHOICE_BOUND).contains(&v);

    let mut attempts = 0;
    while choices.len() < CHOICE_COUNT && attempts < MAX_CHOICE_ATTEMPTS {
        attempts += 1;
        let mut delta = rng.random_range(-CHOICE_SPREAD..CHOICE_SPREAD);
        // Map [-SPREAD, SPREAD) onto [-SPREAD, SPREAD] \ {0}
        if delta >= 0 {
            delta += 1;
        }
        let Some(candidate) = correct.checked_add(delta) else {
            continue;
        };
        if in_band(candidate) && !choices.contains(&candidate) {
            choices.push(candidate);
        }
    }

    if choices.len() < CHOICE_COUNT {
        log::debug!(
            "choice draws exhausted for {} after {} attempts, using fixed offsets",
            correct,
            attempts
        );
        fill_fixed_offsets(&mut choices, correct, in_band);
        fill_fixed_offsets(&mut choices, correct, |_| true);
    }

    choices.shuffle(rng);
    [choices[0], choices[1], choices[2]]
}

fn fill_fixed_offsets(choices: &mut Vec<i32>, correct: i32, accept: impl Fn(i32) -> bool) {
    for step in 1..=CHOICE_SPREAD {
        for candidate in [correct.checked_add(step), correct.checked_sub(step)] {
            if choices.len() == CHOICE_COUNT {
                return;
            }
            let Some(candidate) = candidate else {
                continue;
            };
            if accept(candidate) && !choices.contains(&candidate) {
                choices.push(candidate);
            }
        }
    }
}
