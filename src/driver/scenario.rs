//! Random actor scenarios
//!
//! Generates one request per user `user0..userN`, each with a random operation
//! and amount. Transfers target a random other user.

use crate::types::{ActorRequest, Operation};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

const OPERATIONS: [Operation; 4] = [
    Operation::Deposit,
    Operation::Withdraw,
    Operation::Transfer,
    Operation::CheckBalance,
];

/// Build `users` random requests with amounts in `1..=max_amount`
///
/// Transfers are only generated when there are at least two users.
pub fn random_scenario<R: Rng>(
    users: usize,
    max_amount: u32,
    rng: &mut R,
) -> Vec<ActorRequest> {
    let max_amount = max_amount.max(1);
    let choices: &[Operation] = if users > 1 {
        &OPERATIONS
    } else {
        &OPERATIONS[..1]
    };

    (0..users)
        .map(|i| {
            let account = format!("user{}", i);
            let operation = *choices.choose(rng).unwrap_or(&Operation::Deposit);
            let amount = Decimal::from(rng.gen_range(1..=max_amount));

            if operation == Operation::Transfer {
                // Pick among the other users by skipping our own index.
                let mut other = rng.gen_range(0..users - 1);
                if other >= i {
                    other += 1;
                }
                ActorRequest::transfer(account, format!("user{}", other), amount)
            } else {
                ActorRequest::new(account, operation, amount)
            }
        })
        .collect()
}
