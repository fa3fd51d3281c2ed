#![allow(dead_code)]

extern crate std;

use crate::types::Sale;

/// INV-1: The running total never exceeds the funding goal.
/// Overshooting contributions are rejected whole, so this holds at every
/// observable point, not just at settlement.
pub fn assert_total_within_goal(sale: &Sale) {
    assert!(
        sale.total_raised <= sale.goal,
        "INV-1 violated: total_raised {} exceeds goal {}",
        sale.total_raised,
        sale.goal
    );
}

/// INV-2: The goal latch only moves false → true, and only once the total
/// actually reached the goal.
pub fn assert_goal_latch(reached_before: bool, sale: &Sale) {
    if reached_before {
        assert!(
            sale.goal_reached,
            "INV-2 violated: goal_reached latch reverted to false"
        );
    }
    if sale.goal_reached {
        assert!(
            sale.total_raised >= sale.goal,
            "INV-2 violated: goal_reached set at total {} < goal {}",
            sale.total_raised,
            sale.goal
        );
    }
}

/// INV-3: Settlement outcomes are mutually exclusive — a sale never both
/// distributes tokens and enables refunds.
pub fn assert_outcome_exclusive(sale: &Sale) {
    assert!(
        !(sale.tokens_distributed && sale.refunds_enabled),
        "INV-3 violated: tokens distributed and refunds enabled simultaneously"
    );
}

/// INV-4: A settled sale landed in exactly one terminal outcome, matching
/// the goal latch.
pub fn assert_settled_outcome(sale: &Sale) {
    assert!(sale.finalized, "INV-4 precondition: sale not finalized");
    if sale.goal_reached {
        assert!(
            sale.tokens_distributed && !sale.refunds_enabled,
            "INV-4 violated: goal reached but outcome is not distribution"
        );
    } else {
        assert!(
            sale.refunds_enabled && !sale.tokens_distributed,
            "INV-4 violated: goal missed but refunds not enabled"
        );
    }
}

/// INV-5: Contribution accounting — an accepted contribution of `amount`
/// grows the total by exactly `amount`.
pub fn assert_contribution_accounting(total_before: i128, total_after: i128, amount: i128) {
    assert_eq!(
        total_after,
        total_before + amount,
        "INV-5 violated: {} + {} != {}",
        total_before,
        amount,
        total_after
    );
}

/// INV-6: Registry/ledger consistency — every registered participant holds
/// a nonzero ledger balance. The converse (nonzero balance implies registry
/// membership) is asserted by the callers that know the address set.
pub fn assert_registry_balances_nonzero(balances: &[i128]) {
    for (index, balance) in balances.iter().enumerate() {
        assert!(
            *balance > 0,
            "INV-6 violated: registry slot {} has zero ledger balance",
            index
        );
    }
}

/// Run the stateless sale invariants together.
pub fn assert_sale_invariants(sale: &Sale) {
    assert_total_within_goal(sale);
    assert_outcome_exclusive(sale);
    if sale.finalized {
        assert_settled_outcome(sale);
    }
}
