use crate::simplification::rules::Rule;
use std::sync::Arc;

pub(crate) mod combination;
pub(crate) mod expansion;
pub(crate) mod factoring;
pub(crate) mod fractions;
/// Algebraic simplification rules
pub(crate) mod identities;
pub(crate) mod powers;
pub(crate) mod sign;

/// Get all algebraic rules, inner and search-only
pub(crate) fn get_algebraic_rules() -> Vec<Arc<dyn Rule>> {
    let mut rules = identities::get_identity_rules();
    rules.extend(powers::get_power_rules());
    rules.extend(sign::get_sign_rules());
    // Search-only alternatives
    rules.extend(powers::get_negative_power_rules());
    rules.extend(fractions::get_fraction_rules());
    rules.extend(expansion::get_expansion_rules());
    rules.extend(combination::get_combination_rules());
    rules.extend(factoring::get_factoring_rules());
    rules
}
