//! Truth conditions, priors and utilities over the item domain.

use super::items::{ItemSet, Response, World};
use super::knowledge::KnowledgeConfig;
use super::question::{Goal, Question};
use crate::dist::{DistError, Softmax};

/// Items the question inquires about in `world`.
pub const fn queried_set(question: Question, world: World, n_items: usize) -> ItemSet {
    match question {
        Question::WhichUncontaminated => world.clean(),
        Question::WhichContaminated => world.contaminated(n_items),
    }
}

/// Literal truth of `response` in `world`: every mentioned item has the queried property.
pub const fn meaning(question: Question, response: Response, world: World, n_items: usize) -> bool {
    response
        .items()
        .is_subset_of(queried_set(question, world, n_items))
}

/// I.i.d. Bernoulli prior over worlds.
pub fn world_prior(world: World, n_items: usize, contamination_rate: f64) -> f64 {
    (0..n_items)
        .map(|item| {
            if world.is_clean(item) {
                1.0 - contamination_rate
            } else {
                contamination_rate
            }
        })
        .product()
}

/// Probability the respondent assigns to item `item` being clean.
pub fn clean_probability(item: usize, config: KnowledgeConfig, confidence: f64) -> f64 {
    if item < config.n_cont {
        1.0 - confidence
    } else if item < config.n_cont + config.n_uncont {
        confidence
    } else {
        0.5
    }
}

/// Respondent's belief that the world is `world`.
pub fn speaker_belief(
    world: World,
    n_items: usize,
    config: KnowledgeConfig,
    confidence: f64,
) -> f64 {
    (0..n_items)
        .map(|item| {
            let p_clean = clean_probability(item, config, confidence);
            if world.is_clean(item) {
                p_clean
            } else {
                1.0 - p_clean
            }
        })
        .product()
}

/// Number of items mentioned; drives the brevity cost.
pub const fn response_length(response: Response) -> u32 {
    response.items().len()
}

/// 1 when picking `action` serves `goal` in `world`, else 0.
pub const fn action_utility(goal: Goal, world: World, action: usize) -> f64 {
    let clean = world.is_clean(action);
    let hit = match goal {
        Goal::FindClean => clean,
        Goal::AvoidContamination => !clean,
    };
    if hit { 1.0 } else { 0.0 }
}

/// Expected utility of a softmax policy over actions when acting in `world`.
pub fn decision_value(
    goal: Goal,
    world: World,
    n_items: usize,
    alpha_policy: f64,
) -> Result<f64, DistError> {
    let policy = Softmax::natural(alpha_policy)
        .choose(0..n_items, |action| Ok::<_, DistError>(action_utility(goal, world, action)))?;
    Ok(policy.expectation(|action| action_utility(goal, world, action)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 5;

    #[test]
    fn meaning_requires_subset_of_queried_items() {
        let world = World::from_bits(0b00011);
        assert!(meaning(Question::WhichUncontaminated, Response::from_bits(0b01), world, N));
        assert!(meaning(Question::WhichUncontaminated, Response::from_bits(0), world, N));
        assert!(!meaning(Question::WhichUncontaminated, Response::from_bits(0b100), world, N));
        assert!(meaning(Question::WhichContaminated, Response::from_bits(0b11100), world, N));
        assert!(!meaning(Question::WhichContaminated, Response::from_bits(0b00001), world, N));
    }

    #[test]
    fn world_prior_sums_to_one() {
        let total: f64 = (0..1u32 << N)
            .map(|bits| world_prior(World::from_bits(bits), N, 0.3))
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
        let all_clean = world_prior(World::from_bits(0b11111), N, 0.3);
        assert!((all_clean - 0.7f64.powi(5)).abs() < 1e-12);
    }

    #[test]
    fn speaker_belief_is_positional() {
        let config = KnowledgeConfig::new(1, 1);
        assert!((clean_probability(0, config, 0.9) - 0.1).abs() < 1e-12);
        assert!((clean_probability(1, config, 0.9) - 0.9).abs() < 1e-12);
        assert!((clean_probability(2, config, 0.9) - 0.5).abs() < 1e-12);

        let expected = 0.9 * 0.9 * 0.5f64.powi(3);
        let belief = speaker_belief(World::from_bits(0b00010), N, config, 0.9);
        assert!((belief - expected).abs() < 1e-12);

        let total: f64 = (0..1u32 << N)
            .map(|bits| speaker_belief(World::from_bits(bits), N, config, 0.9))
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ignorant_belief_matches_fair_prior() {
        let config = KnowledgeConfig::new(0, 0);
        for bits in 0..1u32 << N {
            let world = World::from_bits(bits);
            assert_eq!(speaker_belief(world, N, config, 0.9), world_prior(world, N, 0.5));
        }
    }

    #[test]
    fn response_length_counts_mentioned_items() {
        assert_eq!(response_length(Response::from_bits(0b101)), 2);
        assert_eq!(response_length(Response::from_bits(0)), 0);
    }

    #[test]
    fn action_utility_is_symmetric_across_goals() {
        let world = World::from_bits(0b00100);
        assert_eq!(action_utility(Goal::FindClean, world, 2), 1.0);
        assert_eq!(action_utility(Goal::AvoidContamination, world, 2), 0.0);
        assert_eq!(action_utility(Goal::AvoidContamination, world, 0), 1.0);
    }

    #[test]
    fn decision_value_tracks_share_of_useful_items() {
        let none_clean = World::from_bits(0);
        let all_clean = World::from_bits(0b11111);
        let one_clean = World::from_bits(0b00001);

        assert_eq!(decision_value(Goal::FindClean, none_clean, N, 10.0), Ok(0.0));
        let full = decision_value(Goal::FindClean, all_clean, N, 10.0).expect("value");
        assert!((full - 1.0).abs() < 1e-12);

        let e = 10f64.exp();
        let expected = e / (e + 4.0);
        let partial = decision_value(Goal::FindClean, one_clean, N, 10.0).expect("value");
        assert!((partial - expected).abs() < 1e-12);

        let mirrored =
            decision_value(Goal::AvoidContamination, World::from_bits(0b11110), N, 10.0)
                .expect("value");
        assert!((partial - mirrored).abs() < 1e-12);
    }
}
