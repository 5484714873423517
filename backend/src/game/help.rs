use std::collections::BTreeMap;

use rand::{
    seq::{IndexedRandom, SliceRandom},
    Rng,
};

use crate::models::AnswerKey;

/// Friends a player can call for help
const FRIENDS: &[&str] = &[
    "Grandpa Joe",
    "Aunt Marina",
    "Uncle Boris",
    "Neighbor Vasily",
    "Cousin Alex",
    "Professor Lebedev",
];

pub struct HelpGenerator;

impl HelpGenerator {
    /// The correct key plus one random wrong key, in random order
    pub fn fifty_fifty(correct: AnswerKey, rng: &mut impl Rng) -> [AnswerKey; 2] {
        let wrong: Vec<AnswerKey> = AnswerKey::ALL
            .into_iter()
            .filter(|key| *key != correct)
            .collect();
        let other = wrong.choose(rng).copied().unwrap_or(correct);
        let mut pair = [correct, other];
        pair.shuffle(rng);
        pair
    }

    /// Audience votes in percent for every letter. Letters outside `keys`
    /// get no votes; the correct one is boosted nine times out of ten.
    pub fn audience_distribution(
        keys: &[AnswerKey],
        correct: AnswerKey,
        rng: &mut impl Rng,
    ) -> BTreeMap<AnswerKey, u8> {
        let mut weights: BTreeMap<AnswerKey, u32> = AnswerKey::ALL
            .into_iter()
            .map(|key| {
                let weight = if keys.contains(&key) {
                    rng.random_range(1..45)
                } else {
                    0
                };
                (key, weight)
            })
            .collect();

        if keys.contains(&correct) && rng.random_ratio(9, 10) {
            weights.insert(correct, rng.random_range(40..=90));
        }

        let total: u32 = weights.values().sum();
        weights
            .into_iter()
            .map(|(key, weight)| {
                let percent = if total == 0 {
                    0
                } else {
                    (f64::from(weight) * 100.0 / f64::from(total)).round() as u8
                };
                (key, percent)
            })
            .collect()
    }

    /// What a friend says on the phone; right eight times out of ten
    pub fn friend_call(keys: &[AnswerKey], correct: AnswerKey, rng: &mut impl Rng) -> String {
        let key = if keys.contains(&correct) && rng.random_ratio(8, 10) {
            correct
        } else {
            keys.choose(rng).copied().unwrap_or(correct)
        };
        let friend = FRIENDS.choose(rng).copied().unwrap_or("A friend");

        format!(
            "{} thinks the answer is {}",
            friend,
            key.as_str().to_uppercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_fifty_fifty_keeps_correct_key() {
        let mut rng = StdRng::seed_from_u64(42);
        for correct in AnswerKey::ALL {
            for _ in 0..50 {
                let pair = HelpGenerator::fifty_fifty(correct, &mut rng);
                assert_eq!(pair.len(), 2);
                assert!(pair.contains(&correct));
                assert_ne!(pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_fifty_fifty_order_does_not_reveal_correct_key() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut correct_first = 0;
        let draws = 400;
        for i in 0..draws {
            let correct = AnswerKey::ALL[i % 4];
            let pair = HelpGenerator::fifty_fifty(correct, &mut rng);
            if pair[0] == correct {
                correct_first += 1;
            }
        }
        assert!(
            (100..=300).contains(&correct_first),
            "correct key came first {} times out of {}",
            correct_first,
            draws
        );
    }

    #[test]
    fn test_audience_distribution_covers_all_keys() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let votes =
                HelpGenerator::audience_distribution(&AnswerKey::ALL, AnswerKey::C, &mut rng);
            assert_eq!(votes.len(), 4);

            // Rounding can drift the total by a couple of points
            let total: u32 = votes.values().map(|v| u32::from(*v)).sum();
            assert!((98..=102).contains(&total), "total was {}", total);
        }
    }

    #[test]
    fn test_audience_distribution_favors_correct_key() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut wins = 0;
        for _ in 0..200 {
            let votes =
                HelpGenerator::audience_distribution(&AnswerKey::ALL, AnswerKey::A, &mut rng);
            let (top, _) = votes.iter().max_by_key(|(_, v)| **v).unwrap();
            if *top == AnswerKey::A {
                wins += 1;
            }
        }
        assert!(wins > 120, "correct key led only {} times", wins);
    }

    #[test]
    fn test_audience_distribution_skips_removed_keys() {
        let mut rng = StdRng::seed_from_u64(3);
        let votes = HelpGenerator::audience_distribution(
            &[AnswerKey::B, AnswerKey::D],
            AnswerKey::D,
            &mut rng,
        );
        assert_eq!(votes[&AnswerKey::A], 0);
        assert_eq!(votes[&AnswerKey::C], 0);
        assert!(votes[&AnswerKey::B] + votes[&AnswerKey::D] >= 99);
    }

    #[test]
    fn test_friend_call_names_a_remaining_key() {
        let mut rng = StdRng::seed_from_u64(5);
        let keys = [AnswerKey::A, AnswerKey::C];
        for _ in 0..50 {
            let message = HelpGenerator::friend_call(&keys, AnswerKey::C, &mut rng);
            assert!(message.contains("thinks the answer is"));
            assert!(message.ends_with('A') || message.ends_with('C'), "{}", message);
        }
    }
}
