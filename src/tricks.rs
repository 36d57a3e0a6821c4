//! "Teach me something cool": short math snippets picked at random.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathTrick {
    pub title: &'static str,
    pub content: &'static str,
}

pub static TRICKS: [MathTrick; 8] = [
    MathTrick {
        title: "The 9 Times Table Finger Trick",
        content: "Hold your hands in front of you. To multiply 9 by any number (1-10), fold down \
                  the finger in that position. The fingers to the left are the tens digit, and \
                  to the right are the ones digit. For 9×7: fold the 7th finger, you'll see 6 \
                  fingers left and 3 right = 63!",
    },
    MathTrick {
        title: "Why 0.999... = 1",
        content: "Let x = 0.999... Then 10x = 9.999... Subtract: 10x - x = 9.999... - 0.999... \
                  So 9x = 9, which means x = 1. Mind blown! 🤯",
    },
    MathTrick {
        title: "The 11 Multiplication Trick",
        content: "To multiply any 2-digit number by 11, add the two digits and put the result in \
                  the middle. For 45×11: 4+5=9, so answer is 4|9|5 = 495. If the sum is >9, \
                  carry the 1. Try 67×11: 6+7=13, so 6+1|3|7 = 737!",
    },
    MathTrick {
        title: "Fibonacci in Nature",
        content: "The Fibonacci sequence (1,1,2,3,5,8,13...) appears everywhere in nature: \
                  sunflower seed spirals, pinecone patterns, nautilus shells, and even galaxy \
                  spirals follow this mathematical pattern!",
    },
    MathTrick {
        title: "The Birthday Paradox",
        content: "In a room of just 23 people, there's a 50% chance two share the same birthday! \
                  With 70 people, it's 99.9%. Counterintuitive but mathematically proven!",
    },
    MathTrick {
        title: "Pi's Infinite Mystery",
        content: "π (3.14159...) is infinite and non-repeating. Your phone number, birthday, and \
                  even your name (encoded) appear somewhere in π's digits. In fact, any finite \
                  sequence of numbers appears in π!",
    },
    MathTrick {
        title: "Negative × Negative = Positive",
        content: "Why does -1 × -1 = 1? Think of it as direction. If you owe someone $1 (-1) and \
                  you cancel that debt (-1 again), you gain $1 (+1). Or: removing a negative is \
                  positive!",
    },
    MathTrick {
        title: "The Power of Compound Interest",
        content: "Einstein called it the 8th wonder of the world. If you invest $100/month at 7% \
                  annual return for 40 years, you'd have ~$240,000! Small consistent investments \
                  beat large occasional ones.",
    },
];

/// Picks a trick using the thread-local generator.
pub fn random_math_trick() -> &'static MathTrick {
    random_math_trick_with(&mut rand::thread_rng())
}

/// Picks a trick uniformly with the given random source.
pub fn random_math_trick_with<R: Rng + ?Sized>(rng: &mut R) -> &'static MathTrick {
    &TRICKS[rng.gen_range(0..TRICKS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_seeded_pick_is_deterministic() {
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10).map(|_| random_math_trick_with(&mut rng).title).collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
    }

    #[test]
    fn test_every_trick_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            let trick = random_math_trick_with(&mut rng);
            assert!(TRICKS.contains(trick));
            seen.insert(trick.title);
        }
        assert_eq!(seen.len(), TRICKS.len());
    }

    #[test]
    fn test_thread_rng_stays_in_set() {
        for _ in 0..50 {
            assert!(TRICKS.contains(random_math_trick()));
        }
    }
}
