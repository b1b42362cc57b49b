//! 404 page quotes
//!
//! A static table of lost-page one-liners and a uniform picker over it.

use rand::Rng;

pub const ERROR_QUOTES: &[&str] = &[
    "Not all who wander are lost... but this page definitely is.",
    "This page has gone to find itself. It may be a while.",
    "Like socks in a dryer, this page has mysteriously vanished.",
    "This page is playing hide and seek. It's really good at it.",
    "This page is currently on vacation in /dev/null",
    "The page you seek cannot be found. Have you tried turning it off and on again?",
    "404: Page not found. But hey, at least the 404 page is working!",
    "The requested page is unavailable. It's probably off debugging itself.",
    "In the vast digital cosmos, some things are never meant to be found.",
    "Perhaps the real page was the friends we made along the way.",
    "The journey of 404 errors begins with a single broken link.",
    "These aren't the pages you're looking for. Move along.",
    "One does not simply walk into a 404 error.",
    "The page exists only in the spaces between the pixels.",
    "In the binary depths, some requests echo without answer.",
    "The hamsters powering this page are on strike.",
    "This page is currently being held hostage by rogue semicolons.",
    "Error: Page went out for coffee and never came back.",
    "Like tears in rain, this page has been lost to time.",
    "Somewhere between the bits and bytes, this page took flight.",
    "This is Schrödinger's page: it both exists and doesn't exist until you observe it.",
    "This page has gone the way of floppy disks and dial-up modems.",
    "When one page closes, another 404 opens.",
    "You miss 100% of the pages you don't create.",
    "The entropy of the internet has claimed another page.",
    "This page committed to main and was never seen again.",
    "Error: Page not found. Did you remember to git pull?",
    "Works on my machine... but apparently nowhere else.",
    "If a page 404s in the internet and nobody's around to see it, does it make an error?",
    "Good news: You found a page! Bad news: It's the wrong one.",
];

/// Uniform random pick from the table
pub fn pick<R: Rng>(rng: &mut R) -> &'static str {
    ERROR_QUOTES[rng.random_range(0..ERROR_QUOTES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_pick_stays_in_table() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let quote = pick(&mut rng);
            assert!(ERROR_QUOTES.contains(&quote));
        }
    }

    #[test]
    fn test_pick_covers_the_table_eventually() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5_000 {
            seen.insert(pick(&mut rng));
        }
        assert_eq!(seen.len(), ERROR_QUOTES.len());
    }
}
