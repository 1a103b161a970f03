//! Replies to ordinary chat that is not a command.

use crate::commands::mention_forms;
use log::warn;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::{Path, PathBuf};

pub const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hiya",
    "hey",
    "howdy",
    "sup",
    "hola",
    "privet",
    "salve",
    "ciao",
    "konnichiwa",
    "shalom",
];

/// A greeting back when a message opens with a mention of the bot and says hi
/// anywhere in it, regardless of punctuation.
pub fn greeting_reply<R: Rng + ?Sized>(
    content: &str,
    bot_id: u64,
    author_id: u64,
    rng: &mut R,
) -> Option<String> {
    let content = content.trim().to_lowercase();
    let addressed = mention_forms(bot_id)
        .iter()
        .any(|mention| content.starts_with(mention.as_str()));
    if !addressed {
        return None;
    }

    let greeted = content
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| GREETINGS.contains(&word));
    if !greeted {
        return None;
    }

    let greeting = GREETINGS.choose(rng)?;
    Some(format!("<@!{author_id}> {greeting}!"))
}

pub fn mentions_trip(content: &str) -> bool {
    content.to_lowercase().contains("trip")
}

pub fn trip_reply(author_id: u64) -> String {
    format!("<@!{author_id}> trip? triple? triplexlink?")
}

/// A random reaction image from `dir`, if there is one.
pub fn pick_salute<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("could not read salute directory {}: {e}", dir.display());
            return None;
        }
    };

    let files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.choose(rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BOT: u64 = 77;

    #[test]
    fn greets_back_when_addressed_with_a_greeting() {
        let mut rng = StdRng::seed_from_u64(7);
        let reply = greeting_reply("<@77> hey there!", BOT, 12, &mut rng).unwrap();
        assert!(reply.starts_with("<@!12> "));
        assert!(reply.ends_with('!'));
        let word = reply.trim_start_matches("<@!12> ").trim_end_matches('!');
        assert!(GREETINGS.contains(&word));
    }

    #[test]
    fn greeting_needs_the_mention_first() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(greeting_reply("hey <@77>", BOT, 12, &mut rng).is_none());
        assert!(greeting_reply("<@!77> HOWDY, partner", BOT, 12, &mut rng).is_some());
    }

    #[test]
    fn greeting_must_be_a_whole_word() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(greeting_reply("<@77> this is high quality", BOT, 12, &mut rng).is_none());
        assert!(greeting_reply("<@77> what's the plan", BOT, 12, &mut rng).is_none());
    }

    #[test]
    fn trip_is_spotted_anywhere() {
        assert!(mentions_trip("road TRIP tonight"));
        assert!(mentions_trip("triplexlink get on"));
        assert!(!mentions_trip("drop in verdansk"));
        assert_eq!(trip_reply(5), "<@!5> trip? triple? triplexlink?");
    }

    #[test]
    fn salute_from_missing_directory_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_salute(Path::new("/definitely/not/here"), &mut rng).is_none());
    }

    #[test]
    fn salute_picks_a_file_in_the_directory() {
        let dir = std::env::temp_dir().join(format!("lumberbot-salutes-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("salute.gif"), b"gif").unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let picked = pick_salute(&dir, &mut rng).unwrap();
        assert_eq!(picked.file_name().unwrap(), "salute.gif");

        fs::remove_dir_all(&dir).unwrap();
    }
}
