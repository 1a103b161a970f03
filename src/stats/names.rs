//! Static lookup tables that are part of the visible message format.

/// Known gamer tags and the Discord mention each should render as.
const PLAYER_MENTIONS: &[(&str, &str)] = &[
    ("bglowniak", "<@!250017966928691211>"),
    ("triplexlink", "<@!273518554517602305>"),
    ("funny_monkey998", "<@!479298269110075433>"),
    ("MisterDuV", "<@!425035767350296578>"),
    ("Sharkyplace", "<@!545430460860334082>"),
    ("TetoTeto", "<@!483853566281383946>"),
    ("cooliodude13", "<@!137213864872902656>"),
];

/// Map id prefixes and their display names. First match wins.
const MAP_NAMES: &[(&str, &str)] = &[
    ("mp_don", "Verdansk"),
    ("mp_escape", "Rebirth"),
    ("mp_wz_island", "Caldera"),
    ("mp_sm_island", "Fortune's Keep"),
];

/// Mention token for a known player, otherwise the id unchanged.
pub fn player_display_name(player_id: &str) -> &str {
    PLAYER_MENTIONS
        .iter()
        .find(|(id, _)| *id == player_id)
        .map_or(player_id, |&(_, mention)| mention)
}

pub fn map_display_name(map_id: &str) -> &str {
    MAP_NAMES
        .iter()
        .find(|(prefix, _)| map_id.starts_with(prefix))
        .map_or(map_id, |&(_, name)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_players_render_as_mentions() {
        assert_eq!(player_display_name("bglowniak"), "<@!250017966928691211>");
        assert_eq!(player_display_name("cooliodude13"), "<@!137213864872902656>");
    }

    #[test]
    fn unknown_players_pass_through() {
        assert_eq!(player_display_name("some_randy"), "some_randy");
        // case sensitive, like the gamer tags themselves
        assert_eq!(player_display_name("BGLOWNIAK"), "BGLOWNIAK");
    }

    #[test]
    fn map_prefixes_translate() {
        assert_eq!(map_display_name("mp_don4"), "Verdansk");
        assert_eq!(map_display_name("mp_don3"), "Verdansk");
        assert_eq!(map_display_name("mp_escape2"), "Rebirth");
        assert_eq!(map_display_name("mp_wz_island"), "Caldera");
        assert_eq!(map_display_name("mp_sm_island"), "Fortune's Keep");
    }

    #[test]
    fn unknown_maps_pass_through() {
        assert_eq!(map_display_name("mp_custom_x"), "mp_custom_x");
        assert_eq!(map_display_name(""), "");
    }
}
