/// Themes offered when an organizer names a new event
pub const EVENT_THEMES: [&str; 20] = [
    "Technology", "Business", "Arts", "Science", "Sports", "Music", "Food",
    "Travel", "Health", "Education", "Environment", "Fashion", "Gaming",
    "Literature", "Politics", "Film", "Photography", "Dance", "Networking", "Charity",
];

const MAX_SUGGESTIONS: usize = 5;

/// Themes whose words appear in the event name, at most five, in list order
pub fn suggest_themes(event_name: &str) -> Vec<&'static str> {
    let event_name = event_name.to_lowercase();

    EVENT_THEMES
        .iter()
        .copied()
        .filter(|theme| {
            theme
                .to_lowercase()
                .split_whitespace()
                .any(|word| event_name.contains(word))
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}
