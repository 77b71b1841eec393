use crate::models::Attendee;

/// Prompts every pair receives
pub const DEFAULT_STARTERS: [&str; 3] = [
    "What's the most interesting project you're working on right now?",
    "What brought you to this event today?",
    "What's your favorite part about your job/studies?",
];

/// Conversation starters for a pair
///
/// One prompt per question both attendees answered, in question order,
/// followed by the default prompts. Never empty.
pub fn conversation_starters(first: &Attendee, second: &Attendee) -> Vec<String> {
    let mut starters: Vec<String> = first
        .answers
        .iter()
        .filter_map(|(question, answer)| {
            let theirs = second.answers.get(question)?;
            let (mine, theirs) = (answer.trim(), theirs.trim());
            if mine.is_empty() || theirs.is_empty() {
                return None;
            }

            if mine.eq_ignore_ascii_case(theirs) {
                Some(format!(
                    "You both answered \"{}\" with \"{}\". What made you pick it?",
                    question, mine
                ))
            } else {
                Some(format!(
                    "{} answered \"{}\" with \"{}\", {} said \"{}\". Who wants to make their case first?",
                    first.name, question, mine, second.name, theirs
                ))
            }
        })
        .collect();

    starters.extend(DEFAULT_STARTERS.iter().map(|s| s.to_string()));
    starters
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn attendee(name: &str, answers: &[(&str, &str)]) -> Attendee {
        let mut a = Attendee::new(name, BTreeMap::new()).unwrap();
        for (q, ans) in answers {
            a.set_answer(*q, *ans);
        }
        a
    }

    #[test]
    fn test_defaults_without_shared_answers() {
        let a = attendee("A", &[]);
        let b = attendee("B", &[("Pets?", "Cats")]);
        let starters = conversation_starters(&a, &b);
        assert_eq!(starters, DEFAULT_STARTERS.map(String::from).to_vec());
    }

    #[test]
    fn test_shared_question_prompts_come_first() {
        let a = attendee("Ada", &[("Pets?", "Cats"), ("Editor?", "vim")]);
        let b = attendee("Grace", &[("Pets?", "cats"), ("Editor?", "emacs")]);
        let starters = conversation_starters(&a, &b);

        assert_eq!(starters.len(), 5);
        // BTreeMap order: "Editor?" before "Pets?"
        assert!(starters[0].contains("Ada answered \"Editor?\" with \"vim\""));
        assert!(starters[0].contains("Grace said \"emacs\""));
        assert!(starters[1].starts_with("You both answered \"Pets?\""));
        assert_eq!(starters[4], DEFAULT_STARTERS[2]);
    }
}
