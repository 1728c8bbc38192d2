//! Topic and level heuristics for Oxford 3000 entries.
//!
//! Topics are derived from keyword patterns over a word's meaning, term and
//! example; levels from term length plus a fixed set of basic terms. Both are
//! pure functions of their input.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::models::{Level, TopicStat, Word};

pub const MISCELLANEOUS: &str = "Miscellaneous";

pub struct TopicDef {
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    keywords: &'static str,
}

/// Order matters: the first topic whose pattern matches wins.
pub const TOPICS: [TopicDef; 25] = [
    TopicDef {
        name: "Animals",
        icon: "🐾",
        description: "Pets, wild animals, birds and insects",
        keywords: "animal|dog|cat|bird|fish|horse|cow|pig|sheep|insect|pet|wild|mouse|rabbit|\
            lion|tiger|bear|snake|chicken|duck|fur|tail|wing|feather|zoo",
    },
    TopicDef {
        name: "Food & Drink",
        icon: "🍎",
        description: "Meals, ingredients, cooking and drinks",
        keywords: "food|eat|drink|meal|cook|cooking|fruit|vegetable|meat|bread|cake|sugar|salt|\
            milk|coffee|tea|juice|wine|beer|breakfast|lunch|dinner|restaurant|kitchen|taste|\
            bake|soup|rice|egg|cheese|apple|potato",
    },
    TopicDef {
        name: "Family & Relationships",
        icon: "👪",
        description: "Relatives, friends and people around us",
        keywords: "family|mother|father|parent|child|children|son|daughter|brother|sister|\
            husband|wife|marry|married|marriage|friend|relative|baby|aunt|uncle|cousin|\
            grandmother|grandfather|partner|relationship",
    },
    TopicDef {
        name: "Body & Health",
        icon: "🩺",
        description: "The human body, illness and medicine",
        keywords: "body|head|hand|arm|leg|foot|feet|eye|ear|nose|mouth|tooth|teeth|heart|blood|\
            skin|bone|health|healthy|ill|illness|sick|disease|doctor|nurse|hospital|medicine|\
            pain|injury|injure|hurt",
    },
    TopicDef {
        name: "Home & Furniture",
        icon: "🏠",
        description: "Rooms, furniture and household objects",
        keywords: "home|house|room|bedroom|bathroom|furniture|chair|table|bed|sofa|door|window|\
            wall|floor|roof|garden|kitchen|lamp|shelf|cupboard|apartment|flat",
    },
    TopicDef {
        name: "Clothing & Fashion",
        icon: "👕",
        description: "Clothes, shoes and accessories",
        keywords: "clothes|clothing|wear|dress|shirt|trousers|skirt|coat|jacket|hat|shoe|shoes|\
            boot|sock|fashion|fabric|cotton|wool|button|pocket|jewellery|jewelry",
    },
    TopicDef {
        name: "Travel & Transport",
        icon: "✈️",
        description: "Journeys, vehicles and getting around",
        keywords: "travel|journey|trip|car|bus|train|plane|aircraft|airport|ship|boat|bicycle|\
            bike|vehicle|road|drive|driver|passenger|ticket|station|transport|traffic|holiday|\
            tourist|hotel|luggage",
    },
    TopicDef {
        name: "Nature & Weather",
        icon: "🌿",
        description: "The natural world, seasons and weather",
        keywords: "nature|natural|tree|flower|plant|grass|forest|mountain|river|lake|sea|ocean|\
            beach|island|sky|sun|moon|star|rain|snow|wind|weather|cloud|storm|season|summer|\
            winter|spring|autumn|earth|environment",
    },
    TopicDef {
        name: "Work & Jobs",
        icon: "💼",
        description: "Jobs, offices and employment",
        keywords: "work|job|employ|employer|employee|employment|office|career|manager|boss|\
            colleague|salary|wage|profession|professional|business|company|industry|factory|\
            worker|staff|hire|interview",
    },
    TopicDef {
        name: "Education & School",
        icon: "🎓",
        description: "Schools, studying and learning",
        keywords: "school|student|teacher|teach|learn|learning|study|studies|class|lesson|exam|\
            examination|test|university|college|education|course|homework|degree|library|\
            knowledge",
    },
    TopicDef {
        name: "Technology & Computers",
        icon: "💻",
        description: "Computers, the internet and devices",
        keywords: "computer|internet|online|software|technology|digital|electronic|machine|\
            device|phone|telephone|email|website|data|program|keyboard|screen|network|download|\
            click",
    },
    TopicDef {
        name: "Sports & Games",
        icon: "⚽",
        description: "Sports, games and competition",
        keywords: "sport|sports|game|play|player|team|ball|football|tennis|golf|swim|swimming|\
            race|match|win|score|competition|compete|champion|coach|exercise|gym|fitness",
    },
    TopicDef {
        name: "Arts & Music",
        icon: "🎨",
        description: "Music, painting, theatre and film",
        keywords: "art|artist|music|musical|song|sing|singer|dance|paint|painting|picture|draw|\
            drawing|theatre|theater|film|movie|actor|concert|instrument|piano|guitar|poem|\
            poetry|novel",
    },
    TopicDef {
        name: "Money & Shopping",
        icon: "💰",
        description: "Money, prices and buying things",
        keywords: "money|pay|payment|price|cost|buy|sell|shop|shopping|store|market|cash|bank|\
            coin|dollar|pound|cheap|expensive|customer|sale|spend|afford|tax|bill",
    },
    TopicDef {
        name: "Time & Calendar",
        icon: "📅",
        description: "Days, months, clocks and periods of time",
        keywords: "time|day|week|month|year|hour|minute|second|morning|afternoon|evening|night|\
            today|tomorrow|yesterday|calendar|clock|date|century|period|moment|monday|sunday|\
            january|december",
    },
    TopicDef {
        name: "Places & Buildings",
        icon: "🏙️",
        description: "Cities, buildings and public places",
        keywords: "city|town|village|country|place|building|street|bridge|church|museum|park|\
            castle|tower|area|region|capital|centre|center|prison|square",
    },
    TopicDef {
        name: "Emotions & Feelings",
        icon: "😊",
        description: "Moods, feelings and attitudes",
        keywords: "feel|feeling|emotion|emotional|happy|sad|angry|afraid|fear|love|hate|worry|\
            worried|anxious|proud|shame|ashamed|surprise|surprised|excited|bored|lonely|nervous|\
            upset|joy|mood",
    },
    TopicDef {
        name: "Communication & Language",
        icon: "💬",
        description: "Speaking, writing and language",
        keywords: "say|speak|talk|tell|word|words|language|letter|write|writing|read|reading|\
            conversation|message|discuss|explain|ask|answer|question|describe|grammar|sentence|\
            dictionary|translate",
    },
    TopicDef {
        name: "Science & Numbers",
        icon: "🔬",
        description: "Science, mathematics and measurement",
        keywords: "science|scientific|scientist|chemical|physics|biology|experiment|laboratory|\
            number|numbers|count|amount|measure|measurement|weight|metre|meter|kilogram|percent|\
            calculate|mathematics|maths|energy|gas|metal",
    },
    TopicDef {
        name: "Government & Law",
        icon: "⚖️",
        description: "Politics, law and society",
        keywords: "government|law|legal|illegal|court|judge|police|crime|criminal|politics|\
            political|election|vote|president|minister|parliament|citizen|army|military|war|\
            soldier|rule|rights|official",
    },
    TopicDef {
        name: "Media & News",
        icon: "📰",
        description: "Newspapers, television and advertising",
        keywords: "news|newspaper|magazine|television|tv|radio|media|journalist|article|report|\
            advertise|advertisement|broadcast|channel|publish|press",
    },
    TopicDef {
        name: "Colours & Shapes",
        icon: "🔷",
        description: "Colours, shapes and patterns",
        keywords: "colour|color|red|blue|green|yellow|black|white|brown|grey|gray|pink|purple|\
            orange|shape|circle|square|triangle|line|round|pattern",
    },
    TopicDef {
        name: "Actions & Movement",
        icon: "🏃",
        description: "Everyday actions and ways of moving",
        keywords: "move|movement|run|walk|jump|climb|throw|catch|push|pull|carry|lift|fall|drop|\
            hold|go|come|arrive|leave|enter|follow|turn|sit|stand",
    },
    TopicDef {
        name: "Describing Things",
        icon: "📝",
        description: "Qualities, sizes and descriptions",
        keywords: "big|small|large|little|tall|short|long|wide|narrow|heavy|light|hot|cold|warm|\
            cool|new|old|young|good|bad|beautiful|ugly|quality|size|kind|type|describe|\
            description",
    },
    TopicDef {
        name: MISCELLANEOUS,
        icon: "📦",
        description: "Everything else in the Oxford 3000",
        keywords: "",
    },
];

/// Terms that are beginner-level regardless of their length.
const BASIC_TERMS: &[&str] = &[
    "about", "after", "again", "always", "animal", "answer", "because", "before", "begin",
    "between", "birthday", "bring", "brother", "children", "choose", "clothes", "colour",
    "computer", "country", "dinner", "doctor", "evening", "family", "father", "favourite",
    "friend", "garden", "happen", "holiday", "hospital", "important", "kitchen", "language",
    "listen", "morning", "mother", "number", "people", "picture", "question", "remember",
    "restaurant", "sister", "something", "sometimes", "student", "teacher", "thank",
    "together", "tomorrow", "understand", "weather", "weekend", "welcome", "window",
    "yesterday",
];

struct CompiledTopic {
    index: usize,
    pattern: Regex,
}

fn compiled_topics() -> &'static [CompiledTopic] {
    static COMPILED: OnceLock<Vec<CompiledTopic>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        TOPICS
            .iter()
            .enumerate()
            .filter(|(_, def)| !def.keywords.is_empty())
            .filter_map(|(index, def)| {
                let source = format!(r"\b(?:{})s?\b", def.keywords);
                match RegexBuilder::new(&source).case_insensitive(true).build() {
                    Ok(pattern) => Some(CompiledTopic { index, pattern }),
                    Err(err) => {
                        tracing::error!(topic = def.name, error = %err, "topic pattern rejected");
                        None
                    }
                }
            })
            .collect()
    })
}

fn basic_terms() -> &'static HashSet<&'static str> {
    static BASIC: OnceLock<HashSet<&'static str>> = OnceLock::new();
    BASIC.get_or_init(|| BASIC_TERMS.iter().copied().collect())
}

/// Meaning is consulted first, then the term, then the example sentence.
pub fn topic_for_word(term: &str, meaning: &str, example: Option<&str>) -> &'static str {
    let fields = [Some(meaning), Some(term), example];
    for field in fields.into_iter().flatten() {
        if field.trim().is_empty() {
            continue;
        }
        if let Some(hit) = compiled_topics().iter().find(|t| t.pattern.is_match(field)) {
            return TOPICS[hit.index].name;
        }
    }
    MISCELLANEOUS
}

pub fn level_for_word(term: &str) -> Level {
    let normalized = term.trim().to_lowercase();
    if basic_terms().contains(normalized.as_str()) {
        return Level::Beginner;
    }
    match normalized.chars().count() {
        0..=4 => Level::Beginner,
        5..=7 => Level::Intermediate,
        _ => Level::Advanced,
    }
}

/// Fills `topic` and `level` where the stored row left them empty.
///
/// A stored topic is normalised to its canonical spelling; one that names no
/// known topic is replaced by the derived one.
pub fn augment(mut word: Word) -> Word {
    let topic = word
        .topic
        .as_deref()
        .and_then(canonical_topic)
        .unwrap_or_else(|| topic_for_word(&word.term, &word.meaning, word.example.as_deref()));
    word.topic = Some(topic.to_string());
    if word.level.is_none() {
        word.level = Some(level_for_word(&word.term));
    }
    word
}

/// Canonical topic name for a user-supplied one, matched case-insensitively.
pub fn canonical_topic(name: &str) -> Option<&'static str> {
    let wanted = name.trim();
    TOPICS
        .iter()
        .find(|def| def.name.eq_ignore_ascii_case(wanted))
        .map(|def| def.name)
}

pub fn tally(words: &[Word]) -> Vec<TopicStat> {
    TOPICS
        .iter()
        .map(|def| TopicStat {
            name: def.name.to_string(),
            icon: def.icon.to_string(),
            description: def.description.to_string(),
            word_count: words
                .iter()
                .filter(|w| w.topic.as_deref() == Some(def.name))
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meaning_keywords_pick_topic() {
        assert_eq!(
            topic_for_word("cat", "a small animal with soft fur", None),
            "Animals"
        );
        assert_eq!(
            topic_for_word("bread", "a type of food made from flour", None),
            "Food & Drink"
        );
    }

    #[test]
    fn term_is_consulted_when_meaning_is_silent() {
        assert_eq!(topic_for_word("piano", "a large instrument", None), "Arts & Music");
        assert_eq!(topic_for_word("judge", "a person in authority", None), "Government & Law");
    }

    #[test]
    fn example_is_the_last_resort() {
        assert_eq!(
            topic_for_word("quickly", "at speed", Some("She drove to the airport quickly.")),
            "Travel & Transport"
        );
    }

    #[test]
    fn unmatched_words_fall_back_to_miscellaneous() {
        assert_eq!(topic_for_word("although", "despite the fact that", None), MISCELLANEOUS);
        assert_eq!(topic_for_word("", "", None), MISCELLANEOUS);
    }

    #[test]
    fn partial_words_do_not_match() {
        // "catalogue" must not hit the "cat" keyword.
        assert_ne!(topic_for_word("catalogue", "a list of items", None), "Animals");
    }

    #[test]
    fn derivation_is_deterministic() {
        let first = topic_for_word("horse", "a large animal", Some("I rode a horse."));
        for _ in 0..10 {
            assert_eq!(
                topic_for_word("horse", "a large animal", Some("I rode a horse.")),
                first
            );
        }
    }

    #[test]
    fn levels_follow_length_and_basic_set() {
        assert_eq!(level_for_word("cat"), Level::Beginner);
        assert_eq!(level_for_word("garden"), Level::Beginner);
        assert_eq!(level_for_word("understand"), Level::Beginner);
        assert_eq!(level_for_word("absorb"), Level::Intermediate);
        assert_eq!(level_for_word("accommodation"), Level::Advanced);
    }

    #[test]
    fn augment_keeps_stored_level_and_canonicalises_topic() {
        let mut word = Word::new("1", "cat", "a small animal");
        word.topic = Some(" animals".to_string());
        word.level = Some(Level::Advanced);
        let out = augment(word);
        assert_eq!(out.topic.as_deref(), Some("Animals"));
        assert_eq!(out.level, Some(Level::Advanced));
    }

    #[test]
    fn augment_derives_topic_when_stored_one_is_unknown() {
        let mut word = Word::new("1", "bread", "food made from flour");
        word.topic = Some("Bakery".to_string());
        assert_eq!(augment(word).topic.as_deref(), Some("Food & Drink"));

        let mut blank = Word::new("2", "although", "despite the fact that");
        blank.topic = Some("  ".to_string());
        assert_eq!(augment(blank).topic.as_deref(), Some(MISCELLANEOUS));
    }

    #[test]
    fn tally_counts_every_augmented_word_once() {
        let mut odd = Word::new("1", "cat", "a small animal");
        odd.topic = Some("ANIMALS".to_string());
        let mut custom = Word::new("2", "piano", "a large instrument");
        custom.topic = Some("Instruments".to_string());
        let words = vec![augment(odd), augment(custom)];
        let stats = tally(&words);
        assert_eq!(stats.iter().map(|s| s.word_count).sum::<usize>(), words.len());
        let animals = stats.iter().find(|s| s.name == "Animals").unwrap();
        assert_eq!(animals.word_count, 1);
    }

    #[test]
    fn tally_reports_every_topic() {
        let words = vec![
            augment(Word::new("1", "cat", "a small animal")),
            augment(Word::new("2", "dog", "an animal kept as a pet")),
            augment(Word::new("3", "although", "despite the fact that")),
        ];
        let stats = tally(&words);
        assert_eq!(stats.len(), 25);
        let animals = stats.iter().find(|s| s.name == "Animals").unwrap();
        assert_eq!(animals.word_count, 2);
        let misc = stats.iter().find(|s| s.name == MISCELLANEOUS).unwrap();
        assert_eq!(misc.word_count, 1);
        assert_eq!(stats.iter().map(|s| s.word_count).sum::<usize>(), 3);
    }

    #[test]
    fn canonical_topic_ignores_case() {
        assert_eq!(canonical_topic("animals"), Some("Animals"));
        assert_eq!(canonical_topic("  FOOD & DRINK "), Some("Food & Drink"));
        assert_eq!(canonical_topic("unknown"), None);
    }
}
