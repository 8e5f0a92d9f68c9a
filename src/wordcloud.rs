//! Word frequencies over cast text and a deterministic cloud layout.
//!
//! Text sizes are estimated from character count so the layout does not depend on installed
//! fonts: a word of `n` characters at font size `s` is `n * s * 0.6` wide and `s` tall.

use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

pub const CLOUD_WIDTH: u32 = 800;
pub const CLOUD_HEIGHT: u32 = 400;

const CHAR_WIDTH_RATIO: f64 = 0.6;
const MIN_FONT_SIZE: f64 = 8.0;
const FONT_STEP: f64 = 0.9;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "else", "ever",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "of",
    "off", "on", "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out",
    "over", "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w[\w']+").expect("static word pattern is valid"))
}

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

/// A word and its share of the cloud.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WordWeight {
    pub word: String,
    pub count: usize,
    /// count relative to the most frequent word, in (0, 1]
    pub weight: f64,
}

/// Split text into words: runs of two or more word characters, trailing "'s" removed,
/// pure numbers and stopwords dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    word_pattern()
        .find_iter(text)
        .map(|m| {
            let word = m.as_str();
            let lower = word.to_lowercase();
            if lower.ends_with("'s") {
                word[..word.len() - 2].to_string()
            } else {
                word.to_string()
            }
        })
        .filter(|w| w.chars().count() > 1)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !stopwords().contains(w.to_lowercase().as_str()))
        .collect()
}

/// Count words, folding case. Each word is shown in its most common casing.
/// Sorted by count descending, then by first appearance; at most `max_words` entries.
pub fn word_frequencies(text: &str, max_words: usize) -> Vec<WordWeight> {
    // (first seen, count, casings) per folded key
    let mut seen: HashMap<String, (usize, usize, HashMap<String, usize>)> = HashMap::new();
    for word in tokenize(text) {
        let key = word.to_lowercase();
        let order = seen.len();
        let entry = seen.entry(key).or_insert_with(|| (order, 0, HashMap::new()));
        entry.1 += 1;
        *entry.2.entry(word).or_default() += 1;
    }

    let mut words: Vec<(usize, String, usize)> = seen
        .into_iter()
        .map(|(key, (order, count, forms))| {
            let shown = forms
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
                .map(|(form, _)| form)
                .unwrap_or(key);
            (order, shown, count)
        })
        .collect();
    words.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    words.truncate(max_words);
    let words: Vec<(String, usize)> = words
        .into_iter()
        .map(|(_, word, count)| (word, count))
        .collect();

    let top = words.first().map(|(_, c)| *c).unwrap_or(1) as f64;
    words
        .into_iter()
        .map(|(word, count)| WordWeight {
            weight: count as f64 / top,
            word,
            count,
        })
        .collect()
}

/// A word positioned in the cloud. `x`/`y` is the top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlacedWord {
    pub word: String,
    pub weight: f64,
    pub font_size: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedWord {
    fn overlaps(&self, other: &PlacedWord) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CloudLayout {
    pub width: u32,
    pub height: u32,
    pub words: Vec<PlacedWord>,
}

impl CloudLayout {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn text_width(word: &str, font_size: f64) -> f64 {
    word.chars().count() as f64 * font_size * CHAR_WIDTH_RATIO
}

/// Place words on an Archimedean spiral from the canvas center, largest first.
/// A word that finds no free spot shrinks and retries; below the minimum size it is left out.
pub fn layout(words: &[WordWeight], width: u32, height: u32) -> CloudLayout {
    let (w, h) = (width as f64, height as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let max_font = h * 0.3;
    let aspect = w / h;
    let max_radius = (cx * cx + cy * cy).sqrt();
    let mut placed: Vec<PlacedWord> = Vec::new();

    for item in words {
        // Relative scaling of one half between rank and frequency
        let mut font_size = max_font * (0.5 * item.weight + 0.5);
        if let Some(previous) = placed.last() {
            font_size = font_size.min(previous.font_size);
        }

        'sizes: while font_size >= MIN_FONT_SIZE {
            let word_w = text_width(&item.word, font_size);
            let word_h = font_size;
            if word_w <= w && word_h <= h {
                let mut angle = 0.0f64;
                loop {
                    let radius = 2.0 * angle;
                    if radius > max_radius {
                        break;
                    }
                    let candidate = PlacedWord {
                        word: item.word.clone(),
                        weight: item.weight,
                        font_size,
                        x: cx + radius * angle.cos() * aspect - word_w / 2.0,
                        y: cy + radius * angle.sin() - word_h / 2.0,
                        width: word_w,
                        height: word_h,
                    };
                    let inside = candidate.x >= 0.0
                        && candidate.y >= 0.0
                        && candidate.x + word_w <= w
                        && candidate.y + word_h <= h;
                    if inside && !placed.iter().any(|p| p.overlaps(&candidate)) {
                        placed.push(candidate);
                        break 'sizes;
                    }
                    angle += 0.1;
                }
            }
            font_size *= FONT_STEP;
        }
    }

    CloudLayout {
        width,
        height,
        words: placed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_possessives_and_stopwords() {
        assert_eq!(
            tokenize("Shah Rukh Khan's, and the Deepika Padukone, 2 x"),
            vec!["Shah", "Rukh", "Khan", "Deepika", "Padukone"]
        );
    }

    #[test]
    fn frequencies_fold_case_and_rank() {
        let words = word_frequencies("Aamir Khan, Salman Khan, khan, Aamir", 10);
        assert_eq!(words[0].word, "Khan");
        assert_eq!(words[0].count, 3);
        assert_eq!(words[0].weight, 1.0);
        assert_eq!(words[1].word, "Aamir");
        assert_eq!(words[1].count, 2);
        assert_eq!(words[2].word, "Salman");
        assert!((words[2].weight - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn frequencies_respect_max_words() {
        let words = word_frequencies("alpha beta gamma delta", 2);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn equal_counts_keep_first_appearance() {
        let words = word_frequencies("Zoya Akhtar, Aamir Khan", 10);
        let order: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(order, vec!["Zoya", "Akhtar", "Aamir", "Khan"]);

        let capped = word_frequencies("Zoya Akhtar, Aamir Khan, Aamir", 2);
        let order: Vec<&str> = capped.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(order, vec!["Aamir", "Zoya"]);
    }

    #[test]
    fn frequencies_of_blank_text_are_empty() {
        assert!(word_frequencies("  , ,", 10).is_empty());
        assert!(word_frequencies("the and of", 10).is_empty());
    }

    #[test]
    fn layout_stays_inside_without_overlap() {
        let words = word_frequencies(
            "Ranbir Kapoor, Alia Bhatt, Ranbir Kapoor, Deepika Padukone, Ranveer Singh, \
             Alia Bhatt, Ranbir Kapoor, Kareena Kapoor, Hrithik Roshan, Katrina Kaif",
            50,
        );
        let cloud = layout(&words, CLOUD_WIDTH, CLOUD_HEIGHT);
        assert_eq!(cloud.width, 800);
        assert_eq!(cloud.height, 400);
        assert!(!cloud.is_empty());
        for (i, a) in cloud.words.iter().enumerate() {
            assert!(a.x >= 0.0 && a.y >= 0.0);
            assert!(a.x + a.width <= 800.0 && a.y + a.height <= 400.0);
            for b in &cloud.words[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {}", a.word, b.word);
            }
        }
        assert_eq!(cloud.words[0].word, "Kapoor");
    }

    #[test]
    fn layout_is_deterministic() {
        let words = word_frequencies("one two two three three three", 10);
        assert_eq!(layout(&words, 800, 400), layout(&words, 800, 400));
    }
}
