//! Rule-based lexicon scorer producing a compound polarity in `[-1.0, 1.0]`.
//!
//! Each known word contributes a valence on a `[-4, 4]` scale. Valences are
//! adjusted by preceding booster words, negations within three tokens,
//! ALL-CAPS emphasis and a contrastive "but", then summed, emphasised by
//! exclamation marks and normalised with `x / sqrt(x² + 15)`.

use stocksent_core::table::{Column, HEADLINE, SENTIMENT};
use stocksent_core::{NewsTable, SchemaError};

/// Word valences on a `[-4.0, 4.0]` scale. Keys are lowercase.
const LEXICON: &[(&str, f64)] = &[
    // Positive: general
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("best", 3.2),
    ("better", 1.9),
    ("positive", 2.6),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("wins", 2.7),
    ("won", 2.7),
    ("love", 3.2),
    ("like", 1.5),
    ("happy", 2.7),
    ("optimistic", 1.9),
    ("optimism", 2.5),
    ("confident", 2.2),
    ("confidence", 2.3),
    ("strong", 2.3),
    ("stronger", 2.1),
    ("strength", 2.2),
    ("robust", 1.6),
    ("solid", 1.5),
    ("impressive", 2.5),
    ("innovative", 1.9),
    ("approved", 1.8),
    ("approval", 2.0),
    ("safe", 1.9),
    ("secure", 1.4),
    ("stable", 1.2),
    ("improve", 1.9),
    ("improved", 2.1),
    ("improves", 1.8),
    ("improvement", 2.0),
    ("recover", 1.4),
    ("recovery", 1.4),
    ("opportunity", 1.8),
    ("benefit", 2.0),
    ("benefits", 1.6),
    ("celebrate", 2.7),
    ("praise", 2.6),
    ("favorable", 2.1),
    ("upbeat", 1.8),
    ("bright", 1.9),
    ("resilient", 1.6),
    // Positive: markets
    ("beat", 1.5),
    ("beats", 1.5),
    ("rally", 1.8),
    ("rallies", 1.8),
    ("rallied", 1.8),
    ("surge", 1.9),
    ("surges", 1.9),
    ("surged", 1.9),
    ("soar", 2.2),
    ("soars", 2.2),
    ("soared", 2.2),
    ("jump", 1.2),
    ("jumps", 1.2),
    ("jumped", 1.2),
    ("gain", 2.0),
    ("gains", 1.8),
    ("gained", 1.6),
    ("rise", 0.9),
    ("rises", 0.9),
    ("rose", 0.9),
    ("climb", 1.0),
    ("climbs", 1.0),
    ("growth", 1.6),
    ("growing", 1.3),
    ("grow", 1.4),
    ("grows", 1.4),
    ("profit", 1.9),
    ("profits", 1.9),
    ("profitable", 2.0),
    ("record", 1.1),
    ("upgrade", 1.7),
    ("upgraded", 1.7),
    ("outperform", 2.0),
    ("outperforms", 2.0),
    ("bullish", 2.0),
    ("boost", 1.7),
    ("boosts", 1.7),
    ("boosted", 1.5),
    ("expand", 1.3),
    ("expands", 1.3),
    ("expansion", 1.2),
    ("dividend", 1.0),
    ("buyback", 0.9),
    ("breakthrough", 2.3),
    ("exceeds", 1.6),
    ("exceeded", 1.6),
    ("tops", 1.1),
    ("upside", 1.3),
    ("thrive", 2.2),
    ("thriving", 2.2),
    // Negative: general
    ("bad", -2.5),
    ("worse", -2.1),
    ("worst", -3.1),
    ("terrible", -2.5),
    ("awful", -2.0),
    ("poor", -2.1),
    ("negative", -2.7),
    ("fail", -2.5),
    ("fails", -2.3),
    ("failed", -2.3),
    ("failure", -2.3),
    ("problem", -1.7),
    ("problems", -1.7),
    ("concern", -1.2),
    ("concerns", -1.3),
    ("worry", -1.9),
    ("worries", -1.8),
    ("fear", -2.2),
    ("fears", -2.0),
    ("risk", -1.1),
    ("risks", -1.1),
    ("risky", -1.4),
    ("warning", -1.4),
    ("warns", -1.4),
    ("threat", -2.4),
    ("crisis", -3.1),
    ("dangerous", -2.1),
    ("harmful", -2.3),
    ("weak", -1.9),
    ("weaker", -1.9),
    ("weakness", -1.6),
    ("uncertain", -1.2),
    ("uncertainty", -1.4),
    ("pessimistic", -1.5),
    ("disappointing", -2.2),
    ("disappoints", -2.0),
    ("disappointed", -1.9),
    ("angry", -2.3),
    ("scandal", -1.9),
    ("fraud", -2.8),
    ("illegal", -2.6),
    ("banned", -2.0),
    ("ban", -2.6),
    ("lawsuit", -1.7),
    ("sued", -1.6),
    ("sues", -1.6),
    ("probe", -1.1),
    ("investigation", -1.0),
    ("fine", 0.8),
    ("fined", -1.5),
    ("penalty", -1.6),
    ("recall", -1.4),
    ("recalls", -1.4),
    ("shutdown", -1.9),
    ("layoffs", -1.9),
    ("layoff", -1.9),
    ("cut", -1.1),
    ("cuts", -1.1),
    // Negative: markets
    ("miss", -1.5),
    ("misses", -1.5),
    ("missed", -1.3),
    ("plunge", -2.1),
    ("plunges", -2.1),
    ("plunged", -2.1),
    ("plummet", -2.3),
    ("plummets", -2.3),
    ("tumble", -1.7),
    ("tumbles", -1.7),
    ("slump", -1.8),
    ("slumps", -1.8),
    ("sink", -1.3),
    ("sinks", -1.3),
    ("slide", -1.0),
    ("slides", -1.0),
    ("drop", -1.1),
    ("drops", -1.1),
    ("dropped", -1.1),
    ("fall", -1.0),
    ("falls", -1.0),
    ("fell", -1.0),
    ("decline", -1.3),
    ("declines", -1.3),
    ("declined", -1.3),
    ("loss", -1.3),
    ("losses", -1.7),
    ("lose", -1.7),
    ("loses", -1.6),
    ("downgrade", -1.7),
    ("downgraded", -1.7),
    ("underperform", -1.8),
    ("bearish", -1.8),
    ("selloff", -1.9),
    ("crash", -2.8),
    ("crashes", -2.6),
    ("bankrupt", -2.6),
    ("bankruptcy", -2.7),
    ("default", -1.5),
    ("debt", -1.0),
    ("volatile", -1.0),
    ("volatility", -0.9),
    ("recession", -2.2),
    ("downturn", -1.8),
    ("downside", -1.2),
    ("slowdown", -1.4),
    ("struggle", -1.9),
    ("struggles", -1.9),
    ("struggling", -2.0),
];

/// Words that intensify (positive) or dampen (negative) the next valence.
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR),
    ("completely", B_INCR),
    ("considerably", B_INCR),
    ("deeply", B_INCR),
    ("especially", B_INCR),
    ("extremely", B_INCR),
    ("greatly", B_INCR),
    ("highly", B_INCR),
    ("hugely", B_INCR),
    ("incredibly", B_INCR),
    ("massively", B_INCR),
    ("more", B_INCR),
    ("most", B_INCR),
    ("particularly", B_INCR),
    ("really", B_INCR),
    ("sharply", B_INCR),
    ("significantly", B_INCR),
    ("so", B_INCR),
    ("strongly", B_INCR),
    ("substantially", B_INCR),
    ("totally", B_INCR),
    ("very", B_INCR),
    ("barely", B_DECR),
    ("hardly", B_DECR),
    ("less", B_DECR),
    ("marginally", B_DECR),
    ("modestly", B_DECR),
    ("partly", B_DECR),
    ("slightly", B_DECR),
    ("somewhat", B_DECR),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "without", "rarely", "seldom",
];

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
/// Added to a word's valence when it is shouted in mixed-case text.
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
const ALPHA: f64 = 15.0;
const EXCLAIM_STEP: f64 = 0.292;
const MAX_EXCLAIMS: usize = 4;

/// Column the lexicon scorer reads when none is given.
pub const DEFAULT_SOURCE_COLUMN: &str = HEADLINE;

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

impl Token<'_> {
    fn is_shouted(&self) -> bool {
        self.raw.chars().filter(|c| c.is_alphabetic()).count() > 1
            && self
                .raw
                .chars()
                .filter(|c| c.is_alphabetic())
                .all(char::is_uppercase)
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
        .map(|raw| Token {
            raw,
            lower: raw.to_lowercase(),
        })
        .collect()
}

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|&(_, v)| v)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

/// Scores `text`, returning a compound polarity in `[-1.0, 1.0]`.
///
/// Empty and whitespace-only text, and text with no known words, score
/// exactly `0.0`. The result is a pure function of the input.
#[must_use]
pub fn lexicon_score(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }

    let tokens = tokenize(text);
    let shouted = tokens.iter().filter(|t| t.is_shouted()).count();
    let mixed_case = shouted > 0 && shouted < tokens.len();

    let mut valences = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let Some(mut v) = lookup(LEXICON, &token.lower) else {
            valences.push(0.0);
            continue;
        };

        if mixed_case && token.is_shouted() {
            v += C_INCR.copysign(v);
        }

        for distance in 1..=3 {
            let Some(prev) = i.checked_sub(distance).map(|j| &tokens[j]) else {
                break;
            };
            if let Some(boost) = lookup(BOOSTERS, &prev.lower) {
                let mut scalar = if v < 0.0 { -boost } else { boost };
                if mixed_case && prev.is_shouted() {
                    scalar += C_INCR.copysign(v);
                }
                let damp = match distance {
                    1 => 1.0,
                    2 => 0.95,
                    _ => 0.9,
                };
                v += scalar * damp;
            }
            if is_negation(&prev.lower) {
                v *= N_SCALAR;
            }
        }

        valences.push(v);
    }

    // Contrast: what follows "but" outweighs what precedes it.
    if let Some(pivot) = tokens.iter().position(|t| t.lower == "but") {
        for (i, v) in valences.iter_mut().enumerate() {
            if i < pivot {
                *v *= 0.5;
            } else if i > pivot {
                *v *= 1.5;
            }
        }
    }

    let mut sum: f64 = valences.iter().sum();
    if sum == 0.0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let exclaims = text.matches('!').count().min(MAX_EXCLAIMS) as f64;
    sum += (exclaims * EXCLAIM_STEP).copysign(sum);

    round4(normalize(sum))
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Lexicon scorer over table columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Scores one optional text value. Absent text scores `0.0`.
    #[must_use]
    pub fn score(&self, text: Option<&str>) -> f64 {
        text.map_or(0.0, lexicon_score)
    }

    /// Adds a `sentiment` column scored from `headline`.
    ///
    /// # Errors
    ///
    /// See [`LexiconScorer::annotate_column`].
    pub fn annotate(&self, table: &NewsTable) -> Result<NewsTable, SchemaError> {
        self.annotate_column(table, DEFAULT_SOURCE_COLUMN)
    }

    /// Returns a copy of `table` with a `sentiment` column scored from
    /// `source_column`. `table` itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if `source_column` is missing or not text,
    /// or if the table already has a `sentiment` column.
    pub fn annotate_column(
        &self,
        table: &NewsTable,
        source_column: &str,
    ) -> Result<NewsTable, SchemaError> {
        let scores = table
            .text_column(source_column)?
            .iter()
            .map(|text| self.score(text.as_deref()))
            .collect();
        table.with_column(SENTIMENT, Column::Float(scores))
    }
}

#[cfg(test)]
mod tests {
    use stocksent_core::table::{DESCRIPTION, FINBERT_SENTIMENT};
    use stocksent_core::NewsRecord;

    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn whitespace_only_returns_zero() {
        assert_eq!(lexicon_score(" \t\n "), 0.0);
    }

    #[test]
    fn absent_text_returns_zero() {
        assert_eq!(LexiconScorer.score(None), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn earnings_beat_is_positive() {
        let score = lexicon_score("Firm beats estimates");
        assert!(score > 0.0, "expected positive score, got {score}");
    }

    #[test]
    fn plunge_is_negative() {
        let score = lexicon_score("Shares plunge after guidance cut");
        assert!(score < 0.0, "expected negative score, got {score}");
    }

    #[test]
    fn scoring_is_deterministic() {
        let text = "Stocks RALLY as profits surge, but risks remain!";
        let first = lexicon_score(text);
        for _ in 0..5 {
            assert_eq!(lexicon_score(text).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn negation_flips_polarity() {
        let plain = lexicon_score("results were good");
        let negated = lexicon_score("results were not good");
        assert!(plain > 0.0);
        assert!(negated < 0.0, "expected negated score below zero, got {negated}");
    }

    #[test]
    fn contraction_negation_flips_polarity() {
        assert!(lexicon_score("the launch wasn't successful") < 0.0);
    }

    #[test]
    fn booster_intensifies() {
        assert!(lexicon_score("very strong quarter") > lexicon_score("strong quarter"));
    }

    #[test]
    fn dampener_softens() {
        assert!(lexicon_score("slightly weak quarter") > lexicon_score("weak quarter"));
    }

    #[test]
    fn shouting_in_mixed_case_intensifies() {
        assert!(lexicon_score("Shares SURGE today") > lexicon_score("Shares surge today"));
    }

    #[test]
    fn exclamation_intensifies() {
        assert!(lexicon_score("Shares surge!!") > lexicon_score("Shares surge"));
    }

    #[test]
    fn clause_after_but_dominates() {
        let score = lexicon_score("Revenue was good but the outlook is terrible");
        assert!(score < 0.0, "expected the clause after `but` to win, got {score}");
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let pos = "great excellent best love win success breakthrough soars rally!!!!";
        let neg = "worst crash fraud bankruptcy crisis plunge terrible failure";
        let p = lexicon_score(pos);
        let n = lexicon_score(neg);
        assert!(p > 0.9 && p <= 1.0, "got {p}");
        assert!(n < -0.9 && n >= -1.0, "got {n}");
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(lexicon_score("great!") > 0.0);
        assert!(lexicon_score("\"loss\",") < 0.0);
    }

    #[test]
    fn annotate_adds_sentiment_column_from_headline() {
        let table = NewsTable::from_records(vec![
            NewsRecord::new("Profits surge", Some("2025-01-01".into()), None).unwrap(),
            NewsRecord::new("Quarterly filing", Some("2025-01-02".into()), Some("great".into())).unwrap(),
        ]);
        let scored = LexiconScorer.annotate(&table).unwrap();
        match scored.column(SENTIMENT) {
            Some(Column::Float(values)) => {
                assert!(values[0] > 0.0);
                assert_eq!(values[1], 0.0);
            }
            other => panic!("expected float sentiment column, got {other:?}"),
        }
        assert!(!table.has_column(SENTIMENT));
    }

    #[test]
    fn annotate_fails_without_source_column() {
        let table = NewsTable::from_columns(vec![(
            DESCRIPTION.to_string(),
            Column::Text(vec![Some("x".into())]),
        )])
        .unwrap();
        let before = table.clone();
        let err = LexiconScorer.annotate(&table).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn(HEADLINE.to_string()));
        assert_eq!(table, before);
    }

    #[test]
    fn annotate_column_reads_requested_column() {
        let table = NewsTable::from_records(vec![NewsRecord::new(
            "Quarterly filing",
            Some("2025-01-02".into()),
            Some("a terrible loss".into()),
        )
        .unwrap()]);
        let scored = LexiconScorer.annotate_column(&table, DESCRIPTION).unwrap();
        match scored.column(SENTIMENT) {
            Some(Column::Float(values)) => assert!(values[0] < 0.0),
            other => panic!("unexpected column: {other:?}"),
        }
        assert!(!scored.has_column(FINBERT_SENTIMENT));
    }
}
