//! Heuristic recognizer for commented-out code.
//!
//! Each detector counts how often its footprint occurs in a line and
//! turns the count into a probability `1 - (1 - p)^n`. Detector
//! probabilities combine as `1 - Π(1 - p_i)`; a line is code when the
//! result exceeds the recognizer threshold.

use crate::lexer::keywords::is_keyword;

/// Probability above which a comment line is treated as code.
pub const CODE_THRESHOLD: f64 = 0.9;

/// One language footprint.
#[derive(Debug, Clone)]
pub enum Detector {
    /// Line ends with one of the characters (trailing whitespace ignored).
    EndWith {
        probability: f64,
        endings: &'static [char],
    },
    /// Words of the vocabulary, after splitting on whitespace and `(),{}`.
    Keywords {
        probability: f64,
        vocabulary: Vocabulary,
    },
    /// Occurrences of the needles once all whitespace is removed.
    Contains {
        probability: f64,
        needles: &'static [&'static str],
    },
}

impl Detector {
    pub fn probability(&self) -> f64 {
        match self {
            Detector::EndWith { probability, .. }
            | Detector::Keywords { probability, .. }
            | Detector::Contains { probability, .. } => *probability,
        }
    }

    /// Number of footprint occurrences in `line`.
    pub fn scan(&self, line: &str) -> usize {
        match self {
            Detector::EndWith { endings, .. } => {
                let last = line.trim_end().chars().last();
                usize::from(last.map(|c| endings.contains(&c)).unwrap_or(false))
            }
            Detector::Keywords { vocabulary, .. } => line
                .split(|c: char| c.is_whitespace() || "(),{}".contains(c))
                .filter(|word| !word.is_empty() && vocabulary.contains(word))
                .count(),
            Detector::Contains { needles, .. } => {
                let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
                needles.iter().map(|n| compact.matches(n).count()).sum()
            }
        }
    }

    /// Probability that `line` is code according to this detector alone.
    pub fn recognition(&self, line: &str) -> f64 {
        match self.scan(line) {
            0 => 0.0,
            n => 1.0 - (1.0 - self.probability()).powi(n as i32),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Vocabulary {
    Words(&'static [&'static str]),
    /// Reserved C# keywords.
    CSharpKeywords,
}

impl Vocabulary {
    pub fn contains(&self, word: &str) -> bool {
        match self {
            Vocabulary::Words(words) => words.contains(&word),
            Vocabulary::CSharpKeywords => is_keyword(word),
        }
    }
}

/// Combines detectors into a code / not-code decision.
#[derive(Debug, Clone)]
pub struct CodeRecognizer {
    threshold: f64,
    detectors: Vec<Detector>,
}

impl Default for CodeRecognizer {
    fn default() -> Self {
        Self::csharp()
    }
}

impl CodeRecognizer {
    pub fn new(threshold: f64, detectors: Vec<Detector>) -> Self {
        Self {
            threshold,
            detectors,
        }
    }

    /// Footprints of C# statements.
    pub fn csharp() -> Self {
        Self::new(
            CODE_THRESHOLD,
            vec![
                Detector::EndWith {
                    probability: 0.95,
                    endings: &['}', ';', '{'],
                },
                Detector::Keywords {
                    probability: 0.7,
                    vocabulary: Vocabulary::Words(&["||", "&&"]),
                },
                Detector::Keywords {
                    probability: 0.3,
                    vocabulary: Vocabulary::CSharpKeywords,
                },
                Detector::Contains {
                    probability: 0.95,
                    needles: &["++", "for(", "if(", "while(", "catch(", "switch(", "try{", "else{"],
                },
            ],
        )
    }

    pub fn probability(&self, line: &str) -> f64 {
        let miss: f64 = self
            .detectors
            .iter()
            .map(|d| 1.0 - d.recognition(line))
            .product();
        1.0 - miss
    }

    pub fn is_code(&self, line: &str) -> bool {
        self.probability(line) > self.threshold
    }
}
