//! Reserved words and punctuators of the C# language.

use phf::phf_set;

/// Reserved keywords. Contextual keywords (`get`, `set`, `var`, `where`,
/// `yield`, `partial`, query keywords...) are lexed as identifiers and
/// matched by spelling in the grammar.
pub static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch",
    "char", "checked", "class", "const", "continue", "decimal", "default",
    "delegate", "do", "double", "else", "enum", "event", "explicit",
    "extern", "false", "finally", "fixed", "float", "for", "foreach",
    "goto", "if", "implicit", "in", "int", "interface", "internal", "is",
    "lock", "long", "namespace", "new", "null", "object", "operator",
    "out", "override", "params", "private", "protected", "public",
    "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof",
    "stackalloc", "static", "string", "struct", "switch", "this", "throw",
    "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe",
    "ushort", "using", "virtual", "void", "volatile", "while",
};

/// Punctuators and operators, longest first so the first prefix match is
/// the longest one.
///
/// `>>` and `>>=` are deliberately absent: the grammar assembles them from
/// single `>` tokens so that `List<List<int>>` closes two argument lists.
pub const PUNCTUATORS: &[&str] = &[
    "<<=", "??", "::", "++", "--", "&&", "||", "->", "==", "!=", "<=", ">=", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "<<", "=>", "{", "}", "[", "]", "(", ")", ".", ",", ":", ";",
    "+", "-", "*", "/", "%", "&", "|", "^", "!", "~", "=", "<", ">", "?",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(KEYWORDS.len(), 77);
        assert!(is_keyword("class"));
        assert!(is_keyword("stackalloc"));
        assert!(!is_keyword("var"));
        assert!(!is_keyword("yield"));
        assert!(!is_keyword("Class"));
    }

    #[test]
    fn test_punctuators_longest_first() {
        for (i, p) in PUNCTUATORS.iter().enumerate() {
            for longer in &PUNCTUATORS[i + 1..] {
                assert!(
                    !(longer.starts_with(p) && longer.len() > p.len()),
                    "{:?} shadows {:?}",
                    p,
                    longer
                );
            }
        }
    }
}
