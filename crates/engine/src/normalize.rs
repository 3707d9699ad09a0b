use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Normalized forms
// ---------------------------------------------------------------------------

/// Comparable forms of one person name. All three are derived in a single
/// pass and stay consistent with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    /// Lowercased, diacritics folded, punctuation dropped, spaces collapsed,
    /// each token mapped through the nickname table.
    pub lower: String,
    /// Letters and digits only, original order, no nickname expansion.
    /// "Jon  Smith." and "JonSmith" share this form; "Smith Jon" does not.
    pub letters_only: String,
    /// `lower` split on spaces, order preserved.
    pub tokens: Vec<String>,
}

impl NormalizedName {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens sorted for order-insensitive comparison.
    pub fn sorted_tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }

    /// First character of each token, sorted. Repeated initials are kept.
    pub fn sorted_initials(&self) -> Vec<char> {
        let mut initials: Vec<char> = self
            .tokens
            .iter()
            .filter_map(|t| t.chars().next())
            .collect();
        initials.sort_unstable();
        initials
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Produces [`NormalizedName`]s against an injected nickname table.
/// Deterministic: the same input always yields the same forms.
pub struct NameNormalizer {
    nicknames: HashMap<String, String>,
}

impl NameNormalizer {
    pub fn new(nicknames: HashMap<String, String>) -> Self {
        Self { nicknames }
    }

    pub fn normalize(&self, name: &str) -> NormalizedName {
        let folded: String = name.to_lowercase().chars().map(fold_char).collect();

        let mut cleaned = String::with_capacity(folded.len());
        for c in folded.chars() {
            if c.is_ascii_alphanumeric() {
                cleaned.push(c);
            } else if c.is_whitespace() {
                cleaned.push(' ');
            }
        }

        let tokens: Vec<String> = cleaned
            .split_whitespace()
            .map(|t| match self.nicknames.get(t) {
                Some(canonical) => canonical.clone(),
                None => t.to_string(),
            })
            .collect();

        let lower = tokens.join(" ");

        // From the folded raw string, so spacing and nicknames play no part.
        let letters_only: String = folded
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        NormalizedName {
            lower,
            letters_only,
            tokens,
        }
    }
}

/// Fold common Latin-1 / Latin Extended-A letters to their ASCII base.
/// Input is already lowercased.
fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' => 'i',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' => 'u',
        'ý' | 'ÿ' => 'y',
        'ś' | 'š' => 's',
        'ź' | 'ż' | 'ž' => 'z',
        'ď' | 'đ' | 'ð' => 'd',
        'ł' => 'l',
        'ř' => 'r',
        'ť' => 't',
        'þ' => 't',
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
