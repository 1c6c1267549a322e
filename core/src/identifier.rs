//! Identifier sets for named async operations
//!
//! Every async operation is known to the store by a single name, such as
//! `GET_DATA`. From that name an [`IdentifierSet`] derives:
//!
//! - the base mutation identifier (the registry key),
//! - one lifecycle identifier per [`LifecycleEvent`] (`GET_DATA_PENDING`, ...),
//! - the three state keys the mutation handler writes to (`getDataPending`, ...).
//!
//! Derivation is a pure function of the name, so an identifier set can be
//! rebuilt anywhere it is needed and will always compare equal.

use crate::payload::LifecycleEvent;
use serde::{Deserialize, Serialize};

/// Suffix appended to the operation name for the success identifier
pub const SUCCESS_SUFFIX: &str = "_SUCCESS";

/// Suffix appended to the operation name for the failure identifier
pub const FAILURE_SUFFIX: &str = "_FAILURE";

/// Suffix appended to the operation name for the pending identifier
pub const PENDING_SUFFIX: &str = "_PENDING";

/// Suffix appended to the camel-cased name for the loading flag key
pub const LOADING_KEY_SUFFIX: &str = "Pending";

/// Suffix appended to the camel-cased name for the status code key
pub const STATUS_CODE_KEY_SUFFIX: &str = "StatusCode";

/// Suffix appended to the camel-cased name for the data key
pub const STATE_KEY_SUFFIX: &str = "Data";

/// The derived identifiers and state keys of one async operation
///
/// Serialized field names follow the conventional store layout
/// (`BASE`, `SUCCESS`, `FAILURE`, `PENDING`, `loadingKey`, `statusCode`, `stateKey`).
///
/// # Example
///
/// ```
/// use async_lifecycle_core::identifier::IdentifierSet;
///
/// let set = IdentifierSet::new("GET_DATA");
/// assert_eq!(set.base, "GET_DATA");
/// assert_eq!(set.success, "GET_DATA_SUCCESS");
/// assert_eq!(set.loading_key, "getDataPending");
/// assert_eq!(set.state_key, "getDataData");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierSet {
    /// The operation name, verbatim; also the registry key
    #[serde(rename = "BASE")]
    pub base: String,

    /// Identifier carried by success payloads
    #[serde(rename = "SUCCESS")]
    pub success: String,

    /// Identifier carried by failure payloads
    #[serde(rename = "FAILURE")]
    pub failure: String,

    /// Identifier carried by pending payloads
    #[serde(rename = "PENDING")]
    pub pending: String,

    /// State key holding the in-flight flag
    #[serde(rename = "loadingKey")]
    pub loading_key: String,

    /// State key holding the last HTTP status code
    #[serde(rename = "statusCode")]
    pub status_code_key: String,

    /// State key holding the last successful data
    #[serde(rename = "stateKey")]
    pub state_key: String,
}

impl IdentifierSet {
    /// Derive the identifier set for an operation name
    ///
    /// Any string is accepted. An empty name yields degenerate but
    /// well-formed identifiers (`"_SUCCESS"`, `"Pending"`, ...).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let base = name.into();
        let prefix = camel_case(&base);

        Self {
            success: format!("{base}{SUCCESS_SUFFIX}"),
            failure: format!("{base}{FAILURE_SUFFIX}"),
            pending: format!("{base}{PENDING_SUFFIX}"),
            loading_key: format!("{prefix}{LOADING_KEY_SUFFIX}"),
            status_code_key: format!("{prefix}{STATUS_CODE_KEY_SUFFIX}"),
            state_key: format!("{prefix}{STATE_KEY_SUFFIX}"),
            base,
        }
    }

    /// Classify a payload identifier against this set
    ///
    /// Returns `None` when the identifier belongs to some other operation.
    #[must_use]
    pub fn event_for(&self, type_id: &str) -> Option<LifecycleEvent> {
        if type_id == self.pending {
            Some(LifecycleEvent::Pending)
        } else if type_id == self.success {
            Some(LifecycleEvent::Success)
        } else if type_id == self.failure {
            Some(LifecycleEvent::Failure)
        } else {
            None
        }
    }

    /// The identifier carried by payloads of the given lifecycle event
    #[must_use]
    pub fn identifier(&self, event: LifecycleEvent) -> &str {
        match event {
            LifecycleEvent::Pending => &self.pending,
            LifecycleEvent::Success => &self.success,
            LifecycleEvent::Failure => &self.failure,
        }
    }
}

/// Derive the identifier set for an operation name
///
/// Free-function form of [`IdentifierSet::new`].
#[must_use]
pub fn create_mutation_set(name: &str) -> IdentifierSet {
    IdentifierSet::new(name)
}

/// Lower-camel-case a name
///
/// The name is split into words on any non-alphanumeric character, on
/// lower-to-upper transitions, at the end of an acronym run (`XMLHttp` splits
/// into `XML` and `Http`) and after digits followed by a letter. Latin-1 and
/// Latin Extended-A letters are reduced to basic Latin (`café` becomes
/// `cafe`), combining marks and apostrophes are dropped, all before
/// splitting. The first word is lower-cased and every following word is
/// capitalized.
///
/// ```
/// use async_lifecycle_core::identifier::camel_case;
///
/// assert_eq!(camel_case("GET_DATA"), "getData");
/// assert_eq!(camel_case("fetch user-profile"), "fetchUserProfile");
/// assert_eq!(camel_case("XMLHttpRequest"), "xmlHttpRequest");
/// ```
#[must_use]
pub fn camel_case(name: &str) -> String {
    split_words(name)
        .iter()
        .enumerate()
        .map(|(index, word)| {
            if index == 0 {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect()
}

fn split_words(name: &str) -> Vec<String> {
    let cleaned: Vec<char> = deburr(name)
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .collect();

    let mut words = Vec::new();
    for segment in cleaned.split(|c| !c.is_alphanumeric()) {
        let mut current = String::new();
        for (index, &c) in segment.iter().enumerate() {
            if index > 0 && is_word_boundary(segment, index) {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

fn deburr(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if is_combining_mark(c) {
            continue;
        }
        match deburr_letter(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}

const fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}' | '\u{fe20}'..='\u{fe2f}' | '\u{20d0}'..='\u{20ff}')
}

/// Basic Latin spelling of a Latin-1 Supplement or Latin Extended-A letter
const fn deburr_letter(c: char) -> Option<&'static str> {
    let basic = match c {
        // Latin-1 Supplement
        'À'..='Å' => "A",
        'à'..='å' => "a",
        'Ç' => "C",
        'ç' => "c",
        'Ð' => "D",
        'ð' => "d",
        'È'..='Ë' => "E",
        'è'..='ë' => "e",
        'Ì'..='Ï' => "I",
        'ì'..='ï' => "i",
        'Ñ' => "N",
        'ñ' => "n",
        'Ò'..='Ö' | 'Ø' => "O",
        'ò'..='ö' | 'ø' => "o",
        'Ù'..='Ü' => "U",
        'ù'..='ü' => "u",
        'Ý' => "Y",
        'ý' | 'ÿ' => "y",
        'Æ' => "Ae",
        'æ' => "ae",
        'Þ' => "Th",
        'þ' => "th",
        'ß' => "ss",
        // Latin Extended-A
        'Ā' | 'Ă' | 'Ą' => "A",
        'ā' | 'ă' | 'ą' => "a",
        'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C",
        'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ď' | 'Đ' => "D",
        'ď' | 'đ' => "d",
        'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĥ' | 'Ħ' => "H",
        'ĥ' | 'ħ' => "h",
        'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ĵ' => "J",
        'ĵ' => "j",
        'Ķ' => "K",
        'ķ' | 'ĸ' => "k",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ń' | 'Ņ' | 'Ň' | 'Ŋ' => "N",
        'ń' | 'ņ' | 'ň' | 'ŋ' => "n",
        'Ō' | 'Ŏ' | 'Ő' => "O",
        'ō' | 'ŏ' | 'ő' => "o",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ſ' => "s",
        'Ţ' | 'Ť' | 'Ŧ' => "T",
        'ţ' | 'ť' | 'ŧ' => "t",
        'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ŵ' => "W",
        'ŵ' => "w",
        'Ŷ' | 'Ÿ' => "Y",
        'ŷ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        'Ĳ' => "IJ",
        'ĳ' => "ij",
        'Œ' => "Oe",
        'œ' => "oe",
        'ŉ' => "'n",
        _ => return None,
    };
    Some(basic)
}

fn is_word_boundary(segment: &[char], index: usize) -> bool {
    let prev = segment[index - 1];
    let cur = segment[index];
    let next = segment.get(index + 1).copied();

    (prev.is_lowercase() && cur.is_uppercase())
        || (prev.is_numeric() && cur.is_alphabetic())
        || (prev.is_uppercase() && cur.is_uppercase() && next.is_some_and(char::is_lowercase))
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
