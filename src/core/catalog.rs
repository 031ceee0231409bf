//! Static keyword tables.
//!
//! Every table is an ordered slice. Lookups walk them front to back and stop
//! at the first hit, so entry order decides ties and must not be changed
//! casually.

use super::place::{Category, Division};

/// A canonical label and the lowercase variants that identify it in text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordEntry {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

impl KeywordEntry {
    /// True if any variant occurs as a substring of `text` (already lowercase).
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Named landmarks, checked before divisions.
pub static LANDMARKS: &[KeywordEntry] = &[
    KeywordEntry { label: "rangamati", keywords: &["rangamati"] },
    KeywordEntry {
        label: "cox's bazar",
        keywords: &["cox", "coxs bazar", "cox's bazar", "coxsbazar"],
    },
    KeywordEntry { label: "sundarbans", keywords: &["sundarban", "sundarbans"] },
    KeywordEntry { label: "bandarban", keywords: &["bandarban"] },
    KeywordEntry { label: "sajek", keywords: &["sajek"] },
    KeywordEntry { label: "saint martin", keywords: &["saint martin", "st martin"] },
    KeywordEntry { label: "kuakata", keywords: &["kuakata"] },
    KeywordEntry { label: "ratargul", keywords: &["ratargul"] },
    KeywordEntry { label: "srimangal", keywords: &["srimangal", "sreemangal"] },
    KeywordEntry { label: "paharpur", keywords: &["paharpur"] },
    KeywordEntry { label: "mahasthangarh", keywords: &["mahasthangarh"] },
    KeywordEntry { label: "jaflong", keywords: &["jaflong"] },
    KeywordEntry { label: "tanguar haor", keywords: &["tanguar", "tanguar haor"] },
];

/// The eight divisions in their fixed lookup order.
pub static DIVISIONS: &[KeywordEntry] = &[
    KeywordEntry { label: "dhaka", keywords: &["dhaka"] },
    KeywordEntry { label: "chittagong", keywords: &["chittagong", "chattogram", "ctg"] },
    KeywordEntry { label: "khulna", keywords: &["khulna"] },
    KeywordEntry { label: "sylhet", keywords: &["sylhet"] },
    KeywordEntry { label: "barisal", keywords: &["barisal", "barishal"] },
    KeywordEntry { label: "rajshahi", keywords: &["rajshahi"] },
    KeywordEntry { label: "rangpur", keywords: &["rangpur"] },
    KeywordEntry { label: "mymensingh", keywords: &["mymensingh"] },
];

/// Terms that turn a query into a country-wide request.
pub static COUNTRY_TERMS: &[&str] = &["bangladesh", "bd", "country", "nation"];

/// Allow-list used for country-wide queries so obscure places stay out.
pub static FAMOUS_SPOTS: &[&str] = &[
    "cox",
    "sundarban",
    "saint martin",
    "rangamati",
    "bandarban",
    "sajek",
    "kuakata",
    "paharpur",
    "ratargul",
    "srimangal",
];

#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
}

pub static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule { category: Category::Beach, keywords: &["beach", "sea", "ocean", "coast", "marine"] },
    CategoryRule { category: Category::Hill, keywords: &["hill", "mountain", "highland", "valley"] },
    CategoryRule { category: Category::Lake, keywords: &["lake", "water", "reservoir"] },
    CategoryRule {
        category: Category::Forest,
        keywords: &["forest", "jungle", "wildlife", "sanctuary", "mangrove"],
    },
    CategoryRule {
        category: Category::Historical,
        keywords: &["historical", "ancient", "heritage", "archaeological", "monument", "fort", "palace"],
    },
    CategoryRule {
        category: Category::Religious,
        keywords: &["mosque", "temple", "church", "monastery", "shrine", "religious"],
    },
    CategoryRule { category: Category::Park, keywords: &["park", "garden", "botanical"] },
    CategoryRule { category: Category::Waterfall, keywords: &["waterfall", "fall", "cascade"] },
    CategoryRule { category: Category::Island, keywords: &["island", "char"] },
    CategoryRule { category: Category::TeaGarden, keywords: &["tea", "garden", "estate"] },
    CategoryRule { category: Category::Museum, keywords: &["museum", "gallery"] },
    CategoryRule { category: Category::River, keywords: &["river", "ghat"] },
];

/// Hints for placing a record in a division.
///
/// `names` are the division's own spellings, `hints` are landmarks known to
/// lie inside it. "kuakata" is listed under Khulna and Barisal; Khulna wins.
#[derive(Debug, Clone, Copy)]
pub struct DivisionHint {
    pub division: Division,
    pub names: &'static [&'static str],
    pub hints: &'static [&'static str],
}

pub static DIVISION_HINTS: &[DivisionHint] = &[
    DivisionHint {
        division: Division::Dhaka,
        names: &["dhaka"],
        hints: &[
            "buriganga", "lalbagh", "ahsan manzil", "national museum", "shahbag", "ramna",
            "dhanmondi", "gulshan", "uttara", "old dhaka", "sadarghat",
        ],
    },
    DivisionHint {
        division: Division::Chittagong,
        names: &["chittagong", "chattogram"],
        hints: &[
            "cox's bazar", "cox bazar", "coxs bazar", "patenga", "foy's lake", "kaptai",
            "rangamati", "khagrachari", "bandarban", "sitakunda", "mirsharai",
        ],
    },
    DivisionHint {
        division: Division::Khulna,
        names: &["khulna"],
        hints: &["sundarbans", "sundarban", "bagerhat", "mongla", "kuakata", "satkhira"],
    },
    DivisionHint {
        division: Division::Sylhet,
        names: &["sylhet"],
        hints: &[
            "ratargul", "jaflong", "madhabkunda", "lalakhal", "srimangal", "sreemangal",
            "tea garden", "tamabil",
        ],
    },
    DivisionHint {
        division: Division::Barisal,
        names: &["barisal", "barishal"],
        hints: &["kuakata", "durga sagar", "patuakhali", "bhola"],
    },
    DivisionHint {
        division: Division::Rajshahi,
        names: &["rajshahi"],
        hints: &["paharpur", "bagha", "puthia", "varendra", "natore"],
    },
    DivisionHint {
        division: Division::Rangpur,
        names: &["rangpur"],
        hints: &["tetulia", "nilphamari", "dinajpur", "kantaji"],
    },
    DivisionHint {
        division: Division::Mymensingh,
        names: &["mymensingh"],
        hints: &["shashi lake", "brahmaputra", "jamalpur"],
    },
];

pub fn find_entry<'a>(table: &'a [KeywordEntry], text: &str) -> Option<&'a KeywordEntry> {
    table.iter().find(|entry| entry.matches(text))
}
