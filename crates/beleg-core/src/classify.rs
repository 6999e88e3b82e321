//! Keyword-table classification and language detection
//!
//! Everything here is a fixed lookup table: vendor names to categories,
//! item description keywords to categories, and the German/English keyword
//! sets used to pick a response language and to find category words in a
//! query. Heuristics, not classifiers; short or keyword-free text will
//! misdetect and that is acceptable.

use crate::models::{Category, Language};

/// Exact-match vendor to category table
const VENDOR_CATEGORIES: &[(&str, Category)] = &[
    // Electronics stores
    ("Saturn", Category::Electronics),
    ("MediaMarkt", Category::Electronics),
    // Online retail
    ("Amazon", Category::Hardware),
    // Travel
    ("Deutsche Bahn", Category::Travel),
    ("Lufthansa", Category::Travel),
    // Grocery stores
    ("Rewe", Category::Groceries),
    ("Aldi", Category::Groceries),
    // Gas stations
    ("Shell", Category::Fuel),
    ("Aral", Category::Fuel),
    // Furniture
    ("IKEA", Category::Furniture),
    // Restaurants/Bars
    ("Pub Express", Category::Meals),
    ("Restaurant", Category::Meals),
];

/// Ordered item classification rules, first match wins
///
/// Matched against the lowercased concatenation of item description and
/// vendor name.
const ITEM_RULES: &[(&[&str], Category)] = &[
    (
        &[
            "wein",
            "bier",
            "schnaps",
            "alkohol",
            "spirituosen",
            "champagner",
            "prosecco",
            "beer",
            "wine",
            "vodka",
            "whiskey",
            "rum",
            "gin",
            "tequila",
        ],
        Category::Alcohol,
    ),
    (
        &[
            "wasser", "cola", "saft", "limo", "kaffee", "tee", "getränk", "drink", "coffee",
            "water", "juice", "espresso", "latte",
        ],
        Category::Beverages,
    ),
    (
        &[
            "milch",
            "brot",
            "käse",
            "wurst",
            "fleisch",
            "obst",
            "gemüse",
            "lebensmittel",
            "milk",
            "bread",
            "cheese",
            "grocery",
        ],
        Category::Groceries,
    ),
    (
        &[
            "pizza",
            "pasta",
            "burger",
            "salat",
            "schnitzel",
            "essen",
            "gericht",
            "sandwich",
            "menu",
        ],
        Category::Meals,
    ),
    (
        &[
            "benzin",
            "diesel",
            "e10",
            "kraftstoff",
            "tanken",
            "fuel",
            "petrol",
            "gasoline",
        ],
        Category::Fuel,
    ),
    (
        &[
            "laptop",
            "handy",
            "tablet",
            "kamera",
            "kopfhörer",
            "ladekabel",
            "elektronik",
            "monitor",
            "keyboard",
            "headphones",
            "usb",
            "mouse",
        ],
        Category::Electronics,
    ),
    (
        &[
            "stift", "papier", "ordner", "büro", "pen", "paper", "stapler", "folder", "notebook",
            "office",
        ],
        Category::OfficeSupplies,
    ),
    (
        &[
            "tisch", "stuhl", "regal", "schrank", "möbel", "desk", "chair", "shelf", "lamp",
        ],
        Category::Furniture,
    ),
];

/// German-specific keywords for language detection
const GERMAN_KEYWORDS: &[&str] = &[
    "wie",
    "viel",
    "zeig",
    "alle",
    "quittungen",
    "ausgaben",
    "habe",
    "ich",
    "und",
    "von",
    "für",
    "der",
    "die",
    "das",
    "ein",
    "eine",
    "über",
    "unter",
    "euro",
    "insgesamt",
    "welche",
    "wann",
    "wo",
    "wer",
    "warum",
    "gib",
    "mir",
    "finde",
    "suche",
];

/// English-specific keywords for language detection
const ENGLISH_KEYWORDS: &[&str] = &[
    "how", "what", "which", "show", "find", "spent", "much", "many", "receipts", "the", "did",
    "does", "have", "has", "where", "when", "who", "why", "total", "from", "all",
];

/// German and English category synonyms mapped to canonical categories
///
/// Scanned in order; the first keyword found as a substring of the query
/// wins.
const CATEGORY_TRANSLATIONS: &[(&str, Category)] = &[
    // German
    ("elektronik", Category::Electronics),
    ("reisen", Category::Travel),
    ("reise", Category::Travel),
    ("essen", Category::Meals),
    ("mahlzeiten", Category::Meals),
    ("bürobedarf", Category::OfficeSupplies),
    ("büro", Category::OfficeSupplies),
    ("buero", Category::OfficeSupplies),
    ("lebensmittel", Category::Groceries),
    ("einkauf", Category::Groceries),
    ("kraftstoff", Category::Fuel),
    ("tanken", Category::Fuel),
    ("benzin", Category::Fuel),
    ("sprit", Category::Fuel),
    // English (also covers the shared loanwords hardware/software)
    ("electronics", Category::Electronics),
    ("travel", Category::Travel),
    ("meals", Category::Meals),
    ("office supplies", Category::OfficeSupplies),
    ("office", Category::OfficeSupplies),
    ("groceries", Category::Groceries),
    ("hardware", Category::Hardware),
    ("software", Category::Software),
    ("fuel", Category::Fuel),
    ("gas", Category::Fuel),
];

/// Look up the category for a vendor name
///
/// Unknown vendors are explicitly `Uncategorized` so downstream aggregation
/// never misattributes their spend to a real bucket.
pub fn classify_vendor(vendor_name: &str) -> Category {
    VENDOR_CATEGORIES
        .iter()
        .find(|(name, _)| *name == vendor_name)
        .map(|(_, cat)| *cat)
        .unwrap_or(Category::Uncategorized)
}

/// Classify a line item from its description and the vendor name
pub fn classify_item(description: &str, vendor_name: &str) -> Category {
    let combined = format!(
        "{} {}",
        description.to_lowercase(),
        vendor_name.to_lowercase()
    );
    for (keywords, category) in ITEM_RULES {
        if keywords.iter().any(|kw| combined.contains(kw)) {
            return *category;
        }
    }
    Category::Other
}

/// Guess a whole-receipt category from vendor name and item descriptions
///
/// Used when the extraction step did not supply one.
pub fn classify_receipt(vendor_name: &str, item_descriptions: &[&str]) -> Category {
    let known = classify_vendor(vendor_name);
    if known != Category::Uncategorized {
        return known;
    }

    let combined = format!(
        "{} {}",
        vendor_name.to_lowercase(),
        item_descriptions.join(" ").to_lowercase()
    );
    const RECEIPT_RULES: &[(&[&str], Category)] = &[
        (
            &[
                "restaurant", "cafe", "café", "coffee", "pizza", "burger", "sushi", "bar",
                "bistro",
            ],
            Category::Meals,
        ),
        (
            &[
                "market",
                "grocery",
                "rewe",
                "aldi",
                "lidl",
                "edeka",
                "kaufland",
                "supermarkt",
                "supermarket",
            ],
            Category::Groceries,
        ),
        (
            &[
                "shell",
                "aral",
                "esso",
                "tankstelle",
                "fuel",
                "benzin",
                "diesel",
            ],
            Category::Fuel,
        ),
        (
            &["office", "büro", "staples", "paper"],
            Category::OfficeSupplies,
        ),
        (
            &[
                "mediamarkt",
                "saturn",
                "elektronik",
                "computer",
                "laptop",
                "handy",
            ],
            Category::Electronics,
        ),
        (
            &["ikea", "möbel", "furniture", "regal", "tisch", "stuhl"],
            Category::Furniture,
        ),
    ];
    for (keywords, category) in RECEIPT_RULES {
        if keywords.iter().any(|kw| combined.contains(kw)) {
            return *category;
        }
    }
    Category::Uncategorized
}

/// Detect whether text is German or English by keyword frequency
///
/// Ties resolve to German.
pub fn detect_language(text: &str) -> Language {
    let text_lower = text.to_lowercase();
    let german_count = GERMAN_KEYWORDS
        .iter()
        .filter(|kw| text_lower.contains(*kw))
        .count();
    let english_count = ENGLISH_KEYWORDS
        .iter()
        .filter(|kw| text_lower.contains(*kw))
        .count();
    if english_count > german_count {
        Language::English
    } else {
        Language::German
    }
}

/// Find a category keyword in free text and return the canonical category
pub fn find_category_in_query(query: &str) -> Option<Category> {
    let query_lower = query.to_lowercase();
    CATEGORY_TRANSLATIONS
        .iter()
        .find(|(keyword, _)| query_lower.contains(keyword))
        .map(|(_, category)| *category)
}
