//! Country → tariff column and display currency resolution.
//!
//! The tariff sheet prices every operation in one column per country, each
//! denominated in that country's local currency. Both lookups fail open to
//! the Russia entry so an unexpected country name never aborts a calculation.

use serde::{Deserialize, Serialize};

/// Destination countries the tariff sheet carries a price column for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[default]
    Russia,
    Kazakhstan,
    Belarus,
    China,
    UnitedStates,
    Armenia,
    Azerbaijan,
    Uae,
    Turkey,
    Spain,
    Kyrgyzstan,
}

impl Country {
    pub const ALL: [Country; 11] = [
        Country::Russia,
        Country::Kazakhstan,
        Country::Belarus,
        Country::China,
        Country::UnitedStates,
        Country::Armenia,
        Country::Azerbaijan,
        Country::Uae,
        Country::Turkey,
        Country::Spain,
        Country::Kyrgyzstan,
    ];

    /// Resolve a country from its display name as it appears in order input.
    /// Unrecognized names default to Russia rather than failing.
    pub fn from_name(name: &str) -> Country {
        match name.trim() {
            "Казахстан" => Country::Kazakhstan,
            "Беларусь" => Country::Belarus,
            "Китай" => Country::China,
            "США" => Country::UnitedStates,
            "Армения" => Country::Armenia,
            "Азербайджан" => Country::Azerbaijan,
            "ОАЭ" => Country::Uae,
            "Турция" => Country::Turkey,
            "Испания" => Country::Spain,
            "Кыргызстан" => Country::Kyrgyzstan,
            _ => Country::Russia,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Country::Russia => "Россия",
            Country::Kazakhstan => "Казахстан",
            Country::Belarus => "Беларусь",
            Country::China => "Китай",
            Country::UnitedStates => "США",
            Country::Armenia => "Армения",
            Country::Azerbaijan => "Азербайджан",
            Country::Uae => "ОАЭ",
            Country::Turkey => "Турция",
            Country::Spain => "Испания",
            Country::Kyrgyzstan => "Кыргызстан",
        }
    }

    /// Header of this country's price column in the raw tariff records.
    pub fn column_header(&self) -> &'static str {
        match self {
            Country::Russia => "Рубль (Россия)",
            Country::Kazakhstan => "Тенге (Казахстан)",
            Country::Belarus => "Белорусский рубль (Беларусь)",
            Country::China => "Юань (Китай)",
            Country::UnitedStates => "Доллар (США)",
            Country::Armenia => "Драм (Армения)",
            Country::Azerbaijan => "Манат (Азербайджан)",
            Country::Uae => "Дирхам (ОАЭ)",
            Country::Turkey => "Лира (Турция)",
            Country::Spain => "Евро (Испания)",
            Country::Kyrgyzstan => "Сом (Кыргызстан)",
        }
    }

    /// Symbol of the currency the column is denominated in.
    pub fn currency_symbol(&self) -> &'static str {
        match self {
            Country::Russia => "₽",
            Country::Kazakhstan => "₸",
            Country::Belarus => "Br",
            Country::China => "¥",
            Country::UnitedStates => "$",
            Country::Armenia => "֏",
            Country::Azerbaijan => "₼",
            Country::Uae => "AED",
            Country::Turkey => "₺",
            Country::Spain => "€",
            Country::Kyrgyzstan => "с",
        }
    }
}
