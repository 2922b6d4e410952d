//! Family title enumeration matching the frontend family_title enum.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Role/relation label carried by every family member.
///
/// The wire and database representation is the French display label
/// (e.g. "Grand-père"). Parsing trims and case-folds, so minor textual
/// variation in stored data ("patriarche ", "PATRIARCHE") resolves to the
/// same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyTitle {
    Patriarche,
    Matriarche,
    Pere,
    Mere,
    Fils,
    Fille,
    GrandPere,
    GrandMere,
    PetitFils,
    PetiteFille,
    Oncle,
    Tante,
    Neveu,
    Niece,
    Cousin,
    Cousine,
    Epoux,
    Epouse,
    BeauPere,
    BelleMere,
    BeauFils,
    BelleFille,
    Frere,
    Soeur,
    /// Default non-privileged title assigned when none applies.
    Membre,
}

impl FamilyTitle {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyTitle::Patriarche => "Patriarche",
            FamilyTitle::Matriarche => "Matriarche",
            FamilyTitle::Pere => "Père",
            FamilyTitle::Mere => "Mère",
            FamilyTitle::Fils => "Fils",
            FamilyTitle::Fille => "Fille",
            FamilyTitle::GrandPere => "Grand-père",
            FamilyTitle::GrandMere => "Grand-mère",
            FamilyTitle::PetitFils => "Petit-fils",
            FamilyTitle::PetiteFille => "Petite-fille",
            FamilyTitle::Oncle => "Oncle",
            FamilyTitle::Tante => "Tante",
            FamilyTitle::Neveu => "Neveu",
            FamilyTitle::Niece => "Nièce",
            FamilyTitle::Cousin => "Cousin",
            FamilyTitle::Cousine => "Cousine",
            FamilyTitle::Epoux => "Époux",
            FamilyTitle::Epouse => "Épouse",
            FamilyTitle::BeauPere => "Beau-père",
            FamilyTitle::BelleMere => "Belle-mère",
            FamilyTitle::BeauFils => "Beau-fils",
            FamilyTitle::BelleFille => "Belle-fille",
            FamilyTitle::Frere => "Frère",
            FamilyTitle::Soeur => "Sœur",
            FamilyTitle::Membre => "Membre",
        }
    }

    /// Parse a textual title. Normalization rule: trim + case-fold.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "patriarche" => Some(FamilyTitle::Patriarche),
            "matriarche" => Some(FamilyTitle::Matriarche),
            "père" => Some(FamilyTitle::Pere),
            "mère" => Some(FamilyTitle::Mere),
            "fils" => Some(FamilyTitle::Fils),
            "fille" => Some(FamilyTitle::Fille),
            "grand-père" => Some(FamilyTitle::GrandPere),
            "grand-mère" => Some(FamilyTitle::GrandMere),
            "petit-fils" => Some(FamilyTitle::PetitFils),
            "petite-fille" => Some(FamilyTitle::PetiteFille),
            "oncle" => Some(FamilyTitle::Oncle),
            "tante" => Some(FamilyTitle::Tante),
            "neveu" => Some(FamilyTitle::Neveu),
            "nièce" => Some(FamilyTitle::Niece),
            "cousin" => Some(FamilyTitle::Cousin),
            "cousine" => Some(FamilyTitle::Cousine),
            "époux" => Some(FamilyTitle::Epoux),
            "épouse" => Some(FamilyTitle::Epouse),
            "beau-père" => Some(FamilyTitle::BeauPere),
            "belle-mère" => Some(FamilyTitle::BelleMere),
            "beau-fils" => Some(FamilyTitle::BeauFils),
            "belle-fille" => Some(FamilyTitle::BelleFille),
            "frère" => Some(FamilyTitle::Frere),
            "sœur" => Some(FamilyTitle::Soeur),
            "membre" => Some(FamilyTitle::Membre),
            _ => None,
        }
    }

    /// Lenient variant for stored data: unknown titles degrade to Membre.
    pub fn from_str_lossy(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

impl Default for FamilyTitle {
    fn default() -> Self {
        FamilyTitle::Membre
    }
}

impl std::fmt::Display for FamilyTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FamilyTitle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FamilyTitle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FamilyTitle::from_str(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown family title: {}", s)))
    }
}
