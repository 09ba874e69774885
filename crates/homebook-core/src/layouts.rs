//! Visual layouts and the default sections each one seeds

use crate::errors::{HomebookError, Result};

pub const DEFAULT_LAYOUT_ID: &str = "classico";

/// Known layout identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayoutId {
    #[default]
    Classico,
    Moderno,
    Rustico,
    Mediterraneo,
    Pastello,
    Oro,
    Illustrativo,
    Futuristico,
    Romantico,
    Notturno,
}

impl LayoutId {
    pub const ALL: [LayoutId; 10] = [
        LayoutId::Classico,
        LayoutId::Moderno,
        LayoutId::Rustico,
        LayoutId::Mediterraneo,
        LayoutId::Pastello,
        LayoutId::Oro,
        LayoutId::Illustrativo,
        LayoutId::Futuristico,
        LayoutId::Romantico,
        LayoutId::Notturno,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutId::Classico => "classico",
            LayoutId::Moderno => "moderno",
            LayoutId::Rustico => "rustico",
            LayoutId::Mediterraneo => "mediterraneo",
            LayoutId::Pastello => "pastello",
            LayoutId::Oro => "oro",
            LayoutId::Illustrativo => "illustrativo",
            LayoutId::Futuristico => "futuristico",
            LayoutId::Romantico => "romantico",
            LayoutId::Notturno => "notturno",
        }
    }

    /// Case-insensitive parse
    ///
    /// # Errors
    ///
    /// Returns `InvalidLayout` for unknown identifiers.
    pub fn parse(raw: &str) -> Result<Self> {
        let wanted = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == wanted)
            .ok_or_else(|| HomebookError::InvalidLayout {
                layout: raw.to_string(),
            })
    }

    /// Layouts that carry a breakfast section
    fn has_breakfast(&self) -> bool {
        matches!(
            self,
            LayoutId::Classico
                | LayoutId::Moderno
                | LayoutId::Pastello
                | LayoutId::Oro
                | LayoutId::Illustrativo
        )
    }
}

impl std::fmt::Display for LayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const SHARED_SECTIONS: [&str; 14] = [
    "Check-in",
    "Come Raggiungerci",
    "La Nostra Struttura",
    "Funzionamento",
    "Regole Struttura",
    "Dove Mangiare",
    "Dove Bere",
    "Cosa Visitare",
    "Esperienze",
    "Shopping",
    "Spiagge",
    "Servizi",
    "Numeri Utili",
    "Check-out",
];

const BREAKFAST_SECTION: &str = "Colazione";
const BREAKFAST_POSITION: usize = 5;

/// Section titles with their 1-based ordinals, seeded on book creation
pub fn default_sections(layout: LayoutId) -> Vec<(&'static str, i64)> {
    let mut titles: Vec<&'static str> = SHARED_SECTIONS.to_vec();
    if layout.has_breakfast() {
        titles.insert(BREAKFAST_POSITION, BREAKFAST_SECTION);
    }
    titles
        .into_iter()
        .zip(1_i64..)
        .collect()
}
