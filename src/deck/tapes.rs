use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// IEC cassette tape classes. Serialized with the label printed on the
/// shell ("Type II") so profile and calibration files read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum TapeType {
    #[serde(rename = "Type I")]
    TypeI,
    #[serde(rename = "Type II")]
    TypeII,
    #[serde(rename = "Type III")]
    TypeIII,
    #[serde(rename = "Type IV")]
    TypeIV,
}

/// Formulation details for one tape class, for tracklist headers and the
/// setup panel.
pub struct TapeInfo {
    pub name: &'static str,
    pub material: &'static str,
    pub color: &'static str,
    pub sound: &'static str,
    pub bias: &'static str,
    pub notches: &'static str,
}

impl TapeType {
    pub fn label(self) -> &'static str {
        match self {
            TapeType::TypeI => "Type I",
            TapeType::TypeII => "Type II",
            TapeType::TypeIII => "Type III",
            TapeType::TypeIV => "Type IV",
        }
    }

    pub fn info(self) -> TapeInfo {
        match self {
            TapeType::TypeI => TapeInfo {
                name: "Normal (Ferric Oxide)",
                material: "Ferric Oxide",
                color: "Brown",
                sound: "Good bass, lacks high-frequency detail",
                bias: "Standard (120us EQ)",
                notches: "Standard write-protect only",
            },
            TapeType::TypeII => TapeInfo {
                name: "Chrome/High Bias",
                material: "Chromium Dioxide (CrO2)",
                color: "Dark brown/black",
                sound: "Crisp highs, better dynamics",
                bias: "High bias (70us EQ)",
                notches: "Extra detection notches",
            },
            TapeType::TypeIII => TapeInfo {
                name: "Ferrochrome (Rare)",
                material: "Ferric + Chrome mix",
                color: "Varies",
                sound: "Type I bass + Type II highs",
                bias: "High bias (70us EQ)",
                notches: "Distinct pattern",
            },
            TapeType::TypeIV => TapeInfo {
                name: "Metal (Pure Metal)",
                material: "Pure metal particles",
                color: "Solid black",
                sound: "Highest output, best clarity",
                bias: "Metal bias (70us EQ)",
                notches: "Third center notch set",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_the_shell_label() {
        assert_eq!(
            serde_json::to_string(&TapeType::TypeII).unwrap(),
            "\"Type II\""
        );
        let parsed: TapeType = serde_json::from_str("\"Type IV\"").unwrap();
        assert_eq!(parsed, TapeType::TypeIV);
    }

    #[test]
    fn label_matches_the_serialized_form() {
        for t in [
            TapeType::TypeI,
            TapeType::TypeII,
            TapeType::TypeIII,
            TapeType::TypeIV,
        ] {
            assert_eq!(
                serde_json::to_string(&t).unwrap(),
                format!("\"{}\"", t.label())
            );
        }
    }

    #[test]
    fn chrome_needs_high_bias() {
        assert_eq!(TapeType::TypeII.info().bias, "High bias (70us EQ)");
        assert_eq!(TapeType::TypeI.info().bias, "Standard (120us EQ)");
    }
}
