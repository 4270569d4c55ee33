/// Message languages, SMS encoding classes, and the multi-language
/// quick-message templates offered by the composer.
///
/// English and Hausa are written in plain Latin script and fit the GSM 7-bit
/// alphabet (160 characters per SMS segment). Yoruba and Igbo use tone marks
/// and dotted vowels outside GSM-7, so carriers fall back to UCS-2 (70
/// characters per segment).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Priority, ValidationError};

// ---------------------------------------------------------------------------
// Encoding classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsEncoding {
    Gsm7,
    Ucs2,
}

impl SmsEncoding {
    /// Characters per SMS segment.
    pub fn segment_size(&self) -> usize {
        match self {
            SmsEncoding::Gsm7 => 160,
            SmsEncoding::Ucs2 => 70,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SmsEncoding::Gsm7 => "GSM 7-bit",
            SmsEncoding::Ucs2 => "UCS-2",
        }
    }
}

/// Encoding class for a language code. Unrecognised codes are treated as
/// UCS-2 so segment estimates never undercount.
pub fn encoding_for_code(code: &str) -> SmsEncoding {
    MessageLanguage::from_code(code)
        .map(|lang| lang.encoding())
        .unwrap_or(SmsEncoding::Ucs2)
}

// ---------------------------------------------------------------------------
// Languages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageLanguage {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ha")]
    Hausa,
    #[serde(rename = "yo")]
    Yoruba,
    #[serde(rename = "ig")]
    Igbo,
}

impl MessageLanguage {
    pub const ALL: [MessageLanguage; 4] = [
        MessageLanguage::English,
        MessageLanguage::Hausa,
        MessageLanguage::Yoruba,
        MessageLanguage::Igbo,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            MessageLanguage::English => "en",
            MessageLanguage::Hausa => "ha",
            MessageLanguage::Yoruba => "yo",
            MessageLanguage::Igbo => "ig",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            MessageLanguage::English => "English",
            MessageLanguage::Hausa => "Hausa",
            MessageLanguage::Yoruba => "Yoruba",
            MessageLanguage::Igbo => "Igbo",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            MessageLanguage::Yoruba => "Yorùbá",
            other => other.name(),
        }
    }

    pub fn script(&self) -> &'static str {
        match self {
            MessageLanguage::English | MessageLanguage::Hausa => "Latin",
            MessageLanguage::Yoruba | MessageLanguage::Igbo => "Latin + Tone marks",
        }
    }

    pub fn encoding(&self) -> SmsEncoding {
        match self {
            MessageLanguage::English | MessageLanguage::Hausa => SmsEncoding::Gsm7,
            MessageLanguage::Yoruba | MessageLanguage::Igbo => SmsEncoding::Ucs2,
        }
    }
}

impl fmt::Display for MessageLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MessageLanguage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| ValidationError::UnknownValue {
            kind: "language",
            value: s.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// A pre-written message offered in every supported language.
pub struct MessageTemplate {
    pub id: &'static str,
    pub name: &'static str,
    /// Priority the composer switches to when the template is chosen.
    pub priority: Priority,
    pub bodies: &'static [(MessageLanguage, &'static str)],
}

impl MessageTemplate {
    /// Body in `language`, falling back to English when no translation is
    /// registered.
    pub fn body(&self, language: MessageLanguage) -> &'static str {
        self.translation(language)
            .or_else(|| self.translation(MessageLanguage::English))
            .unwrap_or_default()
    }

    fn translation(&self, language: MessageLanguage) -> Option<&'static str> {
        self.bodies
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, body)| *body)
    }
}

pub static MESSAGE_TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        id: "urgent-flood",
        name: "Urgent Flood Alert",
        priority: Priority::Critical,
        bodies: &[
            (
                MessageLanguage::English,
                "🚨 URGENT FLOOD ALERT: Heavy rainfall detected in your area. Please move to higher ground immediately. Reply HELP for assistance.",
            ),
            (
                MessageLanguage::Hausa,
                "🚨 GARGADIN AMBALIYA: An gano ruwan sama mai yawa a yankinku. Ku matsa zuwa tudu nan da nan. Ku amsa da TAIMAKO don samun taimako.",
            ),
            (
                MessageLanguage::Yoruba,
                "🚨 IKILỌ OMIRIN BI: Ojo to pọ ju ni a ri ni agbegbe yii. E lọ si ibi giga lẹsẹkẹsẹ. Fi IRANLỌWỌ dahun fun iranlọwọ.",
            ),
            (
                MessageLanguage::Igbo,
                "🚨 MBA IDEMMIRI DIKA: Achọpụtala oke mmiri ozuzo n'ógbè gị. Biko kwaga n'ebe dị elu ozugbo. Zaa ENYEMAKA maka enyemaka.",
            ),
        ],
    },
    MessageTemplate {
        id: "weather-warning",
        name: "Weather Warning",
        priority: Priority::High,
        bodies: &[
            (
                MessageLanguage::English,
                "⚠️ Weather Warning: Heavy rainfall expected in your area within the next 6 hours. Please take necessary precautions.",
            ),
            (
                MessageLanguage::Hausa,
                "⚠️ Gargadin Yanayi: Ana tsammanin ruwan sama mai yawa a yankinku cikin awanni 6 masu zuwa. Ku yi hankali da kuma shirye-shirye.",
            ),
            (
                MessageLanguage::Yoruba,
                "⚠️ Ikilọ Oju-ọjọ: A n retí ojo nla ni agbegbe yii laarin wakati mẹfa to nbọ. E ṣe iṣọra to yẹ.",
            ),
            (
                MessageLanguage::Igbo,
                "⚠️ Ịdọ Aka Ihu Igwe: A na-atụ anya oke mmiri ozuzo n'ógbè gị n'ime awa isii na-abịa. Biko mee ihe nchekwa kwesịrị.",
            ),
        ],
    },
    MessageTemplate {
        id: "all-clear",
        name: "All Clear",
        priority: Priority::Low,
        bodies: &[
            (
                MessageLanguage::English,
                "✅ All Clear: The flood risk has subsided in your area. Normal activities can resume. Thank you for your cooperation.",
            ),
            (
                MessageLanguage::Hausa,
                "✅ Komai Lafiya: Hadarin ambaliya ya rage a yankinku. Za ku iya komawa ga ayyukanku na yau da kullun. Mun gode da hadin kai.",
            ),
            (
                MessageLanguage::Yoruba,
                "✅ Gbogbo Rẹrẹ: Ewu omirin ti dinu ni agbegbe yii. Iṣẹ deede le bẹrẹ. A dupẹ fun ifowọsowọpọ yii.",
            ),
            (
                MessageLanguage::Igbo,
                "✅ Ihe Niile Dị Mma: Ihe ize ndụ mmiri ozuzo ebelatawo n'ógbè gị. Enwere ike ịmaliteghachi ọrụ nkịtị. Daalụ maka nkwado gị.",
            ),
        ],
    },
    MessageTemplate {
        id: "meeting-notice",
        name: "Meeting Notice",
        priority: Priority::Medium,
        bodies: &[
            (
                MessageLanguage::English,
                "📋 Community Meeting: Flood preparedness meeting scheduled for tomorrow at the community center. Your attendance is important.",
            ),
            (
                MessageLanguage::Hausa,
                "📋 Taron Al'umma: An shirya taron shirye-shiryen ambaliya gobe a cibiyar al'umma. Zuwan ku yana da muhimmanci.",
            ),
            (
                MessageLanguage::Yoruba,
                "📋 Ipade Agbegbe: A ti ṣeto ipade imurasilẹ omirin fun ọla ni ile-iṣẹ agbegbe. Wiwa yii ṣe pataki.",
            ),
            (
                MessageLanguage::Igbo,
                "📋 Nzukọ Obodo: Edebere nzukọ maka njikere idemmiri maka echi na ụlọ nzukọ obodo. Ọbịbịa gị dị mkpa.",
            ),
        ],
    },
];

/// Looks up a template by id. Returns `None` if not found.
pub fn find_template(id: &str) -> Option<&'static MessageTemplate> {
    MESSAGE_TEMPLATES.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes_round_trip_through_from_code() {
        for lang in MessageLanguage::ALL {
            assert_eq!(MessageLanguage::from_code(lang.code()), Some(lang));
        }
        assert_eq!(MessageLanguage::from_code(" YO "), Some(MessageLanguage::Yoruba));
        assert_eq!(MessageLanguage::from_code("fr"), None);
    }

    #[test]
    fn test_hausa_is_gsm7_but_tonal_languages_are_ucs2() {
        assert_eq!(MessageLanguage::Hausa.encoding(), SmsEncoding::Gsm7);
        assert_eq!(MessageLanguage::Yoruba.encoding(), SmsEncoding::Ucs2);
        assert_eq!(MessageLanguage::Igbo.encoding(), SmsEncoding::Ucs2);
    }

    #[test]
    fn test_unknown_code_falls_back_to_ucs2() {
        assert_eq!(encoding_for_code("xx"), SmsEncoding::Ucs2);
        assert_eq!(encoding_for_code(""), SmsEncoding::Ucs2);
        assert_eq!(encoding_for_code("en"), SmsEncoding::Gsm7);
    }

    #[test]
    fn test_language_serializes_as_code() {
        assert_eq!(serde_json::to_string(&MessageLanguage::Igbo).unwrap(), "\"ig\"");
        let parsed: MessageLanguage = serde_json::from_str("\"ha\"").unwrap();
        assert_eq!(parsed, MessageLanguage::Hausa);
    }

    #[test]
    fn test_every_template_has_an_english_body() {
        for template in MESSAGE_TEMPLATES {
            assert!(
                !template.body(MessageLanguage::English).is_empty(),
                "template '{}' must carry an English body",
                template.id
            );
        }
    }

    #[test]
    fn test_no_duplicate_template_ids() {
        let mut seen = std::collections::HashSet::new();
        for template in MESSAGE_TEMPLATES {
            assert!(seen.insert(template.id), "duplicate template id '{}'", template.id);
        }
    }

    #[test]
    fn test_template_body_falls_back_to_english() {
        static PARTIAL: MessageTemplate = MessageTemplate {
            id: "partial",
            name: "Partial",
            priority: Priority::Low,
            bodies: &[(MessageLanguage::English, "english only")],
        };
        assert_eq!(PARTIAL.body(MessageLanguage::Igbo), "english only");
    }

    #[test]
    fn test_find_template_returns_priority() {
        let urgent = find_template("urgent-flood").expect("urgent template should exist");
        assert_eq!(urgent.priority, Priority::Critical);
        assert!(urgent.body(MessageLanguage::Hausa).contains("GARGADIN AMBALIYA"));
        assert!(find_template("missing").is_none());
    }
}
