//! SMS segment estimates.
//!
//! A message is billed per segment. Segment size depends on the character
//! encoding the carrier must use for the message language (see
//! `language::SmsEncoding`).

use crate::language::{encoding_for_code, MessageLanguage};

/// Number of SMS segments a message of `message_length` characters needs
/// in the language identified by `language_code`.
///
/// Returns 0 for an empty message, otherwise `ceil(length / segment_size)`
/// with 160-character segments for GSM-7 languages and 70-character
/// segments for everything else (including unknown codes).
pub fn sms_segment_count(message_length: usize, language_code: &str) -> usize {
    let segment_size = encoding_for_code(language_code).segment_size();
    message_length.div_ceil(segment_size)
}

/// Segment count for an actual body. Length is measured in characters,
/// not bytes, since tone-marked vowels are multi-byte in UTF-8.
pub fn sms_segments_for(body: &str, language: MessageLanguage) -> usize {
    sms_segment_count(body.chars().count(), language.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::find_template;

    #[test]
    fn test_empty_message_has_no_segments() {
        assert_eq!(sms_segment_count(0, "en"), 0);
        assert_eq!(sms_segment_count(0, "yo"), 0);
    }

    #[test]
    fn test_gsm7_segment_boundaries() {
        assert_eq!(sms_segment_count(1, "en"), 1);
        assert_eq!(sms_segment_count(160, "en"), 1);
        assert_eq!(sms_segment_count(161, "en"), 2);
        assert_eq!(sms_segment_count(320, "en"), 2);
        assert_eq!(sms_segment_count(161, "ha"), 2);
    }

    #[test]
    fn test_ucs2_segment_boundaries() {
        assert_eq!(sms_segment_count(70, "yo"), 1);
        assert_eq!(sms_segment_count(71, "yo"), 2);
        assert_eq!(sms_segment_count(141, "ig"), 3);
    }

    #[test]
    fn test_unknown_language_uses_ucs2_size() {
        assert_eq!(sms_segment_count(71, "fr"), 2);
    }

    #[test]
    fn test_segments_counted_in_characters_not_bytes() {
        // 'ọ' is 3 bytes in UTF-8: 70 of them are 210 bytes but still one
        // UCS-2 segment.
        let body: String = std::iter::repeat('ọ').take(70).collect();
        assert_eq!(body.len(), 210);
        assert_eq!(body.chars().count(), 70);
        assert_eq!(sms_segments_for(&body, MessageLanguage::Yoruba), 1);
    }

    #[test]
    fn test_urgent_template_segments_per_language() {
        let urgent = find_template("urgent-flood").unwrap();
        let english = urgent.body(MessageLanguage::English);
        assert_eq!(
            sms_segments_for(english, MessageLanguage::English),
            english.chars().count().div_ceil(160)
        );
        assert!(sms_segments_for(urgent.body(MessageLanguage::Yoruba), MessageLanguage::Yoruba) >= 2);
    }
}
