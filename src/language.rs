//! Best-effort language identification for article bodies.
//!
//! Wraps the `whatlang` trigram detector and reports a two-letter ISO 639-1
//! code where one exists. Languages without a 639-1 code keep whatlang's
//! three-letter code. Empty or undetectable text yields [`UNKNOWN_LANGUAGE`].

use tracing::debug;

/// Sentinel stored when no language could be determined.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Detect the language of `text`, never returning an empty string.
pub fn detect(text: &str) -> String {
    if text.trim().is_empty() {
        return UNKNOWN_LANGUAGE.to_string();
    }
    match whatlang::detect(text) {
        Some(info) => {
            let code = info.lang().code();
            debug!(
                code,
                confidence = info.confidence(),
                reliable = info.is_reliable(),
                "Detected language"
            );
            to_iso_639_1(code).unwrap_or(code).to_string()
        }
        None => UNKNOWN_LANGUAGE.to_string(),
    }
}

fn to_iso_639_1(code: &str) -> Option<&'static str> {
    let short = match code {
        "afr" => "af",
        "aka" => "ak",
        "amh" => "am",
        "ara" => "ar",
        "aze" => "az",
        "bel" => "be",
        "ben" => "bn",
        "bul" => "bg",
        "cat" => "ca",
        "ces" => "cs",
        "cmn" => "zh",
        "dan" => "da",
        "deu" => "de",
        "ell" => "el",
        "eng" => "en",
        "epo" => "eo",
        "est" => "et",
        "fin" => "fi",
        "fra" => "fr",
        "guj" => "gu",
        "heb" => "he",
        "hin" => "hi",
        "hrv" => "hr",
        "hun" => "hu",
        "hye" => "hy",
        "ind" => "id",
        "ita" => "it",
        "jav" => "jv",
        "jpn" => "ja",
        "kan" => "kn",
        "kat" => "ka",
        "khm" => "km",
        "kor" => "ko",
        "lat" => "la",
        "lav" => "lv",
        "lit" => "lt",
        "mal" => "ml",
        "mar" => "mr",
        "mkd" => "mk",
        "mya" => "my",
        "nep" => "ne",
        "nld" => "nl",
        "nob" => "nb",
        "ori" => "or",
        "pan" => "pa",
        "pes" => "fa",
        "pol" => "pl",
        "por" => "pt",
        "ron" => "ro",
        "rus" => "ru",
        "sin" => "si",
        "slk" => "sk",
        "slv" => "sl",
        "sna" => "sn",
        "spa" => "es",
        "srp" => "sr",
        "swe" => "sv",
        "tam" => "ta",
        "tel" => "te",
        "tgl" => "tl",
        "tha" => "th",
        "tuk" => "tk",
        "tur" => "tr",
        "ukr" => "uk",
        "urd" => "ur",
        "uzb" => "uz",
        "vie" => "vi",
        "yid" => "yi",
        "zul" => "zu",
        _ => return None,
    };
    Some(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_english() {
        let text = "The city council voted on Tuesday to approve a new budget that \
                    expands funding for public transit and road repairs across the region.";
        assert_eq!(detect(text), "en");
    }

    #[test]
    fn test_detects_french() {
        let text = "Le gouvernement a annoncé mardi une nouvelle série de mesures pour \
                    soutenir les agriculteurs touchés par la sécheresse de cet été.";
        assert_eq!(detect(text), "fr");
    }

    #[test]
    fn test_empty_text_is_unknown() {
        assert_eq!(detect(""), UNKNOWN_LANGUAGE);
        assert_eq!(detect("   \n "), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_never_empty() {
        assert!(!detect("12345 !!! ???").is_empty());
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(to_iso_639_1("cmn"), Some("zh"));
        assert_eq!(to_iso_639_1("deu"), Some("de"));
        assert_eq!(to_iso_639_1("xyz"), None);
    }
}
