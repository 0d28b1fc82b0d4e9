//! Built-in language table and the tiny greeting phrasebook used for filler.

/// A phrase in the target language with its meaning and reading
#[derive(Debug, Clone, Copy)]
pub struct Phrase {
    pub text: &'static str,
    pub meaning: &'static str,
    /// Romanized reading; None for Latin-script languages
    pub reading: Option<&'static str>,
}

/// Language metadata plus its phrasebook
#[derive(Debug)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    /// "latin" or the writing system name
    pub script: &'static str,
    pub phrases: &'static [Phrase],
}

impl LanguageInfo {
    pub fn is_latin(&self) -> bool {
        self.script == "latin"
    }
}

const fn p(text: &'static str, meaning: &'static str, reading: Option<&'static str>) -> Phrase {
    Phrase {
        text,
        meaning,
        reading,
    }
}

pub const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo {
        code: "es",
        name: "Spanish",
        native_name: "Español",
        script: "latin",
        phrases: &[
            p("hola", "hello", None),
            p("gracias", "thank you", None),
            p("adiós", "goodbye", None),
            p("buenos días", "good morning", None),
        ],
    },
    LanguageInfo {
        code: "fr",
        name: "French",
        native_name: "Français",
        script: "latin",
        phrases: &[
            p("bonjour", "hello", None),
            p("merci", "thank you", None),
            p("au revoir", "goodbye", None),
            p("bonsoir", "good evening", None),
        ],
    },
    LanguageInfo {
        code: "de",
        name: "German",
        native_name: "Deutsch",
        script: "latin",
        phrases: &[
            p("hallo", "hello", None),
            p("danke", "thank you", None),
            p("tschüss", "bye", None),
            p("guten Morgen", "good morning", None),
        ],
    },
    LanguageInfo {
        code: "it",
        name: "Italian",
        native_name: "Italiano",
        script: "latin",
        phrases: &[
            p("ciao", "hello", None),
            p("grazie", "thank you", None),
            p("arrivederci", "goodbye", None),
        ],
    },
    LanguageInfo {
        code: "pt",
        name: "Portuguese",
        native_name: "Português",
        script: "latin",
        phrases: &[
            p("olá", "hello", None),
            p("obrigado", "thank you", None),
            p("tchau", "bye", None),
        ],
    },
    LanguageInfo {
        code: "ja",
        name: "Japanese",
        native_name: "日本語",
        script: "kana",
        phrases: &[
            p("こんにちは", "hello", Some("konnichiwa")),
            p("ありがとう", "thank you", Some("arigatou")),
            p("さようなら", "goodbye", Some("sayounara")),
            p("おはよう", "good morning", Some("ohayou")),
        ],
    },
    LanguageInfo {
        code: "ko",
        name: "Korean",
        native_name: "한국어",
        script: "hangul",
        phrases: &[
            p("안녕하세요", "hello", Some("annyeonghaseyo")),
            p("감사합니다", "thank you", Some("gamsahamnida")),
            p("안녕히 가세요", "goodbye", Some("annyeonghi gaseyo")),
        ],
    },
    LanguageInfo {
        code: "zh",
        name: "Chinese",
        native_name: "中文",
        script: "hanzi",
        phrases: &[
            p("你好", "hello", Some("nǐ hǎo")),
            p("谢谢", "thank you", Some("xièxie")),
            p("再见", "goodbye", Some("zàijiàn")),
        ],
    },
    LanguageInfo {
        code: "ru",
        name: "Russian",
        native_name: "Русский",
        script: "cyrillic",
        phrases: &[
            p("привет", "hi", Some("privet")),
            p("спасибо", "thank you", Some("spasibo")),
            p("до свидания", "goodbye", Some("do svidaniya")),
        ],
    },
    LanguageInfo {
        code: "ar",
        name: "Arabic",
        native_name: "العربية",
        script: "arabic",
        phrases: &[
            p("مرحبا", "hello", Some("marhaban")),
            p("شكرا", "thank you", Some("shukran")),
            p("مع السلامة", "goodbye", Some("ma'a as-salama")),
        ],
    },
    LanguageInfo {
        code: "hi",
        name: "Hindi",
        native_name: "हिन्दी",
        script: "devanagari",
        phrases: &[
            p("नमस्ते", "hello", Some("namaste")),
            p("धन्यवाद", "thank you", Some("dhanyavaad")),
            p("अलविदा", "goodbye", Some("alvida")),
        ],
    },
    LanguageInfo {
        code: "el",
        name: "Greek",
        native_name: "Ελληνικά",
        script: "greek",
        phrases: &[
            p("γεια σου", "hello", Some("yia sou")),
            p("ευχαριστώ", "thank you", Some("efcharistó")),
        ],
    },
    LanguageInfo {
        code: "he",
        name: "Hebrew",
        native_name: "עברית",
        script: "hebrew",
        phrases: &[
            p("שלום", "hello", Some("shalom")),
            p("תודה", "thank you", Some("toda")),
        ],
    },
    LanguageInfo {
        code: "th",
        name: "Thai",
        native_name: "ไทย",
        script: "thai",
        phrases: &[
            p("สวัสดี", "hello", Some("sawasdee")),
            p("ขอบคุณ", "thank you", Some("khop khun")),
        ],
    },
];

/// Used for language codes missing from the table
pub static GENERIC: LanguageInfo = LanguageInfo {
    code: "xx",
    name: "Unknown",
    native_name: "Unknown",
    script: "latin",
    phrases: &[
        p("hello", "hello", None),
        p("thank you", "thank you", None),
        p("goodbye", "goodbye", None),
    ],
};

/// Look up a language by code. Region suffixes are ignored, so `zh-TW`
/// finds `zh`.
pub fn find(code: &str) -> Option<&'static LanguageInfo> {
    let base = code.split(['-', '_']).next().unwrap_or(code).to_lowercase();
    LANGUAGES.iter().find(|l| l.code == base)
}

/// Language info for a code, or the generic fallback
pub fn lookup(code: &str) -> &'static LanguageInfo {
    find(code).unwrap_or(&GENERIC)
}
