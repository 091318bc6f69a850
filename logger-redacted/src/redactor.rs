use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    // Brazilian taxpayer id, with or without punctuation: 123.456.789-09 / 12345678909
    static ref CPF_REGEX: Regex = Regex::new(r"\b\d{3}\.?\d{3}\.?\d{3}-?\d{2}\b").unwrap();
    // Brazilian landline and mobile numbers: (11) 98765-4321, 11 3456 7890, +55 11 98765-4321
    static ref PHONE_REGEX: Regex =
        Regex::new(r"(?:\+55\s?)?\(?\b\d{2}\)?[\s.-]?9?\d{4}[\s.-]?\d{4}\b").unwrap();
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_cpf: bool,
    pub redact_phones: bool,
    pub hash_for_correlation: bool,
    pub custom_patterns: Vec<(Regex, String)>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_cpf: true,
            redact_phones: true,
            hash_for_correlation: true,
            custom_patterns: Vec::new(),
        }
    }
}

/// PII redactor for free text that ends up in log lines
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.config.redact_emails {
            result = self.replace(&EMAIL_REGEX, &result, "EMAIL", "***@***");
        }

        // CPF before phones: an unpunctuated CPF would otherwise look like a phone number.
        if self.config.redact_cpf {
            result = self.replace(&CPF_REGEX, &result, "CPF", "***.***.***-**");
        }

        if self.config.redact_phones {
            result = self.replace(&PHONE_REGEX, &result, "PHONE", "(**) *****-****");
        }

        for (pattern, replacement) in &self.config.custom_patterns {
            result = pattern.replace_all(&result, replacement.as_str()).to_string();
        }

        result
    }

    fn replace(&self, pattern: &Regex, text: &str, tag: &str, mask: &str) -> String {
        pattern
            .replace_all(text, |caps: &regex::Captures| {
                if self.config.hash_for_correlation {
                    format!("{tag}[{}]", correlation_hash(&caps[0]))
                } else {
                    mask.to_string()
                }
            })
            .to_string()
    }
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::new(RedactionConfig::default())
    }
}

/// Stable token standing in for a patient name in log fields.
///
/// The same name always maps to the same token, so log lines about one
/// patient can be correlated without exposing who the patient is.
pub fn patient_token(name: &str) -> String {
    format!("PATIENT[{}]", correlation_hash(name.trim()))
}

fn correlation_hash(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(&digest[..8])
}
