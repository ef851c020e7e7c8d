use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Kind of input widget a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Single-line answer.
    Line,
    /// Multi-line answer.
    Paragraph,
}

/// One questionnaire entry. The list is fixed at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: u32,
    pub text: &'static str,
    pub placeholder: &'static str,
    pub input: InputKind,
}

/// The five business questions, in submission order. Answers are matched to
/// these positionally.
pub fn default_questions() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            text: "What is your company's name?",
            placeholder: "e.g., Nova Solutions",
            input: InputKind::Line,
        },
        Question {
            id: 2,
            text: "Describe your business in one sentence.",
            placeholder: "e.g., We build innovative software for startups.",
            input: InputKind::Paragraph,
        },
        Question {
            id: 3,
            text: "Who is your target audience?",
            placeholder: "e.g., Tech-savvy entrepreneurs and small businesses",
            input: InputKind::Line,
        },
        Question {
            id: 4,
            text: "What are your core brand values?",
            placeholder: "e.g., Innovation, reliability, customer-centric",
            input: InputKind::Paragraph,
        },
        Question {
            id: 5,
            text: "Any desired styles or concepts?",
            placeholder: "e.g., Minimalist, modern, geometric, using a star symbol",
            input: InputKind::Line,
        },
    ]
}

/// A generated image-prompt plus its design style label, as returned by the
/// text model under the JSON response contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoPrompt {
    pub prompt: String,
    pub style: String,
}

/// Opaque identity for a generated logo, assigned at creation time.
///
/// Prompt text is deliberately NOT the identity of a logo in memory: two
/// distinct concepts could produce identical prompt text. The saved set still
/// dedups by prompt (see storage), matching what users perceive as "the same
/// logo".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogoId(pub u64);

impl LogoId {
    pub fn generate() -> Self {
        let mut b = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut b);
        LogoId(u64::from_le_bytes(b))
    }
}

impl std::fmt::Display for LogoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// A rendered logo concept: the prompt that produced it, its style label, and
/// the image as a self-contained `data:image/png;base64,…` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedLogo {
    pub id: LogoId,
    pub prompt: String,
    pub style: String,
    pub image_data: String,
    #[serde(default)]
    pub created_utc: String,
}

impl GeneratedLogo {
    /// Download filename for this logo: `logo-<slug>.png`, slug derived from
    /// the style label (lowercased, whitespace runs collapsed to hyphens).
    pub fn download_filename(&self) -> String {
        format!("logo-{}.png", slugify(&self.style))
    }
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_gap = false;
    for c in s.trim().chars() {
        if c.is_whitespace() {
            in_gap = true;
        } else {
            if in_gap && !out.is_empty() {
                out.push('-');
            }
            in_gap = false;
            for lc in c.to_lowercase() {
                out.push(lc);
            }
        }
    }
    out
}

/// RFC 3339 timestamp for saved logos.
pub fn now_utc_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

/// Screens of the application state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Questionnaire,
    Loading,
    Results,
    Saved,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_list_is_stable() {
        let qs = default_questions();
        assert_eq!(qs.len(), 5);
        assert_eq!(qs[0].id, 1);
        assert_eq!(qs[4].id, 5);
    }

    #[test]
    fn download_filename_slugifies_style() {
        let logo = GeneratedLogo {
            id: LogoId(7),
            prompt: "p".into(),
            style: "Modern  Geometric".into(),
            image_data: String::new(),
            created_utc: String::new(),
        };
        assert_eq!(logo.download_filename(), "logo-modern-geometric.png");
    }

    #[test]
    fn download_filename_trims_and_lowercases() {
        let logo = GeneratedLogo {
            id: LogoId(7),
            prompt: "p".into(),
            style: "  Classic ".into(),
            image_data: String::new(),
            created_utc: String::new(),
        };
        assert_eq!(logo.download_filename(), "logo-classic.png");
    }

    #[test]
    fn logo_ids_are_distinct() {
        // Random 64-bit ids; a collision here would be astronomically unlikely.
        let a = LogoId::generate();
        let b = LogoId::generate();
        assert_ne!(a, b);
    }
}
