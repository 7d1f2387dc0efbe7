//! Content negotiation on the `Accept` header

/// Representation chosen for an entity response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Html,
    JsonLd,
    Turtle,
}

impl Representation {
    pub fn content_type(&self) -> &'static str {
        match self {
            Representation::Html => "text/html; charset=utf-8",
            Representation::JsonLd => "application/ld+json",
            Representation::Turtle => "text/turtle; charset=utf-8",
        }
    }

    fn for_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "text/html" | "application/xhtml+xml" | "*/*" | "text/*" => Some(Representation::Html),
            "application/ld+json" | "application/json" => Some(Representation::JsonLd),
            "text/turtle" => Some(Representation::Turtle),
            _ => None,
        }
    }

    /// Query override, `?type=jsonld` or `?type=turtle`
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "html" => Some(Representation::Html),
            "json" | "jsonld" => Some(Representation::JsonLd),
            "turtle" | "ttl" => Some(Representation::Turtle),
            _ => None,
        }
    }
}

/// Pick the representation with the highest quality value.
///
/// Ties go to the earlier entry; an empty or unusable header gives HTML.
pub fn negotiate(accept: &str) -> Representation {
    let mut best: Option<(Representation, f32)> = None;
    for entry in accept.split(',') {
        let mut parts = entry.split(';').map(str::trim);
        let Some(media_type) = parts.next() else {
            continue;
        };
        let quality = parts
            .filter_map(|p| p.strip_prefix("q="))
            .find_map(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);
        let Some(rep) = Representation::for_media_type(&media_type.to_ascii_lowercase()) else {
            continue;
        };
        if quality > 0.0 && best.is_none_or(|(_, q)| quality > q) {
            best = Some((rep, quality));
        }
    }
    best.map(|(rep, _)| rep).unwrap_or(Representation::Html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate() {
        assert_eq!(negotiate("application/ld+json"), Representation::JsonLd);
        assert_eq!(negotiate("text/turtle"), Representation::Turtle);
        assert_eq!(negotiate("text/html,application/xhtml+xml,*/*;q=0.8"), Representation::Html);
        assert_eq!(negotiate("text/html;q=0.5, application/json"), Representation::JsonLd);
        assert_eq!(negotiate("image/png"), Representation::Html);
        assert_eq!(negotiate(""), Representation::Html);
    }
}
