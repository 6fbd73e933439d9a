//! Output markers printed by shape applications at each lifecycle stage.
//!
//! All markers are case-sensitive and matched against line-buffered output.

use std::sync::OnceLock;

use regex::Regex;

pub const TOPIC_CREATED: &str = "Create topic:";
pub const TOPIC_NAME_REQUIRED: &str = "please specify topic name";
pub const PARSE_ERROR: &str = r"please specify (publish|only one of)";
pub const UNRECOGNIZED_VALUE: &str = "unrecognized value";
pub const WRITER_CREATED: &str = "Create writer for topic";
pub const READER_CREATED: &str = "Create reader for topic";
pub const FILTER_FAILED: &str = "failed to create content filtered topic";
pub const PUBLICATION_MATCHED: &str = "on_publication_matched";
pub const SUBSCRIPTION_MATCHED: &str = "on_subscription_matched";
pub const OFFERED_INCOMPATIBLE_QOS: &str = "on_offered_incompatible_qos";
pub const REQUESTED_INCOMPATIBLE_QOS: &str = "on_requested_incompatible_qos";
pub const LIVELINESS_CHANGED: &str = "on_liveliness_changed";
/// Bracketed shape size ending every data line, e.g. `[20]`.
pub const DATA: &str = r"\[[0-9][0-9]\]";

/// Compiled markers.
#[derive(Debug)]
pub struct Markers {
    pub topic_created: Regex,
    pub topic_name_required: Regex,
    pub parse_error: Regex,
    pub unrecognized_value: Regex,
    pub writer_created: Regex,
    pub reader_created: Regex,
    pub filter_failed: Regex,
    pub publication_matched: Regex,
    pub subscription_matched: Regex,
    pub offered_incompatible_qos: Regex,
    pub requested_incompatible_qos: Regex,
    pub liveliness_changed: Regex,
    pub data: Regex,
}

impl Markers {
    fn compile() -> Self {
        Self {
            topic_created: literal(TOPIC_CREATED),
            topic_name_required: literal(TOPIC_NAME_REQUIRED),
            parse_error: pattern(PARSE_ERROR),
            unrecognized_value: literal(UNRECOGNIZED_VALUE),
            writer_created: literal(WRITER_CREATED),
            reader_created: literal(READER_CREATED),
            filter_failed: literal(FILTER_FAILED),
            publication_matched: literal(PUBLICATION_MATCHED),
            subscription_matched: literal(SUBSCRIPTION_MATCHED),
            offered_incompatible_qos: literal(OFFERED_INCOMPATIBLE_QOS),
            requested_incompatible_qos: literal(REQUESTED_INCOMPATIBLE_QOS),
            liveliness_changed: literal(LIVELINESS_CHANGED),
            data: pattern(DATA),
        }
    }
}

/// The process-wide compiled markers.
pub fn markers() -> &'static Markers {
    static MARKERS: OnceLock<Markers> = OnceLock::new();
    MARKERS.get_or_init(Markers::compile)
}

fn literal(text: &str) -> Regex {
    pattern(&regex::escape(text))
}

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("valid marker pattern")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_markers_compile() {
        let m = markers();
        assert!(m.topic_created.is_match("Create topic: Square"));
        assert!(m.liveliness_changed.is_match(
            "on_liveliness_changed() topic: 'Square'  type: 'ShapeType' : (alive = 1, not_alive = 0)"
        ));
    }

    #[test]
    fn test_literal_markers_are_escaped() {
        // The matched-callback names are printed with "()" after them; the
        // markers must not treat the name as a regex.
        let m = markers();
        assert!(m.publication_matched.is_match(
            "on_publication_matched() topic: 'Square'  type: 'ShapeType' : matched readers 1 (change = 1)"
        ));
        assert!(!m.publication_matched.is_match("on_publication_match"));
    }

    #[test]
    fn test_data_marker() {
        let m = markers();
        assert!(m.data.is_match("Square     BLUE       012 034 [20]"));
        assert!(m.data.is_match("[30]"));
        assert!(!m.data.is_match("[5]"));
        assert!(!m.data.is_match("(20)"));
    }

    #[test]
    fn test_parse_error_marker() {
        let m = markers();
        assert!(m.parse_error.is_match("please specify publish [-P] or subscribe [-S]"));
        assert!(m
            .parse_error
            .is_match("please specify only one of: publish [-P] or subscribe [-S]"));
        assert!(!m.parse_error.is_match("please specify topic name [-t]"));
    }

    #[test]
    fn test_unrecognized_value_marker() {
        let m = markers();
        assert!(m
            .unrecognized_value
            .is_match("unrecognized value for durability 'x'"));
    }

    #[test]
    fn test_case_sensitive() {
        let m = markers();
        assert!(!m.topic_created.is_match("create topic: Square"));
    }
}
