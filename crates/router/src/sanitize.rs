/// Operator tokens and their path-safe names. Two-character operators first.
const OPERATOR_NAMES: [(&str, &str); 6] = [
    (">=", "gte_"),
    ("<=", "lte_"),
    (">", "gt_"),
    ("<", "lt_"),
    ("==", "eq_"),
    ("!=", "ne_"),
];

/// Turn a branch label into a filesystem-safe path segment.
///
/// Comparison operators become readable prefixes (`>=0.5` → `gte_0.5`), then
/// everything outside alphanumerics, `_`, `-` and `.` is dropped. Rendered
/// leaf filenames never pass through here.
#[must_use]
pub fn sanitize_segment(label: &str) -> String {
    let mut segment = label.to_string();
    for (token, name) in OPERATOR_NAMES {
        segment = segment.replace(token, name);
    }
    segment.retain(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    segment
}

/// Reduce a schema key to one path component.
///
/// Loaded schemas only carry plain keys, which pass through unchanged. Keys
/// built in code lose separators and `.`/`..` parts, leftovers joined by `_`.
#[must_use]
pub fn confine_key(key: &str) -> String {
    key.split(&['/', '\\'][..])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect::<Vec<_>>()
        .join("_")
}

/// The `key=label` directory a matched branch contributes
#[must_use]
pub fn pair_segment(key: &str, label: &str) -> String {
    format!("{}={}", confine_key(key), sanitize_segment(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn operators_become_names() {
        assert_eq!(sanitize_segment(">=0.5"), "gte_0.5");
        assert_eq!(sanitize_segment("<=0.5"), "lte_0.5");
        assert_eq!(sanitize_segment(">0.5"), "gt_0.5");
        assert_eq!(sanitize_segment("<0.5"), "lt_0.5");
        assert_eq!(sanitize_segment("==3"), "eq_3");
        assert_eq!(sanitize_segment("!=3"), "ne_3");
    }

    #[test]
    fn strips_unsafe_characters() {
        assert_eq!(sanitize_segment("r/^lid/"), "rlid");
        assert_eq!(sanitize_segment("us east/../x"), "useast..x");
        assert_eq!(sanitize_segment("0.75-0.89"), "0.75-0.89");
        assert_eq!(sanitize_segment("café"), "café");
    }

    #[test]
    fn comparators_with_same_threshold_do_not_collide() {
        let labels = [">=0.5", "<=0.5", ">0.5", "<0.5", "==0.5", "!=0.5"];
        let segments: std::collections::BTreeSet<_> =
            labels.iter().map(|l| sanitize_segment(l)).collect();
        assert_eq!(segments.len(), labels.len());
    }

    #[test]
    fn keys_collapse_to_one_component() {
        assert_eq!(confine_key("sensor"), "sensor");
        assert_eq!(confine_key("/etc/cron.d"), "etc_cron.d");
        assert_eq!(confine_key("../../up"), "up");
        assert_eq!(confine_key(r"a\.\b"), "a_b");
        assert_eq!(confine_key(".."), "");
        assert_eq!(pair_segment("../x", ">=1"), "x=gte_1");
    }

    proptest! {
        #[test]
        fn proptest_pair_segment_is_one_component(key in "[^:]{0,16}", label in ".{0,16}") {
            let segment = pair_segment(&key, &label);
            let mut components = std::path::Path::new(&segment).components();
            prop_assert!(matches!(components.next(), Some(std::path::Component::Normal(_))));
            prop_assert!(components.next().is_none(), "{:?} split", segment);
        }

        #[test]
        fn proptest_output_is_path_safe(label in ".{0,32}") {
            let segment = sanitize_segment(&label);
            prop_assert!(segment
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')));
            prop_assert!(!segment.contains('/'));
        }

        #[test]
        fn proptest_threshold_survives(threshold in "[0-9]{1,4}(\\.[0-9]{1,3})?") {
            prop_assert_eq!(sanitize_segment(&format!(">={threshold}")), format!("gte_{threshold}"));
            prop_assert_eq!(sanitize_segment(&format!("<={threshold}")), format!("lte_{threshold}"));
        }
    }
}
