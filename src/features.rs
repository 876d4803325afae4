/// Human readable names for the feature tags a charlist may use.
pub const FEATURE_LABELS: &[(&str, &str)] = &[
    ("sc", "small caps"),
    ("osf", "old style figures"),
    ("numr", "numerator"),
    ("dnom", "denominator"),
    ("loclNLD", "dutch localization"),
];

pub fn feature_label(tag: &str) -> Option<&'static str> {
    FEATURE_LABELS
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|&(_, label)| label)
}

/// Labels for `tags` in order. Unknown tags are skipped.
pub fn feature_labels<S: AsRef<str>>(tags: &[S]) -> Vec<&'static str> {
    tags.iter().filter_map(|t| feature_label(t.as_ref())).collect()
}

/// Upper-cased, comma separated label line shown under the specimen name.
pub fn feature_caption<S: AsRef<str>>(tags: &[S]) -> String {
    feature_labels(tags).join(", ").to_uppercase()
}
