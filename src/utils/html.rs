// src/utils/html.rs

/// Strips scripts, event handlers and other unsafe markup from user-written
/// text (messages, alerts, descriptions) while keeping basic formatting tags.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input).trim().to_string()
}

/// Sanitizes an optional field, mapping blank results to `None`.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input.map(clean_html).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_script_tags() {
        assert_eq!(
            clean_html("<b>Evacuate</b><script>alert(1)</script>"),
            "<b>Evacuate</b>"
        );
    }

    #[test]
    fn blank_optional_becomes_none() {
        assert_eq!(clean_optional(Some("<script>x</script>")), None);
        assert_eq!(clean_optional(None), None);
    }
}
