// src/utils/html.rs

/// Strips unsafe markup from user-written text (question feedback).
///
/// Whitelist based: harmless formatting tags survive, `<script>` and friends
/// are removed together with their content, event handler attributes are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
