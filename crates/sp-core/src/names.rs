pub fn escape_entities(raw: &str) -> String {
    raw.replace('<', "&lt;").replace('>', "&gt;")
}
