//! Per-document stylesheet holding generated `@keyframes` rules.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleSheet {
    /// (name, full rule text)
    rules: Vec<(String, String)>,
}

impl StyleSheet {
    /// Insert `@keyframes {name} {rule}` unless `name` is already present.
    pub fn insert_keyframes(&mut self, name: &str, rule: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.rules
            .push((name.to_string(), format!("@keyframes {name} {rule}")));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|(existing, _)| existing == name)
    }

    /// Full text of the named rule.
    pub fn rule(&self, name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, text)| text.as_str())
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(_, text)| text.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }
}
