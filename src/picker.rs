//! Selection state for upload file lists.

use std::collections::BTreeSet;

/// Tracks which entries of an upload listing are selected.
///
/// The selection is held as a set-valued field that is replaced wholesale
/// on each change, so snapshots taken by a renderer never observe a
/// half-applied toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPicker {
    files: Vec<String>,
    selected: BTreeSet<String>,
}

impl UploadPicker {
    pub fn new(files: Vec<String>) -> Self {
        Self {
            files,
            selected: BTreeSet::new(),
        }
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    /// Toggle a file in or out of the selection. Names not present in the
    /// listing are ignored.
    pub fn toggle(&mut self, name: &str) {
        if !self.files.iter().any(|f| f == name) {
            return;
        }
        let mut next = self.selected.clone();
        if !next.remove(name) {
            next.insert(name.to_string());
        }
        self.selected = next;
    }

    pub fn select_all(&mut self) {
        self.selected = self.files.iter().cloned().collect();
    }

    pub fn clear(&mut self) {
        self.selected = BTreeSet::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker() -> UploadPicker {
        UploadPicker::new(vec![
            "week1.pdf".to_string(),
            "week2.pdf".to_string(),
            "syllabus.md".to_string(),
        ])
    }

    #[test]
    fn test_toggle_selects_and_deselects() {
        let mut picker = picker();
        picker.toggle("week1.pdf");
        assert!(picker.is_selected("week1.pdf"));
        picker.toggle("week1.pdf");
        assert!(!picker.is_selected("week1.pdf"));
    }

    #[test]
    fn test_toggle_unknown_name_ignored() {
        let mut picker = picker();
        picker.toggle("nope.txt");
        assert!(picker.selected().is_empty());
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut picker = picker();
        picker.select_all();
        assert_eq!(picker.selected().len(), 3);
        picker.clear();
        assert!(picker.selected().is_empty());
    }

    #[test]
    fn test_selection_is_ordered() {
        let mut picker = picker();
        picker.toggle("week2.pdf");
        picker.toggle("syllabus.md");
        let names: Vec<&str> = picker.selected().iter().map(String::as_str).collect();
        assert_eq!(names, vec!["syllabus.md", "week2.pdf"]);
    }
}
