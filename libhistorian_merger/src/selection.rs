use std::collections::BTreeSet;

/// A stable list of items with a set of selected keys and a text filter.
///
/// Filtering only changes what is shown; the selection is kept for items which are currently
/// filtered out.
#[derive(Debug, Clone, Default)]
pub struct SelectionList {
    items: Vec<String>,
    selected: BTreeSet<String>,
    filter: String,
}

impl SelectionList {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            selected: BTreeSet::new(),
            filter: String::new(),
        }
    }

    /// Replace the backing list. Resets both selection and filter.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected.clear();
        self.filter.clear();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Mutable access to the filter text, for text edit widgets
    pub fn filter_mut(&mut self) -> &mut String {
        &mut self.filter
    }

    /// Items matching the current filter (case-insensitive substring), in backing list order
    pub fn visible(&self) -> Vec<&str> {
        let needle = self.filter.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| item.to_lowercase().contains(&needle))
            .map(|item| item.as_str())
            .collect()
    }

    pub fn is_selected(&self, item: &str) -> bool {
        self.selected.contains(item)
    }

    /// Set the selection state of one item. Unknown items are ignored.
    pub fn set_selected(&mut self, item: &str, selected: bool) {
        if !self.items.iter().any(|i| i == item) {
            return;
        }
        if selected {
            self.selected.insert(item.to_string());
        } else {
            self.selected.remove(item);
        }
    }

    /// Select every item that is currently visible
    pub fn select_visible(&mut self) {
        let visible: Vec<String> = self.visible().into_iter().map(String::from).collect();
        self.selected.extend(visible);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Selected items in backing list order
    pub fn selected(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(*item))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_list() -> SelectionList {
        SelectionList::new(vec![
            String::from("TR2_Boiler"),
            String::from("TR2_Pump"),
            String::from("tr2_cooling"),
        ])
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let mut list = make_list();
        *list.filter_mut() = String::from("PUMP");
        assert_eq!(list.visible(), vec!["TR2_Pump"]);
        *list.filter_mut() = String::from(" tr2 ");
        assert_eq!(list.visible().len(), 3);
        list.filter_mut().clear();
        assert_eq!(list.visible().len(), 3);
    }

    #[test]
    fn test_selection_survives_filter() {
        let mut list = make_list();
        list.set_selected("TR2_Boiler", true);
        *list.filter_mut() = String::from("pump");
        list.set_selected("TR2_Pump", true);
        assert_eq!(list.filter(), "pump");
        assert!(list.is_selected("TR2_Boiler"));
        assert_eq!(list.selected(), vec!["TR2_Boiler", "TR2_Pump"]);

        list.set_selected("TR2_Boiler", false);
        assert_eq!(list.selected(), vec!["TR2_Pump"]);
    }

    #[test]
    fn test_select_visible_and_reset() {
        let mut list = make_list();
        list.filter_mut().push_str("cool");
        list.select_visible();
        assert_eq!(list.selected(), vec!["tr2_cooling"]);

        list.set_selected("not_listed", true);
        assert_eq!(list.selected().len(), 1);

        list.set_items(vec![String::from("TR2_New")]);
        assert!(list.selected().is_empty());
        assert_eq!(list.filter(), "");
        assert_eq!(list.visible(), vec!["TR2_New"]);
    }
}
