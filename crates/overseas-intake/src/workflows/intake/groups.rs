use serde::Serialize;

use super::domain::ContractViolation;

/// Element of a repeatable sub-form.
///
/// `Default` is the blank element the form shows when a row is added.
pub trait GroupEntry: Default + Clone {
    /// Named field of the element that can be edited in place.
    type Field: Copy;

    /// Label used in contract violations and validation hints.
    const GROUP: &'static str;

    fn set_field(&mut self, field: Self::Field, value: &str) -> Result<(), ContractViolation>;
}

/// Ordered collection that always keeps at least one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RepeatableGroup<T> {
    entries: Vec<T>,
}

impl<T: GroupEntry> RepeatableGroup<T> {
    /// Group seeded with a single blank element.
    pub fn seeded() -> Self {
        Self {
            entries: vec![T::default()],
        }
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a blank element and return its index.
    pub fn append(&mut self) -> usize {
        self.entries.push(T::default());
        self.entries.len() - 1
    }

    /// Remove the element at `index`, keeping the relative order of the rest.
    ///
    /// The last remaining element cannot be removed; the group is left untouched.
    pub fn remove(&mut self, index: usize) -> Result<T, ContractViolation> {
        self.check_index(index)?;
        if self.entries.len() == 1 {
            return Err(ContractViolation::GroupMinimumLength { group: T::GROUP });
        }
        Ok(self.entries.remove(index))
    }

    pub fn update_field(
        &mut self,
        index: usize,
        field: T::Field,
        value: &str,
    ) -> Result<(), ContractViolation> {
        self.check_index(index)?;
        self.entries[index].set_field(field, value)
    }

    fn check_index(&self, index: usize) -> Result<(), ContractViolation> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(ContractViolation::IndexOutOfRange {
                group: T::GROUP,
                index,
                len: self.entries.len(),
            })
        }
    }
}

impl<T: GroupEntry> Default for RepeatableGroup<T> {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Free-text tags (health conditions). May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagList {
    tags: Vec<String>,
}

impl TagList {
    pub const GROUP: &'static str = "health_conditions";

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Append the trimmed value. Blank input is ignored and reported as `false`.
    pub fn add(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        self.tags.push(value.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Result<String, ContractViolation> {
        if index >= self.tags.len() {
            return Err(ContractViolation::IndexOutOfRange {
                group: Self::GROUP,
                index,
                len: self.tags.len(),
            });
        }
        Ok(self.tags.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Row {
        label: String,
        note: String,
    }

    #[derive(Debug, Clone, Copy)]
    enum RowField {
        Label,
        Note,
    }

    impl GroupEntry for Row {
        type Field = RowField;
        const GROUP: &'static str = "rows";

        fn set_field(&mut self, field: RowField, value: &str) -> Result<(), ContractViolation> {
            match field {
                RowField::Label => self.label = value.to_string(),
                RowField::Note => self.note = value.to_string(),
            }
            Ok(())
        }
    }

    fn filled_group() -> RepeatableGroup<Row> {
        let mut group = RepeatableGroup::<Row>::seeded();
        group.update_field(0, RowField::Label, "first").expect("index 0");
        let second = group.append();
        group
            .update_field(second, RowField::Label, "second")
            .expect("appended index");
        group
    }

    #[test]
    fn seeded_group_holds_one_blank_entry() {
        let group = RepeatableGroup::<Row>::seeded();
        assert_eq!(group.entries(), &[Row::default()]);
    }

    #[test]
    fn append_then_remove_restores_previous_sequence() {
        let mut group = filled_group();
        let before = group.clone();

        let index = group.append();
        assert_eq!(index, 2);
        let removed = group.remove(index).expect("remove appended entry");

        assert_eq!(removed, Row::default());
        assert_eq!(group, before);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut group = filled_group();
        let third = group.append();
        group
            .update_field(third, RowField::Label, "third")
            .expect("appended index");

        group.remove(1).expect("remove middle entry");

        let labels: Vec<&str> = group.entries().iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "third"]);
    }

    #[test]
    fn last_entry_cannot_be_removed() {
        let mut group = RepeatableGroup::<Row>::seeded();

        match group.remove(0) {
            Err(ContractViolation::GroupMinimumLength { group: "rows" }) => {}
            other => panic!("expected minimum length violation, got {other:?}"),
        }
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn out_of_range_index_is_rejected_not_clamped() {
        let mut group = filled_group();
        let before = group.clone();

        assert!(matches!(
            group.update_field(2, RowField::Note, "x"),
            Err(ContractViolation::IndexOutOfRange { index: 2, len: 2, .. })
        ));
        assert!(matches!(
            group.remove(5),
            Err(ContractViolation::IndexOutOfRange { index: 5, len: 2, .. })
        ));
        assert_eq!(group, before);
    }

    #[test]
    fn update_touches_a_single_field() {
        let mut group = filled_group();
        group.update_field(0, RowField::Note, "urgent").expect("index 0");

        assert_eq!(group.get(0).map(|row| row.label.as_str()), Some("first"));
        assert_eq!(group.get(0).map(|row| row.note.as_str()), Some("urgent"));
        assert_eq!(group.get(1).map(|row| row.note.as_str()), Some(""));
    }

    #[test]
    fn tag_list_trims_and_ignores_blank_input() {
        let mut tags = TagList::default();
        assert!(tags.add("  Asthma "));
        assert!(!tags.add("   "));
        assert!(tags.add("Diabetes"));

        assert_eq!(tags.tags(), &["Asthma".to_string(), "Diabetes".to_string()]);
        assert_eq!(tags.remove(0).expect("index 0"), "Asthma");
        assert_eq!(tags.remove(0).expect("index 0"), "Diabetes");
        assert!(tags.is_empty());
        assert!(tags.remove(0).is_err());
    }
}
