use crate::model::ids::{UnitId, UnitSelector};

/// Number of units shipped with the default catalog.
pub const DEFAULT_UNIT_COUNT: u32 = 20;

/// A unit and the file its phrases are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitFile {
    pub unit: UnitId,
    pub path: String,
}

/// Direction for stepping between adjacent units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitStep {
    Previous,
    Next,
}

/// The fixed set of units known at startup, kept in ascending order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitCatalog {
    files: Vec<UnitFile>,
}

impl UnitCatalog {
    /// Builds a catalog from arbitrary entries. Entries are sorted by unit and
    /// duplicates keep their first path.
    #[must_use]
    pub fn new(mut files: Vec<UnitFile>) -> Self {
        files.sort_by_key(|file| file.unit);
        files.dedup_by_key(|file| file.unit);
        Self { files }
    }

    /// Units `1..=count`, each read from `unit{N}.csv`.
    #[must_use]
    pub fn numbered(count: u32) -> Self {
        let files = (1..=count)
            .filter_map(|n| UnitId::new(n).ok())
            .map(|unit| UnitFile {
                unit,
                path: format!("unit{unit}.csv"),
            })
            .collect();
        Self { files }
    }

    #[must_use]
    pub fn files(&self) -> &[UnitFile] {
        &self.files
    }

    #[must_use]
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.files.iter().map(|file| file.unit).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn contains(&self, unit: UnitId) -> bool {
        self.file(unit).is_some()
    }

    #[must_use]
    pub fn file(&self, unit: UnitId) -> Option<&UnitFile> {
        self.files
            .binary_search_by_key(&unit, |file| file.unit)
            .ok()
            .map(|idx| &self.files[idx])
    }

    /// The unit adjacent to `unit`, or `None` at either end of the catalog.
    #[must_use]
    pub fn neighbor(&self, unit: UnitId, step: UnitStep) -> Option<UnitId> {
        let idx = self
            .files
            .binary_search_by_key(&unit, |file| file.unit)
            .ok()?;
        let target = match step {
            UnitStep::Previous => idx.checked_sub(1)?,
            UnitStep::Next => idx + 1,
        };
        self.files.get(target).map(|file| file.unit)
    }

    #[must_use]
    pub fn is_first(&self, unit: UnitId) -> bool {
        self.files.first().is_some_and(|file| file.unit == unit)
    }

    #[must_use]
    pub fn is_last(&self, unit: UnitId) -> bool {
        self.files.last().is_some_and(|file| file.unit == unit)
    }

    /// Display label for a selector, e.g. `Unit 3` or `All units`.
    #[must_use]
    pub fn unit_label(&self, selector: UnitSelector) -> String {
        selector.to_string()
    }
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::numbered(DEFAULT_UNIT_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(n: u32) -> UnitId {
        UnitId::new(n).unwrap()
    }

    #[test]
    fn default_catalog_lists_twenty_units_in_order() {
        let catalog = UnitCatalog::default();
        let ids: Vec<u32> = catalog.unit_ids().iter().map(UnitId::value).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
        assert_eq!(catalog.file(unit(7)).unwrap().path, "unit7.csv");
    }

    #[test]
    fn neighbor_clamps_at_boundaries() {
        let catalog = UnitCatalog::default();
        assert_eq!(catalog.neighbor(unit(5), UnitStep::Next), Some(unit(6)));
        assert_eq!(catalog.neighbor(unit(5), UnitStep::Previous), Some(unit(4)));
        assert_eq!(catalog.neighbor(unit(20), UnitStep::Next), None);
        assert_eq!(catalog.neighbor(unit(1), UnitStep::Previous), None);
        assert_eq!(catalog.neighbor(unit(21), UnitStep::Previous), None);
    }

    #[test]
    fn custom_catalog_is_sorted_and_deduplicated() {
        let catalog = UnitCatalog::new(vec![
            UnitFile { unit: unit(9), path: "b.csv".into() },
            UnitFile { unit: unit(2), path: "a.csv".into() },
            UnitFile { unit: unit(9), path: "c.csv".into() },
        ]);
        assert_eq!(catalog.unit_ids(), vec![unit(2), unit(9)]);
        assert_eq!(catalog.neighbor(unit(2), UnitStep::Next), Some(unit(9)));
        assert!(catalog.is_first(unit(2)));
        assert!(catalog.is_last(unit(9)));
        assert_eq!(catalog.unit_label(UnitSelector::Unit(unit(9))), "Unit 9");
        assert_eq!(catalog.unit_label(UnitSelector::All), "All units");
    }
}
