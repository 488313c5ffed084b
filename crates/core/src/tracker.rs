//! Per-instance record of which settings have been set.
//!
//! A caller that parses into the same value several times registers it once,
//! records each report, and releases the entry when the value is dropped.

use std::collections::HashMap;

use crate::schema::{ParseReport, Schema, SettingBits, SettingMeta};

/// Opaque key for a tracked instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

/// Set-setting bits keyed by [`InstanceId`].
#[derive(Debug, Default)]
pub struct InstanceTable {
    next: u64,
    entries: HashMap<InstanceId, SettingBits>,
}

impl InstanceTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a new instance.
    pub fn register(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        self.entries.insert(id, SettingBits::new());
        id
    }

    /// Merge the settings set by `report`. Returns `false` for unknown ids.
    pub fn record(&mut self, id: InstanceId, report: &ParseReport) -> bool {
        match self.entries.get_mut(&id) {
            Some(bits) => {
                bits.union_with(&report.set);
                true
            }
            None => false,
        }
    }

    /// Settings set so far for `id`.
    pub fn set_bits(&self, id: InstanceId) -> Option<&SettingBits> {
        self.entries.get(&id)
    }

    /// Required settings of `schema` still unset for `id`.
    pub fn needed_settings<'s, T>(
        &self,
        id: InstanceId,
        schema: &'s Schema<T>,
    ) -> Option<Vec<&'s SettingMeta>> {
        self.entries.get(&id).map(|bits| schema.needed_settings(bits))
    }

    /// Stop tracking `id`, returning its final bits.
    pub fn release(&mut self, id: InstanceId) -> Option<SettingBits> {
        self.entries.remove(&id)
    }

    /// Number of tracked instances.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Setting;

    #[derive(Default)]
    struct Target {
        a: i32,
        b: i32,
    }

    #[test]
    fn bits_accumulate_across_parses_until_release() {
        let schema = Schema::new()
            .with(Setting::new(["A"], |t: &mut Target| &mut t.a))
            .and_then(|s| s.with(Setting::new(["B"], |t: &mut Target| &mut t.b)))
            .unwrap();
        let mut table = InstanceTable::new();
        let id = table.register();
        let mut t = Target::default();

        let first = schema.parse(&mut t, "-A 1").unwrap();
        assert!(table.record(id, &first));
        assert_eq!(table.needed_settings(id, &schema).unwrap().len(), 1);

        let second = schema.parse(&mut t, "-B 2").unwrap();
        table.record(id, &second);
        assert!(table.needed_settings(id, &schema).unwrap().is_empty());

        let bits = table.release(id).unwrap();
        assert_eq!(bits.len(), 2);
        assert!(table.is_empty());
        assert!(!table.record(id, &second));
        assert!(table.needed_settings(id, &schema).is_none());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut table = InstanceTable::new();
        let a = table.register();
        table.release(a);
        let b = table.register();
        assert_ne!(a, b);
    }
}
