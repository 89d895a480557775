use std::collections::HashMap;

use crate::foundation::archive::StateArchive;
use crate::foundation::error::{CameraError, CameraResult};
use crate::variables::types::{
    VariableDefinition, VariableFlags, VariableId, VariableMask, VariableTableAllocationInfo,
    VariableTableFilter, VariableType, VariableValue,
};

const DEFAULT_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Entry {
    id: VariableId,
    variable_type: VariableType,
    offset: usize,
    flags: VariableFlags,
    name: String,
}

impl Entry {
    fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.variable_type.size()
    }
}

#[derive(Clone, Copy)]
struct MaskFilter<'a> {
    mask: &'a VariableMask,
    invert: bool,
}

/// Typed, offset-addressed store of camera variables.
///
/// Values live packed in one byte buffer. Every entry tracks whether it was ever written and
/// whether it was written during the current frame; "never written" is distinct from
/// "written with a default value".
#[derive(Clone, Debug, Default)]
pub struct VariableTable {
    entries: Vec<Entry>,
    lookup: HashMap<VariableId, usize>,
    memory: Vec<u8>,
    used: usize,
}

fn align_up(v: usize, align: usize) -> usize {
    v.div_ceil(align) * align
}

fn layout_size(definitions: &[VariableDefinition]) -> usize {
    definitions.iter().fold(0, |used, d| {
        align_up(used, d.variable_type.alignment()) + d.variable_type.size()
    })
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocation_info(info: &VariableTableAllocationInfo) -> Self {
        let mut table = Self::default();
        table.initialize(info);
        table
    }

    /// Drop every entry and allocate exactly enough room for `info`.
    ///
    /// All variables start at their type's default value, unwritten. Safe to call again.
    pub fn initialize(&mut self, info: &VariableTableAllocationInfo) {
        self.entries.clear();
        self.lookup.clear();
        self.used = 0;
        self.memory = vec![0; layout_size(&info.definitions)];
        self.entries.reserve(info.definitions.len());

        for definition in &info.definitions {
            if self.lookup.contains_key(&definition.id) {
                tracing::warn!(variable = %definition.name, "duplicate variable in allocation info");
                continue;
            }
            self.push_entry(definition);
        }
    }

    /// Register one more variable, growing the buffer when needed.
    pub fn add_variable(&mut self, definition: &VariableDefinition) -> CameraResult<()> {
        if self.lookup.contains_key(&definition.id) {
            return Err(CameraError::variable(format!(
                "variable '{}' ({:?}) is already registered",
                definition.name, definition.id
            )));
        }
        self.push_entry(definition);
        Ok(())
    }

    fn push_entry(&mut self, definition: &VariableDefinition) -> usize {
        let ty = definition.variable_type;
        let offset = align_up(self.used, ty.alignment());
        let end = offset + ty.size();
        self.reserve_for(end);
        ty.write_default(&mut self.memory[offset..end]);

        let mut flags = VariableFlags::empty();
        flags.set(VariableFlags::PRIVATE, definition.is_private);
        flags.set(VariableFlags::INPUT, definition.is_input);

        let index = self.entries.len();
        self.entries.push(Entry {
            id: definition.id,
            variable_type: ty,
            offset,
            flags,
            name: definition.name.clone(),
        });
        self.lookup.insert(definition.id, index);
        self.used = end;
        index
    }

    fn reserve_for(&mut self, required: usize) {
        let capacity = self.memory.len();
        if required <= capacity {
            return;
        }
        let doubled = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity * 2
        };
        let new_capacity = doubled.max(required);
        tracing::trace!(from = capacity, to = new_capacity, "growing variable table");
        self.memory.resize(new_capacity, 0);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the backing buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    /// Bytes occupied by registered variables, padding included.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    pub fn variable_type(&self, id: VariableId) -> Option<VariableType> {
        self.entry(id).map(|e| e.variable_type)
    }

    pub fn variable_name(&self, id: VariableId) -> Option<&str> {
        self.entry(id).map(|e| e.name.as_str())
    }

    pub fn is_input(&self, id: VariableId) -> bool {
        self.entry(id)
            .is_some_and(|e| e.flags.contains(VariableFlags::INPUT))
    }

    fn entry(&self, id: VariableId) -> Option<&Entry> {
        self.lookup.get(&id).map(|&i| &self.entries[i])
    }

    fn entry_mut(&mut self, id: VariableId) -> Option<&mut Entry> {
        self.lookup.get(&id).map(|&i| &mut self.entries[i])
    }

    fn typed_index<T: VariableValue>(&self, id: VariableId) -> CameraResult<usize> {
        let index = *self
            .lookup
            .get(&id)
            .ok_or_else(|| CameraError::variable(format!("unknown variable {id:?}")))?;
        let entry = &self.entries[index];
        if entry.variable_type != T::TYPE {
            return Err(CameraError::variable(format!(
                "variable '{}' is {:?}, accessed as {:?}",
                entry.name,
                entry.variable_type,
                T::TYPE
            )));
        }
        Ok(index)
    }

    fn write_index<T: VariableValue>(&mut self, index: usize, value: T) {
        let entry = &mut self.entries[index];
        value.write_bytes(&mut self.memory[entry.range()]);
        entry
            .flags
            .insert(VariableFlags::WRITTEN | VariableFlags::WRITTEN_THIS_FRAME);
    }

    /// Write a value and mark it written this frame.
    pub fn set_value<T: VariableValue>(&mut self, id: VariableId, value: T) -> CameraResult<()> {
        match self.typed_index::<T>(id) {
            Ok(index) => {
                self.write_index(index, value);
                Ok(())
            }
            Err(err) => {
                tracing::error!(%err, "set_value failed");
                Err(err)
            }
        }
    }

    /// Like [`VariableTable::set_value`], but silently ignores unknown or mistyped ids.
    pub fn try_set_value<T: VariableValue>(&mut self, id: VariableId, value: T) -> bool {
        match self.typed_index::<T>(id) {
            Ok(index) => {
                self.write_index(index, value);
                true
            }
            Err(_) => false,
        }
    }

    /// Read a written value. Reading a variable that was never written is an error.
    pub fn get_value<T: VariableValue>(&self, id: VariableId) -> CameraResult<T> {
        let index = self.typed_index::<T>(id)?;
        let entry = &self.entries[index];
        if !entry.flags.contains(VariableFlags::WRITTEN) {
            return Err(CameraError::variable(format!(
                "variable '{}' was read before being written",
                entry.name
            )));
        }
        Ok(T::read_bytes(&self.memory[entry.range()]))
    }

    /// Read a value if it exists, has type `T`, and was written.
    pub fn find_value<T: VariableValue>(&self, id: VariableId) -> Option<T> {
        let entry = self.entry(id)?;
        (entry.variable_type == T::TYPE && entry.flags.contains(VariableFlags::WRITTEN))
            .then(|| T::read_bytes(&self.memory[entry.range()]))
    }

    pub fn contains_value(&self, id: VariableId) -> bool {
        self.lookup.contains_key(&id)
    }

    pub fn is_value_written(&self, id: VariableId) -> bool {
        self.entry(id)
            .is_some_and(|e| e.flags.contains(VariableFlags::WRITTEN))
    }

    pub fn is_value_written_this_frame(&self, id: VariableId) -> bool {
        self.entry(id)
            .is_some_and(|e| e.flags.contains(VariableFlags::WRITTEN_THIS_FRAME))
    }

    pub fn unset_value(&mut self, id: VariableId) {
        if let Some(entry) = self.entry_mut(id) {
            entry
                .flags
                .remove(VariableFlags::WRITTEN | VariableFlags::WRITTEN_THIS_FRAME);
        }
    }

    pub fn unset_all_values(&mut self) {
        for entry in &mut self.entries {
            entry
                .flags
                .remove(VariableFlags::WRITTEN | VariableFlags::WRITTEN_THIS_FRAME);
        }
    }

    pub fn clear_all_written_this_frame_flags(&mut self) {
        for entry in &mut self.entries {
            entry.flags.remove(VariableFlags::WRITTEN_THIS_FRAME);
        }
    }

    pub fn override_all(&mut self, other: &VariableTable) {
        self.merge_from(other, VariableTableFilter::ALL, None, None, None);
    }

    /// Copy every written, non-private entry of `other` selected by `filter`.
    pub fn override_with(&mut self, other: &VariableTable, filter: VariableTableFilter) {
        self.merge_from(other, filter, None, None, None);
    }

    /// Masked override. With `invert`, entries in `mask` are skipped instead of selected.
    /// Every copied id is recorded in `out_mask`.
    pub fn override_masked(
        &mut self,
        other: &VariableTable,
        filter: VariableTableFilter,
        mask: &VariableMask,
        invert: bool,
        out_mask: &mut VariableMask,
    ) {
        let mask = MaskFilter { mask, invert };
        self.merge_from(other, filter, Some(mask), Some(out_mask), None);
    }

    pub fn lerp_all(&mut self, other: &VariableTable, factor: f64) {
        self.merge_from(other, VariableTableFilter::ALL, None, None, Some(factor));
    }

    /// Interpolate selected entries towards `other` by `factor`.
    ///
    /// Entries this table does not hold yet (or never wrote) take the full value of `other`.
    pub fn lerp(&mut self, other: &VariableTable, filter: VariableTableFilter, factor: f64) {
        self.merge_from(other, filter, None, None, Some(factor));
    }

    pub fn lerp_masked(
        &mut self,
        other: &VariableTable,
        filter: VariableTableFilter,
        factor: f64,
        mask: &VariableMask,
        invert: bool,
        out_mask: &mut VariableMask,
    ) {
        let mask = MaskFilter { mask, invert };
        self.merge_from(other, filter, Some(mask), Some(out_mask), Some(factor));
    }

    fn entry_selected(
        entry: &Entry,
        filter: VariableTableFilter,
        mask: Option<MaskFilter<'_>>,
    ) -> bool {
        let flags = entry.flags;
        if !flags.contains(VariableFlags::WRITTEN) || flags.contains(VariableFlags::PRIVATE) {
            return false;
        }
        if filter.contains(VariableTableFilter::CHANGED_ONLY)
            && !flags.contains(VariableFlags::WRITTEN_THIS_FRAME)
        {
            return false;
        }
        let wanted = if flags.contains(VariableFlags::INPUT) {
            filter.contains(VariableTableFilter::INPUT)
        } else {
            filter.contains(VariableTableFilter::OUTPUT)
        };
        if !wanted {
            return false;
        }
        match mask {
            Some(m) => m.mask.contains(entry.id) != m.invert,
            None => true,
        }
    }

    fn merge_from(
        &mut self,
        other: &VariableTable,
        filter: VariableTableFilter,
        mask: Option<MaskFilter<'_>>,
        mut out_mask: Option<&mut VariableMask>,
        factor: Option<f64>,
    ) {
        for other_entry in &other.entries {
            if !Self::entry_selected(other_entry, filter, mask) {
                continue;
            }

            let (index, fresh) = match self.lookup.get(&other_entry.id) {
                Some(&i) => (i, false),
                None => {
                    let definition = VariableDefinition {
                        id: other_entry.id,
                        variable_type: other_entry.variable_type,
                        name: other_entry.name.clone(),
                        is_private: false,
                        is_input: other_entry.flags.contains(VariableFlags::INPUT),
                        auto_reset: false,
                    };
                    (self.push_entry(&definition), true)
                }
            };

            let entry = &mut self.entries[index];
            if entry.variable_type != other_entry.variable_type {
                tracing::error!(
                    variable = %entry.name,
                    local = ?entry.variable_type,
                    other = ?other_entry.variable_type,
                    "variable type mismatch between tables"
                );
                debug_assert!(false, "variable type mismatch for '{}'", entry.name);
                continue;
            }

            let src = &other.memory[other_entry.range()];
            let dst = &mut self.memory[entry.range()];
            match factor {
                Some(t) if !fresh && entry.flags.contains(VariableFlags::WRITTEN) => {
                    entry.variable_type.lerp_in_place(dst, src, t);
                }
                _ => dst.copy_from_slice(src),
            }
            entry.flags.insert(VariableFlags::WRITTEN);

            if let Some(out) = out_mask.as_deref_mut() {
                out.insert(entry.id);
            }
        }
    }

    /// Save or restore the table contents. Loading requires the same entry count.
    pub fn serialize(&mut self, archive: &mut StateArchive) -> CameraResult<()> {
        let mut count = self.entries.len();
        archive.serialize(&mut count)?;
        if archive.is_loading() && count != self.entries.len() {
            return Err(CameraError::state(format!(
                "variable table has {} entries, archive has {count}",
                self.entries.len()
            )));
        }

        let mut entries = self.entries.clone();
        let mut memory = self.memory.clone();
        let mut used = self.used;
        archive.serialize(&mut entries)?;
        archive.serialize(&mut memory)?;
        archive.serialize(&mut used)?;

        if archive.is_loading() {
            self.lookup = entries.iter().enumerate().map(|(i, e)| (e.id, i)).collect();
            self.entries = entries;
            self.memory = memory;
            self.used = used;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variables/table.rs"]
mod tests;
