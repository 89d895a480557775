use std::collections::HashSet;

use crate::foundation::{
    core::{DQuat, DVec3, Transform3, Vec2},
    math::{Fnv1a64, Lerp},
};

/// Stable identifier of a camera variable, shared by every table in the system.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct VariableId(pub u32);

impl VariableId {
    pub const INVALID: Self = Self(0);

    /// Derive the id from a semantic name. Equal names always give equal ids.
    pub fn from_name(name: &str) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_str(name);
        match h.finish_u32() {
            0 => Self(1),
            v => Self(v),
        }
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

/// Closed set of value types a variable table can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum VariableType {
    Boolean,
    Integer32,
    Float,
    Double,
    Vector2d,
    Vector3d,
    Quat,
    Transform3d,
}

impl VariableType {
    /// Packed size in the table buffer, in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Boolean => 1,
            Self::Integer32 | Self::Float => 4,
            Self::Double => 8,
            Self::Vector2d => 16,
            Self::Vector3d => 24,
            Self::Quat => 32,
            Self::Transform3d => 80,
        }
    }

    pub const fn alignment(self) -> usize {
        match self {
            Self::Boolean => 1,
            Self::Integer32 | Self::Float => 4,
            _ => 8,
        }
    }

    pub(crate) fn write_default(self, out: &mut [u8]) {
        match self {
            Self::Boolean => bool::default().write_bytes(out),
            Self::Integer32 => i32::default().write_bytes(out),
            Self::Float => f32::default().write_bytes(out),
            Self::Double => f64::default().write_bytes(out),
            Self::Vector2d => Vec2::default().write_bytes(out),
            Self::Vector3d => DVec3::default().write_bytes(out),
            Self::Quat => DQuat::default().write_bytes(out),
            Self::Transform3d => Transform3::default().write_bytes(out),
        }
    }

    /// Interpolate the value stored in `local` towards `other`, in place.
    pub(crate) fn lerp_in_place(self, local: &mut [u8], other: &[u8], t: f64) {
        fn go<T: VariableValue>(local: &mut [u8], other: &[u8], t: f64) {
            let a = T::read_bytes(local);
            let b = T::read_bytes(other);
            T::lerp(&a, &b, t).write_bytes(local);
        }

        match self {
            Self::Boolean => go::<bool>(local, other, t),
            Self::Integer32 => go::<i32>(local, other, t),
            Self::Float => go::<f32>(local, other, t),
            Self::Double => go::<f64>(local, other, t),
            Self::Vector2d => go::<Vec2>(local, other, t),
            Self::Vector3d => go::<DVec3>(local, other, t),
            Self::Quat => go::<DQuat>(local, other, t),
            Self::Transform3d => go::<Transform3>(local, other, t),
        }
    }
}

/// A value type that can live in a variable table.
pub trait VariableValue: Copy + Default + Lerp + 'static {
    const TYPE: VariableType;

    /// Encode into exactly `TYPE.size()` bytes.
    fn write_bytes(&self, out: &mut [u8]);

    /// Decode from exactly `TYPE.size()` bytes.
    fn read_bytes(bytes: &[u8]) -> Self;
}

fn put_f64s(out: &mut [u8], values: &[f64]) {
    for (chunk, v) in out.chunks_exact_mut(8).zip(values) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

fn get_f64s<const N: usize>(bytes: &[u8]) -> [f64; N] {
    let mut values = [0.0; N];
    for (v, chunk) in values.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(chunk);
        *v = f64::from_le_bytes(raw);
    }
    values
}

impl VariableValue for bool {
    const TYPE: VariableType = VariableType::Boolean;

    fn write_bytes(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl VariableValue for i32 {
    const TYPE: VariableType = VariableType::Integer32;

    fn write_bytes(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[..4]);
        i32::from_le_bytes(raw)
    }
}

impl VariableValue for f32 {
    const TYPE: VariableType = VariableType::Float;

    fn write_bytes(&self, out: &mut [u8]) {
        out[..4].copy_from_slice(&self.to_le_bytes());
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[..4]);
        f32::from_le_bytes(raw)
    }
}

impl VariableValue for f64 {
    const TYPE: VariableType = VariableType::Double;

    fn write_bytes(&self, out: &mut [u8]) {
        put_f64s(out, &[*self]);
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        let [v] = get_f64s::<1>(bytes);
        v
    }
}

impl VariableValue for Vec2 {
    const TYPE: VariableType = VariableType::Vector2d;

    fn write_bytes(&self, out: &mut [u8]) {
        put_f64s(out, &[self.x, self.y]);
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        let [x, y] = get_f64s::<2>(bytes);
        Vec2::new(x, y)
    }
}

impl VariableValue for DVec3 {
    const TYPE: VariableType = VariableType::Vector3d;

    fn write_bytes(&self, out: &mut [u8]) {
        put_f64s(out, &self.to_array());
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        DVec3::from_array(get_f64s::<3>(bytes))
    }
}

impl VariableValue for DQuat {
    const TYPE: VariableType = VariableType::Quat;

    fn write_bytes(&self, out: &mut [u8]) {
        put_f64s(out, &self.to_array());
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        DQuat::from_array(get_f64s::<4>(bytes))
    }
}

impl VariableValue for Transform3 {
    const TYPE: VariableType = VariableType::Transform3d;

    fn write_bytes(&self, out: &mut [u8]) {
        let t = self.translation.to_array();
        let r = self.rotation.to_array();
        let s = self.scale.to_array();
        put_f64s(
            out,
            &[t[0], t[1], t[2], r[0], r[1], r[2], r[3], s[0], s[1], s[2]],
        );
    }

    fn read_bytes(bytes: &[u8]) -> Self {
        let v = get_f64s::<10>(bytes);
        Self {
            translation: DVec3::new(v[0], v[1], v[2]),
            rotation: DQuat::from_xyzw(v[3], v[4], v[5], v[6]),
            scale: DVec3::new(v[7], v[8], v[9]),
        }
    }
}

/// Everything a table needs to know to register a variable.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableDefinition {
    pub id: VariableId,
    pub variable_type: VariableType,
    pub name: String,
    /// Private variables never travel between tables.
    pub is_private: bool,
    /// Inputs are pre-blended before a rig runs; everything else is an output.
    pub is_input: bool,
    /// Reset to unwritten at the start of every system update while a rig uses it.
    pub auto_reset: bool,
}

impl VariableDefinition {
    pub fn new(name: impl Into<String>, variable_type: VariableType) -> Self {
        let name = name.into();
        Self {
            id: VariableId::from_name(&name),
            variable_type,
            name,
            is_private: false,
            is_input: false,
            auto_reset: false,
        }
    }

    /// Definition for value type `T`.
    pub fn of<T: VariableValue>(name: impl Into<String>) -> Self {
        Self::new(name, T::TYPE)
    }

    pub fn input(mut self) -> Self {
        self.is_input = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    pub fn auto_reset(mut self) -> Self {
        self.auto_reset = true;
        self
    }
}

/// Precomputed list of every variable a table must be able to hold.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableTableAllocationInfo {
    pub definitions: Vec<VariableDefinition>,
}

impl VariableTableAllocationInfo {
    /// Add a definition, ignoring ids that are already present.
    pub fn add(&mut self, definition: VariableDefinition) {
        if !self.definitions.iter().any(|d| d.id == definition.id) {
            self.definitions.push(definition);
        }
    }

    pub fn append(&mut self, other: &Self) {
        for d in &other.definitions {
            self.add(d.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

bitflags::bitflags! {
    /// Selects which entries take part in an override or lerp.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct VariableTableFilter: u8 {
        const INPUT = 1 << 0;
        const OUTPUT = 1 << 1;
        /// Only entries written during the current frame.
        const CHANGED_ONLY = 1 << 2;
        const ALL = (1 << 0) | (1 << 1);
        const ALL_CHANGED = (1 << 0) | (1 << 1) | (1 << 2);
    }
}

bitflags::bitflags! {
    /// Per-entry bookkeeping bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    pub struct VariableFlags: u8 {
        const PRIVATE = 1 << 0;
        const INPUT = 1 << 1;
        const WRITTEN = 1 << 2;
        const WRITTEN_THIS_FRAME = 1 << 3;
    }
}

/// Set of variable ids used to restrict or record cross-table copies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableMask {
    ids: HashSet<VariableId>,
}

impl VariableMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: VariableId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: VariableId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<VariableId> for VariableMask {
    fn from_iter<I: IntoIterator<Item = VariableId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variables/types.rs"]
mod tests;
