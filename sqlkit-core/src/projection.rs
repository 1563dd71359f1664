//! Copies decoded rows into host structs.
//!
//! A type opts in by implementing [`Projectable`], usually through the
//! [`projectable!`](crate::projectable) macro, which lists the fields that
//! may be populated and their column names.
//!
//! ```rust
//! use sqlkit_core::projectable;
//!
//! #[derive(Default)]
//! struct Entity {
//!     id: i64,
//! }
//!
//! #[derive(Default)]
//! struct Player {
//!     name: String,
//!     level: i32,
//!     ratio: f32,
//!     online: bool,
//!     base: Entity,
//! }
//!
//! projectable!(Entity { id });
//! projectable!(Player { name as "player_name", level, ratio, online } extends base);
//! ```

use std::collections::HashMap;

use crate::outcome::{DecodedValue, Row};

/// Mutable reference to a field that a column may be written into.
#[derive(Debug)]
pub enum SlotTarget<'a> {
    /// 64-bit integer field.
    I64(&'a mut i64),
    /// 32-bit integer field, truncating.
    I32(&'a mut i32),
    /// 16-bit integer field, truncating.
    I16(&'a mut i16),
    /// 8-bit integer field, truncating.
    I8(&'a mut i8),
    /// Flag set from an integer greater than zero.
    Bool(&'a mut bool),
    /// Double field.
    F64(&'a mut f64),
    /// Float field, rounded to single precision.
    F32(&'a mut f32),
    /// String field.
    Text(&'a mut String),
}

macro_rules! slot_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a mut $ty> for SlotTarget<'a> {
                fn from(value: &'a mut $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

slot_from! {
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    bool => Bool,
    f64 => F64,
    f32 => F32,
    String => Text,
}

impl SlotTarget<'_> {
    /// Writes `value` if its kind fits the field. Returns whether it did.
    #[allow(clippy::cast_possible_truncation)]
    fn assign(&mut self, value: &DecodedValue) -> bool {
        match (self, value) {
            (Self::I64(field), DecodedValue::Integer(v)) => **field = *v,
            (Self::I32(field), DecodedValue::Integer(v)) => **field = *v as i32,
            (Self::I16(field), DecodedValue::Integer(v)) => **field = *v as i16,
            (Self::I8(field), DecodedValue::Integer(v)) => **field = *v as i8,
            (Self::Bool(field), DecodedValue::Integer(v)) => **field = *v > 0,
            (Self::F64(field), DecodedValue::Float(v)) => **field = *v,
            (Self::F32(field), DecodedValue::Float(v)) => **field = *v as f32,
            (Self::Text(field), DecodedValue::Text(v)) => field.clone_from(v),
            _ => return false,
        }
        true
    }
}

/// A named, writable field of a [`Projectable`] value.
#[derive(Debug)]
pub struct FieldSlot<'a> {
    name: &'static str,
    target: SlotTarget<'a>,
}

impl<'a> FieldSlot<'a> {
    /// Binds column `name` to `target`.
    #[must_use]
    pub fn new(name: &'static str, target: impl Into<SlotTarget<'a>>) -> Self {
        Self {
            name,
            target: target.into(),
        }
    }

    /// Column name this slot is populated from.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// A value whose fields can be populated from a [`Row`].
pub trait Projectable {
    /// Returns the populatable fields.
    ///
    /// A type's own fields come before those of an embedded base, so they win
    /// when both declare the same column name.
    fn field_slots(&mut self) -> Vec<FieldSlot<'_>>;
}

/// Copies matching columns of `row` into `target`.
///
/// Columns without a matching field, and values whose kind does not fit the
/// field type, are skipped. When a column name repeats, the last one wins.
/// Returns the number of assignments made.
pub fn project_row<T: Projectable + ?Sized>(row: &Row, target: &mut T) -> usize {
    let mut slots: HashMap<&'static str, SlotTarget<'_>> = HashMap::new();
    for slot in target.field_slots() {
        slots.entry(slot.name).or_insert(slot.target);
    }

    let mut assigned = 0;
    for field in row.fields() {
        if let Some(slot) = slots.get_mut(field.name.as_str()) {
            if slot.assign(&field.value) {
                assigned += 1;
            }
        }
    }
    assigned
}

/// Implements [`Projectable`] for a struct.
///
/// Each listed field is populated from the column of the same name, or from
/// the column given with `as "column"`. `extends base` appends the slots of
/// the `base` field, which must itself be [`Projectable`].
#[macro_export]
macro_rules! projectable {
    (@column $field:ident) => {
        stringify!($field)
    };
    (@column $field:ident $column:literal) => {
        $column
    };
    ($ty:ty { $($field:ident $(as $column:literal)?),* $(,)? } $(extends $base:ident)?) => {
        impl $crate::projection::Projectable for $ty {
            fn field_slots(&mut self) -> ::std::vec::Vec<$crate::projection::FieldSlot<'_>> {
                #[allow(unused_mut)]
                let mut slots = ::std::vec![
                    $(
                        $crate::projection::FieldSlot::new(
                            $crate::projectable!(@column $field $($column)?),
                            &mut self.$field,
                        ),
                    )*
                ];
                $(
                    slots.extend($crate::projection::Projectable::field_slots(&mut self.$base));
                )?
                slots
            }
        }
    };
}
