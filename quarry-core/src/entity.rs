use crate::{AsValue, Result, Value};

/// Type that can be mapped to a table.
///
/// Normally implemented through `#[derive(Entity)]`, which emits a static [`EntityDef`] and the
/// by-name field accessors.
///
/// # Safety
/// Every [`FieldDef`] returned by [`entity_def`](Entity::entity_def) must describe a field of
/// `Self`: `offset` is the byte offset of that field and `read`/`write` are `read_at`/`write_at`
/// instantiated with its exact type. The offset value mapper dereferences them directly.
pub unsafe trait Entity: Default + Send + Sync + 'static {
    /// Schema descriptor, computed once per type.
    fn entity_def() -> &'static EntityDef;

    /// Read a field by its Rust name.
    fn field(&self, name: &str) -> Option<Value>;

    /// Write a field by its Rust name, converting the value to the field type.
    fn set_field(&mut self, name: &str, value: Value) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityShape {
    Named,
    Tuple,
    Unit,
}

#[derive(Debug)]
pub struct EntityDef {
    /// Rust type name, source of the derived table name.
    pub name: &'static str,
    /// Table name declared with `#[quarry(table_name = "...")]`, empty when absent.
    pub table_name: &'static str,
    pub shape: EntityShape,
    /// Fields in declaration order.
    pub fields: Box<[FieldDef]>,
}

#[derive(Debug)]
pub struct FieldDef {
    pub name: &'static str,
    /// Annotation content, comma separated `key=value` pairs, for example `column=first_name`.
    pub tag: &'static str,
    /// NULL prototype of the field type.
    pub value: Value,
    /// Byte offset of the field inside the entity.
    pub offset: usize,
    pub read: unsafe fn(*const u8) -> Value,
    pub write: unsafe fn(*mut u8, Value) -> Result<()>,
}

/// Reads the field of type `F` located at `ptr`.
///
/// # Safety
/// `ptr` must point to an initialized, properly aligned `F`.
pub unsafe fn read_at<F: AsValue + Clone>(ptr: *const u8) -> Value {
    unsafe { (*ptr.cast::<F>()).clone().as_value() }
}

/// Converts `value` and stores it in the field of type `F` located at `ptr`, dropping the
/// previous content.
///
/// # Safety
/// `ptr` must point to an initialized, properly aligned `F` that is not aliased.
pub unsafe fn write_at<F: AsValue>(ptr: *mut u8, value: Value) -> Result<()> {
    let value = F::try_from_value(value)?;
    unsafe {
        *ptr.cast::<F>() = value;
    }
    Ok(())
}
